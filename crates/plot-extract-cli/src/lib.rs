//! Command-line front end for `plot-extract`.

pub mod cli;
