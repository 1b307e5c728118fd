//! Command implementations for the plot-extract binary.

pub mod export_cmd;
pub mod output;
