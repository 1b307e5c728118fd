use clap::Parser;
use plot_extract::{ExportOptions, ExportPaths, DEFAULT_DECIMALS, MAX_DECIMALS};
use plot_extract_cli::cli::export_cmd::{self, OutputMode, EXIT_FAILURE};
use plot_extract_cli::cli::output::{self, Styled};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "plot-extract")]
#[command(about = "Export the 3D scatter traces embedded in a Plotly HTML file as compact JSON")]
#[command(version)]
struct Cli {
    /// Project root holding output/audio_classifier_3d.html
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Input HTML document (overrides the path under --root)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output JSON file (overrides the path under --root)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Decimal places kept in exported coordinates
    #[arg(
        long,
        default_value_t = DEFAULT_DECIMALS,
        value_parser = clap::value_parser!(u32).range(0..=MAX_DECIMALS as i64)
    )]
    decimals: u32,

    /// Print the export report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Suppress progress and summary lines
    #[arg(short, long)]
    quiet: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    fn paths(&self) -> ExportPaths {
        let defaults = ExportPaths::from_root(&self.root);
        ExportPaths {
            input: self.input.clone().unwrap_or(defaults.input),
            output: self.output.clone().unwrap_or(defaults.output),
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "plot_extract=debug,plot_extract_cli=debug"
    } else {
        "error"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let paths = cli.paths();
    let options = ExportOptions {
        decimals: cli.decimals,
    };
    let mode = OutputMode {
        json: cli.json,
        quiet: cli.quiet,
        color: output::color_enabled(cli.no_color),
    };
    debug!(?paths, ?options, "starting export");

    match export_cmd::run(&paths, options, mode) {
        Ok(status) => ExitCode::from(status.exit_code()),
        Err(e) => {
            if mode.json {
                output::print_json(&serde_json::json!({
                    "error": "export_failed",
                    "message": format!("{e:#}"),
                }));
            } else {
                eprintln!("  {} Error: {e:#}", Styled::new(mode.color).fail_sym());
            }
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
