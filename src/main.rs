use chart2sm::{ConvertOptions, Converter};
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "chart2sm")]
#[command(version = "0.3.0")]
#[command(about = "Clone Hero chart to SM converter", long_about = None)]
struct Args {
    /// A .chart or .mid file, or a folder containing CH charts.
    /// Outputs a "notes.sm" file in the same folder as the chart.
    path: PathBuf,

    /// JSON file overriding conversion options
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let options = match &args.config {
        Some(path) => match ConvertOptions::from_file(path) {
            Ok(options) => options,
            Err(e) => {
                error!("Failed to load config '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => ConvertOptions::default(),
    };
    let converter = Converter::with_options(options);

    if args.path.is_dir() {
        info!("Scanning for charts to convert...");
        let summary = converter.scan_directory(&args.path);
        info!(
            "Converted {} chart(s), {} failed",
            summary.converted.len(),
            summary.failed.len()
        );
        return ExitCode::SUCCESS;
    }

    match converter.convert_file(&args.path) {
        Ok(output) => {
            info!("Wrote {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
