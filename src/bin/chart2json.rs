//! Chart to JSON dumper

use chart2sm::json::ChartJson;
use chart2sm::metadata::SongIni;
use chart2sm::{ChartSource, ConvertOptions};
use clap::Parser;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "chart2json")]
#[command(version = "0.3.0")]
#[command(about = "Dump the parsed timelines of a .chart/.mid file as JSON", long_about = None)]
struct Args {
    /// Input .chart or .mid file
    input: PathBuf,

    /// Output JSON file (writes to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output compact JSON (default is pretty-printed)
    #[arg(short, long)]
    compact: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let options = ConvertOptions::default();

    // Read and parse input file
    let data = fs::read(&args.input)?;
    let source = ChartSource::load(&args.input, &data, &options)?;

    // Rating comes from song.ini next to the chart, as in conversion
    let rating = args
        .input
        .parent()
        .map(|dir| SongIni::load_or_default(&dir.join(&options.metadata_file)))
        .unwrap_or_default()
        .guitar_difficulty();

    let chart_json = ChartJson::new(
        source.format(),
        source.resolution(),
        source.measure_length(),
        &source.tempo_map()?,
        &source.tracks(&options, rating),
    );

    // Serialize to JSON
    let json_string = if args.compact {
        serde_json::to_string(&chart_json)?
    } else {
        serde_json::to_string_pretty(&chart_json)?
    };

    // Write output
    match args.output {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(json_string.as_bytes())?;
            file.write_all(b"\n")?;
        }
        None => {
            println!("{}", json_string);
        }
    }

    Ok(())
}
