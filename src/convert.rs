//! Chart to simfile conversion driver

use crate::chart::Chart;
use crate::config::ConvertOptions;
use crate::encoding;
use crate::error::{Error, Result};
use crate::metadata::SongIni;
use crate::midi::MidiChart;
use crate::simfile;
use crate::tempo::TempoMap;
use crate::timeline::DifficultyTrack;
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// `.chart` file extension
pub const CHART_EXT: &str = "chart";

/// `.mid` file extension
pub const MID_EXT: &str = "mid";

/// A loaded source chart of either format
pub enum ChartSource<'a> {
    Text(Chart),
    Midi(MidiChart<'a>),
}

impl<'a> ChartSource<'a> {
    /// Parse `data` according to the extension of `path`
    pub fn load(path: &Path, data: &'a [u8], options: &ConvertOptions) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some(MID_EXT) => Ok(ChartSource::Midi(MidiChart::parse(data, options)?)),
            Some(CHART_EXT) => Ok(ChartSource::Text(Chart::parse(encoding::decode(data))?)),
            _ => Err(Error::UnsupportedChart(path.to_path_buf())),
        }
    }

    /// Extension-style name of the source format
    pub fn format(&self) -> &'static str {
        match self {
            ChartSource::Text(_) => CHART_EXT,
            ChartSource::Midi(_) => MID_EXT,
        }
    }

    /// Ticks per quarter note
    pub fn resolution(&self) -> u64 {
        match self {
            ChartSource::Text(chart) => chart.resolution(),
            ChartSource::Midi(chart) => chart.ticks_per_beat(),
        }
    }

    pub fn measure_length(&self) -> u64 {
        match self {
            ChartSource::Text(chart) => chart.measure_length(),
            ChartSource::Midi(chart) => chart.measure_length(),
        }
    }

    pub fn tempo_map(&self) -> Result<TempoMap> {
        match self {
            ChartSource::Text(chart) => Ok(chart.tempo_map()),
            ChartSource::Midi(chart) => chart.tempo_map(),
        }
    }

    pub fn tracks(&self, options: &ConvertOptions, rating: u32) -> Vec<DifficultyTrack> {
        match self {
            ChartSource::Text(chart) => chart.tracks(options, rating),
            ChartSource::Midi(chart) => chart.tracks(options, rating),
        }
    }
}

/// Outcome of a directory scan
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Simfiles written
    pub converted: Vec<PathBuf>,
    /// Charts that failed, with the reason
    pub failed: Vec<(PathBuf, Error)>,
}

/// Converts chart folders to simfiles
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Build the simfile text for a loaded chart whose song folder is `dir`
    pub fn render(&self, source: &ChartSource, dir: &Path) -> Result<String> {
        let tempo = source.tempo_map()?;
        let ini = SongIni::load_or_default(&dir.join(&self.options.metadata_file));
        let music = simfile::select_music(dir, &self.options.audio_files);
        let tracks = source.tracks(&self.options, ini.guitar_difficulty());
        Ok(simfile::write_simfile(
            &ini,
            &music,
            &tempo,
            &tracks,
            source.measure_length(),
        ))
    }

    /// Convert one `.chart` or `.mid` file, writing the simfile next to it.
    ///
    /// Returns the path of the written simfile.
    pub fn convert_file(&self, path: &Path) -> Result<PathBuf> {
        if !path.is_file() {
            return Err(Error::InvalidPath(path.to_path_buf()));
        }
        let path = fs::canonicalize(path)?;
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let data = fs::read(&path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to open '{}': {}", path.display(), e),
            ))
        })?;
        let source = ChartSource::load(&path, &data, &self.options)?;
        match &source {
            ChartSource::Midi(chart) => info!(
                "Converting .{} ({}) for {}",
                source.format(),
                chart.notes_track_name().unwrap_or_default(),
                dir.display()
            ),
            ChartSource::Text(_) => info!("Converting .{} for {}", source.format(), dir.display()),
        }

        // nothing is written until the whole simfile is built
        let simfile = self.render(&source, &dir)?;
        let output = dir.join(&self.options.output_file);
        fs::write(&output, simfile)?;
        Ok(output)
    }

    /// The chart to convert in `dir`, preferring MIDI over `.chart`
    pub fn find_chart(&self, dir: &Path) -> Option<PathBuf> {
        [MID_EXT, CHART_EXT]
            .iter()
            .map(|ext| dir.join(format!("{}.{}", self.options.notes_name, ext)))
            .find(|path| path.is_file())
    }

    /// Recursively convert every chart folder under `root`.
    ///
    /// Failures are logged and collected; they never stop the scan.
    pub fn scan_directory(&self, root: &Path) -> ScanSummary {
        let mut summary = ScanSummary::default();

        let dirs = WalkDir::new(root)
            .contents_first(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_dir());

        for entry in dirs {
            let Some(chart) = self.find_chart(entry.path()) else {
                continue;
            };
            match self.convert_file(&chart) {
                Ok(output) => summary.converted.push(output),
                Err(e) => {
                    error!("Failed to process chart in {}: {}", entry.path().display(), e);
                    summary.failed.push((chart, e));
                }
            }
        }

        summary
    }
}
