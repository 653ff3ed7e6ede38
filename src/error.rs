use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No resolution found in [Song] section")]
    MissingResolution,

    #[error("No valid notes track found in MIDI")]
    NoNotesTrack,

    #[error("Unsupported MIDI timing: only metrical (ticks per beat) files can be converted")]
    UnsupportedTiming,

    #[error("Zero tempo at MIDI tick {0}")]
    ZeroTempo(u64),

    #[error("MIDI parse error: {0}")]
    Midi(#[from] midly::Error),

    #[error("Unsupported chart {0}")]
    UnsupportedChart(PathBuf),

    #[error("Invalid chart path {0}")]
    InvalidPath(PathBuf),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
