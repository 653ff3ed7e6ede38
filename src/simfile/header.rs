//! Simfile header: song metadata, asset references and the tempo map

use crate::metadata::SongIni;
use crate::tempo::TempoMap;
use log::warn;
use std::fmt::Write;
use std::path::Path;

/// Placeholder background image
pub const BACKGROUND: &str = "background.png";

/// Placeholder CD title image
pub const CDTITLE: &str = "album.png";

/// Music file used when none of the candidates exist
pub const DEFAULT_MUSIC: &str = "song.ogg";

/// Pick the audio file to reference from `dir`.
///
/// The first existing candidate wins; stems found after it are reported and
/// ignored since a simfile has a single music track.
pub fn select_music(dir: &Path, candidates: &[String]) -> String {
    let mut found: Option<&str> = None;
    for candidate in candidates {
        if !dir.join(candidate).is_file() {
            continue;
        }
        match found {
            None => found = Some(candidate.as_str()),
            Some(song) => warn!(
                "Found song {} & stem {}. Stems currently not supported in SM",
                song, candidate
            ),
        }
    }

    match found {
        Some(song) => song.to_string(),
        None => {
            warn!("Audio file not found for chart in {}", dir.display());
            DEFAULT_MUSIC.to_string()
        }
    }
}

/// Build the simfile header
pub fn write_header(ini: &SongIni, music: &str, tempo: &TempoMap) -> String {
    let mut header = String::new();
    let fields = [
        ("#TITLE", ini.name()),
        ("#ARTIST", ini.artist()),
        ("#GENRE", ini.genre()),
        ("#CREDIT", ini.charter()),
    ];
    for (tag, value) in fields {
        if let Some(value) = value {
            let _ = writeln!(header, "{}:{};", tag, value);
        }
    }
    let _ = writeln!(header, "#BACKGROUND:{};", BACKGROUND);
    let _ = writeln!(header, "#CDTITLE:{};", CDTITLE);
    let _ = writeln!(header, "#MUSIC:{};", music);
    if let Some(seconds) = ini.preview_start_seconds() {
        let _ = writeln!(header, "#SAMPLESTART:{:?};", seconds);
    }
    header.push_str(&tempo.to_field());
    header
}
