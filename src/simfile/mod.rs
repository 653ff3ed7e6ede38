pub mod header;
pub mod notes;

pub use header::{select_music, write_header};
pub use notes::{measure_gcd, row_step, write_notes};

use crate::metadata::SongIni;
use crate::tempo::TempoMap;
use crate::timeline::DifficultyTrack;

/// Assemble a complete simfile: header, then every non-empty difficulty
pub fn write_simfile(
    ini: &SongIni,
    music: &str,
    tempo: &TempoMap,
    tracks: &[DifficultyTrack],
    measure_length: u64,
) -> String {
    let mut simfile = write_header(ini, music, tempo);
    for track in tracks {
        simfile.push_str(&write_notes(track, measure_length));
    }
    simfile
}
