//! JSON serialization types for inspecting parsed charts

use crate::tempo::TempoMap;
use crate::timeline::{row, DifficultyTrack, Tick};
use serde::Serialize;

/// Top-level JSON structure for a parsed chart
#[derive(Debug, Clone, Serialize)]
pub struct ChartJson {
    /// Source format (`chart` or `mid`)
    pub format: String,
    /// Ticks per quarter note
    pub resolution: u64,
    /// Ticks per measure
    pub measure_length: u64,
    /// Tempo changes in file order
    pub bpms: Vec<TempoJson>,
    /// Difficulties in output order
    pub difficulties: Vec<DifficultyJson>,
}

/// JSON representation of a tempo change
#[derive(Debug, Clone, Serialize)]
pub struct TempoJson {
    /// Position in beats
    pub beat: f64,
    pub bpm: f64,
}

/// JSON representation of one difficulty's timeline
#[derive(Debug, Clone, Serialize)]
pub struct DifficultyJson {
    pub label: String,
    pub rating: u32,
    /// Exclusive upper bound of the timeline
    pub last_tick: Tick,
    /// Populated ticks
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<NoteRowJson>,
}

/// JSON representation of one populated tick
#[derive(Debug, Clone, Serialize)]
pub struct NoteRowJson {
    pub tick: Tick,
    /// Lane states as a simfile row, e.g. `100002`
    pub lanes: String,
}

impl ChartJson {
    pub fn new(
        format: &str,
        resolution: u64,
        measure_length: u64,
        tempo: &TempoMap,
        tracks: &[DifficultyTrack],
    ) -> Self {
        Self {
            format: format.to_string(),
            resolution,
            measure_length,
            bpms: tempo
                .events()
                .iter()
                .map(|event| TempoJson {
                    beat: event.beat(),
                    bpm: event.bpm,
                })
                .collect(),
            difficulties: tracks.iter().map(DifficultyJson::from).collect(),
        }
    }
}

impl From<&DifficultyTrack> for DifficultyJson {
    fn from(track: &DifficultyTrack) -> Self {
        Self {
            label: track.label.clone(),
            rating: track.rating,
            last_tick: track.timeline.last_tick(),
            notes: track
                .timeline
                .iter()
                .map(|(tick, lanes)| NoteRowJson {
                    tick,
                    lanes: row(lanes),
                })
                .collect(),
        }
    }
}
