//! Conversion options: difficulty tables, thresholds and file names

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A `.chart` difficulty section and the simfile difficulty it becomes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartDifficulty {
    /// Section header, e.g. `[ExpertSingle]`
    pub section: String,
    /// Simfile difficulty label, e.g. `Challenge`
    pub label: String,
}

impl ChartDifficulty {
    pub fn new(section: &str, label: &str) -> Self {
        Self {
            section: section.to_string(),
            label: label.to_string(),
        }
    }
}

/// MIDI note numbers and open-note markers for one difficulty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiDifficulty {
    /// Simfile difficulty label
    pub label: String,
    /// Note number of the green fret; the next four notes are red..orange
    pub green_note: u8,
    /// SysEx payload (without 0xF0/0xF7 framing) that marks an open note
    pub open_on: Vec<u8>,
}

impl MidiDifficulty {
    pub fn new(label: &str, green_note: u8, difficulty: u8) -> Self {
        Self {
            label: label.to_string(),
            green_note,
            open_on: vec![0x50, 0x53, 0, 0, difficulty, 1, 1],
        }
    }

    /// Lane for a MIDI note number, if it belongs to this difficulty
    pub fn lane(&self, key: u8) -> Option<usize> {
        let offset = key.checked_sub(self.green_note)?;
        (offset < 5).then_some(offset as usize)
    }
}

/// All tunable values used during conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// A note held for at least `measure_length / sustain_divisor` ticks is a sustain
    pub sustain_divisor: u64,
    /// `.chart` note codes that become simfile notes (frets and open)
    pub valid_chart_codes: Vec<u8>,
    /// `.chart` note code for open notes
    pub open_chart_code: u8,
    /// `.chart` sections in output order
    pub chart_difficulties: Vec<ChartDifficulty>,
    /// MIDI difficulties in output order
    pub midi_difficulties: Vec<MidiDifficulty>,
    /// MIDI track names to take notes from, most preferred first
    pub notes_tracks: Vec<String>,
    /// Audio file names to reference, most preferred first
    pub audio_files: Vec<String>,
    /// Companion metadata file name
    pub metadata_file: String,
    /// Output simfile name
    pub output_file: String,
    /// Chart file stem looked for when scanning directories
    pub notes_name: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            sustain_divisor: 16,
            valid_chart_codes: vec![0, 1, 2, 3, 4, 7],
            open_chart_code: 7,
            chart_difficulties: vec![
                ChartDifficulty::new("[ExpertSingle]", "Challenge"),
                ChartDifficulty::new("[HardSingle]", "Hard"),
                ChartDifficulty::new("[MediumSingle]", "Medium"),
                ChartDifficulty::new("[EasySingle]", "Easy"),
            ],
            midi_difficulties: vec![
                MidiDifficulty::new("Challenge", 96, 3),
                MidiDifficulty::new("Hard", 84, 2),
                MidiDifficulty::new("Medium", 72, 1),
                MidiDifficulty::new("Easy", 60, 0),
            ],
            notes_tracks: ["PART GUITAR", "T1 GEMS", "PART RHYTHM", "PART BASS"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            audio_files: ["song.ogg", "guitar.ogg", "song.mp3", "guitar.mp3"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            metadata_file: "song.ini".to_string(),
            output_file: "notes.sm".to_string(),
            notes_name: "notes".to_string(),
        }
    }
}

impl ConvertOptions {
    /// Load options from a JSON file; missing fields keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Ticks a note must be held to count as a sustain (halves round to even)
    pub fn sustain_threshold(&self, measure_length: u64) -> u64 {
        (measure_length as f64 / self.sustain_divisor as f64).round_ties_even() as u64
    }
}
