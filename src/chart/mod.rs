//! `.chart` text format reader
//!
//! Relevant lines look like:
//!
//! ```text
//! [Song]
//! {
//!   Resolution = 192
//! }
//! [SyncTrack]
//! {
//!   0 = B 120000
//! }
//! [ExpertSingle]
//! {
//!   768 = N 0 0
//!   960 = N 7 192
//! }
//! ```

pub mod scanner;

use crate::config::{ChartDifficulty, ConvertOptions};
use crate::error::{Error, Result};
use crate::tempo::{TempoEvent, TempoMap};
use crate::timeline::{DifficultyTrack, NoteState, Tick, Timeline, OPEN_LANE};
use log::warn;
use regex::Regex;
use std::sync::OnceLock;

const SONG_SECTION: &str = "[Song]";
const SYNC_TRACK_SECTION: &str = "[SyncTrack]";

const RESOLUTION_PATTERN: &str = r"Resolution = (\d+)";
const TEMPO_PATTERN: &str = r"(\d+) = B (\d+)";
const NOTE_PATTERN: &str = r"(\d+) = N (\d) (\d+)";

static RESOLUTION_REGEX: OnceLock<Regex> = OnceLock::new();
static TEMPO_REGEX: OnceLock<Regex> = OnceLock::new();
static NOTE_REGEX: OnceLock<Regex> = OnceLock::new();

fn resolution_regex() -> &'static Regex {
    RESOLUTION_REGEX.get_or_init(|| Regex::new(RESOLUTION_PATTERN).expect("invalid regex pattern"))
}

fn tempo_regex() -> &'static Regex {
    TEMPO_REGEX.get_or_init(|| Regex::new(TEMPO_PATTERN).expect("invalid regex pattern"))
}

fn note_regex() -> &'static Regex {
    NOTE_REGEX.get_or_init(|| Regex::new(NOTE_PATTERN).expect("invalid regex pattern"))
}

/// A note line: `<tick> = N <code> <length>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteLine {
    pub tick: Tick,
    pub code: u8,
    pub length: Tick,
}

impl NoteLine {
    /// Match a note line anywhere in `line`
    pub fn parse(line: &str) -> Option<Self> {
        let caps = note_regex().captures(line)?;
        Some(Self {
            tick: caps[1].parse().ok()?,
            code: caps[2].parse().ok()?,
            length: caps[3].parse().ok()?,
        })
    }
}

/// A decoded `.chart` file
#[derive(Debug, Clone)]
pub struct Chart {
    text: String,
    resolution: u64,
}

impl Chart {
    /// Read the resolution from `[Song]`; fails if it is missing or zero
    pub fn parse(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let resolution = scanner::section(&text, SONG_SECTION)
            .find_map(|line| resolution_regex().captures(line))
            .and_then(|caps| caps[1].parse::<u64>().ok())
            .filter(|&resolution| resolution > 0)
            .ok_or(Error::MissingResolution)?;
        Ok(Self { text, resolution })
    }

    /// Ticks per quarter note
    pub fn resolution(&self) -> u64 {
        self.resolution
    }

    /// Ticks per 4/4 measure
    pub fn measure_length(&self) -> u64 {
        self.resolution * 4
    }

    /// Tempo changes from `[SyncTrack]`, in file order
    pub fn tempo_map(&self) -> TempoMap {
        scanner::section(&self.text, SYNC_TRACK_SECTION)
            .filter_map(|line| {
                let caps = tempo_regex().captures(line)?;
                let tick = caps[1].parse().ok()?;
                let millibeats = caps[2].parse().ok()?;
                Some(TempoEvent::from_millibeats(tick, self.resolution, millibeats))
            })
            .collect()
    }

    /// Build the timeline of one difficulty section
    pub fn timeline(&self, difficulty: &ChartDifficulty, options: &ConvertOptions) -> Timeline {
        let mut timeline = Timeline::new();
        for note in scanner::section(&self.text, &difficulty.section).filter_map(NoteLine::parse) {
            add_note(&mut timeline, note, options);
        }
        timeline
    }

    /// Timelines for every configured difficulty, in output order
    pub fn tracks(&self, options: &ConvertOptions, rating: u32) -> Vec<DifficultyTrack> {
        options
            .chart_difficulties
            .iter()
            .map(|difficulty| {
                DifficultyTrack::new(
                    difficulty.label.clone(),
                    rating,
                    self.timeline(difficulty, options),
                )
            })
            .collect()
    }
}

/// Fold one note line into the timeline
fn add_note(timeline: &mut Timeline, note: NoteLine, options: &ConvertOptions) {
    // forced, tap and other special markers are not notes
    if !options.valid_chart_codes.contains(&note.code) {
        return;
    }

    let lane = if note.code == options.open_chart_code {
        OPEN_LANE
    } else {
        note.code as usize
    };
    if lane > OPEN_LANE {
        return;
    }

    // the tick after the note end must still be representable
    let Some(end) = note
        .tick
        .checked_add(note.length)
        .filter(|end| end.checked_add(1).is_some())
    else {
        warn!(
            "Skipping note at tick {} with length {}: out of range",
            note.tick, note.length
        );
        return;
    };

    if note.length == 0 {
        timeline.set(note.tick, lane, NoteState::Tap);
    } else {
        timeline.set(note.tick, lane, NoteState::SustainStart);
        timeline.set(end, lane, NoteState::SustainEnd);
    }
    timeline.extend_last_tick(end + 1);
}
