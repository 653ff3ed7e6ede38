//! Tempo map handling and `#BPMS` field generation

use crate::timeline::Tick;
use num_rational::Ratio;
use std::fmt::Write;

/// Simfile header label for the tempo map
pub const BPMS_LABEL: &str = "#BPMS";

/// Microseconds in a minute, for MIDI tempo conversion
const MICROS_PER_MINUTE: f64 = 60_000_000.0;

/// A tempo change at a beat position
#[derive(Debug, Clone, PartialEq)]
pub struct TempoEvent {
    /// Position in quarter notes from the start of the song
    pub position: Ratio<u64>,
    /// Beats per minute
    pub bpm: f64,
}

impl TempoEvent {
    pub fn new(position: Ratio<u64>, bpm: f64) -> Self {
        Self { position, bpm }
    }

    /// Tempo from a `.chart` `B` event (bpm * 1000)
    pub fn from_millibeats(tick: Tick, resolution: u64, millibeats: u64) -> Self {
        Self::new(Ratio::new(tick, resolution), millibeats as f64 / 1000.0)
    }

    /// Tempo from a MIDI set-tempo meta event (microseconds per quarter note)
    pub fn from_micros_per_beat(tick: Tick, ticks_per_beat: u64, micros: u32) -> Self {
        Self::new(Ratio::new(tick, ticks_per_beat), MICROS_PER_MINUTE / micros as f64)
    }

    /// Position as a floating point beat number
    pub fn beat(&self) -> f64 {
        *self.position.numer() as f64 / *self.position.denom() as f64
    }
}

/// Ordered list of tempo changes, kept in the order they were read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TempoMap {
    events: Vec<TempoEvent>,
}

impl TempoMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: TempoEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[TempoEvent] {
        &self.events
    }

    /// Render the `#BPMS:pos=bpm,...;` header line
    pub fn to_field(&self) -> String {
        bpms_field(&self.events)
    }
}

impl FromIterator<TempoEvent> for TempoMap {
    fn from_iter<I: IntoIterator<Item = TempoEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

/// Render tempo events as a `#BPMS` header field.
///
/// No merging or sorting is done; events appear in the order given.
pub fn bpms_field(events: &[TempoEvent]) -> String {
    let mut field = format!("{}:", BPMS_LABEL);
    for (i, event) in events.iter().enumerate() {
        if i > 0 {
            field.push(',');
        }
        let _ = write!(
            field,
            "{}={}",
            format_position(&event.position),
            format_bpm(event.bpm)
        );
    }
    field.push_str(";\n");
    field
}

/// Whole beats print without a fraction, others as a decimal
fn format_position(position: &Ratio<u64>) -> String {
    if position.is_integer() {
        position.to_integer().to_string()
    } else {
        format!("{:?}", *position.numer() as f64 / *position.denom() as f64)
    }
}

/// Shortest round-trip decimal, always with a fractional part
fn format_bpm(bpm: f64) -> String {
    format!("{:?}", bpm)
}
