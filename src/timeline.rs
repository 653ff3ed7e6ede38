//! Sparse per-tick note-state timeline shared by the chart and MIDI readers

use std::collections::BTreeMap;
use std::ops::Range;

/// Number of simfile columns: five frets plus the open lane
pub const NUM_LANES: usize = 6;

/// Column used for open notes
pub const OPEN_LANE: usize = 5;

/// Discrete time unit of the source file
pub type Tick = u64;

/// Note states for every lane at one tick
pub type Lanes = [NoteState; NUM_LANES];

/// State of a single lane at a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum NoteState {
    #[default]
    Empty = 0,
    /// Non-sustained note
    Tap = 1,
    /// Long note toggle on
    SustainStart = 2,
    /// Long note toggle off
    SustainEnd = 3,
}

impl NoteState {
    /// Digit written to the simfile row for this state
    pub fn digit(self) -> char {
        (b'0' + self as u8) as char
    }

    pub fn is_empty(self) -> bool {
        self == NoteState::Empty
    }
}

/// Render a lane array as a simfile row (e.g. `100000`)
pub fn row(lanes: &Lanes) -> String {
    lanes.iter().map(|state| state.digit()).collect()
}

/// Sparse mapping from tick to lane states.
///
/// Entries are created lazily by [`Timeline::ensure`] and never removed.
/// `last_tick` is an exclusive upper bound that only ever moves forward.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    notes: BTreeMap<Tick, Lanes>,
    last_tick: Tick,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the lanes at `tick`, inserting an empty row if absent
    pub fn ensure(&mut self, tick: Tick) -> &mut Lanes {
        self.notes.entry(tick).or_default()
    }

    /// Set one lane at one tick
    pub fn set(&mut self, tick: Tick, lane: usize, state: NoteState) {
        debug_assert!(lane < NUM_LANES);
        if state.is_empty() && !self.notes.contains_key(&tick) {
            return;
        }
        self.ensure(tick)[lane] = state;
    }

    /// Lanes at exactly `tick`
    pub fn get(&self, tick: Tick) -> Option<&Lanes> {
        self.notes.get(&tick)
    }

    /// State of one lane at exactly `tick` (empty if nothing is there)
    pub fn state(&self, tick: Tick, lane: usize) -> NoteState {
        self.notes
            .get(&tick)
            .map(|lanes| lanes[lane])
            .unwrap_or_default()
    }

    /// Move the state of `from` into `to` at `tick`, clearing `from`.
    ///
    /// Returns the moved state.
    pub fn move_lane(&mut self, tick: Tick, from: usize, to: usize) -> NoteState {
        match self.notes.get_mut(&tick) {
            Some(lanes) => {
                let state = lanes[from];
                lanes[to] = state;
                lanes[from] = NoteState::Empty;
                state
            }
            None => NoteState::Empty,
        }
    }

    /// Advance the exclusive upper bound to at least `candidate`
    pub fn extend_last_tick(&mut self, candidate: Tick) {
        self.last_tick = self.last_tick.max(candidate);
    }

    pub fn last_tick(&self) -> Tick {
        self.last_tick
    }

    /// Tick one past the last populated entry, or 0 when empty
    pub fn end_of_notes(&self) -> Tick {
        self.notes.keys().next_back().map_or(0, |tick| tick + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// All populated ticks in ascending order
    pub fn iter(&self) -> impl Iterator<Item = (Tick, &Lanes)> {
        self.notes.iter().map(|(tick, lanes)| (*tick, lanes))
    }

    /// Populated ticks within a half-open range
    pub fn range(&self, ticks: Range<Tick>) -> impl Iterator<Item = (Tick, &Lanes)> {
        self.notes.range(ticks).map(|(tick, lanes)| (*tick, lanes))
    }
}

/// One difficulty's timeline, ready to be written as a `#NOTES` block
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyTrack {
    /// Simfile difficulty name (e.g. `Challenge`)
    pub label: String,
    /// Numeric difficulty rating
    pub rating: u32,
    pub timeline: Timeline,
}

impl DifficultyTrack {
    pub fn new(label: impl Into<String>, rating: u32, timeline: Timeline) -> Self {
        Self {
            label: label.into(),
            rating,
            timeline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_creates_empty_row() {
        let mut timeline = Timeline::new();
        assert_eq!(*timeline.ensure(10), [NoteState::Empty; NUM_LANES]);
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn test_set_and_row() {
        let mut timeline = Timeline::new();
        timeline.set(0, 0, NoteState::Tap);
        timeline.set(0, OPEN_LANE, NoteState::SustainStart);
        assert_eq!(row(timeline.get(0).unwrap()), "100002");
    }

    #[test]
    fn test_set_empty_does_not_create_entry() {
        let mut timeline = Timeline::new();
        timeline.set(5, 2, NoteState::Empty);
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_last_tick_never_decreases() {
        let mut timeline = Timeline::new();
        timeline.extend_last_tick(100);
        timeline.extend_last_tick(50);
        assert_eq!(timeline.last_tick(), 100);
        timeline.extend_last_tick(101);
        assert_eq!(timeline.last_tick(), 101);
    }

    #[test]
    fn test_move_lane() {
        let mut timeline = Timeline::new();
        timeline.set(100, 0, NoteState::Tap);
        assert_eq!(timeline.move_lane(100, 0, OPEN_LANE), NoteState::Tap);
        assert_eq!(row(timeline.get(100).unwrap()), "000001");
        assert_eq!(timeline.move_lane(200, 0, OPEN_LANE), NoteState::Empty);
        assert!(timeline.get(200).is_none());
    }

    #[test]
    fn test_range_is_half_open() {
        let mut timeline = Timeline::new();
        for tick in [0, 384, 768] {
            timeline.set(tick, 1, NoteState::Tap);
        }
        let ticks: Vec<Tick> = timeline.range(0..768).map(|(tick, _)| tick).collect();
        assert_eq!(ticks, vec![0, 384]);
        assert_eq!(timeline.end_of_notes(), 769);
    }
}
