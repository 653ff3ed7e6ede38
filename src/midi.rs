//! `.mid` chart reader
//!
//! Guitar-style MIDI charts keep the tempo map in the first (conductor) track
//! and notes in a named instrument track. Each difficulty uses five
//! consecutive note numbers starting at its green fret. Open notes have no
//! note number of their own: a SysEx marker is sent at the same tick as a
//! colored note, and that note is moved into the open lane.

use crate::config::{ConvertOptions, MidiDifficulty};
use crate::error::{Error, Result};
use crate::tempo::{TempoEvent, TempoMap};
use crate::timeline::{DifficultyTrack, NoteState, Tick, Timeline, NUM_LANES, OPEN_LANE};
use log::{debug, warn};
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};

/// SysEx terminator kept at the end of the payload by the parser
const SYSEX_END: u8 = 0xF7;

/// A parsed MIDI chart with its notes track selected
pub struct MidiChart<'a> {
    smf: Smf<'a>,
    ticks_per_beat: u64,
    notes_track: usize,
}

impl<'a> MidiChart<'a> {
    /// Parse a Standard MIDI File and pick the notes track
    pub fn parse(data: &'a [u8], options: &ConvertOptions) -> Result<Self> {
        let smf = Smf::parse(data)?;

        let ticks_per_beat = match smf.header.timing {
            Timing::Metrical(ticks) if ticks.as_int() > 0 => ticks.as_int() as u64,
            _ => return Err(Error::UnsupportedTiming),
        };

        let notes_track = select_notes_track(&smf, &options.notes_tracks)?;

        Ok(Self {
            smf,
            ticks_per_beat,
            notes_track,
        })
    }

    pub fn ticks_per_beat(&self) -> u64 {
        self.ticks_per_beat
    }

    /// Ticks per 4/4 measure
    pub fn measure_length(&self) -> u64 {
        self.ticks_per_beat * 4
    }

    /// Name of the selected notes track
    pub fn notes_track_name(&self) -> Option<String> {
        track_name(&self.smf.tracks[self.notes_track])
    }

    /// Tempo changes from the conductor track, in track order.
    ///
    /// A tempo of zero microseconds per beat has no bpm and fails the file.
    pub fn tempo_map(&self) -> Result<TempoMap> {
        let Some(conductor) = self.smf.tracks.first() else {
            return Ok(TempoMap::new());
        };

        let mut map = TempoMap::new();
        let mut tick: Tick = 0;
        for event in conductor {
            tick += event.delta.as_int() as Tick;
            if let TrackEventKind::Meta(MetaMessage::Tempo(micros)) = event.kind {
                if micros.as_int() == 0 {
                    return Err(Error::ZeroTempo(tick));
                }
                map.push(TempoEvent::from_micros_per_beat(
                    tick,
                    self.ticks_per_beat,
                    micros.as_int(),
                ));
            }
        }
        Ok(map)
    }

    /// Build the timeline for one difficulty
    pub fn timeline(&self, difficulty: &MidiDifficulty, sustain_threshold: u64) -> Timeline {
        let mut builder = TimelineBuilder::new(sustain_threshold);

        for event in &self.smf.tracks[self.notes_track] {
            builder.advance(event.delta.as_int() as Tick);
            match event.kind {
                TrackEventKind::Midi { message, .. } => match message {
                    MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                        if let Some(lane) = difficulty.lane(key.as_int()) {
                            builder.note_on(lane);
                        }
                    }
                    MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                        if let Some(lane) = difficulty.lane(key.as_int()) {
                            builder.note_off(lane);
                        }
                    }
                    _ => {}
                },
                TrackEventKind::SysEx(data)
                    if sysex_payload(data) == difficulty.open_on.as_slice() =>
                {
                    builder.open_marker();
                }
                _ => {}
            }
        }

        builder.finish()
    }

    /// Timelines for every configured difficulty, in output order
    pub fn tracks(&self, options: &ConvertOptions, rating: u32) -> Vec<DifficultyTrack> {
        let threshold = options.sustain_threshold(self.measure_length());
        options
            .midi_difficulties
            .iter()
            .map(|difficulty| {
                DifficultyTrack::new(
                    difficulty.label.clone(),
                    rating,
                    self.timeline(difficulty, threshold),
                )
            })
            .collect()
    }
}

/// Tracks note starts per lane while walking a notes track
struct TimelineBuilder {
    timeline: Timeline,
    /// Start tick of the note currently held in each lane
    active: [Option<Tick>; NUM_LANES],
    current_tick: Tick,
    sustain_threshold: u64,
}

impl TimelineBuilder {
    fn new(sustain_threshold: u64) -> Self {
        Self {
            timeline: Timeline::new(),
            active: [None; NUM_LANES],
            current_tick: 0,
            sustain_threshold,
        }
    }

    fn advance(&mut self, delta: Tick) {
        self.current_tick += delta;
    }

    fn note_on(&mut self, lane: usize) {
        self.active[lane] = Some(self.current_tick);
        self.timeline.set(self.current_tick, lane, NoteState::Tap);
    }

    fn note_off(&mut self, lane: usize) {
        let Some(start) = self.active[lane].take() else {
            warn!(
                "note_off not corresponding to a note_on event (lane {} at tick {})",
                lane, self.current_tick
            );
            return;
        };

        let end = self.current_tick;
        if end - start >= self.sustain_threshold {
            self.timeline.set(start, lane, NoteState::SustainStart);
            self.timeline.set(end, lane, NoteState::SustainEnd);
        }

        // a colored note that starts with the open marker is an open note
        if self.active[OPEN_LANE] == Some(start) {
            let moved = self.timeline.move_lane(start, lane, OPEN_LANE);
            if moved == NoteState::SustainStart {
                self.timeline.move_lane(end, lane, OPEN_LANE);
            }
        }
    }

    fn open_marker(&mut self) {
        self.active[OPEN_LANE] = Some(self.current_tick);
    }

    fn finish(mut self) -> Timeline {
        self.timeline.extend_last_tick(self.current_tick);
        self.timeline
    }
}

/// SysEx data without the trailing terminator
fn sysex_payload(data: &[u8]) -> &[u8] {
    data.strip_suffix(&[SYSEX_END]).unwrap_or(data)
}

/// First track-name meta event of a track
fn track_name(track: &[TrackEvent]) -> Option<String> {
    track.iter().find_map(|event| match event.kind {
        TrackEventKind::Meta(MetaMessage::TrackName(name)) => {
            Some(String::from_utf8_lossy(name).into_owned())
        }
        _ => None,
    })
}

/// Pick the most preferred notes track; track 0 is the conductor and never a candidate
fn select_notes_track(smf: &Smf, preferred: &[String]) -> Result<usize> {
    let names: Vec<Option<String>> = smf
        .tracks
        .iter()
        .skip(1)
        .map(|track| track_name(track))
        .collect();

    for wanted in preferred {
        if let Some(i) = names.iter().position(|name| name.as_deref() == Some(wanted.as_str())) {
            debug!("Using notes track '{}'", wanted);
            return Ok(i + 1);
        }
    }

    Err(Error::NoNotesTrack)
}
