//! `#NOTES` block generation
//!
//! Each measure is written with the fewest evenly spaced rows that still put
//! every populated tick on a row.

use crate::timeline::{row, DifficultyTrack, Tick, Timeline, NUM_LANES};
use std::fmt::Write;

/// StepMania steps type for six-lane guitar charts with open notes
pub const STEPS_TYPE: &str = "bass-six";

/// Groove radar values; not computed
const GROOVE_RADAR: &str = "0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0";

/// Greatest common divisor of `measure_length` and every offset.
///
/// An empty offset set gives `measure_length` (one row for the measure).
pub fn measure_gcd<I>(offsets: I, measure_length: u64) -> u64
where
    I: IntoIterator<Item = u64>,
{
    let mut d = measure_length;
    for offset in offsets {
        d = gcd(d, offset);
        if d == 1 {
            return d;
        }
    }
    d
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Row spacing in ticks for the measure starting at `measure_start`
pub fn row_step(timeline: &Timeline, measure_start: Tick, measure_length: u64) -> u64 {
    let offsets = timeline
        .range(measure_start..measure_start + measure_length)
        .map(|(tick, _)| tick - measure_start);
    measure_gcd(offsets, measure_length)
}

/// Number of measures needed to cover the timeline.
///
/// The end is rounded up to a whole measure, and never falls short of the
/// last populated tick.
pub fn measure_count(timeline: &Timeline, measure_length: u64) -> u64 {
    let end = timeline.last_tick().max(timeline.end_of_notes());
    end.div_ceil(measure_length).max(1)
}

/// Write one difficulty as a `#NOTES` block; empty timelines produce nothing
pub fn write_notes(track: &DifficultyTrack, measure_length: u64) -> String {
    let timeline = &track.timeline;
    if timeline.is_empty() || measure_length == 0 {
        return String::new();
    }

    let mut out = String::new();
    let _ = write!(
        out,
        "\n//---------------{steps} - ----------------\n\
         #NOTES:\n     {steps}:\n     :\n     {label}:\n     {rating}:\n     {radar}:\n",
        steps = STEPS_TYPE,
        label = track.label,
        rating = track.rating,
        radar = GROOVE_RADAR,
    );

    let measures = measure_count(timeline, measure_length);
    for measure in 0..measures {
        let measure_start = measure * measure_length;
        let step = row_step(timeline, measure_start, measure_length);

        let mut tick = measure_start;
        while tick < measure_start + measure_length {
            match timeline.get(tick) {
                Some(lanes) => out.push_str(&row(lanes)),
                None => out.push_str(&"0".repeat(NUM_LANES)),
            }
            out.push('\n');
            tick += step;
        }

        out.push_str(if measure + 1 == measures { ";\n" } else { ",\n" });
    }

    out
}
