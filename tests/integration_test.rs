//! Integration tests for chart conversion
//!
//! These tests lay out song folders in a temp dir, convert them and check the
//! written simfiles.

use chart2sm::chart::Chart;
use chart2sm::config::ChartDifficulty;
use chart2sm::timeline::{NoteState, Tick, NUM_LANES, OPEN_LANE};
use chart2sm::{ConvertOptions, Converter, Error};
use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const NOTES_HEADER: &str = "\n//---------------bass-six - ----------------\n#NOTES:\n     bass-six:\n     :\n";
const RADAR: &str = "     0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0:\n";

/// Build `.chart` text with a 192 resolution and the given difficulty sections
fn chart_text(sections: &[(&str, &str)]) -> String {
    let mut text = String::from(
        "[Song]\n{\n  Name = \"Test\"\n  Resolution = 192\n}\n[SyncTrack]\n{\n  0 = TS 4\n  0 = B 120000\n}\n",
    );
    for (name, body) in sections {
        text.push_str(&format!("{}\n{{\n{}}}\n", name, body));
    }
    text
}

/// Write a file into `dir` and convert `dir/notes.*`, returning the simfile text
fn convert(dir: &Path, chart_name: &str, data: &[u8]) -> String {
    fs::write(dir.join(chart_name), data).unwrap();
    let output = Converter::new()
        .convert_file(&dir.join(chart_name))
        .expect("Conversion failed");
    fs::read_to_string(output).expect("Failed to read simfile")
}

fn delta(ticks: u32) -> u28 {
    u28::new(ticks)
}

fn track_name(name: &'static str) -> TrackEvent<'static> {
    TrackEvent {
        delta: delta(0),
        kind: TrackEventKind::Meta(MetaMessage::TrackName(name.as_bytes())),
    }
}

fn note(dt: u32, key: u8, vel: u8) -> TrackEvent<'static> {
    TrackEvent {
        delta: delta(dt),
        kind: TrackEventKind::Midi {
            channel: u4::new(0),
            message: MidiMessage::NoteOn {
                key: u7::new(key),
                vel: u7::new(vel),
            },
        },
    }
}

fn note_off(dt: u32, key: u8) -> TrackEvent<'static> {
    TrackEvent {
        delta: delta(dt),
        kind: TrackEventKind::Midi {
            channel: u4::new(0),
            message: MidiMessage::NoteOff {
                key: u7::new(key),
                vel: u7::new(64),
            },
        },
    }
}

fn sysex(dt: u32, data: &'static [u8]) -> TrackEvent<'static> {
    TrackEvent {
        delta: delta(dt),
        kind: TrackEventKind::SysEx(data),
    }
}

fn tempo(dt: u32, micros: u32) -> TrackEvent<'static> {
    TrackEvent {
        delta: delta(dt),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(micros))),
    }
}

fn end_of_track() -> TrackEvent<'static> {
    TrackEvent {
        delta: delta(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    }
}

/// Encode a format 1 MIDI file with 480 ticks per beat
fn midi_file(tracks: Vec<Vec<TrackEvent<'static>>>) -> Vec<u8> {
    let smf = Smf {
        header: Header::new(Format::Parallel, Timing::Metrical(u15::new(480))),
        tracks,
    };
    let mut data = Vec::new();
    smf.write(&mut data).unwrap();
    data
}

// =============================================================================
// .chart conversion
// =============================================================================

#[test]
fn test_chart_single_tap() {
    let dir = tempdir().unwrap();
    let text = chart_text(&[("[ExpertSingle]", "  192 = N 0 0\n")]);
    let simfile = convert(dir.path(), "notes.chart", text.as_bytes());

    let expected = format!(
        "#BACKGROUND:background.png;\n#CDTITLE:album.png;\n#MUSIC:song.ogg;\n#BPMS:0=120.0;\n\
         {}     Challenge:\n     1:\n{}000000\n100000\n000000\n000000\n;\n",
        NOTES_HEADER, RADAR
    );
    assert_eq!(simfile, expected);
}

#[test]
fn test_chart_difficulty_order_and_empty_sections() {
    let dir = tempdir().unwrap();
    let text = chart_text(&[
        ("[EasySingle]", "  0 = N 1 0\n"),
        ("[ExpertSingle]", "  0 = N 4 0\n"),
        ("[MediumSingle]", ""),
    ]);
    let simfile = convert(dir.path(), "notes.chart", text.as_bytes());

    let challenge = simfile.find("     Challenge:").expect("Challenge block");
    let easy = simfile.find("     Easy:").expect("Easy block");
    assert!(challenge < easy, "Challenge must be written before Easy");
    assert!(!simfile.contains("     Medium:"), "Empty difficulty must be skipped");
    assert!(!simfile.contains("     Hard:"), "Missing difficulty must be skipped");
    assert_eq!(simfile.matches("#NOTES:").count(), 2);
}

#[test]
fn test_chart_metadata_and_audio() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("song.ini"),
        "[Song]\nname = Test Song\nArtist = Test Band\ncharter = Me\npreview_start_time = 1500\ndiff_guitar = 4\n",
    )
    .unwrap();
    fs::write(dir.path().join("guitar.ogg"), b"").unwrap();
    fs::write(dir.path().join("song.mp3"), b"").unwrap();

    let text = chart_text(&[("[HardSingle]", "  0 = N 7 0\n")]);
    let simfile = convert(dir.path(), "notes.chart", text.as_bytes());

    assert!(simfile.starts_with(
        "#TITLE:Test Song;\n#ARTIST:Test Band;\n#CREDIT:Me;\n#BACKGROUND:background.png;\n\
         #CDTITLE:album.png;\n#MUSIC:guitar.ogg;\n#SAMPLESTART:1.5;\n#BPMS:0=120.0;\n"
    ));
    assert!(simfile.contains("     Hard:\n     4:\n"));
    assert!(simfile.contains(&format!("{}000001\n;\n", RADAR)));
}

#[test]
fn test_chart_sustains_are_paired() {
    let body = "  0 = N 0 192\n  0 = N 3 0\n  96 = N 1 480\n  384 = N 7 96\n  768 = N 0 0\n  800 = N 4 1000\n";
    let chart = Chart::parse(chart_text(&[("[ExpertSingle]", body)])).unwrap();
    let timeline = chart.timeline(
        &ChartDifficulty::new("[ExpertSingle]", "Challenge"),
        &ConvertOptions::default(),
    );

    for lane in 0..NUM_LANES {
        let mut open: Option<Tick> = None;
        for (tick, lanes) in timeline.iter() {
            match lanes[lane] {
                NoteState::SustainStart => {
                    assert!(open.is_none(), "Nested sustain in lane {} at {}", lane, tick);
                    open = Some(tick);
                }
                NoteState::SustainEnd => {
                    assert!(open.take().is_some(), "Unmatched end in lane {} at {}", lane, tick);
                }
                NoteState::Tap => {
                    assert!(open.is_none(), "Tap inside sustain in lane {} at {}", lane, tick);
                }
                NoteState::Empty => {}
            }
        }
        assert!(open.is_none(), "Unclosed sustain in lane {}", lane);
    }

    assert_eq!(timeline.state(576, 1), NoteState::SustainEnd);
    assert_eq!(timeline.state(384, OPEN_LANE), NoteState::SustainStart);
    assert_eq!(timeline.state(480, OPEN_LANE), NoteState::SustainEnd);
    assert_eq!(timeline.last_tick(), 1801);
}

#[test]
fn test_chart_utf16_with_bom() {
    let dir = tempdir().unwrap();
    let text = chart_text(&[("[ExpertSingle]", "  0 = N 2 0\n")]);
    let mut data = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        data.extend_from_slice(&unit.to_le_bytes());
    }
    let simfile = convert(dir.path(), "notes.chart", &data);
    assert!(simfile.contains(&format!("{}001000\n;\n", RADAR)));
}

#[test]
fn test_chart_missing_resolution_writes_nothing() {
    let dir = tempdir().unwrap();
    let chart_path = dir.path().join("notes.chart");
    fs::write(&chart_path, "[Song]\n{\n  Name = \"x\"\n}\n[ExpertSingle]\n{\n  0 = N 0 0\n}\n").unwrap();

    let err = Converter::new().convert_file(&chart_path).unwrap_err();
    assert!(matches!(err, Error::MissingResolution));
    assert!(!dir.path().join("notes.sm").exists());
}

#[test]
fn test_unsupported_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "hello").unwrap();
    assert!(matches!(
        Converter::new().convert_file(&path).unwrap_err(),
        Error::UnsupportedChart(_)
    ));
}

// =============================================================================
// .mid conversion
// =============================================================================

const OPEN_ON_EXPERT: &[u8] = &[0x50, 0x53, 0, 0, 3, 1, 1, 0xF7];

#[test]
fn test_midi_conversion() {
    let dir = tempdir().unwrap();
    let data = midi_file(vec![
        vec![tempo(0, 500_000), tempo(960, 600_000), end_of_track()],
        vec![
            track_name("PART GUITAR"),
            note(0, 96, 100),
            note(0, 96, 0),
            note(960, 100, 100),
            note_off(960, 100), // half a measure: sustain
            end_of_track(),
        ],
    ]);
    let simfile = convert(dir.path(), "notes.mid", &data);

    assert!(simfile.contains("#BPMS:0=120.0,2=100.0;\n"));
    // sustain ends exactly on the next measure, which gets its own single row
    let expected_block = format!(
        "{}     Challenge:\n     1:\n{}100000\n000020\n,\n000030\n;\n",
        NOTES_HEADER, RADAR
    );
    assert!(
        simfile.contains(&expected_block),
        "Unexpected simfile:\n{}",
        simfile
    );
    assert!(!simfile.contains("     Hard:"));
}

#[test]
fn test_midi_sustain_end_on_measure_boundary() {
    let dir = tempdir().unwrap();
    let data = midi_file(vec![
        vec![tempo(0, 500_000), end_of_track()],
        vec![
            track_name("PART GUITAR"),
            note(0, 60, 100),
            note(1920, 60, 0),
            end_of_track(),
        ],
    ]);
    let simfile = convert(dir.path(), "notes.mid", &data);

    let expected_block = format!(
        "{}     Easy:\n     1:\n{}200000\n,\n300000\n;\n",
        NOTES_HEADER, RADAR
    );
    assert!(
        simfile.contains(&expected_block),
        "Unexpected simfile:\n{}",
        simfile
    );
}

#[test]
fn test_midi_open_note_reconstruction() {
    let dir = tempdir().unwrap();
    let data = midi_file(vec![
        vec![tempo(0, 500_000), end_of_track()],
        vec![
            track_name("PART GUITAR"),
            sysex(480, OPEN_ON_EXPERT),
            note(0, 96, 100),
            note(0, 96, 0),
            note(480, 97, 100),
            note(0, 97, 0),
            end_of_track(),
        ],
    ]);
    let simfile = convert(dir.path(), "notes.mid", &data);

    // open tap at beat 1, plain red at beat 2
    let expected_rows = format!("{}000000\n000001\n010000\n000000\n;\n", RADAR);
    assert!(
        simfile.contains(&expected_rows),
        "Unexpected simfile:\n{}",
        simfile
    );
}

#[test]
fn test_midi_fallback_track() {
    let dir = tempdir().unwrap();
    let data = midi_file(vec![
        vec![tempo(0, 500_000), end_of_track()],
        vec![track_name("PART VOCALS"), note(0, 96, 100), note(10, 96, 0), end_of_track()],
        vec![track_name("PART BASS"), note(0, 84, 100), note(10, 84, 0), end_of_track()],
    ]);
    let simfile = convert(dir.path(), "notes.mid", &data);
    assert!(simfile.contains("     Hard:"));
    assert!(!simfile.contains("     Challenge:"));
}

#[test]
fn test_midi_without_notes_track() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.mid");
    fs::write(
        &path,
        midi_file(vec![
            vec![tempo(0, 500_000), end_of_track()],
            vec![track_name("PART DRUMS"), end_of_track()],
        ]),
    )
    .unwrap();

    assert!(matches!(
        Converter::new().convert_file(&path).unwrap_err(),
        Error::NoNotesTrack
    ));
    assert!(!dir.path().join("notes.sm").exists());
}

#[test]
fn test_midi_zero_tempo_writes_nothing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.mid");
    fs::write(
        &path,
        midi_file(vec![
            vec![tempo(0, 500_000), tempo(1920, 0), end_of_track()],
            vec![track_name("PART GUITAR"), note(0, 96, 100), note(60, 96, 0), end_of_track()],
        ]),
    )
    .unwrap();

    assert!(matches!(
        Converter::new().convert_file(&path).unwrap_err(),
        Error::ZeroTempo(1920)
    ));
    assert!(!dir.path().join("notes.sm").exists());
}

#[test]
fn test_midi_corrupt_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.mid");
    fs::write(&path, b"MThd garbage").unwrap();
    assert!(matches!(
        Converter::new().convert_file(&path).unwrap_err(),
        Error::Midi(_)
    ));
}

// =============================================================================
// Directory scanning and options
// =============================================================================

#[test]
fn test_directory_scan_continues_past_failures() {
    let root = tempdir().unwrap();
    let good = root.path().join("Artist").join("Good Song");
    let bad = root.path().join("Bad Song");
    let both = root.path().join("Both");
    let empty = root.path().join("No Chart");
    for dir in [&good, &bad, &both, &empty] {
        fs::create_dir_all(dir).unwrap();
    }

    fs::write(
        good.join("notes.chart"),
        chart_text(&[("[ExpertSingle]", "  0 = N 0 0\n")]),
    )
    .unwrap();
    fs::write(bad.join("notes.chart"), "[Song]\n{\n}\n").unwrap();
    fs::write(
        both.join("notes.mid"),
        midi_file(vec![
            vec![tempo(0, 500_000), end_of_track()],
            vec![track_name("PART GUITAR"), note(0, 72, 100), note(10, 72, 0), end_of_track()],
        ]),
    )
    .unwrap();
    fs::write(both.join("notes.chart"), "not a chart").unwrap();

    let summary = Converter::new().scan_directory(root.path());

    assert_eq!(summary.converted.len(), 2);
    assert_eq!(summary.failed.len(), 1);
    assert!(matches!(summary.failed[0].1, Error::MissingResolution));
    assert!(good.join("notes.sm").is_file());
    assert!(!bad.join("notes.sm").exists());
    assert!(!empty.join("notes.sm").exists());

    let both_simfile = fs::read_to_string(both.join("notes.sm")).unwrap();
    assert!(both_simfile.contains("     Medium:"));
}

#[test]
fn test_custom_options() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.json");
    fs::write(
        &config,
        r#"{
            "output_file": "custom.sm",
            "chart_difficulties": [{ "section": "[ExpertDoubleBass]", "label": "Challenge" }]
        }"#,
    )
    .unwrap();
    let options = ConvertOptions::from_file(&config).unwrap();

    let chart_path = dir.path().join("notes.chart");
    fs::write(
        &chart_path,
        chart_text(&[
            ("[ExpertSingle]", "  0 = N 0 0\n"),
            ("[ExpertDoubleBass]", "  0 = N 1 0\n"),
        ]),
    )
    .unwrap();

    let output = Converter::with_options(options).convert_file(&chart_path).unwrap();
    assert_eq!(output.file_name().unwrap(), "custom.sm");
    let simfile = fs::read_to_string(output).unwrap();
    assert!(simfile.contains(&format!("{}010000\n;\n", RADAR)));
    assert_eq!(simfile.matches("#NOTES:").count(), 1);
}
