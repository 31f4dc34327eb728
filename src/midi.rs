use std::fs;
use std::path::Path as FsPath;

use midly::{MidiMessage, Smf, TrackEventKind};
use thiserror::Error;

use crate::theory::{Pitch, Tuning};

#[derive(Error, Debug)]
pub enum MidiError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse MIDI file: {0}")]
    Parse(#[from] midly::Error),
}

/// Note starts are rounded to a multiple of this many ticks before
/// grouping, so slightly staggered attacks still land in one chord.
const QUANTIZE_BASE: u64 = 10;

/// MIDI channel 10 (0-based 9) is reserved for percussion.
const PERCUSSION_CHANNEL: u8 = 9;

/// Simultaneously-sounding pitches at one quantized tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    pub tick: u64,
    pub pitches: Vec<Pitch>,
}

/// Read a Standard MIDI File and extract its chord sequence.
pub fn load_chords(path: &FsPath) -> Result<Vec<Chord>, MidiError> {
    let bytes = fs::read(path).map_err(|source| MidiError::Io {
        path: path.display().to_string(),
        source,
    })?;
    extract_chords(&bytes)
}

/// Extract chords from SMF bytes: merge all non-percussion tracks, convert
/// deltas to absolute ticks, keep note-ons with nonzero velocity, quantize
/// start ticks, and group equal ticks into chords (pitches deduplicated).
pub fn extract_chords(bytes: &[u8]) -> Result<Vec<Chord>, MidiError> {
    let smf = Smf::parse(bytes)?;

    let mut notes: Vec<(u64, u8)> = Vec::new();
    for track in &smf.tracks {
        let mut tick: u64 = 0;
        for event in track {
            tick += u64::from(event.delta.as_int());
            let TrackEventKind::Midi { channel, message } = event.kind else {
                continue;
            };
            if channel.as_int() == PERCUSSION_CHANNEL {
                continue;
            }
            if let MidiMessage::NoteOn { key, vel } = message {
                // Velocity 0 is a note-off in disguise
                if vel.as_int() > 0 {
                    notes.push((tick, key.as_int()));
                }
            }
        }
    }

    // Sort by start tick (then pitch for a stable chord order); quantization
    // is monotone, so equal quantized ticks end up adjacent.
    notes.sort_unstable();

    let mut chords: Vec<Chord> = Vec::new();
    for (tick, key) in notes {
        let qtick = round_to_multiple(tick, QUANTIZE_BASE);
        let pitch = Pitch::new(key);
        match chords.last_mut() {
            Some(chord) if chord.tick == qtick => {
                if !chord.pitches.contains(&pitch) {
                    chord.pitches.push(pitch);
                }
            }
            _ => chords.push(Chord {
                tick: qtick,
                pitches: vec![pitch],
            }),
        }
    }

    log::info!("Extracted {} chords", chords.len());
    Ok(chords)
}

/// Drop pitches outside the tuning's reachable range, and chords emptied by
/// the drop, warning for each. Dropping keeps the remaining sequence
/// aligned; a chord that is in range but has no playable hand shape still
/// fails later in arranging.
pub fn filter_playable_range(chords: Vec<Chord>, tuning: &Tuning) -> Vec<Chord> {
    let (min, max) = tuning.pitch_bounds();

    chords
        .into_iter()
        .filter_map(|mut chord| {
            chord.pitches.retain(|pitch| {
                let in_range = (min..=max).contains(&pitch.midi());
                if !in_range {
                    log::warn!(
                        "dropping {pitch} at tick {}: outside tuning range {}-{}",
                        chord.tick,
                        Pitch::new(min),
                        Pitch::new(max)
                    );
                }
                in_range
            });
            if chord.pitches.is_empty() {
                log::warn!("chord at tick {} left empty, removed", chord.tick);
                None
            } else {
                Some(chord)
            }
        })
        .collect()
}

fn round_to_multiple(n: u64, base: u64) -> u64 {
    (n + base / 2) / base * base
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::num::{u4, u7, u15, u28};
    use midly::{Format, Header, Timing, TrackEvent};

    /// Build a single-track SMF from (delta, channel, key, vel) note-ons.
    fn smf_bytes(events: &[(u32, u8, u8, u8)]) -> Vec<u8> {
        let mut smf = Smf::new(Header::new(
            Format::SingleTrack,
            Timing::Metrical(u15::new(480)),
        ));
        let mut track = Vec::new();
        for &(delta, channel, key, vel) in events {
            track.push(TrackEvent {
                delta: u28::new(delta),
                kind: TrackEventKind::Midi {
                    channel: u4::new(channel),
                    message: MidiMessage::NoteOn {
                        key: u7::new(key),
                        vel: u7::new(vel),
                    },
                },
            });
        }
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(midly::MetaMessage::EndOfTrack),
        });
        smf.tracks.push(track);

        let mut bytes = Vec::new();
        smf.write(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_round_to_multiple() {
        assert_eq!(round_to_multiple(0, 10), 0);
        assert_eq!(round_to_multiple(4, 10), 0);
        assert_eq!(round_to_multiple(5, 10), 10);
        assert_eq!(round_to_multiple(11, 10), 10);
        assert_eq!(round_to_multiple(96, 10), 100);
    }

    #[test]
    fn test_extract_groups_simultaneous_notes() {
        // Two notes at tick 0, one at tick 480
        let bytes = smf_bytes(&[(0, 0, 40, 90), (0, 0, 45, 90), (480, 0, 43, 90)]);
        let chords = extract_chords(&bytes).unwrap();

        assert_eq!(chords.len(), 2);
        assert_eq!(chords[0].tick, 0);
        assert_eq!(
            chords[0].pitches,
            vec![Pitch::new(40), Pitch::new(45)]
        );
        assert_eq!(chords[1].pitches, vec![Pitch::new(43)]);
    }

    #[test]
    fn test_extract_quantizes_staggered_attacks() {
        // Ticks 0 and 4 both quantize to 0: one chord
        let bytes = smf_bytes(&[(0, 0, 40, 90), (4, 0, 45, 90)]);
        let chords = extract_chords(&bytes).unwrap();
        assert_eq!(chords.len(), 1);
        assert_eq!(chords[0].pitches.len(), 2);
    }

    #[test]
    fn test_extract_skips_percussion_and_silent_notes() {
        let bytes = smf_bytes(&[
            (0, 9, 36, 90),  // percussion channel
            (0, 0, 40, 0),   // note-on with velocity 0
            (10, 0, 45, 90), // the only real note
        ]);
        let chords = extract_chords(&bytes).unwrap();
        assert_eq!(chords.len(), 1);
        assert_eq!(chords[0].pitches, vec![Pitch::new(45)]);
    }

    #[test]
    fn test_extract_dedups_chord_pitches() {
        let bytes = smf_bytes(&[(0, 0, 40, 90), (0, 1, 40, 90)]);
        let chords = extract_chords(&bytes).unwrap();
        assert_eq!(chords.len(), 1);
        assert_eq!(chords[0].pitches, vec![Pitch::new(40)]);
    }

    #[test]
    fn test_extract_rejects_garbage() {
        assert!(extract_chords(b"not a midi file").is_err());
    }

    #[test]
    fn test_filter_playable_range() {
        let tuning = Tuning::standard(); // E2..E4+20
        let chords = vec![
            Chord {
                tick: 0,
                pitches: vec![Pitch::new(40), Pitch::new(20)], // E2 + out of range
            },
            Chord {
                tick: 10,
                pitches: vec![Pitch::new(20)], // entirely out of range
            },
        ];
        let filtered = filter_playable_range(chords, &tuning);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].pitches, vec![Pitch::new(40)]);
    }
}
