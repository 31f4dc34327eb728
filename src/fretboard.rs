use std::fmt;

use crate::theory::{NOTES_IN_OCTAVE, Pitch, Tuning};

/// A (string, fret) coordinate on the fretboard.
/// String 0 is the thinnest; fret 0 is the open string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub string: usize,
    pub fret: usize,
}

impl Position {
    pub fn new(string: usize, fret: usize) -> Self {
        Position { string, fret }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}f{}", self.string, self.fret)
    }
}

/// Enumerate every reachable position per string, with its sounding pitch.
/// Frets run 0..=nfrets; when the tuning is diatonic, frets whose chromatic
/// step falls outside the mode's scale are skipped. Pitches past the top of
/// the MIDI range end the string early.
pub fn possible_positions(tuning: &Tuning) -> Vec<Vec<(Position, Pitch)>> {
    let scale = tuning.diatonic().map(|mode| mode.scale());

    tuning
        .strings()
        .iter()
        .enumerate()
        .map(|(istring, open)| {
            let mut string_positions = Vec::with_capacity(tuning.nfrets() + 1);
            for fret in 0..=tuning.nfrets() {
                if let Some(scale) = &scale {
                    if !scale[fret % NOTES_IN_OCTAVE] {
                        continue;
                    }
                }
                let Some(pitch) = open.transpose(fret as u8) else {
                    break;
                };
                string_positions.push((Position::new(istring, fret), pitch));
            }
            string_positions
        })
        .collect()
}

/// Per-string reachable pitches only (the 4.1 contract shape).
pub fn possible_pitches(tuning: &Tuning) -> Vec<Vec<Pitch>> {
    possible_positions(tuning)
        .into_iter()
        .map(|string| string.into_iter().map(|(_, pitch)| pitch).collect())
        .collect()
}

/// Physical distance in the same unit as `scale_length` from the nut to
/// fret `n`, from the equal-tempered fret placement formula. Used for
/// real-world spacing, never as a graph edge weight.
pub fn fret_distance(fret: usize, scale_length: f64) -> f64 {
    scale_length * (1.0 - 2f64.powf(-(fret as f64) / 12.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::Mode;

    #[test]
    fn test_positions_chromatic() {
        let tuning = Tuning::standard();
        let positions = possible_positions(&tuning);
        assert_eq!(positions.len(), 6);
        for string in &positions {
            assert_eq!(string.len(), 21); // frets 0..=20
        }
        // Thick E string: open E2, fret 3 is G2
        let low_e = &positions[5];
        assert_eq!(low_e[0].1, Pitch::parse("E2").unwrap());
        assert_eq!(low_e[3].1, Pitch::parse("G2").unwrap());
        assert_eq!(low_e[3].0, Position::new(5, 3));

        // The pitch-only view matches
        let pitches = possible_pitches(&tuning);
        assert_eq!(pitches[5][3], Pitch::parse("G2").unwrap());
        assert_eq!(pitches[0][0], Pitch::parse("E4").unwrap());
    }

    #[test]
    fn test_positions_diatonic_skips_non_scale_frets() {
        let tuning = Tuning::from_names(&["E2"], 7, Some(Mode::Ionian)).unwrap();
        let positions = possible_positions(&tuning);
        let frets: Vec<usize> = positions[0].iter().map(|(p, _)| p.fret).collect();
        // Major scale steps over the widened 12-fret range
        assert_eq!(frets, vec![0, 2, 4, 5, 7, 9, 11, 12]);
    }

    #[test]
    fn test_positions_stop_at_midi_top() {
        let tuning = Tuning::from_names(&["G9"], 20, None).unwrap();
        let positions = possible_positions(&tuning);
        // G9 = 127, only the open string fits
        assert_eq!(positions[0].len(), 1);
    }

    #[test]
    fn test_fret_distance_known_values() {
        assert!((fret_distance(0, 650.0)).abs() < 0.1);
        assert!((fret_distance(10, 650.0) - 285.20).abs() < 0.1);
        assert!((fret_distance(0, 660.0)).abs() < 0.1);
        assert!((fret_distance(20, 660.0) - 452.11).abs() < 0.1);
    }

    #[test]
    fn test_fret_distance_monotonic() {
        let mut prev = -1.0;
        for fret in 0..=24 {
            let d = fret_distance(fret, 650.0);
            assert!(d > prev, "fret {fret} should be farther than fret {}", fret as i64 - 1);
            prev = d;
        }
    }
}
