use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TheoryError {
    #[error("invalid note name \"{0}\"")]
    InvalidNote(String),
    #[error("unknown diatonic mode \"{0}\"")]
    UnknownMode(String),
    #[error("invalid tuning: {0}")]
    InvalidTuning(String),
}

/// Semitones per octave.
pub const NOTES_IN_OCTAVE: usize = 12;

/// Pitch-class names, chromatic from C.
const DEGREE_NAMES: [&str; NOTES_IN_OCTAVE] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A pitch as a MIDI note number (0-127). Middle C (C4) is 60.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pitch(u8);

impl Pitch {
    pub fn new(midi: u8) -> Self {
        Pitch(midi)
    }

    pub fn midi(self) -> u8 {
        self.0
    }

    /// Pitch class name, e.g. "C#" for 61.
    pub fn degree(self) -> &'static str {
        DEGREE_NAMES[self.0 as usize % NOTES_IN_OCTAVE]
    }

    /// Scientific octave number. MIDI 0 is octave -1, so C4 = 60.
    pub fn octave(self) -> i8 {
        (self.0 / 12) as i8 - 1
    }

    /// Semitone offset above the nearest C below, 0-11.
    pub fn pitch_class(self) -> usize {
        self.0 as usize % NOTES_IN_OCTAVE
    }

    /// Pitch shifted up by `semitones`, or None past the top of MIDI range.
    pub fn transpose(self, semitones: u8) -> Option<Pitch> {
        let midi = self.0.checked_add(semitones)?;
        (midi <= 127).then_some(Pitch(midi))
    }

    /// Parse a note name like "E2", "C#4", or "Bb3".
    pub fn parse(name: &str) -> Result<Self, TheoryError> {
        let name = name.trim();
        let err = || TheoryError::InvalidNote(name.to_string());

        if !name.is_ascii() || name.is_empty() {
            return Err(err());
        }
        let (class, octave_str) = if name.len() >= 2 && matches!(&name[1..2], "#" | "b") {
            (&name[0..2], &name[2..])
        } else {
            (&name[0..1], &name[1..])
        };

        let base: i16 = match class {
            "C" => 0,
            "C#" | "Db" => 1,
            "D" => 2,
            "D#" | "Eb" => 3,
            "E" => 4,
            "F" => 5,
            "F#" | "Gb" => 6,
            "G" => 7,
            "G#" | "Ab" => 8,
            "A" => 9,
            "A#" | "Bb" => 10,
            "B" => 11,
            _ => return Err(err()),
        };

        let octave: i16 = octave_str.parse().map_err(|_| err())?;
        let midi = (octave + 1) * 12 + base;
        if !(0..=127).contains(&midi) {
            return Err(err());
        }
        Ok(Pitch(midi as u8))
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.degree(), self.octave())
    }
}

/// Split a compact run of note names like "E2A2D3G3B3E4" or "D#2G#2C#3F#3"
/// into individual names. Each note is a letter, an optional accidental,
/// and an octave number.
pub fn split_note_names(s: &str) -> Result<Vec<String>, TheoryError> {
    let err = || TheoryError::InvalidNote(s.to_string());
    if !s.is_ascii() {
        return Err(err());
    }

    let bytes = s.trim().as_bytes();
    let mut names = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_uppercase() {
            return Err(err());
        }
        let start = i;
        i += 1;
        if i < bytes.len() && matches!(bytes[i], b'#' | b'b') {
            i += 1;
        }
        let digits_start = i;
        if i < bytes.len() && bytes[i] == b'-' {
            i += 1;
        }
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == digits_start {
            return Err(err());
        }
        names.push(String::from_utf8_lossy(&bytes[start..i]).into_owned());
    }
    if names.is_empty() {
        return Err(err());
    }
    Ok(names)
}

/// Major-scale interval mask, chromatic steps from the root.
/// True entries are the 7 diatonic steps (W-W-H-W-W-W-H).
pub const DIATONIC_MASK: [bool; NOTES_IN_OCTAVE] = [
    true, false, true, false, true, true, false, true, false, true, false, true,
];

/// Diatonic modes as rotation offsets into the interval mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Ionian = 0,
    Dorian = 2,
    Phrygian = 4,
    Lydian = 5,
    Mixolydian = 7,
    Aeolian = 9,
    Locrian = 10,
}

impl Mode {
    pub fn from_str(s: &str) -> Result<Self, TheoryError> {
        match s.trim().to_lowercase().as_str() {
            "ionian" => Ok(Mode::Ionian),
            "dorian" => Ok(Mode::Dorian),
            "phrygian" => Ok(Mode::Phrygian),
            "lydian" => Ok(Mode::Lydian),
            "mixolydian" => Ok(Mode::Mixolydian),
            "aeolian" => Ok(Mode::Aeolian),
            "locrian" => Ok(Mode::Locrian),
            other => Err(TheoryError::UnknownMode(other.to_string())),
        }
    }

    /// The interval mask rotated to start at this mode's offset.
    pub fn scale(self) -> [bool; NOTES_IN_OCTAVE] {
        let offset = self as usize;
        std::array::from_fn(|i| DIATONIC_MASK[(offset + i) % NOTES_IN_OCTAVE])
    }
}

/// Open-string pitches plus fret count, optionally constrained to a
/// diatonic scale. Strings are ordered thin to thick.
#[derive(Debug, Clone)]
pub struct Tuning {
    strings: Vec<Pitch>,
    nfrets: usize,
    diatonic: Option<Mode>,
}

impl Tuning {
    /// Build a validated tuning. When a diatonic mode is given, the fret
    /// count is scaled by 12/7 so the constrained fretboard spans a
    /// comparable pitch range to the chromatic one.
    pub fn new(
        strings: Vec<Pitch>,
        nfrets: usize,
        diatonic: Option<Mode>,
    ) -> Result<Self, TheoryError> {
        if strings.is_empty() {
            return Err(TheoryError::InvalidTuning(
                "tuning must have at least one string".into(),
            ));
        }
        let nfrets = if diatonic.is_some() {
            let in_scale = DIATONIC_MASK.iter().filter(|s| **s).count();
            nfrets * NOTES_IN_OCTAVE / in_scale
        } else {
            nfrets
        };
        Ok(Tuning {
            strings,
            nfrets,
            diatonic,
        })
    }

    /// Parse from note names ordered thin to thick, e.g. ["E4","B3",...].
    pub fn from_names(
        names: &[&str],
        nfrets: usize,
        diatonic: Option<Mode>,
    ) -> Result<Self, TheoryError> {
        let strings = names
            .iter()
            .map(|n| Pitch::parse(n))
            .collect::<Result<Vec<_>, _>>()?;
        Tuning::new(strings, nfrets, diatonic)
    }

    /// Standard 6-string guitar, 20 frets.
    pub fn standard() -> Self {
        Tuning::from_names(crate::STANDARD_TUNING, 20, None)
            .expect("standard tuning is valid")
    }

    pub fn strings(&self) -> &[Pitch] {
        &self.strings
    }

    pub fn nstrings(&self) -> usize {
        self.strings.len()
    }

    pub fn nfrets(&self) -> usize {
        self.nfrets
    }

    pub fn diatonic(&self) -> Option<Mode> {
        self.diatonic
    }

    /// Lowest and highest reachable MIDI note numbers.
    pub fn pitch_bounds(&self) -> (u8, u8) {
        let min = self.strings.iter().map(|p| p.midi()).min().unwrap_or(0);
        let max = self
            .strings
            .iter()
            .map(|p| p.midi() as usize + self.nfrets)
            .max()
            .unwrap_or(0)
            .min(127) as u8;
        (min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_names() {
        assert_eq!(Pitch::new(60).to_string(), "C4");
        assert_eq!(Pitch::new(61).degree(), "C#");
        assert_eq!(Pitch::new(40).to_string(), "E2");
        assert_eq!(Pitch::new(0).octave(), -1);
    }

    #[test]
    fn test_pitch_parse_roundtrip() {
        for midi in [0u8, 40, 45, 60, 61, 127] {
            let p = Pitch::new(midi);
            assert_eq!(Pitch::parse(&p.to_string()).unwrap(), p);
        }
    }

    #[test]
    fn test_pitch_parse_flats_and_errors() {
        assert_eq!(Pitch::parse("Bb3").unwrap(), Pitch::parse("A#3").unwrap());
        assert_eq!(Pitch::parse(" E2 ").unwrap().midi(), 40);
        assert!(Pitch::parse("H2").is_err());
        assert!(Pitch::parse("E").is_err());
        assert!(Pitch::parse("").is_err());
        assert_eq!(Pitch::parse("C9").unwrap().midi(), 120); // still in range
        assert!(Pitch::parse("C10").is_err()); // 132, above MIDI 127
    }

    #[test]
    fn test_split_note_names() {
        assert_eq!(
            split_note_names("E2A2D3G3B3E4").unwrap(),
            vec!["E2", "A2", "D3", "G3", "B3", "E4"]
        );
        assert_eq!(
            split_note_names("D#2G#2").unwrap(),
            vec!["D#2", "G#2"]
        );
        assert_eq!(split_note_names("A-1C0").unwrap(), vec!["A-1", "C0"]);
        assert!(split_note_names("").is_err());
        assert!(split_note_names("E").is_err());
        assert!(split_note_names("2E").is_err());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(Mode::from_str("ionian").unwrap(), Mode::Ionian);
        assert_eq!(Mode::from_str(" Aeolian ").unwrap(), Mode::Aeolian);
        assert!(Mode::from_str("hypermixolydian").is_err());
    }

    #[test]
    fn test_mode_scale_rotation() {
        // Ionian is the base mask itself
        assert_eq!(Mode::Ionian.scale(), DIATONIC_MASK);
        // Every mode keeps 7 steps in the octave
        for mode in [
            Mode::Ionian,
            Mode::Dorian,
            Mode::Phrygian,
            Mode::Lydian,
            Mode::Mixolydian,
            Mode::Aeolian,
            Mode::Locrian,
        ] {
            assert_eq!(mode.scale().iter().filter(|s| **s).count(), 7);
        }
        // Dorian starts two steps in: first interval is a whole step
        let dorian = Mode::Dorian.scale();
        assert!(dorian[0] && !dorian[1] && dorian[2]);
    }

    #[test]
    fn test_tuning_rejects_empty() {
        assert!(Tuning::new(vec![], 20, None).is_err());
    }

    #[test]
    fn test_tuning_standard() {
        let t = Tuning::standard();
        assert_eq!(t.nstrings(), 6);
        assert_eq!(t.nfrets(), 20);
        // Thin to thick: E4 down to E2
        assert_eq!(t.strings()[0].midi(), 64);
        assert_eq!(t.strings()[5].midi(), 40);
        assert_eq!(t.pitch_bounds(), (40, 84));
    }

    #[test]
    fn test_diatonic_fret_scaling() {
        let t = Tuning::from_names(&["E2"], 7, Some(Mode::Ionian)).unwrap();
        // 7 chromatic frets widen to 12 diatonic slots
        assert_eq!(t.nfrets(), 12);
    }
}
