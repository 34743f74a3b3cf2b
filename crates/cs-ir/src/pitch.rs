//! Equal-tempered pitch table.
//!
//! Twelve-tone equal temperament with A4 = 440 Hz. A pitch maps to a MIDI
//! note number `(octave + 1) * 12 + class`, and the frequency is
//! `440 * 2^((midi - 69) / 12)`.

use core::fmt;

/// Highest octave covered by the table (octaves 0 through 7).
pub const MAX_OCTAVE: u8 = 7;

/// Frequencies of octave 0 (C0..B0) in Hz.
///
/// Higher octaves are exact power-of-two multiples, so every table entry
/// carries the precision of these twelve values.
const OCTAVE_ZERO_HZ: [f64; 12] = [
    16.351597831287414, // C
    17.323914436054505, // C#
    18.354047994837977, // D
    19.445436482630058, // D#
    20.601722307054366, // E
    21.826764464562746, // F
    23.12465141947715,  // F#
    24.499714748859326, // G
    25.956543598746574, // G#
    27.5,               // A
    29.13523509488062,  // A#
    30.86770632850775,  // B
];

/// One of the twelve chromatic pitch classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    /// All classes in chromatic order starting at C.
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Semitones above C (0-11).
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Sharp spelling of the class, e.g. `"F#"`.
    pub const fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }

    /// Parse a class name. Accepts sharps (`C#`) and flats (`Db`).
    pub fn from_name(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        let natural = match chars.next()? {
            'C' => 0i8,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return None,
        };
        let shift = match (chars.next(), chars.next()) {
            (None, _) => 0,
            (Some('#'), None) => 1,
            (Some('b'), None) => -1,
            _ => return None,
        };
        let index = (natural + shift).rem_euclid(12) as usize;
        Some(Self::ALL[index])
    }
}

/// A pitch class in a specific octave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pitch {
    pub class: PitchClass,
    pub octave: u8,
}

impl Pitch {
    pub const fn new(class: PitchClass, octave: u8) -> Self {
        Self { class, octave }
    }

    /// MIDI note number (C4 = 60, A4 = 69).
    pub const fn midi(self) -> u16 {
        (self.octave as u16 + 1) * 12 + self.class.index() as u16
    }

    /// Frequency in Hz, or `None` when the octave is outside the table.
    pub fn frequency(self) -> Option<f64> {
        frequency_of(self.class, self.octave)
    }

    /// Parse scientific pitch notation such as `E3`, `C#4` or `Bb2`.
    ///
    /// Returns `None` for anything that is not a class name followed by a
    /// single octave digit.
    pub fn parse(name: &str) -> Option<Self> {
        let split = name.len().checked_sub(1)?;
        if !name.is_char_boundary(split) {
            return None;
        }
        let (class, octave) = name.split_at(split);
        let octave = octave.chars().next()?.to_digit(10)? as u8;
        Some(Self::new(PitchClass::from_name(class)?, octave))
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class.name(), self.octave)
    }
}

/// Look up the frequency of `class` in `octave`.
///
/// Octaves above [`MAX_OCTAVE`] are a table miss and return `None`.
pub fn frequency_of(class: PitchClass, octave: u8) -> Option<f64> {
    if octave > MAX_OCTAVE {
        return None;
    }
    Some(OCTAVE_ZERO_HZ[class.index() as usize] * f64::from(1u32 << octave))
}

/// Look up a frequency by note name; unknown names return `None`.
pub fn frequency_of_name(name: &str) -> Option<f64> {
    Pitch::parse(name)?.frequency()
}
