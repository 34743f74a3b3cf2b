//! Step, pattern and bank types for score parts.

use arrayvec::ArrayVec;
use core::fmt;

use crate::notation::NotationError;
use crate::pitch::Pitch;

/// Number of steps in one bar (sixteenth notes in 4/4).
pub const STEPS_PER_BAR: usize = 16;

/// Maximum number of alternative patterns in a bank.
pub const MAX_VARIANTS: usize = 4;

/// An instrument part of the score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Part {
    Melody,
    Harmony,
    Bass,
    Drums,
}

impl Part {
    /// Parts in scheduling order.
    pub const ALL: [Part; 4] = [Part::Melody, Part::Harmony, Part::Bass, Part::Drums];

    pub const fn name(self) -> &'static str {
        match self {
            Part::Melody => "melody",
            Part::Harmony => "harmony",
            Part::Bass => "bass",
            Part::Drums => "drums",
        }
    }

    /// Whether steps of this part carry pitches rather than drum hits.
    pub const fn is_melodic(self) -> bool {
        !matches!(self, Part::Drums)
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A percussion hit in the drum part.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrumHit {
    Kick,
    Snare,
    HiHat,
}

impl DrumHit {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "K" => Some(DrumHit::Kick),
            "S" => Some(DrumHit::Snare),
            "H" => Some(DrumHit::HiHat),
            _ => None,
        }
    }
}

/// One sixteenth-note slot in a pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Step {
    /// Silence
    #[default]
    Rest,
    /// Pitched note (melody, harmony, bass)
    Note(Pitch),
    /// Drum hit (drum part only)
    Hit(DrumHit),
}

impl Step {
    pub const fn is_rest(self) -> bool {
        matches!(self, Step::Rest)
    }

    /// The pitch of a note step.
    pub const fn pitch(self) -> Option<Pitch> {
        match self {
            Step::Note(pitch) => Some(pitch),
            _ => None,
        }
    }

    /// The hit of a drum step.
    pub const fn hit(self) -> Option<DrumHit> {
        match self {
            Step::Hit(hit) => Some(hit),
            _ => None,
        }
    }
}

/// Exactly one bar of steps for a single part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    part: Part,
    steps: [Step; STEPS_PER_BAR],
}

impl Pattern {
    /// Build a pattern, rejecting steps that do not belong to `part`.
    pub fn new(part: Part, steps: [Step; STEPS_PER_BAR]) -> Result<Self, NotationError> {
        for (step, value) in steps.iter().enumerate() {
            match value {
                Step::Hit(_) if part.is_melodic() => {
                    return Err(NotationError::HitInMelodicPart { part, step });
                }
                Step::Note(_) if !part.is_melodic() => {
                    return Err(NotationError::NoteInDrumPart { step });
                }
                _ => {}
            }
        }
        Ok(Self { part, steps })
    }

    /// A bar of rests.
    pub const fn silent(part: Part) -> Self {
        Self { part, steps: [Step::Rest; STEPS_PER_BAR] }
    }

    pub fn part(&self) -> Part {
        self.part
    }

    /// Step at `index`, wrapped into the bar.
    pub fn step(&self, index: usize) -> Step {
        self.steps[index % STEPS_PER_BAR]
    }

    /// Number of steps that sound.
    pub fn event_count(&self) -> usize {
        self.steps.iter().filter(|s| !s.is_rest()).count()
    }
}

/// One to four alternative patterns for a part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternBank {
    part: Part,
    patterns: ArrayVec<Pattern, MAX_VARIANTS>,
}

impl PatternBank {
    pub fn new(part: Part, patterns: impl IntoIterator<Item = Pattern>) -> Result<Self, NotationError> {
        let mut bank = ArrayVec::new();
        let mut found = 0;
        for pattern in patterns {
            if pattern.part != part {
                return Err(NotationError::PartMismatch { expected: part, found: pattern.part });
            }
            found += 1;
            if found <= MAX_VARIANTS {
                bank.push(pattern);
            }
        }
        if found == 0 || found > MAX_VARIANTS {
            return Err(NotationError::BankSize { part, found, max: MAX_VARIANTS });
        }
        Ok(Self { part, patterns: bank })
    }

    /// A single-pattern bank of rests.
    pub fn silent(part: Part) -> Self {
        let mut patterns = ArrayVec::new();
        patterns.push(Pattern::silent(part));
        Self { part, patterns }
    }

    pub fn part(&self) -> Part {
        self.part
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Always false; a bank holds at least one pattern.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Pattern for an arrangement entry, applied modulo the bank size.
    pub fn variant(&self, variant: usize) -> &Pattern {
        &self.patterns[variant % self.patterns.len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }
}
