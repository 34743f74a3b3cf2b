//! Text notation for patterns.
//!
//! A pattern is written as 16 whitespace-separated tokens. `.` is a rest.
//! Melodic parts use pitch names (`E3`, `F#4`); the drum part uses `K`, `S`
//! and `H` for kick, snare and hihat. A melodic token that is not a known
//! pitch plays as a rest.

use alloc::boxed::Box;
use alloc::string::{String, ToString};

use crate::pattern::{DrumHit, Part, Pattern, Step, STEPS_PER_BAR};
use crate::pitch::Pitch;

/// Errors raised while loading pattern and theme data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    #[error("pattern has {found} steps, expected {expected}")]
    WrongLength { expected: usize, found: usize },
    #[error("drum hit at step {step} of a {part} pattern")]
    HitInMelodicPart { part: Part, step: usize },
    #[error("note at step {step} of a drum pattern")]
    NoteInDrumPart { step: usize },
    #[error("unknown drum token `{token}` at step {step}")]
    UnknownDrum { token: String, step: usize },
    #[error("{part} bank holds {found} patterns, expected 1 to {max}")]
    BankSize { part: Part, found: usize, max: usize },
    #[error("{found} pattern placed in the {expected} bank")]
    PartMismatch { expected: Part, found: Part },
    #[error("transition fill must be a drum pattern, got {0}")]
    FillNotDrums(Part),
    #[error("arrangement is empty")]
    EmptyArrangement,
    #[error("arrangement entry {value} at bar {bar} is not below {max}")]
    VariantOutOfRange { bar: usize, value: u8, max: usize },
    #[error("catalog has no `{0}` theme")]
    MissingDefault(&'static str),
    #[error("theme `{theme}`: {source}")]
    Theme {
        theme: String,
        #[source]
        source: Box<NotationError>,
    },
}

impl NotationError {
    /// Attach the theme being loaded to an error.
    pub fn in_theme(self, theme: &str) -> Self {
        NotationError::Theme { theme: theme.to_string(), source: Box::new(self) }
    }
}

/// Parse one bar of notation for `part`.
pub fn parse_pattern(part: Part, text: &str) -> Result<Pattern, NotationError> {
    let found = text.split_whitespace().count();
    if found != STEPS_PER_BAR {
        return Err(NotationError::WrongLength { expected: STEPS_PER_BAR, found });
    }

    let mut steps = [Step::Rest; STEPS_PER_BAR];
    for (index, token) in text.split_whitespace().enumerate() {
        steps[index] = parse_step(part, index, token)?;
    }
    Pattern::new(part, steps)
}

fn parse_step(part: Part, step: usize, token: &str) -> Result<Step, NotationError> {
    if token == "." {
        return Ok(Step::Rest);
    }
    if let Some(hit) = DrumHit::from_symbol(token) {
        return match part {
            Part::Drums => Ok(Step::Hit(hit)),
            _ => Err(NotationError::HitInMelodicPart { part, step }),
        };
    }
    match (part, Pitch::parse(token)) {
        (Part::Drums, Some(_)) => Err(NotationError::NoteInDrumPart { step }),
        (Part::Drums, None) => Err(NotationError::UnknownDrum { token: token.to_string(), step }),
        (_, Some(pitch)) if pitch.frequency().is_some() => Ok(Step::Note(pitch)),
        // Unknown pitch names sound as rests
        (_, _) => Ok(Step::Rest),
    }
}
