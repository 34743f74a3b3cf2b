//! Core IR types for chipscore.
//!
//! This crate defines the static musical data the scheduler reads: pitches,
//! steps, 16-step patterns, pattern banks, arrangements and tracks. Theme
//! data is compiled in as text notation and validated once at load.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod notation;
mod pattern;
mod pitch;
pub mod themes;
mod track;

pub use notation::{parse_pattern, NotationError};
pub use pattern::{DrumHit, Part, Pattern, PatternBank, Step, MAX_VARIANTS, STEPS_PER_BAR};
pub use pitch::{frequency_of, frequency_of_name, Pitch, PitchClass, MAX_OCTAVE};
pub use track::{Arrangement, PartBanks, Track, TrackCatalog, DEFAULT_THEME};
