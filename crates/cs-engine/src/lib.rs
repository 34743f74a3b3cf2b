//! Synthesis and scheduling engine for chipscore.
//!
//! The scheduler walks a track's patterns and submits sound events to an
//! [`OutputBus`]; the [`Engine`] renders those events through a bounded
//! voice pool into stereo frames.

mod bus;
mod config;
mod envelope;
mod filter;
mod frame;
pub mod jingle;
mod mixer;
mod oscillator;
pub mod scheduler;
mod synth;
mod voice;
mod voice_pool;

pub use bus::{command_channel, BusHandle, Command, CommandQueue, GainTarget, OutputBus, Submix, COMMAND_CAPACITY};
pub use config::ScoreConfig;
pub use envelope::{Envelope, DECAY_FLOOR};
pub use frame::Frame;
pub use mixer::Engine;
pub use oscillator::{Oscillator, Source, Waveform};
pub use scheduler::{tick, Mode, SchedulerState, StepNotes, BAR_DURATION, STEP_DURATION};
pub use synth::{Ramp, Synth};
pub use voice::{SoundEvent, Voice};
pub use voice_pool::{VoiceKey, VoicePool, MAX_VOICES};
