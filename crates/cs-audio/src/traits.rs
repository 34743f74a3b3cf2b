//! Audio output trait and error types.

use thiserror::Error;

/// Error type for audio operations.
#[derive(Debug, Error)]
pub enum AudioError {
    /// Failed to initialize audio device
    #[error("device init error: {0}")]
    DeviceInit(String),
    /// Failed to create audio stream
    #[error("stream create error: {0}")]
    StreamCreate(String),
    /// Playback error
    #[error("playback error: {0}")]
    Playback(String),
    /// No audio device available
    #[error("no audio output device available")]
    NoDevice,
    /// `build_stream` was called twice
    #[error("output stream already built")]
    AlreadyBuilt,
}

/// Trait for audio output backends.
///
/// The backend owns the render side: once its stream is built it pulls
/// frames from the engine on its own thread until dropped.
pub trait AudioOutput {
    /// Get the sample rate.
    fn sample_rate(&self) -> u32;
}
