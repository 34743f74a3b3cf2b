//! Engine and scheduler configuration.

use std::time::Duration;

use crate::bus::COMMAND_CAPACITY;
use crate::scheduler::LOOKAHEAD;
use crate::voice_pool::MAX_VOICES;

/// Tunables for a score player. Tempo and meter are fixed constants in
/// [`scheduler`](crate::scheduler) and are not configurable.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreConfig {
    /// How far ahead of the output clock steps are scheduled, in seconds.
    pub lookahead: f64,
    /// Period of the scheduler wake.
    pub wake_interval: Duration,
    /// Delay between `play()` and the first step, in seconds.
    pub start_delay: f64,
    /// Master volume restored on unmute, `[0, 1]`.
    pub master_volume: f32,
    /// Gain of the effects submix, `[0, 1]`.
    pub effects_gain: f32,
    /// Sample rate for offline rendering. Live output uses the device rate.
    pub sample_rate: u32,
    /// Voice pool size.
    pub max_voices: usize,
    /// Capacity of the control-to-audio command ring.
    pub command_capacity: usize,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            lookahead: LOOKAHEAD,
            wake_interval: Duration::from_millis(25),
            start_delay: 0.05,
            master_volume: 0.3,
            effects_gain: 0.5,
            sample_rate: 44100,
            max_voices: MAX_VOICES,
            command_capacity: COMMAND_CAPACITY,
        }
    }
}
