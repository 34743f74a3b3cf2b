//! CPAL-based audio output backend.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use cs_engine::Engine;
use tracing::{debug, error};

use crate::traits::{AudioError, AudioOutput};

/// CPAL-based audio output. The engine renders directly in the device
/// callback; the control side reaches it through the engine's command ring.
pub struct CpalOutput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
}

impl CpalOutput {
    /// Create a new CPAL output with default device.
    pub fn new() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceInit(e.to_string()))?;

        let mut config: StreamConfig = config.into();
        // Engine frames are stereo
        config.channels = 2;

        Ok(Self {
            device,
            config,
            stream: None,
        })
    }

    /// Move `engine` onto the device thread and start the stream.
    pub fn build_stream(&mut self, mut engine: Engine) -> Result<(), AudioError> {
        if self.stream.is_some() {
            return Err(AudioError::AlreadyBuilt);
        }
        let channels = self.config.channels as usize;

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| render(&mut engine, data, channels),
                |err| error!("audio stream error: {}", err),
                None,
            )
            .map_err(|e| AudioError::StreamCreate(e.to_string()))?;

        stream.play().map_err(|e| AudioError::Playback(e.to_string()))?;
        self.stream = Some(stream);
        debug!(sample_rate = self.config.sample_rate.0, channels, "audio stream started");

        Ok(())
    }
}

#[cfg(feature = "alloc_check")]
fn render(engine: &mut Engine, data: &mut [f32], channels: usize) {
    assert_no_alloc::assert_no_alloc(|| engine.render_interleaved(data, channels));
}

#[cfg(not(feature = "alloc_check"))]
fn render(engine: &mut Engine, data: &mut [f32], channels: usize) {
    engine.render_interleaved(data, channels);
}

impl AudioOutput for CpalOutput {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }
}
