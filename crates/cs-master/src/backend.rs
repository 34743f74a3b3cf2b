//! Output backends the controller opens lazily on first use.

use cs_audio::{AudioError, AudioOutput, CpalOutput};
use cs_engine::{BusHandle, Engine, GainTarget, OutputBus, ScoreConfig, SoundEvent};

/// Something that can produce an [`OutputBus`].
pub trait Backend {
    type Bus: OutputBus;

    /// Open the output. Called at most once per controller.
    fn open(&mut self, config: &ScoreConfig) -> Result<Self::Bus, AudioError>;
}

/// The default audio device through cpal.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpalBackend;

impl Backend for CpalBackend {
    type Bus = LiveBus;

    fn open(&mut self, config: &ScoreConfig) -> Result<LiveBus, AudioError> {
        let mut output = CpalOutput::new()?;
        let mut engine = Engine::from_config(config, output.sample_rate());
        let handle = engine.connect(config.command_capacity);
        output.build_stream(engine)?;
        Ok(LiveBus { handle, _output: output })
    }
}

/// Bus into a running device stream. Dropping it closes the stream.
pub struct LiveBus {
    handle: BusHandle,
    _output: CpalOutput,
}

impl OutputBus for LiveBus {
    fn now(&self) -> f64 {
        self.handle.now()
    }

    fn sample_rate(&self) -> u32 {
        self.handle.sample_rate()
    }

    fn submit(&mut self, event: SoundEvent) {
        self.handle.submit(event);
    }

    fn set_gain(&mut self, target: GainTarget, gain: f32) {
        self.handle.set_gain(target, gain);
    }
}

/// In-process engine with a virtual clock that only advances when the
/// caller renders.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineBackend {
    /// Overrides [`ScoreConfig::sample_rate`].
    pub sample_rate: Option<u32>,
}

impl Backend for OfflineBackend {
    type Bus = Engine;

    fn open(&mut self, config: &ScoreConfig) -> Result<Engine, AudioError> {
        let sample_rate = self.sample_rate.unwrap_or(config.sample_rate);
        Ok(Engine::from_config(config, sample_rate))
    }
}
