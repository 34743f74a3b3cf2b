//! Main render engine.
//!
//! Owns the voice pool and the sample clock, and mixes voices through the
//! music and effects submixes into the master gain. The engine is itself an
//! [`OutputBus`]; attached to a command ring with [`Engine::connect`] it can
//! run on the audio thread while the control side talks to a [`BusHandle`].

use crate::bus::{command_channel, BusHandle, Command, CommandQueue, GainTarget, OutputBus, Submix};
use crate::config::ScoreConfig;
use crate::frame::Frame;
use crate::voice::{SoundEvent, Voice};
use crate::voice_pool::{VoicePool, MAX_VOICES};

/// Seed increment between voices (golden-ratio constant).
const SEED_STEP: u64 = 0x9E37_79B9_7F4A_7C15;

/// The render engine.
pub struct Engine {
    pool: VoicePool,
    /// Audio sample rate (e.g., 44100)
    sample_rate: u32,
    /// Frames rendered so far
    clock: u64,
    master_gain: f32,
    music_gain: f32,
    effects_gain: f32,
    next_seed: u64,
    commands: Option<CommandQueue>,
}

impl Engine {
    /// Create an engine with the default voice limit and unity gains.
    pub fn new(sample_rate: u32) -> Self {
        Self::with_voices(sample_rate, MAX_VOICES)
    }

    pub fn with_voices(sample_rate: u32, max_voices: usize) -> Self {
        Self {
            pool: VoicePool::with_capacity(max_voices),
            sample_rate: sample_rate.max(1),
            clock: 0,
            master_gain: 1.0,
            music_gain: 1.0,
            effects_gain: 1.0,
            next_seed: 1,
            commands: None,
        }
    }

    /// Engine sized and gained from `config`, rendering at `sample_rate`.
    pub fn from_config(config: &ScoreConfig, sample_rate: u32) -> Self {
        let mut engine = Self::with_voices(sample_rate, config.max_voices);
        engine.master_gain = config.master_volume.clamp(0.0, 1.0);
        engine.effects_gain = config.effects_gain.clamp(0.0, 1.0);
        engine
    }

    /// Attach a fresh command ring and return its control-side handle.
    pub fn connect(&mut self, capacity: usize) -> BusHandle {
        let (handle, queue) = command_channel(capacity, self.sample_rate);
        queue.publish(self.clock);
        self.commands = Some(queue);
        handle
    }

    /// Frames rendered so far.
    pub fn position(&self) -> u64 {
        self.clock
    }

    pub fn voice_count(&self) -> usize {
        self.pool.active_count()
    }

    pub fn gain(&self, target: GainTarget) -> f32 {
        match target {
            GainTarget::Master => self.master_gain,
            GainTarget::Submix(Submix::Music) => self.music_gain,
            GainTarget::Submix(Submix::Effects) => self.effects_gain,
        }
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Play(event) => self.start_voice(&event),
            Command::SetGain(target, gain) => {
                let gain = if gain.is_finite() { gain.clamp(0.0, 1.0) } else { 0.0 };
                match target {
                    GainTarget::Master => self.master_gain = gain,
                    GainTarget::Submix(Submix::Music) => self.music_gain = gain,
                    GainTarget::Submix(Submix::Effects) => self.effects_gain = gain,
                }
            }
        }
    }

    fn start_voice(&mut self, event: &SoundEvent) {
        if !event.is_audible() {
            return;
        }
        let seed = self.next_seed;
        self.next_seed = self.next_seed.wrapping_add(SEED_STEP);
        let voice = Voice::new(event, self.sample_rate, self.clock, seed);
        self.pool.start(voice, self.clock);
    }

    fn drain_commands(&mut self) {
        if let Some(mut queue) = self.commands.take() {
            while let Some(command) = queue.pop() {
                self.apply(command);
            }
            self.commands = Some(queue);
        }
    }

    fn publish_clock(&self) {
        if let Some(queue) = &self.commands {
            queue.publish(self.clock);
        }
    }

    /// Render a single frame. Pending commands are not drained.
    pub fn render_frame(&mut self) -> Frame {
        let sums = self.pool.render(self.clock);
        let mix = (sums.music * self.music_gain + sums.effects * self.effects_gain) * self.master_gain;
        self.clock += 1;
        self.pool.reap_finished(self.clock);
        Frame::from_f32(mix)
    }

    /// Drain commands, fill `out`, then publish the clock.
    pub fn render_block(&mut self, out: &mut [Frame]) {
        self.drain_commands();
        for frame in out.iter_mut() {
            *frame = self.render_frame();
        }
        self.publish_clock();
    }

    /// Render `count` frames into a new buffer.
    pub fn render_frames(&mut self, count: usize) -> Vec<Frame> {
        let mut frames = vec![Frame::silence(); count];
        self.render_block(&mut frames);
        frames
    }

    /// Render into an interleaved float buffer as handed out by the device.
    /// Channels beyond the second are zero-filled.
    pub fn render_interleaved(&mut self, out: &mut [f32], channels: usize) {
        self.drain_commands();
        for chunk in out.chunks_mut(channels.max(1)) {
            let (left, right) = self.render_frame().to_f32();
            for (i, sample) in chunk.iter_mut().enumerate() {
                *sample = match i {
                    0 => left,
                    1 => right,
                    _ => 0.0,
                };
            }
        }
        self.publish_clock();
    }
}

impl OutputBus for Engine {
    fn now(&self) -> f64 {
        self.clock as f64 / self.sample_rate as f64
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn submit(&mut self, event: SoundEvent) {
        self.start_voice(&event);
    }

    fn set_gain(&mut self, target: GainTarget, gain: f32) {
        self.apply(Command::SetGain(target, gain));
    }
}
