//! Headless controller for the chipscore adaptive music engine.
//!
//! Provides a unified API for playback, intensity changes, one-shot cues
//! and offline rendering that both a game host and the CLI can share.

mod backend;
mod render;
mod wake;

use cs_engine::{jingle, scheduler, GainTarget, Mode, OutputBus, SchedulerState};
use std::sync::Arc;
use tracing::{debug, error, warn};

// Re-export common types so callers don't need cs-ir/cs-engine directly.
pub use cs_audio::AudioError;
pub use cs_engine::{Engine, Frame, ScoreConfig, Submix};
pub use cs_ir::{Track, TrackCatalog, DEFAULT_THEME};

pub use backend::{Backend, CpalBackend, LiveBus, OfflineBackend};
pub use render::{frames_to_wav, render_frames, render_to_wav, write_wav, RenderError, RenderPlan};
pub use wake::{IntervalWake, ManualWake, WakeSource};

enum Output<B> {
    Closed,
    Open(B),
    /// Opening failed once; never retried.
    Unavailable,
}

/// Adaptive score controller: owns the track catalog, the scheduler state
/// and the lazily opened output.
///
/// No method returns an error. When the output cannot be opened the
/// failure is logged once and every later call quietly does nothing.
pub struct Controller<K: Backend = CpalBackend, W: WakeSource = IntervalWake> {
    backend: K,
    wake: W,
    output: Output<K::Bus>,
    config: ScoreConfig,
    catalog: TrackCatalog,
    selected: Arc<Track>,
    scheduler: Option<SchedulerState>,
    volume: f32,
    muted: bool,
    /// Last `set_drums` request; applied again on every `play`.
    intensity_requested: bool,
}

impl Controller {
    /// Controller for the default audio device.
    pub fn new() -> Self {
        Self::with_config(ScoreConfig::default())
    }

    pub fn with_config(config: ScoreConfig) -> Self {
        Self::with_parts(CpalBackend, IntervalWake::new(), config)
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Backend, W: WakeSource> Controller<K, W> {
    /// Controller over an arbitrary backend and wake source.
    pub fn with_parts(backend: K, wake: W, config: ScoreConfig) -> Self {
        let catalog = TrackCatalog::builtin().unwrap_or_else(|e| {
            error!("built-in themes failed to load: {}", e);
            TrackCatalog::silent()
        });
        let selected = catalog.default_track().clone();
        let volume = sanitize_level(config.master_volume);
        Self {
            backend,
            wake,
            output: Output::Closed,
            config,
            catalog,
            selected,
            scheduler: None,
            volume,
            muted: false,
            intensity_requested: false,
        }
    }

    // --- Output ---

    fn ensure_output(&mut self) -> Option<&mut K::Bus> {
        if let Output::Closed = self.output {
            self.output = match self.backend.open(&self.config) {
                Ok(mut bus) => {
                    debug!(sample_rate = bus.sample_rate(), "output opened");
                    bus.set_gain(GainTarget::Master, effective_gain(self.volume, self.muted));
                    Output::Open(bus)
                }
                Err(e) => {
                    warn!("audio output unavailable, music disabled: {}", e);
                    Output::Unavailable
                }
            };
        }
        match &mut self.output {
            Output::Open(bus) => Some(bus),
            Output::Closed | Output::Unavailable => None,
        }
    }

    /// The shared output bus, opened on first use.
    ///
    /// Sound-effect producers submit with [`Submix::Effects`] and set their
    /// own level with `set_gain(GainTarget::Submix(Submix::Effects), ..)`.
    pub fn output_bus(&mut self) -> Option<&mut K::Bus> {
        self.ensure_output()
    }

    /// True once opening the output has failed.
    pub fn is_unavailable(&self) -> bool {
        matches!(self.output, Output::Unavailable)
    }

    fn apply_master(&mut self) {
        let gain = effective_gain(self.volume, self.muted);
        if let Output::Open(bus) = &mut self.output {
            bus.set_gain(GainTarget::Master, gain);
        }
    }

    // --- Transport ---

    /// Start the score at bar 0, step 0. No-op while already playing.
    pub fn play(&mut self) {
        if self.scheduler.is_some() {
            return;
        }
        let Some(now) = self.ensure_output().map(|bus| bus.now()) else {
            return;
        };
        let start = now + self.config.start_delay;

        let mut state = SchedulerState::new(self.selected.clone(), start);
        if self.intensity_requested {
            state.enable_intensity();
        }
        self.scheduler = Some(state);
        self.wake.arm(self.config.wake_interval);
        debug!(track = self.selected.name(), start, "playback started");
        self.tick();
    }

    /// Stop scheduling. Events already submitted play out.
    pub fn stop(&mut self) {
        if self.scheduler.take().is_some() {
            debug!("playback stopped");
        }
        self.wake.cancel();
    }

    pub fn is_playing(&self) -> bool {
        self.scheduler.is_some()
    }

    /// Fill the lookahead window now. Returns the number of steps scheduled.
    pub fn tick(&mut self) -> usize {
        match (self.scheduler.as_mut(), &mut self.output) {
            (Some(state), Output::Open(bus)) => scheduler::tick(state, bus, self.config.lookahead),
            _ => 0,
        }
    }

    /// Poll the wake source and tick if it fired.
    pub fn pump(&mut self) -> usize {
        if self.scheduler.is_some() && self.wake.fired() {
            self.tick()
        } else {
            0
        }
    }

    pub fn wake(&self) -> &W {
        &self.wake
    }

    pub fn wake_mut(&mut self) -> &mut W {
        &mut self.wake
    }

    // --- Volume ---

    /// Store a master level in `[0, 1]`. Applied immediately unless muted.
    pub fn set_volume(&mut self, level: f32) {
        self.volume = sanitize_level(level);
        self.apply_master();
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Flip the mute state and return the new one.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.apply_master();
        self.muted
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    // --- Score inputs ---

    /// Select a theme. Unknown ids fall back to the default theme.
    pub fn set_track(&mut self, theme: &str) {
        let track = match self.catalog.get(theme) {
            Some(track) => track.clone(),
            None => {
                debug!(theme, "unknown theme, using default");
                self.catalog.default_track().clone()
            }
        };
        self.selected = track.clone();
        if let Some(state) = self.scheduler.as_mut() {
            state.select_track(track);
        }
    }

    pub fn selected_track(&self) -> &str {
        self.selected.name()
    }

    pub fn catalog(&self) -> &TrackCatalog {
        &self.catalog
    }

    /// `true` requests escalation at the next bar; `false` drops to ambient
    /// immediately.
    pub fn set_drums(&mut self, enabled: bool) {
        self.intensity_requested = enabled;
        if let Some(state) = self.scheduler.as_mut() {
            if enabled {
                state.enable_intensity();
            } else {
                state.disable_intensity();
            }
        }
    }

    pub fn scheduler(&self) -> Option<&SchedulerState> {
        self.scheduler.as_ref()
    }

    /// Current `(bar, step)`, if playing.
    pub fn position(&self) -> Option<(u64, u8)> {
        self.scheduler.as_ref().map(|s| (s.bar_index(), s.step_index()))
    }

    pub fn mode(&self) -> Option<Mode> {
        self.scheduler.as_ref().map(SchedulerState::mode)
    }

    // --- One-shot cues ---

    /// Play the victory fanfare over whatever the score is doing.
    pub fn play_victory_jingle(&mut self) {
        if self.muted {
            return;
        }
        if let Some(bus) = self.ensure_output() {
            jingle::victory_jingle(bus);
        }
    }

    pub fn play_enemy_defeat(&mut self) {
        if self.muted {
            return;
        }
        if let Some(bus) = self.ensure_output() {
            jingle::enemy_defeat(bus);
        }
    }
}

fn sanitize_level(level: f32) -> f32 {
    if level.is_finite() {
        level.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn effective_gain(volume: f32, muted: bool) -> f32 {
    if muted {
        0.0
    } else {
        volume
    }
}
