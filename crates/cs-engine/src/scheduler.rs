//! Lookahead scheduler and intensity state machine.
//!
//! Each wake fills the window `[now, now + lookahead)` with the steps that
//! fall inside it. Step times come only from the accumulating
//! `next_event_time`, so uneven wake gaps never shift the grid. Mode changes
//! requested by the host land on bar boundaries:
//!
//! ```text
//! Ambient --enable (at bar wrap)--> Transition --one bar--> Active
//!    ^                                  |                      |
//!    +-------------- disable (immediate) ----------------------+
//! ```

use std::sync::Arc;

use cs_ir::{DrumHit, Part, Step, Track, STEPS_PER_BAR};
use tracing::debug;

use crate::bus::OutputBus;
use crate::oscillator::Waveform;
use crate::synth::{Ramp, Synth};

/// Fixed tempo.
pub const BPM: f64 = 140.0;

/// One sixteenth note at [`BPM`], in seconds.
pub const STEP_DURATION: f64 = 60.0 / BPM / 4.0;

/// One 4/4 bar, in seconds.
pub const BAR_DURATION: f64 = STEP_DURATION * STEPS_PER_BAR as f64;

/// Default scheduling window, in seconds.
pub const LOOKAHEAD: f64 = 0.1;

/// Musical intensity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Ambient,
    /// One bar of drum fill between ambient and active.
    Transition,
    Active,
}

impl Mode {
    /// Whether the active banks and voicing apply.
    pub const fn is_intense(self) -> bool {
        matches!(self, Mode::Transition | Mode::Active)
    }
}

/// The steps due on one grid position, one per part.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepNotes {
    pub melody: Step,
    pub harmony: Step,
    pub bass: Step,
    pub drums: Step,
}

/// All mutable scheduler state for one playing score.
#[derive(Clone, Debug)]
pub struct SchedulerState {
    bar_index: u64,
    step_index: u8,
    next_event_time: f64,
    mode: Mode,
    drums_enabled: bool,
    pending_escalation: bool,
    combat: bool,
    active_track: Arc<Track>,
}

impl SchedulerState {
    /// Fresh state at bar 0, step 0, with the first step due at `start_time`.
    pub fn new(track: Arc<Track>, start_time: f64) -> Self {
        Self {
            bar_index: 0,
            step_index: 0,
            next_event_time: start_time,
            mode: Mode::Ambient,
            drums_enabled: false,
            pending_escalation: false,
            combat: false,
            active_track: track,
        }
    }

    pub fn bar_index(&self) -> u64 {
        self.bar_index
    }

    pub fn step_index(&self) -> u8 {
        self.step_index
    }

    /// Output-clock time of the next unscheduled step.
    pub fn next_event_time(&self) -> f64 {
        self.next_event_time
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn drums_enabled(&self) -> bool {
        self.drums_enabled
    }

    pub fn pending_escalation(&self) -> bool {
        self.pending_escalation
    }

    pub fn is_combat(&self) -> bool {
        self.combat
    }

    pub fn track(&self) -> &Arc<Track> {
        &self.active_track
    }

    /// Request escalation. Takes effect at the next bar wrap; no-op unless ambient.
    pub fn enable_intensity(&mut self) {
        if self.mode == Mode::Ambient && !self.pending_escalation {
            self.pending_escalation = true;
            debug!(bar = self.bar_index, step = self.step_index, "escalation pending");
        }
    }

    /// Drop to ambient immediately, keeping the bar and step position.
    pub fn disable_intensity(&mut self) {
        if self.mode != Mode::Ambient || self.pending_escalation {
            debug!(from = ?self.mode, bar = self.bar_index, step = self.step_index, "de-escalating");
        }
        self.mode = Mode::Ambient;
        self.combat = false;
        self.drums_enabled = false;
        self.pending_escalation = false;
    }

    /// Swap the track; the next step lookup uses it.
    pub fn select_track(&mut self, track: Arc<Track>) {
        debug!(track = track.name(), "track selected");
        self.active_track = track;
    }

    /// Resolve the steps due at the current position.
    pub fn current_step(&self) -> StepNotes {
        let track = &self.active_track;
        let variant = track.arrangement().variant_for_bar(self.bar_index);
        let banks = if self.mode.is_intense() { track.active() } else { track.ambient() };
        let step = self.step_index as usize;
        let lookup = |part: Part| banks.bank(part).variant(variant).step(step);

        let drums = if !self.drums_enabled {
            Step::Rest
        } else if self.mode == Mode::Transition {
            track.transition_fill().step(step)
        } else {
            lookup(Part::Drums)
        };

        StepNotes {
            melody: lookup(Part::Melody),
            harmony: lookup(Part::Harmony),
            bass: lookup(Part::Bass),
            drums,
        }
    }

    /// Move to the next step, running the mode check on a bar wrap.
    fn advance(&mut self) {
        self.next_event_time += STEP_DURATION;
        self.step_index += 1;
        if self.step_index as usize == STEPS_PER_BAR {
            self.step_index = 0;
            self.bar_index += 1;
            self.on_bar_boundary();
        }
    }

    fn on_bar_boundary(&mut self) {
        match self.mode {
            Mode::Ambient if self.pending_escalation => {
                self.mode = Mode::Transition;
                self.drums_enabled = true;
                debug!(bar = self.bar_index, "entering transition");
            }
            Mode::Transition => {
                self.mode = Mode::Active;
                self.bar_index = 0;
                self.combat = true;
                self.pending_escalation = false;
                debug!("entering active");
            }
            _ => {}
        }
    }
}

/// Schedule every step that starts before `bus.now() + lookahead`.
///
/// Returns the number of steps scheduled.
pub fn tick<B: OutputBus + ?Sized>(state: &mut SchedulerState, bus: &mut B, lookahead: f64) -> usize {
    let horizon = bus.now() + lookahead;
    let mut scheduled = 0;
    while state.next_event_time < horizon {
        let notes = state.current_step();
        play_step(&mut Synth::music(&mut *bus), state.mode, &notes, state.next_event_time);
        state.advance();
        scheduled += 1;
    }
    scheduled
}

fn play_step<B: OutputBus + ?Sized>(synth: &mut Synth<'_, B>, mode: Mode, notes: &StepNotes, time: f64) {
    let hz = |step: Step| step.pitch().and_then(|p| p.frequency());
    let intense = mode.is_intense();

    if let Some(freq) = hz(notes.melody) {
        if intense {
            synth.pulse(freq, 0.5, time, STEP_DURATION * 0.9, 0.25, Ramp::PLUCK);
        } else {
            synth.pad(Waveform::Triangle, freq, time, STEP_DURATION * 5.0, 0.22, Ramp::new(0.04, 0.15));
        }
    }

    if let Some(freq) = hz(notes.harmony) {
        if intense {
            synth.pulse(freq, 0.25, time, STEP_DURATION * 0.9, 0.15, Ramp::PLUCK);
        } else {
            synth.pad(Waveform::Sine, freq, time, STEP_DURATION * 7.0, 0.10, Ramp::new(0.12, 0.3));
        }
    }

    if let Some(freq) = hz(notes.bass) {
        if intense {
            synth.bass(freq, time, STEP_DURATION * 0.9, 0.35);
        } else {
            synth.bass(freq, time, STEP_DURATION * 7.0, 0.2);
        }
    }

    match notes.drums.hit() {
        Some(DrumHit::Kick) => synth.kick(time),
        Some(DrumHit::Snare) => synth.snare(time),
        Some(DrumHit::HiHat) => synth.hihat(time),
        None => {}
    }
}
