//! Synthesis primitives.
//!
//! Each primitive submits exactly one self-terminating [`SoundEvent`] to an
//! [`OutputBus`]. Events with a non-positive or non-finite amplitude,
//! duration or frequency are dropped silently.

use crate::bus::{OutputBus, Submix};
use crate::envelope::Envelope;
use crate::oscillator::{Source, Waveform};
use crate::voice::SoundEvent;

/// Release tail of a bass tone, in seconds.
pub const BASS_RELEASE: f64 = 0.02;

/// Linear attack and release times, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ramp {
    pub attack: f64,
    pub release: f64,
}

impl Ramp {
    /// Short ramp for pulse leads.
    pub const PLUCK: Ramp = Ramp { attack: 0.005, release: 0.02 };

    pub const fn new(attack: f64, release: f64) -> Self {
        Self { attack, release }
    }
}

/// Kick drum: sine swept 150 Hz to 30 Hz, decaying from 0.6.
pub mod kick {
    pub const FROM_HZ: f32 = 150.0;
    pub const TO_HZ: f32 = 30.0;
    pub const GLIDE: f32 = 0.12;
    pub const PEAK: f32 = 0.6;
    pub const DURATION: f64 = 0.15;
}

/// Noise burst settings: `(duration, amplitude, high-pass cutoff)`.
pub const SNARE: (f64, f32, f32) = (0.1, 0.3, 2000.0);
pub const HIHAT: (f64, f32, f32) = (0.05, 0.1, 6000.0);

/// Primitive player bound to a bus and a submix.
pub struct Synth<'a, B: OutputBus + ?Sized> {
    bus: &'a mut B,
    submix: Submix,
}

impl<'a, B: OutputBus + ?Sized> Synth<'a, B> {
    pub fn new(bus: &'a mut B, submix: Submix) -> Self {
        Self { bus, submix }
    }

    /// Player routed to the music submix.
    pub fn music(bus: &'a mut B) -> Self {
        Self::new(bus, Submix::Music)
    }

    /// Band-limited pulse with linear attack and release.
    pub fn pulse(&mut self, freq: f64, duty: f32, start: f64, duration: f64, amplitude: f32, ramp: Ramp) {
        self.tone(Waveform::Pulse { duty }, freq, start, duration, amplitude, ramp);
    }

    /// Sine or triangle pad with linear attack and release.
    pub fn pad(&mut self, wave: Waveform, freq: f64, start: f64, duration: f64, amplitude: f32, ramp: Ramp) {
        self.tone(wave, freq, start, duration, amplitude, ramp);
    }

    /// Triangle at full level from the start, with a short release tail.
    pub fn bass(&mut self, freq: f64, start: f64, duration: f64, amplitude: f32) {
        self.emit(SoundEvent {
            start,
            duration,
            source: Source::Tone { wave: Waveform::Triangle, freq: freq as f32 },
            envelope: Envelope::Hold { level: amplitude, release: BASS_RELEASE as f32 },
            submix: self.submix,
        });
    }

    /// Exponential pitch drop from `from` to `to` Hz over `glide` seconds,
    /// with the level decaying exponentially from `peak` over `duration`.
    #[allow(clippy::too_many_arguments)]
    pub fn sweep(&mut self, wave: Waveform, from: f32, to: f32, glide: f32, start: f64, duration: f64, peak: f32) {
        self.emit(SoundEvent {
            start,
            duration,
            source: Source::Sweep { wave, from, to, glide },
            envelope: Envelope::Decay { peak },
            submix: self.submix,
        });
    }

    pub fn kick(&mut self, start: f64) {
        self.sweep(Waveform::Sine, kick::FROM_HZ, kick::TO_HZ, kick::GLIDE, start, kick::DURATION, kick::PEAK);
    }

    /// High-passed white noise with exponential decay.
    pub fn noise(&mut self, start: f64, duration: f64, amplitude: f32, cutoff: f32) {
        self.emit(SoundEvent {
            start,
            duration,
            source: Source::Noise { cutoff },
            envelope: Envelope::Decay { peak: amplitude },
            submix: self.submix,
        });
    }

    pub fn snare(&mut self, start: f64) {
        let (duration, amplitude, cutoff) = SNARE;
        self.noise(start, duration, amplitude, cutoff);
    }

    pub fn hihat(&mut self, start: f64) {
        let (duration, amplitude, cutoff) = HIHAT;
        self.noise(start, duration, amplitude, cutoff);
    }

    fn tone(&mut self, wave: Waveform, freq: f64, start: f64, duration: f64, amplitude: f32, ramp: Ramp) {
        self.emit(SoundEvent {
            start,
            duration,
            source: Source::Tone { wave, freq: freq as f32 },
            envelope: Envelope::Ramp { peak: amplitude, attack: ramp.attack as f32, release: ramp.release as f32 }
                .fit(duration as f32),
            submix: self.submix,
        });
    }

    fn emit(&mut self, event: SoundEvent) {
        if event.is_audible() {
            self.bus.submit(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::RecordingBus;

    #[test]
    fn each_primitive_submits_one_event() {
        let mut bus = RecordingBus::default();
        let mut synth = Synth::music(&mut bus);
        synth.pulse(440.0, 0.5, 1.0, 0.1, 0.25, Ramp::PLUCK);
        synth.pad(Waveform::Sine, 220.0, 1.0, 0.5, 0.1, Ramp::new(0.12, 0.3));
        synth.bass(82.4, 1.0, 0.1, 0.35);
        synth.kick(1.0);
        synth.snare(1.0);
        synth.hihat(1.0);
        assert_eq!(bus.events.len(), 6);
        assert!(bus.events.iter().all(|e| e.start == 1.0 && e.submix == Submix::Music));
    }

    #[test]
    fn invalid_parameters_are_dropped() {
        let mut bus = RecordingBus::default();
        let mut synth = Synth::music(&mut bus);
        synth.pulse(440.0, 0.5, 0.0, 0.1, 0.0, Ramp::PLUCK);
        synth.pulse(440.0, 0.5, 0.0, -0.1, 0.25, Ramp::PLUCK);
        synth.pulse(f64::NAN, 0.5, 0.0, 0.1, 0.25, Ramp::PLUCK);
        synth.bass(0.0, 0.0, 0.1, 0.2);
        synth.noise(0.0, 0.1, f32::INFINITY, 2000.0);
        synth.noise(0.0, 0.1, 0.3, 0.0);
        assert!(bus.events.is_empty());
    }

    #[test]
    fn release_fits_inside_duration() {
        let mut bus = RecordingBus::default();
        Synth::music(&mut bus).pad(Waveform::Triangle, 330.0, 0.0, 0.1, 0.22, Ramp::new(0.04, 0.15));
        let Envelope::Ramp { attack, release, .. } = bus.events[0].envelope else {
            panic!("pad uses a ramp envelope");
        };
        assert!(attack + release <= 0.1 + 1e-6);
    }

    #[test]
    fn drum_settings() {
        let mut bus = RecordingBus::default();
        let mut synth = Synth::new(&mut bus, Submix::Effects);
        synth.kick(0.0);
        synth.snare(0.0);
        synth.hihat(0.0);
        let [kick, snare, hihat] = &bus.events[..] else { panic!("three events") };
        assert_eq!(kick.duration, 0.15);
        assert_eq!(kick.envelope, Envelope::Decay { peak: 0.6 });
        assert_eq!(snare.source, Source::Noise { cutoff: 2000.0 });
        assert_eq!(snare.duration, 0.1);
        assert_eq!(hihat.envelope, Envelope::Decay { peak: 0.1 });
        assert_eq!(hihat.duration, 0.05);
        assert!(bus.events.iter().all(|e| e.submix == Submix::Effects));
    }
}
