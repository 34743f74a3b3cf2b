//! Sound events and the voices that render them.

use crate::bus::Submix;
use crate::envelope::{Envelope, EnvelopeState};
use crate::oscillator::{Generator, Source};

/// One self-terminating sound, scheduled at an absolute time on the output clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SoundEvent {
    /// Start time in seconds.
    pub start: f64,
    /// Length in seconds; the voice ends at `start + duration`.
    pub duration: f64,
    pub source: Source,
    pub envelope: Envelope,
    pub submix: Submix,
}

impl SoundEvent {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// False for events that would produce no sound or carry invalid numbers.
    pub fn is_audible(&self) -> bool {
        let peak = self.envelope.peak();
        self.start.is_finite()
            && self.duration.is_finite()
            && self.duration > 0.0
            && peak.is_finite()
            && peak > 0.0
            && self.source.is_valid()
    }
}

/// A playing (or pending) sound event.
#[derive(Clone, Debug)]
pub struct Voice {
    /// First frame of output.
    start_frame: u64,
    /// Frame after the last frame of output.
    end_frame: u64,
    generator: Generator,
    envelope: EnvelopeState,
    submix: Submix,
}

impl Voice {
    /// Build a voice for `event`. A start already in the past (before `now`)
    /// is moved to `now`, keeping the full duration.
    pub fn new(event: &SoundEvent, sample_rate: u32, now: u64, seed: u64) -> Self {
        let sr = sample_rate as f64;
        let scheduled = (event.start * sr).round().max(0.0) as u64;
        let start_frame = scheduled.max(now);
        let length = ((event.duration * sr).round() as u64).min(u32::MAX as u64) as u32;
        Self {
            start_frame,
            end_frame: start_frame + length as u64,
            generator: Generator::new(&event.source, sample_rate, seed),
            envelope: EnvelopeState::new(event.envelope, length, sample_rate),
            submix: event.submix,
        }
    }

    pub fn submix(&self) -> Submix {
        self.submix
    }

    pub fn start_frame(&self) -> u64 {
        self.start_frame
    }

    pub fn end_frame(&self) -> u64 {
        self.end_frame
    }

    /// Frames of output left as of `frame`, including any wait before the start.
    pub fn remaining(&self, frame: u64) -> u64 {
        self.end_frame.saturating_sub(frame)
    }

    pub fn is_finished(&self, frame: u64) -> bool {
        frame >= self.end_frame
    }

    /// Render the sample for `frame`. Silent before the start frame.
    #[inline]
    pub fn render(&mut self, frame: u64) -> f32 {
        if frame < self.start_frame || self.envelope.is_finished() {
            return 0.0;
        }
        self.generator.next_sample() * self.envelope.next_gain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oscillator::Waveform;

    const SR: u32 = 1000;

    fn tone(start: f64, duration: f64) -> SoundEvent {
        SoundEvent {
            start,
            duration,
            source: Source::Tone { wave: Waveform::Pulse { duty: 0.5 }, freq: 100.0 },
            envelope: Envelope::Hold { level: 0.5, release: 0.0 },
            submix: Submix::Music,
        }
    }

    #[test]
    fn waits_for_start_then_sounds() {
        let mut voice = Voice::new(&tone(0.01, 0.02), SR, 0, 1);
        assert_eq!(voice.start_frame(), 10);
        assert_eq!(voice.end_frame(), 30);
        for frame in 0..10 {
            assert_eq!(voice.render(frame), 0.0);
        }
        let loud = (10..30).map(|f| voice.render(f).abs()).fold(0.0f32, f32::max);
        assert!(loud > 0.4);
        assert!(voice.is_finished(30));
    }

    #[test]
    fn late_start_plays_in_full() {
        let voice = Voice::new(&tone(0.01, 0.02), SR, 25, 1);
        assert_eq!(voice.start_frame(), 25);
        assert_eq!(voice.end_frame(), 45);
        assert_eq!(voice.remaining(25), 20);
    }

    #[test]
    fn audibility_rules() {
        assert!(tone(0.0, 0.1).is_audible());
        assert!(!tone(0.0, 0.0).is_audible());
        assert!(!tone(0.0, -1.0).is_audible());
        assert!(!tone(f64::NAN, 0.1).is_audible());
        let mut quiet = tone(0.0, 0.1);
        quiet.envelope = Envelope::Hold { level: 0.0, release: 0.0 };
        assert!(!quiet.is_audible());
    }
}
