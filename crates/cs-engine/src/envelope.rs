//! Gain envelopes for sound events.
//!
//! [`Envelope`] is the shape an event asks for; [`EnvelopeState`] is the
//! per-voice evaluator, advanced once per rendered frame.

/// Level an exponential decay reaches at the end of its event (-60 dB).
pub const DECAY_FLOOR: f32 = 0.001;

/// Gain shape over the lifetime of one event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Envelope {
    /// Linear rise to `peak` over `attack` seconds, hold, then a linear fall
    /// to zero over the final `release` seconds.
    Ramp { peak: f32, attack: f32, release: f32 },
    /// Full `level` from the first sample, linear fall over the final `release` seconds.
    Hold { level: f32, release: f32 },
    /// Exponential decay from `peak` to [`DECAY_FLOOR`] over the event.
    Decay { peak: f32 },
}

impl Envelope {
    pub fn peak(&self) -> f32 {
        match *self {
            Envelope::Ramp { peak, .. } => peak,
            Envelope::Hold { level, .. } => level,
            Envelope::Decay { peak } => peak,
        }
    }

    /// Clamp the segments so attack and release both fit in `duration`.
    pub fn fit(self, duration: f32) -> Self {
        let duration = duration.max(0.0);
        match self {
            Envelope::Ramp { peak, attack, release } => {
                let attack = attack.clamp(0.0, duration);
                let release = release.clamp(0.0, duration - attack);
                Envelope::Ramp { peak, attack, release }
            }
            Envelope::Hold { level, release } => Envelope::Hold { level, release: release.clamp(0.0, duration) },
            decay => decay,
        }
    }

    /// Gain `t` seconds into an event lasting `duration` seconds.
    pub fn gain_at(&self, t: f32, duration: f32) -> f32 {
        if !(0.0..duration).contains(&t) {
            return 0.0;
        }
        match self.fit(duration) {
            Envelope::Ramp { peak, attack, release } => {
                let rise = if attack > 0.0 && t < attack { t / attack } else { 1.0 };
                let fall = if release > 0.0 { ((duration - t) / release).min(1.0) } else { 1.0 };
                peak * rise.min(fall)
            }
            Envelope::Hold { level, release } => {
                let fall = if release > 0.0 { ((duration - t) / release).min(1.0) } else { 1.0 };
                level * fall
            }
            Envelope::Decay { peak } => {
                if peak <= DECAY_FLOOR {
                    peak
                } else {
                    peak * libm::powf(DECAY_FLOOR / peak, t / duration)
                }
            }
        }
    }
}

/// Per-voice envelope evaluator working in frames.
#[derive(Clone, Debug)]
pub struct EnvelopeState {
    shape: Shape,
    /// Frames elapsed since the voice started.
    elapsed: u32,
    /// Total frames of the event.
    length: u32,
}

#[derive(Clone, Debug)]
enum Shape {
    Linear { peak: f32, attack: u32, release: u32 },
    Exponential { level: f32, factor: f32 },
}

impl EnvelopeState {
    pub fn new(envelope: Envelope, length: u32, sample_rate: u32) -> Self {
        let seconds = length as f32 / sample_rate as f32;
        let frames = |s: f32| libm::roundf(s * sample_rate as f32) as u32;
        let shape = match envelope.fit(seconds) {
            Envelope::Ramp { peak, attack, release } => {
                Shape::Linear { peak, attack: frames(attack), release: frames(release) }
            }
            Envelope::Hold { level, release } => Shape::Linear { peak: level, attack: 0, release: frames(release) },
            Envelope::Decay { peak } => {
                let factor = if peak > DECAY_FLOOR && length > 0 {
                    libm::powf(DECAY_FLOOR / peak, 1.0 / length as f32)
                } else {
                    1.0
                };
                Shape::Exponential { level: peak, factor }
            }
        };
        Self { shape, elapsed: 0, length }
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.length
    }

    /// Gain for the current frame, then advance one frame.
    #[inline]
    pub fn next_gain(&mut self) -> f32 {
        if self.is_finished() {
            return 0.0;
        }
        let n = self.elapsed;
        let gain = match &mut self.shape {
            Shape::Linear { peak, attack, release } => {
                let rise = if n < *attack { n as f32 / *attack as f32 } else { 1.0 };
                let left = self.length - n;
                let fall = if left < *release { left as f32 / *release as f32 } else { 1.0 };
                *peak * rise.min(fall)
            }
            Shape::Exponential { level, factor } => {
                let gain = *level;
                *level *= *factor;
                gain
            }
        };
        self.elapsed += 1;
        gain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 44100;

    #[test]
    fn ramp_rises_holds_and_falls() {
        let env = Envelope::Ramp { peak: 0.25, attack: 0.01, release: 0.02 };
        assert_eq!(env.gain_at(0.0, 0.1), 0.0);
        assert!((env.gain_at(0.005, 0.1) - 0.125).abs() < 1e-6);
        assert!((env.gain_at(0.05, 0.1) - 0.25).abs() < 1e-6);
        assert!((env.gain_at(0.09, 0.1) - 0.125).abs() < 1e-4);
        assert_eq!(env.gain_at(0.1, 0.1), 0.0);
    }

    #[test]
    fn release_ends_inside_short_event() {
        // attack and release longer than the event are clamped into it
        let env = Envelope::Ramp { peak: 1.0, attack: 0.04, release: 0.15 }.fit(0.1);
        let Envelope::Ramp { attack, release, .. } = env else { panic!("shape changed") };
        assert_eq!(attack, 0.04);
        assert!((release - 0.06).abs() < 1e-6);
        let mut state = EnvelopeState::new(env, 4410, SR);
        let mut last = 1.0;
        for _ in 0..4410 {
            last = state.next_gain();
        }
        assert!(last < 0.001, "tail {}", last);
        assert!(state.is_finished());
        assert_eq!(state.next_gain(), 0.0);
    }

    #[test]
    fn hold_starts_at_full_level() {
        let mut state = EnvelopeState::new(Envelope::Hold { level: 0.35, release: 0.02 }, 4410, SR);
        assert_eq!(state.next_gain(), 0.35);
        for _ in 0..(4410 - 882 - 1) {
            assert_eq!(state.next_gain(), 0.35);
        }
        let tail: Vec<f32> = (0..882).map(|_| state.next_gain()).collect();
        assert!(tail.windows(2).all(|w| w[1] <= w[0]));
        assert!(*tail.last().unwrap() < 0.001);
    }

    #[test]
    fn decay_reaches_floor() {
        let env = Envelope::Decay { peak: 0.6 };
        let length = (0.15 * SR as f32) as u32;
        let mut state = EnvelopeState::new(env, length, SR);
        assert!((state.next_gain() - 0.6).abs() < 1e-6);
        let mut last = 0.0;
        for _ in 1..length {
            last = state.next_gain();
        }
        assert!((last - DECAY_FLOOR).abs() < 1e-4, "{}", last);
        // frame-based and time-based evaluation agree
        assert!((env.gain_at(0.075, 0.15) - 0.6 * (DECAY_FLOOR / 0.6f32).sqrt()).abs() < 1e-4);
    }

    #[test]
    fn zero_length_is_finished() {
        let mut state = EnvelopeState::new(Envelope::Decay { peak: 0.3 }, 0, SR);
        assert!(state.is_finished());
        assert_eq!(state.next_gain(), 0.0);
    }
}
