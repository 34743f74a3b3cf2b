//! Oscillators and noise sources.
//!
//! A [`Source`] describes what a sound event plays; a [`Generator`] is the
//! running state a voice advances one sample at a time.

use core::f32::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::filter::{Biquad, BiquadCoeffs, BUTTERWORTH_Q};

/// Periodic waveform shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Waveform {
    Sine,
    Triangle,
    /// Band-limited pulse; `duty` is the high fraction of the period.
    Pulse { duty: f32 },
}

impl Waveform {
    /// Sample at `phase` in `[0, 1)`. `dt` is the phase increment per sample.
    #[inline]
    pub fn sample(self, phase: f32, dt: f32) -> f32 {
        match self {
            Waveform::Sine => libm::sinf(TAU * phase),
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
            Waveform::Pulse { duty } => {
                let naive = if phase < duty { 1.0 } else { -1.0 };
                let mut falling = phase - duty;
                if falling < 0.0 {
                    falling += 1.0;
                }
                // centre on zero, then scale the longer half-cycle to a peak of 1
                let centred = naive + poly_blep(phase, dt) - poly_blep(falling, dt) - (2.0 * duty - 1.0);
                centred / (2.0 * duty.max(1.0 - duty))
            }
        }
    }
}

/// Polynomial band-limited step correction around a discontinuity at 0.
#[inline]
fn poly_blep(t: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        0.0
    } else if t < dt {
        let t = t / dt;
        t + t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + t + t + 1.0
    } else {
        0.0
    }
}

/// What a sound event plays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Source {
    /// Fixed-pitch oscillator.
    Tone { wave: Waveform, freq: f32 },
    /// Exponential glide from `from` to `to` Hz over `glide` seconds, then held.
    Sweep { wave: Waveform, from: f32, to: f32, glide: f32 },
    /// White noise through a high-pass filter at `cutoff` Hz.
    Noise { cutoff: f32 },
}

impl Source {
    /// Whether every frequency parameter is finite and positive.
    pub fn is_valid(&self) -> bool {
        let ok = |f: f32| f.is_finite() && f > 0.0;
        match *self {
            Source::Tone { freq, .. } => ok(freq),
            Source::Sweep { from, to, glide, .. } => ok(from) && ok(to) && glide.is_finite() && glide >= 0.0,
            Source::Noise { cutoff } => ok(cutoff),
        }
    }
}

/// Phase-accumulating oscillator with optional exponential glide.
#[derive(Clone, Debug)]
pub struct Oscillator {
    wave: Waveform,
    phase: f32,
    increment: f32,
    glide_factor: f32,
    glide_frames: u32,
}

impl Oscillator {
    pub fn new(wave: Waveform, freq: f32, sample_rate: u32) -> Self {
        Self {
            wave,
            phase: 0.0,
            increment: freq / sample_rate as f32,
            glide_factor: 1.0,
            glide_frames: 0,
        }
    }

    /// Oscillator whose frequency moves exponentially from `from` to `to`.
    pub fn sweep(wave: Waveform, from: f32, to: f32, glide: f32, sample_rate: u32) -> Self {
        let mut osc = Self::new(wave, from, sample_rate);
        let frames = (glide * sample_rate as f32) as u32;
        if frames > 0 {
            osc.glide_frames = frames;
            osc.glide_factor = libm::powf(to / from, 1.0 / frames as f32);
        } else {
            osc.increment = to / sample_rate as f32;
        }
        osc
    }

    /// Current frequency in Hz.
    pub fn frequency(&self, sample_rate: u32) -> f32 {
        self.increment * sample_rate as f32
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let out = self.wave.sample(self.phase, self.increment);
        self.phase += self.increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        if self.glide_frames > 0 {
            self.increment *= self.glide_factor;
            self.glide_frames -= 1;
        }
        out
    }
}

/// Filtered white noise.
#[derive(Clone, Debug)]
pub struct NoiseGen {
    rng: Pcg32,
    filter: Biquad,
}

impl NoiseGen {
    pub fn new(cutoff: f32, sample_rate: u32, seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            filter: Biquad::new(BiquadCoeffs::highpass(cutoff, BUTTERWORTH_Q, sample_rate as f32)),
        }
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let white: f32 = self.rng.random_range(-1.0..1.0);
        self.filter.process(white)
    }
}

/// Running signal source of a voice.
#[derive(Clone, Debug)]
pub enum Generator {
    Osc(Oscillator),
    Noise(NoiseGen),
}

impl Generator {
    pub fn new(source: &Source, sample_rate: u32, seed: u64) -> Self {
        match *source {
            Source::Tone { wave, freq } => Generator::Osc(Oscillator::new(wave, freq, sample_rate)),
            Source::Sweep { wave, from, to, glide } => {
                Generator::Osc(Oscillator::sweep(wave, from, to, glide, sample_rate))
            }
            Source::Noise { cutoff } => Generator::Noise(NoiseGen::new(cutoff, sample_rate, seed)),
        }
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        match self {
            Generator::Osc(osc) => osc.next_sample(),
            Generator::Noise(noise) => noise.next_sample(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 44100;

    fn mean_of(osc: &mut Oscillator, frames: usize) -> f32 {
        (0..frames).map(|_| osc.next_sample()).sum::<f32>() / frames as f32
    }

    #[test]
    fn pulse_has_no_dc_for_any_duty() {
        for duty in [0.5, 0.25] {
            // 441 Hz gives exactly 100 samples per period
            let mut osc = Oscillator::new(Waveform::Pulse { duty }, 441.0, SR);
            let mean = mean_of(&mut osc, 4410);
            assert!(mean.abs() < 0.02, "duty {} mean {}", duty, mean);
        }
    }

    #[test]
    fn narrow_pulse_peaks_at_unity() {
        for duty in [0.5, 0.25, 0.75] {
            let mut osc = Oscillator::new(Waveform::Pulse { duty }, 441.0, SR);
            let peak = (0..4410).map(|_| osc.next_sample().abs()).fold(0.0f32, f32::max);
            assert!((peak - 1.0).abs() < 0.02, "duty {} peak {}", duty, peak);
        }
    }

    #[test]
    fn waveforms_stay_in_range() {
        for wave in [Waveform::Sine, Waveform::Triangle, Waveform::Pulse { duty: 0.25 }] {
            let mut osc = Oscillator::new(wave, 1000.0, SR);
            for _ in 0..SR {
                let s = osc.next_sample();
                assert!(s.abs() <= 2.0, "{:?} produced {}", wave, s);
            }
        }
    }

    #[test]
    fn triangle_peaks_mid_period() {
        assert_eq!(Waveform::Triangle.sample(0.5, 0.0), 1.0);
        assert_eq!(Waveform::Triangle.sample(0.0, 0.0), -1.0);
    }

    #[test]
    fn sweep_reaches_target_and_holds() {
        let mut osc = Oscillator::sweep(Waveform::Sine, 150.0, 30.0, 0.12, SR);
        assert!((osc.frequency(SR) - 150.0).abs() < 1e-3);
        let glide = (0.12 * SR as f32) as usize;
        for _ in 0..glide {
            osc.next_sample();
        }
        assert!((osc.frequency(SR) - 30.0).abs() < 0.1, "{}", osc.frequency(SR));
        for _ in 0..1000 {
            osc.next_sample();
        }
        assert!((osc.frequency(SR) - 30.0).abs() < 0.1);
    }

    #[test]
    fn sweep_is_exponential() {
        // halfway through the glide the frequency is the geometric mean
        let mut osc = Oscillator::sweep(Waveform::Sine, 160.0, 40.0, 0.1, SR);
        for _ in 0..(SR / 20) {
            osc.next_sample();
        }
        assert!((osc.frequency(SR) - 80.0).abs() < 0.5, "{}", osc.frequency(SR));
    }

    #[test]
    fn noise_is_deterministic_per_seed() {
        let mut a = NoiseGen::new(2000.0, SR, 7);
        let mut b = NoiseGen::new(2000.0, SR, 7);
        let mut c = NoiseGen::new(2000.0, SR, 8);
        let sa: Vec<f32> = (0..64).map(|_| a.next_sample()).collect();
        let sb: Vec<f32> = (0..64).map(|_| b.next_sample()).collect();
        let sc: Vec<f32> = (0..64).map(|_| c.next_sample()).collect();
        assert_eq!(sa, sb);
        assert_ne!(sa, sc);
    }

    #[test]
    fn invalid_sources() {
        assert!(!Source::Tone { wave: Waveform::Sine, freq: 0.0 }.is_valid());
        assert!(!Source::Tone { wave: Waveform::Sine, freq: f32::NAN }.is_valid());
        assert!(!Source::Noise { cutoff: -1.0 }.is_valid());
        assert!(Source::Sweep { wave: Waveform::Sine, from: 150.0, to: 30.0, glide: 0.12 }.is_valid());
    }
}
