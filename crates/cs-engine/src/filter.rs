//! Second-order high-pass filter for noise bursts.
//!
//! Coefficients follow the Audio EQ Cookbook; the filter runs in transposed
//! direct form II so a voice only carries two state values.

use core::f32::consts::PI;

/// Butterworth Q.
pub const BUTTERWORTH_Q: f32 = core::f32::consts::FRAC_1_SQRT_2;

/// Normalized biquad coefficients (a0 = 1).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl BiquadCoeffs {
    /// High-pass coefficients. The cutoff is kept below Nyquist.
    pub fn highpass(cutoff: f32, q: f32, sample_rate: f32) -> Self {
        let q = q.max(0.5);
        let cutoff = cutoff.clamp(1.0, sample_rate * 0.49);
        let omega = 2.0 * PI * cutoff / sample_rate;
        let sin_omega = libm::sinf(omega);
        let cos_omega = libm::cosf(omega);
        let alpha = sin_omega / (2.0 * q);

        let a0 = 1.0 + alpha;
        Self {
            b0: (1.0 + cos_omega) / 2.0 / a0,
            b1: -(1.0 + cos_omega) / a0,
            b2: (1.0 + cos_omega) / 2.0 / a0,
            a1: -2.0 * cos_omega / a0,
            a2: (1.0 - alpha) / a0,
        }
    }
}

/// Running biquad state.
#[derive(Clone, Copy, Debug)]
pub struct Biquad {
    coeffs: BiquadCoeffs,
    z1: f32,
    z2: f32,
}

impl Biquad {
    pub fn new(coeffs: BiquadCoeffs) -> Self {
        Self { coeffs, z1: 0.0, z2: 0.0 }
    }

    /// Filter one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let c = &self.coeffs;
        let output = c.b0 * input + self.z1;
        self.z1 = c.b1 * input - c.a1 * output + self.z2;
        self.z2 = c.b2 * input - c.a2 * output;
        output
    }
}
