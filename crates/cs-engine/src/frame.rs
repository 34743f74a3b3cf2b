//! Audio frame type.

/// A stereo audio frame (16-bit integer).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub left: i16,
    pub right: i16,
}

impl Frame {
    /// Create a silent frame.
    pub const fn silence() -> Self {
        Self { left: 0, right: 0 }
    }

    /// Create a mono frame (same value for both channels).
    pub const fn mono(value: i16) -> Self {
        Self { left: value, right: value }
    }

    /// Convert a float sample in `[-1, 1]` to a mono frame, clipping outside it.
    pub fn from_f32(sample: f32) -> Self {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        Self::mono(value)
    }

    /// Left and right as floats in `[-1, 1]`.
    pub fn to_f32(self) -> (f32, f32) {
        let scale = 1.0 / i16::MAX as f32;
        (self.left as f32 * scale, self.right as f32 * scale)
    }

    pub fn is_silent(self) -> bool {
        self.left == 0 && self.right == 0
    }

    /// Larger absolute channel value.
    pub fn peak(self) -> u16 {
        self.left.unsigned_abs().max(self.right.unsigned_abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_f32_clips() {
        assert_eq!(Frame::from_f32(2.0), Frame::mono(i16::MAX));
        assert_eq!(Frame::from_f32(-2.0), Frame::mono(-i16::MAX));
        assert!(Frame::from_f32(0.0).is_silent());
    }

    #[test]
    fn to_f32_round_trips_full_scale() {
        let (l, r) = Frame::mono(i16::MAX).to_f32();
        assert!((l - 1.0).abs() < 1e-6);
        assert_eq!(l, r);
    }

    #[test]
    fn peak_uses_louder_channel() {
        let frame = Frame { left: -300, right: 200 };
        assert_eq!(frame.peak(), 300);
    }
}
