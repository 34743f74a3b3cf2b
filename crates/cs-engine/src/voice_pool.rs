//! VoicePool: bounded voice storage with stealing.
//!
//! Slots are preallocated at construction; starting, reaping and stealing
//! voices never allocate, so the pool is safe to drive from the audio thread.

use slotmap::{new_key_type, SlotMap};
use tracing::debug;

use crate::bus::Submix;
use crate::voice::Voice;

new_key_type! {
    /// Handle to a voice in the pool. Stale once the voice expires.
    pub struct VoiceKey;
}

/// Default maximum number of simultaneous voices.
pub const MAX_VOICES: usize = 64;

/// Per-submix sums for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SubmixSums {
    pub music: f32,
    pub effects: f32,
}

/// Bounded pool of voices.
pub struct VoicePool {
    voices: SlotMap<VoiceKey, Voice>,
    capacity: usize,
    stolen: u64,
}

impl VoicePool {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { voices: SlotMap::with_capacity_and_key(capacity), capacity, stolen: 0 }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Add a voice. When the pool is full, the voice closest to finishing
    /// is stolen to make room.
    pub fn start(&mut self, voice: Voice, now: u64) -> VoiceKey {
        if self.voices.len() >= self.capacity {
            if let Some(victim) = self.steal_candidate(now) {
                self.voices.remove(victim);
                self.stolen += 1;
                debug!(stolen = self.stolen, "voice pool full, stealing");
            }
        }
        self.voices.insert(voice)
    }

    /// Voice with the fewest frames left to play.
    fn steal_candidate(&self, now: u64) -> Option<VoiceKey> {
        self.voices.iter().min_by_key(|(_, v)| v.remaining(now)).map(|(key, _)| key)
    }

    pub fn contains(&self, key: VoiceKey) -> bool {
        self.voices.contains_key(key)
    }

    /// Drop voices whose end frame has passed.
    pub fn reap_finished(&mut self, now: u64) {
        self.voices.retain(|_, voice| !voice.is_finished(now));
    }

    pub fn active_count(&self) -> usize {
        self.voices.len()
    }

    /// Total voices stolen since creation.
    pub fn stolen_count(&self) -> u64 {
        self.stolen
    }

    /// Render every voice for `frame`, summed per submix.
    pub fn render(&mut self, frame: u64) -> SubmixSums {
        let mut sums = SubmixSums::default();
        for (_, voice) in self.voices.iter_mut() {
            let sample = voice.render(frame);
            match voice.submix() {
                Submix::Music => sums.music += sample,
                Submix::Effects => sums.effects += sample,
            }
        }
        sums
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Envelope;
    use crate::oscillator::{Source, Waveform};
    use crate::voice::SoundEvent;

    const SR: u32 = 1000;

    fn voice(start: f64, duration: f64, submix: Submix) -> Voice {
        let event = SoundEvent {
            start,
            duration,
            source: Source::Tone { wave: Waveform::Triangle, freq: 50.0 },
            envelope: Envelope::Hold { level: 1.0, release: 0.0 },
            submix,
        };
        Voice::new(&event, SR, 0, 0)
    }

    #[test]
    fn voices_expire_on_their_own() {
        let mut pool = VoicePool::with_capacity(4);
        let short = pool.start(voice(0.0, 0.01, Submix::Music), 0);
        let long = pool.start(voice(0.0, 0.05, Submix::Music), 0);
        pool.reap_finished(10);
        assert!(!pool.contains(short));
        assert!(pool.contains(long));
        pool.reap_finished(50);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn full_pool_steals_voice_closest_to_end() {
        let mut pool = VoicePool::with_capacity(2);
        let ends_soon = pool.start(voice(0.0, 0.02, Submix::Music), 0);
        let ends_late = pool.start(voice(0.0, 0.5, Submix::Music), 0);
        let newcomer = pool.start(voice(0.0, 0.1, Submix::Music), 5);

        assert_eq!(pool.active_count(), 2);
        assert!(!pool.contains(ends_soon));
        assert!(pool.contains(ends_late));
        assert!(pool.contains(newcomer));
        assert_eq!(pool.stolen_count(), 1);
    }

    #[test]
    fn render_splits_submixes() {
        let mut pool = VoicePool::with_capacity(4);
        pool.start(voice(0.0, 1.0, Submix::Effects), 0);
        let mut saw_effects = false;
        for frame in 0..20 {
            let sums = pool.render(frame);
            assert_eq!(sums.music, 0.0);
            saw_effects |= sums.effects != 0.0;
        }
        assert!(saw_effects);
    }
}
