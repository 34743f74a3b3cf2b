//! Output bus: the port through which sound events reach a renderer.
//!
//! The scheduler, jingle player and any sibling effects module submit
//! [`SoundEvent`]s through [`OutputBus`]. Two implementations exist: the
//! [`Engine`](crate::Engine) itself (offline, same thread), and
//! [`BusHandle`], which forwards commands over a lock-free ring to an
//! engine running on the audio thread and reads back its frame clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use tracing::warn;

use crate::voice::SoundEvent;

/// Default capacity of the command ring.
pub const COMMAND_CAPACITY: usize = 1024;

/// Mix group under the master gain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Submix {
    /// Score voices.
    #[default]
    Music,
    /// One-shot effects from the sibling sound-effects module.
    Effects,
}

/// Gain stage addressed by [`OutputBus::set_gain`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GainTarget {
    Master,
    Submix(Submix),
}

/// Message from the control side to the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    Play(SoundEvent),
    SetGain(GainTarget, f32),
}

/// Destination for sound events, with a clock to schedule against.
pub trait OutputBus {
    /// Current time of the output clock, in seconds.
    fn now(&self) -> f64;

    fn sample_rate(&self) -> u32;

    /// Queue a sound event. Events starting in the past play immediately.
    fn submit(&mut self, event: SoundEvent);

    /// Set a gain stage; values are clamped to `[0, 1]`.
    fn set_gain(&mut self, target: GainTarget, gain: f32);
}

impl<B: OutputBus + ?Sized> OutputBus for &mut B {
    fn now(&self) -> f64 {
        (**self).now()
    }

    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }

    fn submit(&mut self, event: SoundEvent) {
        (**self).submit(event)
    }

    fn set_gain(&mut self, target: GainTarget, gain: f32) {
        (**self).set_gain(target, gain)
    }
}

/// Control-side end of a command ring.
pub struct BusHandle {
    producer: HeapProd<Command>,
    clock: Arc<AtomicU64>,
    sample_rate: u32,
    dropped: u64,
}

/// Render-side end of a command ring, attached to an [`Engine`](crate::Engine).
pub struct CommandQueue {
    consumer: HeapCons<Command>,
    clock: Arc<AtomicU64>,
}

/// Create a connected handle/queue pair.
pub fn command_channel(capacity: usize, sample_rate: u32) -> (BusHandle, CommandQueue) {
    let (producer, consumer) = HeapRb::<Command>::new(capacity.max(1)).split();
    let clock = Arc::new(AtomicU64::new(0));
    let handle = BusHandle { producer, clock: clock.clone(), sample_rate, dropped: 0 };
    (handle, CommandQueue { consumer, clock })
}

impl BusHandle {
    /// Commands dropped because the ring was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Frames rendered so far by the attached engine.
    pub fn frames(&self) -> u64 {
        self.clock.load(Ordering::Acquire)
    }

    fn send(&mut self, command: Command) {
        if let Err(command) = self.producer.try_push(command) {
            self.dropped += 1;
            warn!(dropped = self.dropped, "command ring full, dropping {}", command_kind(&command));
        }
    }
}

fn command_kind(command: &Command) -> &'static str {
    match command {
        Command::Play(_) => "sound event",
        Command::SetGain(..) => "gain change",
    }
}

impl OutputBus for BusHandle {
    fn now(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn submit(&mut self, event: SoundEvent) {
        self.send(Command::Play(event));
    }

    fn set_gain(&mut self, target: GainTarget, gain: f32) {
        self.send(Command::SetGain(target, gain));
    }
}

impl CommandQueue {
    /// Next pending command, if any.
    #[inline]
    pub fn pop(&mut self) -> Option<Command> {
        self.consumer.try_pop()
    }

    /// Publish the renderer's frame position.
    #[inline]
    pub fn publish(&self, frames: u64) {
        self.clock.store(frames, Ordering::Release);
    }
}

/// Bus test double that records submissions against a settable clock.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingBus {
    pub now: f64,
    pub events: Vec<SoundEvent>,
    pub gains: Vec<(GainTarget, f32)>,
}

#[cfg(test)]
impl RecordingBus {
    pub fn at(now: f64) -> Self {
        Self { now, ..Self::default() }
    }

    /// Distinct event start times, in submission order.
    pub fn start_times(&self) -> Vec<f64> {
        let mut times: Vec<f64> = Vec::new();
        for event in &self.events {
            if times.last() != Some(&event.start) {
                times.push(event.start);
            }
        }
        times
    }
}

#[cfg(test)]
impl OutputBus for RecordingBus {
    fn now(&self) -> f64 {
        self.now
    }

    fn sample_rate(&self) -> u32 {
        44100
    }

    fn submit(&mut self, event: SoundEvent) {
        self.events.push(event);
    }

    fn set_gain(&mut self, target: GainTarget, gain: f32) {
        self.gains.push((target, gain));
    }
}
