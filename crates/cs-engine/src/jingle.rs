//! One-shot cues played outside the scheduler: the victory jingle and the
//! enemy-defeat hit.
//!
//! Both capture the bus clock once and submit every event up front. Neither
//! reads nor touches the scheduler state.

use cs_ir::Pitch;
use cs_ir::PitchClass::{self, A, B, D, E, FSharp, G};

use crate::bus::OutputBus;
use crate::oscillator::Waveform;
use crate::synth::{Ramp, Synth};

/// Jingle grid step, in seconds.
pub const JINGLE_STEP: f64 = 0.1;

/// Delay between the call and the first jingle note, in seconds.
pub const JINGLE_DELAY: f64 = 0.05;

/// A note at `at` grid steps lasting `len` grid steps.
#[derive(Clone, Copy, Debug)]
struct Cue {
    pitch: Pitch,
    at: f64,
    len: f64,
}

const fn cue(class: PitchClass, octave: u8, at: f64, len: f64) -> Cue {
    Cue { pitch: Pitch::new(class, octave), at, len }
}

const MELODY: [Cue; 10] = [
    cue(D, 5, 0.0, 0.7),
    cue(D, 5, 1.0, 0.7),
    cue(D, 5, 2.0, 0.7),
    cue(G, 5, 3.0, 2.5),
    cue(FSharp, 5, 6.0, 0.7),
    cue(G, 5, 7.0, 0.7),
    cue(A, 5, 8.0, 0.7),
    cue(B, 5, 9.0, 2.0),
    cue(A, 5, 11.0, 0.7),
    cue(B, 5, 12.0, 4.0),
];

// parallel thirds and sixths under the melody
const HARMONY: [Cue; 10] = [
    cue(B, 4, 0.0, 0.7),
    cue(B, 4, 1.0, 0.7),
    cue(B, 4, 2.0, 0.7),
    cue(D, 5, 3.0, 2.5),
    cue(D, 5, 6.0, 0.7),
    cue(E, 5, 7.0, 0.7),
    cue(FSharp, 5, 8.0, 0.7),
    cue(G, 5, 9.0, 2.0),
    cue(FSharp, 5, 11.0, 0.7),
    cue(G, 5, 12.0, 4.0),
];

const BASS: [Cue; 5] = [
    cue(G, 2, 0.0, 3.0),
    cue(G, 3, 3.0, 2.5),
    cue(D, 3, 6.0, 3.0),
    cue(G, 3, 9.0, 2.0),
    cue(G, 3, 12.0, 4.0),
];

/// Drum hits: grid step, noise duration, noise amplitude, noise cutoff.
const HITS: [(f64, f64, f32, f32); 3] = [(3.0, 0.08, 0.15, 3000.0), (9.0, 0.08, 0.15, 3000.0), (12.0, 0.1, 0.18, 2500.0)];

/// Play the victory fanfare, starting [`JINGLE_DELAY`] after the bus clock.
pub fn victory_jingle<O: OutputBus + ?Sized>(bus: &mut O) {
    let t0 = bus.now() + JINGLE_DELAY;
    let mut synth = Synth::music(bus);
    let at = |c: &Cue| (t0 + c.at * JINGLE_STEP, c.len * JINGLE_STEP);

    for c in &MELODY {
        if let Some(freq) = c.pitch.frequency() {
            let (start, duration) = at(c);
            synth.pulse(freq, 0.5, start, duration, 0.18, Ramp::PLUCK);
        }
    }
    for c in &HARMONY {
        if let Some(freq) = c.pitch.frequency() {
            let (start, duration) = at(c);
            synth.pulse(freq, 0.25, start, duration, 0.1, Ramp::PLUCK);
        }
    }
    for c in &BASS {
        if let Some(freq) = c.pitch.frequency() {
            let (start, duration) = at(c);
            synth.bass(freq, start, duration, 0.2);
        }
    }
    for (step, duration, amplitude, cutoff) in HITS {
        let start = t0 + step * JINGLE_STEP;
        synth.kick(start);
        synth.noise(start, duration, amplitude, cutoff);
    }
}

/// Low square "bwap" with a sine sub-thump, starting at the bus clock.
pub fn enemy_defeat<O: OutputBus + ?Sized>(bus: &mut O) {
    let t = bus.now();
    let mut synth = Synth::music(bus);
    synth.sweep(Waveform::Pulse { duty: 0.5 }, 120.0, 20.0, 0.16, t, 0.18, 0.35);
    synth.sweep(Waveform::Sine, 80.0, 20.0, 0.12, t, 0.15, 0.45);
}
