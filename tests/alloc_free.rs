//! Allocation-free render path tests.
//!
//! These tests verify that rendering and scheduler ticks do not allocate
//! once playback is running. Themes are driven through an escalation, and a
//! tiny voice pool forces stealing, inside the guarded section.
//!
//! Just run `cargo test`; no feature flags needed.

use assert_no_alloc::{assert_no_alloc, AllocDisabler};

#[cfg(debug_assertions)]
#[global_allocator]
static A: AllocDisabler = AllocDisabler;

use cs_engine::{scheduler::LOOKAHEAD, tick, Engine, Frame, SchedulerState, BAR_DURATION};
use cs_ir::TrackCatalog;
use cs_master::{Controller, ManualWake, OfflineBackend, ScoreConfig};

const SAMPLE_RATE: u32 = 44100;
const BLOCK: usize = 1102;

fn blocks_for(seconds: f64) -> usize {
    (seconds * SAMPLE_RATE as f64 / BLOCK as f64).ceil() as usize
}

/// Tick and render a theme for `seconds`, aborting on any heap allocation.
fn assert_theme_alloc_free(theme: &str, seconds: f64) {
    let config = ScoreConfig { sample_rate: SAMPLE_RATE, ..ScoreConfig::default() };
    let mut ctrl = Controller::with_parts(OfflineBackend::default(), ManualWake::new(), config);
    ctrl.set_track(theme);
    ctrl.play();
    let mut block = vec![Frame::silence(); BLOCK];

    // first pass registers log callsites
    ctrl.set_drums(true);
    for _ in 0..blocks_for(BAR_DURATION * 3.0) {
        ctrl.wake_mut().trigger();
        ctrl.pump();
        if let Some(engine) = ctrl.output_bus() {
            engine.render_block(&mut block);
        }
    }
    ctrl.set_drums(false);

    assert_no_alloc(|| {
        ctrl.set_drums(true);
        for _ in 0..blocks_for(seconds) {
            ctrl.wake_mut().trigger();
            ctrl.pump();
            if let Some(engine) = ctrl.output_bus() {
                engine.render_block(&mut block);
            }
        }
        ctrl.set_drums(false);
    });
}

#[test]
fn default_theme_alloc_free() {
    assert_theme_alloc_free("default", 5.0);
}

#[test]
fn dungeon_alloc_free() {
    assert_theme_alloc_free("dungeon", 5.0);
}

#[test]
fn volcano_alloc_free() {
    assert_theme_alloc_free("volcano", 5.0);
}

#[test]
fn saturated_pool_alloc_free() {
    let catalog = TrackCatalog::builtin().unwrap();
    let mut state = SchedulerState::new(catalog.get("ice").unwrap().clone(), 0.05);
    state.enable_intensity();
    // few voices so that nearly every step steals
    let mut engine = Engine::with_voices(SAMPLE_RATE, 4);
    let mut block = vec![Frame::silence(); BLOCK];

    for _ in 0..blocks_for(BAR_DURATION * 3.0) {
        tick(&mut state, &mut engine, LOOKAHEAD);
        engine.render_block(&mut block);
    }

    assert_no_alloc(|| {
        for _ in 0..blocks_for(5.0) {
            tick(&mut state, &mut engine, LOOKAHEAD);
            engine.render_block(&mut block);
        }
    });
}
