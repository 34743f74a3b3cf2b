//! Integration test: controller → scheduler → offline engine → frames.

use cs_engine::{Mode, OutputBus, BAR_DURATION, STEP_DURATION};
use cs_master::{
    frames_to_wav, render_frames, render_to_wav, Controller, Frame, ManualWake, OfflineBackend, RenderPlan,
    ScoreConfig, DEFAULT_THEME,
};

type Offline = Controller<OfflineBackend, ManualWake>;

fn offline(sample_rate: u32) -> Offline {
    let config = ScoreConfig { sample_rate, ..ScoreConfig::default() };
    Controller::with_parts(OfflineBackend::default(), ManualWake::new(), config)
}

/// Render in blocks of the given sizes, waking the scheduler before each.
fn render_blocks(ctrl: &mut Offline, blocks: &[usize]) -> Vec<Frame> {
    let mut out = Vec::new();
    for &len in blocks {
        ctrl.wake_mut().trigger();
        ctrl.pump();
        let engine = ctrl.output_bus().unwrap();
        out.extend(engine.render_frames(len));
    }
    out
}

fn render_seconds(ctrl: &mut Offline, seconds: f64) -> Vec<Frame> {
    let rate = ctrl.output_bus().unwrap().sample_rate() as f64;
    let block = (rate * 0.025) as usize;
    let count = (seconds * rate / block as f64).ceil() as usize;
    render_blocks(ctrl, &vec![block; count])
}

fn max_amplitude(frames: &[Frame]) -> i16 {
    frames
        .iter()
        .flat_map(|f| [f.left.saturating_abs(), f.right.saturating_abs()])
        .max()
        .unwrap_or(0)
}

// --- themes ---

#[test]
fn every_theme_renders_nonsilent() {
    let config = ScoreConfig { sample_rate: 22050, ..ScoreConfig::default() };
    let ctrl = offline(22050);
    let themes: Vec<String> = ctrl.catalog().theme_ids().map(String::from).collect();
    assert_eq!(themes.len(), 6);

    for theme in themes {
        let frames = render_frames(&RenderPlan::new(theme.as_str(), 2.0), &config).unwrap();
        assert!(max_amplitude(&frames) > 500, "theme {} is silent", theme);
    }
}

#[test]
fn unknown_theme_renders_default() {
    let config = ScoreConfig { sample_rate: 11025, ..ScoreConfig::default() };
    let fallback = render_frames(&RenderPlan::new("nonexistent-theme", 3.0), &config).unwrap();
    let default = render_frames(&RenderPlan::new(DEFAULT_THEME, 3.0), &config).unwrap();
    assert_eq!(fallback, default);
}

#[test]
fn themes_differ() {
    let config = ScoreConfig { sample_rate: 11025, ..ScoreConfig::default() };
    let default = render_frames(&RenderPlan::new(DEFAULT_THEME, 2.0), &config).unwrap();
    let volcano = render_frames(&RenderPlan::new("volcano", 2.0), &config).unwrap();
    assert_ne!(default, volcano);
}

// --- timing ---

#[test]
fn irregular_wakes_keep_the_step_grid() {
    let mut ctrl = offline(44100);
    ctrl.play();
    let start = ctrl.scheduler().unwrap().next_event_time() - STEP_DURATION;

    render_blocks(&mut ctrl, &[300, 2000, 17, 4410, 1, 900, 3333, 30000, 64, 5000, 441, 44100, 2500]);

    let state = ctrl.scheduler().unwrap();
    let steps = state.bar_index() * 16 + state.step_index() as u64;
    let expected = start + steps as f64 * STEP_DURATION;
    assert!(steps > 16);
    assert!((state.next_event_time() - expected).abs() < 1e-9);
}

#[test]
fn scheduler_stays_ahead_of_the_clock() {
    let mut ctrl = offline(44100);
    ctrl.play();
    for _ in 0..50 {
        render_blocks(&mut ctrl, &[1102]);
        let now = ctrl.output_bus().unwrap().now();
        let next = ctrl.scheduler().unwrap().next_event_time();
        assert!(next >= now, "step at {} already passed at {}", next, now);
    }
}

// --- intensity ---

#[test]
fn escalation_waits_for_the_bar_line() {
    let mut ctrl = offline(22050);
    ctrl.play();
    render_seconds(&mut ctrl, BAR_DURATION * 1.4);
    assert_eq!(ctrl.position().map(|(bar, _)| bar), Some(1));

    ctrl.set_drums(true);
    let bar_at_request = ctrl.position().unwrap().0;
    while ctrl.position().unwrap().0 == bar_at_request {
        assert_eq!(ctrl.mode(), Some(Mode::Ambient));
        render_blocks(&mut ctrl, &[256]);
    }
    assert_eq!(ctrl.mode(), Some(Mode::Transition));

    render_seconds(&mut ctrl, BAR_DURATION * 1.2);
    assert_eq!(ctrl.mode(), Some(Mode::Active));
    // bar counter restarts when combat material begins
    assert_eq!(ctrl.position().map(|(bar, _)| bar), Some(0));
}

#[test]
fn combat_drums_are_audible_and_stop_on_release() {
    let config = ScoreConfig { sample_rate: 22050, ..ScoreConfig::default() };
    let calm = render_frames(&RenderPlan::new(DEFAULT_THEME, BAR_DURATION * 4.0), &config).unwrap();
    let combat =
        render_frames(&RenderPlan::new(DEFAULT_THEME, BAR_DURATION * 4.0).escalate_at_bar(0), &config).unwrap();
    let last_bar = calm.len() - (BAR_DURATION * 22050.0) as usize;
    assert!(max_amplitude(&combat[last_bar..]) > max_amplitude(&calm[last_bar..]));

    let mut ctrl = offline(22050);
    ctrl.set_drums(true);
    ctrl.play();
    render_seconds(&mut ctrl, BAR_DURATION * 2.5);
    assert_eq!(ctrl.mode(), Some(Mode::Active));
    ctrl.set_drums(false);
    assert_eq!(ctrl.mode(), Some(Mode::Ambient));
    assert!(!ctrl.scheduler().unwrap().drums_enabled());
}

// --- transport ---

#[test]
fn play_is_idempotent_and_stop_resets() {
    let mut ctrl = offline(22050);
    ctrl.play();
    render_seconds(&mut ctrl, 2.5);
    let position = ctrl.position();
    ctrl.play();
    assert_eq!(ctrl.position(), position);

    ctrl.stop();
    assert_eq!(ctrl.position(), None);
    // already-submitted notes still ring out
    let tail = render_blocks(&mut ctrl, &[2205]);
    assert!(max_amplitude(&tail) > 0);

    ctrl.play();
    assert_eq!(ctrl.position(), Some((0, 1)));
}

#[test]
fn stopped_controller_schedules_nothing() {
    let mut ctrl = offline(22050);
    ctrl.play();
    ctrl.stop();
    render_seconds(&mut ctrl, 1.0);
    let silence = render_blocks(&mut ctrl, &[22050]);
    assert_eq!(max_amplitude(&silence), 0);
}

#[test]
fn muted_output_is_silent() {
    let mut ctrl = offline(22050);
    ctrl.toggle_mute();
    ctrl.play();
    let frames = render_seconds(&mut ctrl, 2.0);
    assert_eq!(max_amplitude(&frames), 0);
    assert!(ctrl.is_playing());
}

// --- export ---

#[test]
fn wav_export_writes_every_frame() {
    let config = ScoreConfig { sample_rate: 8000, ..ScoreConfig::default() };
    let plan = RenderPlan::new("dungeon", 1.0).victory_at(0.2);
    let path = std::env::temp_dir().join(format!("chipscore-export-{}.wav", std::process::id()));

    let frames = render_to_wav(&path, &plan, &config).unwrap();
    assert_eq!(frames, 8000);
    let bytes = std::fs::read(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"WAVE");
    assert!(bytes.len() >= frames * 4);

    let in_memory = frames_to_wav(&render_frames(&plan, &config).unwrap(), 8000).unwrap();
    assert_eq!(bytes, in_memory);
}
