//! Offline rendering and 16-bit stereo WAV export.

use std::io::{Cursor, Seek, Write};
use std::path::Path;

use cs_engine::{Frame, ScoreConfig};
use hound::{SampleFormat, WavSpec, WavWriter};
use thiserror::Error;
use tracing::debug;

use crate::backend::OfflineBackend;
use crate::wake::ManualWake;
use crate::Controller;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("wav export failed: {0}")]
    Wav(#[from] hound::Error),
    #[error("render length must be a finite, non-negative number of seconds (got {0})")]
    Length(f64),
    #[error("sample rate must be non-zero")]
    SampleRate,
    #[error("offline output failed to open")]
    Unavailable,
}

/// What to render: a theme, a length, and optional scripted events.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderPlan {
    pub theme: String,
    pub seconds: f64,
    /// Request escalation once this bar has started.
    pub escalate_at_bar: Option<u64>,
    /// Play the victory jingle at this time, in seconds.
    pub victory_at: Option<f64>,
}

impl RenderPlan {
    pub fn new(theme: impl Into<String>, seconds: f64) -> Self {
        Self { theme: theme.into(), seconds, escalate_at_bar: None, victory_at: None }
    }

    pub fn escalate_at_bar(mut self, bar: u64) -> Self {
        self.escalate_at_bar = Some(bar);
        self
    }

    pub fn victory_at(mut self, seconds: f64) -> Self {
        self.victory_at = Some(seconds);
        self
    }
}

/// Render `plan` at `config.sample_rate`, waking the scheduler once per
/// `config.wake_interval` of audio.
pub fn render_frames(plan: &RenderPlan, config: &ScoreConfig) -> Result<Vec<Frame>, RenderError> {
    if !plan.seconds.is_finite() || plan.seconds < 0.0 {
        return Err(RenderError::Length(plan.seconds));
    }
    wav_spec(config.sample_rate)?;
    let sample_rate = config.sample_rate as f64;
    let total = (plan.seconds * sample_rate).round() as usize;
    let block = ((config.wake_interval.as_secs_f64() * sample_rate).round() as usize).max(1);

    let mut controller = Controller::with_parts(OfflineBackend::default(), ManualWake::new(), config.clone());
    controller.set_track(&plan.theme);
    controller.play();

    let mut frames = vec![Frame::silence(); total];
    let mut escalated = false;
    let mut victory_played = false;
    let mut rendered = 0;

    while rendered < total {
        let escalate_due = plan
            .escalate_at_bar
            .is_some_and(|bar| controller.position().is_some_and(|(current, _)| current >= bar));
        if !escalated && escalate_due {
            controller.set_drums(true);
            escalated = true;
        }

        let now = rendered as f64 / sample_rate;
        if !victory_played && plan.victory_at.is_some_and(|at| now >= at) {
            controller.play_victory_jingle();
            victory_played = true;
        }

        controller.wake_mut().trigger();
        controller.pump();

        let end = (rendered + block).min(total);
        let engine = controller.output_bus().ok_or(RenderError::Unavailable)?;
        engine.render_block(&mut frames[rendered..end]);
        rendered = end;
    }

    debug!(theme = controller.selected_track(), frames = total, "offline render finished");
    Ok(frames)
}

fn wav_spec(sample_rate: u32) -> Result<WavSpec, RenderError> {
    if sample_rate == 0 {
        return Err(RenderError::SampleRate);
    }
    Ok(WavSpec { channels: 2, sample_rate, bits_per_sample: 16, sample_format: SampleFormat::Int })
}

fn write_samples<W: Write + Seek>(mut wav: WavWriter<W>, frames: &[Frame]) -> Result<(), RenderError> {
    for frame in frames {
        wav.write_sample(frame.left)?;
        wav.write_sample(frame.right)?;
    }
    wav.finalize()?;
    Ok(())
}

pub fn write_wav<W: Write + Seek>(writer: W, frames: &[Frame], sample_rate: u32) -> Result<(), RenderError> {
    write_samples(WavWriter::new(writer, wav_spec(sample_rate)?)?, frames)
}

pub fn frames_to_wav(frames: &[Frame], sample_rate: u32) -> Result<Vec<u8>, RenderError> {
    let mut buf = Cursor::new(Vec::new());
    write_wav(&mut buf, frames, sample_rate)?;
    Ok(buf.into_inner())
}

/// Render `plan` straight to a WAV file. Returns the number of frames written.
pub fn render_to_wav(path: impl AsRef<Path>, plan: &RenderPlan, config: &ScoreConfig) -> Result<usize, RenderError> {
    let frames = render_frames(plan, config)?;
    write_samples(WavWriter::create(path, wav_spec(config.sample_rate)?)?, &frames)?;
    Ok(frames.len())
}
