//! chipscore CLI: live playback, WAV export and theme listing.
//!
//! Usage:
//!   cs-cli play --theme dungeon --seconds 30 --escalate-after 4
//!   cs-cli render out.wav --theme ice --seconds 20 --jingle
//!   cs-cli themes

use clap::{Args, Parser, Subcommand};
use cs_master::{render_to_wav, Controller, RenderPlan, ScoreConfig, DEFAULT_THEME};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Time left after the victory jingle for it to ring out.
const JINGLE_TAIL: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(name = "cs-cli")]
#[command(about = "Adaptive chiptune score player")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a theme on the default audio device
    Play(PlayArgs),

    /// Render a theme to a 16-bit stereo WAV file
    Render(RenderArgs),

    /// List the built-in themes
    Themes,
}

#[derive(Args)]
struct ScoreArgs {
    /// Theme id (unknown ids fall back to the default theme)
    #[arg(short, long, default_value = DEFAULT_THEME)]
    theme: String,

    /// Length in seconds
    #[arg(short, long, default_value_t = 20.0)]
    seconds: f64,

    /// Request combat intensity once this bar starts
    #[arg(short, long, value_name = "BARS")]
    escalate_after: Option<u64>,

    /// Finish with the victory jingle
    #[arg(short, long)]
    jingle: bool,
}

#[derive(Args)]
struct PlayArgs {
    #[command(flatten)]
    score: ScoreArgs,

    /// Master volume, 0.0 to 1.0
    #[arg(short, long, default_value_t = 0.3)]
    volume: f32,
}

#[derive(Args)]
struct RenderArgs {
    /// Output WAV path
    wav: PathBuf,

    #[command(flatten)]
    score: ScoreArgs,

    /// Output sample rate in Hz
    #[arg(short = 'r', long, default_value_t = 44100)]
    sample_rate: u32,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Play(args) => play(args),
        Commands::Render(args) => render(args),
        Commands::Themes => {
            let controller = Controller::new();
            for id in controller.catalog().theme_ids() {
                let marker = if id == DEFAULT_THEME { " (default)" } else { "" };
                println!("{}{}", id, marker);
            }
            ExitCode::SUCCESS
        }
    }
}

fn play(args: PlayArgs) -> ExitCode {
    let score = args.score;
    let Ok(length) = Duration::try_from_secs_f64(score.seconds) else {
        error!(seconds = score.seconds, "invalid length");
        return ExitCode::FAILURE;
    };
    let config = ScoreConfig { master_volume: args.volume, ..ScoreConfig::default() };
    let mut ctrl = Controller::with_config(config);
    ctrl.set_track(&score.theme);
    ctrl.play();
    if !ctrl.is_playing() {
        error!("no audio output available");
        return ExitCode::FAILURE;
    }
    info!(theme = ctrl.selected_track(), "playing");

    let started = Instant::now();
    let mut escalated = false;

    while started.elapsed() < length {
        if let (Some(bar), Some((current, _))) = (score.escalate_after, ctrl.position()) {
            if !escalated && current >= bar {
                ctrl.set_drums(true);
                escalated = true;
                info!(bar = current, "escalating");
            }
        }
        ctrl.pump();

        if let (Some((bar, step)), Some(mode)) = (ctrl.position(), ctrl.mode()) {
            print!("\rBar: {:3} | Step: {:2} | {:?}      ", bar, step, mode);
            let _ = std::io::stdout().flush();
        }
        let nap = ctrl.wake().until_next().unwrap_or(Duration::from_millis(5));
        std::thread::sleep(nap.max(Duration::from_millis(1)));
    }
    println!();

    ctrl.stop();
    if score.jingle {
        ctrl.play_victory_jingle();
        std::thread::sleep(JINGLE_TAIL);
    }
    println!("Done.");
    ExitCode::SUCCESS
}

fn render(args: RenderArgs) -> ExitCode {
    let score = args.score;
    let config = ScoreConfig { sample_rate: args.sample_rate, ..ScoreConfig::default() };

    let mut plan = RenderPlan::new(score.theme, score.seconds);
    if let Some(bar) = score.escalate_after {
        plan = plan.escalate_at_bar(bar);
    }
    if score.jingle {
        // leave room for the jingle to ring out at the end
        plan.victory_at = Some((plan.seconds - JINGLE_TAIL.as_secs_f64()).max(0.0));
    }

    println!("Rendering {} to {} at {} Hz...", plan.theme, args.wav.display(), config.sample_rate);
    match render_to_wav(&args.wav, &plan, &config) {
        Ok(frames) => {
            println!("Rendered {} frames", frames);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("render failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
