use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use slidecast_core::{
    build_slides, build_timeline, probe_duration, render_slide, AppConfig, ComposeRequest,
    Compositor, EducationalContent, Narration, Script, SlideOptions, SlidecastError,
    SpeakerClip,
};
use tracing_subscriber::EnvFilter;

fn main() -> slidecast_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Compose {
            script,
            narration,
            duration,
            speaker,
            music,
            logo,
            content,
            output,
        } => {
            let mut config = config;
            if let Some(path) = logo {
                config.composition.logo.enabled = true;
                config.composition.logo.path = Some(path);
            }
            run_compose(
                config,
                &script,
                narration,
                duration,
                speaker,
                music,
                content.as_deref(),
                output,
            )
        }
        Commands::Timeline { script, duration } => run_timeline(&config, &script, duration),
        Commands::Slides {
            script,
            duration,
            out_dir,
        } => run_slides(config, &script, duration, &out_dir),
        Commands::Preview {
            script,
            duration,
            time,
            output,
        } => run_preview(config, &script, duration, time, &output),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_compose(
    config: AppConfig,
    script: &Path,
    narration: PathBuf,
    duration: Option<f64>,
    speaker: Option<PathBuf>,
    music: Option<PathBuf>,
    content: Option<&Path>,
    output: PathBuf,
) -> slidecast_core::Result<()> {
    tracing::info!(?script, ?narration, ?output, "composing video");
    let script = Script::load(script)?;
    let duration = match duration {
        Some(seconds) => seconds,
        None => probe_duration(&config.video.ffprobe_path, &narration)?,
    };
    let speaker = match speaker {
        Some(path) => {
            let duration = probe_duration(&config.video.ffprobe_path, &path)?;
            Some(SpeakerClip { path, duration })
        }
        None => None,
    };

    let rate = config.timing.speaking_rate_wpm;
    let mut request = ComposeRequest::from_script(
        &script,
        Narration {
            path: narration,
            duration,
        },
        rate,
        output,
    );
    request.speaker = speaker;
    request.music = music;
    if let Some(path) = content {
        request.content = EducationalContent::load(path)?;
    }

    let result = Compositor::from_config(config).compose(&request);
    println!("{}", serde_json::to_string_pretty(&result)?);
    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}

fn run_timeline(config: &AppConfig, script: &Path, duration: Option<f64>) -> slidecast_core::Result<()> {
    let script = Script::load(script)?;
    let mut timeline = build_timeline(&script.segments, config.timing.speaking_rate_wpm);
    if let Some(seconds) = duration {
        timeline = timeline.with_narration_duration(seconds);
    }
    let offset = if config.composition.intro.enabled {
        config.composition.intro.duration
    } else {
        0.0
    };

    let report = serde_json::json!({
        "total_duration": timeline.total_duration(),
        "drift": timeline.drift(),
        "segments": timeline.segments(),
        "chapters": timeline.video_chapters(offset),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_slides(config: AppConfig, script: &Path, duration: f64, out_dir: &Path) -> slidecast_core::Result<()> {
    let script = Script::load(script)?;
    let timeline = build_timeline(&script.segments, config.timing.speaking_rate_wpm)
        .with_narration_duration(duration);
    let slides = build_slides(&timeline, config.composition.slides.max_key_points);
    let opts = SlideOptions::from(&config.composition.slides);
    let compositor = Compositor::from_config(config);
    let canvas = compositor.config().canvas();

    std::fs::create_dir_all(out_dir)?;
    for slide in &slides {
        let pixmap = render_slide(slide, canvas, &opts, compositor.context())?;
        let path = out_dir.join(format!("slide_{:02}.png", slide.topic_number));
        pixmap
            .save_png(&path)
            .map_err(|e| SlidecastError::render(format!("writing {}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), "wrote slide");
    }
    println!("{} slides written to {}", slides.len(), out_dir.display());
    Ok(())
}

fn run_preview(
    config: AppConfig,
    script: &Path,
    duration: f64,
    time: f64,
    output: &Path,
) -> slidecast_core::Result<()> {
    let script = Script::load(script)?;
    let rate = config.timing.speaking_rate_wpm;
    let request = ComposeRequest::from_script(
        &script,
        Narration {
            path: PathBuf::new(),
            duration,
        },
        rate,
        output,
    );
    let frame = Compositor::from_config(config).preview(&request, time)?;
    frame
        .save_png(output)
        .map_err(|e| SlidecastError::render(format!("writing {}: {e}", output.display())))?;
    tracing::info!(time, path = %output.display(), "wrote preview frame");
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Timed layered video compositor", long_about = None)]
struct Cli {
    /// JSON configuration file; defaults apply to anything it leaves out.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render and encode the full video.
    Compose {
        #[arg(long)]
        script: PathBuf,
        #[arg(long)]
        narration: PathBuf,
        /// Measured narration length in seconds. Probed with ffprobe if absent.
        #[arg(long)]
        duration: Option<f64>,
        /// Talking-head clip, already muxed with the narration.
        #[arg(long)]
        speaker: Option<PathBuf>,
        #[arg(long)]
        music: Option<PathBuf>,
        /// Corner watermark PNG. Enables the logo overlay.
        #[arg(long)]
        logo: Option<PathBuf>,
        /// Key points, images and statistics for the card overlays.
        #[arg(long)]
        content: Option<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print the scheduled segments and chapter markers as JSON.
    Timeline {
        #[arg(long)]
        script: PathBuf,
        #[arg(long)]
        duration: Option<f64>,
    },
    /// Write one PNG per content slide.
    Slides {
        #[arg(long)]
        script: PathBuf,
        #[arg(long)]
        duration: f64,
        #[arg(long)]
        out_dir: PathBuf,
    },
    /// Composite a single frame to PNG.
    Preview {
        #[arg(long)]
        script: PathBuf,
        #[arg(long)]
        duration: f64,
        /// Position on the final track in seconds.
        #[arg(long)]
        time: f64,
        #[arg(short, long)]
        output: PathBuf,
    },
}
