//! Media encoder seam. The compositor hands a finished [`Program`] to an
//! [`Encoder`]; the ffmpeg implementation turns it into one
//! `-filter_complex` invocation.

mod graph;

pub use graph::{plan, EncodePlan, NARRATION_INPUT};

use std::path::Path;
use std::process::{Command, Stdio};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::audio::MusicBed;
use crate::compositor::Program;
use crate::config::VideoConfig;
use crate::{Result, SlidecastError};

const STDERR_TAIL_LINES: usize = 20;

/// Encoder options derived from the video section of the config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderSettings {
    pub ffmpeg_path: String,
    pub fps: u32,
    pub preset: String,
    pub bitrate: String,
    pub threads: u32,
    pub audio_bitrate: String,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self::from(&VideoConfig::default())
    }
}

impl From<&VideoConfig> for EncoderSettings {
    fn from(video: &VideoConfig) -> Self {
        Self {
            ffmpeg_path: video.ffmpeg_path.clone(),
            fps: video.fps,
            preset: video.preset.clone(),
            bitrate: video.bitrate.clone(),
            threads: video.threads,
            audio_bitrate: "192k".to_string(),
        }
    }
}

/// One export request.
#[derive(Debug, Clone, Copy)]
pub struct EncodeJob<'a> {
    pub program: &'a Program,
    pub narration: &'a Path,
    pub music: Option<&'a MusicBed>,
    pub output: &'a Path,
    /// Scratch directory for intermediate stills.
    pub workdir: &'a Path,
}

pub trait Encoder {
    fn encode(&self, job: &EncodeJob<'_>) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct FfmpegEncoder {
    settings: EncoderSettings,
}

impl FfmpegEncoder {
    pub fn new(settings: EncoderSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EncoderSettings {
        &self.settings
    }
}

impl Encoder for FfmpegEncoder {
    fn encode(&self, job: &EncodeJob<'_>) -> Result<()> {
        let plan = plan(
            job.program,
            &self.settings,
            job.narration,
            job.music,
            job.output,
            job.workdir,
        );

        plan.stills.par_iter().try_for_each(|(path, pixmap)| {
            pixmap
                .save_png(path)
                .map_err(|e| SlidecastError::render(format!("writing {}: {e}", path.display())))
        })?;
        info!(stills = plan.stills.len(), dir = %job.workdir.display(), "staged overlay stills");

        if let Some(parent) = job.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        debug!("ffmpeg args: {:?}", plan.args);
        let output = Command::new(&self.settings.ffmpeg_path)
            .args(&plan.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                SlidecastError::Export(format!("could not start {}: {e}", self.settings.ffmpeg_path))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SlidecastError::Export(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr_tail(&stderr)
            )));
        }
        Ok(())
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().collect();
    let skip = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[skip..].join("\n")
}

/// Container duration in seconds, read with ffprobe.
pub fn probe_duration(ffprobe: &str, path: &Path) -> Result<f64> {
    if !path.is_file() {
        return Err(SlidecastError::missing("media file", path));
    }
    let output = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .map_err(|e| SlidecastError::Export(format!("could not start {ffprobe}: {e}")))?;

    if !output.status.success() {
        return Err(SlidecastError::Export(format!(
            "ffprobe failed on {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    parse_probe_output(&String::from_utf8_lossy(&output.stdout))
}

fn parse_probe_output(stdout: &str) -> Result<f64> {
    stdout
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| SlidecastError::msg(format!("unexpected ffprobe output `{}`", stdout.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::{Part, PartKind};
    use crate::theme::Rgb;

    #[test]
    fn settings_follow_video_config() {
        let video = VideoConfig {
            fps: 25,
            preset: "fast".to_string(),
            ffmpeg_path: "/opt/ffmpeg".to_string(),
            ..VideoConfig::default()
        };
        let settings = EncoderSettings::from(&video);
        assert_eq!(settings.fps, 25);
        assert_eq!(settings.preset, "fast");
        assert_eq!(settings.ffmpeg_path, "/opt/ffmpeg");
    }

    #[test]
    fn missing_binary_is_an_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut program = Program::new((16, 16), 30);
        program.push(Part::new(PartKind::Intro, 1.0, Rgb::BLACK));
        let encoder = FfmpegEncoder::new(EncoderSettings {
            ffmpeg_path: dir.path().join("no-such-ffmpeg").to_string_lossy().to_string(),
            ..EncoderSettings::default()
        });
        let job = EncodeJob {
            program: &program,
            narration: Path::new("/in/voice.mp3"),
            music: None,
            output: &dir.path().join("out.mp4"),
            workdir: dir.path(),
        };

        let err = encoder.encode(&job).unwrap_err();
        assert!(matches!(err, SlidecastError::Export(_)));
    }

    #[test]
    fn stderr_is_cut_to_its_tail() {
        let noisy: String = (0..50).map(|i| format!("line {i}\n")).collect();
        let tail = stderr_tail(&noisy);
        assert!(tail.starts_with("line 30"));
        assert!(tail.ends_with("line 49"));
    }

    #[test]
    fn probe_output_parses_seconds() {
        assert_eq!(parse_probe_output("312.480000\n").unwrap(), 312.48);
        assert!(parse_probe_output("N/A").is_err());
    }

    #[test]
    fn probing_a_missing_file_fails_fast() {
        let err = probe_duration("ffprobe", Path::new("/no/such/voice.mp3")).unwrap_err();
        assert!(matches!(err, SlidecastError::MissingInput { .. }));
    }
}
