use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;

/// Top-level configuration structure for the compositor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub video: VideoConfig,
    pub composition: CompositionConfig,
    pub timing: TimingConfig,
    pub fonts: FontConfig,
    /// Leave the per-run PNG handoff directory on disk after export.
    pub keep_intermediates: bool,
}

impl AppConfig {
    /// Reads a JSON config file. Missing keys fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&raw)?;
        Ok(config)
    }

    pub fn canvas(&self) -> (u32, u32) {
        (self.video.width, self.video.height)
    }
}

/// Output stream settings handed to the encoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub preset: String,
    pub bitrate: String,
    pub threads: u32,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: 30,
            preset: "medium".to_string(),
            bitrate: "5000k".to_string(),
            threads: 4,
            ffmpeg_path: locate_binary("ffmpeg"),
            ffprobe_path: locate_binary("ffprobe"),
        }
    }
}

fn locate_binary(name: &str) -> String {
    which::which(name).map_or_else(|_| name.to_string(), |p| p.to_string_lossy().to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionConfig {
    pub background_color: String,
    pub speaker: SpeakerConfig,
    pub slides: SlidesConfig,
    pub intro: IntroConfig,
    pub outro: OutroConfig,
    pub ticker: TickerConfig,
    pub headline: HeadlineConfig,
    pub music: MusicConfig,
    pub logo: LogoConfig,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            background_color: "#0f1419".to_string(),
            speaker: SpeakerConfig::default(),
            slides: SlidesConfig::default(),
            intro: IntroConfig::default(),
            outro: OutroConfig::default(),
            ticker: TickerConfig::default(),
            headline: HeadlineConfig::default(),
            music: MusicConfig::default(),
            logo: LogoConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    #[default]
    Left,
    Center,
    Right,
}

/// Placement of the foreground speaker clip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeakerConfig {
    /// Fraction of the canvas height the clip is scaled to.
    pub scale: f32,
    pub anchor: Anchor,
    pub x_offset: i32,
    pub y_offset: i32,
}

impl Default for SpeakerConfig {
    fn default() -> Self {
        Self {
            scale: 0.55,
            anchor: Anchor::Left,
            x_offset: -50,
            y_offset: 80,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermsStyle {
    #[default]
    Badges,
    Table,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlidesConfig {
    pub enabled: bool,
    /// Fraction of the canvas width where slide content begins.
    pub content_start_x: f32,
    pub max_key_points: usize,
    pub terms_style: TermsStyle,
    /// Numbered circular badges on key-point cards instead of bullet dots.
    pub numbered: bool,
    pub product_label: String,
}

impl Default for SlidesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            content_start_x: 0.33,
            max_key_points: 4,
            terms_style: TermsStyle::Badges,
            numbered: true,
            product_label: "UPSC Current Affairs".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroConfig {
    pub enabled: bool,
    pub duration: f64,
    pub text: String,
    pub exam_tag: String,
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration: 4.0,
            text: "UPSC Daily Current Affairs".to_string(),
            exam_tag: "UPSC CSE".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutroConfig {
    pub enabled: bool,
    pub duration: f64,
    pub text: String,
    pub call_to_action: String,
    pub background: String,
}

impl Default for OutroConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration: 6.0,
            text: "Best of luck with your preparation!".to_string(),
            call_to_action: "Subscribe for daily UPSC updates!\nPDF Notes in Description!"
                .to_string(),
            background: "#1a1a2e".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerConfig {
    pub enabled: bool,
    pub font_size: f32,
    pub color: String,
    pub background: String,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            font_size: 28.0,
            color: "#ffffff".to_string(),
            background: "#1a365d".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StripPosition {
    Top,
    Center,
    #[default]
    Bottom,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlineConfig {
    pub enabled: bool,
    pub font_size: f32,
    pub color: String,
    pub background: String,
    pub opacity: f32,
    pub position: StripPosition,
}

impl Default for HeadlineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            font_size: 48.0,
            color: "#ffffff".to_string(),
            background: "#000000".to_string(),
            opacity: 0.7,
            position: StripPosition::Bottom,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicConfig {
    pub enabled: bool,
    /// Gain applied to the music bed relative to narration.
    pub volume: f32,
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    TopLeft,
    #[default]
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Corner watermark shown over the whole body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoConfig {
    pub enabled: bool,
    pub path: Option<PathBuf>,
    pub position: Corner,
    /// Logo width as a fraction of the canvas width.
    pub scale: f32,
    pub opacity: f32,
}

impl Default for LogoConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: None,
            position: Corner::TopRight,
            scale: 0.1,
            opacity: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Words per minute used to estimate segment durations.
    pub speaking_rate_wpm: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            speaking_rate_wpm: crate::timeline::DEFAULT_SPEAKING_RATE_WPM,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Font files tried in order; the first one that parses wins.
    pub search_paths: Vec<PathBuf>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            search_paths: vec![
                PathBuf::from("assets/fonts/NotoSans-Bold.ttf"),
                PathBuf::from("arial.ttf"),
                PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
                PathBuf::from("/usr/share/fonts/TTF/DejaVuSans.ttf"),
                PathBuf::from("/System/Library/Fonts/Supplemental/Arial.ttf"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let raw = r#"{
            "video": { "width": 1280, "height": 720 },
            "composition": { "speaker": { "anchor": "right" }, "slides": { "terms_style": "table" } }
        }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();

        assert_eq!(config.canvas(), (1280, 720));
        assert_eq!(config.video.fps, 30);
        assert_eq!(config.composition.speaker.anchor, Anchor::Right);
        assert_eq!(config.composition.speaker.scale, 0.55);
        assert_eq!(config.composition.slides.terms_style, TermsStyle::Table);
        assert_eq!(config.composition.slides.max_key_points, 4);
        assert_eq!(config.timing.speaking_rate_wpm, 140.0);
    }

    #[test]
    fn logo_section_uses_kebab_case_corners() {
        let raw = r#"{ "composition": { "logo": { "enabled": true, "path": "brand.png", "position": "bottom-left" } } }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        let logo = &config.composition.logo;

        assert!(logo.enabled);
        assert_eq!(logo.path.as_deref(), Some(Path::new("brand.png")));
        assert_eq!(logo.position, Corner::BottomLeft);
        assert_eq!(logo.opacity, 0.7);
        assert!(!AppConfig::default().composition.logo.enabled);
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "keep_intermediates": true }"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert!(config.keep_intermediates);
        assert_eq!(config.composition.intro.duration, 4.0);
    }
}
