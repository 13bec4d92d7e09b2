//! Assembles intro, body and outro into one program and hands it to an
//! encoder. `compose` is the failure boundary: it always returns a
//! [`CompositeResult`].

mod layer;
mod program;

pub use layer::{z, Layer, LayerStack, SpeakerPlacement, Visual};
pub use program::{Part, PartKind, Program};

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use tiny_skia::Pixmap;
use tracing::{debug, error, info, warn};

use crate::assets::{rendering_context, require_file};
use crate::audio::MusicBed;
use crate::config::AppConfig;
use crate::export::{EncodeJob, Encoder, EncoderSettings, FfmpegEncoder};
use crate::overlay::{
    headline_strip, headline_text, image_card, intro_card, key_point_card, logo_overlay,
    outro_card, stats_card, ticker, ticker_text, topic_header, topic_headers, HEADER_FADE,
};
use crate::render::RenderingContext;
use crate::script::{EducationalContent, Narration, Script, SpeakerClip};
use crate::slide::{build_slides, render_slide, Slide, SlideOptions};
use crate::theme::Rgb;
use crate::timeline::{build_timeline, Chapter, Timeline, Window};
use crate::{Result, SlidecastError};

/// Topic headers are short when slides already name the topic.
const HEADER_WITH_SLIDES: f64 = 2.0;
const HEADER_WITHOUT_SLIDES: f64 = 4.0;
const BODY_FADE: f64 = 0.5;
const NO_FONT_WARNING: &str = "no usable font was found; slide and overlay text was not drawn";

/// Which overlay family decorates the body. Chosen once per run.
#[derive(Debug, Clone)]
pub enum OverlayStrategy {
    Slides(Vec<Slide>),
    Cards(EducationalContent),
}

impl OverlayStrategy {
    pub fn select(config: &AppConfig, timeline: &Timeline, content: &EducationalContent) -> Self {
        let slides = &config.composition.slides;
        if slides.enabled && timeline.content_segments().next().is_some() {
            Self::Slides(build_slides(timeline, slides.max_key_points))
        } else {
            Self::Cards(content.clone())
        }
    }

    pub fn header_duration(&self) -> f64 {
        match self {
            Self::Slides(_) => HEADER_WITH_SLIDES,
            Self::Cards(_) => HEADER_WITHOUT_SLIDES,
        }
    }
}

/// Inputs for one composite.
#[derive(Debug, Clone)]
pub struct ComposeRequest {
    pub narration: Narration,
    pub timeline: Timeline,
    pub headlines: Vec<String>,
    pub subjects: Vec<String>,
    pub date: String,
    pub speaker: Option<SpeakerClip>,
    pub music: Option<PathBuf>,
    pub content: EducationalContent,
    pub output: PathBuf,
}

impl ComposeRequest {
    pub fn from_script(
        script: &Script,
        narration: Narration,
        speaking_rate_wpm: f64,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            timeline: build_timeline(&script.segments, speaking_rate_wpm),
            narration,
            headlines: script.headlines.clone(),
            subjects: script.subjects_covered(),
            date: script.date.clone(),
            speaker: None,
            music: None,
            content: EducationalContent::default(),
            output: output.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeState {
    Validating,
    BuildingLayers,
    Concatenating,
    Exporting,
    Done,
    Failed,
}

impl fmt::Display for ComposeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validating => "validating",
            Self::BuildingLayers => "building layers",
            Self::Concatenating => "concatenating",
            Self::Exporting => "exporting",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompositeResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    pub duration: f64,
    pub resolution: String,
    pub chapter_timestamps: Vec<Chapter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Degradations that did not fail the run.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl CompositeResult {
    fn failure(error: &SlidecastError, canvas: (u32, u32)) -> Self {
        Self {
            success: false,
            output_path: None,
            duration: 0.0,
            resolution: resolution(canvas),
            chapter_timestamps: Vec::new(),
            error: Some(error.to_string()),
            warnings: Vec::new(),
        }
    }
}

fn resolution(canvas: (u32, u32)) -> String {
    format!("{}x{}", canvas.0, canvas.1)
}

fn advance(state: &mut ComposeState, next: ComposeState) {
    info!(from = %state, to = %next, "compose state");
    *state = next;
}

pub struct Compositor<E = FfmpegEncoder> {
    config: AppConfig,
    ctx: RenderingContext,
    encoder: E,
}

impl Compositor<FfmpegEncoder> {
    /// Loads fonts and wires the ffmpeg encoder from `config`.
    pub fn from_config(config: AppConfig) -> Self {
        let ctx = rendering_context(&config);
        let encoder = FfmpegEncoder::new(EncoderSettings::from(&config.video));
        Self::new(config, ctx, encoder)
    }
}

impl<E: Encoder> Compositor<E> {
    pub fn new(config: AppConfig, ctx: RenderingContext, encoder: E) -> Self {
        Self {
            config,
            ctx,
            encoder,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn context(&self) -> &RenderingContext {
        &self.ctx
    }

    /// Runs the whole pipeline. Never returns an error: failures come back
    /// as `success: false` with a readable message.
    pub fn compose(&self, request: &ComposeRequest) -> CompositeResult {
        let mut state = ComposeState::Validating;
        info!(
            narration = %request.narration.path.display(),
            output = %request.output.display(),
            "compose started"
        );
        match self.run(request, &mut state) {
            Ok(result) => {
                advance(&mut state, ComposeState::Done);
                result
            }
            Err(err) => {
                error!(stage = %state, %err, "compose failed");
                advance(&mut state, ComposeState::Failed);
                CompositeResult::failure(&err, self.config.canvas())
            }
        }
    }

    fn run(&self, request: &ComposeRequest, state: &mut ComposeState) -> Result<CompositeResult> {
        self.validate(request)?;

        advance(state, ComposeState::BuildingLayers);
        let timeline = request
            .timeline
            .clone()
            .with_narration_duration(request.narration.duration);
        let body = self.body_part(request, &timeline)?;

        advance(state, ComposeState::Concatenating);
        let program = self.assemble(request, body);
        info!(
            parts = program.parts.len(),
            video = program.total_duration(),
            audio = program.audio_duration(),
            "program assembled"
        );

        advance(state, ComposeState::Exporting);
        let music = request
            .music
            .as_ref()
            .filter(|_| self.config.composition.music.enabled)
            .map(|path| MusicBed::new(path, self.config.composition.music.volume));
        let workdir = tempfile::Builder::new().prefix("slidecast-").tempdir()?;
        self.encoder.encode(&EncodeJob {
            program: &program,
            narration: &request.narration.path,
            music: music.as_ref(),
            output: &request.output,
            workdir: workdir.path(),
        })?;
        if self.config.keep_intermediates {
            let kept = workdir.keep();
            info!(dir = %kept.display(), "kept intermediate stills");
        }

        let chapters = timeline.video_chapters(program.body_offset());
        let mut warnings = Vec::new();
        if !self.ctx.typeface.is_loaded() {
            warnings.push(NO_FONT_WARNING.to_string());
        }
        info!(
            output = %request.output.display(),
            duration = program.total_duration(),
            chapters = chapters.len(),
            "composite exported"
        );
        Ok(CompositeResult {
            success: true,
            output_path: Some(request.output.clone()),
            duration: program.total_duration(),
            resolution: resolution(program.canvas),
            chapter_timestamps: chapters,
            error: None,
            warnings,
        })
    }

    fn validate(&self, request: &ComposeRequest) -> Result<()> {
        require_file("narration", &request.narration.path)?;
        if !(request.narration.duration > 0.0) {
            return Err(SlidecastError::InvalidInput("narration duration must be positive"));
        }
        if let Some(speaker) = &request.speaker {
            require_file("speaker clip", &speaker.path)?;
        }
        if let Some(music) = request.music.as_ref().filter(|_| self.config.composition.music.enabled) {
            require_file("background music", music)?;
        }
        let logo = &self.config.composition.logo;
        if logo.enabled {
            let path = logo
                .path
                .as_deref()
                .ok_or(SlidecastError::InvalidInput("logo is enabled but no path is configured"))?;
            require_file("logo", path)?;
        }
        let (width, height) = self.config.canvas();
        if width == 0 || height == 0 || self.config.video.fps == 0 {
            return Err(SlidecastError::InvalidInput("canvas size and frame rate must be non-zero"));
        }
        Ok(())
    }

    /// Builds the program without touching the encoder.
    pub fn build_program(&self, request: &ComposeRequest) -> Result<Program> {
        let timeline = request
            .timeline
            .clone()
            .with_narration_duration(request.narration.duration);
        let body = self.body_part(request, &timeline)?;
        Ok(self.assemble(request, body))
    }

    /// Still frame of the composite at global time `t`, speaker excluded.
    pub fn preview(&self, request: &ComposeRequest, t: f64) -> Result<Pixmap> {
        let program = self.build_program(request)?;
        if let Some((part, local)) = program.locate(t) {
            let segment = (part.kind == PartKind::Body)
                .then(|| request.timeline.segment_at(local))
                .flatten();
            debug!(
                t,
                part = ?part.kind,
                local,
                segment = ?segment.map(|s| s.kind),
                "preview position"
            );
        }
        program.render_frame(t)
    }

    fn assemble(&self, request: &ComposeRequest, body: Part) -> Program {
        let canvas = self.config.canvas();
        let composition = &self.config.composition;
        let mut program = Program::new(canvas, self.config.video.fps);

        if composition.intro.enabled {
            let mut intro = Part::new(PartKind::Intro, composition.intro.duration, Rgb::BLACK);
            let card = intro_card(&composition.intro, &request.date, &request.subjects, canvas, &self.ctx);
            if let Some(card) = card {
                intro.layers.push(Layer::from_overlay("intro", z::TRANSITION, card));
            }
            program.push(intro);
        }

        program.push(body);

        if composition.outro.enabled {
            let mut outro = Part::new(PartKind::Outro, composition.outro.duration, Rgb::BLACK);
            if let Some(card) = outro_card(&composition.outro, canvas, &self.ctx) {
                outro.layers.push(Layer::from_overlay("outro", z::TRANSITION, card));
            }
            program.push(outro);
        }
        program
    }

    /// Background, then slides or cards, speaker, topic headers, headline
    /// strip, ticker and logo.
    fn body_part(&self, request: &ComposeRequest, timeline: &Timeline) -> Result<Part> {
        let canvas = self.config.canvas();
        let composition = &self.config.composition;
        let duration = timeline.total_duration();
        let background = Rgb::parse_hex(&composition.background_color)?;

        let mut body = Part::new(PartKind::Body, duration, background);
        body.video_fade = Some(BODY_FADE);

        let strategy = OverlayStrategy::select(&self.config, timeline, &request.content);
        if let OverlayStrategy::Cards(content) = &strategy {
            if content.is_empty() {
                info!("slides are off and no card content was supplied");
            }
        }
        let added = match &strategy {
            OverlayStrategy::Slides(slides) => body.layers.extend(self.slide_layers(slides)),
            OverlayStrategy::Cards(content) => body.layers.extend(self.card_layers(content)),
        };
        info!(
            strategy = match &strategy {
                OverlayStrategy::Slides(_) => "slides",
                OverlayStrategy::Cards(_) => "cards",
            },
            layers = added,
            "content overlays placed"
        );

        if let Some(clip) = &request.speaker {
            let length = if clip.duration > 0.0 { clip.duration.min(duration) } else { duration };
            let placement = SpeakerPlacement {
                path: clip.path.clone(),
                height: (canvas.1 as f32 * composition.speaker.scale).round().max(2.0) as u32,
                anchor: composition.speaker.anchor,
                x_offset: composition.speaker.x_offset,
                y_offset: composition.speaker.y_offset,
            };
            body.layers.push(Layer::new(
                "speaker",
                Window::new(0.0, length),
                z::SPEAKER,
                Visual::Speaker(placement),
            ));
        }

        let headers = topic_headers(timeline, strategy.header_duration());
        let placed = headers
            .iter()
            .filter_map(|topic| topic_header(topic, canvas, &self.ctx))
            .enumerate()
            .map(|(i, image)| Layer::from_overlay(format!("topic {}", i + 1), z::TRANSITION, image));
        let placed = body.layers.extend(placed);
        if placed < headers.len() {
            warn!(
                placed,
                scheduled = headers.len(),
                "some topic headers fall outside the narration"
            );
        }

        if composition.headline.enabled {
            let strip = headline_text(&request.headlines)
                .and_then(|text| headline_strip(&text, &composition.headline, canvas, duration, &self.ctx));
            if let Some(strip) = strip {
                body.layers.push(Layer::from_overlay("headline", z::HEADLINE, strip));
            }
        }

        if composition.ticker.enabled {
            let bar = ticker_text(&request.subjects, &request.headlines)
                .and_then(|text| ticker(&text, &composition.ticker, canvas, duration, &self.ctx));
            if let Some(bar) = bar {
                body.layers.push(Layer::from_overlay("ticker", z::TICKER, bar));
            }
        }

        let logo = &composition.logo;
        if logo.enabled {
            let image = logo
                .path
                .as_deref()
                .and_then(|path| logo_overlay(logo, path, canvas, duration));
            if let Some(image) = image {
                body.layers.push(Layer::from_overlay("logo", z::LOGO, image));
            }
        }

        Ok(body)
    }

    /// Slides render in parallel; layers come back in slide order.
    fn slide_layers(&self, slides: &[Slide]) -> Vec<Layer> {
        let canvas = self.config.canvas();
        let opts = SlideOptions::from(&self.config.composition.slides);
        let ctx = &self.ctx;
        let rendered: Vec<Option<Pixmap>> = slides
            .par_iter()
            .map(|slide| match render_slide(slide, canvas, &opts, ctx) {
                Ok(pixmap) => Some(pixmap),
                Err(err) => {
                    warn!(topic = slide.topic_number, %err, "skipping slide");
                    None
                }
            })
            .collect();

        slides
            .iter()
            .zip(rendered)
            .filter_map(|(slide, pixmap)| {
                let visual = Visual::Raster {
                    pixmap: Arc::new(pixmap?),
                    x: 0,
                    y: 0,
                };
                let mut layer = Layer::new(format!("slide {}", slide.topic_number), slide.window, z::SLIDE, visual);
                layer.fade_in = HEADER_FADE;
                layer.fade_out = HEADER_FADE;
                Some(layer)
            })
            .collect()
    }

    fn card_layers(&self, content: &EducationalContent) -> Vec<Layer> {
        let canvas = self.config.canvas();
        let key_points = content
            .key_points
            .iter()
            .filter_map(|cue| key_point_card(cue, canvas, &self.ctx))
            .map(|image| Layer::from_overlay("key point", z::CARD, image));
        let images = content
            .images
            .iter()
            .filter_map(|cue| image_card(cue, canvas, &self.ctx))
            .map(|image| Layer::from_overlay("image", z::CARD, image));
        let stats = content
            .statistics
            .iter()
            .filter_map(|cue| stats_card(cue, canvas, &self.ctx))
            .map(|image| Layer::from_overlay("stats", z::CARD, image));
        key_points.chain(images).chain(stats).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;

    use super::*;
    use crate::audio::AudioSource;
    use crate::render::Canvas;
    use crate::script::{KeyPointCue, ScriptSegment, SegmentKind};

    /// What the fake encoder saw.
    #[derive(Debug, Clone)]
    struct Recorded {
        kinds: Vec<PartKind>,
        video: f64,
        audio: f64,
        body_layers: Vec<String>,
        music: Option<PathBuf>,
    }

    #[derive(Default)]
    struct RecordingEncoder {
        jobs: Mutex<Vec<Recorded>>,
        fail: bool,
    }

    impl Encoder for RecordingEncoder {
        fn encode(&self, job: &EncodeJob<'_>) -> Result<()> {
            if self.fail {
                return Err(SlidecastError::Export("encoder exploded".to_string()));
            }
            let body_layers = job
                .program
                .parts
                .iter()
                .filter(|p| p.kind == PartKind::Body)
                .flat_map(|p| p.layers.layers().iter().map(|l| l.name.clone()))
                .collect();
            self.jobs.lock().unwrap().push(Recorded {
                kinds: job.program.parts.iter().map(|p| p.kind).collect(),
                video: job.program.total_duration(),
                audio: job.program.audio_duration(),
                body_layers,
                music: job.music.map(|m| m.path.clone()),
            });
            Ok(())
        }
    }

    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.video.width = 320;
        config.video.height = 180;
        config
    }

    fn compositor(config: AppConfig) -> Compositor<RecordingEncoder> {
        Compositor::new(config, RenderingContext::default(), RecordingEncoder::default())
    }

    fn content(title: &str, subject: &str, seconds: f64) -> ScriptSegment {
        let mut segment = ScriptSegment::new(SegmentKind::Content, "news");
        segment.duration = Some(seconds);
        segment.title = Some(title.to_string());
        segment.subject_category = Some(subject.to_string());
        segment.key_points = vec!["first point".to_string(), "second point".to_string()];
        segment
    }

    fn script() -> Script {
        let mut intro = ScriptSegment::new(SegmentKind::Intro, "hello");
        intro.duration = Some(20.0);
        Script {
            title: "Daily".to_string(),
            date: "2024-03-01".to_string(),
            segments: vec![
                intro,
                content("Budget", "Economy", 130.0),
                content("Monsoon session", "Polity", 150.0),
            ],
            headlines: vec!["Budget passed".to_string()],
        }
    }

    fn request(dir: &Path, seconds: f64) -> ComposeRequest {
        let voice = dir.join("voice.mp3");
        std::fs::write(&voice, b"ID3").unwrap();
        let narration = Narration {
            path: voice,
            duration: seconds,
        };
        ComposeRequest::from_script(&script(), narration, 140.0, dir.join("out.mp4"))
    }

    #[test]
    fn composes_intro_body_outro_with_matching_audio() {
        let dir = tempfile::tempdir().unwrap();
        let compositor = compositor(config());
        let result = compositor.compose(&request(dir.path(), 300.0));

        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.duration, 310.0);
        assert_eq!(result.resolution, "320x180");

        let jobs = compositor.encoder.jobs.lock().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].kinds, vec![PartKind::Intro, PartKind::Body, PartKind::Outro]);
        assert_eq!(jobs[0].video, 310.0);
        assert_eq!(jobs[0].audio, jobs[0].video);
    }

    #[test]
    fn chapters_are_offset_by_the_intro() {
        let dir = tempfile::tempdir().unwrap();
        let result = compositor(config()).compose(&request(dir.path(), 300.0));

        let times: Vec<&str> = result.chapter_timestamps.iter().map(|c| c.time.as_str()).collect();
        assert_eq!(times, vec!["00:00", "00:24", "02:34"]);
        assert_eq!(result.chapter_timestamps[0].title, "Introduction");
        assert_eq!(result.chapter_timestamps[0].subject, "Overview");
        assert_eq!(result.chapter_timestamps[2].title, "Monsoon session");
        assert_eq!(result.chapter_timestamps[2].subject, "Polity");
    }

    #[test]
    fn without_an_intro_chapters_start_at_the_body() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config();
        config.composition.intro.enabled = false;
        let result = compositor(config).compose(&request(dir.path(), 300.0));

        let times: Vec<&str> = result.chapter_timestamps.iter().map(|c| c.time.as_str()).collect();
        assert_eq!(times, vec!["00:20", "02:30"]);
        assert_eq!(result.chapter_timestamps[0].title, "Budget");
    }

    #[test]
    fn body_layers_follow_paint_order() {
        let dir = tempfile::tempdir().unwrap();
        let speaker = dir.path().join("avatar.mp4");
        std::fs::write(&speaker, b"mp4").unwrap();
        let mut req = request(dir.path(), 300.0);
        req.speaker = Some(SpeakerClip {
            path: speaker,
            duration: 300.0,
        });

        let compositor = compositor(config());
        assert!(compositor.compose(&req).success);
        let jobs = compositor.encoder.jobs.lock().unwrap();
        assert_eq!(
            jobs[0].body_layers,
            vec!["background", "slide 1", "slide 2", "speaker", "topic 1", "topic 2", "headline", "ticker"]
        );
    }

    #[test]
    fn missing_narration_fails_without_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = request(dir.path(), 300.0);
        req.narration.path = dir.path().join("nope.mp3");

        let compositor = compositor(config());
        let result = compositor.compose(&req);
        assert!(!result.success);
        assert!(result.error.unwrap().contains("narration not found"));
        assert!(compositor.encoder.jobs.lock().unwrap().is_empty());
    }

    #[test]
    fn non_positive_duration_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = compositor(config()).compose(&request(dir.path(), 0.0));
        assert!(!result.success);
    }

    #[test]
    fn encoder_failure_becomes_a_failed_result() {
        let dir = tempfile::tempdir().unwrap();
        let compositor = Compositor::new(
            config(),
            RenderingContext::default(),
            RecordingEncoder {
                fail: true,
                ..RecordingEncoder::default()
            },
        );
        let result = compositor.compose(&request(dir.path(), 300.0));
        assert!(!result.success);
        assert!(result.error.unwrap().contains("encoder exploded"));
        assert!(result.chapter_timestamps.is_empty());
    }

    #[test]
    fn overlays_past_the_narration_are_never_reached() {
        let dir = tempfile::tempdir().unwrap();
        // The second topic is scheduled at 150 s but the narration ends at 120 s.
        let program = compositor(config()).build_program(&request(dir.path(), 120.0)).unwrap();
        let body = &program.parts[1];

        assert_eq!(body.duration(), 120.0);
        let names: Vec<&str> = body.layers.layers().iter().map(|l| l.name.as_str()).collect();
        assert!(names.contains(&"slide 1"));
        assert!(!names.contains(&"slide 2"));
        assert!(!names.contains(&"topic 2"));
        for layer in body.layers.layers() {
            assert!(layer.window.end() <= body.duration());
        }
    }

    #[test]
    fn topics_past_the_narration_get_no_chapter() {
        let dir = tempfile::tempdir().unwrap();
        let result = compositor(config()).compose(&request(dir.path(), 120.0));

        assert!(result.success, "{:?}", result.error);
        let titles: Vec<&str> = result.chapter_timestamps.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Introduction", "Budget"]);
        assert_eq!(result.chapter_timestamps[1].time, "00:24");
    }

    #[test]
    fn cards_replace_slides_when_slides_are_off() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config();
        config.composition.slides.enabled = false;
        let mut req = request(dir.path(), 300.0);
        req.content.key_points.push(KeyPointCue {
            text: "Fiscal deficit at 5.1%".to_string(),
            start_time: 30.0,
            duration: 5.0,
            importance: 4,
            category: "economy".to_string(),
            theme: "blue".to_string(),
        });

        let compositor = compositor(config);
        let strategy = OverlayStrategy::select(compositor.config(), &req.timeline, &req.content);
        assert!(matches!(strategy, OverlayStrategy::Cards(_)));
        assert_eq!(strategy.header_duration(), 4.0);

        let program = compositor.build_program(&req).unwrap();
        let names: Vec<&str> = program.parts[1].layers.layers().iter().map(|l| l.name.as_str()).collect();
        assert!(names.contains(&"key point"));
        assert!(!names.iter().any(|n| n.starts_with("slide")));
    }

    #[test]
    fn music_is_attached_only_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let bed = dir.path().join("bed.mp3");
        std::fs::write(&bed, b"ID3").unwrap();
        let mut req = request(dir.path(), 300.0);
        req.music = Some(bed.clone());

        let compositor = compositor(config());
        assert!(compositor.compose(&req).success);
        assert_eq!(compositor.encoder.jobs.lock().unwrap()[0].music, Some(bed));

        let mut quiet = config();
        quiet.composition.music.enabled = false;
        let compositor = self::compositor(quiet);
        assert!(compositor.compose(&req).success);
        assert_eq!(compositor.encoder.jobs.lock().unwrap()[0].music, None);
    }

    #[test]
    fn missing_music_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = request(dir.path(), 300.0);
        req.music = Some(dir.path().join("missing.mp3"));
        let result = compositor(config()).compose(&req);
        assert!(result.error.unwrap().contains("background music not found"));
    }

    #[test]
    fn logo_is_painted_over_everything_in_the_body() {
        let dir = tempfile::tempdir().unwrap();
        let logo = dir.path().join("logo.png");
        Canvas::filled(40, 20, Rgb::WHITE).unwrap().pixmap().save_png(&logo).unwrap();
        let mut config = config();
        config.composition.logo.enabled = true;
        config.composition.logo.path = Some(logo);

        let compositor = compositor(config);
        assert!(compositor.compose(&request(dir.path(), 300.0)).success);
        let jobs = compositor.encoder.jobs.lock().unwrap();
        assert_eq!(jobs[0].body_layers.last().map(String::as_str), Some("logo"));
    }

    #[test]
    fn missing_logo_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config();
        config.composition.logo.enabled = true;
        config.composition.logo.path = Some(dir.path().join("absent.png"));

        let compositor = compositor(config);
        let result = compositor.compose(&request(dir.path(), 300.0));
        assert!(result.error.unwrap().contains("logo not found"));
        assert!(compositor.encoder.jobs.lock().unwrap().is_empty());

        let mut unset = self::config();
        unset.composition.logo.enabled = true;
        assert!(!self::compositor(unset).compose(&request(dir.path(), 300.0)).success);
    }

    #[test]
    fn missing_font_is_reported_as_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let result = compositor(config()).compose(&request(dir.path(), 300.0));

        assert!(result.success);
        assert_eq!(result.warnings, vec![NO_FONT_WARNING.to_string()]);
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["warnings"].is_array());
    }

    #[test]
    fn disabled_intro_and_outro_leave_only_the_body() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config();
        config.composition.intro.enabled = false;
        config.composition.outro.enabled = false;

        let program = compositor(config).build_program(&request(dir.path(), 300.0)).unwrap();
        assert_eq!(program.parts.len(), 1);
        assert_eq!(program.body_offset(), 0.0);
        assert_eq!(program.parts[0].audio, AudioSource::narration(300.0));
    }

    #[test]
    fn preview_renders_the_body_background() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config();
        config.composition.headline.enabled = false;
        config.composition.ticker.enabled = false;
        config.composition.slides.enabled = false;

        let frame = compositor(config).preview(&request(dir.path(), 300.0), 100.0).unwrap();
        let px = frame.pixel(160, 90).unwrap();
        assert_eq!((px.red(), px.green(), px.blue()), (0x0f, 0x14, 0x19));
    }
}
