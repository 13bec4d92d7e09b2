use std::path::{Path, PathBuf};
use std::sync::Arc;

use tiny_skia::Pixmap;

use crate::audio::MusicBed;
use crate::compositor::{Layer, Part, Program, SpeakerPlacement, Visual};
use crate::config::Anchor;
use crate::theme::Rgb;

use super::EncoderSettings;

/// Narration is always input 0.
pub const NARRATION_INPUT: usize = 0;

/// Everything ffmpeg needs: the argument list and the stills it reads.
#[derive(Debug, Clone)]
pub struct EncodePlan {
    pub args: Vec<String>,
    pub stills: Vec<(PathBuf, Arc<Pixmap>)>,
}

struct GraphBuilder<'a> {
    settings: &'a EncoderSettings,
    canvas: (u32, u32),
    workdir: &'a Path,
    inputs: Vec<Vec<String>>,
    filters: Vec<String>,
    stills: Vec<(PathBuf, Arc<Pixmap>)>,
}

impl GraphBuilder<'_> {
    fn add_input(&mut self, args: Vec<String>) -> usize {
        self.inputs.push(args);
        self.inputs.len() - 1
    }

    fn color_source(&self, color: Rgb, duration: f64) -> String {
        format!(
            "color=c={}:s={}x{}:r={}:d={duration:.3}",
            color.to_ffmpeg(),
            self.canvas.0,
            self.canvas.1,
            self.settings.fps
        )
    }

    /// Video chain of one part, ending in `[v{index}]`.
    fn part(&mut self, index: usize, part: &Part) {
        let duration = part.duration();
        let layers = part.layers.layers();

        // A background that covers the whole part becomes the base source.
        let (base, rest) = layers
            .split_first()
            .and_then(|(first, rest)| Some((full_solid(first, duration)?, rest)))
            .unwrap_or((Rgb::BLACK, layers));
        let mut current = format!("p{index}base");
        self.filters
            .push(format!("{}[{current}]", self.color_source(base, duration)));

        for (li, layer) in rest.iter().enumerate() {
            let label = format!("p{index}l{li}");
            let placement = self.layer_source(index, li, layer, &label);
            let next = format!("p{index}v{li}");
            self.filters.push(format!(
                "[{current}][{label}]overlay={placement}:eof_action=pass:enable='between(t,{:.3},{:.3})'[{next}]",
                layer.window.start,
                layer.window.end()
            ));
            current = next;
        }

        let mut tail = format!("[{current}]trim=duration={duration:.3},setpts=PTS-STARTPTS,format=yuv420p");
        if let Some(fade) = part.video_fade.filter(|f| *f > 0.0) {
            let fade = fade.min(duration / 2.0);
            tail.push_str(&format!(
                ",fade=t=in:st=0:d={fade:.3},fade=t=out:st={:.3}:d={fade:.3}",
                duration - fade
            ));
        }
        self.filters.push(format!("{tail}[v{index}]"));
    }

    /// Emits the source chain for a layer on `[label]` and returns its
    /// overlay position.
    fn layer_source(&mut self, part: usize, li: usize, layer: &Layer, label: &str) -> String {
        let end = layer.window.end();
        let fades = alpha_fades(layer);
        match &layer.visual {
            Visual::Solid(color) => {
                let source = self.color_source(*color, end);
                self.filters.push(format!("{source},format=rgba{fades}[{label}]"));
                "x=0:y=0".to_string()
            }
            Visual::Raster { pixmap, x, y } => {
                let path = self
                    .workdir
                    .join(format!("part{part}_{li:02}_{}.png", slug(&layer.name)));
                let input = self.add_input(vec![
                    "-loop".into(),
                    "1".into(),
                    "-framerate".into(),
                    self.settings.fps.to_string(),
                    "-t".into(),
                    format!("{end:.3}"),
                    "-i".into(),
                    path.to_string_lossy().to_string(),
                ]);
                self.stills.push((path, Arc::clone(pixmap)));
                self.filters
                    .push(format!("[{input}:v]format=rgba,setpts=PTS-STARTPTS{fades}[{label}]"));
                format!("x={x}:y={y}")
            }
            Visual::Speaker(speaker) => {
                let input = self.add_input(vec!["-i".into(), speaker.path.to_string_lossy().to_string()]);
                self.filters.push(format!(
                    "[{input}:v]trim=0:{:.3},setpts=PTS-STARTPTS+{:.3}/TB,scale=-2:{}{fades}[{label}]",
                    layer.window.duration, layer.window.start, speaker.height
                ));
                speaker_position(speaker)
            }
        }
    }
}

fn full_solid(layer: &Layer, duration: f64) -> Option<Rgb> {
    let Visual::Solid(color) = layer.visual else {
        return None;
    };
    let covers = layer.window.start <= 0.0 && layer.window.end() >= duration;
    let steady = layer.fade_in <= 0.0 && layer.fade_out <= 0.0;
    (covers && steady).then_some(color)
}

fn alpha_fades(layer: &Layer) -> String {
    let mut out = String::new();
    if layer.fade_in > 0.0 {
        out.push_str(&format!(
            ",fade=t=in:st={:.3}:d={:.3}:alpha=1",
            layer.window.start, layer.fade_in
        ));
    }
    if layer.fade_out > 0.0 {
        out.push_str(&format!(
            ",fade=t=out:st={:.3}:d={:.3}:alpha=1",
            layer.window.end() - layer.fade_out,
            layer.fade_out
        ));
    }
    out
}

/// Anchors sit at a fifth of the width from either edge, or dead center;
/// offsets shift from there.
fn speaker_position(speaker: &SpeakerPlacement) -> String {
    let x = match speaker.anchor {
        Anchor::Left => "W/5-w/2",
        Anchor::Center => "W/2-w/2",
        Anchor::Right => "4*W/5-w/2",
    };
    format!(
        "x={x}{:+}:y=H/2-h/2{:+}",
        speaker.x_offset, speaker.y_offset
    )
}

fn slug(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if slug.is_empty() {
        "layer".to_string()
    } else {
        slug
    }
}

/// Builds the single-pass ffmpeg invocation for a program.
pub fn plan(
    program: &Program,
    settings: &EncoderSettings,
    narration: &Path,
    music: Option<&MusicBed>,
    output: &Path,
    workdir: &Path,
) -> EncodePlan {
    let mut graph = GraphBuilder {
        settings,
        canvas: program.canvas,
        workdir,
        inputs: Vec::new(),
        filters: Vec::new(),
        stills: Vec::new(),
    };
    graph.add_input(vec!["-i".into(), narration.to_string_lossy().to_string()]);

    let mut concat_inputs = String::new();
    for (index, part) in program.parts.iter().enumerate() {
        graph.part(index, part);
        graph
            .filters
            .push(part.audio.filter(NARRATION_INPUT, &format!("a{index}")));
        concat_inputs.push_str(&format!("[v{index}][a{index}]"));
    }
    graph.filters.push(format!(
        "{concat_inputs}concat=n={}:v=1:a=1[vout][aout]",
        program.parts.len()
    ));

    let mut audio_out = "aout";
    if let Some(bed) = music {
        let input = graph.add_input(vec![
            "-stream_loop".into(),
            "-1".into(),
            "-i".into(),
            bed.path.to_string_lossy().to_string(),
        ]);
        graph
            .filters
            .push(bed.filter(input, "aout", program.total_duration(), "amixed"));
        audio_out = "amixed";
    }

    let mut args: Vec<String> = vec!["-hide_banner".into(), "-y".into()];
    for input in &graph.inputs {
        args.extend(input.iter().cloned());
    }
    args.push("-filter_complex".into());
    args.push(graph.filters.join(";"));
    args.extend([
        "-map".to_string(),
        "[vout]".to_string(),
        "-map".to_string(),
        format!("[{audio_out}]"),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        settings.preset.clone(),
        "-b:v".to_string(),
        settings.bitrate.clone(),
        "-threads".to_string(),
        settings.threads.to_string(),
        "-r".to_string(),
        settings.fps.to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        settings.audio_bitrate.clone(),
        "-movflags".to_string(),
        "+faststart".to_string(),
        output.to_string_lossy().to_string(),
    ]);

    EncodePlan {
        args,
        stills: graph.stills,
    }
}
