use serde::Serialize;
use tiny_skia::Pixmap;

use crate::audio::{concat_duration, AudioSource};
use crate::theme::Rgb;
use crate::timeline::Window;
use crate::{Result, SlidecastError};

use super::layer::{z, Layer, LayerStack, Visual};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PartKind {
    Intro,
    Body,
    Outro,
}

/// One clip of the sequential track. Layer windows are local to the part.
#[derive(Debug, Clone)]
pub struct Part {
    pub kind: PartKind,
    pub layers: LayerStack,
    pub audio: AudioSource,
    /// Fade from and to black at both ends of the part.
    pub video_fade: Option<f64>,
}

impl Part {
    /// A part whose picture always starts from a solid `base` layer and whose
    /// audio lasts exactly as long as the picture.
    pub fn new(kind: PartKind, duration: f64, base: Rgb) -> Self {
        let mut layers = LayerStack::new(duration);
        layers.push(Layer::new(
            "background",
            Window::new(0.0, duration),
            z::BACKGROUND,
            Visual::Solid(base),
        ));
        let audio = match kind {
            PartKind::Body => AudioSource::narration(duration),
            PartKind::Intro | PartKind::Outro => AudioSource::silence(duration),
        };
        Self {
            kind,
            layers,
            audio,
            video_fade: None,
        }
    }

    pub fn duration(&self) -> f64 {
        self.layers.duration()
    }
}

/// The assembled intro + body + outro track, ready for an encoder.
#[derive(Debug, Clone)]
pub struct Program {
    pub parts: Vec<Part>,
    pub canvas: (u32, u32),
    pub fps: u32,
}

impl Program {
    pub fn new(canvas: (u32, u32), fps: u32) -> Self {
        Self {
            parts: Vec::new(),
            canvas,
            fps,
        }
    }

    /// Parts with no duration are left out of the track.
    pub fn push(&mut self, part: Part) {
        if part.duration() > 0.0 {
            self.parts.push(part);
        }
    }

    pub fn total_duration(&self) -> f64 {
        self.parts.iter().map(Part::duration).sum()
    }

    pub fn audio_duration(&self) -> f64 {
        let sources: Vec<AudioSource> = self.parts.iter().map(|p| p.audio.clone()).collect();
        concat_duration(&sources)
    }

    /// Offset of the first body part on the final track.
    pub fn body_offset(&self) -> f64 {
        self.parts
            .iter()
            .take_while(|p| p.kind != PartKind::Body)
            .map(Part::duration)
            .sum()
    }

    /// Finds the part playing at global time `t` and that part's local time.
    pub fn locate(&self, t: f64) -> Option<(&Part, f64)> {
        let mut start = 0.0;
        for part in &self.parts {
            let end = start + part.duration();
            if t >= start && t < end {
                return Some((part, t - start));
            }
            start = end;
        }
        None
    }

    /// Still frame of the raster layers at global time `t`.
    pub fn render_frame(&self, t: f64) -> Result<Pixmap> {
        let (part, local) = self
            .locate(t)
            .ok_or_else(|| SlidecastError::msg(format!("{t:.2}s is outside the {:.2}s track", self.total_duration())))?;
        part.layers.render_frame(local, self.canvas)
    }
}
