use std::fmt;
use std::path::Path;
use std::sync::Arc;

use fontdue::{Font, FontSettings};
use tiny_skia::{Color, Pixmap};

use crate::layout::{FontMetric, MonoMetric};
use crate::{Result, SlidecastError};

/// The run's text face. Empty when no font file could be loaded, in which
/// case text is measured approximately and not drawn.
#[derive(Clone, Default)]
pub struct Typeface {
    font: Option<Arc<Font>>,
}

impl fmt::Debug for Typeface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Typeface")
            .field("loaded", &self.font.is_some())
            .finish()
    }
}

impl Typeface {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| SlidecastError::render(format!("font parse: {e}")))?;
        Ok(Self {
            font: Some(Arc::new(font)),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn is_loaded(&self) -> bool {
        self.font.is_some()
    }

    pub fn metric(&self, px: f32) -> FaceMetric<'_> {
        FaceMetric {
            font: self.font.as_deref(),
            px,
            fallback: MonoMetric::for_size(px),
        }
    }
}

/// A typeface pinned to one pixel size.
#[derive(Clone, Copy)]
pub struct FaceMetric<'a> {
    font: Option<&'a Font>,
    px: f32,
    fallback: MonoMetric,
}

impl FaceMetric<'_> {
    pub fn size(&self) -> f32 {
        self.px
    }

    fn ascent(&self) -> f32 {
        self.font
            .and_then(|font| font.horizontal_line_metrics(self.px))
            .map(|m| m.ascent)
            .unwrap_or(self.px)
    }

    /// Rasterizes `text` with its top edge at `y`, alpha-blending each glyph
    /// coverage mask into the premultiplied pixmap.
    pub fn draw(&self, pixmap: &mut Pixmap, text: &str, x: f32, y: f32, color: Color) {
        let Some(font) = self.font else {
            return;
        };
        let (width, height) = (pixmap.width() as i32, pixmap.height() as i32);
        let rgba = color.to_color_u8();
        let baseline = y + self.ascent();
        let data = pixmap.data_mut();

        let mut pen = x;
        for ch in text.chars() {
            let (metrics, coverage) = font.rasterize(ch, self.px);
            let left = (pen + metrics.xmin as f32).round() as i32;
            let top = (baseline - metrics.height as f32 - metrics.ymin as f32).round() as i32;

            for row in 0..metrics.height {
                let py = top + row as i32;
                if py < 0 || py >= height {
                    continue;
                }
                for col in 0..metrics.width {
                    let px = left + col as i32;
                    if px < 0 || px >= width {
                        continue;
                    }
                    let mask = coverage[row * metrics.width + col];
                    if mask == 0 {
                        continue;
                    }
                    let idx = (py as usize * width as usize + px as usize) * 4;
                    let alpha = (u16::from(mask) * u16::from(rgba.alpha()) / 255) as u8;
                    blend_over(
                        &mut data[idx..idx + 4],
                        [rgba.red(), rgba.green(), rgba.blue(), alpha],
                    );
                }
            }
            pen += metrics.advance_width;
        }
    }
}

impl FontMetric for FaceMetric<'_> {
    fn text_width(&self, text: &str) -> f32 {
        match self.font {
            Some(font) => text
                .chars()
                .map(|ch| font.metrics(ch, self.px).advance_width)
                .sum(),
            None => self.fallback.text_width(text),
        }
    }

    fn line_height(&self) -> f32 {
        self.font
            .and_then(|font| font.horizontal_line_metrics(self.px))
            .map(|m| m.new_line_size)
            .unwrap_or_else(|| self.fallback.line_height())
    }
}

/// Source-over for one premultiplied RGBA pixel; `src` is straight alpha.
fn blend_over(dst: &mut [u8], src: [u8; 4]) {
    let alpha = u16::from(src[3]);
    if alpha == 0 {
        return;
    }
    let inv = 255 - alpha;
    for channel in 0..3 {
        let s = u16::from(src[channel]) * alpha / 255;
        let d = u16::from(dst[channel]);
        dst[channel] = (s + (d * inv + 127) / 255).min(255) as u8;
    }
    let d = u16::from(dst[3]);
    dst[3] = (alpha + (d * inv + 127) / 255).min(255) as u8;
}
