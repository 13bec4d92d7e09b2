//! Raster drawing primitives shared by the slide renderer and the overlay
//! library, plus the immutable [`RenderingContext`] handed to every render
//! call.

mod text;

pub use text::{FaceMetric, Typeface};

use std::path::Path;

use tiny_skia::{
    FillRule, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke, Transform,
};

use crate::layout::FontMetric;
use crate::theme::{Rgb, ThemeRegistry};
use crate::{Result, SlidecastError};

/// Fonts and palettes for one run. Built once, shared read-only.
#[derive(Debug, Clone, Default)]
pub struct RenderingContext {
    pub typeface: Typeface,
    pub themes: ThemeRegistry,
}

impl RenderingContext {
    pub fn new(typeface: Typeface, themes: ThemeRegistry) -> Self {
        Self { typeface, themes }
    }

    pub fn metric(&self, px: f32) -> FaceMetric<'_> {
        self.typeface.metric(px)
    }
}

/// A pixmap plus the drawing helpers the renderers need.
pub struct Canvas {
    pixmap: Pixmap,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap = Pixmap::new(width, height)
            .ok_or_else(|| SlidecastError::render(format!("invalid canvas {width}x{height}")))?;
        Ok(Self { pixmap })
    }

    pub fn filled(width: u32, height: u32, color: Rgb) -> Result<Self> {
        let mut canvas = Self::new(width, height)?;
        canvas.pixmap.fill(color.color());
        Ok(canvas)
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: tiny_skia::Color) -> Result<()> {
        let rect = rect(x, y, w, h)?;
        let mut paint = solid(color);
        paint.anti_alias = false;
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), None);
        Ok(())
    }

    pub fn fill_rounded_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        r: f32,
        color: tiny_skia::Color,
    ) -> Result<()> {
        let path = rounded_rect_path(x, y, w, h, r)?;
        self.pixmap.fill_path(
            &path,
            &solid(color),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
        Ok(())
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, width: f32, color: tiny_skia::Color) -> Result<()> {
        let rect = rect(x, y, w, h)?;
        let path = PathBuilder::from_rect(rect);
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &solid(color), &stroke, Transform::identity(), None);
        Ok(())
    }

    pub fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: tiny_skia::Color) -> Result<()> {
        let path = PathBuilder::from_circle(cx, cy, r)
            .ok_or_else(|| SlidecastError::render(format!("degenerate circle r={r}")))?;
        self.pixmap.fill_path(
            &path,
            &solid(color),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
        Ok(())
    }

    pub fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, width: f32, color: tiny_skia::Color) -> Result<()> {
        let mut pb = PathBuilder::new();
        pb.move_to(x0, y0);
        pb.line_to(x1, y1);
        let path = pb
            .finish()
            .ok_or_else(|| SlidecastError::render("degenerate line"))?;
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &solid(color), &stroke, Transform::identity(), None);
        Ok(())
    }

    /// Vertical two-stop gradient, one interpolated color per scanline.
    pub fn vertical_gradient(&mut self, x: f32, y: f32, w: f32, h: f32, from: Rgb, to: Rgb) -> Result<()> {
        let rows = h.max(0.0).round() as u32;
        for row in 0..rows {
            let t = if rows > 1 {
                row as f32 / (rows - 1) as f32
            } else {
                0.0
            };
            self.fill_rect(x, y + row as f32, w, 1.0, from.lerp(to, t).color())?;
        }
        Ok(())
    }

    /// Draws one line of text with its top edge at `y`.
    pub fn text(&mut self, face: &FaceMetric<'_>, text: &str, x: f32, y: f32, color: tiny_skia::Color) {
        face.draw(&mut self.pixmap, text, x, y, color);
    }

    /// Draws `text` horizontally centered on `cx`.
    pub fn text_centered(&mut self, face: &FaceMetric<'_>, text: &str, cx: f32, y: f32, color: tiny_skia::Color) {
        let x = cx - face.text_width(text) / 2.0;
        self.text(face, text, x, y, color);
    }

    /// Pastes another pixmap at integer offset with the given opacity.
    pub fn draw_pixmap(&mut self, src: &Pixmap, x: i32, y: i32, opacity: f32) {
        let paint = PixmapPaint {
            opacity,
            ..PixmapPaint::default()
        };
        self.pixmap
            .draw_pixmap(x, y, src.as_ref(), &paint, Transform::identity(), None);
    }
}

/// Tiny-skia accepts zero-sized rects; drawing code treats them as errors.
fn rect(x: f32, y: f32, w: f32, h: f32) -> Result<Rect> {
    if !(w > 0.0 && h > 0.0) {
        return Err(SlidecastError::render(format!("degenerate rect {w}x{h}")));
    }
    Rect::from_xywh(x, y, w, h)
        .ok_or_else(|| SlidecastError::render(format!("degenerate rect {w}x{h}")))
}

fn solid(color: tiny_skia::Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}

fn rounded_rect_path(x: f32, y: f32, w: f32, h: f32, r: f32) -> Result<tiny_skia::Path> {
    let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(x + w - r, y);
    pb.quad_to(x + w, y, x + w, y + r);
    pb.line_to(x + w, y + h - r);
    pb.quad_to(x + w, y + h, x + w - r, y + h);
    pb.line_to(x + r, y + h);
    pb.quad_to(x, y + h, x, y + h - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);
    pb.close();
    pb.finish()
        .ok_or_else(|| SlidecastError::render(format!("degenerate rounded rect {w}x{h}")))
}

/// Loads a PNG and scales it to `width`, keeping the aspect ratio.
pub fn load_png_scaled(path: &Path, width: u32) -> Result<Pixmap> {
    let source = Pixmap::load_png(path)
        .map_err(|e| SlidecastError::render(format!("reading {}: {e}", path.display())))?;
    scale_to_width(&source, width)
}

pub fn scale_to_width(source: &Pixmap, width: u32) -> Result<Pixmap> {
    let scale = width as f32 / source.width().max(1) as f32;
    let height = ((source.height() as f32 * scale).round() as u32).max(1);
    let mut target = Pixmap::new(width.max(1), height)
        .ok_or_else(|| SlidecastError::render("invalid scaled size"))?;
    let paint = PixmapPaint {
        quality: tiny_skia::FilterQuality::Bicubic,
        ..PixmapPaint::default()
    };
    target.draw_pixmap(
        0,
        0,
        source.as_ref(),
        &paint,
        Transform::from_scale(scale, scale),
        None,
    );
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(canvas: &Canvas, x: u32, y: u32) -> (u8, u8, u8, u8) {
        let p = canvas.pixmap().pixel(x, y).unwrap();
        (p.red(), p.green(), p.blue(), p.alpha())
    }

    #[test]
    fn gradient_interpolates_per_scanline() {
        let mut canvas = Canvas::new(4, 11).unwrap();
        canvas
            .vertical_gradient(0.0, 0.0, 4.0, 11.0, Rgb(0, 0, 0), Rgb(200, 100, 0))
            .unwrap();

        assert_eq!(pixel(&canvas, 1, 0), (0, 0, 0, 255));
        assert_eq!(pixel(&canvas, 1, 5), (100, 50, 0, 255));
        assert_eq!(pixel(&canvas, 1, 10), (200, 100, 0, 255));
    }

    #[test]
    fn degenerate_shapes_are_errors_not_panics() {
        let mut canvas = Canvas::new(10, 10).unwrap();
        assert!(canvas.fill_rect(0.0, 0.0, 0.0, 5.0, Rgb::WHITE.color()).is_err());
        assert!(canvas.fill_rect(0.0, 0.0, 5.0, -1.0, Rgb::WHITE.color()).is_err());
        assert!(canvas.stroke_rect(0.0, 0.0, 5.0, 0.0, 1.0, Rgb::WHITE.color()).is_err());
        assert!(canvas.fill_rect(0.0, 0.0, f32::NAN, 5.0, Rgb::WHITE.color()).is_err());
        assert!(canvas.fill_circle(5.0, 5.0, 0.0, Rgb::WHITE.color()).is_err());
        assert!(Canvas::new(0, 10).is_err());
    }

    #[test]
    fn pasted_pixmap_respects_offset() {
        let mut canvas = Canvas::filled(8, 8, Rgb::BLACK).unwrap();
        let patch = Canvas::filled(2, 2, Rgb(255, 0, 0)).unwrap();
        canvas.draw_pixmap(patch.pixmap(), 3, 3, 1.0);

        assert_eq!(pixel(&canvas, 3, 3), (255, 0, 0, 255));
        assert_eq!(pixel(&canvas, 2, 2), (0, 0, 0, 255));
    }

    #[test]
    fn scales_keep_aspect_ratio() {
        let source = Canvas::filled(40, 20, Rgb::WHITE).unwrap();
        let scaled = scale_to_width(source.pixmap(), 10).unwrap();
        assert_eq!((scaled.width(), scaled.height()), (10, 5));
    }
}
