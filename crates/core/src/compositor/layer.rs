use std::path::PathBuf;
use std::sync::Arc;

use tiny_skia::Pixmap;
use tracing::debug;

use crate::config::Anchor;
use crate::overlay::OverlayImage;
use crate::render::Canvas;
use crate::theme::Rgb;
use crate::timeline::Window;
use crate::Result;

/// Paint order, background-most first.
pub mod z {
    pub const BACKGROUND: i32 = 0;
    pub const SLIDE: i32 = 10;
    pub const CARD: i32 = 20;
    pub const SPEAKER: i32 = 30;
    pub const TRANSITION: i32 = 40;
    pub const HEADLINE: i32 = 50;
    pub const TICKER: i32 = 60;
    pub const LOGO: i32 = 70;
}

/// Where the speaker clip goes and how big it is.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeakerPlacement {
    pub path: PathBuf,
    /// Target height in pixels; width follows the clip's aspect ratio.
    pub height: u32,
    pub anchor: Anchor,
    pub x_offset: i32,
    pub y_offset: i32,
}

#[derive(Debug, Clone)]
pub enum Visual {
    /// Whole-canvas solid color.
    Solid(Rgb),
    /// A rendered image at a pixel offset.
    Raster { pixmap: Arc<Pixmap>, x: i32, y: i32 },
    /// The foreground video clip, decoded by the encoder.
    Speaker(SpeakerPlacement),
}

#[derive(Debug, Clone)]
pub struct Layer {
    pub name: String,
    pub window: Window,
    pub z_order: i32,
    pub visual: Visual,
    pub fade_in: f64,
    pub fade_out: f64,
}

impl Layer {
    pub fn new(name: impl Into<String>, window: Window, z_order: i32, visual: Visual) -> Self {
        Self {
            name: name.into(),
            window,
            z_order,
            visual,
            fade_in: 0.0,
            fade_out: 0.0,
        }
    }

    pub fn from_overlay(name: impl Into<String>, z_order: i32, overlay: OverlayImage) -> Self {
        let visual = Visual::Raster {
            pixmap: Arc::new(overlay.pixmap),
            x: overlay.x,
            y: overlay.y,
        };
        Self {
            fade_in: overlay.fade_in,
            fade_out: overlay.fade_out,
            ..Self::new(name, overlay.window, z_order, visual)
        }
    }

    /// Opacity at local time `t`: zero outside the window, ramped inside
    /// the fade edges.
    pub fn opacity_at(&self, t: f64) -> f32 {
        if !self.window.contains(t) {
            return 0.0;
        }
        let since_start = t - self.window.start;
        let until_end = self.window.end() - t;
        let mut alpha = 1.0_f64;
        if self.fade_in > 0.0 {
            alpha = alpha.min(since_start / self.fade_in);
        }
        if self.fade_out > 0.0 {
            alpha = alpha.min(until_end / self.fade_out);
        }
        alpha.clamp(0.0, 1.0) as f32
    }

    /// Fades are shortened so in and out never overlap.
    fn fit_fades(&mut self) {
        let half = self.window.duration / 2.0;
        self.fade_in = self.fade_in.clamp(0.0, half);
        self.fade_out = self.fade_out.clamp(0.0, half);
    }
}

/// Time-clipped layers of one sequential part, kept in paint order.
#[derive(Debug, Clone)]
pub struct LayerStack {
    duration: f64,
    layers: Vec<Layer>,
}

impl LayerStack {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            layers: Vec::new(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Clips the layer to `[0, duration]` and inserts it after every layer
    /// with a lower or equal z-order. A layer left with no visible time is
    /// dropped and `false` returned.
    pub fn push(&mut self, mut layer: Layer) -> bool {
        let start = layer.window.start.max(0.0);
        let end = layer.window.end().min(self.duration);
        if !(end > start) {
            debug!(layer = %layer.name, start = layer.window.start, "layer never visible, dropped");
            return false;
        }
        layer.window = Window::new(start, end - start);
        layer.fit_fades();

        let at = self.layers.partition_point(|l| l.z_order <= layer.z_order);
        self.layers.insert(at, layer);
        true
    }

    pub fn extend<I: IntoIterator<Item = Layer>>(&mut self, layers: I) -> usize {
        layers.into_iter().map(|l| self.push(l)).filter(|&kept| kept).count()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn active_at(&self, t: f64) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(move |l| l.window.contains(t))
    }

    /// Composites every solid and raster layer visible at `t`. The speaker
    /// clip is not decoded here and is left out.
    pub fn render_frame(&self, t: f64, canvas: (u32, u32)) -> Result<Pixmap> {
        let mut frame = Canvas::filled(canvas.0, canvas.1, Rgb::BLACK)?;
        for layer in self.active_at(t) {
            let opacity = layer.opacity_at(t);
            if opacity <= 0.0 {
                continue;
            }
            match &layer.visual {
                Visual::Solid(color) => {
                    let solid = Canvas::filled(canvas.0, canvas.1, *color)?;
                    frame.draw_pixmap(solid.pixmap(), 0, 0, opacity);
                }
                Visual::Raster { pixmap, x, y } => frame.draw_pixmap(pixmap, *x, *y, opacity),
                Visual::Speaker(_) => {}
            }
        }
        Ok(frame.into_pixmap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(name: &str, start: f64, duration: f64, z: i32) -> Layer {
        Layer::new(name, Window::new(start, duration), z, Visual::Solid(Rgb::WHITE))
    }

    fn names(stack: &LayerStack) -> Vec<&str> {
        stack.layers().iter().map(|l| l.name.as_str()).collect()
    }

    #[test]
    fn layers_are_clipped_to_the_stack() {
        let mut stack = LayerStack::new(100.0);
        assert!(stack.push(solid("early", -5.0, 10.0, 0)));
        assert!(stack.push(solid("late", 95.0, 30.0, 0)));

        assert_eq!(stack.layers()[0].window, Window::new(0.0, 5.0));
        assert_eq!(stack.layers()[1].window, Window::new(95.0, 5.0));
        for layer in stack.layers() {
            assert!(layer.window.start >= 0.0);
            assert!(layer.window.end() <= stack.duration());
        }
    }

    #[test]
    fn layers_past_the_end_are_never_reached() {
        let mut stack = LayerStack::new(60.0);
        assert!(!stack.push(solid("after", 75.0, 4.0, 40)));
        assert!(!stack.push(solid("at end", 60.0, 4.0, 40)));
        assert!(!stack.push(solid("empty", 10.0, 0.0, 40)));
        assert!(stack.is_empty());
    }

    #[test]
    fn order_is_by_z_then_insertion() {
        let mut stack = LayerStack::new(10.0);
        stack.push(solid("ticker", 0.0, 10.0, z::TICKER));
        stack.push(solid("slide 1", 0.0, 5.0, z::SLIDE));
        stack.push(solid("bg", 0.0, 10.0, z::BACKGROUND));
        stack.push(solid("slide 2", 5.0, 5.0, z::SLIDE));
        stack.push(solid("speaker", 0.0, 10.0, z::SPEAKER));

        assert_eq!(names(&stack), vec!["bg", "slide 1", "slide 2", "speaker", "ticker"]);
    }

    #[test]
    fn opacity_ramps_across_fades() {
        let mut layer = solid("card", 10.0, 4.0, z::CARD);
        layer.fade_in = 0.5;
        layer.fade_out = 1.0;

        assert_eq!(layer.opacity_at(9.9), 0.0);
        assert!((layer.opacity_at(10.25) - 0.5).abs() < 1e-6);
        assert_eq!(layer.opacity_at(12.0), 1.0);
        assert!((layer.opacity_at(13.5) - 0.5).abs() < 1e-6);
        assert_eq!(layer.opacity_at(14.0), 0.0);
    }

    #[test]
    fn fades_never_exceed_half_the_window() {
        let mut stack = LayerStack::new(10.0);
        let mut layer = solid("blip", 0.0, 0.4, z::TRANSITION);
        layer.fade_in = 0.5;
        layer.fade_out = 0.5;
        stack.push(layer);
        assert!((stack.layers()[0].fade_in - 0.2).abs() < 1e-9);
    }

    #[test]
    fn frame_paints_only_active_layers() {
        let mut stack = LayerStack::new(10.0);
        stack.push(Layer::new("bg", Window::new(0.0, 10.0), z::BACKGROUND, Visual::Solid(Rgb(0, 0, 255))));
        let patch = Canvas::filled(2, 2, Rgb(255, 0, 0)).unwrap().into_pixmap();
        stack.push(Layer::new(
            "patch",
            Window::new(5.0, 2.0),
            z::CARD,
            Visual::Raster {
                pixmap: Arc::new(patch),
                x: 1,
                y: 1,
            },
        ));

        let before = stack.render_frame(1.0, (4, 4)).unwrap();
        let p = before.pixel(1, 1).unwrap();
        assert_eq!((p.red(), p.green(), p.blue()), (0, 0, 255));

        let during = stack.render_frame(6.0, (4, 4)).unwrap();
        let p = during.pixel(1, 1).unwrap();
        assert_eq!((p.red(), p.green(), p.blue()), (255, 0, 0));
        let p = during.pixel(3, 3).unwrap();
        assert_eq!((p.red(), p.green(), p.blue()), (0, 0, 255));
    }
}
