//! Fixed catalog of time-boxed overlays: topic headers, intro/outro cards,
//! the headline strip, the ticker, and the generic key-point, image and
//! statistics cards used when slides are off, and the corner logo.
//!
//! Every renderer returns `None` on failure so the compositor can skip it.

mod cards;
mod header;
mod logo;
mod strip;

pub use cards::{image_card, key_point_card, stats_card, MAX_STATS};
pub use header::{intro_card, outro_card, topic_header, topic_headers, TopicHeader};
pub use logo::logo_overlay;
pub use strip::{headline_strip, headline_text, ticker, ticker_text, TICKER_CHAR_CAP};

use tiny_skia::Pixmap;
use tracing::warn;

use crate::timeline::Window;
use crate::Result;

/// Fade applied to both edges of slides and topic headers.
pub const HEADER_FADE: f64 = 0.5;
/// Fade applied to both edges of the generic cards.
pub const CARD_FADE: f64 = 0.3;
pub const OUTRO_FADE_OUT: f64 = 1.0;

/// A rendered overlay plus where and when it appears.
#[derive(Debug, Clone)]
pub struct OverlayImage {
    pub pixmap: Pixmap,
    pub x: i32,
    pub y: i32,
    pub window: Window,
    pub fade_in: f64,
    pub fade_out: f64,
}

impl OverlayImage {
    pub fn new(pixmap: Pixmap, x: i32, y: i32, window: Window) -> Self {
        Self {
            pixmap,
            x,
            y,
            window,
            fade_in: 0.0,
            fade_out: 0.0,
        }
    }

    pub fn with_fades(mut self, fade_in: f64, fade_out: f64) -> Self {
        self.fade_in = fade_in;
        self.fade_out = fade_out;
        self
    }
}

fn guarded<F>(kind: &'static str, render: F) -> Option<OverlayImage>
where
    F: FnOnce() -> Result<OverlayImage>,
{
    match render() {
        Ok(image) => Some(image),
        Err(err) => {
            warn!(overlay = kind, %err, "skipping overlay");
            None
        }
    }
}

// Font sizes shared by the overlay renderers.
const TITLE_PX: f32 = 48.0;
const HEADING_PX: f32 = 36.0;
const SUBHEADING_PX: f32 = 28.0;
const BODY_PX: f32 = 24.0;
const SMALL_PX: f32 = 18.0;
const TINY_PX: f32 = 14.0;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SlidecastError;

    #[test]
    fn failed_render_becomes_none() {
        assert!(guarded("test", || Err(SlidecastError::render("boom"))).is_none());
        let pixmap = Pixmap::new(1, 1).unwrap();
        let image = guarded("test", || Ok(OverlayImage::new(pixmap, 0, 0, Window::new(0.0, 1.0))));
        assert!(image.is_some());
    }
}
