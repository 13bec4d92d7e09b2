use crate::config::{HeadlineConfig, StripPosition, TickerConfig};
use crate::layout::{truncate, FontMetric};
use crate::render::{Canvas, RenderingContext};
use crate::theme::Rgb;
use crate::timeline::Window;

use super::{guarded, OverlayImage};

/// Ticker text longer than this is cut with "..." before pixel truncation.
pub const TICKER_CHAR_CAP: usize = 80;
const SIDE_MARGIN: f32 = 20.0;

/// Up to three headlines, pipe-joined.
pub fn headline_text(headlines: &[String]) -> Option<String> {
    let picked: Vec<&str> = headlines
        .iter()
        .map(|h| h.trim())
        .filter(|h| !h.is_empty())
        .take(3)
        .collect();
    (!picked.is_empty()).then(|| picked.join(" | "))
}

/// Topic list from the covered subjects, else the first headlines.
pub fn ticker_text(subjects: &[String], headlines: &[String]) -> Option<String> {
    let raw = if !subjects.is_empty() {
        let topics: Vec<&str> = subjects.iter().take(4).map(String::as_str).collect();
        format!("UPSC Current Affairs | Topics: {}", topics.join(" \u{2022} "))
    } else if !headlines.is_empty() {
        let picked: Vec<&str> = headlines.iter().take(3).map(String::as_str).collect();
        format!("UPSC CURRENT AFFAIRS: {}", picked.join(" \u{2022} "))
    } else {
        return None;
    };

    if raw.chars().count() > TICKER_CHAR_CAP {
        let head: String = raw.chars().take(TICKER_CHAR_CAP).collect();
        Some(format!("{head}..."))
    } else {
        Some(raw)
    }
}

/// Full-width translucent band of headlines, shown for the whole body.
pub fn headline_strip(
    text: &str,
    config: &HeadlineConfig,
    canvas: (u32, u32),
    duration: f64,
    ctx: &RenderingContext,
) -> Option<OverlayImage> {
    guarded("headline strip", || {
        let face = ctx.metric(config.font_size);
        let band_h = (config.font_size + 60.0).round() as u32;
        let mut band = Canvas::filled(canvas.0, band_h, Rgb::parse_hex(&config.background)?)?;
        let line = truncate(text, canvas.0 as f32 - 2.0 * SIDE_MARGIN, &face);
        let y = (band_h as f32 - face.line_height()) / 2.0;
        band.text_centered(&face, &line, canvas.0 as f32 / 2.0, y, Rgb::parse_hex(&config.color)?.color());

        let mut faded = Canvas::new(canvas.0, band_h)?;
        faded.draw_pixmap(band.pixmap(), 0, 0, config.opacity.clamp(0.0, 1.0));

        let y = match config.position {
            StripPosition::Top => 0,
            StripPosition::Center => (canvas.1 as i32 - band_h as i32) / 2,
            StripPosition::Bottom => canvas.1 as i32 - band_h as i32,
        };
        Ok(OverlayImage::new(faded.into_pixmap(), 0, y, Window::new(0.0, duration)))
    })
}

/// Bottom bar with one static line of text.
pub fn ticker(
    text: &str,
    config: &TickerConfig,
    canvas: (u32, u32),
    duration: f64,
    ctx: &RenderingContext,
) -> Option<OverlayImage> {
    guarded("ticker", || {
        let face = ctx.metric(config.font_size);
        let bar_h = (config.font_size + 20.0).round() as u32;
        let mut bar = Canvas::filled(canvas.0, bar_h, Rgb::parse_hex(&config.background)?)?;
        let line = truncate(text, canvas.0 as f32 - 2.0 * SIDE_MARGIN, &face);
        let y = (bar_h as f32 - face.line_height()) / 2.0;
        bar.text_centered(&face, &line, canvas.0 as f32 / 2.0, y, Rgb::parse_hex(&config.color)?.color());

        let y = canvas.1 as i32 - bar_h as i32;
        Ok(OverlayImage::new(bar.into_pixmap(), 0, y, Window::new(0.0, duration)))
    })
}
