use tiny_skia::{Pixmap, PixmapPaint, Transform};

use crate::layout::{truncate, wrap, FontMetric};
use crate::render::{load_png_scaled, Canvas, RenderingContext};
use crate::script::{ImageCue, ImagePosition, KeyPointCue, StatsCue};
use crate::theme::{card_palette, Rgb};
use crate::timeline::Window;
use crate::{Result, SlidecastError};

use super::{guarded, OverlayImage, BODY_PX, CARD_FADE, HEADING_PX, SMALL_PX, SUBHEADING_PX, TINY_PX};

const KEY_POINT_H: u32 = 120;
const EDGE_MARGIN: i32 = 30;
const IMPORTANT: Rgb = Rgb(237, 100, 100);
const FRAME: u32 = 5;
const CAPTION_H: u32 = 25;
pub const MAX_STATS: usize = 5;

/// Right-middle card with one key point and an importance dot.
pub fn key_point_card(cue: &KeyPointCue, canvas: (u32, u32), ctx: &RenderingContext) -> Option<OverlayImage> {
    guarded("key point", || {
        let palette = card_palette(&cue.theme);
        let card_w = (canvas.0 as f32 * 0.45).round() as u32;
        let (w, h) = (card_w as f32, KEY_POINT_H as f32);
        let mut card = Canvas::new(card_w, KEY_POINT_H)?;

        card.fill_rounded_rect(0.0, 0.0, w, h, 15.0, palette.primary.with_alpha(230))?;
        card.fill_rect(0.0, 10.0, 6.0, h - 20.0, palette.accent.color())?;

        let indicator = match cue.importance {
            i if i >= 4 => IMPORTANT,
            3 => palette.accent,
            _ => palette.secondary,
        };
        card.fill_circle(w - 20.0, 20.0, 10.0, indicator.color())?;

        let mut y = 15.0;
        if !cue.category.is_empty() {
            card.text(&ctx.metric(TINY_PX), &cue.category.to_uppercase(), 30.0, y, palette.accent.color());
            y += 22.0;
        }

        let body = ctx.metric(BODY_PX);
        let room = ((h - y - 8.0) / body.line_height()).floor().max(1.0) as usize;
        for line in wrap(&cue.text, w - 60.0, &body, room) {
            card.text(&body, &line, 30.0, y, palette.text.color());
            y += body.line_height();
        }

        let x = canvas.0 as i32 - card_w as i32 - EDGE_MARGIN;
        let y = canvas.1 as i32 / 2 - KEY_POINT_H as i32 / 2;
        let window = Window::new(cue.start_time, cue.duration);
        Ok(OverlayImage::new(card.into_pixmap(), x, y, window).with_fades(CARD_FADE, CARD_FADE))
    })
}

/// Framed still image with an optional caption bar.
pub fn image_card(cue: &ImageCue, canvas: (u32, u32), ctx: &RenderingContext) -> Option<OverlayImage> {
    guarded("image", || {
        if !cue.path.is_file() {
            return Err(SlidecastError::missing("image", &cue.path));
        }
        let window = Window::new(cue.start_time, cue.duration);

        if cue.position == ImagePosition::Fullscreen {
            let stretched = stretch_png(&cue.path, canvas)?;
            return Ok(OverlayImage::new(stretched, 0, 0, window).with_fades(CARD_FADE, CARD_FADE));
        }

        let target_w = ((canvas.0 as f32 * cue.scale.clamp(0.05, 1.0)).round() as u32).max(1);
        let image = load_png_scaled(&cue.path, target_w)?;
        let framed_w = image.width() + 2 * FRAME;
        let framed_h = image.height() + 2 * FRAME;
        let caption_h = if cue.caption.is_empty() { 0 } else { CAPTION_H };

        let mut card = Canvas::new(framed_w, framed_h + caption_h)?;
        card.fill_rect(0.0, 0.0, framed_w as f32, framed_h as f32, Rgb::WHITE.color())?;
        card.draw_pixmap(&image, FRAME as i32, FRAME as i32, 1.0);
        if caption_h > 0 {
            card.fill_rect(
                0.0,
                framed_h as f32,
                framed_w as f32,
                caption_h as f32,
                Rgb(40, 40, 40).with_alpha(200),
            )?;
            let face = ctx.metric(TINY_PX);
            let caption = truncate(&cue.caption, framed_w as f32 - 20.0, &face);
            card.text(&face, &caption, 10.0, framed_h as f32 + 5.0, Rgb::WHITE.color());
        }

        let card_w = card.width() as i32;
        let x = match cue.position {
            ImagePosition::Left => EDGE_MARGIN,
            ImagePosition::Center => (canvas.0 as i32 - card_w) / 2,
            _ => canvas.0 as i32 - card_w - EDGE_MARGIN,
        };
        // Vertical centering uses the framed height; the caption hangs below.
        let y = (canvas.1 as i32 - framed_h as i32) / 2;
        Ok(OverlayImage::new(card.into_pixmap(), x, y, window).with_fades(CARD_FADE, CARD_FADE))
    })
}

/// Green card listing up to five statistics, pinned top-right.
pub fn stats_card(cue: &StatsCue, canvas: (u32, u32), ctx: &RenderingContext) -> Option<OverlayImage> {
    guarded("stats", || {
        if cue.stats.is_empty() {
            return Err(SlidecastError::InvalidInput("statistics card has no entries"));
        }
        let palette = card_palette("green");
        let card_w = (canvas.0 as f32 * 0.35).round() as u32;
        let card_h = (80 + cue.stats.len() as u32 * 50).min(canvas.1 / 2);
        let (w, h) = (card_w as f32, card_h as f32);
        let mut card = Canvas::new(card_w, card_h)?;

        card.fill_rounded_rect(0.0, 0.0, w, h, 12.0, palette.bg.with_alpha(235))?;
        card.fill_rect(0.0, 0.0, w, 50.0_f32.min(h), palette.primary.color())?;
        let title = ctx.metric(SUBHEADING_PX);
        card.text(&title, &truncate(&cue.title, w - 30.0, &title), 15.0, 12.0, palette.text.color());

        let value = ctx.metric(HEADING_PX);
        let name = ctx.metric(SMALL_PX);
        let mut y = 60.0;
        for (label, amount) in cue.stats.iter().take(MAX_STATS) {
            if y + 50.0 > h {
                break;
            }
            card.text(&value, &truncate(amount, w - 30.0, &value), 15.0, y, palette.accent.color());
            card.text(&name, &truncate(label, w - 30.0, &name), 15.0, y + 30.0, palette.secondary.color());
            y += 55.0;
        }

        let x = canvas.0 as i32 - card_w as i32 - EDGE_MARGIN;
        let window = Window::new(cue.start_time, cue.duration);
        Ok(OverlayImage::new(card.into_pixmap(), x, 100, window).with_fades(CARD_FADE, CARD_FADE))
    })
}

fn stretch_png(path: &std::path::Path, canvas: (u32, u32)) -> Result<Pixmap> {
    let source = Pixmap::load_png(path)
        .map_err(|e| SlidecastError::render(format!("reading {}: {e}", path.display())))?;
    let mut target = Pixmap::new(canvas.0, canvas.1)
        .ok_or_else(|| SlidecastError::render("invalid canvas"))?;
    let sx = canvas.0 as f32 / source.width() as f32;
    let sy = canvas.1 as f32 / source.height() as f32;
    let paint = PixmapPaint {
        quality: tiny_skia::FilterQuality::Bicubic,
        ..PixmapPaint::default()
    };
    target.draw_pixmap(0, 0, source.as_ref(), &paint, Transform::from_scale(sx, sy), None);
    Ok(target)
}
