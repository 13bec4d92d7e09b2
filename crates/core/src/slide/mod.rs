//! Themed per-topic slides. One slide per content segment, painted onto a
//! transparent canvas-sized image whose left side stays clear for the
//! speaker clip.

mod layout;

pub use layout::{
    Bounds, CardLayout, HeaderLayout, SlideLayout, TableRow, TermsLayout, FOOTER_H, HEADER_H,
    MAX_TABLE_ROWS, MAX_TERM_BADGES,
};

use layout::{BODY_PX, HEADING_PX, SMALL_PX, TAG_PX, TITLE_PX};
use tiny_skia::Pixmap;
use tracing::{debug, warn};

use crate::config::{SlidesConfig, TermsStyle};
use crate::layout::FontMetric;
use crate::render::{Canvas, FaceMetric, RenderingContext};
use crate::script::Terms;
use crate::theme::{exam_tag_color, Rgb, Theme};
use crate::timeline::{Timeline, Window};
use crate::Result;

const TEXT_BRIGHT: Rgb = Rgb(240, 245, 255);
const TEXT_BODY: Rgb = Rgb(230, 235, 245);
const TEXT_MUTED: Rgb = Rgb(200, 210, 230);
const TEXT_DARK: Rgb = Rgb(20, 25, 40);
const ROW_EVEN: Rgb = Rgb(22, 28, 42);
const ROW_ODD: Rgb = Rgb(18, 22, 35);
const GRID: Rgb = Rgb(50, 60, 80);

/// Everything one slide shows, derived from a content segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    pub title: String,
    /// The subject category.
    pub subtitle: String,
    pub bullet_points: Vec<String>,
    pub important_terms: Terms,
    pub exam_tag: String,
    pub topic_number: usize,
    pub window: Window,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlideOptions {
    /// Fraction of the canvas width where the content band starts.
    pub content_start_x: f32,
    pub max_key_points: usize,
    pub terms_style: TermsStyle,
    pub numbered: bool,
    pub product_label: String,
}

impl Default for SlideOptions {
    fn default() -> Self {
        Self::from(&SlidesConfig::default())
    }
}

impl From<&SlidesConfig> for SlideOptions {
    fn from(config: &SlidesConfig) -> Self {
        Self {
            content_start_x: config.content_start_x,
            max_key_points: config.max_key_points,
            terms_style: config.terms_style,
            numbered: config.numbered,
            product_label: config.product_label.clone(),
        }
    }
}

/// One slide per content segment, windowed to run until the next topic.
pub fn build_slides(timeline: &Timeline, max_key_points: usize) -> Vec<Slide> {
    timeline
        .content_segments()
        .zip(timeline.slide_windows())
        .enumerate()
        .map(|(i, (segment, window))| {
            let meta = segment.meta.clone().unwrap_or_default();
            Slide {
                title: meta.display_title(i + 1),
                subtitle: meta.subject_category,
                bullet_points: meta.key_points.into_iter().take(max_key_points).collect(),
                important_terms: meta.important_terms,
                exam_tag: meta.exam_tag,
                topic_number: i + 1,
                window,
            }
        })
        .collect()
}

/// Renders a slide. Sub-element failures are logged and skipped; only an
/// unusable canvas size is an error.
pub fn render_slide(
    slide: &Slide,
    canvas_size: (u32, u32),
    opts: &SlideOptions,
    ctx: &RenderingContext,
) -> Result<Pixmap> {
    let layout = SlideLayout::compute(slide, canvas_size, opts, |px| ctx.metric(px));
    let theme = ctx.themes.theme_for(&slide.subtitle);
    let mut canvas = Canvas::new(canvas_size.0, canvas_size.1)?;
    let painter = Painter {
        ctx,
        theme: &theme,
        layout: &layout,
        slide,
        opts,
    };

    let outcomes = [
        ("content band", painter.content_band(&mut canvas)),
        ("header", painter.header(&mut canvas)),
        ("subject bar", painter.subject_bar(&mut canvas)),
        ("key points", painter.cards(&mut canvas)),
        ("terms", painter.terms(&mut canvas)),
        ("footer", painter.footer(&mut canvas)),
        ("accent rule", painter.accent_rule(&mut canvas)),
    ];
    for (element, outcome) in outcomes {
        if let Err(err) = outcome {
            warn!(topic = slide.topic_number, element, %err, "skipping slide element");
        }
    }
    debug!(
        topic = slide.topic_number,
        cards = layout.cards.len(),
        dropped = slide.bullet_points.len().saturating_sub(layout.cards.len()),
        "slide rendered"
    );
    Ok(canvas.into_pixmap())
}

struct Painter<'a> {
    ctx: &'a RenderingContext,
    theme: &'a Theme,
    layout: &'a SlideLayout,
    slide: &'a Slide,
    opts: &'a SlideOptions,
}

impl Painter<'_> {
    fn face(&self, px: f32) -> FaceMetric<'_> {
        self.ctx.metric(px)
    }

    fn content_band(&self, canvas: &mut Canvas) -> Result<()> {
        let l = self.layout;
        canvas.vertical_gradient(
            l.content_x,
            HEADER_H,
            l.width - l.content_x,
            l.footer_y - HEADER_H,
            self.theme.gradient_start,
            self.theme.gradient_end,
        )
    }

    fn accent_rule(&self, canvas: &mut Canvas) -> Result<()> {
        let x = self.layout.accent_rule_x();
        canvas.line(
            x,
            HEADER_H + 10.0,
            x,
            self.layout.height - 70.0,
            3.0,
            self.theme.accent.color(),
        )
    }

    fn header(&self, canvas: &mut Canvas) -> Result<()> {
        let l = self.layout;
        let h = &l.header;
        canvas.fill_rect(0.0, 0.0, l.width, HEADER_H, self.theme.header.color())?;
        canvas.fill_rect(0.0, HEADER_H - 3.0, l.width, 3.0, self.theme.accent.color())?;

        let b = h.badge;
        canvas.fill_rounded_rect(b.x, b.y, b.w, b.h, 8.0, self.theme.accent.color())?;
        canvas.text(&self.face(HEADING_PX), &h.badge_label, b.x + 12.0, b.y + 7.0, TEXT_DARK.color());

        let title = self.face(TITLE_PX);
        let title_y = (HEADER_H - title.line_height()) / 2.0;
        canvas.text(&title, &h.title, h.title_x, title_y, TEXT_BRIGHT.color());

        if let Some((tag, label)) = &h.exam_tag {
            canvas.fill_rounded_rect(tag.x, tag.y, tag.w, tag.h, 6.0, exam_tag_color(label).color())?;
            canvas.text(&self.face(TAG_PX), label, tag.x + 10.0, tag.y + 5.0, Rgb::WHITE.color());
        }
        Ok(())
    }

    fn subject_bar(&self, canvas: &mut Canvas) -> Result<()> {
        let bar = self.layout.subject_bar;
        canvas.fill_rounded_rect(bar.x, bar.y, bar.w, bar.h, 6.0, self.theme.badge_bg.color())?;
        canvas.fill_rect(bar.x, bar.y, 6.0, bar.h, self.theme.accent.color())?;
        let face = self.face(SMALL_PX);
        let y = bar.y + (bar.h - face.line_height()) / 2.0;
        canvas.text(&face, &self.layout.subject_label, bar.x + 20.0, y, Rgb::WHITE.color());
        Ok(())
    }

    fn cards(&self, canvas: &mut Canvas) -> Result<()> {
        let body = self.face(BODY_PX);
        let small = self.face(SMALL_PX);
        for card in &self.layout.cards {
            let b = card.bounds;
            if let Err(err) = self.card(canvas, card, &body, &small) {
                warn!(topic = self.slide.topic_number, card = card.number, %err, "skipping key-point card");
                continue;
            }
            debug!(card = card.number, y = b.y, h = b.h, "key-point card");
        }
        Ok(())
    }

    fn card(&self, canvas: &mut Canvas, card: &CardLayout, body: &FaceMetric<'_>, small: &FaceMetric<'_>) -> Result<()> {
        let b = card.bounds;
        canvas.fill_rounded_rect(b.x, b.y, b.w, b.h, 10.0, self.theme.card_bg.color())?;
        canvas.fill_rect(b.x, b.y + 8.0, 4.0, b.h - 16.0, self.theme.accent.color())?;

        let marker_cx = b.x + 30.0;
        let marker_cy = b.y + b.h / 2.0;
        if self.opts.numbered {
            canvas.fill_circle(marker_cx, marker_cy, 15.0, self.theme.accent.color())?;
            canvas.text_centered(
                small,
                &card.number.to_string(),
                marker_cx,
                marker_cy - small.line_height() / 2.0,
                TEXT_DARK.color(),
            );
        } else {
            canvas.fill_circle(marker_cx, marker_cy, 6.0, self.theme.bullet_highlight.color())?;
        }

        let text_h = card.lines.len() as f32 * body.line_height();
        let mut y = b.y + (b.h - text_h) / 2.0;
        for line in &card.lines {
            canvas.text(body, line, b.x + 56.0, y, TEXT_BODY.color());
            y += body.line_height();
        }
        Ok(())
    }

    fn terms(&self, canvas: &mut Canvas) -> Result<()> {
        let tag = self.face(TAG_PX);
        let small = self.face(SMALL_PX);
        let x = self.layout.subject_bar.x;
        match &self.layout.terms {
            TermsLayout::Hidden => {}
            TermsLayout::Badges {
                label_y,
                badges,
                badge_height,
            } => {
                canvas.text(&tag, "KEY TERMS", x, *label_y, self.theme.accent.color());
                for badge in badges {
                    canvas.fill_rounded_rect(
                        badge.x,
                        badge.y,
                        badge.width,
                        *badge_height,
                        badge_height / 2.0,
                        self.theme.badge_bg.color(),
                    )?;
                    let y = badge.y + (badge_height - small.line_height()) / 2.0;
                    canvas.text_centered(
                        &small,
                        &badge.label,
                        badge.x + badge.width / 2.0,
                        y,
                        self.theme.bullet_highlight.color(),
                    );
                }
            }
            TermsLayout::Table { label_y, rows } => {
                canvas.text(&tag, "KEY TERMS", x, *label_y, self.theme.accent.color());
                for (i, row) in rows.iter().enumerate() {
                    let b = row.bounds;
                    let fill = if row.is_header {
                        self.theme.primary
                    } else if i % 2 == 0 {
                        ROW_EVEN
                    } else {
                        ROW_ODD
                    };
                    canvas.fill_rect(b.x, b.y, b.w, b.h, fill.color())?;
                    canvas.fill_rect(b.x, b.bottom() - 1.0, b.w, 1.0, GRID.color())?;
                    canvas.fill_rect(row.split_x, b.y, 1.0, b.h, GRID.color())?;

                    let y = b.y + (b.h - small.line_height()) / 2.0;
                    let (term_color, def_color) = if row.is_header {
                        (self.theme.accent, self.theme.accent)
                    } else {
                        (self.theme.accent, TEXT_MUTED)
                    };
                    canvas.text(&small, &row.term, b.x + 10.0, y, term_color.color());
                    canvas.text(&small, &row.definition, row.split_x + 10.0, y, def_color.color());
                }
                if let (Some(first), Some(last)) = (rows.first(), rows.last()) {
                    let top = first.bounds.y;
                    canvas.stroke_rect(
                        first.bounds.x,
                        top,
                        first.bounds.w,
                        last.bounds.bottom() - top,
                        2.0,
                        self.theme.accent.color(),
                    )?;
                }
            }
        }
        Ok(())
    }

    fn footer(&self, canvas: &mut Canvas) -> Result<()> {
        let l = self.layout;
        canvas.fill_rect(0.0, l.footer_y, l.width, FOOTER_H, self.theme.header.color())?;
        canvas.fill_rect(0.0, l.footer_y, l.width, 3.0, self.theme.accent.color())?;

        let face = self.face(SMALL_PX);
        let y = l.footer_y + (FOOTER_H - face.line_height()) / 2.0;
        canvas.text(&face, &self.opts.product_label, 20.0, y, TEXT_MUTED.color());
        canvas.text_centered(&face, &self.slide.subtitle, l.width / 2.0, y, self.theme.accent.color());
        let topic = format!("Topic {}", self.slide.topic_number);
        let x = l.width - face.text_width(&topic) - 20.0;
        canvas.text(&face, &topic, x, y, TEXT_MUTED.color());
        Ok(())
    }
}
