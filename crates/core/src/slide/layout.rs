//! Pure slide geometry. Everything the painter draws is decided here, so the
//! overflow rules can be checked without rasterizing.

use crate::config::TermsStyle;
use crate::layout::{flow_badges, truncate, wrap, BadgeFlow, BadgePlacement, FontMetric};

use super::{Slide, SlideOptions};

pub const HEADER_H: f32 = 90.0;
pub const FOOTER_H: f32 = 55.0;
pub const PADDING: f32 = 25.0;
pub const RIGHT_MARGIN: f32 = 40.0;
/// Gap kept between the last content element and the footer band.
pub const BOTTOM_MARGIN: f32 = 10.0;

pub const TITLE_PX: f32 = 42.0;
pub const HEADING_PX: f32 = 32.0;
pub const BODY_PX: f32 = 26.0;
pub const SMALL_PX: f32 = 20.0;
pub const TAG_PX: f32 = 18.0;

const SUBJECT_BAR_H: f32 = 40.0;
const SECTION_GAP: f32 = 20.0;
const LABEL_H: f32 = 28.0;

const CARD_MAX_LINES: usize = 2;
const CARD_PADDING: f32 = 24.0;
const CARD_MIN_H: f32 = 64.0;
const CARD_GAP: f32 = 12.0;
/// Room on the card's left edge for the number badge or bullet dot.
const CARD_MARKER_W: f32 = 56.0;
const CARD_INNER_RIGHT: f32 = 16.0;

pub const MAX_TERM_BADGES: usize = 6;
const TERM_BADGE_H: f32 = 34.0;
const TERM_BADGE_GAP: f32 = 10.0;
const TERM_BADGE_PAD_X: f32 = 14.0;

/// Including the header row.
pub const MAX_TABLE_ROWS: usize = 7;
const TABLE_ROW_H: f32 = 36.0;
const TABLE_TERM_SHARE: f32 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderLayout {
    pub badge: Bounds,
    pub badge_label: String,
    pub title: String,
    pub title_x: f32,
    pub exam_tag: Option<(Bounds, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardLayout {
    /// 1-based position in the key-point list.
    pub number: usize,
    pub lines: Vec<String>,
    pub bounds: Bounds,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub bounds: Bounds,
    pub term: String,
    pub definition: String,
    pub is_header: bool,
    /// x of the divider between the two columns.
    pub split_x: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TermsLayout {
    Hidden,
    /// Badge coordinates are absolute.
    Badges {
        label_y: f32,
        badges: Vec<BadgePlacement>,
        badge_height: f32,
    },
    Table {
        label_y: f32,
        rows: Vec<TableRow>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlideLayout {
    pub width: f32,
    pub height: f32,
    pub content_x: f32,
    pub footer_y: f32,
    pub header: HeaderLayout,
    pub subject_bar: Bounds,
    pub subject_label: String,
    pub cards: Vec<CardLayout>,
    pub terms: TermsLayout,
}

impl SlideLayout {
    /// Lowest y any content-band element may reach.
    pub fn content_limit(&self) -> f32 {
        self.footer_y - BOTTOM_MARGIN
    }

    pub fn accent_rule_x(&self) -> f32 {
        self.content_x - 10.0
    }

    /// Computes the slide geometry. `face` yields a metric for a pixel size.
    pub fn compute<M, F>(slide: &Slide, canvas: (u32, u32), opts: &SlideOptions, face: F) -> Self
    where
        M: FontMetric,
        F: Fn(f32) -> M,
    {
        let width = canvas.0 as f32;
        let height = canvas.1 as f32;
        let content_x = (width * opts.content_start_x.clamp(0.0, 0.9)).floor();
        let footer_y = height - FOOTER_H;
        let limit = footer_y - BOTTOM_MARGIN;
        let inner_x = content_x + PADDING;
        let inner_w = (width - inner_x - RIGHT_MARGIN).max(0.0);

        let header = header_layout(slide, width, &face);

        let mut y = HEADER_H + SECTION_GAP;
        let subject_bar = Bounds::new(inner_x, y, inner_w, SUBJECT_BAR_H);
        let subject_label = truncate(&slide.subtitle, (inner_w - 32.0).max(0.0), &face(SMALL_PX));
        y += SUBJECT_BAR_H + SECTION_GAP;

        let body = face(BODY_PX);
        let text_w = (inner_w - CARD_MARKER_W - CARD_INNER_RIGHT).max(0.0);
        let mut cards = Vec::new();
        for (i, point) in slide.bullet_points.iter().take(opts.max_key_points).enumerate() {
            let lines = wrap(point, text_w, &body, CARD_MAX_LINES);
            if lines.is_empty() {
                continue;
            }
            let h = (lines.len() as f32 * body.line_height() + CARD_PADDING).max(CARD_MIN_H);
            if y + h > limit {
                break;
            }
            cards.push(CardLayout {
                number: i + 1,
                lines,
                bounds: Bounds::new(inner_x, y, inner_w, h),
            });
            y += h + CARD_GAP;
        }

        let terms = terms_layout(slide, opts, inner_x, inner_w, y + SECTION_GAP - CARD_GAP, limit, &face);

        Self {
            width,
            height,
            content_x,
            footer_y,
            header,
            subject_bar,
            subject_label,
            cards,
            terms,
        }
    }
}

fn header_layout<M: FontMetric, F: Fn(f32) -> M>(slide: &Slide, width: f32, face: &F) -> HeaderLayout {
    let heading = face(HEADING_PX);
    let badge_label = format!("#{}", slide.topic_number);
    let badge_w = heading.text_width(&badge_label) + 24.0;
    let badge_h = (heading.line_height() + 14.0).min(HEADER_H - 16.0);
    let badge = Bounds::new(20.0, (HEADER_H - badge_h) / 2.0, badge_w, badge_h);

    let exam_tag = (!slide.exam_tag.is_empty()).then(|| {
        let tag = face(TAG_PX);
        let w = tag.text_width(&slide.exam_tag) + 20.0;
        let h = tag.line_height() + 10.0;
        (
            Bounds::new(width - w - 20.0, (HEADER_H - h) / 2.0, w, h),
            slide.exam_tag.clone(),
        )
    });

    // The title stops 20 px short of the exam tag, however wide the tag is.
    let title_x = badge.right() + 20.0;
    let mut title_right = width - 160.0;
    if let Some((tag, _)) = &exam_tag {
        title_right = title_right.min(tag.x - 20.0);
    }
    let title_budget = (title_right - title_x).max(0.0);
    let title = truncate(&slide.title, title_budget, &face(TITLE_PX));

    HeaderLayout {
        badge,
        badge_label,
        title,
        title_x,
        exam_tag,
    }
}

fn terms_layout<M: FontMetric, F: Fn(f32) -> M>(
    slide: &Slide,
    opts: &SlideOptions,
    x: f32,
    w: f32,
    y: f32,
    limit: f32,
    face: &F,
) -> TermsLayout {
    if slide.important_terms.is_empty() {
        return TermsLayout::Hidden;
    }
    let use_table = opts.terms_style == TermsStyle::Table && slide.important_terms.len() >= 2;
    let first_item_h = if use_table { TABLE_ROW_H } else { TERM_BADGE_H };
    if y + LABEL_H + first_item_h > limit {
        return TermsLayout::Hidden;
    }

    let label_y = y;
    let top = y + LABEL_H;
    let small = face(SMALL_PX);

    if use_table {
        let split_x = x + (w * TABLE_TERM_SHARE).floor();
        let term_w = (split_x - x - 20.0).max(0.0);
        let def_w = (x + w - split_x - 20.0).max(0.0);
        let entries = std::iter::once(("Term", "Definition")).chain(slide.important_terms.iter());

        let mut rows = Vec::new();
        for (i, (term, definition)) in entries.take(MAX_TABLE_ROWS).enumerate() {
            let bounds = Bounds::new(x, top + i as f32 * TABLE_ROW_H, w, TABLE_ROW_H);
            if bounds.bottom() > limit {
                break;
            }
            rows.push(TableRow {
                bounds,
                term: truncate(term, term_w, &small),
                definition: truncate(definition, def_w, &small),
                is_header: i == 0,
                split_x,
            });
        }
        return TermsLayout::Table { label_y, rows };
    }

    let flow = BadgeFlow {
        max_width: w,
        badge_height: TERM_BADGE_H,
        gap: TERM_BADGE_GAP,
        padding_x: TERM_BADGE_PAD_X,
        max_height: limit - top,
    };
    let tokens: Vec<&str> = slide.important_terms.keys().take(MAX_TERM_BADGES).collect();
    let badges = flow_badges(&tokens, &small, &flow)
        .into_iter()
        .map(|b| BadgePlacement {
            x: b.x + x,
            y: b.y + top,
            ..b
        })
        .collect();

    TermsLayout::Badges {
        label_y,
        badges,
        badge_height: TERM_BADGE_H,
    }
}
