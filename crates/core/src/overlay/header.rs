use crate::config::{IntroConfig, OutroConfig};
use crate::layout::{wrap, FontMetric};
use crate::render::{Canvas, RenderingContext};
use crate::theme::{exam_palette, CardPalette, Rgb, DEFAULT_SUBJECT};
use crate::timeline::{Timeline, Window};
use crate::Result;

use super::{
    guarded, OverlayImage, HEADER_FADE, OUTRO_FADE_OUT, SMALL_PX, SUBHEADING_PX, TINY_PX,
    TITLE_PX,
};

const TITLE_CHAR_CAP: usize = 50;
const BAR_H: f32 = 100.0;
const CTA_COLOR: Rgb = Rgb(255, 107, 107);
const CTA_PX: f32 = 32.0;

/// Full-canvas topic transition card.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicHeader {
    /// `None` renders the card without the "TOPIC N" line (the intro).
    pub number: Option<usize>,
    pub title: String,
    pub subtitle: String,
    pub exam_tag: String,
    pub subject: String,
    pub window: Window,
}

/// One header per content segment, starting with the segment.
pub fn topic_headers(timeline: &Timeline, duration: f64) -> Vec<TopicHeader> {
    timeline
        .content_segments()
        .enumerate()
        .map(|(i, segment)| {
            let meta = segment.meta.clone().unwrap_or_default();
            TopicHeader {
                number: Some(i + 1),
                title: meta.display_title(i + 1).chars().take(TITLE_CHAR_CAP).collect(),
                subtitle: meta.subject_category.clone(),
                exam_tag: meta.exam_tag,
                subject: meta.subject_category,
                window: Window::new(segment.start_time, duration),
            }
        })
        .collect()
}

pub fn topic_header(topic: &TopicHeader, canvas: (u32, u32), ctx: &RenderingContext) -> Option<OverlayImage> {
    guarded("topic header", || {
        let card = draw_header_card(topic, canvas, ctx)?;
        Ok(OverlayImage::new(card.into_pixmap(), 0, 0, topic.window).with_fades(HEADER_FADE, HEADER_FADE))
    })
}

/// Opening card: the header layout without a topic number, listing up to
/// three covered subjects.
pub fn intro_card(
    config: &IntroConfig,
    date: &str,
    subjects: &[String],
    canvas: (u32, u32),
    ctx: &RenderingContext,
) -> Option<OverlayImage> {
    let subject = if subjects.is_empty() {
        DEFAULT_SUBJECT.to_string()
    } else {
        subjects.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
    };
    let topic = TopicHeader {
        number: None,
        title: config.text.clone(),
        subtitle: date.to_string(),
        exam_tag: config.exam_tag.clone(),
        subject,
        window: Window::new(0.0, config.duration),
    };
    topic_header(&topic, canvas, ctx)
}

/// Closing card: centered sign-off line and call-to-action lines.
pub fn outro_card(config: &OutroConfig, canvas: (u32, u32), ctx: &RenderingContext) -> Option<OverlayImage> {
    guarded("outro", || {
        let (width, height) = (canvas.0 as f32, canvas.1 as f32);
        let mut card = Canvas::filled(canvas.0, canvas.1, Rgb::parse_hex(&config.background)?)?;

        let main = ctx.metric(TITLE_PX);
        card.text_centered(
            &main,
            &config.text,
            width / 2.0,
            height / 2.0 - main.line_height(),
            Rgb::WHITE.color(),
        );

        let cta = ctx.metric(CTA_PX);
        let mut y = height / 2.0 + 60.0;
        for line in config.call_to_action.lines() {
            card.text_centered(&cta, line, width / 2.0, y, CTA_COLOR.color());
            y += cta.line_height();
        }

        let window = Window::new(0.0, config.duration);
        Ok(OverlayImage::new(card.into_pixmap(), 0, 0, window).with_fades(HEADER_FADE, OUTRO_FADE_OUT))
    })
}

fn draw_header_card(topic: &TopicHeader, canvas: (u32, u32), ctx: &RenderingContext) -> Result<Canvas> {
    let palette: CardPalette = exam_palette(&topic.exam_tag);
    let (width, height) = (canvas.0 as f32, canvas.1 as f32);
    let mid = height / 2.0;
    let mut card = Canvas::filled(canvas.0, canvas.1, palette.bg)?;

    card.vertical_gradient(0.0, 0.0, width, BAR_H, palette.primary, palette.bg)?;
    card.vertical_gradient(0.0, height - BAR_H, width, BAR_H, palette.bg, palette.primary)?;

    let title_face = ctx.metric(TITLE_PX);
    if let Some(number) = topic.number {
        let label = format!("TOPIC {number}");
        card.text_centered(&title_face, &label, width / 2.0, mid - 100.0, palette.accent.color());
    }

    let mut y = mid - 30.0;
    for line in wrap(&topic.title, width - 100.0, &title_face, 3) {
        card.text_centered(&title_face, &line, width / 2.0, y, palette.text.color());
        y += title_face.line_height();
    }

    if !topic.subtitle.is_empty() {
        let sub = ctx.metric(SUBHEADING_PX);
        let sub_y = (mid + 50.0).max(y);
        card.text_centered(&sub, &topic.subtitle, width / 2.0, sub_y, palette.secondary.color());
    }

    if !topic.exam_tag.is_empty() {
        let face = ctx.metric(SMALL_PX);
        let pill_w = face.text_width(&topic.exam_tag) + 30.0;
        let pill_x = (width - pill_w) / 2.0;
        let pill_y = mid + 100.0;
        card.fill_rounded_rect(pill_x, pill_y, pill_w, 35.0, 5.0, palette.accent.color())?;
        card.text(&face, &topic.exam_tag, pill_x + 15.0, pill_y + 7.0, palette.bg.color());
    }

    if !topic.subject.is_empty() {
        let face = ctx.metric(TINY_PX);
        let label = format!("Subject: {}", topic.subject);
        card.text(&face, &label, 50.0, height - 50.0, palette.secondary.color());
    }
    Ok(card)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{ScriptSegment, SegmentKind};
    use crate::timeline::build_timeline;

    fn ctx() -> RenderingContext {
        RenderingContext::default()
    }

    #[test]
    fn headers_start_with_their_segment() {
        let mut intro = ScriptSegment::new(SegmentKind::Intro, "");
        intro.duration = Some(20.0);
        let mut topic = ScriptSegment::new(SegmentKind::Content, "");
        topic.duration = Some(90.0);
        topic.title = Some("x".repeat(80));
        topic.exam_tag = Some("MAINS".to_string());
        let timeline = build_timeline(&[intro, topic], 140.0);

        let headers = topic_headers(&timeline, 2.0);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].number, Some(1));
        assert_eq!(headers[0].window, Window::new(20.0, 2.0));
        assert_eq!(headers[0].title.chars().count(), TITLE_CHAR_CAP);
    }

    #[test]
    fn untitled_topics_get_a_numbered_header() {
        let mut first = ScriptSegment::new(SegmentKind::Content, "");
        first.duration = Some(30.0);
        first.title = Some("Budget".to_string());
        let mut second = ScriptSegment::new(SegmentKind::Content, "");
        second.duration = Some(30.0);
        let timeline = build_timeline(&[first, second], 140.0);

        let titles: Vec<String> = topic_headers(&timeline, 2.0).into_iter().map(|h| h.title).collect();
        assert_eq!(titles, vec!["Budget", "Topic 2"]);
    }

    #[test]
    fn header_card_is_full_canvas_and_themed_by_exam_tag() {
        let topic = TopicHeader {
            number: Some(3),
            title: "Monsoon session".to_string(),
            subtitle: "Polity".to_string(),
            exam_tag: "PRELIMS".to_string(),
            subject: "Polity".to_string(),
            window: Window::new(5.0, 2.0),
        };
        let image = topic_header(&topic, (320, 240), &ctx()).unwrap();

        assert_eq!((image.x, image.y), (0, 0));
        assert_eq!((image.pixmap.width(), image.pixmap.height()), (320, 240));
        assert_eq!(image.fade_in, HEADER_FADE);
        let center = image.pixmap.pixel(5, 120).unwrap();
        let bg = exam_palette("PRELIMS").bg;
        assert_eq!((center.red(), center.green(), center.blue()), (bg.0, bg.1, bg.2));
    }

    #[test]
    fn intro_spans_configured_duration() {
        let subjects: Vec<String> = ["Economy", "Polity", "History", "Security"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let config = IntroConfig::default();
        let image = intro_card(&config, "2024-03-01", &subjects, (160, 90), &ctx()).unwrap();
        assert_eq!(image.window, Window::new(0.0, config.duration));
    }

    #[test]
    fn outro_uses_configured_background() {
        let config = OutroConfig::default();
        let image = outro_card(&config, (64, 64), &ctx()).unwrap();
        let px = image.pixmap.pixel(1, 1).unwrap();
        assert_eq!((px.red(), px.green(), px.blue()), (0x1a, 0x1a, 0x2e));
        assert_eq!(image.fade_out, OUTRO_FADE_OUT);
    }

    #[test]
    fn bad_outro_color_is_skipped_not_fatal() {
        let config = OutroConfig {
            background: "not-a-color".to_string(),
            ..OutroConfig::default()
        };
        assert!(outro_card(&config, (64, 64), &ctx()).is_none());
    }
}
