//! Text layout engine: pixel-budget wrapping, ellipsis truncation and
//! left-to-right badge flow. Every visual renderer measures through here.

/// Width measurement for one face at one size.
pub trait FontMetric {
    fn text_width(&self, text: &str) -> f32;
    fn line_height(&self) -> f32;
}

impl<M: FontMetric + ?Sized> FontMetric for &M {
    fn text_width(&self, text: &str) -> f32 {
        (**self).text_width(text)
    }

    fn line_height(&self) -> f32 {
        (**self).line_height()
    }
}

/// Fixed-advance approximation, used when no face is loaded and in tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonoMetric {
    pub advance: f32,
    pub line_height: f32,
}

impl MonoMetric {
    pub fn new(advance: f32, line_height: f32) -> Self {
        Self {
            advance,
            line_height,
        }
    }

    /// Rough proportions of a sans face at `px`.
    pub fn for_size(px: f32) -> Self {
        Self::new(px * 0.55, px * 1.25)
    }
}

impl FontMetric for MonoMetric {
    fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.advance
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }
}

pub const ELLIPSIS: &str = "…";

/// Greedy word wrap. Lines past `max_lines` are dropped without an ellipsis.
/// A single word wider than the budget sits on its own line.
pub fn wrap<M: FontMetric>(text: &str, max_width: f32, metric: &M, max_lines: usize) -> Vec<String> {
    let mut lines = Vec::new();
    if max_lines == 0 {
        return lines;
    }

    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if metric.text_width(&candidate) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
            if lines.len() == max_lines {
                return lines;
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Returns `text` untouched when it fits, otherwise the longest prefix that
/// fits with a trailing ellipsis.
pub fn truncate<M: FontMetric>(text: &str, max_width: f32, metric: &M) -> String {
    if metric.text_width(text) <= max_width {
        return text.to_string();
    }

    let mut chars: Vec<char> = text.chars().collect();
    while chars.pop().is_some() {
        let prefix: String = chars.iter().collect();
        let candidate = format!("{}{ELLIPSIS}", prefix.trim_end());
        if metric.text_width(&candidate) <= max_width {
            return candidate;
        }
    }
    ELLIPSIS.to_string()
}

/// Geometry for a badge flow. Coordinates are relative to the flow origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BadgeFlow {
    pub max_width: f32,
    pub badge_height: f32,
    pub gap: f32,
    /// Horizontal text padding on each side of a badge.
    pub padding_x: f32,
    /// Badges whose bottom edge would pass this are not placed.
    pub max_height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BadgePlacement {
    /// Label as drawn; truncated if the token alone is wider than a row.
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
}

/// Places badges left to right, wrapping rows at `max_width`. Stops silently
/// at the first badge that would cross `max_height`.
pub fn flow_badges<M: FontMetric, S: AsRef<str>>(
    tokens: &[S],
    metric: &M,
    flow: &BadgeFlow,
) -> Vec<BadgePlacement> {
    let mut placed = Vec::new();
    let (mut x, mut y) = (0.0_f32, 0.0_f32);

    for token in tokens {
        let token = token.as_ref();
        let mut label = token.to_string();
        let mut width = metric.text_width(token) + flow.padding_x * 2.0;
        if width > flow.max_width {
            label = truncate(token, (flow.max_width - flow.padding_x * 2.0).max(0.0), metric);
            width = flow.max_width;
        }

        if x > 0.0 && x + width > flow.max_width {
            x = 0.0;
            y += flow.badge_height + flow.gap;
        }
        if y + flow.badge_height > flow.max_height {
            break;
        }

        placed.push(BadgePlacement { label, x, y, width });
        x += width + flow.gap;
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;

    const METRIC: MonoMetric = MonoMetric {
        advance: 10.0,
        line_height: 20.0,
    };

    const SAMPLE: &str = "The Reserve Bank kept the repo rate unchanged at six point five \
                          percent citing sticky food inflation and global uncertainty";

    #[test]
    fn every_wrapped_line_fits() {
        for width in [130.0, 200.0, 333.0, 1000.0] {
            for line in wrap(SAMPLE, width, &METRIC, usize::MAX) {
                assert!(METRIC.text_width(&line) <= width, "{line:?} overflows {width}");
            }
        }
    }

    #[test]
    fn wrapping_is_idempotent() {
        for width in [130.0, 210.0, 480.0] {
            let first = wrap(SAMPLE, width, &METRIC, usize::MAX);
            let second = wrap(&first.join(" "), width, &METRIC, usize::MAX);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn wrap_drops_lines_past_limit() {
        let all = wrap(SAMPLE, 200.0, &METRIC, usize::MAX);
        let two = wrap(SAMPLE, 200.0, &METRIC, 2);
        assert!(all.len() > 2);
        assert_eq!(two, all[..2].to_vec());
        assert!(!two[1].ends_with(ELLIPSIS));
        assert!(wrap(SAMPLE, 200.0, &METRIC, 0).is_empty());
        assert!(wrap("   ", 200.0, &METRIC, 3).is_empty());
    }

    #[test]
    fn oversized_word_gets_its_own_line() {
        let lines = wrap("a supercalifragilistic b", 50.0, &METRIC, 5);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn truncate_is_noop_when_text_fits() {
        for text in ["", "short", "exactly ten"] {
            let width = METRIC.text_width(text);
            assert_eq!(truncate(text, width, &METRIC), text);
            assert_eq!(truncate(text, width + 50.0, &METRIC), text);
        }
    }

    #[test]
    fn truncate_appends_ellipsis_within_budget() {
        let out = truncate("Parliament passes data bill", 100.0, &METRIC);
        assert!(out.ends_with(ELLIPSIS));
        assert!(METRIC.text_width(&out) <= 100.0);
        assert_eq!(out, "Parliamen…");
        assert_eq!(truncate("abc", 5.0, &METRIC), ELLIPSIS);
    }

    #[test]
    fn badges_wrap_rows_and_stop_at_limit() {
        let flow = BadgeFlow {
            max_width: 100.0,
            badge_height: 30.0,
            gap: 10.0,
            padding_x: 5.0,
            max_height: 70.0,
        };
        // Widths: 40, 40, 60, 40 -> rows [40, 40] [60] then a third row at y=80.
        let tokens = ["GDP", "CPI", "FRBMA", "RBI"];
        let placed = flow_badges(&tokens, &METRIC, &flow);

        assert_eq!(placed.len(), 3);
        assert_eq!((placed[0].x, placed[0].y), (0.0, 0.0));
        assert_eq!((placed[1].x, placed[1].y), (50.0, 0.0));
        assert_eq!((placed[2].x, placed[2].y), (0.0, 40.0));
        for badge in &placed {
            assert!(badge.x + badge.width <= flow.max_width);
            assert!(badge.y + flow.badge_height <= flow.max_height);
        }
    }

    #[test]
    fn badge_wider_than_row_is_clamped() {
        let flow = BadgeFlow {
            max_width: 60.0,
            badge_height: 20.0,
            gap: 4.0,
            padding_x: 5.0,
            max_height: 100.0,
        };
        let placed = flow_badges(&["Biodiversity"], &METRIC, &flow);
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].width, 60.0);
        assert_eq!(placed[0].label, "Biod…");
    }
}
