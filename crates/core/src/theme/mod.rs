//! Subject and exam-tag palettes. Pure lookups, no state beyond optional
//! caller overrides.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tiny_skia::Color;

use crate::{Result, SlidecastError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    /// Parses `#rrggbb` or `#rgb`.
    pub fn parse_hex(raw: &str) -> Result<Self> {
        let hex = raw.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(SlidecastError::InvalidInput("color contains non-hex digits"));
        }
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return Err(SlidecastError::InvalidInput("color must be #rgb or #rrggbb")),
        };
        let channel = |i: usize| {
            u8::from_str_radix(&expanded[i..i + 2], 16)
                .map_err(|_| SlidecastError::InvalidInput("color contains non-hex digits"))
        };

        Ok(Self(channel(0)?, channel(2)?, channel(4)?))
    }

    /// `0xrrggbb`, the form ffmpeg color options accept.
    pub fn to_ffmpeg(self) -> String {
        format!("0x{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    pub fn color(self) -> Color {
        Color::from_rgba8(self.0, self.1, self.2, 255)
    }

    pub fn with_alpha(self, alpha: u8) -> Color {
        Color::from_rgba8(self.0, self.1, self.2, alpha)
    }

    /// Linear blend; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

/// Slide palette for one subject category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub primary: Rgb,
    pub accent: Rgb,
    pub header: Rgb,
    pub badge_bg: Rgb,
    pub bullet_highlight: Rgb,
    pub card_bg: Rgb,
    pub gradient_start: Rgb,
    pub gradient_end: Rgb,
}

const BLUE: Theme = Theme {
    primary: Rgb(26, 54, 93),
    accent: Rgb(66, 153, 225),
    header: Rgb(20, 45, 80),
    badge_bg: Rgb(30, 64, 110),
    bullet_highlight: Rgb(144, 205, 244),
    card_bg: Rgb(24, 36, 58),
    gradient_start: Rgb(16, 24, 40),
    gradient_end: Rgb(12, 18, 30),
};

const GREEN: Theme = Theme {
    primary: Rgb(34, 84, 61),
    accent: Rgb(104, 211, 145),
    header: Rgb(28, 70, 50),
    badge_bg: Rgb(38, 96, 68),
    bullet_highlight: Rgb(154, 230, 180),
    card_bg: Rgb(22, 42, 34),
    gradient_start: Rgb(16, 30, 24),
    gradient_end: Rgb(12, 20, 18),
};

const PURPLE: Theme = Theme {
    primary: Rgb(68, 51, 122),
    accent: Rgb(183, 148, 244),
    header: Rgb(55, 40, 100),
    badge_bg: Rgb(78, 58, 140),
    bullet_highlight: Rgb(214, 188, 250),
    card_bg: Rgb(36, 30, 58),
    gradient_start: Rgb(26, 22, 44),
    gradient_end: Rgb(18, 16, 30),
};

const ORANGE: Theme = Theme {
    primary: Rgb(124, 45, 18),
    accent: Rgb(251, 211, 141),
    header: Rgb(100, 35, 14),
    badge_bg: Rgb(140, 56, 22),
    bullet_highlight: Rgb(246, 173, 85),
    card_bg: Rgb(52, 32, 24),
    gradient_start: Rgb(40, 26, 20),
    gradient_end: Rgb(26, 18, 14),
};

const RED: Theme = Theme {
    primary: Rgb(120, 30, 30),
    accent: Rgb(230, 120, 120),
    header: Rgb(95, 22, 22),
    badge_bg: Rgb(134, 38, 38),
    bullet_highlight: Rgb(254, 178, 178),
    card_bg: Rgb(52, 24, 26),
    gradient_start: Rgb(40, 18, 20),
    gradient_end: Rgb(26, 14, 16),
};

pub const DEFAULT_SUBJECT: &str = "Current Affairs";

fn standard_theme(subject: &str) -> Option<Theme> {
    let theme = match subject {
        "Polity" | "Science & Technology" | "Current Affairs" => BLUE,
        "Economy" | "Environment" | "Geography" => GREEN,
        "International Relations" => PURPLE,
        "Social Issues" | "History" => ORANGE,
        "Security" => RED,
        _ => return None,
    };
    Some(theme)
}

/// Total lookup: unknown subjects get the default palette.
pub fn theme_for(subject: &str) -> Theme {
    standard_theme(subject).unwrap_or(BLUE)
}

/// Subject → palette table with optional per-run overrides.
#[derive(Debug, Clone, Default)]
pub struct ThemeRegistry {
    overrides: HashMap<String, Theme>,
}

impl ThemeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, subject: impl Into<String>, theme: Theme) {
        self.overrides.insert(subject.into(), theme);
    }

    pub fn theme_for(&self, subject: &str) -> Theme {
        self.overrides
            .get(subject)
            .copied()
            .unwrap_or_else(|| theme_for(subject))
    }

    pub fn default_theme(&self) -> Theme {
        self.theme_for(DEFAULT_SUBJECT)
    }
}

/// Colors for the free-standing overlay cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardPalette {
    pub primary: Rgb,
    pub secondary: Rgb,
    pub accent: Rgb,
    pub text: Rgb,
    pub bg: Rgb,
}

pub fn card_palette(name: &str) -> CardPalette {
    let (primary, secondary, accent, bg) = match name {
        "green" => (Rgb(34, 84, 61), Rgb(56, 161, 105), Rgb(104, 211, 145), Rgb(28, 35, 33)),
        "orange" => (Rgb(124, 45, 18), Rgb(237, 137, 54), Rgb(251, 211, 141), Rgb(44, 33, 26)),
        "purple" => (Rgb(68, 51, 122), Rgb(128, 90, 213), Rgb(183, 148, 244), Rgb(35, 30, 45)),
        "prelims" => (Rgb(49, 130, 206), Rgb(66, 153, 225), Rgb(144, 205, 244), Rgb(26, 32, 44)),
        "mains" => (Rgb(128, 90, 213), Rgb(159, 122, 234), Rgb(214, 188, 250), Rgb(35, 30, 45)),
        _ => (Rgb(26, 54, 93), Rgb(44, 82, 130), Rgb(66, 153, 225), Rgb(26, 32, 44)),
    };
    CardPalette {
        primary,
        secondary,
        accent,
        text: Rgb::WHITE,
        bg,
    }
}

/// Transition headers are themed by exam tag, not subject.
pub fn exam_palette(exam_tag: &str) -> CardPalette {
    match exam_tag {
        "PRELIMS" => card_palette("prelims"),
        "MAINS" => card_palette("mains"),
        _ => card_palette("blue"),
    }
}

/// Pill color for an exam-relevance tag.
pub fn exam_tag_color(exam_tag: &str) -> Rgb {
    match exam_tag {
        "PRELIMS" => Rgb(49, 130, 206),
        "MAINS" => Rgb(128, 90, 213),
        "BOTH" => Rgb(56, 161, 105),
        _ => Rgb(100, 100, 100),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_subject_gets_default_theme() {
        assert_eq!(theme_for("Underwater Basket Weaving"), theme_for(DEFAULT_SUBJECT));
        assert_eq!(theme_for(""), BLUE);
    }

    #[test]
    fn known_subjects_map_to_their_family() {
        assert_eq!(theme_for("Economy").accent, Rgb(104, 211, 145));
        assert_eq!(theme_for("International Relations").header, Rgb(55, 40, 100));
        assert_eq!(theme_for("Security").primary, Rgb(120, 30, 30));
    }

    #[test]
    fn registry_overrides_win() {
        let mut registry = ThemeRegistry::new();
        registry.register("Economy", RED);
        assert_eq!(registry.theme_for("Economy"), RED);
        assert_eq!(registry.theme_for("Polity"), BLUE);
        assert_eq!(registry.theme_for("nope"), registry.default_theme());
    }

    #[test]
    fn exam_tags_pick_header_palettes() {
        assert_eq!(exam_palette("PRELIMS").primary, Rgb(49, 130, 206));
        assert_eq!(exam_palette("MAINS").primary, Rgb(128, 90, 213));
        assert_eq!(exam_palette("BOTH"), card_palette("blue"));
        assert_eq!(exam_tag_color("other"), Rgb(100, 100, 100));
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(Rgb::parse_hex("#ff0000").unwrap(), Rgb(255, 0, 0));
        assert_eq!(Rgb::parse_hex("#1a1a2e").unwrap(), Rgb(26, 26, 46));
        assert_eq!(Rgb::parse_hex("#fff").unwrap(), Rgb::WHITE);
        assert!(Rgb::parse_hex("#12345").is_err());
        assert!(Rgb::parse_hex("#zzzzzz").is_err());
        assert_eq!(Rgb(15, 20, 25).to_ffmpeg(), "0x0f1419");
    }

    #[test]
    fn lerp_hits_both_ends() {
        let a = Rgb(0, 0, 0);
        let b = Rgb(200, 100, 50);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Rgb(100, 50, 25));
    }
}
