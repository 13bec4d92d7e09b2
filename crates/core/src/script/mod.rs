//! Inputs consumed from upstream collaborators: the segmented script, the
//! narration track, the speaker clip and the generic overlay content.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Intro,
    #[serde(alias = "news")]
    Content,
    Transition,
    Conclusion,
}

/// Term → definition pairs in the order the script lists them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Terms(Vec<(String, String)>);

impl Terms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, term: impl Into<String>, definition: impl Into<String>) {
        let term = term.into();
        let definition = definition.into();
        match self.0.iter_mut().find(|(t, _)| *t == term) {
            Some(entry) => entry.1 = definition,
            None => self.0.push((term, definition)),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(t, d)| (t.as_str(), d.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(t, _)| t.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Terms {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut terms = Terms::new();
        for (k, v) in iter {
            terms.insert(k, v);
        }
        terms
    }
}

impl Serialize for Terms {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (term, definition) in &self.0 {
            map.serialize_entry(term, definition)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Terms {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct TermsVisitor;

        impl<'de> Visitor<'de> for TermsVisitor {
            type Value = Terms;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of term to definition")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Terms, A::Error> {
                let mut terms = Terms::new();
                while let Some((term, definition)) = access.next_entry::<String, String>()? {
                    terms.insert(term, definition);
                }
                Ok(terms)
            }
        }

        deserializer.deserialize_map(TermsVisitor)
    }
}

/// One narration segment as delivered by the script writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptSegment {
    #[serde(rename = "type", alias = "kind")]
    pub kind: SegmentKind,
    #[serde(default, alias = "content")]
    pub text: String,
    #[serde(default)]
    pub word_count: Option<u32>,
    /// Explicit duration in seconds; overrides the word-count estimate.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default, alias = "article_title")]
    pub title: Option<String>,
    #[serde(default)]
    pub subject_category: Option<String>,
    #[serde(default, alias = "exam_relevance")]
    pub exam_tag: Option<String>,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub important_terms: Terms,
    /// Upstream "MM:SS" marker. Scheduling uses the timing model instead.
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl ScriptSegment {
    pub fn new(kind: SegmentKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            word_count: None,
            duration: None,
            title: None,
            subject_category: None,
            exam_tag: None,
            key_points: Vec::new(),
            important_terms: Terms::new(),
            timestamp: None,
        }
    }

    /// Declared word count, or the whitespace word count of the text.
    pub fn words(&self) -> u32 {
        self.word_count
            .unwrap_or_else(|| self.text.split_whitespace().count() as u32)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub segments: Vec<ScriptSegment>,
    #[serde(default)]
    pub headlines: Vec<String>,
}

impl Script {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Distinct subject categories of content segments, first-seen order.
    pub fn subjects_covered(&self) -> Vec<String> {
        let mut subjects: Vec<String> = Vec::new();
        for segment in &self.segments {
            if segment.kind != SegmentKind::Content {
                continue;
            }
            if let Some(subject) = segment.subject_category.as_deref() {
                if !subject.is_empty() && !subjects.iter().any(|s| s == subject) {
                    subjects.push(subject.to_string());
                }
            }
        }
        subjects
    }
}

/// The TTS output. `duration` is the measured length and is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Narration {
    pub path: PathBuf,
    pub duration: f64,
}

/// Talking-head clip from the avatar collaborator, already muxed with narration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakerClip {
    pub path: PathBuf,
    pub duration: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyPointCue {
    pub text: String,
    #[serde(default)]
    pub start_time: f64,
    #[serde(default = "default_key_point_duration")]
    pub duration: f64,
    #[serde(default = "default_importance")]
    pub importance: u8,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_card_theme")]
    pub theme: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImagePosition {
    Left,
    #[default]
    Right,
    Center,
    Fullscreen,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageCue {
    pub path: PathBuf,
    #[serde(default)]
    pub start_time: f64,
    #[serde(default = "default_image_duration")]
    pub duration: f64,
    #[serde(default)]
    pub position: ImagePosition,
    #[serde(default = "default_image_scale")]
    pub scale: f32,
    #[serde(default)]
    pub caption: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsCue {
    #[serde(default)]
    pub stats: Terms,
    #[serde(default)]
    pub start_time: f64,
    #[serde(default = "default_stats_duration")]
    pub duration: f64,
    #[serde(default = "default_stats_title")]
    pub title: String,
}

/// Generic overlays used only when slides are not active.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EducationalContent {
    #[serde(default)]
    pub key_points: Vec<KeyPointCue>,
    #[serde(default)]
    pub images: Vec<ImageCue>,
    #[serde(default)]
    pub statistics: Vec<StatsCue>,
}

impl EducationalContent {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn is_empty(&self) -> bool {
        self.key_points.is_empty() && self.images.is_empty() && self.statistics.is_empty()
    }
}

fn default_key_point_duration() -> f64 {
    5.0
}

fn default_importance() -> u8 {
    3
}

fn default_card_theme() -> String {
    "blue".to_string()
}

fn default_image_duration() -> f64 {
    8.0
}

fn default_image_scale() -> f32 {
    0.3
}

fn default_stats_duration() -> f64 {
    6.0
}

fn default_stats_title() -> String {
    "Key Statistics".to_string()
}
