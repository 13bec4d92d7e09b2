use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::script::{ScriptSegment, SegmentKind, Terms};

/// Slow, educational delivery. Only an estimate; measured narration wins.
pub const DEFAULT_SPEAKING_RATE_WPM: f64 = 140.0;

/// Structured metadata carried by content segments only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentMeta {
    pub title: String,
    pub subject_category: String,
    pub exam_tag: String,
    pub key_points: Vec<String>,
    pub important_terms: Terms,
}

impl ContentMeta {
    /// The segment title, or "Topic N" for the `ordinal`-th (1-based)
    /// content segment when the script left it blank.
    pub fn display_title(&self, ordinal: usize) -> String {
        if self.title.trim().is_empty() {
            format!("Topic {ordinal}")
        } else {
            self.title.clone()
        }
    }
}

/// A scheduled narration segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
    pub word_count: u32,
    pub start_time: f64,
    pub duration: f64,
    pub meta: Option<ContentMeta>,
}

impl Segment {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    pub fn is_content(&self) -> bool {
        self.kind == SegmentKind::Content
    }
}

/// Half-open time window `[start, start + duration)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub start: f64,
    pub duration: f64,
}

impl Window {
    pub fn new(start: f64, duration: f64) -> Self {
        Self { start, duration }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t < self.end()
    }
}

/// External chapter marker for the upload and notes collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub time: String,
    pub title: String,
    pub subject: String,
}

/// Ordered, non-overlapping segments plus the authoritative total length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    segments: Vec<Segment>,
    total_duration: f64,
}

/// `word_count / wpm * 60`, never negative.
pub fn estimate_duration(word_count: u32, speaking_rate_wpm: f64) -> f64 {
    (f64::from(word_count) / speaking_rate_wpm * 60.0).max(0.0)
}

/// Lays segments end to end. Until reconciled with the narration, the total
/// duration is the sum of the estimates.
pub fn build_timeline(segments: &[ScriptSegment], speaking_rate_wpm: f64) -> Timeline {
    let rate = if speaking_rate_wpm.is_finite() && speaking_rate_wpm > 0.0 {
        speaking_rate_wpm
    } else {
        warn!(speaking_rate_wpm, "unusable speaking rate, using default");
        DEFAULT_SPEAKING_RATE_WPM
    };

    let mut cursor = 0.0;
    let mut scheduled = Vec::with_capacity(segments.len());
    for source in segments {
        let word_count = source.words();
        if let Some(upstream) = source.timestamp.as_deref().and_then(parse_timestamp) {
            let gap = cursor - upstream;
            if gap.abs() > 1.0 {
                debug!(
                    segment = scheduled.len(),
                    upstream,
                    scheduled = cursor,
                    gap,
                    "upstream timestamp disagrees with the schedule"
                );
            }
        }
        let duration = match source.duration {
            Some(explicit) if explicit.is_finite() => explicit.max(0.0),
            _ => estimate_duration(word_count, rate),
        };
        let meta = (source.kind == SegmentKind::Content).then(|| ContentMeta {
            title: source.title.clone().unwrap_or_default(),
            subject_category: source
                .subject_category
                .clone()
                .unwrap_or_else(|| "Current Affairs".to_string()),
            exam_tag: source.exam_tag.clone().unwrap_or_default(),
            key_points: source.key_points.clone(),
            important_terms: source.important_terms.clone(),
        });

        scheduled.push(Segment {
            kind: source.kind,
            text: source.text.clone(),
            word_count,
            start_time: cursor,
            duration,
            meta,
        });
        cursor += duration;
    }

    Timeline {
        segments: scheduled,
        total_duration: cursor,
    }
}

impl Timeline {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Sum of the per-segment estimates.
    pub fn estimated_duration(&self) -> f64 {
        self.segments.iter().map(|s| s.duration).sum()
    }

    /// Pins the total length to the measured narration. Segment windows are
    /// left untouched: they only schedule overlays.
    pub fn with_narration_duration(mut self, measured: f64) -> Self {
        self.total_duration = measured.max(0.0);
        let drift = self.drift();
        if drift.abs() > 1.0 {
            warn!(
                estimated = self.estimated_duration(),
                measured = self.total_duration,
                drift,
                "segment estimates drift from narration length"
            );
        }
        self
    }

    /// Estimated minus measured seconds. Positive means the script overruns.
    pub fn drift(&self) -> f64 {
        self.estimated_duration() - self.total_duration
    }

    pub fn content_segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| s.is_content())
    }

    /// One window per content segment, running until the next content
    /// segment starts (or the end of the narration), so slides persist over
    /// transition filler.
    pub fn slide_windows(&self) -> Vec<Window> {
        let starts: Vec<f64> = self.content_segments().map(|s| s.start_time).collect();
        starts
            .iter()
            .enumerate()
            .map(|(i, &start)| {
                let end = starts.get(i + 1).copied().unwrap_or(self.total_duration);
                Window::new(start, (end - start).max(0.0))
            })
            .collect()
    }

    pub fn segment_at(&self, t: f64) -> Option<&Segment> {
        self.segments
            .iter()
            .find(|s| t >= s.start_time && t < s.end_time())
    }

    /// Chapter markers, shifted by `offset` seconds of leading material.
    /// Topics that start at or after the end of the narration are never
    /// shown and get no marker.
    pub fn chapters(&self, offset: f64) -> Vec<Chapter> {
        self.content_segments()
            .enumerate()
            .filter(|(_, segment)| segment.start_time < self.total_duration)
            .map(|(i, segment)| {
                let meta = segment.meta.clone().unwrap_or_default();
                Chapter {
                    time: format_timestamp(offset + segment.start_time),
                    title: meta.display_title(i + 1),
                    subject: meta.subject_category,
                }
            })
            .collect()
    }

    /// Chapters for the finished video, where the body follows `intro`
    /// seconds of opening card. A non-empty intro gets its own marker at
    /// `00:00`.
    pub fn video_chapters(&self, intro: f64) -> Vec<Chapter> {
        let mut chapters = Vec::new();
        if intro > 0.0 {
            chapters.push(Chapter {
                time: format_timestamp(0.0),
                title: "Introduction".to_string(),
                subject: "Overview".to_string(),
            });
        }
        chapters.extend(self.chapters(intro.max(0.0)));
        chapters
    }
}

/// Seconds as `MM:SS`; minutes keep counting past 59.
pub fn format_timestamp(seconds: f64) -> String {
    let whole = seconds.max(0.0).floor() as u64;
    format!("{:02}:{:02}", whole / 60, whole % 60)
}

/// Parses `MM:SS`. Anything else is `None`.
pub fn parse_timestamp(raw: &str) -> Option<f64> {
    let mut parts = raw.trim().split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(m), Some(s), None) => {
            let (m, s) = (m.parse::<u64>().ok()?, s.parse::<u64>().ok()?);
            Some((m * 60 + s) as f64)
        }
        _ => None,
    }
}
