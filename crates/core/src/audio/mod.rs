//! Audio side of a composite: each sequential part carries exactly one audio
//! source whose length equals the part's picture length, so concatenation
//! never mixes parts with and without sound.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Every audio stream is normalized to this before concat or mixing.
pub const SAMPLE_RATE: u32 = 44_100;

fn normalize() -> String {
    format!("aresample={SAMPLE_RATE},aformat=sample_fmts=fltp:channel_layouts=stereo")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AudioSource {
    /// Generated digital silence.
    Silence { duration: f64 },
    /// The narration input, trimmed (or padded) to `duration`.
    Narration { duration: f64 },
}

impl AudioSource {
    pub fn silence(duration: f64) -> Self {
        Self::Silence {
            duration: duration.max(0.0),
        }
    }

    pub fn narration(duration: f64) -> Self {
        Self::Narration {
            duration: duration.max(0.0),
        }
    }

    pub fn duration(&self) -> f64 {
        match self {
            Self::Silence { duration } | Self::Narration { duration } => *duration,
        }
    }

    /// Filter chain producing this source on `[label]`. Narration is padded
    /// with silence if the file runs short, so the stream always lasts
    /// exactly `duration`.
    pub fn filter(&self, narration_input: usize, label: &str) -> String {
        match self {
            Self::Silence { duration } => format!(
                "anullsrc=r={SAMPLE_RATE}:cl=stereo,atrim=duration={duration:.3},{}[{label}]",
                normalize()
            ),
            Self::Narration { duration } => format!(
                "[{narration_input}:a]atrim=0:{duration:.3},asetpts=PTS-STARTPTS,{},apad=whole_dur={duration:.3}[{label}]",
                normalize()
            ),
        }
    }
}

/// Total length of sources played back to back.
pub fn concat_duration(sources: &[AudioSource]) -> f64 {
    sources.iter().map(AudioSource::duration).sum()
}

/// Optional looped music under the narration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicBed {
    pub path: PathBuf,
    /// Gain relative to narration, clamped to `[0, 1]`.
    pub volume: f32,
}

impl MusicBed {
    pub fn new(path: impl Into<PathBuf>, volume: f32) -> Self {
        Self {
            path: path.into(),
            volume: volume.clamp(0.0, 1.0),
        }
    }

    /// Trims the (already looped) music input to `total`, attenuates it and
    /// mixes it under `[voice]`. The voice stream decides the output length.
    pub fn filter(&self, music_input: usize, voice: &str, total: f64, label: &str) -> String {
        format!(
            "[{music_input}:a]atrim=0:{total:.3},asetpts=PTS-STARTPTS,{},volume={:.3}[music];\
             [{voice}][music]amix=inputs=2:duration=first:dropout_transition=0:normalize=0[{label}]",
            normalize(),
            self.volume
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_padding_matches_picture_length() {
        let parts = [
            AudioSource::silence(4.0),
            AudioSource::narration(300.0),
            AudioSource::silence(6.0),
        ];
        assert_eq!(concat_duration(&parts), 310.0);
    }

    #[test]
    fn silence_filter_is_bounded_by_duration() {
        let filter = AudioSource::silence(4.0).filter(0, "a0");
        assert!(filter.starts_with("anullsrc=r=44100:cl=stereo,atrim=duration=4.000"));
        assert!(filter.ends_with("[a0]"));
    }

    #[test]
    fn narration_filter_trims_and_pads() {
        let filter = AudioSource::narration(300.0).filter(2, "a1");
        assert!(filter.starts_with("[2:a]atrim=0:300.000,asetpts=PTS-STARTPTS"));
        assert!(filter.contains("apad=whole_dur=300.000"));
        assert!(filter.ends_with("[a1]"));
    }

    #[test]
    fn negative_durations_clamp_to_zero() {
        assert_eq!(AudioSource::silence(-3.0).duration(), 0.0);
    }

    #[test]
    fn music_is_attenuated_and_mixed_not_replaced() {
        let bed = MusicBed::new("/music/bed.mp3", 1.7);
        assert_eq!(bed.volume, 1.0);

        let filter = MusicBed::new("/music/bed.mp3", 0.1).filter(3, "voice", 310.0, "mix");
        assert!(filter.starts_with("[3:a]atrim=0:310.000"));
        assert!(filter.contains("volume=0.100[music]"));
        assert!(filter.contains("[voice][music]amix=inputs=2:duration=first"));
        assert!(filter.ends_with("[mix]"));
    }
}
