//! Core library for the Slidecast compositor.
//!
//! Turns a narrated script into one video: a timing model schedules the
//! segments, the slide renderer and overlay library draw time-boxed stills,
//! and the compositor stacks them over a background and the speaker clip
//! before handing the program to an encoder.

pub mod assets;
pub mod audio;
pub mod compositor;
pub mod config;
pub mod error;
pub mod export;
pub mod layout;
pub mod overlay;
pub mod render;
pub mod script;
pub mod slide;
pub mod theme;
pub mod timeline;

pub use audio::{AudioSource, MusicBed};
pub use compositor::{
    ComposeRequest, ComposeState, CompositeResult, Compositor, Layer, LayerStack,
    OverlayStrategy, Program,
};
pub use config::AppConfig;
pub use error::{Result, SlidecastError};
pub use export::{probe_duration, Encoder, EncoderSettings, FfmpegEncoder};
pub use layout::{truncate, wrap, FontMetric};
pub use render::{RenderingContext, Typeface};
pub use script::{EducationalContent, Narration, Script, SpeakerClip};
pub use slide::{build_slides, render_slide, Slide, SlideOptions};
pub use theme::{Theme, ThemeRegistry};
pub use timeline::{build_timeline, format_timestamp, Chapter, Timeline};
