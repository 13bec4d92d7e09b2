use std::path::PathBuf;

/// Result alias that carries the custom [`SlidecastError`] type.
pub type Result<T> = std::result::Result<T, SlidecastError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum SlidecastError {
    /// Free-form error surfaced with a readable message.
    #[error("{0}")]
    Message(String),
    /// A required input file (narration, speaker clip, music, image) is absent.
    #[error("{what} not found: {}", path.display())]
    MissingInput { what: &'static str, path: PathBuf },
    /// A single visual element failed to draw.
    #[error("render failed: {0}")]
    Render(String),
    /// The media encoder failed or could not be started.
    #[error("export failed: {0}")]
    Export(String),
    /// Caller supplied data the compositor cannot work with.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Script, content or config JSON failed to parse.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl SlidecastError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub fn render<T: Into<String>>(msg: T) -> Self {
        Self::Render(msg.into())
    }

    pub fn missing(what: &'static str, path: impl Into<PathBuf>) -> Self {
        Self::MissingInput {
            what,
            path: path.into(),
        }
    }
}

impl From<&str> for SlidecastError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for SlidecastError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_names_the_file() {
        let err = SlidecastError::missing("narration", "/tmp/voice.mp3");
        assert_eq!(format!("{err}"), "narration not found: /tmp/voice.mp3");
    }
}
