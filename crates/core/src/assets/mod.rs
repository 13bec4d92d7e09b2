use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::{AppConfig, FontConfig};
use crate::render::{RenderingContext, Typeface};
use crate::theme::ThemeRegistry;
use crate::{Result, SlidecastError};

/// Walks the font fallback chain and returns the first face that parses.
/// An exhausted chain yields an empty typeface rather than an error.
pub fn load_typeface(fonts: &FontConfig) -> Typeface {
    for path in &fonts.search_paths {
        if !path.is_file() {
            debug!(path = %path.display(), "font not present");
            continue;
        }
        match Typeface::from_file(path) {
            Ok(face) => {
                info!(path = %path.display(), "loaded font");
                return face;
            }
            Err(err) => warn!(path = %path.display(), %err, "unusable font file"),
        }
    }
    warn!("no font in the search path could be loaded, text will not be drawn");
    Typeface::none()
}

/// The immutable context shared by every renderer for one run.
pub fn rendering_context(config: &AppConfig) -> RenderingContext {
    RenderingContext::new(load_typeface(&config.fonts), ThemeRegistry::new())
}

/// Fails with [`SlidecastError::MissingInput`] unless `path` is a file.
pub fn require_file(what: &'static str, path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(SlidecastError::missing(what, path))
    }
}
