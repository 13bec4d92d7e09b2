use std::path::Path;

use crate::config::{Corner, LogoConfig};
use crate::render::{load_png_scaled, Canvas};
use crate::timeline::Window;

use super::{guarded, OverlayImage};

const PADDING: i32 = 20;

/// The configured logo, scaled to a fraction of the canvas width with its
/// opacity baked in, pinned to a corner for `[0, duration)`.
pub fn logo_overlay(config: &LogoConfig, path: &Path, canvas: (u32, u32), duration: f64) -> Option<OverlayImage> {
    guarded("logo", || {
        let width = ((canvas.0 as f32 * config.scale.clamp(0.01, 1.0)).round() as u32).max(1);
        let logo = load_png_scaled(path, width)?;
        let mut faded = Canvas::new(logo.width(), logo.height())?;
        faded.draw_pixmap(&logo, 0, 0, config.opacity.clamp(0.0, 1.0));

        let (x, y) = corner_origin(config.position, canvas, (faded.width(), faded.height()));
        Ok(OverlayImage::new(faded.into_pixmap(), x, y, Window::new(0.0, duration)))
    })
}

fn corner_origin(corner: Corner, canvas: (u32, u32), size: (u32, u32)) -> (i32, i32) {
    let right = canvas.0 as i32 - size.0 as i32 - PADDING;
    let bottom = canvas.1 as i32 - size.1 as i32 - PADDING;
    match corner {
        Corner::TopLeft => (PADDING, PADDING),
        Corner::TopRight => (right, PADDING),
        Corner::BottomLeft => (PADDING, bottom),
        Corner::BottomRight => (right, bottom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Rgb;

    fn write_logo(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("logo.png");
        Canvas::filled(40, 20, Rgb(0, 0, 255)).unwrap().pixmap().save_png(&path).unwrap();
        path
    }

    fn config(position: Corner) -> LogoConfig {
        LogoConfig {
            enabled: true,
            path: None,
            position,
            scale: 0.1,
            opacity: 0.7,
        }
    }

    #[test]
    fn logo_sits_in_the_configured_corner() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_logo(dir.path());

        let cases = [
            (Corner::TopLeft, (20, 20)),
            (Corner::TopRight, (340, 20)),
            (Corner::BottomLeft, (20, 260)),
            (Corner::BottomRight, (340, 260)),
        ];
        for (corner, origin) in cases {
            let image = logo_overlay(&config(corner), &path, (400, 300), 90.0).unwrap();
            assert_eq!((image.x, image.y), origin, "{corner:?}");
            assert_eq!((image.pixmap.width(), image.pixmap.height()), (40, 20));
            assert_eq!(image.window, Window::new(0.0, 90.0));
        }
    }

    #[test]
    fn opacity_is_baked_into_the_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_logo(dir.path());

        let image = logo_overlay(&config(Corner::TopRight), &path, (400, 300), 10.0).unwrap();
        let px = image.pixmap.pixel(20, 10).unwrap();
        let expected = (0.7 * 255.0_f32).round() as i32;
        assert!((i32::from(px.alpha()) - expected).abs() <= 2, "alpha {}", px.alpha());
        assert_eq!(px.red(), 0);
    }

    #[test]
    fn unreadable_logo_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, b"not a png").unwrap();
        assert!(logo_overlay(&config(Corner::TopLeft), &path, (400, 300), 10.0).is_none());
    }
}
