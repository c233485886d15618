use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgb};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use log::{debug, warn};

use crate::{Error, Result};

pub fn load(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let path = path.as_ref();
    image::open(path).map_err(|source| Error::Load {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `image`, picking the format from the file extension.
pub fn save(image: &DynamicImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    image.save(path).map_err(|source| Error::Save {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayOptions {
    pub title: String,
    pub max_width: u32,
    pub max_height: u32,
}

impl DisplayOptions {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            title: "Image".to_owned(),
            max_width: 1024,
            max_height: 768,
        }
    }
}

/// X11 or Wayland session present.
pub fn has_gui() -> bool {
    ["DISPLAY", "WAYLAND_DISPLAY"]
        .iter()
        .any(|var| std::env::var_os(var).is_some_and(|value| !value.is_empty()))
}

/// Shrinks `width`x`height` to fit the bounds, keeping the aspect ratio.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }
    let ratio = f64::min(
        f64::from(max_width) / f64::from(width.max(1)),
        f64::from(max_height) / f64::from(height.max(1)),
    );
    let scaled = |side: u32| ((f64::from(side) * ratio) as u32).max(1);
    (scaled(width), scaled(height))
}

/// Shows `image` in a window and blocks until it is closed.
///
/// Returns false without doing anything when there is no GUI session or the
/// crate was built without the `display-window` feature.
pub fn quick_display(image: &DynamicImage, options: &DisplayOptions) -> bool {
    if image.width() == 0 || image.height() == 0 {
        return false;
    }
    if !has_gui() {
        debug!("neither DISPLAY nor WAYLAND_DISPLAY is set");
        return false;
    }
    let (width, height) = fit_within(
        image.width(),
        image.height(),
        options.max_width,
        options.max_height,
    );
    open_window(image, &options.title, width, height)
}

#[cfg(feature = "display-window")]
fn open_window(image: &DynamicImage, title: &str, width: u32, height: u32) -> bool {
    imageproc::window::display_image(title, &image.to_rgba8(), width, height);
    true
}

#[cfg(not(feature = "display-window"))]
fn open_window(_image: &DynamicImage, title: &str, _width: u32, _height: u32) -> bool {
    debug!("cannot open '{title}': built without the display-window feature");
    false
}

/// Displays `image` when possible, otherwise writes it to `fallback`.
///
/// Returns the written path in the second case.
pub fn show_or_save(
    image: &DynamicImage,
    options: &DisplayOptions,
    fallback: impl AsRef<Path>,
) -> Result<Option<PathBuf>> {
    if quick_display(image, options) {
        return Ok(None);
    }
    let fallback = fallback.as_ref();
    save(image, fallback)?;
    warn!("headless environment; wrote {}", fallback.display());
    Ok(Some(fallback.to_path_buf()))
}

/// Sigma the classic vision toolkits derive from a Gaussian kernel size.
pub fn gaussian_sigma(kernel: u32) -> f32 {
    0.3 * ((kernel as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Copy of `image` with a one pixel frame inset by 10 pixels.
///
/// Images too small to hold the frame come back unmarked.
pub fn frame(image: &DynamicImage, color: Rgb<u8>) -> DynamicImage {
    const INSET: u32 = 10;

    let mut canvas = image.to_rgb8();
    let (width, height) = canvas.dimensions();
    if width > 2 * INSET && height > 2 * INSET {
        let rect = Rect::at(INSET as i32, INSET as i32)
            .of_size(width - 2 * INSET, height - 2 * INSET);
        draw_hollow_rect_mut(&mut canvas, rect, color);
    }
    DynamicImage::ImageRgb8(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn fit_keeps_small_images() {
        assert_eq!(fit_within(640, 480, 1024, 768), (640, 480));
        assert_eq!(fit_within(1024, 768, 1024, 768), (1024, 768));
    }

    #[test]
    fn fit_preserves_aspect() {
        assert_eq!(fit_within(2048, 1536, 1024, 768), (1024, 768));
        assert_eq!(fit_within(4096, 1024, 1024, 768), (1024, 256));
        assert_eq!(fit_within(500, 3072, 1024, 768), (125, 768));
    }

    #[test]
    fn fit_never_collapses() {
        assert_eq!(fit_within(131_072, 1, 1024, 768), (1024, 1));
    }

    #[test]
    fn sigma_matches_kernel_size() {
        assert!((gaussian_sigma(3) - 0.8).abs() < 1e-6);
        assert!((gaussian_sigma(5) - 1.1).abs() < 1e-6);
        assert!(gaussian_sigma(1) > 0.0);
    }

    #[test]
    fn frame_draws_inset_border() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(40, 30));
        let marked = frame(&image, Rgb([0, 255, 0])).to_rgb8();
        assert_eq!(marked.get_pixel(10, 10), &Rgb([0, 255, 0]));
        assert_eq!(marked.get_pixel(29, 19), &Rgb([0, 255, 0]));
        assert_eq!(marked.get_pixel(20, 15), &Rgb([0, 0, 0]));
        assert_eq!(marked.get_pixel(5, 5), &Rgb([0, 0, 0]));
    }

    #[test]
    fn frame_skips_tiny_images() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(8, 8));
        assert_eq!(frame(&image, Rgb([255, 0, 0])), image);
    }

    #[test]
    fn load_reports_path() {
        let err = load("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
        assert_eq!(err.exit_code(), crate::exit::FAILURE);
        assert!(err.to_string().contains("/definitely/not/here.png"));
    }
}
