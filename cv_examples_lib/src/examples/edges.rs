//! `edges`: Gaussian blur, grayscale, Canny, then the edges painted red over
//! the original image.

use image::{DynamicImage, Rgb, RgbImage, imageops};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use log::{debug, info};

use super::{drive, image_path};
use crate::argparse::{ArgParser, ParseError};
use crate::imaging::{self, DisplayOptions};

pub const DEFAULT_OUTPUT: &str = "output_edges.png";

/// Largest accepted `--blur` size.
pub const MAX_KERNEL: u32 = 255;

const EDGE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

pub fn parser() -> ArgParser {
    ArgParser::new("edges")
        .add_option("t1", None, "Lower hysteresis threshold", "100", false)
        .add_option("t2", None, "Upper hysteresis threshold", "200", false)
        .add_option(
            "blur",
            None,
            "Gaussian kernel size up to 255, 0 disables smoothing (even sizes are made odd)",
            "3",
            false,
        )
        .add_option(
            "output",
            Some('o'),
            "File written when no display is available",
            DEFAULT_OUTPUT,
            false,
        )
        .add_positional("image", "Image to load", false)
}

pub fn run(args: &[String]) -> i32 {
    drive(parser(), args, |parser| {
        let path = image_path(parser);
        let t1 = parser.value::<i64>("t1")?.unwrap_or(100).max(0);
        let t2 = parser.value::<i64>("t2")?.unwrap_or(200).max(0);
        let blur = odd_kernel(parser.value::<i64>("blur")?.unwrap_or(3))?;
        let output = parser.get_string("output", DEFAULT_OUTPUT);

        info!("loading {path} (t1={t1}, t2={t2}, blur={blur})");
        let source = imaging::load(&path)?;

        let overlay = detect(&source, t1 as f32, t2 as f32, blur);
        imaging::show_or_save(
            &DynamicImage::ImageRgb8(overlay),
            &DisplayOptions::titled("Edges"),
            &output,
        )?;
        Ok(())
    })
}

/// Negative sizes disable smoothing, even sizes grow to the next odd one.
/// Sizes above [`MAX_KERNEL`] are rejected.
pub fn odd_kernel(size: i64) -> Result<u32, ParseError> {
    if size > i64::from(MAX_KERNEL) {
        return Err(ParseError::InvalidValue {
            option: "blur".to_string(),
            value: size.to_string(),
        });
    }
    let size = size.max(0) as u32;
    Ok(if size > 0 && size % 2 == 0 { size + 1 } else { size })
}

/// Runs the pipeline and returns the original with every edge pixel red.
pub fn detect(source: &DynamicImage, t1: f32, t2: f32, kernel: u32) -> RgbImage {
    let (low, high) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
    if t1 > t2 {
        debug!("swapped thresholds to {low}/{high}");
    }

    let mut overlay = source.to_rgb8();
    let gray = if kernel > 0 {
        imageops::grayscale(&gaussian_blur_f32(&overlay, imaging::gaussian_sigma(kernel)))
    } else {
        imageops::grayscale(&overlay)
    };
    let edges = canny(&gray, low, high);

    let mut count = 0usize;
    for (x, y, pixel) in edges.enumerate_pixels() {
        if pixel[0] > 0 {
            overlay.put_pixel(x, y, EDGE_COLOR);
            count += 1;
        }
    }
    debug!("{count} edge pixels");
    overlay
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Dark left half, bright right half, one intermediate column at x = 15.
    fn ramp() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(32, 32, |x, _| match x {
            0..=14 => Rgb([0, 0, 0]),
            15 => Rgb([100, 100, 100]),
            _ => Rgb([255, 255, 255]),
        }))
    }

    #[test]
    fn kernel_sizes_become_odd() {
        assert_eq!(odd_kernel(-4), Ok(0));
        assert_eq!(odd_kernel(0), Ok(0));
        assert_eq!(odd_kernel(3), Ok(3));
        assert_eq!(odd_kernel(4), Ok(5));
        assert_eq!(odd_kernel(254), Ok(255));
        assert_eq!(odd_kernel(255), Ok(255));
    }

    #[test]
    fn oversized_kernel_is_rejected() {
        assert_eq!(
            odd_kernel(256),
            Err(ParseError::InvalidValue {
                option: "blur".to_string(),
                value: "256".to_string(),
            })
        );
        assert!(odd_kernel(2_000_000_000).is_err());
        assert!(odd_kernel(i64::MAX).is_err());
    }

    #[test]
    fn marks_the_step() {
        let overlay = detect(&ramp(), 100.0, 200.0, 3);
        assert_eq!(overlay.dimensions(), (32, 32));

        let red_columns: Vec<u32> = overlay
            .enumerate_pixels()
            .filter(|(_, _, pixel)| **pixel == EDGE_COLOR)
            .map(|(x, _, _)| x)
            .collect();
        assert!(!red_columns.is_empty());
        assert!(red_columns.iter().all(|x| (12..=19).contains(x)));
    }

    #[test]
    fn flat_image_has_no_edges() {
        let flat = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([90, 90, 90])));
        let overlay = detect(&flat, 100.0, 200.0, 0);
        assert_eq!(overlay, flat.to_rgb8());
    }

    #[test]
    fn swapped_thresholds_still_detect() {
        let straight = detect(&ramp(), 100.0, 200.0, 0);
        let swapped = detect(&ramp(), 200.0, 100.0, 0);
        assert_eq!(straight, swapped);
    }
}
