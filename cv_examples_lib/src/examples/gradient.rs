//! `gradient`: Sobel gradient magnitude, stretched to the full 0..255 range.

use image::{DynamicImage, GrayImage, Luma};
use log::{debug, info};
use ndarray::{Array2, Zip};
use num_traits::real::Real;

use super::{drive, image_path};
use crate::Result;
use crate::argparse::ArgParser;
use crate::imaging::{self, DisplayOptions};

pub const DEFAULT_OUTPUT: &str = "output_gradient.png";

pub fn parser() -> ArgParser {
    ArgParser::new("gradient")
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
        let output = parser.get_string("output", DEFAULT_OUTPUT);

        info!("loading {path}");
        let source = imaging::load(&path)?;
        let magnitude = gradient_image(&source)?;
        imaging::show_or_save(
            &DynamicImage::ImageLuma8(magnitude),
            &DisplayOptions::titled("Gradient"),
            &output,
        )?;
        Ok(())
    })
}

pub fn gradient_image(source: &DynamicImage) -> Result<GrayImage> {
    let gray = source.to_luma8();
    let grid = Array2::from_shape_vec(
        (gray.height() as usize, gray.width() as usize),
        gray.into_raw(),
    )?;
    let magnitude: Array2<f32> = sobel_magnitude(&grid);
    Ok(stretch(&magnitude))
}

/// 3x3 Sobel magnitude; borders wrap around to the opposite edge.
pub fn sobel_magnitude<T, U>(grid: &Array2<T>) -> Array2<U>
where
    T: Copy + Into<U>,
    U: Real,
{
    let h = grid.nrows();
    let w = grid.ncols();
    let mut buffer = Array2::zeros((h, w));
    if w == 0 || h == 0 {
        return buffer;
    }
    let two = U::one() + U::one();

    Zip::indexed(&mut buffer).for_each(|(j, i), out| {
        let i1 = if i == 0 { w - 1 } else { i - 1 };
        let i3 = if i == w - 1 { 0 } else { i + 1 };
        let j1 = if j == 0 { h - 1 } else { j - 1 };
        let j3 = if j == h - 1 { 0 } else { j + 1 };
        let at = |row: usize, col: usize| -> U { grid[[row, col]].into() };

        let s_x = at(j1, i1) - at(j1, i3) + two * at(j, i1) - two * at(j, i3) + at(j3, i1)
            - at(j3, i3);
        let s_y = at(j1, i1) + two * at(j1, i) + at(j1, i3)
            - at(j3, i1)
            - two * at(j3, i)
            - at(j3, i3);

        *out = (s_x * s_x + s_y * s_y).sqrt();
    });
    buffer
}

fn stretch(magnitude: &Array2<f32>) -> GrayImage {
    let peak = magnitude.iter().copied().fold(0.0_f32, f32::max);
    debug!("peak gradient magnitude {peak}");
    let scale = if peak > 0.0 { 255.0 / peak } else { 0.0 };
    GrayImage::from_fn(
        magnitude.ncols() as u32,
        magnitude.nrows() as u32,
        |x, y| Luma([(magnitude[[y as usize, x as usize]] * scale).round() as u8]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn flat_grid_has_no_gradient() {
        let grid = Array2::<u8>::from_elem((5, 6), 42);
        let magnitude: Array2<f32> = sobel_magnitude(&grid);
        assert!(magnitude.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn vertical_step() {
        let grid = array![
            [0u8, 0, 10, 10],
            [0, 0, 10, 10],
            [0, 0, 10, 10],
        ];
        let magnitude: Array2<f64> = sobel_magnitude(&grid);
        // Column 1 sees 0 on its left and 10 on its right: |s_x| = 4 * 10.
        assert_eq!(magnitude[[1, 1]], 40.0);
        assert_eq!(magnitude[[1, 2]], 40.0);
        // Wrapping makes the outer columns see the step as well.
        assert_eq!(magnitude[[1, 0]], 40.0);
        assert_eq!(magnitude[[1, 3]], 40.0);
    }

    #[test]
    fn stretched_to_full_range() {
        let source = DynamicImage::ImageLuma8(GrayImage::from_fn(8, 4, |x, _| {
            Luma([if x < 4 { 0 } else { 200 }])
        }));
        let out = gradient_image(&source).unwrap();
        assert_eq!(out.dimensions(), (8, 4));
        assert_eq!(out.pixels().map(|p| p[0]).max(), Some(255));
        assert_eq!(out.get_pixel(1, 2)[0], 0);
    }

    #[test]
    fn empty_image() {
        let out = gradient_image(&DynamicImage::ImageLuma8(GrayImage::new(0, 0))).unwrap();
        assert_eq!(out.dimensions(), (0, 0));
    }
}
