use image::Rgb;
use log::info;

use super::{drive, image_path};
use crate::argparse::ArgParser;
use crate::imaging::{self, DisplayOptions};

pub const DEFAULT_OUTPUT: &str = "output.png";

pub fn parser() -> ArgParser {
    ArgParser::new("show")
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
        let image = imaging::load(&path)?;
        info!(
            "loaded {}x{} ({} channels)",
            image.width(),
            image.height(),
            image.color().channel_count()
        );

        let marked = imaging::frame(&image, Rgb([0, 0, 255]));
        imaging::show_or_save(&marked, &DisplayOptions::titled("Show"), &output)?;
        Ok(())
    })
}
