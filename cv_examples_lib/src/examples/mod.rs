//! Built-in examples and the startup routine that registers them.

use std::error::Error as _;

use log::error;

use crate::argparse::ArgParser;
use crate::registry::Registry;
use crate::{Error, Result, exit};

pub mod edges;
pub mod gradient;
pub mod show;

/// Image used when an example is given no path.
pub const DEFAULT_IMAGE: &str = "assets/lena_img.png";

/// Registers every built-in example. Called once when the global registry is
/// first used.
pub fn register_all(registry: &mut Registry) {
    registry.register(
        "show",
        "Display an image (default: assets/lena_img.png)",
        show::run,
    );
    registry.register(
        "edges",
        "Canny edge detection with --t1/--t2/--blur",
        edges::run,
    );
    registry.register(
        "gradient",
        "Sobel gradient magnitude as a grayscale image",
        gradient::run,
    );
}

/// Parses `args`, prints usage on `--help`, otherwise hands over to `body`.
/// The outcome is translated into an exit status here and nowhere else.
pub(crate) fn drive(
    mut parser: ArgParser,
    args: &[String],
    body: impl FnOnce(&ArgParser) -> Result<()>,
) -> i32 {
    let outcome = parser
        .parse(args)
        .map_err(Error::from)
        .and_then(|()| {
            if parser.help_requested() {
                print!("{}", parser.usage());
                return Ok(());
            }
            body(&parser)
        });

    match outcome {
        Ok(()) => exit::SUCCESS,
        Err(err) => {
            error!("{}", describe(&err));
            if let Error::Usage(_) = err {
                eprint!("{}", parser.usage());
            }
            err.exit_code()
        }
    }
}

fn describe(err: &Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

pub(crate) fn image_path(parser: &ArgParser) -> String {
    parser
        .positionals()
        .first()
        .cloned()
        .unwrap_or_else(|| DEFAULT_IMAGE.to_owned())
}
