//! Small image-processing example harness.
//!
//! Examples are registered by name in a [`Registry`], parse their own
//! arguments with [`ArgParser`] and lean on `image`/`imageproc` for the
//! actual pixel work. The [`runner`] ties these together into the
//! `cv_examples` command.

use std::path::PathBuf;

pub mod argparse;
pub mod examples;
pub mod imaging;
pub mod logging;
pub mod registry;
pub mod runner;

pub use argparse::{ArgParser, ParseError};
pub use registry::{Entry, Example, Registry};

/// Process exit statuses shared by the runner and the examples.
pub mod exit {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const USAGE: i32 = 2;
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load image: {}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write {}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("pixel grid shape mismatch: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error(transparent)]
    Usage(#[from] ParseError),
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Usage(_) => exit::USAGE,
            _ => exit::FAILURE,
        }
    }
}
