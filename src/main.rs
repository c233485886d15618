use bpaf::Bpaf;
use cv_examples_lib::imaging::{self, DisplayOptions};
use cv_examples_lib::{exit, logging};
use image::Rgb;
use log::{LevelFilter, debug, error, info};
use std::{path::PathBuf, process::ExitCode};

#[derive(Debug, Clone, Bpaf)]
#[bpaf(options)]
pub struct CliOptions {
    /// Where the annotated image goes when no display is available.
    #[bpaf(short, long, argument("PATH"), fallback(PathBuf::from("output.png")))]
    output: PathBuf,
    /// Path for the image that will be loaded.
    #[bpaf(positional("IMAGE"))]
    image_path: PathBuf,
}

/// Parses the command line. `--help` and `--version` come back as
/// `Err(exit::SUCCESS)`, anything bpaf rejects as `Err(exit::USAGE)`.
fn parse_cli<'a>(args: impl Into<bpaf::Args<'a>>) -> Result<CliOptions, i32> {
    cli_options().run_inner(args).map_err(|failure| {
        failure.print_message(100);
        if failure.exit_code() == 0 {
            exit::SUCCESS
        } else {
            exit::USAGE
        }
    })
}

fn main() -> ExitCode {
    logging::init(LevelFilter::Debug, None);
    let options = match parse_cli(bpaf::Args::current_args()) {
        Ok(options) => options,
        Err(status) => return ExitCode::from(status as u8),
    };

    info!("start");
    debug!("loading image: {}", options.image_path.display());
    let img = match imaging::load(&options.image_path) {
        Ok(img) => img,
        Err(err) => {
            error!("{err}");
            return ExitCode::from(exit::FAILURE as u8);
        }
    };
    info!(
        "loaded {}x{} ({} channels)",
        img.width(),
        img.height(),
        img.color().channel_count()
    );

    // Green frame to prove the pixels went through us.
    let img = imaging::frame(&img, Rgb([0, 255, 0]));

    if let Err(err) = imaging::show_or_save(&img, &DisplayOptions::default(), &options.output) {
        error!("{err}");
        return ExitCode::from(exit::FAILURE as u8);
    }

    info!("done");
    ExitCode::SUCCESS
}
