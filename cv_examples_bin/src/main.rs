use std::process::ExitCode;

use cv_examples_lib::{exit, registry, runner};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    let status = runner::run(&args, registry::global());
    ExitCode::from(u8::try_from(status).unwrap_or(exit::FAILURE as u8))
}
