//! The `cv_examples` command: list, select and run registered examples.
//!
//! ```text
//! cv_examples --list
//! cv_examples edges photo.png --t1 50
//! cv_examples --example edges --args --t1 50 --t2 150 photo.png
//! cv_examples -- -o out.png photo.png        # every example
//! ```
//!
//! Runner options must come before the example name. The name ends option
//! scanning, so everything after it reaches the example verbatim.

use log::{LevelFilter, error, info};

use crate::argparse::ArgParser;
use crate::registry::Registry;
use crate::{exit, logging};

pub fn parser() -> ArgParser {
    ArgParser::new("cv_examples")
        .options_first()
        .add_terminator("--args")
        .add_flag("list", Some('l'), "List the available examples")
        .add_option(
            "example",
            Some('e'),
            "Example to run; every example runs when omitted or 'all'",
            "",
            false,
        )
        .add_option(
            "log-level",
            None,
            "off, error, warn, info, debug or trace (RUST_LOG when not given)",
            "",
            false,
        )
        .add_flag("verbose", Some('v'), "Same as --log-level debug")
        .add_positional("example", "Example to run when --example is not given", false)
        .add_positional(
            "args",
            "Forwarded verbatim: whatever follows the example name, --args or --",
            false,
        )
}

/// Runs the command line `args` (program name excluded) against `registry`
/// and returns the process exit status.
pub fn run(args: &[String], registry: &Registry) -> i32 {
    let mut parser = parser();

    if let Err(err) = parser.parse(args) {
        logging::init(LevelFilter::Info, None);
        error!("{err}");
        eprint!("{}", parser.usage());
        return exit::USAGE;
    }

    let forced = if parser.get_flag("verbose") {
        Some(LevelFilter::Debug)
    } else if parser.get_flag("log-level") {
        let name = parser.get_string("log-level", "");
        let Some(level) = logging::parse_level(&name) else {
            logging::init(LevelFilter::Info, None);
            error!("invalid log level '{name}'");
            eprint!("{}", parser.usage());
            return exit::USAGE;
        };
        Some(level)
    } else {
        None
    };
    logging::init(LevelFilter::Info, forced);

    if parser.help_requested() {
        print!("{}", parser.usage());
        println!();
        print!("{}", listing(registry));
        return exit::SUCCESS;
    }
    if parser.get_flag("list") {
        print!("{}", listing(registry));
        return exit::SUCCESS;
    }

    // With --example given, a positional is the first forwarded argument.
    let mut positionals = parser.positionals().iter();
    let mut name = parser.get_string("example", "");
    if name.is_empty() {
        name = positionals.next().cloned().unwrap_or_default();
    }
    let forwarded: Vec<String> = positionals.chain(parser.trailing()).cloned().collect();

    if name.is_empty() || name == "all" {
        return run_all(registry, &forwarded);
    }

    match registry.find(&name) {
        Some(entry) => {
            info!("running example: {}", entry.name());
            entry.run(&forwarded)
        }
        None => {
            error!("unknown example: '{name}' (use --list)");
            exit::USAGE
        }
    }
}

fn run_all(registry: &Registry, args: &[String]) -> i32 {
    if registry.is_empty() {
        error!("no examples registered");
        return exit::FAILURE;
    }
    let mut status = exit::SUCCESS;
    for entry in registry.all() {
        info!("running example: {}", entry.name());
        status = entry.run(args);
        if status != exit::SUCCESS {
            error!("example '{}' failed with {status}", entry.name());
        }
    }
    status
}

pub fn listing(registry: &Registry) -> String {
    let mut out = format!("available examples ({}):\n", registry.len());
    for entry in registry.all() {
        out.push_str(&format!("- {}: {}\n", entry.name(), entry.help()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn name_ends_runner_options() {
        let mut parser = parser();
        parser
            .parse(strings(&["-v", "edges", "photo.png", "--t1", "50"]))
            .unwrap();
        assert!(parser.get_flag("verbose"));
        assert_eq!(parser.positionals(), ["edges"]);
        assert_eq!(parser.trailing(), ["photo.png", "--t1", "50"]);
    }

    #[test]
    fn args_marker_ends_runner_options() {
        let mut parser = parser();
        parser
            .parse(strings(&["--example", "edges", "--args", "--t1", "5", "--", "x"]))
            .unwrap();
        assert_eq!(parser.get_string("example", ""), "edges");
        assert!(parser.positionals().is_empty());
        assert_eq!(parser.trailing(), ["--t1", "5", "--", "x"]);
    }

    #[test]
    fn unknown_runner_option_before_name() {
        let registry = Registry::new();
        assert_eq!(run(&strings(&["--t1", "50", "edges"]), &registry), exit::USAGE);
    }

    #[test]
    fn listing_follows_registration_order() {
        let mut registry = Registry::new();
        registry.register("b", "second letter", |_: &[String]| 0);
        registry.register("a", "first letter", |_: &[String]| 0);
        assert_eq!(
            listing(&registry),
            "available examples (2):\n- b: second letter\n- a: first letter\n"
        );
    }
}
