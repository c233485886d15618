//! Console logger setup.
//!
//! Everything logs through the `log` macros; this installs `env_logger` as
//! the backend with millisecond timestamps and the emitting module as the
//! logger name. `RUST_LOG` is honoured unless a level is forced.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Installs the global logger.
///
/// `default_level` applies when `RUST_LOG` is unset; `forced` overrides the
/// global level either way. Later calls are no-ops.
pub fn init(default_level: LevelFilter, forced: Option<LevelFilter>) {
    let env = Env::default().default_filter_or(default_level.as_str());
    let mut builder = Builder::from_env(env);
    builder.format_timestamp_millis().format_target(true);
    if let Some(level) = forced {
        builder.filter_level(level);
    }
    if let Err(err) = builder.try_init() {
        log::debug!("logger already installed: {err}");
    }
}

/// Case-insensitive `off`, `error`, `warn`, `info`, `debug` or `trace`.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    name.trim().parse().ok()
}
