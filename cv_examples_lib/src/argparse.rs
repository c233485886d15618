//! Declarative command-line parser shared by the runner and every example.
//!
//! Options are declared up front with the builder methods, then
//! [`ArgParser::parse`] scans a token list (program name excluded) and the
//! values are read back through the accessors. Supported syntax:
//!
//! * `--name`, `--name value`, `--name=value`
//! * `-n`, `-n value` (one character, no bundling)
//! * `-h` / `--help`
//! * `--` ends option scanning; everything after it is positional
//!
//! A parser built with [`options_first`](ArgParser::options_first) stops at
//! the first positional (or at `--` / an extra terminator) and keeps the
//! remaining tokens untouched in [`trailing`](ArgParser::trailing), the way
//! a command dispatcher hands them to a subcommand.
//!
//! Each call to `parse` starts from a clean slate, so one parser can be
//! reused for several token lists.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::str::FromStr;

use log::warn;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("missing value for option: {0}")]
    MissingValue(String),

    #[error("missing required option --{0}")]
    MissingRequired(String),

    #[error("short option bundling not supported: {0}")]
    BundlingUnsupported(String),

    #[error("option does not take a value: --{0}")]
    UnexpectedValue(String),

    #[error("invalid value for option --{option}: '{value}'")]
    InvalidValue { option: String, value: String },
}

#[derive(Debug, Clone)]
struct OptionSpec {
    long: String,
    short: Option<char>,
    takes_value: bool,
    default: String,
    required: bool,
    help: String,
    set: bool,
    value: String,
}

#[derive(Debug, Clone)]
struct PositionalSpec {
    name: String,
    help: String,
    required: bool,
}

#[derive(Debug, Clone)]
pub struct ArgParser {
    program: String,
    options: Vec<OptionSpec>,
    positional_specs: Vec<PositionalSpec>,
    terminators: Vec<String>,
    options_first: bool,
    long_index: HashMap<String, usize>,
    short_index: HashMap<char, usize>,
    positionals: Vec<String>,
    trailing: Vec<String>,
    help: bool,
    error: Option<String>,
}

impl ArgParser {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            options: Vec::new(),
            positional_specs: Vec::new(),
            terminators: Vec::new(),
            options_first: false,
            long_index: HashMap::new(),
            short_index: HashMap::new(),
            positionals: Vec::new(),
            trailing: Vec::new(),
            help: false,
            error: None,
        }
    }

    /// Boolean switch such as `--verbose` / `-v`.
    pub fn add_flag(
        self,
        long: impl Into<String>,
        short: Option<char>,
        help: impl Into<String>,
    ) -> Self {
        self.push_option(OptionSpec {
            long: long.into(),
            short,
            takes_value: false,
            default: String::new(),
            required: false,
            help: help.into(),
            set: false,
            value: String::new(),
        })
    }

    /// Option carrying a value. An empty `default` means "no default"; a
    /// required option with a non-empty default is satisfied by the default.
    pub fn add_option(
        self,
        long: impl Into<String>,
        short: Option<char>,
        help: impl Into<String>,
        default: impl Into<String>,
        required: bool,
    ) -> Self {
        self.push_option(OptionSpec {
            long: long.into(),
            short,
            takes_value: true,
            default: default.into(),
            required,
            help: help.into(),
            set: false,
            value: String::new(),
        })
    }

    /// Positionals are only described in [`usage`](Self::usage); their count
    /// is never checked.
    pub fn add_positional(
        mut self,
        name: impl Into<String>,
        help: impl Into<String>,
        required: bool,
    ) -> Self {
        self.positional_specs.push(PositionalSpec {
            name: name.into(),
            help: help.into(),
            required,
        });
        self
    }

    /// Stop scanning at the first positional; it is kept as a positional and
    /// every token after it goes to [`trailing`](Self::trailing) verbatim.
    /// `--` and the extra terminators also stop scanning, with nothing
    /// consumed as a positional.
    pub fn options_first(mut self) -> Self {
        self.options_first = true;
        self
    }

    /// Extra token that ends option scanning exactly like `--`.
    pub fn add_terminator(mut self, token: impl Into<String>) -> Self {
        self.terminators.push(token.into());
        self
    }

    fn push_option(mut self, spec: OptionSpec) -> Self {
        debug_assert!(
            !self.long_index.contains_key(&spec.long),
            "option --{} declared twice",
            spec.long
        );
        let index = self.options.len();
        self.long_index.insert(spec.long.clone(), index);
        if let Some(short) = spec.short {
            debug_assert!(
                !self.short_index.contains_key(&short),
                "option -{short} declared twice"
            );
            self.short_index.insert(short, index);
        }
        self.options.push(spec);
        self
    }

    /// Parses `args` (without the program name).
    ///
    /// On failure the message is also kept and available from
    /// [`error`](Self::error); option state after a failed parse is
    /// unspecified.
    pub fn parse<I, S>(&mut self, args: I) -> Result<(), ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.reset();
        let result = self.scan(args.into_iter().map(|arg| arg.as_ref().to_owned()));
        if let Err(err) = &result {
            self.error = Some(err.to_string());
        }
        result
    }

    fn reset(&mut self) {
        self.positionals.clear();
        self.trailing.clear();
        self.help = false;
        self.error = None;
        for option in &mut self.options {
            option.set = false;
            option.value.clear();
        }
    }

    fn scan(&mut self, mut tokens: impl Iterator<Item = String>) -> Result<(), ParseError> {
        while let Some(token) = tokens.next() {
            if token == "--" || self.terminators.contains(&token) {
                if self.options_first {
                    self.trailing.extend(tokens.by_ref());
                } else {
                    self.positionals.extend(tokens.by_ref());
                }
                break;
            }
            if token == "-h" || token == "--help" {
                self.help = true;
                continue;
            }

            if let Some(body) = token.strip_prefix("--") {
                let (name, inline) = match body.split_once('=') {
                    Some((name, value)) => (name, Some(value)),
                    None => (body, None),
                };
                let index = *self
                    .long_index
                    .get(name)
                    .ok_or_else(|| ParseError::UnknownOption(format!("--{name}")))?;
                let option = &mut self.options[index];
                if !option.takes_value {
                    if inline.is_some() {
                        return Err(ParseError::UnexpectedValue(name.to_owned()));
                    }
                    option.set = true;
                    continue;
                }
                option.value = match inline {
                    Some(value) => value.to_owned(),
                    None => tokens
                        .next()
                        .ok_or_else(|| ParseError::MissingValue(format!("--{name}")))?,
                };
                option.set = true;
            } else if let Some(body) = token.strip_prefix('-').filter(|body| !body.is_empty()) {
                let mut chars = body.chars();
                let (Some(short), None) = (chars.next(), chars.next()) else {
                    return Err(ParseError::BundlingUnsupported(token.clone()));
                };
                let index = *self
                    .short_index
                    .get(&short)
                    .ok_or_else(|| ParseError::UnknownOption(format!("-{short}")))?;
                let option = &mut self.options[index];
                if option.takes_value {
                    option.value = tokens
                        .next()
                        .ok_or_else(|| ParseError::MissingValue(format!("-{short}")))?;
                }
                option.set = true;
            } else {
                self.positionals.push(token);
                if self.options_first {
                    self.trailing.extend(tokens.by_ref());
                    break;
                }
            }
        }

        match self
            .options
            .iter()
            .find(|option| option.required && !option.set && option.default.is_empty())
        {
            Some(missing) => Err(ParseError::MissingRequired(missing.long.clone())),
            None => Ok(()),
        }
    }

    pub fn help_requested(&self) -> bool {
        self.help
    }

    /// Message of the last failed [`parse`](Self::parse), if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// True when the option was present on the command line.
    pub fn get_flag(&self, name: &str) -> bool {
        self.find(name).is_some_and(|option| option.set)
    }

    /// Parsed value, then the declared default, then `default`. Flags read as
    /// `"true"` when set.
    pub fn get_string(&self, name: &str, default: &str) -> String {
        self.effective(name).unwrap_or(default).to_owned()
    }

    pub fn get_int(&self, name: &str, default: i64) -> i64 {
        self.lenient(name, default)
    }

    pub fn get_double(&self, name: &str, default: f64) -> f64 {
        self.lenient(name, default)
    }

    /// Strict typed access: `Ok(None)` when neither given nor defaulted, an
    /// error when the text does not parse as `T`.
    pub fn value<T: FromStr>(&self, name: &str) -> Result<Option<T>, ParseError> {
        self.effective(name)
            .map(|raw| {
                raw.trim().parse().map_err(|_| ParseError::InvalidValue {
                    option: name.to_owned(),
                    value: raw.to_owned(),
                })
            })
            .transpose()
    }

    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    /// Tokens left unscanned by an [`options_first`](Self::options_first)
    /// parser.
    pub fn trailing(&self) -> &[String] {
        &self.trailing
    }

    pub fn usage(&self) -> String {
        let mut out = format!("Usage: {} [options]", self.program);
        for spec in &self.positional_specs {
            if spec.required {
                let _ = write!(out, " <{}>", spec.name);
            } else {
                let _ = write!(out, " [{}]", spec.name);
            }
        }
        out.push_str("\n\nOptions:\n");
        out.push_str("  -h, --help                 Show this help\n");
        for option in &self.options {
            out.push_str("  ");
            match option.short {
                Some(short) => {
                    let _ = write!(out, "-{short}, ");
                }
                None => out.push_str("    "),
            }
            let _ = write!(out, "--{}", option.long);
            if option.takes_value {
                out.push_str(" <value>");
            }
            let _ = write!(out, "\n      {}", option.help);
            if !option.default.is_empty() {
                let _ = write!(out, " (default: {})", option.default);
            }
            if option.required {
                out.push_str(" [required]");
            }
            out.push('\n');
        }
        if !self.positional_specs.is_empty() {
            out.push_str("\nPositionals:\n");
            for spec in &self.positional_specs {
                let required = if spec.required { " [required]" } else { "" };
                let _ = writeln!(out, "  {}\n      {}{}", spec.name, spec.help, required);
            }
        }
        out
    }

    fn find(&self, name: &str) -> Option<&OptionSpec> {
        self.long_index.get(name).map(|&index| &self.options[index])
    }

    fn effective(&self, name: &str) -> Option<&str> {
        let option = self.find(name)?;
        if !option.takes_value {
            return option.set.then_some("true");
        }
        if option.set {
            Some(&option.value)
        } else if option.default.is_empty() {
            None
        } else {
            Some(&option.default)
        }
    }

    fn lenient<T>(&self, name: &str, default: T) -> T
    where
        T: FromStr + std::fmt::Display + Copy,
    {
        let Some(raw) = self.effective(name) else {
            return default;
        };
        raw.trim().parse().unwrap_or_else(|_| {
            warn!("--{name}: '{raw}' is not a number, using {default}");
            default
        })
    }
}
