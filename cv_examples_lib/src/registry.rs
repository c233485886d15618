//! Name to example lookup table.
//!
//! The process-wide table is built once, on first use, by
//! [`examples::register_all`](crate::examples::register_all) and is read-only
//! afterwards.

use std::fmt;
use std::sync::OnceLock;

use log::debug;

/// Something that can be run with an argument list and reports an exit status.
pub trait Example: Send + Sync {
    fn run(&self, args: &[String]) -> i32;
}

impl<F> Example for F
where
    F: Fn(&[String]) -> i32 + Send + Sync,
{
    fn run(&self, args: &[String]) -> i32 {
        self(args)
    }
}

pub struct Entry {
    name: String,
    help: String,
    example: Box<dyn Example>,
}

impl Entry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn run(&self, args: &[String]) -> i32 {
        self.example.run(args)
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("name", &self.name)
            .field("help", &self.help)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an example under `name`.
    ///
    /// Returns false and keeps the existing entry when the name is taken.
    pub fn register<E>(
        &mut self,
        name: impl Into<String>,
        help: impl Into<String>,
        example: E,
    ) -> bool
    where
        E: Example + 'static,
    {
        let name = name.into();
        if self.find(&name).is_some() {
            debug!("example '{name}' already registered, keeping the first one");
            return false;
        }
        self.entries.push(Entry {
            name,
            help: help.into(),
            example: Box::new(example),
        });
        true
    }

    /// Entries in registration order.
    pub fn all(&self) -> &[Entry] {
        &self.entries
    }

    pub fn find(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The built-in examples.
pub fn global() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut registry = Registry::new();
        crate::examples::register_all(&mut registry);
        registry
    })
}
