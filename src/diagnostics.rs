//! Diagnostic sinks for warnings and progress produced during a run.
//!
//! A sink is passed explicitly to [`Suite::run`][crate::Suite::run] and from
//! there to the [`Runner`][crate::Runner]; nothing in this crate writes
//! warnings to global state on its own.

use std::fmt;

/// The severity of a diagnostic message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Progress and configuration details.
    Info,
    /// Limit overages, fallback decisions, candidate stderr output.
    Warn,
    /// Divergences and other failures.
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        })
    }
}

/// A destination for the diagnostics of one run.
pub trait Diagnostics {
    /// Record a diagnostic message at the given level.
    fn emit(&mut self, level: Level, message: &str);

    /// Record an informational message.
    fn info(&mut self, message: &str) {
        self.emit(Level::Info, message);
    }

    /// Record a warning.
    fn warn(&mut self, message: &str) {
        self.emit(Level::Warn, message);
    }

    /// Record an error.
    fn error(&mut self, message: &str) {
        self.emit(Level::Error, message);
    }
}

impl<D> Diagnostics for &mut D
where
    D: Diagnostics + ?Sized,
{
    fn emit(&mut self, level: Level, message: &str) {
        (**self).emit(level, message);
    }
}

/// A sink that forwards every message to the [`log`](https://docs.rs/log)
/// crate under the `diffstress` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogDiagnostics {
    _private: (),
}

impl LogDiagnostics {
    /// Create a new `log`-backed sink.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Diagnostics for LogDiagnostics {
    fn emit(&mut self, level: Level, message: &str) {
        match level {
            Level::Info => log::info!(target: crate::LOG_TARGET, "{message}"),
            Level::Warn => log::warn!(target: crate::LOG_TARGET, "{message}"),
            Level::Error => log::error!(target: crate::LOG_TARGET, "{message}"),
        }
    }
}

/// A sink that keeps every message in memory.
///
/// # Example
///
/// ```
/// use diffstress::{Diagnostics, Level, Recorder};
///
/// let mut recorder = Recorder::new();
/// recorder.warn("timeout exceeded");
/// recorder.info("seed: 42");
///
/// assert_eq!(recorder.warnings().count(), 1);
/// assert!(recorder.contains(Level::Info, "seed"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    entries: Vec<(Level, String)>,
}

impl Recorder {
    /// Create a new, empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded `(level, message)` pair, in emission order.
    pub fn entries(&self) -> &[(Level, String)] {
        &self.entries
    }

    /// The messages recorded at [`Level::Warn`].
    pub fn warnings(&self) -> impl Iterator<Item = &str> + '_ {
        self.at(Level::Warn)
    }

    /// The messages recorded at the given level.
    pub fn at(&self, level: Level) -> impl Iterator<Item = &str> + '_ {
        self.entries
            .iter()
            .filter(move |(l, _)| *l == level)
            .map(|(_, m)| m.as_str())
    }

    /// Whether any message at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.at(level).any(|m| m.contains(needle))
    }
}

impl Diagnostics for Recorder {
    fn emit(&mut self, level: Level, message: &str) {
        log::debug!(target: crate::LOG_TARGET, "recorded {level}: {message}");
        self.entries.push((level, message.to_string()));
    }
}
