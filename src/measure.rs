//! Elapsed time and peak memory, as reported by an external time wrapper.
//!
//! Candidates are run under a GNU `time`-compatible program with a format
//! string that makes it append two lines to its standard error:
//!
//! ```text
//! time: 0:01.27
//! mem: 3456
//! ```
//!
//! The first is elapsed wall-clock time as `[H:]MM:SS.ss`, the second the
//! peak resident set size in kilobytes.

use crate::{Error, Result};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The format string handed to the time wrapper.
pub const FORMAT: &str = "time: %E\nmem: %M";

const TIME_PREFIX: &str = "time: ";
const MEM_PREFIX: &str = "mem: ";

/// Elapsed time and peak memory of one candidate run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Measurement {
    /// Elapsed wall-clock time.
    pub elapsed: Duration,
    /// Peak resident set size, in kilobytes.
    pub peak_memory_kb: u64,
}

impl Measurement {
    /// Elapsed wall-clock time in seconds.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.3}s, {} KB",
            self.elapsed_seconds(),
            self.peak_memory_kb
        )
    }
}

/// A time-measuring program that candidates are run under.
///
/// # Example
///
/// ```
/// use diffstress::TimeWrapper;
///
/// assert!(TimeWrapper::for_os("linux").is_ok());
/// assert!(TimeWrapper::for_os("haiku").unwrap_err().is_unsupported_platform());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeWrapper {
    program: PathBuf,
}

impl TimeWrapper {
    /// Use the given program as the wrapper. It is invoked as
    /// `program -f FORMAT candidate`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The wrapper for the current platform.
    pub fn for_platform() -> Result<Self> {
        Self::for_os(std::env::consts::OS)
    }

    /// The wrapper for the named operating system: GNU time on Linux, and
    /// Homebrew's `gtime` on macOS.
    pub fn for_os(os: &str) -> Result<Self> {
        match os {
            "linux" => Ok(Self::new("/usr/bin/time")),
            "macos" => Ok(Self::new("gtime")),
            other => Err(Error::unsupported_platform(other)),
        }
    }

    /// The wrapper program.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The arguments that precede the candidate on the wrapper's command
    /// line.
    pub fn args(&self) -> [OsString; 2] {
        ["-f".into(), FORMAT.into()]
    }
}

/// What the time wrapper's standard error contained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    /// The recovered measurement.
    pub measurement: Measurement,
    /// Everything else on standard error: the candidate's own diagnostics.
    pub remainder: String,
}

/// Split the wrapper's `time:` and `mem:` lines from a candidate's standard
/// error.
///
/// When a line appears more than once, the last one wins, since the wrapper
/// writes after the candidate exits. GNU time's `Command exited with
/// non-zero status` and `Command terminated by signal` notes are dropped
/// from the remainder.
///
/// # Example
///
/// ```
/// use diffstress::measure::parse_report;
/// use std::time::Duration;
///
/// let report = parse_report("warning: x\ntime: 0:01.50\nmem: 2048\n")?;
/// assert_eq!(report.measurement.elapsed, Duration::from_millis(1500));
/// assert_eq!(report.measurement.peak_memory_kb, 2048);
/// assert_eq!(report.remainder, "warning: x");
///
/// assert!(parse_report("no numbers here").unwrap_err().is_measurement_parse());
/// # Ok::<(), diffstress::Error>(())
/// ```
pub fn parse_report(stderr: &str) -> Result<Report> {
    let mut elapsed = None;
    let mut memory = None;
    let mut remainder = Vec::new();

    for line in stderr.lines() {
        if let Some(value) = line.strip_prefix(TIME_PREFIX) {
            if let Some(value) = parse_elapsed(value.trim()) {
                elapsed = Some(value);
                continue;
            }
        } else if let Some(value) = line.strip_prefix(MEM_PREFIX) {
            if let Ok(value) = value.trim().parse::<u64>() {
                memory = Some(value);
                continue;
            }
        } else if line.starts_with("Command exited with non-zero status")
            || line.starts_with("Command terminated by signal")
        {
            continue;
        }
        remainder.push(line);
    }

    match (elapsed, memory) {
        (Some(elapsed), Some(peak_memory_kb)) => Ok(Report {
            measurement: Measurement {
                elapsed,
                peak_memory_kb,
            },
            remainder: remainder.join("\n"),
        }),
        _ => Err(Error::measurement_parse(stderr)),
    }
}

/// Parse `[H:]MM:SS.ss`.
fn parse_elapsed(text: &str) -> Option<Duration> {
    let mut parts = text.rsplit(':');
    let seconds: f64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let hours: u64 = match parts.next() {
        Some(hours) => hours.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() || !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    let whole = hours.checked_mul(60)?.checked_add(minutes)?.checked_mul(60)?;
    Some(Duration::from_secs(whole) + Duration::from_secs_f64(seconds))
}
