//! Candidates: the executables under differential test.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// The suffix that marks a candidate as not needing instrumentation.
///
/// A marked candidate is judged on the output of its fallback (plain)
/// executable, and is not measured at all. See
/// [the instrumentation guide][crate::_guide::instrumentation].
pub const NO_SANITIZER_MARKER: &str = "@nosan";

/// One solution under test.
///
/// # Example
///
/// ```
/// use diffstress::Candidate;
/// use std::path::Path;
///
/// let fast = Candidate::parse("fast");
/// assert_eq!(fast.path(), Path::new("./fast"));
/// assert!(!fast.skips_instrumentation());
///
/// let brute = Candidate::parse("bin/brute@nosan").with_fallback("bin/brute.plain");
/// assert_eq!(brute.path(), Path::new("bin/brute"));
/// assert!(brute.skips_instrumentation());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    name: String,
    path: PathBuf,
    fallback: Option<PathBuf>,
}

impl Candidate {
    /// A candidate for the executable at `path`, named after it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: path.display().to_string(),
            path: resolve(path),
            fallback: None,
        }
    }

    /// Parse a candidate from the command line: a path, optionally followed
    /// by [`NO_SANITIZER_MARKER`].
    pub fn parse(arg: &str) -> Self {
        let path = arg.strip_suffix(NO_SANITIZER_MARKER).unwrap_or(arg);
        Self {
            name: arg.to_string(),
            path: resolve(PathBuf::from(path)),
            fallback: None,
        }
    }

    /// Rename this candidate.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the executable built without instrumentation.
    pub fn with_fallback(mut self, fallback: impl Into<PathBuf>) -> Self {
        self.fallback = Some(resolve(fallback.into()));
        self
    }

    /// Use `<path><suffix>` as the fallback if that file exists.
    pub fn discover_fallback(self, suffix: &str) -> Self {
        let mut fallback = OsString::from(self.path.as_os_str());
        fallback.push(suffix);
        let fallback = PathBuf::from(fallback);
        if fallback.is_file() {
            log::debug!(
                target: crate::LOG_TARGET,
                "found fallback {} for {}",
                fallback.display(),
                self.name
            );
            self.with_fallback(fallback)
        } else {
            self
        }
    }

    /// The candidate's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The (possibly instrumented) executable.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The executable built without instrumentation, if any.
    pub fn fallback(&self) -> Option<&Path> {
        self.fallback.as_deref()
    }

    /// Whether the name carries [`NO_SANITIZER_MARKER`].
    pub fn skips_instrumentation(&self) -> bool {
        self.name.ends_with(NO_SANITIZER_MARKER)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Bare file names run from the working directory, not `$PATH`.
fn resolve(path: PathBuf) -> PathBuf {
    let bare = path.components().count() == 1 && path.is_relative();
    if bare {
        Path::new(".").join(path)
    } else {
        path
    }
}
