//! The configuration surface of a run, as the command line fills it in.

use crate::{Candidate, Error, InputSource, Result, Suite, TimeWrapper};
use std::path::PathBuf;
use std::time::Duration;

/// The default suffix that names a candidate's uninstrumented build.
pub const DEFAULT_FALLBACK_SUFFIX: &str = ".nosan";

/// Everything needed to set up a run.
///
/// # Example
///
/// ```
/// use diffstress::Config;
///
/// let config = Config {
///     candidates: vec!["fast".into(), "brute@nosan".into()],
///     input: Some("[1, 10]; {a, b}".into()),
///     iterations: Some(100),
///     ..Config::default()
/// };
///
/// let candidates = config.candidates();
/// assert_eq!(candidates.len(), 2);
/// assert!(candidates[1].skips_instrumentation());
///
/// let source = config.source()?;
/// let suite = config.suite();
/// let inputs = suite.inputs(source)?;
/// assert_eq!(inputs.count(), 100);
/// # Ok::<(), diffstress::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// How many token-mode inputs to draw. `None` is unbounded.
    pub iterations: Option<usize>,
    /// Time limit per run.
    pub timeout: Duration,
    /// Memory limit per run, in kilobytes.
    pub memory_limit_kb: u64,
    /// Candidate arguments, see [`Candidate::parse`].
    pub candidates: Vec<String>,
    /// A token expression or a file path.
    pub input: Option<String>,
    /// Seed for token generation.
    pub seed: Option<u64>,
    /// Hard deadline per run. `None` uses the runner's default.
    pub kill_after: Option<Duration>,
    /// Time wrapper program overriding the platform's.
    pub time_program: Option<PathBuf>,
    /// Suffix naming each candidate's uninstrumented build.
    pub fallback_suffix: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            iterations: None,
            timeout: Duration::from_secs(1),
            memory_limit_kb: 1,
            candidates: Vec::new(),
            input: None,
            seed: None,
            kill_after: None,
            time_program: None,
            fallback_suffix: DEFAULT_FALLBACK_SUFFIX.to_string(),
        }
    }
}

impl Config {
    /// A [`Suite`] with these limits.
    pub fn suite(&self) -> Suite {
        let mut suite = Suite::new();
        suite
            .iterations(self.iterations)
            .timeout(self.timeout)
            .memory_limit_kb(self.memory_limit_kb);
        if let Some(seed) = self.seed {
            suite.seed(seed);
        }
        if let Some(kill_after) = self.kill_after {
            suite.kill_after(Some(kill_after));
        }
        if let Some(program) = &self.time_program {
            suite.time_wrapper(TimeWrapper::new(program));
        }
        suite
    }

    /// The configured input source.
    ///
    /// Without an `input`, the caller must supply inputs itself; this fails
    /// with a [`Config`][crate::ErrorKind::Config] error.
    pub fn source(&self) -> Result<InputSource> {
        match &self.input {
            Some(input) => Ok(InputSource::from_option(input)),
            None => Err(Error::config(
                "no input given: pass a token expression or a file of inputs",
            )),
        }
    }

    /// Parse the candidate arguments, discovering each one's
    /// uninstrumented build by [`fallback_suffix`][Config::fallback_suffix].
    pub fn candidates(&self) -> Vec<Candidate> {
        self.candidates
            .iter()
            .map(|arg| Candidate::parse(arg).discover_fallback(&self.fallback_suffix))
            .collect()
    }
}
