//! Differential stress testing: run every candidate on every input and
//! stop at the first disagreement.
//!
//! The primary entry point is the [`Suite`] type.
//!
//! # Example
//!
//! ```no_run
//! use diffstress::{Candidate, InputSource, LogDiagnostics, Suite};
//! use std::time::Duration;
//!
//! let candidates = [Candidate::parse("fast"), Candidate::parse("brute@nosan")];
//!
//! let result = Suite::new()
//!     .iterations(Some(1000))
//!     .timeout(Duration::from_secs(2))
//!     .memory_limit_kb(256 * 1024)
//!     .run(
//!         &candidates,
//!         InputSource::from_option("[1, 100]; [[1, 1000], len=[1, 100]]"),
//!         &mut LogDiagnostics::new(),
//!     );
//!
//! match result {
//!     Ok(checked) => println!("{checked} inputs, no divergence"),
//!     Err(e) if e.is_divergence() => eprintln!("{e}"),
//!     Err(e) => panic!("suite failed: {e}"),
//! }
//! ```

use crate::runner::{CancelToken, Limits, RunResult, Runner};
use crate::{
    Candidate, Diagnostics, Error, InputSource, Inputs, Measurement, Result, Session, TimeWrapper,
};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Whether the candidates agreed on an input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Every candidate printed the same output, ignoring trailing whitespace.
    Agree,
    /// At least two candidates printed different outputs.
    Diverge,
}

/// One candidate's part of a [`RunReport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    /// The candidate's display name.
    pub name: String,
    /// The executable whose output was compared. For candidates that skip
    /// instrumentation this is the uninstrumented build when there is one.
    pub path: PathBuf,
    /// The raw bytes it printed.
    pub stdout: Vec<u8>,
    /// Its measurement, if it was measured.
    pub measurement: Option<Measurement>,
    /// The re-measurement of its uninstrumented build, if one was needed.
    pub fallback: Option<Measurement>,
}

/// Everything needed to reproduce one input's comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    /// Zero-based index of the input in the stream.
    pub iteration: usize,
    /// The input every candidate received.
    pub input: String,
    /// One entry per candidate, in candidate order.
    pub entries: Vec<Entry>,
    /// The outcome.
    pub verdict: Verdict,
}

impl RunReport {
    fn new(iteration: usize, input: String, candidates: &[Candidate], results: Vec<RunResult>) -> Self {
        let entries: Vec<Entry> = candidates
            .iter()
            .zip(results)
            .map(|(candidate, result)| Entry {
                name: candidate.name().to_string(),
                path: result.path,
                stdout: result.stdout,
                measurement: result.measurement,
                fallback: result.fallback,
            })
            .collect();

        let verdict = match entries.split_first() {
            Some((first, rest))
                if rest
                    .iter()
                    .all(|e| e.stdout.trim_ascii_end() == first.stdout.trim_ascii_end()) =>
            {
                Verdict::Agree
            }
            None => Verdict::Agree,
            Some(_) => Verdict::Diverge,
        };

        RunReport {
            iteration,
            input,
            entries,
            verdict,
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Input #{}:", self.iteration)?;
        writeln!(f, "{}", self.input)?;
        for entry in &self.entries {
            write!(f, "\n{} ({})", entry.name, entry.path.display())?;
            match &entry.measurement {
                Some(measurement) => write!(f, " [{measurement}]")?,
                None => f.write_str(" [not measured]")?,
            }
            if let Some(fallback) = &entry.fallback {
                write!(f, " [uninstrumented: {fallback}]")?;
            }
            writeln!(f, ":")?;
            writeln!(f, "{}", String::from_utf8_lossy(entry.stdout.trim_ascii_end()))?;
        }
        Ok(())
    }
}

/// A configured differential stress test.
///
/// A suite pulls one input at a time, runs every candidate on it in order,
/// and compares their outputs after trimming trailing whitespace. The first
/// disagreement fails the run with a
/// [`Divergence`][crate::ErrorKind::Divergence] error carrying the full
/// [`RunReport`]. Running out of inputs is success.
#[derive(Clone, Debug)]
pub struct Suite {
    iterations: Option<usize>,
    limits: Limits,
    seed: Option<u64>,
    kill_after: Option<Option<Duration>>,
    cancel: CancelToken,
    wrapper: Option<TimeWrapper>,
}

impl Default for Suite {
    fn default() -> Suite {
        Suite::new()
    }
}

impl Suite {
    /// Create a new `Suite` with unbounded iterations, a one second timeout
    /// and a one kilobyte memory limit.
    pub fn new() -> Suite {
        Suite {
            iterations: None,
            limits: Limits::default(),
            seed: None,
            kill_after: None,
            cancel: CancelToken::new(),
            wrapper: None,
        }
    }

    /// Configure how many inputs to draw from token expressions. `None` is
    /// unbounded. File and supplied inputs ignore this.
    pub fn iterations(&mut self, iterations: Option<usize>) -> &mut Suite {
        self.iterations = iterations;
        self
    }

    /// Configure the time limit.
    pub fn timeout(&mut self, timeout: Duration) -> &mut Suite {
        self.limits.timeout = timeout;
        self
    }

    /// Configure the memory limit, in kilobytes.
    pub fn memory_limit_kb(&mut self, memory_limit_kb: u64) -> &mut Suite {
        self.limits.memory_limit_kb = memory_limit_kb;
        self
    }

    /// Seed token generation, to replay an earlier run.
    pub fn seed(&mut self, seed: u64) -> &mut Suite {
        self.seed = Some(seed);
        self
    }

    /// Configure the hard deadline after which a candidate is killed.
    /// Defaults to [`KILL_MULTIPLIER`][crate::runner::KILL_MULTIPLIER] times
    /// the timeout; `None` never kills.
    pub fn kill_after(&mut self, kill_after: Option<Duration>) -> &mut Suite {
        self.kill_after = Some(kill_after);
        self
    }

    /// Abort the run when `cancel` is set.
    pub fn cancel_token(&mut self, cancel: CancelToken) -> &mut Suite {
        self.cancel = cancel;
        self
    }

    /// Measure with `wrapper` instead of the platform's time program.
    pub fn time_wrapper(&mut self, wrapper: TimeWrapper) -> &mut Suite {
        self.wrapper = Some(wrapper);
        self
    }

    /// Turn `source` into this suite's input stream, parsing token
    /// expressions and reading files up front.
    pub fn inputs(&self, source: InputSource) -> Result<Inputs> {
        let session = match self.seed {
            Some(seed) => Session::new().seed(seed),
            None => Session::new(),
        };
        source.into_inputs(self.iterations, session)
    }

    /// Run every candidate on every input from `source`.
    ///
    /// Returns the number of inputs on which all candidates agreed.
    pub fn run(
        &self,
        candidates: &[Candidate],
        source: InputSource,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<usize> {
        let inputs = self.inputs(source)?;
        if let Some(seed) = inputs.seed() {
            diagnostics.info(&format!("seed: {seed}"));
        }
        self.run_inputs(candidates, inputs, diagnostics)
    }

    /// Run every candidate on every input of an already assembled stream.
    pub fn run_inputs<I>(
        &self,
        candidates: &[Candidate],
        inputs: I,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<usize>
    where
        I: IntoIterator<Item = Result<String>>,
    {
        if candidates.is_empty() {
            return Err(Error::config("no solutions to compare"));
        }

        let mut runner = self.runner();
        let mut checked = 0;

        for (iteration, input) in inputs.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(Error::cancelled());
            }
            let input = input?;

            let results = candidates
                .iter()
                .map(|candidate| runner.run(candidate, &input, diagnostics))
                .collect::<Result<Vec<_>>>()?;
            let report = RunReport::new(iteration, input, candidates, results);

            log::debug!(
                target: crate::LOG_TARGET,
                "[{iteration}] input: {:?}, outputs: {:?}",
                report.input,
                report
                    .entries
                    .iter()
                    .map(|e| String::from_utf8_lossy(e.stdout.trim_ascii_end()))
                    .collect::<Vec<_>>()
            );

            if report.verdict == Verdict::Diverge {
                diagnostics.error(&format!("solutions have different outputs on input #{iteration}"));
                return Err(Error::divergence(report));
            }
            checked += 1;
        }

        diagnostics.info(&format!("{checked} inputs checked, no divergence"));
        Ok(checked)
    }

    fn runner(&self) -> Runner {
        let mut runner = Runner::new(self.limits).cancel_token(self.cancel.clone());
        if let Some(kill_after) = self.kill_after {
            runner = runner.kill_after(kill_after);
        }
        if let Some(wrapper) = &self.wrapper {
            runner = runner.time_wrapper(wrapper.clone());
        }
        runner
    }
}
