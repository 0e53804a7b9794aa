//! Running one candidate on one input, under the time wrapper.
//!
//! The runner writes the input (plus a trailing newline) to the candidate's
//! standard input, captures its standard output, and recovers elapsed time
//! and peak memory from the [`TimeWrapper`]. Limit overages are not errors:
//! they trigger a re-measurement of the candidate's uninstrumented fallback
//! and are reported through the [`Diagnostics`] sink.

use crate::measure::{self, Measurement, TimeWrapper};
use crate::{Candidate, Diagnostics, Error, Result};
use std::fmt;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How many multiples of the timeout a candidate may run before it is
/// killed.
pub const KILL_MULTIPLIER: u32 = 5;

const POLL_MIN: Duration = Duration::from_millis(1);
const POLL_MAX: Duration = Duration::from_millis(20);
const SPAWN_RETRIES: u64 = 5;
// How long to wait for output pipes after a kill before giving up on them.
const KILL_GRACE: Duration = Duration::from_millis(500);

/// Time and memory limits for one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Wall-clock limit.
    pub timeout: Duration,
    /// Peak resident memory limit, in kilobytes.
    pub memory_limit_kb: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1),
            memory_limit_kb: 1,
        }
    }
}

impl Limits {
    /// Every limit `measurement` exceeds.
    pub fn overages(&self, measurement: &Measurement) -> Vec<Overage> {
        let mut overages = Vec::new();
        if measurement.elapsed > self.timeout {
            overages.push(Overage::Time {
                measured: measurement.elapsed,
                limit: self.timeout,
            });
        }
        if measurement.peak_memory_kb > self.memory_limit_kb {
            overages.push(Overage::Memory {
                measured_kb: measurement.peak_memory_kb,
                limit_kb: self.memory_limit_kb,
            });
        }
        overages
    }
}

/// One exceeded limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overage {
    /// The run took too long.
    Time {
        /// Elapsed time.
        measured: Duration,
        /// The limit.
        limit: Duration,
    },
    /// The run used too much memory.
    Memory {
        /// Peak memory, in kilobytes.
        measured_kb: u64,
        /// The limit, in kilobytes.
        limit_kb: u64,
    },
}

impl fmt::Display for Overage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Overage::Time { measured, limit } => write!(
                f,
                "Timeout exceeded: {:.3}s > {:.3}s",
                measured.as_secs_f64(),
                limit.as_secs_f64()
            ),
            Overage::Memory {
                measured_kb,
                limit_kb,
            } => write!(f, "Memory limit exceeded: {measured_kb} KB > {limit_kb} KB"),
        }
    }
}

/// A flag that aborts a run from another thread.
///
/// Setting it kills the candidate in flight and makes the run fail with
/// [`ErrorKind::Cancelled`][crate::ErrorKind::Cancelled].
///
/// # Example
///
/// ```
/// use diffstress::CancelToken;
///
/// let token = CancelToken::new();
/// let handle = token.clone();
/// assert!(!token.is_cancelled());
///
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// The outcome of running one candidate on one input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunResult {
    /// The executable whose output was kept.
    pub path: PathBuf,
    /// The raw bytes the candidate wrote to standard output. This is what
    /// gets compared.
    pub stdout: Vec<u8>,
    /// The measurement of the executable whose output was kept. `None` for
    /// candidates marked with
    /// [`NO_SANITIZER_MARKER`][crate::NO_SANITIZER_MARKER].
    pub measurement: Option<Measurement>,
    /// The re-measurement of the uninstrumented fallback, if a limit was
    /// exceeded and a fallback exists.
    pub fallback: Option<Measurement>,
    /// Whether the candidate was killed for running past the hard deadline.
    pub killed: bool,
}

struct Execution {
    stdout: Vec<u8>,
    stderr: String,
    elapsed: Duration,
    killed: bool,
}

struct Measured {
    stdout: Vec<u8>,
    stderr: String,
    measurement: Measurement,
    killed: bool,
}

/// Re-measure an uninstrumented build when the instrumented one exceeds a
/// limit.
///
/// The same policy covers time and memory: `exceeds` lists every limit a
/// measurement breaks, and the fallback is run once if the list is
/// non-empty. Only measurements are revisited; output is never taken from
/// the fallback here.
struct Retry<'a> {
    name: &'a str,
    fallback: Option<&'a Path>,
    exceeds: &'a dyn Fn(&Measurement) -> Vec<Overage>,
}

impl Retry<'_> {
    fn apply(
        &self,
        runner: &Runner,
        wrapper: &TimeWrapper,
        input: &str,
        primary: &Measurement,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<Option<Measurement>> {
        let overages = (self.exceeds)(primary);
        if overages.is_empty() {
            return Ok(None);
        }
        for overage in &overages {
            diagnostics.warn(&format!(
                "{overage}\nSolution: {}\nInput: {input}",
                self.name
            ));
        }

        let Some(fallback) = self.fallback else {
            diagnostics.warn(&format!(
                "{}: no build without instrumentation to re-measure; keeping [{primary}]",
                self.name
            ));
            return Ok(None);
        };

        let rerun = runner.measure(wrapper, fallback, input, self.name, diagnostics)?;
        if (self.exceeds)(&rerun.measurement).is_empty() {
            diagnostics.warn(&format!(
                "{}: within limits without instrumentation [{}]; instrumented run took [{primary}]",
                self.name, rerun.measurement
            ));
        } else {
            diagnostics.warn(&format!(
                "{}: exceeds limits without instrumentation too: instrumented [{primary}], \
                 uninstrumented [{}]",
                self.name, rerun.measurement
            ));
        }
        Ok(Some(rerun.measurement))
    }
}

/// Runs candidates under the time wrapper.
///
/// # Example
///
/// ```no_run
/// use diffstress::{Candidate, Limits, LogDiagnostics, Runner};
/// use std::time::Duration;
///
/// let mut runner = Runner::new(Limits {
///     timeout: Duration::from_secs(2),
///     memory_limit_kb: 256 * 1024,
/// });
/// let result = runner.run(&Candidate::new("solution"), "3\n1 2 3", &mut LogDiagnostics::new())?;
/// println!("{} [{:?}]", String::from_utf8_lossy(&result.stdout), result.measurement);
/// # Ok::<(), diffstress::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Runner {
    limits: Limits,
    wrapper: Option<TimeWrapper>,
    kill_after: Option<Duration>,
    cancel: CancelToken,
}

impl Runner {
    /// Create a runner with the given limits. The hard deadline defaults to
    /// [`KILL_MULTIPLIER`] times the timeout.
    pub fn new(limits: Limits) -> Self {
        Self {
            limits,
            wrapper: None,
            kill_after: limits.timeout.checked_mul(KILL_MULTIPLIER),
            cancel: CancelToken::new(),
        }
    }

    /// Use this time wrapper instead of the platform's.
    pub fn time_wrapper(mut self, wrapper: TimeWrapper) -> Self {
        self.wrapper = Some(wrapper);
        self
    }

    /// Kill candidates that run longer than this. `None` waits forever.
    pub fn kill_after(mut self, kill_after: Option<Duration>) -> Self {
        self.kill_after = kill_after;
        self
    }

    /// Observe this token for cancellation.
    pub fn cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The limits candidates are judged against.
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Run `candidate` on `input`.
    ///
    /// The platform's time wrapper is resolved on first use; an unsupported
    /// platform fails here.
    pub fn run(
        &mut self,
        candidate: &Candidate,
        input: &str,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<RunResult> {
        if candidate.skips_instrumentation() {
            return self.run_unmeasured(candidate, input, diagnostics);
        }

        let wrapper = match &self.wrapper {
            Some(wrapper) => wrapper.clone(),
            None => {
                let wrapper = TimeWrapper::for_platform()?;
                log::debug!(
                    target: crate::LOG_TARGET,
                    "measuring with {}",
                    wrapper.program().display()
                );
                self.wrapper = Some(wrapper.clone());
                wrapper
            }
        };

        let primary = self.measure(
            &wrapper,
            candidate.path(),
            input,
            candidate.name(),
            diagnostics,
        )?;
        report_stderr(candidate, &primary.stderr, diagnostics);

        let limits = self.limits;
        let retry = Retry {
            name: candidate.name(),
            fallback: candidate.fallback(),
            exceeds: &|m: &Measurement| limits.overages(m),
        };
        let fallback = retry.apply(self, &wrapper, input, &primary.measurement, diagnostics)?;

        Ok(RunResult {
            path: candidate.path().to_path_buf(),
            stdout: primary.stdout,
            measurement: Some(primary.measurement),
            fallback,
            killed: primary.killed,
        })
    }

    /// Candidates that need no instrumentation are judged on their fallback
    /// build's output, without measurement.
    fn run_unmeasured(
        &self,
        candidate: &Candidate,
        input: &str,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<RunResult> {
        let path = candidate.fallback().unwrap_or(candidate.path());
        log::debug!(
            target: crate::LOG_TARGET,
            "{}: running {} unmeasured",
            candidate.name(),
            path.display()
        );
        let execution = self.execute(Command::new(path), input)?;
        if execution.killed {
            diagnostics.warn(&format!(
                "{}: killed after {:.3}s\nInput: {input}",
                candidate.name(),
                execution.elapsed.as_secs_f64()
            ));
        }
        report_stderr(candidate, &execution.stderr, diagnostics);
        Ok(RunResult {
            path: path.to_path_buf(),
            stdout: execution.stdout,
            measurement: None,
            fallback: None,
            killed: execution.killed,
        })
    }

    fn measure(
        &self,
        wrapper: &TimeWrapper,
        path: &Path,
        input: &str,
        name: &str,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<Measured> {
        let mut command = Command::new(wrapper.program());
        command.args(wrapper.args()).arg(path);
        let execution = self.execute(command, input)?;

        if execution.killed {
            // The wrapper died with the candidate, so fall back to our clock.
            diagnostics.warn(&format!(
                "{name}: killed after {:.3}s\nInput: {input}",
                execution.elapsed.as_secs_f64()
            ));
            return Ok(Measured {
                stdout: execution.stdout,
                stderr: execution.stderr,
                measurement: Measurement {
                    elapsed: execution.elapsed,
                    peak_memory_kb: 0,
                },
                killed: true,
            });
        }

        let report = measure::parse_report(&execution.stderr)?;
        log::trace!(
            target: crate::LOG_TARGET,
            "{name}: {} [{}]",
            path.display(),
            report.measurement
        );
        Ok(Measured {
            stdout: execution.stdout,
            stderr: report.remainder,
            measurement: report.measurement,
            killed: false,
        })
    }

    fn execute(&self, mut command: Command, input: &str) -> Result<Execution> {
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let start = Instant::now();
        let mut child = spawn(&mut command)?;

        let stdin = child.stdin.take();
        let payload = format!("{input}\n");
        // Never joined: a process left holding the pipe may never read it.
        thread::spawn(move || {
            if let Some(mut stdin) = stdin {
                // A candidate may exit without reading all of its input.
                let _ = stdin.write_all(payload.as_bytes());
            }
        });
        let mut stdout = Pipe::drain(child.stdout.take());
        let mut stderr = Pipe::drain(child.stderr.take());

        // The run is over once the child has exited and both pipes are
        // closed. Background processes the candidate left behind keep the
        // pipes open, so the deadline and cancellation apply until then.
        let mut status = None;
        let mut exited_at = None;
        let mut killed_at: Option<Instant> = None;
        let mut poll = POLL_MIN;
        loop {
            if status.is_none() {
                match child.try_wait() {
                    Ok(Some(s)) => {
                        status = Some(s);
                        exited_at = Some(start.elapsed());
                    }
                    Ok(None) => {}
                    Err(e) => {
                        kill(&mut child);
                        return Err(Error::io("failed to wait for candidate", e));
                    }
                }
            }
            let drained = stdout.poll() & stderr.poll();
            if status.is_some() && drained {
                break;
            }
            if self.cancel.is_cancelled() {
                kill(&mut child);
                if status.is_none() {
                    let _ = child.wait();
                }
                return Err(Error::cancelled());
            }
            match killed_at {
                Some(at) if at.elapsed() >= KILL_GRACE => {
                    // Whatever still holds the pipes escaped the group kill.
                    log::debug!(
                        target: crate::LOG_TARGET,
                        "{:?}: abandoning output pipes after kill",
                        command.get_program()
                    );
                    break;
                }
                Some(_) => {}
                None if self.kill_after.is_some_and(|d| start.elapsed() >= d) => {
                    kill(&mut child);
                    killed_at = Some(Instant::now());
                }
                None => {}
            }
            thread::sleep(poll);
            poll = (poll * 2).min(POLL_MAX);
        }

        let status = match status {
            Some(status) => status,
            None => child
                .wait()
                .map_err(|e| Error::io("failed to wait for candidate", e))?,
        };
        // A killed run lasted until the kill, even if the wrapper itself
        // exited earlier and only its leftovers held the pipes.
        let elapsed = match killed_at {
            Some(at) => at.duration_since(start),
            None => exited_at.unwrap_or_else(|| start.elapsed()),
        };
        log::trace!(
            target: crate::LOG_TARGET,
            "{:?} exited with {status} after {:.3}s",
            command.get_program(),
            elapsed.as_secs_f64()
        );

        Ok(Execution {
            stdout: stdout.into_bytes(),
            stderr: String::from_utf8_lossy(&stderr.into_bytes()).into_owned(),
            elapsed,
            killed: killed_at.is_some(),
        })
    }
}

fn report_stderr(candidate: &Candidate, stderr: &str, diagnostics: &mut dyn Diagnostics) {
    let stderr = stderr.trim_end();
    if !stderr.is_empty() {
        diagnostics.warn(&format!("{} wrote to stderr:\n{stderr}", candidate.name()));
    }
}

fn spawn(command: &mut Command) -> Result<Child> {
    let mut attempts = 0;
    loop {
        match command.spawn() {
            Ok(child) => return Ok(child),
            // Freshly written executables may still be open for writing in a
            // forked child elsewhere.
            #[cfg(unix)]
            Err(e) if e.raw_os_error() == Some(libc::ETXTBSY) && attempts < SPAWN_RETRIES => {
                attempts += 1;
                thread::sleep(Duration::from_millis(10 * attempts));
            }
            Err(e) => {
                return Err(Error::io(
                    format!("failed to start {:?} (after {attempts} retries)", command.get_program()),
                    e,
                ))
            }
        }
    }
}

/// One of the child's output pipes, read to the end on its own thread.
struct Pipe {
    rx: Option<Receiver<Vec<u8>>>,
    bytes: Vec<u8>,
}

impl Pipe {
    fn drain<R>(pipe: Option<R>) -> Pipe
    where
        R: Read + Send + 'static,
    {
        let rx = pipe.map(|mut pipe| {
            let (tx, rx) = mpsc::channel();
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                let _ = tx.send(buf);
            });
            rx
        });
        Pipe {
            rx,
            bytes: Vec::new(),
        }
    }

    /// Whether the pipe has been read to the end.
    fn poll(&mut self) -> bool {
        let Some(rx) = &self.rx else {
            return true;
        };
        match rx.try_recv() {
            Ok(bytes) => self.bytes = bytes,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {}
        }
        self.rx = None;
        true
    }

    fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Kill the child and, on unix, every process in its group: the time
/// wrapper forks the candidate, and both must go.
fn kill(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pid) = libc::pid_t::try_from(child.id()) {
            // SAFETY: `kill` has no memory-safety preconditions; the group id
            // is the child's pid because it was spawned with
            // `process_group(0)`.
            if unsafe { libc::kill(-pid, libc::SIGKILL) } == 0 {
                return;
            }
        }
    }
    let _ = child.kill();
}
