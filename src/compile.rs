//! Building candidates from source.
//!
//! Each candidate is compiled twice: once with runtime instrumentation
//! (sanitizers), which is the build that gets measured and compared, and
//! once without, which is the fallback re-measured when the instrumented
//! build exceeds a limit.

use crate::{Candidate, Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Something that turns a source file into an executable.
pub trait Compile {
    /// Compile `source` into the executable `output`, with or without
    /// runtime instrumentation.
    fn compile(&self, source: &Path, output: &Path, instrumented: bool) -> Result<()>;

    /// Build both variants of `candidate`, whose path names a source file,
    /// into `out_dir`.
    ///
    /// The instrumented executable is named after the source's file stem and
    /// the plain one adds `fallback_suffix`. Candidates that skip
    /// instrumentation only get the plain build, which then serves as both.
    fn build(&self, candidate: &Candidate, out_dir: &Path, fallback_suffix: &str) -> Result<Candidate> {
        let source = candidate.path();
        // The instrumented build is named after the stem, so a source without
        // an extension would be overwritten by its own executable.
        let stem = source
            .file_stem()
            .filter(|_| source.extension().is_some())
            .ok_or_else(|| {
                Error::config(format!("{} does not name a source file", source.display()))
            })?;

        let mut plain = OsString::from(stem);
        plain.push(fallback_suffix);
        let plain = out_dir.join(plain);
        self.compile(source, &plain, false)?;

        let primary = if candidate.skips_instrumentation() {
            plain.clone()
        } else {
            let instrumented = out_dir.join(stem);
            self.compile(source, &instrumented, true)?;
            instrumented
        };

        Ok(Candidate::new(primary)
            .with_name(candidate.name())
            .with_fallback(plain))
    }
}

/// A command-line compiler.
///
/// # Example
///
/// ```
/// use diffstress::Toolchain;
///
/// let gxx = Toolchain::default();
/// assert_eq!(gxx.program(), std::path::Path::new("g++"));
///
/// let clang = Toolchain::new("clang++").arg("-O2").arg("-std=c++20");
/// assert_eq!(clang.program(), std::path::Path::new("clang++"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toolchain {
    program: PathBuf,
    args: Vec<OsString>,
    instrumentation: Vec<OsString>,
}

impl Default for Toolchain {
    /// `g++ -O2 -std=c++17`, instrumented with address and undefined
    /// behavior sanitizers.
    fn default() -> Self {
        Toolchain::new("g++")
            .arg("-O2")
            .arg("-std=c++17")
            .instrumentation(["-fsanitize=address,undefined", "-g"])
    }
}

impl Toolchain {
    /// A compiler with no arguments and no instrumentation flags.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Toolchain {
            program: program.into(),
            args: Vec::new(),
            instrumentation: Vec::new(),
        }
    }

    /// Pass `arg` to every compilation.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Replace the flags added to instrumented compilations.
    pub fn instrumentation<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.instrumentation = flags.into_iter().map(Into::into).collect();
        self
    }

    /// The compiler program.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Compile for Toolchain {
    fn compile(&self, source: &Path, output: &Path, instrumented: bool) -> Result<()> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if instrumented {
            command.args(&self.instrumentation);
        }
        command.arg(source).arg("-o").arg(output);

        log::info!(
            target: crate::LOG_TARGET,
            "compiling {} -> {}{}",
            source.display(),
            output.display(),
            if instrumented { " (instrumented)" } else { "" }
        );
        let out = command.output().map_err(|e| {
            Error::io(format!("failed to run compiler {}", self.program.display()), e)
        })?;

        if out.status.success() {
            Ok(())
        } else {
            Err(Error::build(
                source,
                String::from_utf8_lossy(&out.stderr).into_owned(),
            ))
        }
    }
}
