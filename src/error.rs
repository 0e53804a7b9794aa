//! Error and result types for the `diffstress` crate.

use crate::suite::RunReport;
use std::borrow::Cow;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// A result that is either `Ok(T)` or `Err(diffstress::Error)`.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error that can occur when using the `diffstress` crate.
///
/// This type is a thin wrapper around a boxed [`ErrorKind`], which contains
/// the specific kind of error that occurred.
///
/// # Examples
///
/// ```
/// use diffstress::{parse_token, ErrorKind};
///
/// let error = parse_token("not-a-token").unwrap_err();
/// assert!(error.is_grammar());
///
/// match error.kind() {
///     ErrorKind::Grammar { token, .. } => println!("bad token: {token}"),
///     unknown => println!("unknown! {unknown}"),
/// }
/// ```
pub struct Error {
    kind: Box<ErrorKind>,
}

impl From<ErrorKind> for Error {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind: Box::new(kind),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.kind, f)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &*self.kind {
            ErrorKind::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Error {
    /// Returns a new error for a token expression that matches none of the
    /// recognized shapes.
    #[must_use]
    pub fn grammar(token: impl Into<String>, reason: &'static str) -> Self {
        ErrorKind::Grammar {
            token: token.into(),
            reason,
        }
        .into()
    }

    /// Returns a new error for a caller-supplied input source of the wrong
    /// shape.
    #[must_use]
    pub fn config_type(found: impl Into<String>) -> Self {
        ErrorKind::ConfigType(found.into()).into()
    }

    /// Returns a new error for an invalid or missing configuration value.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        ErrorKind::Config(msg.into()).into()
    }

    /// Returns a new error for time-wrapper output that carries no
    /// measurement.
    #[must_use]
    pub fn measurement_parse(stderr: impl Into<String>) -> Self {
        ErrorKind::MeasurementParse {
            stderr: stderr.into(),
        }
        .into()
    }

    /// Returns a new error for a platform without a known time wrapper.
    #[must_use]
    pub fn unsupported_platform(os: impl Into<String>) -> Self {
        ErrorKind::UnsupportedPlatform(os.into()).into()
    }

    /// Returns a new error indicating that candidates disagreed.
    #[must_use]
    pub fn divergence(report: RunReport) -> Self {
        ErrorKind::Divergence(report).into()
    }

    /// Returns a new error indicating that the run was cancelled.
    #[must_use]
    pub fn cancelled() -> Self {
        ErrorKind::Cancelled.into()
    }

    /// Returns a new error indicating that the generator is exhausted.
    #[must_use]
    pub fn exhausted() -> Self {
        ErrorKind::Exhausted.into()
    }

    /// Returns a new I/O error, annotated with what was being attempted.
    #[must_use]
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        ErrorKind::Io {
            context: context.into(),
            source,
        }
        .into()
    }

    /// Returns a new error for a source file that failed to compile.
    #[must_use]
    pub fn build(source: impl Into<PathBuf>, diagnostics: impl Into<String>) -> Self {
        ErrorKind::Build {
            source: source.into(),
            diagnostics: diagnostics.into(),
        }
        .into()
    }

    /// Returns a new error with the given message.
    #[must_use]
    pub fn other(msg: impl Into<ErrorMessage>) -> Self {
        ErrorKind::Other(msg.into()).into()
    }

    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the divergence report if this is a
    /// [`Divergence`][ErrorKind::Divergence] error.
    #[must_use]
    pub fn report(&self) -> Option<&RunReport> {
        match self.kind() {
            ErrorKind::Divergence(report) => Some(report),
            _ => None,
        }
    }

    /// Returns `true` if the error's kind is [`Grammar`][ErrorKind::Grammar].
    #[must_use]
    pub fn is_grammar(&self) -> bool {
        matches!(self.kind(), ErrorKind::Grammar { .. })
    }

    /// Returns `true` if the error's kind is
    /// [`ConfigType`][ErrorKind::ConfigType].
    #[must_use]
    pub fn is_config_type(&self) -> bool {
        matches!(self.kind(), ErrorKind::ConfigType(_))
    }

    /// Returns `true` if the error's kind is [`Config`][ErrorKind::Config].
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self.kind(), ErrorKind::Config(_))
    }

    /// Returns `true` if the error's kind is
    /// [`MeasurementParse`][ErrorKind::MeasurementParse].
    #[must_use]
    pub fn is_measurement_parse(&self) -> bool {
        matches!(self.kind(), ErrorKind::MeasurementParse { .. })
    }

    /// Returns `true` if the error's kind is
    /// [`UnsupportedPlatform`][ErrorKind::UnsupportedPlatform].
    #[must_use]
    pub fn is_unsupported_platform(&self) -> bool {
        matches!(self.kind(), ErrorKind::UnsupportedPlatform(_))
    }

    /// Returns `true` if the error's kind is
    /// [`Divergence`][ErrorKind::Divergence].
    #[must_use]
    pub fn is_divergence(&self) -> bool {
        matches!(self.kind(), ErrorKind::Divergence(_))
    }

    /// Returns `true` if the error's kind is
    /// [`Cancelled`][ErrorKind::Cancelled].
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind(), ErrorKind::Cancelled)
    }

    /// Returns `true` if the error's kind is
    /// [`Exhausted`][ErrorKind::Exhausted].
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self.kind(), ErrorKind::Exhausted)
    }

    /// Returns `true` if the error's kind is [`Build`][ErrorKind::Build].
    #[must_use]
    pub fn is_build(&self) -> bool {
        matches!(self.kind(), ErrorKind::Build { .. })
    }
}

/// The kind of an error that can occur when using the `diffstress` crate.
///
/// This enum is not exhaustive, and new variants may be added in the future.
/// When matching on this enum, a catch-all arm should be used to handle any
/// new variants that are added.
#[non_exhaustive]
#[derive(Debug)]
pub enum ErrorKind {
    /// A token expression did not match any recognized shape.
    Grammar {
        /// The offending text.
        token: String,
        /// Why the text was rejected.
        reason: &'static str,
    },

    /// A caller-supplied input source was neither a list nor a lazy sequence
    /// of input strings.
    ConfigType(String),

    /// A configuration value was missing or invalid.
    Config(String),

    /// The time wrapper's diagnostic output carried no `time:` or `mem:`
    /// line.
    MeasurementParse {
        /// Everything the wrapper wrote to its standard error.
        stderr: String,
    },

    /// Time and memory measurement is not available on this platform.
    UnsupportedPlatform(String),

    /// Candidates produced different outputs for the same input.
    Divergence(RunReport),

    /// The run was cancelled through its
    /// [`CancelToken`][crate::CancelToken].
    Cancelled,

    /// The generator is exhausted.
    Exhausted,

    /// An I/O operation failed.
    Io {
        /// What was being attempted.
        context: String,
        /// The underlying error.
        source: io::Error,
    },

    /// A source file failed to compile.
    Build {
        /// The source file.
        source: PathBuf,
        /// The compiler's diagnostic output.
        diagnostics: String,
    },

    /// Some other error occurred.
    Other(ErrorMessage),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Grammar { token, reason } => {
                write!(f, "invalid token expression `{token}`: {reason}")
            }
            ErrorKind::ConfigType(found) => write!(
                f,
                "user-supplied input source has the wrong type: {found}; \
                 expected a list or a lazy sequence of strings"
            ),
            ErrorKind::Config(msg) => write!(f, "invalid configuration: {msg}"),
            ErrorKind::MeasurementParse { stderr } => write!(
                f,
                "could not find `time:` and `mem:` lines in the time wrapper output:\n{stderr}"
            ),
            ErrorKind::UnsupportedPlatform(os) => write!(
                f,
                "unsupported platform `{os}`: no time wrapper is known for measuring time and memory"
            ),
            ErrorKind::Divergence(report) => {
                write!(f, "solutions have different outputs\n{report}")
            }
            ErrorKind::Cancelled => write!(f, "the run was cancelled"),
            ErrorKind::Exhausted => write!(f, "the generator is exhausted"),
            ErrorKind::Io { context, source } => write!(f, "{context}: {source}"),
            ErrorKind::Build {
                source,
                diagnostics,
            } => write!(f, "failed to compile {}:\n{diagnostics}", source.display()),
            ErrorKind::Other(msg) => write!(f, "an unknown error occurred: {msg}"),
        }
    }
}

/// A message that can be attached to an error.
///
/// This should only be used with `ErrorKind::Other` and in situations where
/// there is not a more-specific error kind to use.
///
/// # Examples
///
/// ```
/// use diffstress::ErrorMessage;
///
/// let msg = ErrorMessage::new("something went wrong");
/// assert_eq!(msg.as_str(), "something went wrong");
/// ```
#[derive(Debug)]
pub struct ErrorMessage {
    inner: Cow<'static, str>,
}

impl ErrorMessage {
    /// Returns a new error message with the given string.
    #[must_use]
    pub fn new(msg: impl Into<ErrorMessage>) -> Self {
        msg.into()
    }

    /// Returns the message as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&'static str> for ErrorMessage {
    #[inline]
    fn from(s: &'static str) -> Self {
        Self {
            inner: Cow::Borrowed(s),
        }
    }
}

impl From<Cow<'static, str>> for ErrorMessage {
    #[inline]
    fn from(s: Cow<'static, str>) -> Self {
        Self { inner: s }
    }
}

impl From<String> for ErrorMessage {
    #[inline]
    fn from(s: String) -> Self {
        Self { inner: s.into() }
    }
}
