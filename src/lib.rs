#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod _guide;
pub mod candidate;
pub mod compile;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod generators;
pub mod input;
pub mod measure;
mod rng;
pub mod runner;
pub mod suite;
pub mod token;

pub use candidate::{Candidate, NO_SANITIZER_MARKER};
pub use compile::{Compile, Toolchain};
pub use config::Config;
pub use diagnostics::{Diagnostics, Level, LogDiagnostics, Recorder};
pub use error::{Error, ErrorKind, ErrorMessage, Result};
pub use generators::Generator;
pub use input::{InputSource, Inputs, Supplied, DELIMITER};
pub use measure::{Measurement, TimeWrapper};
pub use rng::Rng;
pub use runner::{CancelToken, Limits, Overage, RunResult, Runner};
pub use suite::{Entry, RunReport, Suite, Verdict};
pub use token::{parse_token, Bound, Element, FloatRange, IntRange, Sequence, Set, Token};

/// The `log` target every record from this crate is emitted under.
pub const LOG_TARGET: &str = "diffstress";

/// A generation session and its configuration.
///
/// A session owns the random number generator that every token generator
/// draws from. Sessions are seeded from OS entropy unless a seed is given;
/// the seed in use is always available from
/// [`current_seed`][Session::current_seed] so that a run can be replayed.
///
/// # Example
///
/// ```
/// # fn foo() -> diffstress::Result<()> {
/// use diffstress::{parse_token, Session};
///
/// let mut generator = parse_token("[1, 6]")?.generator();
///
/// let mut first = Session::new().seed(0x12345678);
/// let mut second = Session::new().seed(0x12345678);
///
/// for _ in 0..3 {
///     let a: String = first.generate_with(&mut generator)?;
///     let b: String = second.generate_with(&mut generator)?;
///     assert_eq!(a, b);
/// }
/// # Ok(())
/// # }
/// # foo().unwrap();
/// ```
#[derive(Debug)]
pub struct Session {
    context: Context,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a new `Session` seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    fn with_seed(seed: u64) -> Self {
        Self {
            context: Context {
                rng: Rng::new(seed),
                seed,
            },
        }
    }

    /// Set the seed for the random number generator.
    pub fn seed(self, seed: u64) -> Self {
        Self::with_seed(seed)
    }

    /// The seed this session's random number generator started from.
    pub fn current_seed(&self) -> u64 {
        self.context.seed
    }

    /// Draw one value from `generator` within this session.
    pub fn generate_with<T>(&mut self, generator: &mut impl Generate<T>) -> Result<T> {
        generator.generate(&mut self.context)
    }

    /// Get this session's generation context.
    pub fn context(&mut self) -> &mut Context {
        &mut self.context
    }
}

/// The context for the current generation.
///
/// You do not create contexts directly. You create [`Session`s][Session]
/// which internally manage contexts for you.
#[derive(Debug)]
pub struct Context {
    rng: Rng,
    seed: u64,
}

impl Context {
    /// Get this context's random number generator.
    #[inline]
    #[must_use]
    pub fn rng(&mut self) -> &mut Rng {
        &mut self.rng
    }
}

/// Whether a generator can be drawn from indefinitely.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// Every call produces a value.
    Unbounded,
    /// The first call produces a value; later calls report
    /// [`ErrorKind::Exhausted`]. Restart it by asking its token for a new
    /// generator.
    OneShot,
}

/// A trait for generating random values.
///
/// You can think of a `Generate<T>` as an iterator of `T`s whose state
/// advances with the [`Context`]'s random number generator.
///
/// # Example
///
/// ```
/// # fn foo() -> diffstress::Result<()> {
/// use diffstress::{Context, Generate, Result, Session};
///
/// // A generator of clock times, like `07:45`.
/// struct Clock;
///
/// impl Generate<String> for Clock {
///     fn generate(&mut self, context: &mut Context) -> Result<String> {
///         let hour = context.rng().gen_inclusive(0, 23);
///         let minute = context.rng().gen_inclusive(0, 59);
///         Ok(format!("{hour:02}:{minute:02}"))
///     }
/// }
///
/// let mut session = Session::new();
/// let time = session.generate_with(&mut Clock)?;
/// assert_eq!(time.len(), 5);
/// # Ok(())
/// # }
/// # foo().unwrap();
/// ```
pub trait Generate<T> {
    /// Generate a random `T` value.
    ///
    /// Implementations may use the `context`'s random number generator in the
    /// process of generating a `T`.
    fn generate(&mut self, context: &mut Context) -> Result<T>;

    /// Whether this generator is unbounded or one-shot.
    ///
    /// Defaults to [`Shape::Unbounded`].
    fn shape(&self) -> Shape {
        Shape::Unbounded
    }
}

fn _static_assert_object_safety(_: &dyn Generate<String>, _: &dyn Diagnostics) {}
