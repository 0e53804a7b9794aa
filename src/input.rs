//! Assembling complete test inputs from one configured source.
//!
//! There are three sources, fixed when a run is configured:
//!
//! * a list of token expressions joined by [`DELIMITER`], drawn once per
//!   iteration,
//! * a file with one literal input per line,
//! * a caller-supplied list or lazy sequence of literal inputs.

use crate::generators::Generator;
use crate::{parse_token, Error, Generate, Result, Session, Shape, Token};
use std::any::Any;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// The separator between independent token expressions.
pub const DELIMITER: &str = "; ";

/// Where the inputs of a run come from.
pub enum InputSource {
    /// Token expressions separated by [`DELIMITER`].
    Tokens(String),
    /// A file of literal inputs, one per line.
    File(PathBuf),
    /// Inputs supplied by the caller.
    Supplied(Supplied),
}

impl InputSource {
    /// Interpret an `--input` option: text starting with `[`, `{` or `(` is a
    /// token expression, anything else is a file path.
    ///
    /// # Example
    ///
    /// ```
    /// use diffstress::InputSource;
    ///
    /// assert!(matches!(InputSource::from_option("[1, 10]; {a, b}"), InputSource::Tokens(_)));
    /// assert!(matches!(InputSource::from_option("tests.txt"), InputSource::File(_)));
    /// ```
    pub fn from_option(text: &str) -> InputSource {
        match text.chars().next() {
            Some('[' | '{' | '(') => InputSource::Tokens(text.to_string()),
            _ => InputSource::File(PathBuf::from(text)),
        }
    }

    /// Parse or load this source into a stream of inputs.
    ///
    /// Only token expressions honor `iterations` (`None` is unbounded); files
    /// and supplied inputs are used as they are.
    pub fn into_inputs(self, iterations: Option<usize>, session: Session) -> Result<Inputs> {
        match self {
            InputSource::Tokens(expr) => Inputs::from_tokens(&expr, iterations, session),
            InputSource::File(path) => Inputs::from_file(&path),
            InputSource::Supplied(supplied) => Ok(Inputs::from_supplied(supplied)),
        }
    }
}

impl fmt::Debug for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Tokens(expr) => f.debug_tuple("Tokens").field(expr).finish(),
            InputSource::File(path) => f.debug_tuple("File").field(path).finish(),
            InputSource::Supplied(supplied) => f.debug_tuple("Supplied").field(supplied).finish(),
        }
    }
}

/// Literal inputs supplied by the caller instead of token expressions or a
/// file.
pub enum Supplied {
    /// A finite list, used as-is.
    List(Vec<String>),
    /// A lazy sequence, used as-is.
    Lazy(Box<dyn Iterator<Item = String>>),
}

impl Supplied {
    /// Supply a finite list of inputs.
    pub fn list<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Supplied::List(inputs.into_iter().map(Into::into).collect())
    }

    /// Supply a lazy sequence of inputs.
    pub fn lazy(inputs: impl Iterator<Item = String> + 'static) -> Self {
        Supplied::Lazy(Box::new(inputs))
    }

    /// Accept a dynamically typed input source, as returned from a plugin or
    /// user hook.
    ///
    /// `Vec<String>`, `Vec<&'static str>` and
    /// `Box<dyn Iterator<Item = String>>` are accepted; anything else fails
    /// with [`ConfigType`][crate::ErrorKind::ConfigType].
    ///
    /// # Example
    ///
    /// ```
    /// use diffstress::Supplied;
    ///
    /// let ok = Supplied::from_any(Box::new(vec!["1 2".to_string()]));
    /// assert!(ok.is_ok());
    ///
    /// let err = Supplied::from_any(Box::new(42_u32)).unwrap_err();
    /// assert!(err.is_config_type());
    /// ```
    pub fn from_any(value: Box<dyn Any>) -> Result<Self> {
        let value = match value.downcast::<Vec<String>>() {
            Ok(list) => return Ok(Supplied::List(*list)),
            Err(value) => value,
        };
        let value = match value.downcast::<Vec<&'static str>>() {
            Ok(list) => return Ok(Supplied::list(*list)),
            Err(value) => value,
        };
        match value.downcast::<Box<dyn Iterator<Item = String>>>() {
            Ok(lazy) => Ok(Supplied::Lazy(*lazy)),
            Err(value) => Err(Error::config_type(format!("{:?}", (*value).type_id()))),
        }
    }
}

impl fmt::Debug for Supplied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Supplied::List(list) => f.debug_tuple("List").field(list).finish(),
            Supplied::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// One token and the generator it currently backs.
struct Slot {
    token: Token,
    generator: Generator,
}

impl Slot {
    fn new(token: Token) -> Self {
        let generator = token.generator();
        Slot { token, generator }
    }

    fn draw(&mut self, session: &mut Session) -> Result<String> {
        match session.generate_with(&mut self.generator) {
            Err(e) if e.is_exhausted() && self.generator.shape() == Shape::OneShot => {
                self.generator = self.token.generator();
                session.generate_with(&mut self.generator)
            }
            result => result,
        }
    }
}

enum Kind {
    Tokens {
        slots: Vec<Slot>,
        session: Session,
        remaining: Option<usize>,
    },
    Lines(std::vec::IntoIter<String>),
    Lazy(Box<dyn Iterator<Item = String>>),
}

/// A stream of complete inputs, one per test iteration.
///
/// Inputs are produced on demand and not retained.
///
/// # Example
///
/// ```
/// use diffstress::{Inputs, Session};
///
/// let inputs = Inputs::from_tokens("[1, 3]; {x, y}", Some(4), Session::new())?;
/// let inputs = inputs.collect::<diffstress::Result<Vec<_>>>()?;
///
/// assert_eq!(inputs.len(), 4);
/// for input in &inputs {
///     let (n, c) = input.split_once(' ').unwrap();
///     assert!(["1", "2", "3"].contains(&n));
///     assert!(["x", "y"].contains(&c));
/// }
/// # Ok::<(), diffstress::Error>(())
/// ```
pub struct Inputs {
    kind: Kind,
}

impl Inputs {
    /// Parse [`DELIMITER`]-separated token expressions. Each iteration draws
    /// one value per token, in declaration order, and joins them with single
    /// spaces.
    pub fn from_tokens(expr: &str, iterations: Option<usize>, session: Session) -> Result<Self> {
        let slots = expr
            .split(DELIMITER)
            .map(|text| parse_token(text).map(Slot::new))
            .collect::<Result<Vec<_>>>()?;
        log::debug!(
            target: crate::LOG_TARGET,
            "parsed {} token(s) from `{expr}`",
            slots.len()
        );
        Ok(Inputs {
            kind: Kind::Tokens {
                slots,
                session,
                remaining: iterations,
            },
        })
    }

    /// Read every line of `path` eagerly; each line is one input.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::io(format!("failed to read inputs from {}", path.display()), e))?;
        let lines: Vec<String> = contents.lines().map(str::to_string).collect();
        log::debug!(
            target: crate::LOG_TARGET,
            "read {} input line(s) from {}",
            lines.len(),
            path.display()
        );
        Ok(Inputs {
            kind: Kind::Lines(lines.into_iter()),
        })
    }

    /// Use caller-supplied inputs as they are.
    pub fn from_supplied(supplied: Supplied) -> Self {
        let kind = match supplied {
            Supplied::List(list) => Kind::Lines(list.into_iter()),
            Supplied::Lazy(lazy) => Kind::Lazy(lazy),
        };
        Inputs { kind }
    }

    /// The seed of the session drawing token values, if this stream is
    /// generated from tokens.
    pub fn seed(&self) -> Option<u64> {
        match &self.kind {
            Kind::Tokens { session, .. } => Some(session.current_seed()),
            _ => None,
        }
    }
}

impl Iterator for Inputs {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Result<String>> {
        match &mut self.kind {
            Kind::Tokens {
                slots,
                session,
                remaining,
            } => {
                if let Some(remaining) = remaining {
                    if *remaining == 0 {
                        return None;
                    }
                    *remaining -= 1;
                }
                let values = slots
                    .iter_mut()
                    .map(|slot| slot.draw(session))
                    .collect::<Result<Vec<_>>>();
                Some(values.map(|values| values.join(" ")))
            }
            Kind::Lines(lines) => lines.next().map(Ok),
            Kind::Lazy(lazy) => lazy.next().map(Ok),
        }
    }
}
