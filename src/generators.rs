//! The provided set of [`Generate`] implementations.
//!
//! It is idiomatic to import this module with the alias `g`:
//!
//! ```rust
//! use diffstress::generators as g;
//! ```
//!
//! Range and set generators are unbounded: they produce a value on every
//! call. A [`Repeat`] generator is one-shot: it produces a single composite
//! value and then reports [`ErrorKind::Exhausted`][crate::ErrorKind::Exhausted].

use crate::token::{FloatRange, IntRange, Set};
use crate::{Context, Generate, Result, Shape};

mod combinators;

pub use combinators::*;

/// A generator of integers drawn uniformly from an [`IntRange`].
///
/// See the [`ints`] function to create new instances and for example usage.
#[derive(Clone, Debug)]
pub struct Ints {
    range: IntRange,
}

/// Create a generator of integers in the given range.
///
/// # Example
///
/// ```
/// use diffstress::{generators as g, Generate, IntRange, Session};
///
/// let mut generator = g::ints(IntRange::new(-3, 3)?);
/// let mut session = Session::new();
///
/// let value: i64 = session.generate_with(&mut generator)?;
/// assert!((-3..=3).contains(&value));
/// # Ok::<(), diffstress::Error>(())
/// ```
pub fn ints(range: IntRange) -> Ints {
    Ints { range }
}

impl Generate<i64> for Ints {
    #[inline]
    fn generate(&mut self, context: &mut Context) -> Result<i64> {
        Ok(context
            .rng()
            .gen_inclusive(self.range.lo(), self.range.hi()))
    }
}

impl Generate<String> for Ints {
    #[inline]
    fn generate(&mut self, context: &mut Context) -> Result<String> {
        let value = Generate::<i64>::generate(self, context)?;
        Ok(value.to_string())
    }
}

/// A generator of reals drawn uniformly from `[lo, hi)`.
///
/// See the [`floats`] function to create new instances.
#[derive(Clone, Debug)]
pub struct Floats {
    range: FloatRange,
}

/// Create a generator of reals in the given range.
pub fn floats(range: FloatRange) -> Floats {
    Floats { range }
}

impl Generate<f64> for Floats {
    #[inline]
    fn generate(&mut self, context: &mut Context) -> Result<f64> {
        let (lo, hi) = (self.range.lo(), self.range.hi());
        Ok(lo + context.rng().gen_unit() * (hi - lo))
    }
}

impl Generate<String> for Floats {
    #[inline]
    fn generate(&mut self, context: &mut Context) -> Result<String> {
        let value = Generate::<f64>::generate(self, context)?;
        Ok(format!("{value:?}"))
    }
}

/// A generator that picks one member of a [`Set`] per draw, with
/// replacement.
///
/// See the [`choice`] function to create new instances.
#[derive(Clone, Debug)]
pub struct Choice {
    set: Set,
}

/// Create a generator of members of the given set.
///
/// # Example
///
/// ```
/// use diffstress::{generators as g, Generate, Session, Set};
///
/// let mut generator = g::choice(Set::new(["rock", "paper", "scissors"])?);
/// let mut session = Session::new();
///
/// let value = session.generate_with(&mut generator)?;
/// assert!(["rock", "paper", "scissors"].contains(&value.as_str()));
/// # Ok::<(), diffstress::Error>(())
/// ```
pub fn choice(set: Set) -> Choice {
    Choice { set }
}

impl Generate<String> for Choice {
    #[inline]
    fn generate(&mut self, context: &mut Context) -> Result<String> {
        context
            .rng()
            .choose(self.set.values())
            .cloned()
            .ok_or_else(crate::Error::exhausted)
    }
}

/// The generator for a sequence token: a length from an integer range, then
/// that many elements.
pub type Seq = Repeat<Ints, Box<Generator>>;

/// A generator for any [`Token`][crate::Token].
///
/// Created by [`Token::generator`][crate::Token::generator].
#[derive(Clone, Debug)]
pub enum Generator {
    /// See [`Ints`].
    Ints(Ints),
    /// See [`Floats`].
    Floats(Floats),
    /// See [`Choice`].
    Choice(Choice),
    /// See [`Repeat`].
    Seq(Seq),
}

impl Generate<String> for Generator {
    fn generate(&mut self, context: &mut Context) -> Result<String> {
        match self {
            Generator::Ints(g) => Generate::<String>::generate(g, context),
            Generator::Floats(g) => Generate::<String>::generate(g, context),
            Generator::Choice(g) => g.generate(context),
            Generator::Seq(g) => g.generate(context),
        }
    }

    fn shape(&self) -> Shape {
        match self {
            Generator::Seq(_) => Shape::OneShot,
            _ => Shape::Unbounded,
        }
    }
}
