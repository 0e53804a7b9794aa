//! The token model: parsed descriptions of one randomizable value slot.
//!
//! A token is parsed once from its textual form with [`parse_token`] (or
//! `str::parse::<Token>()`), and then acts as the factory for its
//! [`Generator`]. See [the token syntax guide][crate::_guide::token_syntax]
//! for the accepted notation.

use crate::generators::{self as g, Generator};
use crate::{Error, Result, Shape};
use std::fmt;
use std::str::FromStr;

mod parse;

pub use parse::parse_token;

/// Whether one side of a range includes its endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bound {
    /// `[` or `]`.
    Inclusive,
    /// `(` or `)`.
    Exclusive,
}

/// An integer range, always stored as a closed interval `lo..=hi`.
///
/// # Example
///
/// ```
/// use diffstress::{Bound, IntRange};
///
/// let range = IntRange::from_bounds(0, Bound::Exclusive, 10, Bound::Exclusive).unwrap();
/// assert_eq!((range.lo(), range.hi()), (1, 9));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IntRange {
    lo: i64,
    hi: i64,
}

impl IntRange {
    /// Create the closed range `lo..=hi`.
    ///
    /// Fails when the range is empty.
    pub fn new(lo: i64, hi: i64) -> Result<Self> {
        if lo > hi {
            return Err(Error::grammar(format!("[{lo}, {hi}]"), "the range is empty"));
        }
        Ok(Self { lo, hi })
    }

    /// Resolve a range with independently open or closed sides to its closed
    /// form.
    ///
    /// Returns `None` if the resolved range is empty or an exclusive bound
    /// sits at the edge of `i64`.
    pub fn from_bounds(lo: i64, lo_bound: Bound, hi: i64, hi_bound: Bound) -> Option<Self> {
        let lo = match lo_bound {
            Bound::Inclusive => lo,
            Bound::Exclusive => lo.checked_add(1)?,
        };
        let hi = match hi_bound {
            Bound::Inclusive => hi,
            Bound::Exclusive => hi.checked_sub(1)?,
        };
        (lo <= hi).then_some(Self { lo, hi })
    }

    /// The smallest value in the range.
    pub fn lo(&self) -> i64 {
        self.lo
    }

    /// The largest value in the range.
    pub fn hi(&self) -> i64 {
        self.hi
    }

    /// Whether `value` lies in the range.
    pub fn contains(&self, value: i64) -> bool {
        self.lo <= value && value <= self.hi
    }
}

impl fmt::Display for IntRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}

/// A real-valued range. Values are drawn from `[lo, hi)` whatever brackets
/// were written.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloatRange {
    lo: f64,
    hi: f64,
}

impl FloatRange {
    /// Create the range `lo..hi`.
    ///
    /// Fails when `lo > hi` or either bound is not finite.
    pub fn new(lo: f64, hi: f64) -> Result<Self> {
        if !lo.is_finite() || !hi.is_finite() {
            return Err(Error::grammar(format!("[{lo:?}, {hi:?}]"), "bounds must be finite"));
        }
        if lo > hi {
            return Err(Error::grammar(format!("[{lo:?}, {hi:?}]"), "the range is empty"));
        }
        Ok(Self { lo, hi })
    }

    /// The lower bound.
    pub fn lo(&self) -> f64 {
        self.lo
    }

    /// The upper bound.
    pub fn hi(&self) -> f64 {
        self.hi
    }
}

impl fmt::Display for FloatRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}, {:?})", self.lo, self.hi)
    }
}

/// A non-empty set of literal strings.
///
/// Duplicates are dropped; the first occurrence keeps its position so that
/// seeded runs draw the same values.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Set {
    values: Vec<String>,
}

impl Set {
    /// Create a set from its members.
    ///
    /// Fails when there are no members.
    pub fn new<I, S>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for value in values {
            let value = value.into();
            if !unique.contains(&value) {
                unique.push(value);
            }
        }
        if unique.is_empty() {
            return Err(Error::grammar("{}", "a set must have at least one member"));
        }
        Ok(Self { values: unique })
    }

    /// The members, in declaration order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Whether `value` is a member.
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

impl fmt::Display for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.values.join(", "))
    }
}

/// The element shape of a [`Sequence`].
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    /// Integers from a range.
    Int(IntRange),
    /// Reals from a range.
    Float(FloatRange),
    /// Members of a set.
    Set(Set),
}

impl Element {
    fn generator(&self) -> Generator {
        match self {
            Element::Int(range) => Generator::Ints(g::ints(*range)),
            Element::Float(range) => Generator::Floats(g::floats(*range)),
            Element::Set(set) => Generator::Choice(g::choice(set.clone())),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Int(range) => range.fmt(f),
            Element::Float(range) => range.fmt(f),
            Element::Set(set) => set.fmt(f),
        }
    }
}

/// A length drawn from an integer range, followed by that many elements.
#[derive(Clone, Debug, PartialEq)]
pub struct Sequence {
    length: IntRange,
    element: Element,
}

impl Sequence {
    /// Create a sequence token.
    ///
    /// Fails when `length` admits negative values.
    pub fn new(length: IntRange, element: Element) -> Result<Self> {
        if length.lo() < 0 {
            return Err(Error::grammar(
                format!("len={length}"),
                "a sequence length must be non-negative",
            ));
        }
        Ok(Self { length, element })
    }

    /// The range the length is drawn from.
    pub fn length(&self) -> IntRange {
        self.length
    }

    /// The shape of each element.
    pub fn element(&self) -> &Element {
        &self.element
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, len={}]", self.element, self.length)
    }
}

/// One parsed token expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// `[a, b]`, `(a, b)`, `[a, b)` or `(a, b]` with integer bounds.
    IntRange(IntRange),
    /// The same bracket syntax with a decimal point on at least one side.
    FloatRange(FloatRange),
    /// `{v1, v2, ...}`.
    Set(Set),
    /// `[<range-or-set>, len=<int-range>]`.
    Sequence(Sequence),
}

impl Token {
    /// Create a fresh generator for this token.
    ///
    /// Each call returns an independent generator; this is the only way to
    /// restart a one-shot [`Sequence`] generator.
    ///
    /// # Example
    ///
    /// ```
    /// use diffstress::{parse_token, Generate, Session};
    ///
    /// let token = parse_token("{heads, tails}")?;
    /// let mut generator = token.generator();
    /// let mut session = Session::new().seed(7);
    ///
    /// for _ in 0..10 {
    ///     let value = session.generate_with(&mut generator)?;
    ///     assert!(value == "heads" || value == "tails");
    /// }
    /// # Ok::<(), diffstress::Error>(())
    /// ```
    pub fn generator(&self) -> Generator {
        match self {
            Token::IntRange(range) => Generator::Ints(g::ints(*range)),
            Token::FloatRange(range) => Generator::Floats(g::floats(*range)),
            Token::Set(set) => Generator::Choice(g::choice(set.clone())),
            Token::Sequence(seq) => Generator::Seq(g::repeat(
                g::ints(seq.length()),
                Box::new(seq.element().generator()),
            )),
        }
    }

    /// Whether this token's generators are unbounded or one-shot.
    pub fn shape(&self) -> Shape {
        match self {
            Token::Sequence(_) => Shape::OneShot,
            _ => Shape::Unbounded,
        }
    }
}

impl FromStr for Token {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_token(s)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::IntRange(range) => range.fmt(f),
            Token::FloatRange(range) => range.fmt(f),
            Token::Set(set) => set.fmt(f),
            Token::Sequence(seq) => seq.fmt(f),
        }
    }
}
