//! Shape recognizers for token expressions.
//!
//! Each recognizer answers `None` when the text does not have its outer
//! shape, and `Some(Err(_))` when it does but the contents are invalid.
//! Recognizers are tried in a fixed order and the first one that claims the
//! text decides the result.

use super::{Bound, Element, FloatRange, IntRange, Sequence, Set, Token};
use crate::{Error, Result};

type Recognizer = fn(&str) -> Option<Result<Token>>;

const RECOGNIZERS: &[(&str, Recognizer)] = &[
    ("integer range", int_range),
    ("float range", float_range),
    ("set", set),
    ("sequence", sequence),
];

const SEQUENCE_LENGTH: &str = ", len=";

/// Parse one token expression.
///
/// The recognized shapes, in precedence order, are integer ranges, float
/// ranges, sets, and sequences of a range or set.
///
/// # Example
///
/// ```
/// use diffstress::{parse_token, Token};
///
/// let token = parse_token("(0, 10]")?;
/// match token {
///     Token::IntRange(range) => assert_eq!((range.lo(), range.hi()), (1, 10)),
///     _ => unreachable!(),
/// }
///
/// assert!(parse_token("not-a-token").unwrap_err().is_grammar());
/// # Ok::<(), diffstress::Error>(())
/// ```
pub fn parse_token(text: &str) -> Result<Token> {
    for (name, recognize) in RECOGNIZERS {
        if let Some(result) = recognize(text) {
            log::trace!(target: crate::LOG_TARGET, "`{text}` recognized as {name}");
            return result;
        }
    }
    Err(Error::grammar(
        text,
        "expected `[a, b]`, `{v1, v2, ...}` or `[<range-or-set>, len=[a, b]]`",
    ))
}

struct Number<'a> {
    text: &'a str,
    real: bool,
}

/// Lex `-?\d+(\.\d*)?`.
fn number(text: &str) -> Option<Number<'_>> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let (int, frac) = match digits.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (digits, None),
    };
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if int.is_empty() || !is_digits(int) || !frac.map_or(true, is_digits) {
        return None;
    }
    Some(Number {
        text,
        real: frac.is_some(),
    })
}

struct RawRange<'a> {
    lo: Number<'a>,
    lo_bound: Bound,
    hi: Number<'a>,
    hi_bound: Bound,
}

fn raw_range(text: &str) -> Option<RawRange<'_>> {
    let lo_bound = match text.chars().next()? {
        '[' => Bound::Inclusive,
        '(' => Bound::Exclusive,
        _ => return None,
    };
    let hi_bound = match text.chars().last()? {
        ']' => Bound::Inclusive,
        ')' => Bound::Exclusive,
        _ => return None,
    };
    let inner = text.get(1..text.len().checked_sub(1)?)?;
    let (lo, hi) = inner.split_once(',')?;
    Some(RawRange {
        lo: number(lo.trim())?,
        lo_bound,
        hi: number(hi.trim())?,
        hi_bound,
    })
}

fn parse_int(text: &str) -> Result<i64> {
    text.parse()
        .map_err(|_| Error::grammar(text, "integer bound does not fit in 64 bits"))
}

fn parse_float(text: &str) -> Result<f64> {
    text.parse()
        .map_err(|_| Error::grammar(text, "not a real number"))
}

fn int_range(text: &str) -> Option<Result<Token>> {
    let raw = raw_range(text)?;
    if raw.lo.real || raw.hi.real {
        return None;
    }
    Some(resolve_int_range(text, &raw).map(Token::IntRange))
}

fn resolve_int_range(text: &str, raw: &RawRange<'_>) -> Result<IntRange> {
    let lo = parse_int(raw.lo.text)?;
    let hi = parse_int(raw.hi.text)?;
    IntRange::from_bounds(lo, raw.lo_bound, hi, raw.hi_bound)
        .ok_or_else(|| Error::grammar(text, "the range contains no integers"))
}

fn float_range(text: &str) -> Option<Result<Token>> {
    let raw = raw_range(text)?;
    if !raw.lo.real && !raw.hi.real {
        return None;
    }
    Some(resolve_float_range(text, &raw).map(Token::FloatRange))
}

fn resolve_float_range(text: &str, raw: &RawRange<'_>) -> Result<FloatRange> {
    let lo = parse_float(raw.lo.text)?;
    let hi = parse_float(raw.hi.text)?;
    FloatRange::new(lo, hi).map_err(|e| match e.kind() {
        crate::ErrorKind::Grammar { reason, .. } => Error::grammar(text, *reason),
        _ => e,
    })
}

fn set(text: &str) -> Option<Result<Token>> {
    let inner = text.strip_prefix('{')?.strip_suffix('}')?;
    Some(resolve_set(text, inner).map(Token::Set))
}

fn resolve_set(text: &str, inner: &str) -> Result<Set> {
    if inner.is_empty() {
        return Err(Error::grammar(text, "a set must have at least one member"));
    }
    let members: Vec<&str> = inner.split(", ").collect();
    if members.iter().any(|m| m.is_empty()) {
        return Err(Error::grammar(text, "set members must not be empty"));
    }
    Set::new(members)
}

fn sequence(text: &str) -> Option<Result<Token>> {
    let inner = text.strip_prefix('[')?.strip_suffix(']')?;
    let split = inner.rfind(SEQUENCE_LENGTH)?;
    let element = &inner[..split];
    let length = &inner[split + SEQUENCE_LENGTH.len()..];
    Some(resolve_sequence(element, length).map(Token::Sequence))
}

fn resolve_sequence(element: &str, length: &str) -> Result<Sequence> {
    let length = match int_range(length) {
        Some(Ok(Token::IntRange(range))) => range,
        Some(Err(e)) => return Err(e),
        _ => {
            return Err(Error::grammar(
                length,
                "a sequence length must be an integer range",
            ))
        }
    };

    // Sequences do not nest.
    let element = match [int_range, float_range, set]
        .iter()
        .find_map(|recognize| recognize(element))
    {
        Some(Ok(Token::IntRange(range))) => Element::Int(range),
        Some(Ok(Token::FloatRange(range))) => Element::Float(range),
        Some(Ok(Token::Set(set))) => Element::Set(set),
        Some(Err(e)) => return Err(e),
        _ => {
            return Err(Error::grammar(
                element,
                "a sequence element must be a range or a set",
            ))
        }
    };

    Sequence::new(length, element)
}
