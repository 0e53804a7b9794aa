use super::*;
use crate::Error;

/// A one-shot generator combinator: draws a count from one generator, then
/// that many values from another, and joins them with single spaces.
///
/// See the [`repeat`] function for details and example usage.
#[derive(Clone, Debug)]
pub struct Repeat<L, E> {
    pub(crate) length: L,
    pub(crate) element: E,
    exhausted: bool,
}

/// Create a generator that yields exactly one space-joined run of `element`
/// values, whose count is drawn from `length`.
///
/// Further calls fail with [`Exhausted`][crate::ErrorKind::Exhausted]; create
/// a new `Repeat` to draw again.
///
/// # Example
///
/// ```
/// use diffstress::{generators as g, Generate, IntRange, Session};
///
/// let mut generator = g::repeat(
///     g::ints(IntRange::new(2, 2)?),
///     g::ints(IntRange::new(1, 3)?),
/// );
/// let mut session = Session::new();
///
/// let value: String = session.generate_with(&mut generator)?;
/// assert_eq!(value.split(' ').count(), 2);
///
/// let again: diffstress::Result<String> = session.generate_with(&mut generator);
/// assert!(again.unwrap_err().is_exhausted());
/// # Ok::<(), diffstress::Error>(())
/// ```
pub fn repeat<L, E>(length: L, element: E) -> Repeat<L, E> {
    Repeat {
        length,
        element,
        exhausted: false,
    }
}

impl<L, E> Generate<String> for Repeat<L, E>
where
    L: Generate<i64>,
    E: Generate<String>,
{
    fn generate(&mut self, context: &mut Context) -> Result<String> {
        if self.exhausted {
            return Err(Error::exhausted());
        }
        let length = self.length.generate(context)?;
        let length = usize::try_from(length)
            .map_err(|_| Error::other(format!("negative sequence length {length}")))?;

        let mut values = Vec::new();
        for _ in 0..length {
            values.push(self.element.generate(context)?);
        }
        self.exhausted = true;
        Ok(values.join(" "))
    }

    fn shape(&self) -> Shape {
        Shape::OneShot
    }
}

impl<G, T> Generate<T> for Box<G>
where
    G: Generate<T> + ?Sized,
{
    #[inline]
    fn generate(&mut self, context: &mut Context) -> Result<T> {
        Generate::<T>::generate(&mut **self, context)
    }

    #[inline]
    fn shape(&self) -> Shape {
        Generate::<T>::shape(&**self)
    }
}
