//! A thin-but-stable wrapper over `rand::rngs::SmallRng` that provides the
//! handful of draws our generators need.

use rand::{rngs::SmallRng, Rng as _, SeedableRng};

/// A pseudorandom number generator.
///
/// Not cryptographically secure.
///
/// You can attain a reference to an `Rng` via the
/// [`Context::rng`][crate::Context::rng] method.
#[derive(Clone, Debug)]
pub struct Rng {
    inner: SmallRng,
}

impl Rng {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            inner: SmallRng::seed_from_u64(seed),
        }
    }

    /// Generate a random `usize` in the range `0..len`.
    ///
    /// If `len` is `0`, then `None` is returned.
    #[inline]
    pub fn gen_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.inner.gen_range(0..len))
    }

    /// Choose a random element from a slice.
    ///
    /// If the slice is empty, then `None` is returned.
    #[inline]
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        let idx = self.gen_index(items.len())?;
        items.get(idx)
    }

    /// Generate a random `i64` uniformly from the inclusive range `lo..=hi`.
    ///
    /// The caller guarantees `lo <= hi`.
    #[inline]
    pub fn gen_inclusive(&mut self, lo: i64, hi: i64) -> i64 {
        debug_assert!(lo <= hi);
        self.inner.gen_range(lo..=hi)
    }

    /// Generate a random `f64` uniformly from `[0, 1)`.
    #[inline]
    pub fn gen_unit(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }
}
