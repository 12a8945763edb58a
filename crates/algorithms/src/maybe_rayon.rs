//! Row-parallel iteration that degrades to plain iterators.
//!
//! With the `parallel` feature the raster filters fan rows out over
//! rayon's pool. Without it, `into_par_iter()` is an alias for
//! `into_iter()` so the same call chains compile sequentially.

#[cfg(feature = "parallel")]
pub(crate) use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    pub(crate) trait IntoParallelIterator {
        type Iter: Iterator<Item = Self::Item>;
        type Item;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Iter = I::IntoIter;
        type Item = I::Item;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(not(feature = "parallel"))]
pub(crate) use sequential::*;
