use crate::numeric::{abs_diff, square};
use crate::{DistanceFunction, Primitive};

/// Sum of squared differences between two vectors of equal length (default distance).
#[derive(Clone, Copy, Debug, Default)]
pub struct SumSquaredDistance;

impl<T: Primitive> DistanceFunction<T> for SumSquaredDistance {
    #[inline(always)]
    fn distance(&self, a: &[T], b: &[T]) -> T {
        debug_assert_eq!(a.len(), b.len());
        a.iter().zip(b.iter())
            .map(|(&av, &bv)| square(abs_diff(av, bv)))
            .sum()
    }
}
