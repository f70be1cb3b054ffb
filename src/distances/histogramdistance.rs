use crate::{DistanceFunction, Primitive};

/// L1 distance between the cumulative distributions of two histograms (1D earth mover's distance).
/// Both vectors are expected to hold the same amount of bins.
#[derive(Clone, Copy, Debug, Default)]
pub struct HistogramDistance;

impl<T: Primitive> DistanceFunction<T> for HistogramDistance {
    #[inline(always)]
    fn distance(&self, a: &[T], b: &[T]) -> T {
        debug_assert_eq!(a.len(), b.len());
        let mut total = T::zero();
        let mut cdf_a = T::zero();
        let mut cdf_b = T::zero();
        for (&x, &y) in a.iter().zip(b.iter()) {
            cdf_a += x;
            cdf_b += y;
            total += (cdf_a - cdf_b).abs();
        }
        total
    }
}
