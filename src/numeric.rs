use num::{Float, NumCast};
use rand::distributions::uniform::SampleUniform;
use std::{
    fmt::{Debug, Display, LowerExp},
    iter::Sum,
    ops::{AddAssign, SubAssign},
};

pub trait Primitive: Float + NumCast + SampleUniform + AddAssign + SubAssign + Sum
                + Default + Display + Debug + LowerExp + Send + Sync + 'static {}
impl Primitive for f32 {}
impl Primitive for f64 {}

/// Ordered sequence of values, e.g. one observation or one centroid.
pub type Vector<T> = Vec<T>;
/// Ordered sequence of [`Vector`]s (rows), e.g. the observation set or a set of centroids.
pub type Matrix<T> = Vec<Vector<T>>;

/// Bounds of one dimension, from which random centroid coordinates are drawn (`[min, max)`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueRange<T: Primitive> {
    pub min: T,
    pub max: T,
}
impl<T: Primitive> ValueRange<T> {
    pub fn new(min: T, max: T) -> Self { Self { min, max } }

    /// Range used for dimensions that were not given one: `[0, T::MAX)`.
    pub fn wide() -> Self { Self { min: T::zero(), max: T::max_value() } }

    /// Finite bounds with `min <= max`, whose width is representable as well.
    pub(crate) fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
            && (self.max - self.min).is_finite()
    }
}
impl<T: Primitive> From<(T, T)> for ValueRange<T> {
    fn from((min, max): (T, T)) -> Self { Self::new(min, max) }
}

#[inline(always)]
pub fn square<T: Primitive>(v: T) -> T { v * v }

#[inline(always)]
pub fn abs_diff<T: Primitive>(a: T, b: T) -> T { (a - b).abs() }

/// Arithmetic mean of a sequence of values. `None` for an empty sequence.
pub fn mean<T: Primitive>(values: &[T]) -> Option<T> {
    if values.is_empty() {
        return None;
    }
    let cnt = T::from(values.len())?;
    Some(values.iter().cloned().sum::<T>() / cnt)
}

/// Swap rows and columns. All rows are expected to have the length of the first one.
pub fn transpose<T: Primitive>(matrix: &[Vector<T>]) -> Matrix<T> {
    let dims = matrix.first().map_or(0, |row| row.len());
    (0..dims)
        .map(|d| matrix.iter().map(|row| row[d]).collect())
        .collect()
}

/// Observed per-column `[min, max]` of a matrix.
pub fn value_ranges<T: Primitive>(matrix: &[Vector<T>]) -> Vec<ValueRange<T>> {
    transpose(matrix).into_iter()
        .map(|column| column.into_iter().fold(
            ValueRange::new(T::infinity(), T::neg_infinity()),
            |r, v| ValueRange::new(r.min.min(v), r.max.max(v))))
        .collect()
}
