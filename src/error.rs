use thiserror::Error;

/// Errors that abort a k-means calculation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KMeansError {
    /// Input that can not be clustered at all (empty samples, `k == 0`, malformed value ranges, ...)
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A vector whose length differs from the dimensionality established by the samples
    #[error("dimension mismatch at index {index}: expected {expected} values, found {found}")]
    DimensionMismatch { index: usize, expected: usize, found: usize },
    /// Assignment to a centroid that is not part of the collection
    #[error("argument invalid: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, KMeansError>;

/// Non-fatal conditions of [`CentroidClusters::new`](crate::CentroidClusters::new). The collection
/// returned alongside a warning is still usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClusterWarning {
    #[error("no centroid data, returning empty centroid clusters")]
    NoCentroidData,
    #[error("no cluster data, all {centroids} clusters are empty")]
    NoClusterData { centroids: usize },
    #[error("less data than centroids ({data} < {centroids}), surplus centroids have empty clusters")]
    LessDataThanCentroids { centroids: usize, data: usize },
    #[error("more data than centroids ({data} > {centroids}), excess data ignored")]
    MoreDataThanCentroids { centroids: usize, data: usize },
    #[error("cluster {index}: {dropped} samples without the centroid's {expected} dimensions were dropped")]
    ClusterDimensionMismatch { index: usize, expected: usize, dropped: usize },
    #[error("centroid {index} duplicates centroid {first}")]
    DuplicateCentroid { index: usize, first: usize },
}
