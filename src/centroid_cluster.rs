use crate::error::{ClusterWarning, KMeansError, Result};
use crate::numeric::*;
use std::ops::Deref;
use tracing::{debug, warn};

/// One centroid, together with the samples currently assigned to it.
#[derive(Clone, Debug, PartialEq)]
pub struct CentroidCluster<T: Primitive> {
    pub centroid: Vector<T>,
    pub cluster: Matrix<T>,
}
impl<T: Primitive> CentroidCluster<T> {
    /// Create a centroid with an empty cluster.
    pub fn new(centroid: Vector<T>) -> Self {
        Self { centroid, cluster: Matrix::new() }
    }

    pub fn is_empty(&self) -> bool { self.cluster.is_empty() }

    /// Coordinate-wise mean of all samples in the cluster, or `None` if the cluster is empty.
    pub fn mean_centroid(&self) -> Option<Vector<T>> {
        if self.cluster.is_empty() {
            return None;
        }
        transpose(&self.cluster).iter()
            .map(|dim| mean(dim))
            .collect()
    }

    fn push(&mut self, index: usize, sample: Vector<T>) -> Result<()> {
        if sample.len() != self.centroid.len() {
            return Err(KMeansError::DimensionMismatch { index, expected: self.centroid.len(), found: sample.len() });
        }
        self.cluster.push(sample);
        Ok(())
    }
}


/// Ordered collection of [`CentroidCluster`]s, one per live centroid.
///
/// A collection holds the cluster assignment of exactly one refinement iteration. It is built from
/// the current centroids, filled by the assignment step and consumed by [`CentroidClusters::into_centroids`].
///
/// Equality is set equality: two collections are equal, if every entry of one matches a distinct
/// entry of the other, regardless of their order.
#[derive(Clone, Debug, Default)]
pub struct CentroidClusters<T: Primitive>(Vec<CentroidCluster<T>>);

impl<T: Primitive> CentroidClusters<T> {
    /// Bulk constructor, pairing each centroid with the data partition at the same position.
    ///
    /// The result always contains exactly one entry per centroid. Problems with the input are not fatal,
    /// every one of them is reported as a [`ClusterWarning`]:
    /// - surplus centroids get an empty cluster, excess partitions are ignored
    /// - samples whose dimensionality differs from their centroid's are dropped
    /// - centroids equal to an earlier one are kept, but reported
    pub fn new(centroids: Matrix<T>, data: Option<Vec<Matrix<T>>>) -> (Self, Vec<ClusterWarning>) {
        let centroid_cnt = centroids.len();
        let mut warnings = Vec::new();
        let mut ccs: Vec<_> = centroids.into_iter().map(CentroidCluster::new).collect();

        for (index, cc) in ccs.iter().enumerate() {
            if let Some(first) = ccs[..index].iter().position(|other| other.centroid == cc.centroid) {
                warnings.push(ClusterWarning::DuplicateCentroid { index, first });
            }
        }

        match data {
            _ if centroid_cnt == 0 => warnings.push(ClusterWarning::NoCentroidData),
            None => warnings.push(ClusterWarning::NoClusterData { centroids: centroid_cnt }),
            Some(data) => {
                let data_cnt = data.len();
                for (index, (cc, mut cluster)) in ccs.iter_mut().zip(data).enumerate() {
                    let expected = cc.centroid.len();
                    let before = cluster.len();
                    cluster.retain(|sample| sample.len() == expected);
                    if cluster.len() != before {
                        warnings.push(ClusterWarning::ClusterDimensionMismatch { index, expected, dropped: before - cluster.len() });
                    }
                    cc.cluster = cluster;
                }
                if data_cnt < centroid_cnt {
                    warnings.push(ClusterWarning::LessDataThanCentroids { centroids: centroid_cnt, data: data_cnt });
                } else if data_cnt > centroid_cnt {
                    warnings.push(ClusterWarning::MoreDataThanCentroids { centroids: centroid_cnt, data: data_cnt });
                }
            }
        }
        for warning in &warnings {
            warn!(%warning, "incomplete centroid cluster construction");
        }
        (Self(ccs), warnings)
    }

    /// Pair every centroid with an empty cluster, as done at the start of each refinement iteration.
    pub fn with_centroids(centroids: Matrix<T>) -> Self {
        Self(centroids.into_iter().map(CentroidCluster::new).collect())
    }

    /// Remove the entry at `index`, moving the last entry into its place.
    pub fn delete(&mut self, index: usize) -> Option<CentroidCluster<T>> {
        if index < self.0.len() {
            Some(self.0.swap_remove(index))
        } else {
            None
        }
    }

    /// Append `sample` to the cluster of the first entry whose centroid equals `centroid`.
    pub fn assign_single(&mut self, centroid: &[T], sample: Vector<T>) -> Result<()> {
        match self.0.iter().position(|cc| cc.centroid == centroid) {
            Some(idx) => self.0[idx].push(idx, sample),
            None => Err(KMeansError::InvalidArgument(
                format!("centroid {:?} not found in centroid clusters", centroid))),
        }
    }

    /// Append `sample` to the cluster of the entry at `idx`.
    pub fn assign_at(&mut self, idx: usize, sample: Vector<T>) -> Result<()> {
        let len = self.0.len();
        match self.0.get_mut(idx) {
            Some(cc) => cc.push(idx, sample),
            None => Err(KMeansError::InvalidArgument(
                format!("centroid index {} out of range for {} centroid clusters", idx, len))),
        }
    }

    /// Amount of samples in each cluster
    pub fn frequencies(&self) -> Vec<usize> {
        self.0.iter().map(|cc| cc.cluster.len()).collect()
    }

    /// Update step: replace every centroid by the mean of its cluster.
    /// Centroids with an empty cluster are dropped, so the result may contain fewer rows than `self`.
    pub fn into_centroids(self) -> Matrix<T> {
        let before = self.0.len();
        let centroids: Matrix<T> = self.0.iter().filter_map(|cc| cc.mean_centroid()).collect();
        if centroids.len() != before {
            debug!(dropped = before - centroids.len(), live = centroids.len(), "dropped centroids with empty clusters");
        }
        centroids
    }
}

impl<T: Primitive> AsRef<[T]> for CentroidCluster<T> {
    fn as_ref(&self) -> &[T] { &self.centroid }
}

impl<T: Primitive> Deref for CentroidClusters<T> {
    type Target = [CentroidCluster<T>];
    fn deref(&self) -> &Self::Target { &self.0 }
}

impl<T: Primitive> From<Vec<CentroidCluster<T>>> for CentroidClusters<T> {
    fn from(ccs: Vec<CentroidCluster<T>>) -> Self { Self(ccs) }
}

impl<T: Primitive> PartialEq for CentroidClusters<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.0.len() != other.0.len() {
            return false;
        }
        let mut matched = vec![false; other.0.len()];
        self.0.iter().all(|cc| {
            match other.0.iter().enumerate().position(|(i, occ)| !matched[i] && cc == occ) {
                Some(i) => { matched[i] = true; true },
                None => false
            }
        })
    }
}
