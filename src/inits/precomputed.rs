use crate::error::{KMeansError, Result};
use crate::numeric::*;
use crate::{KMeans, KMeansState};

#[inline(always)]
pub fn calculate<T: Primitive>(kmean: &KMeans<T>, state: &mut KMeansState<T>, computed: &[Vector<T>]) -> Result<()> {
    if computed.is_empty() || computed.len() > state.k {
        return Err(KMeansError::InvalidInput(
            format!("initialized with {} centroids, expected between 1 and k = {}", computed.len(), state.k)));
    }
    if let Some((index, c)) = computed.iter().enumerate().find(|(_, c)| c.len() != kmean.sample_dims) {
        return Err(KMeansError::DimensionMismatch { index, expected: kmean.sample_dims, found: c.len() });
    }
    state.centroids = computed.to_vec();
    Ok(())
}
