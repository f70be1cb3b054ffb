use crate::centroid_cluster::CentroidClusters;
use crate::error::{KMeansError, Result};
use crate::{KMeans, KMeansState, KMeansConfig, numeric::*};
use rand::RngCore;
use tracing::{debug, info};

pub(crate) struct Lloyd<T: Primitive> {
	_p: std::marker::PhantomData<T>
}
impl<T: Primitive> Lloyd<T> {
    /// Id of every centroid in the next iteration, for centroids that keep at least one sample.
    fn live_centroid_ids(centroid_frequency: &[usize]) -> Vec<usize> {
        let mut next_id = 0;
        centroid_frequency.iter().map(|&freq| {
            let id = next_id;
            if freq > 0 {
                next_id += 1;
            }
            id
        }).collect()
    }

    fn validate_init(data: &KMeans<T>, state: &KMeansState<T>) -> Result<()> {
        if state.centroids.is_empty() || state.centroids.len() > state.k {
            return Err(KMeansError::InvalidInput(
                format!("initialization produced {} centroids for k = {}", state.centroids.len(), state.k)));
        }
        match state.centroids.iter().enumerate().find(|(_, c)| c.len() != data.sample_dims) {
            Some((index, c)) => Err(KMeansError::DimensionMismatch { index, expected: data.sample_dims, found: c.len() }),
            None => Ok(())
        }
    }

    /// Recalculate assignments and distances against the final centroids.
    /// Centroids that are left without samples are dropped here as well.
    fn update_centroid_distances(data: &KMeans<T>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<()> {
        let nearest = data.nearest_centroids(&state.centroids, config.distance())?;
        let mut centroid_frequency = vec![0usize; state.centroids.len()];
        nearest.iter().for_each(|&(idx, _)| centroid_frequency[idx] += 1);

        let live_ids = Self::live_centroid_ids(&centroid_frequency);
        if centroid_frequency.contains(&0) {
            let mut frequency = centroid_frequency.iter();
            state.centroids.retain(|_| frequency.next().map_or(false, |&freq| freq > 0));
            debug!(attempt = state.attempt, live = state.centroids.len(), "dropped final centroids without samples");
        }
        state.centroid_frequency = centroid_frequency.into_iter().filter(|&freq| freq > 0).collect();
        state.distsum = nearest.iter().map(|&(_, dist)| dist).sum();
        state.assignments = nearest.into_iter().map(|(idx, _)| live_ids[idx]).collect();
        Ok(())
    }

    pub fn calculate<F>(data: &KMeans<T>, k: usize, attempt: usize, init: &F, config: &KMeansConfig<'_, T>, rnd: &mut dyn RngCore) -> Result<KMeansState<T>>
                where F: Fn(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'_, T>, &mut dyn RngCore) -> Result<()> {
        if k == 0 {
            return Err(KMeansError::InvalidInput("k has to be at least 1".into()));
        }
        let mut state = KMeansState::new(data.sample_cnt, data.sample_dims, k, attempt);

        // Initialize clusters and notify subscriber
        init(data, &mut state, config, rnd)?;
        Self::validate_init(data, &state)?;
        (config.init_done)(&state);
        let mut abort_strategy = config.abort_strategy.create_logic();

        for i in 1..=config.max_iter {
            let mut clusters = CentroidClusters::with_centroids(std::mem::take(&mut state.centroids));
            let (assignments, new_distsum) = data.update_cluster_assignments(&mut clusters, config.distance())?;

            // state.assignments holds the previous iteration's labels, already mapped to the current centroids
            let reassigned = if i == 1 {
                data.sample_cnt
            } else {
                state.assignments.iter().zip(assignments.iter()).filter(|(prev, cur)| prev != cur).count()
            };

            let centroid_frequency = clusters.frequencies();
            let live_ids = Self::live_centroid_ids(&centroid_frequency);
            state.centroids = clusters.into_centroids();
            state.assignments = assignments.into_iter().map(|a| live_ids[a]).collect();
            state.centroid_frequency = centroid_frequency.into_iter().filter(|&freq| freq > 0).collect();
            state.iterations = i;
            debug!(attempt, iteration = i, distsum = %new_distsum, reassigned, live = state.centroids.len(), "iteration done");

			// Notify subscriber about finished iteration
			(config.iteration_done)(&state, i, new_distsum);
            state.distsum = new_distsum;
            if !abort_strategy.next(new_distsum, reassigned) {
                break;
            }
        }

        Self::update_centroid_distances(data, &mut state, config)?;
        info!(attempt, iterations = state.iterations, distsum = %state.distsum, centroids = state.centroids.len(), "attempt done");
        Ok(state)
    }
}
