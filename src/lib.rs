//! # kmeans-restarts - API documentation
//!
//! Small rust library for k-means clustering, using Lloyd's algorithm with multiple randomized
//! restarts to reduce the sensitivity to the initial centroid placement.
//!
//! ## Design target
//! Samples are given as plain nested vectors (`Vec<Vec<T>>`), instead of any high-level
//! arithmetics / matrix crate such as nalgebra or ndarray. Every restart ("attempt") runs as
//! an independent task on the rayon thread-pool, and the nearest-centroid search within an attempt
//! is parallelized over the samples.
//!
//! ## Supported centroid initializations
//! The outcome of each attempt depends on the initialization of its centroids. For a list of
//! implemented initialization methods, see [`KMeans`].
//!
//! ## Supported primitive types
//! - [`f32`]
//! - [`f64`]
//!
//! ## Example
//! ```rust
//! use kmeans_restarts::*;
//!
//! fn main() {
//!     let (sample_cnt, sample_dims, k) = (2000, 20, 4);
//!
//!     // Generate some random data
//!     let samples: Vec<Vec<f64>> = (0..sample_cnt)
//!         .map(|_| (0..sample_dims).map(|_| rand::random()).collect())
//!         .collect();
//!
//!     // Calculate kmeans, using random centroids within the samples' value ranges
//!     let result = kmeans(samples, k, &KMeansConfig::default()).unwrap();
//!     let best = result.best().unwrap();
//!
//!     println!("Centroids: {:?}", best.centroids);
//!     println!("Cluster-Assignments: {:?}", best.assignments);
//!     println!("Error: {}", best.distsum);
//! }
//! ```
//!
//! ## Example (using the status event callbacks)
//! ```rust
//! use kmeans_restarts::*;
//!
//! fn main() {
//!     let (sample_cnt, sample_dims, k) = (2000, 20, 4);
//!
//!     // Generate some random data
//!     let samples: Vec<Vec<f32>> = (0..sample_cnt)
//!         .map(|_| (0..sample_dims).map(|_| rand::random()).collect())
//!         .collect();
//!
//!     let conf = KMeansConfig::build()
//!         .tries(8)
//!         .max_iter(250)
//!         .abort_strategy(AbortStrategy::NoImprovement { threshold: 0.0005 })
//!         .init_done(&|s| println!("Attempt {}: initialization completed.", s.attempt))
//!         .iteration_done(&|s, nr, new_distsum|
//!             println!("Attempt {} / Iteration {} - Error: {:.2} -> {:.2} | Improvement: {:.2}",
//!                 s.attempt, nr, s.distsum, new_distsum, s.distsum - new_distsum))
//!         .build();
//!
//!     let kmean = KMeans::new(samples).unwrap();
//!     let result = kmean.kmeans_lloyd(k, KMeans::init_random_range, &conf).unwrap();
//!
//!     for attempt in &result.attempts {
//!         println!("Attempt {}: {} iterations, error {}", attempt.attempt, attempt.iterations, attempt.distsum);
//!     }
//! }
//! ```
//!
//! ## Short API-Overview / Description
//! Entry-point of the library is the [`KMeans`] struct. This struct is generic over the underlying primitive
//! type, that should be used for the calculations. To use KMeans, an instance of this struct is created, taking
//! over the sample data into its ownership. The samples are validated once: at least one sample, at least one
//! dimension, the same dimensionality for every sample and only finite values.
//!
//! Calling [`KMeans::kmeans_lloyd`] does not mutate the struct. It runs `tries` attempts concurrently, each
//! starting from its own random centroids, and returns a [`KMeansResult`] holding the final [`KMeansState`]
//! of every attempt. [`KMeansResult::best`] picks the attempt with the lowest total distance.
//!
//! Centroids that lose all of their samples during an iteration are dropped, so an attempt may end with
//! fewer than **k** centroids.
//!
//! All failures are reported as [`KMeansError`]. Logging goes through the [`tracing`](https://docs.rs/tracing)
//! facade; install a subscriber to see it.

#[macro_use] mod helpers;
mod numeric;
mod error;
mod api;
mod centroid_cluster;
mod abort_strategy;
mod distances {
    pub mod sumsquareddistance;
    pub mod histogramdistance;
}
mod inits {
    pub mod randomrange;
    pub mod precomputed;
}
mod variants {
    mod lloyd;
    mod restarts;
    pub(crate) use lloyd::Lloyd;
    pub(crate) use restarts::Restarts;
}

pub use abort_strategy::AbortStrategy;
pub use api::{DistanceFunction, KMeans, KMeansConfig, KMeansConfigBuilder, KMeansResult, KMeansState,
    InitDoneCallbackFn, IterationDoneCallbackFn, DEFAULT_MAX_ITER, DEFAULT_TRIES};
pub use centroid_cluster::{CentroidCluster, CentroidClusters};
pub use distances::histogramdistance::HistogramDistance;
pub use distances::sumsquareddistance::SumSquaredDistance;
pub use error::{ClusterWarning, KMeansError, Result};
pub use inits::randomrange::create_centroids;
pub use numeric::{abs_diff, mean, square, transpose, value_ranges, Matrix, Primitive, ValueRange, Vector};

/// Cluster **samples** into **k** groups, using [`KMeans::kmeans_lloyd`] with random centroids
/// within the configured (or observed) value ranges.
///
/// ## Returns
/// The final state of every attempt, see [`KMeansResult::best`] for the one with the lowest error.
pub fn kmeans<T: Primitive>(samples: Matrix<T>, k: usize, config: &KMeansConfig<'_, T>) -> Result<KMeansResult<T>> {
    KMeans::new(samples)?.kmeans_lloyd(k, KMeans::init_random_range, config)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::testing::assert_centroids_match;
    use rand::prelude::*;

    #[test]
    fn two_clusters() {
        let samples = vec![vec![0.0f64, 0.0], vec![0.0, 1.0], vec![10.0, 10.0], vec![10.0, 11.0]];
        let conf = KMeansConfig::build()
            .tries(20)
            .max_iter(10)
            .random_generator(StdRng::seed_from_u64(1337))
            .build();

        let best = kmeans(samples, 2, &conf).unwrap().into_best().unwrap();
        assert_centroids_match(&[vec![0.0, 0.5], vec![10.0, 10.5]], &best.centroids, 1e-12);
        assert_approx_eq!(best.distsum, 1.0, 1e-12);
        assert_eq!(best.assignments[0], best.assignments[1]);
        assert_eq!(best.assignments[2], best.assignments[3]);
        assert_ne!(best.assignments[0], best.assignments[2]);
        assert_eq!(best.centroid_frequency, vec![2, 2]);
    }

    #[test]
    fn restarts_are_independent() {
        let mut rnd = StdRng::seed_from_u64(42);
        let samples: Vec<Vec<f32>> = (0..200).map(|_| vec![rnd.gen_range(0.0..100.0), rnd.gen_range(0.0..1.0)]).collect();
        let conf = KMeansConfig::build().tries(5).random_generator(rnd).build();

        let result = kmeans(samples, 4, &conf).unwrap();
        assert_eq!(result.attempts.len(), 5);
        assert_eq!(result.centroids().len(), 5);
        let mut ids: Vec<_> = result.attempts.iter().map(|a| a.attempt).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        for attempt in &result.attempts {
            assert_eq!(attempt.k, 4);
            assert!(attempt.iterations >= 1 && attempt.iterations <= DEFAULT_MAX_ITER);
            assert!(attempt.centroids.iter().all(|c| c.len() == 2));
            assert_eq!(attempt.sample_dims(), 2);
        }
    }

    #[test]
    fn single_cluster() {
        let samples = vec![vec![1.0f64, 1.0], vec![3.0, 1.0], vec![2.0, 4.0]];
        let best = kmeans(samples, 1, &KMeansConfig::default()).unwrap().into_best().unwrap();
        assert_eq!(best.centroids, vec![vec![2.0, 2.0]]);
        assert_eq!(best.assignments, vec![0, 0, 0]);
        assert_approx_eq!(best.distsum, 8.0, 1e-12);
    }

    #[test]
    fn invalid_input() {
        let conf = KMeansConfig::default();
        assert!(matches!(kmeans(Vec::<Vec<f64>>::new(), 2, &conf), Err(KMeansError::InvalidInput(_))));
        assert!(matches!(kmeans(vec![vec![1.0f64]], 0, &conf), Err(KMeansError::InvalidInput(_))));
        assert_eq!(kmeans(vec![vec![1.0f64, 2.0], vec![1.0]], 1, &conf).err(),
            Some(KMeansError::DimensionMismatch { index: 1, expected: 2, found: 1 }));

        let conf = KMeansConfig::build().values_range(vec![ValueRange::new(1.0f64, 0.0)]).build();
        assert!(matches!(kmeans(vec![vec![1.0f64]], 1, &conf), Err(KMeansError::InvalidInput(_))));
    }

    #[test]
    fn too_wide_ranges_are_rejected() {
        let conf = KMeansConfig::build().values_range(vec![ValueRange::new(-f64::MAX, f64::MAX)]).build();
        assert!(matches!(kmeans(vec![vec![0.0f64], vec![1.0]], 2, &conf), Err(KMeansError::InvalidInput(_))));

        // observed range of the samples
        let conf = KMeansConfig::build().tries(4).build();
        assert!(matches!(kmeans(vec![vec![-1e308f64], vec![1e308]], 2, &conf), Err(KMeansError::InvalidInput(_))));
        assert!(matches!(kmeans(vec![vec![-f32::MAX], vec![f32::MAX]], 1, &KMeansConfig::default()), Err(KMeansError::InvalidInput(_))));
    }

    #[test]
    fn custom_distance() {
        let samples = vec![vec![0.0f64, 0.0], vec![1.0, 0.0], vec![50.0, 50.0], vec![51.0, 50.0]];
        let manhattan = |a: &[f64], b: &[f64]| a.iter().zip(b).map(|(a, b)| (a - b).abs()).sum::<f64>();
        let conf = KMeansConfig::build()
            .distance(manhattan)
            .random_generator(StdRng::seed_from_u64(3))
            .tries(16)
            .build();

        let best = kmeans(samples, 2, &conf).unwrap().into_best().unwrap();
        assert_centroids_match(&[vec![0.5, 0.0], vec![50.5, 50.0]], &best.centroids, 1e-12);
        assert_approx_eq!(best.distsum, 2.0, 1e-12);
    }
}
