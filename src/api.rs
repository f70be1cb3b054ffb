use crate::centroid_cluster::CentroidClusters;
use crate::error::{KMeansError, Result};
use crate::{numeric::*, AbortStrategy, SumSquaredDistance};
use rand::prelude::*;
use rayon::prelude::*;
use std::sync::{Mutex, PoisonError};

pub type InitDoneCallbackFn<'a, T> = &'a (dyn Fn(&KMeansState<T>) + Sync);
pub type IterationDoneCallbackFn<'a, T> = &'a (dyn Fn(&KMeansState<T>, usize, T) + Sync);

/// Amount of independent attempts, if none was configured.
pub const DEFAULT_TRIES: usize = 3;
/// Iteration limit per attempt, if none was configured.
pub const DEFAULT_MAX_ITER: usize = 100;

/// Distance between two vectors of equal length.
///
/// Implemented by [`SumSquaredDistance`](crate::SumSquaredDistance) (the default),
/// [`HistogramDistance`](crate::HistogramDistance) and by every closure `Fn(&[T], &[T]) -> T`.
/// Attempts run concurrently, so implementations have to be [`Send`] + [`Sync`].
pub trait DistanceFunction<T: Primitive>: Send + Sync {
    fn distance(&self, a: &[T], b: &[T]) -> T;
}
impl<T: Primitive, F> DistanceFunction<T> for F where F: Fn(&[T], &[T]) -> T + Send + Sync {
    #[inline(always)]
    fn distance(&self, a: &[T], b: &[T]) -> T { self(a, b) }
}


/// This is a structure holding various configuration options for a k-means calculation, such as
/// the distance function, the amount of attempts, the random number generator to use, or a couple
/// of callbacks, that can be set to get status information from a running k-means calculation.
///
/// For a more detailed information about all possible options, have a look at [`KMeansConfigBuilder`].
pub struct KMeansConfig<'a, T: Primitive> {
    /// Callback that is called, when the initialization phase of an attempt finished
    /// ## Arguments
    /// - **state**: Current [`KMeansState`] after the initialization
    pub(crate) init_done: InitDoneCallbackFn<'a, T>,
    /// Callback that is called after each iteration of an attempt
    /// ## Arguments
    /// - **state**: Current [`KMeansState`] after the iteration
    /// - **iteration_id**: Number of the current iteration
    /// - **distsum**: New distance sum (**state** contains the distsum from the previous iteration)
    pub(crate) iteration_done: IterationDoneCallbackFn<'a, T>,
    /// Random number generator, the seeds of all attempts are drawn from
    pub(crate) rnd: Mutex<Box<dyn RngCore + Send>>,
    /// The abort-strategy to use for each attempt
    pub(crate) abort_strategy: AbortStrategy<T>,
    pub(crate) distance: Box<dyn DistanceFunction<T>>,
    /// Per-dimension bounds for random centroids (`None`: derived from the samples)
    pub(crate) values_range: Option<Vec<ValueRange<T>>>,
    pub(crate) tries: usize,
    pub(crate) max_iter: usize,
}
impl<'a, T: Primitive> Default for KMeansConfig<'a, T> {
    fn default() -> Self {
        Self {
            init_done: &|_| {},
            iteration_done: &|_,_,_| {},
            rnd: boxed_rng(StdRng::from_entropy()),
            abort_strategy: AbortStrategy::default(),
            distance: Box::new(SumSquaredDistance),
            values_range: None,
            tries: DEFAULT_TRIES,
            max_iter: DEFAULT_MAX_ITER,
        }
    }
}
impl<'a, T: Primitive> KMeansConfig<'a, T> {
    /// Use the [`KMeansConfigBuilder`] to build a [`KMeansConfig`] instance.
    pub fn build() -> KMeansConfigBuilder<'a, T> {
        KMeansConfigBuilder { config: KMeansConfig::default() }
    }

    /// Replace all unset (zero-valued) options by their defaults.
    pub fn with_defaults(mut self) -> Self {
        if self.tries == 0 {
            self.tries = DEFAULT_TRIES;
        }
        if self.max_iter == 0 {
            self.max_iter = DEFAULT_MAX_ITER;
        }
        self
    }

    pub fn tries(&self) -> usize { self.tries }
    pub fn max_iter(&self) -> usize { self.max_iter }
    pub fn abort_strategy(&self) -> AbortStrategy<T> { self.abort_strategy }
    pub fn values_range(&self) -> Option<&[ValueRange<T>]> { self.values_range.as_deref() }
    pub fn distance(&self) -> &dyn DistanceFunction<T> { self.distance.as_ref() }

    /// Draw one seed per attempt from the configured random number generator.
    pub(crate) fn attempt_seeds(&self, tries: usize) -> Vec<u64> {
        let mut rnd = self.rnd.lock().unwrap_or_else(PoisonError::into_inner);
        (0..tries).map(|_| rnd.next_u64()).collect()
    }
}
impl<'a, T: Primitive> std::fmt::Debug for KMeansConfig<'a, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KMeansConfig")
            .field("tries", &self.tries)
            .field("max_iter", &self.max_iter)
            .field("abort_strategy", &self.abort_strategy)
            .field("values_range", &self.values_range)
            .finish_non_exhaustive()
    }
}

fn boxed_rng<R: RngCore + Send + 'static>(rnd: R) -> Mutex<Box<dyn RngCore + Send>> {
    let rnd: Box<dyn RngCore + Send> = Box::new(rnd);
    Mutex::new(rnd)
}

pub struct KMeansConfigBuilder<'a, T: Primitive> {
    config: KMeansConfig<'a, T>
}
impl<'a, T: Primitive> KMeansConfigBuilder<'a, T> {
    /// Set the callback that should be called after the centroid initialization of each attempt, before its iteration starts.
    pub fn init_done(mut self, init_done: InitDoneCallbackFn<'a, T>) -> Self {
        self.config.init_done = init_done; self
    }
    /// Set the callback that should be called after each iteration during a running k-means calculation.
    /// Attempts run concurrently, so the callback may be invoked from multiple threads at once.
    pub fn iteration_done(mut self, iteration_done: IterationDoneCallbackFn<'a, T>) -> Self {
        self.config.iteration_done = iteration_done; self
    }
    /// Set the random number generator that should be used in the k-means calculation.
    /// Use a seeded generator for deterministically repeatable results.
    pub fn random_generator<R: RngCore + Send + 'static>(mut self, rnd: R) -> Self {
        self.config.rnd = boxed_rng(rnd); self
    }
    /// Set the abort-strategy to use for each attempt. For more information,
    /// see documentation of [`AbortStrategy`].
    /// ## Default
    /// [`AbortStrategy::NoReassignment`]
    pub fn abort_strategy(mut self, abort_strategy: AbortStrategy<T>) -> Self {
        self.config.abort_strategy = abort_strategy; self
    }
    /// Set the distance function used to find each sample's nearest centroid.
    /// ## Default
    /// [`SumSquaredDistance`]
    pub fn distance<D: DistanceFunction<T> + 'static>(mut self, distance: D) -> Self {
        self.config.distance = Box::new(distance); self
    }
    /// Set the per-dimension bounds random centroids are drawn from. Dimensions without a range
    /// use [`ValueRange::wide`].
    /// ## Default
    /// Observed minimum and maximum of each dimension of the samples
    pub fn values_range(mut self, values_range: Vec<ValueRange<T>>) -> Self {
        self.config.values_range = Some(values_range); self
    }
    /// Set the amount of independent attempts (`0` selects the default of [`DEFAULT_TRIES`]).
    pub fn tries(mut self, tries: usize) -> Self {
        self.config.tries = tries; self
    }
    /// Set the iteration limit of each attempt (`0` selects the default of [`DEFAULT_MAX_ITER`]).
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.config.max_iter = max_iter; self
    }
    /// Return the internally built configuration structure.
    pub fn build(self) -> KMeansConfig<'a, T> { self.config.with_defaults() }
}


/// This is the internally used data-structure, storing the state of a single attempt during
/// calculation, as well as its final result, as returned by the API.
/// All mutations are done in this structure, making [`KMeans`] immutable, and therefore allowing
/// multiple attempts to run in parallel, without having to duplicate the input-data.
///
/// ## Generics
/// - **T**: Underlying primitive type that was used for the calculation
///
/// ## Fields
/// - **k**: The amount of clusters that were requested when calculating this k-means result
/// - **attempt**: Index of the attempt (in launch order) this state belongs to
/// - **iterations**: Amount of refinement iterations that were run
/// - **distsum**: The total sum of distances from all samples to their respective centroids (distortion)
/// - **centroids**: Calculated cluster centers (at most **k**, centroids that lost all samples are dropped)
/// - **centroid_frequency**: Amount of samples in each centroid
/// - **assignments**: Vector mapping each sample to its respective nearest centroid
#[derive(Clone, Debug)]
pub struct KMeansState<T: Primitive> {
    pub k: usize,
    pub attempt: usize,
    pub iterations: usize,
    pub distsum: T,
    pub centroids: Matrix<T>,
    pub centroid_frequency: Vec<usize>,
    pub assignments: Vec<usize>,

    pub(crate) sample_dims: usize
}
impl<T: Primitive> KMeansState<T> {
    pub(crate) fn new(sample_cnt: usize, sample_dims: usize, k: usize, attempt: usize) -> Self {
        Self {
            k,
            attempt,
            iterations: 0,
            distsum: T::infinity(),
            centroids: Matrix::with_capacity(k),
            centroid_frequency: vec![0usize;k],
            assignments: vec![0usize;sample_cnt],
            sample_dims
        }
    }

    pub fn sample_dims(&self) -> usize { self.sample_dims }
}


/// Result of [`KMeans::kmeans_lloyd`]: the final state of every attempt, in the order the attempts
/// finished.
#[derive(Clone, Debug)]
pub struct KMeansResult<T: Primitive> {
    pub attempts: Vec<KMeansState<T>>
}
impl<T: Primitive> KMeansResult<T> {
    /// The attempt with the lowest distortion (first one wins on ties).
    pub fn best(&self) -> Option<&KMeansState<T>> {
        self.attempts.iter()
            .min_by(|a, b| a.distsum.partial_cmp(&b.distsum).unwrap_or(std::cmp::Ordering::Equal))
    }

    pub fn into_best(self) -> Option<KMeansState<T>> {
        let best_idx = self.best().map(|best| best.attempt)?;
        self.attempts.into_iter().find(|a| a.attempt == best_idx)
    }

    /// The final centroids of every attempt.
    pub fn centroids(&self) -> Vec<&Matrix<T>> {
        self.attempts.iter().map(|a| &a.centroids).collect()
    }
}


/// Entrypoint of this crate's API-Surface.
///
/// Create an instance of this struct, giving the samples you want to operate on. The primitive type
/// of the passed samples will be the type used internaly for all calculations, as well as the result
/// as stored in the returned [`KMeansState`] structures.
///
/// ## Supported initialization methods
/// - Random centroids within per-dimension value ranges [`KMeans::init_random_range`]
/// - Precomputed centroids [`KMeans::init_precomputed`]
pub struct KMeans<T: Primitive> {
    pub(crate) sample_cnt: usize,
    pub(crate) sample_dims: usize,
    pub(crate) samples: Matrix<T>,
    pub(crate) value_ranges: Vec<ValueRange<T>>
}
impl<T: Primitive> KMeans<T> {
    /// Create a new instance of the [`KMeans`] structure.
    ///
    /// ## Arguments
    /// - **samples**: Vector of samples, each of them a vector with the same amount of dimensions
    ///
    /// ## Errors
    /// - [`KMeansError::InvalidInput`] if there are no samples, samples without dimensions or non-finite values
    /// - [`KMeansError::DimensionMismatch`] if a sample's dimensionality differs from the first sample's
    pub fn new(samples: Matrix<T>) -> Result<Self> {
        let sample_dims = match samples.first() {
            None => return Err(KMeansError::InvalidInput("no samples given".into())),
            Some(s) if s.is_empty() => return Err(KMeansError::InvalidInput("samples have no dimensions".into())),
            Some(s) => s.len()
        };
        for (index, s) in samples.iter().enumerate() {
            if s.len() != sample_dims {
                return Err(KMeansError::DimensionMismatch { index, expected: sample_dims, found: s.len() });
            }
            if s.iter().any(|v| !v.is_finite()) {
                return Err(KMeansError::InvalidInput(format!("sample {} contains non-finite values", index)));
            }
        }

        Ok(Self {
            sample_cnt: samples.len(),
            sample_dims,
            value_ranges: value_ranges(&samples),
            samples
        })
    }

    pub fn sample_cnt(&self) -> usize { self.sample_cnt }
    pub fn sample_dims(&self) -> usize { self.sample_dims }
    pub fn samples(&self) -> &[Vector<T>] { &self.samples }
    /// Observed per-dimension bounds of the samples
    pub fn value_ranges(&self) -> &[ValueRange<T>] { &self.value_ranges }


    /// Index of and distance to the centroid nearest to **sample**. The first centroid wins on ties.
    pub(crate) fn nearest_centroid<C: AsRef<[T]>>(sample: &[T], centroids: &[C], distance: &dyn DistanceFunction<T>) -> Option<(usize, T)> {
        centroids.iter().enumerate()
            .map(|(idx, c)| (idx, distance.distance(sample, c.as_ref())))
            .fold(None, |best, (idx, dist)| match best {
                Some((_, best_dist)) if !(dist < best_dist) => best,
                _ => Some((idx, dist))
            })
    }

    pub(crate) fn nearest_centroids<C: AsRef<[T]> + Sync>(&self, centroids: &[C], distance: &dyn DistanceFunction<T>) -> Result<Vec<(usize, T)>> {
        self.samples.par_iter()
            .map(|s| Self::nearest_centroid(s, centroids, distance))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| KMeansError::InvalidArgument("no centroids to assign samples to".into()))
    }

    /// Assignment step: append every sample to the cluster of its nearest centroid.
    ///
    /// ## Returns
    /// Each sample's centroid index and the sum of all sample-to-centroid distances.
    pub(crate) fn update_cluster_assignments(&self, clusters: &mut CentroidClusters<T>, distance: &dyn DistanceFunction<T>) -> Result<(Vec<usize>, T)> {
        let nearest = self.nearest_centroids(&**clusters, distance)?;
        let mut distsum = T::zero();
        let assignments = nearest.into_iter()
            .zip(self.samples.iter())
            .map(|((idx, dist), s)| {
                distsum += dist;
                clusters.assign_at(idx, s.clone()).map(|_| idx)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((assignments, distsum))
    }


    /// Normal K-Means algorithm (Lloyd), run as multiple independent attempts.
    ///
    /// Every attempt initializes its own centroids using **init** (with its own random number generator)
    /// and refines them until the configured [`AbortStrategy`] stops it, or `max_iter` is reached.
    /// The attempts run concurrently on the rayon thread-pool.
    ///
    /// ## Arguments
    /// - **k**: Amount of clusters to search for
    /// - **init**: Initialization-Method to use for the initialization of the **k** centroids
    /// - **config**: [`KMeansConfig`] instance, containing several configuration options for the calculation.
    ///
    /// ## Returns
    /// [`KMeansResult`], containing the final state of every attempt. Use [`KMeansResult::best`] to
    /// pick the attempt with the lowest distortion.
    ///
    /// ## Example
    /// ```rust
    /// use kmeans_restarts::*;
    /// use rand::prelude::*;
    ///
    /// let samples = vec![vec![0.0f64, 0.0], vec![0.0, 1.0], vec![10.0, 10.0], vec![10.0, 11.0]];
    /// let conf = KMeansConfig::build()
    ///     .tries(5)
    ///     .random_generator(StdRng::seed_from_u64(42))
    ///     .build();
    ///
    /// let kmean = KMeans::new(samples).unwrap();
    /// let result = kmean.kmeans_lloyd(2, KMeans::init_random_range, &conf).unwrap();
    /// assert_eq!(result.attempts.len(), 5);
    ///
    /// let best = result.best().unwrap();
    /// println!("Centroids: {:?}", best.centroids);
    /// println!("Error: {}", best.distsum);
    /// ```
    pub fn kmeans_lloyd<F>(&self, k: usize, init: F, config: &KMeansConfig<'_, T>) -> Result<KMeansResult<T>>
                where F: Fn(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'_, T>, &mut dyn RngCore) -> Result<()> + Sync {
        crate::variants::Restarts::calculate(self, k, init, config)
    }

    /// A single attempt of [`KMeans::kmeans_lloyd`], using the given random number generator.
    ///
    /// ## Arguments
    /// - **k**: Amount of clusters to search for
    /// - **attempt**: Index stored in the returned [`KMeansState`]
    /// - **init**: Initialization-Method to use for the initialization of the **k** centroids
    /// - **config**: [`KMeansConfig`] instance (its random number generator and `tries` are not used)
    /// - **rnd**: Random number generator for the initialization
    pub fn kmeans_attempt<F>(&self, k: usize, attempt: usize, init: F, config: &KMeansConfig<'_, T>, rnd: &mut dyn RngCore) -> Result<KMeansState<T>>
                where F: Fn(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'_, T>, &mut dyn RngCore) -> Result<()> {
        crate::variants::Lloyd::calculate(self, k, attempt, &init, config, rnd)
    }

    /// Random initialization method
    ///
    /// ## Description
    /// This initialization method draws **k** random centroids, each coordinate uniformly from the
    /// value range of its dimension. The ranges are taken from the configuration, or derived from the samples.
    ///
    /// ## Note
    /// This method is not meant for direct invocation. Pass a reference to it, to an instance-method of [`KMeans`].
    pub fn init_random_range(kmean: &KMeans<T>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>, rnd: &mut dyn RngCore) -> Result<()> {
        crate::inits::randomrange::calculate(kmean, state, config, rnd)
    }

    /// Precomputed initialization method
    ///
    /// ## Description
    /// Every attempt starts from the given centroids (at most **k** of them). Useful to continue a
    /// previous calculation, or for deterministic results.
    pub fn init_precomputed(centroids: Matrix<T>)
            -> impl Fn(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'_, T>, &mut dyn RngCore) -> Result<()> + Sync {
        move |kmean, state, _, _| crate::inits::precomputed::calculate(kmean, state, &centroids)
    }
}
