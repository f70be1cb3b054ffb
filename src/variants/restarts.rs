use crate::error::{KMeansError, Result};
use crate::variants::Lloyd;
use crate::{KMeans, KMeansConfig, KMeansResult, KMeansState, numeric::*};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{error, info};

pub(crate) struct Restarts<T: Primitive> {
	_p: std::marker::PhantomData<T>
}
impl<T: Primitive> Restarts<T> {
    fn validate(k: usize, config: &KMeansConfig<'_, T>) -> Result<()> {
        if k == 0 {
            return Err(KMeansError::InvalidInput("k has to be at least 1".into()));
        }
        if let Some((dim, range)) = config.values_range().and_then(|ranges| ranges.iter().enumerate().find(|(_, r)| !r.is_valid())) {
            return Err(KMeansError::InvalidInput(format!("invalid value range {:?} for dimension {}", range, dim)));
        }
        Ok(())
    }

    pub fn calculate<F>(data: &KMeans<T>, k: usize, init: F, config: &KMeansConfig<'_, T>) -> Result<KMeansResult<T>>
                where F: Fn(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'_, T>, &mut dyn RngCore) -> Result<()> + Sync {
        Self::validate(k, config)?;
        let tries = config.tries();
        let seeds = config.attempt_seeds(tries);

        let (tx, rx) = crossbeam_channel::bounded(tries);
        let init = &init;
        rayon::scope(|s| {
            for (attempt, seed) in seeds.into_iter().enumerate() {
                let tx = tx.clone();
                s.spawn(move |_| {
                    let mut rnd = ChaCha8Rng::seed_from_u64(seed);
                    // rx is alive until all tasks are done, sending can not fail
                    let _ = tx.send((attempt, Lloyd::calculate(data, k, attempt, init, config, &mut rnd)));
                });
            }
        });
        drop(tx);

        let mut attempts = Vec::with_capacity(tries);
        let mut first_error = None;
        for (attempt, res) in rx.iter() {
            match res {
                Ok(state) => attempts.push(state),
                Err(err) => {
                    error!(attempt, error = %err, "attempt failed");
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }
        if let Some(err) = first_error {
            return Err(err);
        }

        let result = KMeansResult { attempts };
        if let Some(best) = result.best() {
            info!(attempt = best.attempt, distsum = %best.distsum, centroids = best.centroids.len(), tries, "best attempt selected");
        }
        Ok(result)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AbortStrategy, ValueRange};
    use rand::prelude::*;

    fn blobs(rnd: &mut StdRng) -> Vec<Vec<f64>> {
        (0..150).map(|i| {
            let center = [(0.0, 0.0), (20.0, 0.0), (10.0, 20.0)][i % 3];
            vec![center.0 + rnd.gen_range(-2.0..2.0), center.1 + rnd.gen_range(-2.0..2.0)]
        }).collect()
    }

    #[test]
    fn one_result_per_try() {
        let mut rnd = StdRng::seed_from_u64(7);
        let kmean = KMeans::new(blobs(&mut rnd)).unwrap();
        let conf = KMeansConfig::build().tries(5).random_generator(rnd).build();

        let res = kmean.kmeans_lloyd(3, KMeans::init_random_range, &conf).unwrap();
        assert_eq!(res.attempts.len(), 5);
        let mut ids: Vec<usize> = res.attempts.iter().map(|a| a.attempt).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        for a in &res.attempts {
            assert!(!a.centroids.is_empty() && a.centroids.len() <= 3);
            assert!(a.centroids.iter().all(|c| c.len() == 2));
            assert_eq!(a.assignments.len(), 150);
            assert_eq!(a.centroid_frequency.iter().sum::<usize>(), 150);
        }
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let mut rnd = StdRng::seed_from_u64(7);
        let kmean = KMeans::new(blobs(&mut rnd)).unwrap();
        let run = || {
            let conf = KMeansConfig::build().tries(4).random_generator(StdRng::seed_from_u64(1337)).build();
            let mut attempts = kmean.kmeans_lloyd(3, KMeans::init_random_range, &conf).unwrap().attempts;
            attempts.sort_by_key(|a| a.attempt);
            attempts.into_iter().map(|a| (a.centroids, a.assignments)).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn default_tries() {
        let kmean = KMeans::new(vec![vec![1.0f32], vec![2.0], vec![9.0]]).unwrap();
        let res = kmean.kmeans_lloyd(2, KMeans::init_random_range, &KMeansConfig::default()).unwrap();
        assert_eq!(res.attempts.len(), crate::DEFAULT_TRIES);
    }

    #[test]
    fn invalid_arguments_fail_fast() {
        let kmean = KMeans::new(vec![vec![1.0f64, 2.0], vec![3.0, 4.0]]).unwrap();
        let calls = std::sync::atomic::AtomicUsize::new(0);
        let on_init = |_: &KMeansState<f64>| { calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst); };

        let conf = KMeansConfig::build().init_done(&on_init).build();
        assert!(matches!(kmean.kmeans_lloyd(0, KMeans::init_random_range, &conf), Err(KMeansError::InvalidInput(_))));

        let conf = KMeansConfig::build()
            .init_done(&on_init)
            .values_range(vec![ValueRange::new(0.0, 1.0), ValueRange::new(5.0, 1.0)])
            .build();
        assert!(matches!(kmean.kmeans_lloyd(2, KMeans::init_random_range, &conf), Err(KMeansError::InvalidInput(_))));

        let conf = KMeansConfig::build()
            .init_done(&on_init)
            .values_range(vec![ValueRange::new(0.0, f64::INFINITY)])
            .build();
        assert!(matches!(kmean.kmeans_lloyd(2, KMeans::init_random_range, &conf), Err(KMeansError::InvalidInput(_))));

        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn failing_attempt_fails_the_run() {
        let kmean = KMeans::new(vec![vec![1.0f64, 2.0], vec![3.0, 4.0]]).unwrap();
        let conf = KMeansConfig::build().tries(4).build();

        let init = |kmean: &KMeans<f64>, state: &mut KMeansState<f64>, _: &KMeansConfig<'_, f64>, _: &mut dyn RngCore| {
            if state.attempt == 2 {
                return Err(KMeansError::InvalidInput(format!("attempt {} failed", state.attempt)));
            }
            state.centroids = vec![kmean.samples()[0].clone()];
            Ok(())
        };
        assert_eq!(kmean.kmeans_lloyd(1, init, &conf).err(), Some(KMeansError::InvalidInput("attempt 2 failed".into())));

        let conf = KMeansConfig::build().tries(3).build();
        let wrong_dims = KMeans::init_precomputed(vec![vec![1.0, 2.0, 3.0]]);
        assert_eq!(kmean.kmeans_lloyd(1, wrong_dims, &conf).err(),
            Some(KMeansError::DimensionMismatch { index: 0, expected: 2, found: 3 }));
    }

    #[test]
    fn best_attempt_finds_separated_blobs() {
        let mut rnd = StdRng::seed_from_u64(3);
        let samples = blobs(&mut rnd);
        let kmean = KMeans::new(samples.clone()).unwrap();
        let conf = KMeansConfig::build()
            .tries(10)
            .abort_strategy(AbortStrategy::NoImprovement { threshold: 1e-9 })
            .random_generator(rnd)
            .build();

        let res = kmean.kmeans_lloyd(3, KMeans::init_random_range, &conf).unwrap();
        let best = res.best().unwrap();
        assert!(res.attempts.iter().all(|a| best.distsum <= a.distsum));
        assert_eq!(best.centroids.len(), 3);

        let should: Vec<Vec<f64>> = (0..3).map(|c| {
            let members: Vec<Vec<f64>> = samples.iter().skip(c).step_by(3).cloned().collect();
            transpose(&members).iter().map(|col| mean(col).unwrap()).collect()
        }).collect();
        crate::helpers::testing::assert_centroids_match(&should, &best.centroids, 1e-9);
    }
}
