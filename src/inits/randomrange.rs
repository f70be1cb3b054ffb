use crate::error::{KMeansError, Result};
use crate::numeric::*;
use crate::{KMeans, KMeansConfig, KMeansState};
use rand::prelude::*;

/// Draw **k** random centroids with **n** dimensions. Each coordinate is drawn uniformly from
/// `[min, max)` of its dimension's range. Dimensions without a range use [`ValueRange::wide`],
/// excess ranges are ignored.
///
/// ## Errors
/// [`KMeansError::InvalidInput`] if `k == 0`, `n == 0`, or one of the used ranges is not finite, has `min > max`,
/// or is too wide for its width to be finite.
pub fn create_centroids<T: Primitive>(k: usize, n: usize, ranges: &[ValueRange<T>], rnd: &mut dyn RngCore) -> Result<Matrix<T>> {
    if k == 0 || n == 0 {
        return Err(KMeansError::InvalidInput(format!("can not create {} centroids with {} dimensions", k, n)));
    }
    let ranges: Vec<ValueRange<T>> = ranges.iter().cloned()
        .chain(std::iter::repeat(ValueRange::wide()))
        .take(n)
        .collect();
    if let Some(idx) = ranges.iter().position(|r| !r.is_valid()) {
        return Err(KMeansError::InvalidInput(
            format!("invalid value range for dimension {}: {:?}", idx, ranges[idx])));
    }

    Ok((0..k).map(|_| {
        ranges.iter()
            .map(|r| if r.min < r.max { rnd.gen_range(r.min..r.max) } else { r.min })
            .collect()
    }).collect())
}

#[inline(always)]
pub fn calculate<T: Primitive>(kmean: &KMeans<T>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>, rnd: &mut dyn RngCore) -> Result<()> {
    let ranges = config.values_range().unwrap_or(&kmean.value_ranges);
    state.centroids = create_centroids(state.k, kmean.sample_dims, ranges, rnd)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centroids_within_ranges() {
        let mut rnd = StdRng::seed_from_u64(1337);
        let ranges = vec![ValueRange::new(0.0f64, 1.0), ValueRange::new(-10.0, -5.0), ValueRange::new(3.0, 3.0)];
        let centroids = create_centroids(50, 3, &ranges, &mut rnd).unwrap();

        assert_eq!(centroids.len(), 50);
        for c in &centroids {
            assert_eq!(c.len(), 3);
            assert!(0.0 <= c[0] && c[0] < 1.0);
            assert!(-10.0 <= c[1] && c[1] < -5.0);
            assert_eq!(c[2], 3.0);
        }
        // independent draws
        assert!(centroids.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn missing_ranges_are_padded() {
        let mut rnd = StdRng::seed_from_u64(7);
        let centroids = create_centroids(10, 3, &[ValueRange::new(0.0f32, 1.0)], &mut rnd).unwrap();
        for c in &centroids {
            assert!(0.0 <= c[0] && c[0] < 1.0);
            assert!(c[1] >= 0.0 && c[1].is_finite());
            assert!(c[2] >= 0.0 && c[2].is_finite());
        }
        // excess ranges are ignored
        let centroids = create_centroids(2, 1, &[ValueRange::new(5.0f32, 6.0), ValueRange::new(-1.0, 0.0)], &mut rnd).unwrap();
        assert!(centroids.iter().all(|c| c.len() == 1 && 5.0 <= c[0] && c[0] < 6.0));
    }

    #[test]
    fn invalid_arguments() {
        let mut rnd = StdRng::seed_from_u64(7);
        let ranges = [ValueRange::new(0.0f64, 1.0)];
        assert!(matches!(create_centroids(0, 1, &ranges, &mut rnd), Err(KMeansError::InvalidInput(_))));
        assert!(matches!(create_centroids(1, 0, &ranges, &mut rnd), Err(KMeansError::InvalidInput(_))));
        assert!(matches!(create_centroids(1, 1, &[ValueRange::new(1.0f64, 0.0)], &mut rnd), Err(KMeansError::InvalidInput(_))));
        assert!(matches!(create_centroids(1, 1, &[ValueRange::new(f64::NEG_INFINITY, 0.0)], &mut rnd), Err(KMeansError::InvalidInput(_))));
        assert!(matches!(create_centroids(1, 1, &[ValueRange::new(-f64::MAX, f64::MAX)], &mut rnd), Err(KMeansError::InvalidInput(_))));
    }

    #[test]
    fn ranges_derived_from_samples() {
        let kmean = KMeans::new(vec![vec![0.0f64, 100.0], vec![1.0, 200.0], vec![0.5, 150.0]]).unwrap();
        let mut state = KMeansState::new(kmean.sample_cnt, kmean.sample_dims, 20, 0);
        let mut rnd = StdRng::seed_from_u64(99);
        KMeans::init_random_range(&kmean, &mut state, &KMeansConfig::default(), &mut rnd).unwrap();

        assert_eq!(state.centroids.len(), 20);
        assert!(state.centroids.iter().all(|c| (0.0..1.0).contains(&c[0]) && (100.0..200.0).contains(&c[1])));

        // configured ranges take precedence
        let conf = KMeansConfig::build().values_range(vec![ValueRange::new(-2.0, -1.0), ValueRange::new(0.0, 1.0)]).build();
        KMeans::init_random_range(&kmean, &mut state, &conf, &mut rnd).unwrap();
        assert!(state.centroids.iter().all(|c| (-2.0..-1.0).contains(&c[0]) && (0.0..1.0).contains(&c[1])));
    }

    #[test]
    fn overflowing_derived_range() {
        // finite samples, but max - min is not
        let kmean = KMeans::new(vec![vec![-1e308f64, 0.0], vec![1e308, 1.0]]).unwrap();
        let mut state = KMeansState::new(kmean.sample_cnt, kmean.sample_dims, 2, 0);
        let mut rnd = StdRng::seed_from_u64(5);
        assert!(matches!(KMeans::init_random_range(&kmean, &mut state, &KMeansConfig::default(), &mut rnd),
            Err(KMeansError::InvalidInput(_))));
        assert!(state.centroids.is_empty());
    }
}
