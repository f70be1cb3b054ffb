use kmeans_restarts::*;
use rand::prelude::*;

fn main() -> Result<()> {
    let (sample_cnt, sample_dims, k) = (20000, 20, 4);

    // Generate some random data
    let mut rnd = StdRng::seed_from_u64(1337);
    let samples: Vec<Vec<f64>> = (0..sample_cnt)
        .map(|_| (0..sample_dims).map(|_| rnd.gen_range(-1.0..1.0)).collect())
        .collect();

	let conf = KMeansConfig::build()
        .tries(6)
        .max_iter(500)
        .random_generator(rnd)
        // Only count as improvement if > 0.0005 difference
        .abort_strategy(AbortStrategy::NoImprovement { threshold: 0.0005f64 })
		.init_done(&|s| println!("Attempt {}: initialization completed.", s.attempt))
		.iteration_done(&|s, nr, new_distsum|
			println!("Attempt {} / Iteration {} - Error: {:.2} -> {:.2} | Improvement: {:.2}",
				s.attempt, nr, s.distsum, new_distsum, s.distsum - new_distsum))
		.build();

    let kmean = KMeans::new(samples)?;
    let result = kmean.kmeans_lloyd(k, KMeans::init_random_range, &conf)?;

    if let Some(best) = result.into_best() {
        println!("Best attempt: {}", best.attempt);
        println!("Centroids: {:?}", best.centroids);
        println!("Error: {}", best.distsum);
    }
    Ok(())
}
