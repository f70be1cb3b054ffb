use kmeans_restarts::*;

fn main() -> Result<()> {
    let (sample_cnt, sample_dims, k) = (20000, 20, 4);

    // Generate some random data
    let samples: Vec<Vec<f64>> = (0..sample_cnt)
        .map(|_| (0..sample_dims).map(|_| rand::random()).collect())
        .collect();

    // Calculate kmeans with the default 3 attempts, random centroids within the observed value ranges
    let result = kmeans(samples, k, &KMeansConfig::default())?;
    for attempt in &result.attempts {
        println!("Attempt {}: {} iterations, error {}", attempt.attempt, attempt.iterations, attempt.distsum);
    }

    if let Some(best) = result.best() {
        println!("Centroids: {:?}", best.centroids);
        println!("Cluster-Frequency: {:?}", best.centroid_frequency);
        println!("Error: {}", best.distsum);
    }
    Ok(())
}
