use crate::{
    error::{ApiError, Result},
    ml::{one_hot::one_hot_encode, tfidf::TfidfVectorizer},
    models::Event,
};
use linfa::{traits::Fit, traits::Predict, DatasetBase};
use linfa_clustering::KMeans;
use ndarray::{concatenate, Array1, Array2, Axis};
use rand_xoshiro::{rand_core::SeedableRng, Xoshiro256Plus};
use std::collections::HashSet;
use tracing::debug;

pub const DEFAULT_CLUSTERS: usize = 5;
const DESCRIPTION_FEATURES: usize = 50;
const KMEANS_SEED: u64 = 42;
const KMEANS_RUNS: usize = 10;
const KMEANS_MAX_ITERATIONS: u64 = 300;
const KMEANS_TOLERANCE: f64 = 1e-4;

/// Feature matrix for a set of events: description TF-IDF (capped at 50
/// terms) followed by one-hot `eventType` and `organizerId` columns.
pub fn event_features(events: &[Event]) -> Result<Array2<f64>> {
    let descriptions: Vec<&str> = events.iter().map(Event::description).collect();
    let text = TfidfVectorizer::with_max_features(DESCRIPTION_FEATURES).fit_transform(&descriptions);

    let categorical: Vec<Vec<String>> = events
        .iter()
        .map(|e| {
            vec![
                e.event_type().unwrap_or("unknown").to_string(),
                e.organizer_key(),
            ]
        })
        .collect();
    let categorical = one_hot_encode(&categorical);

    concatenate(Axis(1), &[text.rows.view(), categorical.view()])
        .map_err(|e| ApiError::InternalError(format!("Failed to build event features: {}", e)))
}

/// Assign every row of `features` to one of at most `n_clusters` clusters.
///
/// The cluster count is capped by the number of distinct rows so that
/// k-means++ seeding always has enough separate points to pick from.
pub fn kmeans_labels(features: &Array2<f64>, n_clusters: usize) -> Result<Vec<usize>> {
    let distinct = features
        .rows()
        .into_iter()
        .map(|row| row.iter().map(|v| v.to_bits()).collect::<Vec<u64>>())
        .collect::<HashSet<_>>()
        .len();
    let k = n_clusters.min(features.nrows()).min(distinct);

    if k <= 1 {
        return Ok(vec![0; features.nrows()]);
    }

    debug!(
        "Fitting k-means with k={} on {}x{} features",
        k,
        features.nrows(),
        features.ncols()
    );

    let dataset = DatasetBase::from(features.clone());
    let model = KMeans::params_with_rng(k, Xoshiro256Plus::seed_from_u64(KMEANS_SEED))
        .n_runs(KMEANS_RUNS)
        .max_n_iterations(KMEANS_MAX_ITERATIONS)
        .tolerance(KMEANS_TOLERANCE)
        .fit(&dataset)
        .map_err(|e| ApiError::InternalError(format!("K-means clustering failed: {}", e)))?;

    let labels: Array1<usize> = model.predict(features);
    Ok(labels.to_vec())
}

/// Cluster label per event, in input order
pub fn cluster_events(events: &[Event], n_clusters: usize) -> Result<Vec<usize>> {
    if events.is_empty() {
        return Ok(Vec::new());
    }
    let features = event_features(events)?;
    kmeans_labels(&features, n_clusters)
}
