//! Centroid update step.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::sparse::SparseVector;

/// Move each centroid to the mean of the points assigned to it.
///
/// A cluster that received no points keeps its previous centroid.
///
/// # Panics
///
/// Panics if a label is not a valid index into `centroids`.
pub fn update_centroids(
    points: &[SparseVector],
    labels: &[usize],
    centroids: &mut [SparseVector],
) {
    debug_assert_eq!(points.len(), labels.len());

    let mut members: Vec<Vec<usize>> = vec![Vec::new(); centroids.len()];
    for (i, &c) in labels.iter().enumerate() {
        members[c].push(i);
    }

    #[cfg(feature = "parallel")]
    centroids
        .par_iter_mut()
        .zip(members.par_iter())
        .for_each(|(centroid, idx)| {
            if let Some(mean) = mean_of(points, idx) {
                *centroid = mean;
            }
        });

    #[cfg(not(feature = "parallel"))]
    for (centroid, idx) in centroids.iter_mut().zip(&members) {
        if let Some(mean) = mean_of(points, idx) {
            *centroid = mean;
        }
    }
}

fn mean_of(points: &[SparseVector], members: &[usize]) -> Option<SparseVector> {
    if members.is_empty() {
        return None;
    }
    let mut sum = SparseVector::new();
    for &i in members {
        sum.accumulate(&points[i]);
    }
    let count = members.len() as f64;
    Some(sum.iter().map(|(key, weight)| (key, weight / count)).collect())
}
