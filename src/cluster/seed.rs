//! Initial centroid selection.
//!
//! ## K-means++ seeding
//!
//! 1. Choose the first centroid uniformly at random.
//! 2. Keep `D(x)²`, each point's squared distance to its nearest chosen
//!    centroid. Their sum is the *potential*.
//! 3. Draw `r ∈ [0, potential)` and walk the points in index order,
//!    subtracting `D(x)²` until `r` is exhausted. That point is the next
//!    centroid, so far-away points are proportionally more likely.
//!
//! Chosen points have `D(x)² = 0` and can never be drawn again. When the
//! potential hits zero (every remaining point duplicates a centroid) the
//! first unchosen point is taken instead.

use rand::prelude::*;

use crate::error::{Error, Result};
use crate::sparse::{Metric, SparseVector};

/// Centroid initialization strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Init {
    /// Probability-weighted seeding by squared distance.
    #[default]
    KmeansPlusPlus,
    /// `k` distinct points chosen uniformly at random.
    Random,
}

/// Outcome of the seeding phase.
#[derive(Clone, Debug)]
pub struct Seeding {
    /// Owned copies of the chosen points' vectors.
    pub centroids: Vec<SparseVector>,
    /// Indices of the chosen points, in selection order.
    pub chosen: Vec<usize>,
    /// Potential after each centroid was added (k-means++ only).
    pub potentials: Vec<f64>,
}

/// Choose `k` initial centroids from `points`.
pub fn seed<R: Rng + ?Sized>(
    points: &[SparseVector],
    k: usize,
    init: Init,
    metric: Metric,
    rng: &mut R,
) -> Result<Seeding> {
    let n = points.len();
    if k == 0 || k > n {
        return Err(Error::InvalidClusterCount {
            requested: k,
            n_items: n,
        });
    }
    Ok(match init {
        Init::KmeansPlusPlus => kmeans_plus_plus(points, k, metric, rng),
        Init::Random => random(points, k, rng),
    })
}

fn kmeans_plus_plus<R: Rng + ?Sized>(
    points: &[SparseVector],
    k: usize,
    metric: Metric,
    rng: &mut R,
) -> Seeding {
    let n = points.len();
    let mut chosen = Vec::with_capacity(k);
    let mut is_chosen = vec![false; n];
    let mut potentials = Vec::with_capacity(k);

    let first = rng.random_range(0..n);
    chosen.push(first);
    is_chosen[first] = true;

    let mut closest_dist: Vec<f64> = points
        .iter()
        .map(|p| metric.distance(p, &points[first]))
        .collect();
    let mut potential: f64 = closest_dist.iter().sum();
    potentials.push(potential);

    while chosen.len() < k {
        let drawn = if potential > 0.0 {
            let draw = rng.random::<f64>() * potential;
            weighted_pick(&closest_dist, draw)
        } else {
            None
        };
        // k <= n guarantees an unchosen point remains.
        let next = drawn
            .or_else(|| is_chosen.iter().position(|&c| !c))
            .unwrap_or(0);

        chosen.push(next);
        is_chosen[next] = true;

        let center = &points[next];
        potential = 0.0;
        for (dist, point) in closest_dist.iter_mut().zip(points) {
            let d = metric.distance(point, center);
            if d < *dist {
                *dist = d;
            }
            potential += *dist;
        }
        potentials.push(potential);
    }

    Seeding {
        centroids: chosen.iter().map(|&i| points[i].clone()).collect(),
        chosen,
        potentials,
    }
}

/// Walk `weights` in order, consuming `draw`; zero-weight slots are never picked.
fn weighted_pick(weights: &[f64], mut draw: f64) -> Option<usize> {
    let mut last_positive = None;
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        if draw <= w {
            return Some(i);
        }
        draw -= w;
        last_positive = Some(i);
    }
    // Rounding can leave a sliver of `draw` past the end.
    last_positive
}

fn random<R: Rng + ?Sized>(points: &[SparseVector], k: usize, rng: &mut R) -> Seeding {
    let chosen = rand::seq::index::sample(rng, points.len(), k).into_vec();
    Seeding {
        centroids: chosen.iter().map(|&i| points[i].clone()).collect(),
        chosen,
        potentials: Vec::new(),
    }
}
