//! Constraint-aware assignment pass.
//!
//! Points are visited in index order and a decision is never revisited, so
//! with must-link chains the feasible outcome depends on traversal order.
//! For each point:
//!
//! 1. Already-assigned must-link neighbors propose their cluster. Two
//!    different proposals are a [`Error::MustLinkConflict`].
//! 2. Clusters of already-assigned cannot-link neighbors are forbidden.
//! 3. A proposal that is forbidden is a [`Error::LinkConsistencyConflict`];
//!    otherwise the point joins the proposed cluster.
//! 4. Without a proposal the point joins the nearest allowed centroid. If
//!    every centroid is forbidden the pass fails with
//!    [`Error::NoFeasibleCluster`].

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::constraint::ConstraintStore;
use crate::error::{Error, Result};
use crate::sparse::{Metric, SparseVector};

/// Assign every point to a cluster, honouring `constraints`.
pub fn assign(
    points: &[SparseVector],
    centroids: &[SparseVector],
    constraints: &ConstraintStore,
    metric: Metric,
) -> Result<Vec<usize>> {
    let k = centroids.len();
    let free_nearest = nearest_for_unconstrained(points, centroids, constraints, metric);

    let mut labels: Vec<Option<usize>> = vec![None; points.len()];
    let mut forbidden = vec![false; k];

    for (i, point) in points.iter().enumerate() {
        if let Some(nearest) = free_nearest.as_ref().and_then(|f| f[i]) {
            labels[i] = Some(nearest);
            continue;
        }

        let mut target: Option<usize> = None;
        for &j in constraints.must_links(i) {
            let Some(c) = labels[j] else { continue };
            match target {
                None => target = Some(c),
                Some(t) if t != c => {
                    return Err(Error::MustLinkConflict {
                        point: i,
                        first: t,
                        second: c,
                    });
                }
                Some(_) => {}
            }
        }

        forbidden.fill(false);
        for &j in constraints.cannot_links(i) {
            if let Some(c) = labels[j] {
                forbidden[c] = true;
            }
        }

        if let Some(cluster) = target {
            if forbidden[cluster] {
                return Err(Error::LinkConsistencyConflict { point: i, cluster });
            }
            labels[i] = Some(cluster);
            continue;
        }

        match nearest(point, centroids, &forbidden, metric) {
            Some(c) => labels[i] = Some(c),
            None => {
                return Err(Error::NoFeasibleCluster {
                    point: i,
                    n_clusters: k,
                })
            }
        }
    }

    Ok(labels.into_iter().flatten().collect())
}

/// Nearest centroid not marked in `forbidden`. Ties go to the lowest index.
fn nearest(
    point: &SparseVector,
    centroids: &[SparseVector],
    forbidden: &[bool],
    metric: Metric,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (c, centroid) in centroids.iter().enumerate() {
        if forbidden[c] {
            continue;
        }
        let dist = metric.distance(point, centroid);
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((c, dist)),
        }
    }
    best.map(|(c, _)| c)
}

/// Precompute the nearest centroid of every point without constraints.
///
/// Those points read nothing from the in-progress assignment, so their
/// distance scans can run in parallel ahead of the ordered pass.
#[cfg(feature = "parallel")]
fn nearest_for_unconstrained(
    points: &[SparseVector],
    centroids: &[SparseVector],
    constraints: &ConstraintStore,
    metric: Metric,
) -> Option<Vec<Option<usize>>> {
    let none_forbidden = vec![false; centroids.len()];
    Some(
        points
            .par_iter()
            .enumerate()
            .map(|(i, point)| {
                if constraints.is_constrained(i) {
                    None
                } else {
                    nearest(point, centroids, &none_forbidden, metric)
                }
            })
            .collect(),
    )
}

#[cfg(not(feature = "parallel"))]
fn nearest_for_unconstrained(
    _points: &[SparseVector],
    _centroids: &[SparseVector],
    _constraints: &ConstraintStore,
    _metric: Metric,
) -> Option<Vec<Option<usize>>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::ConstraintKind::{CannotLink, MustLink};

    fn points() -> Vec<SparseVector> {
        vec![
            SparseVector::from([(1, 1.0)]),
            SparseVector::from([(1, 0.9)]),
            SparseVector::from([(2, 1.0)]),
            SparseVector::from([(2, 0.9)]),
        ]
    }

    fn centroids() -> Vec<SparseVector> {
        vec![SparseVector::from([(1, 1.0)]), SparseVector::from([(2, 1.0)])]
    }

    #[test]
    fn test_unconstrained_nearest() {
        let store = ConstraintStore::new(4);
        let labels = assign(&points(), &centroids(), &store, Metric::default()).unwrap();
        assert_eq!(labels, vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_tie_goes_to_lowest_index() {
        let pts = vec![SparseVector::from([(5, 1.0)])];
        let cents = vec![SparseVector::from([(1, 1.0)]), SparseVector::from([(2, 1.0)])];
        let labels = assign(&pts, &cents, &ConstraintStore::new(1), Metric::default()).unwrap();
        assert_eq!(labels, vec![0]);
    }

    #[test]
    fn test_must_link_follows_earlier_point() {
        let mut store = ConstraintStore::new(4);
        store.add_indices(0, 3, MustLink).unwrap();
        let labels = assign(&points(), &centroids(), &store, Metric::default()).unwrap();
        assert_eq!(labels, vec![0, 0, 1, 0]);
    }

    #[test]
    fn test_cannot_link_pushes_to_next_nearest() {
        let mut store = ConstraintStore::new(4);
        store.add_indices(0, 1, CannotLink).unwrap();
        let labels = assign(&points(), &centroids(), &store, Metric::default()).unwrap();
        assert_eq!(labels, vec![0, 1, 1, 1]);
    }

    #[test]
    fn test_must_link_chain_follows_assigned_link() {
        // C sits on centroid 1 but is chained to A through B.
        let mut store = ConstraintStore::new(4);
        store.add_indices(0, 1, MustLink).unwrap();
        store.add_indices(1, 2, MustLink).unwrap();
        let labels = assign(&points(), &centroids(), &store, Metric::default()).unwrap();
        assert_eq!(labels, vec![0, 0, 0, 1]);
    }

    #[test]
    fn test_cannot_link_on_chain_end() {
        let mut store = ConstraintStore::new(4);
        store.add_indices(0, 1, MustLink).unwrap();
        store.add_indices(1, 2, MustLink).unwrap();
        store.add_indices(0, 2, CannotLink).unwrap();
        let err = assign(&points(), &centroids(), &store, Metric::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::LinkConsistencyConflict { point: 2, cluster: 0 }
        ));
    }

    #[test]
    fn test_must_link_conflict() {
        let mut store = ConstraintStore::new(4);
        store.add_indices(3, 0, MustLink).unwrap();
        store.add_indices(3, 2, MustLink).unwrap();
        let err = assign(&points(), &centroids(), &store, Metric::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::MustLinkConflict { point: 3, first: 0, second: 1 }
        ));
    }

    #[test]
    fn test_must_and_cannot_same_pair() {
        let mut store = ConstraintStore::new(4);
        store.add_indices(0, 1, MustLink).unwrap();
        store.add_indices(0, 1, CannotLink).unwrap();
        let err = assign(&points(), &centroids(), &store, Metric::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::LinkConsistencyConflict { point: 1, cluster: 0 }
        ));
    }

    #[test]
    fn test_no_feasible_cluster() {
        let mut store = ConstraintStore::new(4);
        store.add_indices(2, 0, CannotLink).unwrap();
        store.add_indices(2, 1, CannotLink).unwrap();
        store.add_indices(0, 1, CannotLink).unwrap();
        let err = assign(&points(), &centroids(), &store, Metric::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::NoFeasibleCluster { point: 2, n_clusters: 2 }
        ));
    }
}
