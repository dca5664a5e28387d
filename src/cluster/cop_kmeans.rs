//! COP-KMeans: k-means under must-link and cannot-link constraints.
//!
//! # The Algorithm (Wagstaff et al., 2001)
//!
//! Lloyd iterations where the assignment step refuses to violate any
//! pairwise constraint:
//!
//! 1. Seed `k` centroids (k-means++ by default).
//! 2. **Assign**: visit points in index order; follow already-assigned
//!    must-link neighbors, avoid clusters held by cannot-link neighbors,
//!    otherwise take the nearest centroid.
//! 3. **Update**: move each centroid to the mean of its points.
//! 4. Stop when an assignment repeats the previous one, or at `max_iter`.
//!
//! A constraint contradiction aborts the run with an error and no labels.
//! Hitting `max_iter` is not an error; the fit reports `converged = false`.
//!
//! ## References
//!
//! Wagstaff, Cardie, Rogers, Schroedl (2001). "Constrained K-means Clustering
//! with Background Knowledge." ICML-01.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::prelude::*;
use tracing::{debug, info, warn};

use super::assign::assign;
use super::seed::{seed, Init};
use super::traits::Clustering;
use super::update::update_centroids;
use crate::catalog::LabelCatalog;
use crate::constraint::ConstraintStore;
use crate::error::{Error, Result};
use crate::sparse::{Metric, SparseVector};

/// Default iteration cap.
pub const DEFAULT_MAX_ITER: usize = 10;

/// Constrained k-means clustering.
#[derive(Debug, Clone)]
pub struct CopKmeans {
    /// Number of clusters.
    k: usize,
    /// Maximum assign/update iterations.
    max_iter: usize,
    /// Random seed.
    seed: Option<u64>,
    /// Centroid initialization.
    init: Init,
    /// Point-to-centroid dissimilarity.
    metric: Metric,
    /// Cooperative cancellation flag, polled between iterations.
    cancel: Option<Arc<AtomicBool>>,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct CopKmeansFit {
    /// Cluster index per point.
    pub labels: Vec<usize>,
    /// Final centroids.
    pub centroids: Vec<SparseVector>,
    /// Assign/update iterations performed.
    pub iterations: usize,
    /// Whether the last assignment repeated the previous one.
    pub converged: bool,
}

impl CopKmeansFit {
    /// `(label, cluster)` pairs in catalog order.
    pub fn labelled<'a>(
        &'a self,
        catalog: &'a LabelCatalog,
    ) -> impl Iterator<Item = (&'a str, usize)> + 'a {
        catalog
            .iter()
            .filter_map(|(i, label)| self.labels.get(i).map(|&c| (label, c)))
    }

    /// Number of points in each cluster.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.centroids.len()];
        for &c in &self.labels {
            sizes[c] += 1;
        }
        sizes
    }
}

impl CopKmeans {
    /// Create a new constrained k-means clusterer.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: DEFAULT_MAX_ITER,
            seed: None,
            init: Init::default(),
            metric: Metric::default(),
            cancel: None,
        }
    }

    /// Set maximum iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the centroid initialization strategy.
    pub fn with_init(mut self, init: Init) -> Self {
        self.init = init;
        self
    }

    /// Set the dissimilarity used for seeding and assignment.
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Abort with [`Error::Cancelled`] once `flag` is set.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Configured iteration cap.
    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    /// Fit using the configured seed (or OS entropy when unset).
    pub fn fit(
        &self,
        points: &[SparseVector],
        constraints: &ConstraintStore,
    ) -> Result<CopKmeansFit> {
        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };
        self.fit_with_rng(points, constraints, &mut rng)
    }

    /// Fit drawing all randomness from `rng`.
    pub fn fit_with_rng<R: Rng + ?Sized>(
        &self,
        points: &[SparseVector],
        constraints: &ConstraintStore,
        rng: &mut R,
    ) -> Result<CopKmeansFit> {
        let n = points.len();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        if self.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iter",
                message: "must be at least 1",
            });
        }
        if constraints.n_points() != n {
            return Err(Error::InvalidParameter {
                name: "constraints",
                message: "store is sized for a different number of points",
            });
        }

        let seeding = seed(points, self.k, self.init, self.metric, rng)?;
        debug!(k = self.k, chosen = ?seeding.chosen, "seeded centroids");
        let mut centroids = seeding.centroids;

        let mut labels: Vec<usize> = Vec::new();
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iter {
            if self.is_cancelled() {
                return Err(Error::Cancelled { iterations });
            }
            debug!(iteration = iterations, "cop-kmeans loop");

            let next = assign(points, &centroids, constraints, self.metric)
                .inspect_err(|e| {
                    warn!(iteration = iterations, error = %e, "assignment aborted");
                })?;
            update_centroids(points, &next, &mut centroids);
            iterations += 1;

            let repeated = next == labels;
            labels = next;
            if repeated {
                converged = true;
                break;
            }
        }

        info!(iterations, converged, k = self.k, n_points = n, "cop-kmeans finished");
        Ok(CopKmeansFit {
            labels,
            centroids,
            iterations,
            converged,
        })
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

impl Clustering for CopKmeans {
    /// Unconstrained fit: every point is free to join its nearest centroid.
    fn fit_predict(&self, data: &[SparseVector]) -> Result<Vec<usize>> {
        let constraints = ConstraintStore::new(data.len());
        Ok(self.fit(data, &constraints)?.labels)
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::ConstraintKind::{CannotLink, MustLink};

    /// A:{1:1.0}, B:{1:0.9}, C:{2:1.0}, D:{2:0.9}
    fn abcd() -> (LabelCatalog, Vec<SparseVector>) {
        let mut catalog = LabelCatalog::new();
        for l in ["A", "B", "C", "D"] {
            catalog.insert(l);
        }
        let points = vec![
            SparseVector::from([(1, 1.0)]),
            SparseVector::from([(1, 0.9)]),
            SparseVector::from([(2, 1.0)]),
            SparseVector::from([(2, 0.9)]),
        ];
        (catalog, points)
    }

    #[test]
    fn test_two_groups_unconstrained() {
        let (_, points) = abcd();
        for s in 0..16 {
            let labels = CopKmeans::new(2).with_seed(s).fit_predict(&points).unwrap();
            assert_eq!(labels[0], labels[1]);
            assert_eq!(labels[2], labels[3]);
            assert_ne!(labels[0], labels[2]);
        }
    }

    #[test]
    fn test_must_link_distant_pair() {
        let (catalog, points) = abcd();
        let mut store = ConstraintStore::new(points.len());
        store.add(&catalog, "A", "D", MustLink).unwrap();
        for s in 0..16 {
            let fit = CopKmeans::new(2).with_seed(s).fit(&points, &store).unwrap();
            assert_eq!(fit.labels[0], fit.labels[3]);
        }
    }

    #[test]
    fn test_must_and_cannot_on_same_pair_aborts() {
        let (catalog, points) = abcd();
        let mut store = ConstraintStore::new(points.len());
        store.add(&catalog, "A", "B", MustLink).unwrap();
        store.add(&catalog, "A", "B", CannotLink).unwrap();
        let err = CopKmeans::new(2).with_seed(7).fit(&points, &store).unwrap_err();
        assert!(err.is_contradiction());
    }

    #[test]
    fn test_k_larger_than_n() {
        let (_, points) = abcd();
        let err = CopKmeans::new(5).fit_predict(&points).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidClusterCount { requested: 5, n_items: 4 }
        ));
    }

    #[test]
    fn test_empty_and_zero_iterations() {
        assert!(matches!(
            CopKmeans::new(1).fit_predict(&[]),
            Err(Error::EmptyInput)
        ));
        let (_, points) = abcd();
        assert!(matches!(
            CopKmeans::new(1).with_max_iter(0).fit_predict(&points),
            Err(Error::InvalidParameter { name: "max_iter", .. })
        ));
    }

    #[test]
    fn test_store_size_mismatch() {
        let (_, points) = abcd();
        let store = ConstraintStore::new(3);
        assert!(matches!(
            CopKmeans::new(2).fit(&points, &store),
            Err(Error::InvalidParameter { name: "constraints", .. })
        ));
    }

    #[test]
    fn test_converges_and_reports_sizes() {
        let (catalog, points) = abcd();
        let fit = CopKmeans::new(2)
            .with_seed(3)
            .fit(&points, &ConstraintStore::new(4))
            .unwrap();
        assert!(fit.converged);
        assert!(fit.iterations >= 2);
        assert_eq!(fit.cluster_sizes(), vec![2, 2]);
        let pairs: Vec<_> = fit.labelled(&catalog).map(|(l, _)| l).collect();
        assert_eq!(pairs, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_single_iteration_is_not_converged() {
        let (_, points) = abcd();
        let model = CopKmeans::new(2).with_max_iter(1).with_seed(1);
        assert_eq!(model.max_iter(), 1);
        assert_eq!(CopKmeans::new(2).max_iter(), DEFAULT_MAX_ITER);
        let fit = model.fit(&points, &ConstraintStore::new(4)).unwrap();
        assert_eq!(fit.iterations, 1);
        assert!(!fit.converged);
        assert_eq!(fit.labels.len(), 4);
    }

    #[test]
    fn test_cancelled_before_first_iteration() {
        let (_, points) = abcd();
        let flag = Arc::new(AtomicBool::new(true));
        let err = CopKmeans::new(2)
            .with_cancel(flag)
            .fit_predict(&points)
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled { iterations: 0 }));
    }

    #[test]
    fn test_same_seed_same_result() {
        let points: Vec<SparseVector> = (0..30)
            .map(|i| SparseVector::from([((i % 3) as u64 + 1, 1.0 + (i as f64) * 0.01)]))
            .collect();
        let model = CopKmeans::new(3).with_seed(42);
        let a = model.fit_predict(&points).unwrap();
        let b = model.fit_predict(&points).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_init() {
        let (_, points) = abcd();
        let labels = CopKmeans::new(4)
            .with_init(Init::Random)
            .with_seed(5)
            .fit_predict(&points)
            .unwrap();
        let mut sorted = labels.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_cosine_groups_by_direction() {
        // Same directions, very different lengths: Euclidean would pair
        // the two short vectors, cosine pairs by angle.
        let points = vec![
            SparseVector::from([(1, 1.0), (2, 0.1)]),
            SparseVector::from([(1, 50.0), (2, 4.0)]),
            SparseVector::from([(2, 1.0), (1, 0.1)]),
            SparseVector::from([(2, 50.0), (1, 4.0)]),
        ];
        for s in 0..16 {
            let labels = CopKmeans::new(2)
                .with_metric(Metric::Cosine)
                .with_seed(s)
                .fit_predict(&points)
                .unwrap();
            assert_eq!(labels[0], labels[1]);
            assert_eq!(labels[2], labels[3]);
            assert_ne!(labels[0], labels[2]);
        }
    }
}
