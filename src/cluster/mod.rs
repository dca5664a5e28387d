//! Constrained clustering of sparse vectors.
//!
//! ## K-means with side information
//!
//! Plain k-means assigns each point to its nearest centroid and moves
//! centroids to the mean of their points. COP-KMeans keeps that loop but
//! lets the caller say that two points **must** share a cluster, or
//! **cannot** share one. The assignment step never breaks a constraint; if
//! it cannot place a point without doing so, the whole run fails.
//!
//! The pieces are exposed individually so they can be tested and reused:
//!
//! - [`seed`]: k-means++ or uniform initial centroids
//! - [`assign`]: one constraint-aware assignment pass
//! - [`update_centroids`]: mean of each cluster's sparse vectors
//! - [`CopKmeans`]: the driver that loops assign/update to a fixed point
//!
//! ## Usage
//!
//! ```rust
//! use copkm::cluster::CopKmeans;
//! use copkm::{ConstraintKind, ConstraintStore, SparseVector};
//!
//! let points = vec![
//!     SparseVector::from([(1, 1.0)]),
//!     SparseVector::from([(1, 0.9)]),
//!     SparseVector::from([(2, 1.0)]),
//!     SparseVector::from([(2, 0.9)]),
//! ];
//! let mut constraints = ConstraintStore::new(points.len());
//! constraints.add_indices(0, 3, ConstraintKind::MustLink).unwrap();
//!
//! let fit = CopKmeans::new(2).with_seed(42).fit(&points, &constraints).unwrap();
//! assert_eq!(fit.labels[0], fit.labels[3]);
//! ```

mod assign;
mod cop_kmeans;
mod seed;
mod traits;
mod update;

pub use assign::assign;
pub use cop_kmeans::{CopKmeans, CopKmeansFit, DEFAULT_MAX_ITER};
pub use seed::{seed, Init, Seeding};
pub use traits::Clustering;
pub use update::update_centroids;
