//! Constrained k-means over sparse vectors.
//!
//! `copkm` clusters labelled sparse vectors into `k` groups while honouring
//! pairwise **must-link** and **cannot-link** constraints (COP-KMeans).
//!
//! - [`sparse`]: sparse vectors, squared Euclidean and cosine distance
//! - [`catalog`] / [`dataset`]: label and feature interning, the point set
//! - [`constraint`]: symmetric constraint store
//! - [`cluster`]: seeding, assignment, centroid update, and the driver
//! - [`io`] / [`run`]: tab-separated records in, assignments out

#![forbid(unsafe_code)]

pub mod catalog;
pub mod cluster;
pub mod constraint;
pub mod dataset;
pub mod error;
pub mod io;
pub mod run;
pub mod sparse;

pub use catalog::{FeatureDictionary, LabelCatalog};
pub use cluster::{Clustering, CopKmeans, CopKmeansFit, Init};
pub use constraint::{ConstraintKind, ConstraintStore};
pub use dataset::Dataset;
pub use error::{Error, Result};
pub use run::{run, Report};
pub use sparse::{cosine_distance, squared_distance, Metric, SparseVector};
