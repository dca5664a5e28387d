use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by the clustering engine and its record readers.
#[derive(Debug, Error)]
pub enum Error {
    /// Input point set is empty.
    #[error("empty input")]
    EmptyInput,

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Requested cluster count is incompatible with the dataset.
    #[error("invalid cluster count: requested {requested}, but dataset has {n_items} items")]
    InvalidClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of items in the dataset.
        n_items: usize,
    },

    /// Two already-assigned must-link neighbors of a point sit in different clusters.
    #[error(
        "constraint inconsistency: point {point} has must-link targets in clusters {first} and {second}"
    )]
    MustLinkConflict {
        /// Point being assigned.
        point: usize,
        /// Cluster proposed by the first assigned must-link neighbor.
        first: usize,
        /// Conflicting cluster proposed by a later neighbor.
        second: usize,
    },

    /// The must-link target cluster of a point is forbidden by a cannot-link neighbor.
    #[error(
        "constraint inconsistency: point {point} must join cluster {cluster}, which a cannot-link neighbor occupies"
    )]
    LinkConsistencyConflict {
        /// Point being assigned.
        point: usize,
        /// Must-link target cluster.
        cluster: usize,
    },

    /// Every cluster is forbidden for a point by its cannot-link neighbors.
    #[error("no feasible cluster for point {point}: all {n_clusters} clusters are forbidden")]
    NoFeasibleCluster {
        /// Point being assigned.
        point: usize,
        /// Number of clusters in the run.
        n_clusters: usize,
    },

    /// A constraint referenced a point index outside the dataset.
    #[error("unknown point index {index} (dataset has {n_items} items)")]
    UnknownPoint {
        /// Offending index.
        index: usize,
        /// Number of items in the dataset.
        n_items: usize,
    },

    /// A constraint referenced a label that no ingested point carries.
    #[error("label not found: {label}")]
    UnknownLabel {
        /// Unresolved label.
        label: String,
    },

    /// The run was cancelled between iterations.
    #[error("clustering cancelled after {iterations} iterations")]
    Cancelled {
        /// Iterations completed before cancellation was observed.
        iterations: usize,
    },

    /// Failed to read or write a record file.
    #[error("cannot access {}: {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Whether this error reports an inconsistent constraint set.
    pub fn is_contradiction(&self) -> bool {
        matches!(
            self,
            Error::MustLinkConflict { .. }
                | Error::LinkConsistencyConflict { .. }
                | Error::NoFeasibleCluster { .. }
        )
    }
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
