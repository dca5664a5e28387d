use crate::error::Result;
use crate::sparse::SparseVector;

/// Common interface for hard clustering over sparse vectors (one label per point).
pub trait Clustering {
    /// Fit the model and return one cluster label per input point.
    fn fit_predict(&self, data: &[SparseVector]) -> Result<Vec<usize>>;

    /// The configured number of clusters.
    fn n_clusters(&self) -> usize;
}
