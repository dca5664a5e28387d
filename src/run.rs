//! File-to-report pipeline behind the `copkm` binary.

use std::io::{self, Write};
use std::path::Path;

use tracing::warn;

use crate::cluster::{CopKmeans, CopKmeansFit};
use crate::constraint::ConstraintStore;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::io::{load_constraints, load_vectors, write_assignments};

/// A finished clustering run together with its inputs.
#[derive(Debug, Clone)]
pub struct Report {
    /// Points that were clustered.
    pub dataset: Dataset,
    /// Constraints that were accepted.
    pub constraints: ConstraintStore,
    /// Clustering outcome.
    pub fit: CopKmeansFit,
}

impl Report {
    /// Cluster index of `label`, if it was clustered.
    pub fn cluster_of(&self, label: &str) -> Option<usize> {
        let idx = self.dataset.catalog().index_of(label)?;
        self.fit.labels.get(idx).copied()
    }

    /// Write `label<TAB>cluster` lines in catalog order.
    pub fn write_to<W: Write>(&self, out: W) -> io::Result<()> {
        write_assignments(out, &self.dataset, &self.fit)
    }
}

/// Load `data_path` (and optionally `constraint_path`) and cluster with `model`.
///
/// Any fatal condition is returned as an error; nothing is printed.
pub fn run(model: &CopKmeans, data_path: &Path, constraint_path: Option<&Path>) -> Result<Report> {
    let dataset = load_vectors(data_path)?;
    let constraints = match constraint_path {
        Some(path) => load_constraints(path, &dataset)?,
        None => dataset.constraint_store(),
    };

    if let Some((a, b)) = constraints.find_inconsistency() {
        let catalog = dataset.catalog();
        warn!(
            a = catalog.label(a).unwrap_or_default(),
            b = catalog.label(b).unwrap_or_default(),
            "cannot-link pair is transitively must-linked; the run will fail"
        );
    }

    let fit = model.fit(dataset.points(), &constraints)?;
    Ok(Report {
        dataset,
        constraints,
        fit,
    })
}
