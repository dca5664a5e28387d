//! In-memory point set.

use crate::catalog::{FeatureDictionary, LabelCatalog};
use crate::constraint::ConstraintStore;
use crate::sparse::SparseVector;

/// Why a point was not added to a [`Dataset`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejected {
    /// The label is empty.
    EmptyLabel,
    /// The vector has no non-zero entries.
    EmptyVector,
    /// A point with the same label was already added.
    DuplicateLabel,
}

/// Labelled sparse vectors, fixed before clustering starts.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    catalog: LabelCatalog,
    features: FeatureDictionary,
    points: Vec<SparseVector>,
}

impl Dataset {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a labelled point and return its index.
    ///
    /// The first point with a given label wins; later duplicates are rejected.
    pub fn push(&mut self, label: &str, vector: SparseVector) -> Result<usize, Rejected> {
        if label.is_empty() {
            return Err(Rejected::EmptyLabel);
        }
        if vector.is_empty() {
            return Err(Rejected::EmptyVector);
        }
        let idx = self.catalog.insert(label).ok_or(Rejected::DuplicateLabel)?;
        self.points.push(vector);
        Ok(idx)
    }

    /// Points in index order.
    pub fn points(&self) -> &[SparseVector] {
        &self.points
    }

    /// Label <-> index mapping.
    pub fn catalog(&self) -> &LabelCatalog {
        &self.catalog
    }

    /// Feature token dictionary used while reading records.
    pub fn features(&self) -> &FeatureDictionary {
        &self.features
    }

    pub(crate) fn features_mut(&mut self) -> &mut FeatureDictionary {
        &mut self.features
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if no point was added.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// An empty constraint store sized for this dataset.
    pub fn constraint_store(&self) -> ConstraintStore {
        ConstraintStore::new(self.len())
    }
}
