//! Sparse vectors keyed by integer feature id.
//!
//! Only non-zero weights are stored, sorted by key. A key that is absent
//! reads as `0.0`, so two vectors of different "dimensionality" can be
//! compared directly without densifying either of them.
//!
//! Every reduction walks keys in ascending order. Floating-point sums then
//! come out bit-identical across runs and in both argument orders.

use std::cmp::Ordering;

/// Feature key type.
pub type FeatureKey = u64;

/// A sparse vector: non-zero weights sorted by feature key.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(FeatureKey, f64)>,
}

impl SparseVector {
    /// Create an empty vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty vector with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Set `key` to `weight`. A zero weight removes the entry.
    pub fn insert(&mut self, key: FeatureKey, weight: f64) {
        match self.entries.binary_search_by_key(&key, |&(k, _)| k) {
            Ok(pos) if weight == 0.0 => {
                self.entries.remove(pos);
            }
            Ok(pos) => self.entries[pos].1 = weight,
            Err(_) if weight == 0.0 => {}
            Err(pos) => self.entries.insert(pos, (key, weight)),
        }
    }

    /// Weight stored at `key` (`0.0` when absent).
    pub fn get(&self, key: FeatureKey) -> f64 {
        self.entries
            .binary_search_by_key(&key, |&(k, _)| k)
            .map_or(0.0, |pos| self.entries[pos].1)
    }

    /// Number of non-zero entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if every weight is zero.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, weight)` pairs in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (FeatureKey, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Entries in ascending key order.
    pub fn as_slice(&self) -> &[(FeatureKey, f64)] {
        &self.entries
    }

    /// Component-wise `self += other`.
    pub fn accumulate(&mut self, other: &SparseVector) {
        let mut merged = Vec::with_capacity(self.entries.len() + other.entries.len());
        merge_join(&self.entries, &other.entries, |key, a, b| {
            let sum = a + b;
            if sum != 0.0 {
                merged.push((key, sum));
            }
        });
        self.entries = merged;
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt()
    }

    /// Inner product over shared keys.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let mut prod = 0.0;
        merge_join(&self.entries, &other.entries, |_, a, b| prod += a * b);
        prod
    }

    /// Squared Euclidean distance to `other` over the union of both key sets.
    pub fn squared_distance(&self, other: &SparseVector) -> f64 {
        squared_distance(self, other)
    }
}

/// Visit the union of two sorted key sets in ascending order as `(key, a, b)`,
/// with `0.0` for the side that lacks the key.
fn merge_join(
    a: &[(FeatureKey, f64)],
    b: &[(FeatureKey, f64)],
    mut visit: impl FnMut(FeatureKey, f64, f64),
) {
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let (ka, wa) = a[i];
        let (kb, wb) = b[j];
        match ka.cmp(&kb) {
            Ordering::Less => {
                visit(ka, wa, 0.0);
                i += 1;
            }
            Ordering::Greater => {
                visit(kb, 0.0, wb);
                j += 1;
            }
            Ordering::Equal => {
                visit(ka, wa, wb);
                i += 1;
                j += 1;
            }
        }
    }
    for &(k, w) in &a[i..] {
        visit(k, w, 0.0);
    }
    for &(k, w) in &b[j..] {
        visit(k, 0.0, w);
    }
}

/// Squared Euclidean distance between two sparse vectors.
///
/// Sums `(a[k] - b[k])²` over every key present in either vector, in
/// ascending key order. Runs in `O(|a| + |b|)`.
pub fn squared_distance(a: &SparseVector, b: &SparseVector) -> f64 {
    let mut dist = 0.0;
    merge_join(&a.entries, &b.entries, |_, wa, wb| {
        let d = wa - wb;
        dist += d * d;
    });
    dist
}

/// Cosine distance `1 - cos(a, b)`.
///
/// A zero-length vector has similarity 0 with everything, so its distance is 1.
/// Rounding can push `cos` slightly outside `[-1, 1]`; it is clamped back.
pub fn cosine_distance(a: &SparseVector, b: &SparseVector) -> f64 {
    let (na, nb) = (a.norm(), b.norm());
    if na == 0.0 || nb == 0.0 {
        return 1.0;
    }
    let cos = a.dot(b) / (na * nb);
    if cos.is_nan() {
        1.0
    } else {
        1.0 - cos.clamp(-1.0, 1.0)
    }
}

/// Dissimilarity used for seeding and assignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Metric {
    /// Squared Euclidean distance.
    #[default]
    SquaredEuclidean,
    /// One minus cosine similarity.
    Cosine,
}

impl Metric {
    /// Distance between `a` and `b` under this metric.
    pub fn distance(self, a: &SparseVector, b: &SparseVector) -> f64 {
        match self {
            Metric::SquaredEuclidean => squared_distance(a, b),
            Metric::Cosine => cosine_distance(a, b),
        }
    }
}

impl FromIterator<(FeatureKey, f64)> for SparseVector {
    /// Later pairs overwrite earlier ones with the same key.
    fn from_iter<I: IntoIterator<Item = (FeatureKey, f64)>>(iter: I) -> Self {
        let mut pairs: Vec<_> = iter.into_iter().collect();
        // Stable, so equal keys keep input order and the last one wins below.
        pairs.sort_by_key(|&(k, _)| k);
        let mut entries: Vec<(FeatureKey, f64)> = Vec::with_capacity(pairs.len());
        for (key, weight) in pairs {
            match entries.last_mut() {
                Some(last) if last.0 == key => last.1 = weight,
                _ => entries.push((key, weight)),
            }
        }
        entries.retain(|&(_, w)| w != 0.0);
        Self { entries }
    }
}

impl<const N: usize> From<[(FeatureKey, f64); N]> for SparseVector {
    fn from(pairs: [(FeatureKey, f64); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<Vec<(FeatureKey, f64)>> for SparseVector {
    fn from(pairs: Vec<(FeatureKey, f64)>) -> Self {
        pairs.into_iter().collect()
    }
}
