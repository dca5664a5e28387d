//! Pairwise must-link / cannot-link constraints.
//!
//! Every accepted constraint is stored in both directions, so "all neighbors
//! of point `i`" is a single slice lookup during assignment.

use std::fmt;

use crate::catalog::LabelCatalog;
use crate::error::{Error, Result};

/// Kind of a pairwise constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// Both points must end up in the same cluster.
    MustLink,
    /// The points must end up in different clusters.
    CannotLink,
}

impl ConstraintKind {
    /// Parse the single-character record code (`m` or `c`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "m" => Some(Self::MustLink),
            "c" => Some(Self::CannotLink),
            _ => None,
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MustLink => f.write_str("must-link"),
            Self::CannotLink => f.write_str("cannot-link"),
        }
    }
}

/// Symmetric adjacency lists of constraints over a fixed point set.
#[derive(Clone, Debug, Default)]
pub struct ConstraintStore {
    must: Vec<Vec<usize>>,
    cannot: Vec<Vec<usize>>,
    n_constraints: usize,
}

impl ConstraintStore {
    /// An empty store for `n_points` points.
    pub fn new(n_points: usize) -> Self {
        Self {
            must: vec![Vec::new(); n_points],
            cannot: vec![Vec::new(); n_points],
            n_constraints: 0,
        }
    }

    /// Number of points the store was sized for.
    pub fn n_points(&self) -> usize {
        self.must.len()
    }

    /// Add a constraint between two labelled points.
    ///
    /// Fails with [`Error::UnknownLabel`] if either label is not in `catalog`;
    /// the store is left unchanged.
    pub fn add(
        &mut self,
        catalog: &LabelCatalog,
        label_a: &str,
        label_b: &str,
        kind: ConstraintKind,
    ) -> Result<()> {
        let a = resolve(catalog, label_a)?;
        let b = resolve(catalog, label_b)?;
        self.add_indices(a, b, kind)
    }

    /// Add a constraint between two point indices.
    ///
    /// A point cannot be constrained against itself.
    pub fn add_indices(&mut self, a: usize, b: usize, kind: ConstraintKind) -> Result<()> {
        let n_items = self.n_points();
        for index in [a, b] {
            if index >= n_items {
                return Err(Error::UnknownPoint { index, n_items });
            }
        }
        if a == b {
            return Err(Error::InvalidParameter {
                name: "constraint",
                message: "endpoints must be distinct points",
            });
        }
        let lists = match kind {
            ConstraintKind::MustLink => &mut self.must,
            ConstraintKind::CannotLink => &mut self.cannot,
        };
        lists[a].push(b);
        lists[b].push(a);
        self.n_constraints += 1;
        Ok(())
    }

    /// Must-link neighbors of `point`, in insertion order.
    pub fn must_links(&self, point: usize) -> &[usize] {
        self.must.get(point).map(Vec::as_slice).unwrap_or_default()
    }

    /// Cannot-link neighbors of `point`, in insertion order.
    pub fn cannot_links(&self, point: usize) -> &[usize] {
        self.cannot.get(point).map(Vec::as_slice).unwrap_or_default()
    }

    /// True if `point` takes part in any constraint.
    pub fn is_constrained(&self, point: usize) -> bool {
        !self.must_links(point).is_empty() || !self.cannot_links(point).is_empty()
    }

    /// Number of accepted constraints (each pair counted once).
    pub fn len(&self) -> usize {
        self.n_constraints
    }

    /// True if no constraint was accepted.
    pub fn is_empty(&self) -> bool {
        self.n_constraints == 0
    }

    /// Find a cannot-link pair whose endpoints are transitively must-linked.
    ///
    /// Such a pair makes every run fail, whatever the seeding. This is a
    /// diagnostic only: assignment itself resolves must-links locally.
    pub fn find_inconsistency(&self) -> Option<(usize, usize)> {
        let n = self.n_points();
        let mut groups = UnionFind::new(n);
        for (a, neighbors) in self.must.iter().enumerate() {
            for &b in neighbors {
                groups.union(a, b);
            }
        }
        for (a, neighbors) in self.cannot.iter().enumerate() {
            for &b in neighbors {
                if a < b && groups.find(a) == groups.find(b) {
                    return Some((a, b));
                }
            }
        }
        None
    }
}

fn resolve(catalog: &LabelCatalog, label: &str) -> Result<usize> {
    catalog.index_of(label).ok_or_else(|| Error::UnknownLabel {
        label: label.to_owned(),
    })
}

#[derive(Clone, Debug)]
struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression.
        let mut cur = x;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut big, mut small) = (self.find(a), self.find(b));
        if big == small {
            return;
        }
        if self.size[big] < self.size[small] {
            std::mem::swap(&mut big, &mut small);
        }
        self.parent[small] = big;
        self.size[big] += self.size[small];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(labels: &[&str]) -> LabelCatalog {
        let mut c = LabelCatalog::new();
        for l in labels {
            c.insert(l);
        }
        c
    }

    #[test]
    fn test_constraints_are_symmetric() {
        let cat = catalog(&["A", "B", "C"]);
        let mut store = ConstraintStore::new(cat.len());
        store.add(&cat, "A", "C", ConstraintKind::MustLink).unwrap();
        store.add(&cat, "B", "C", ConstraintKind::CannotLink).unwrap();

        assert_eq!(store.must_links(0), &[2]);
        assert_eq!(store.must_links(2), &[0]);
        assert_eq!(store.cannot_links(1), &[2]);
        assert_eq!(store.cannot_links(2), &[1]);
        assert!(store.must_links(1).is_empty());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        let cat = catalog(&["A"]);
        let mut store = ConstraintStore::new(cat.len());
        let err = store.add(&cat, "A", "Z", ConstraintKind::MustLink).unwrap_err();
        assert!(matches!(err, Error::UnknownLabel { ref label } if label == "Z"));
        assert!(store.is_empty());
        assert!(store.must_links(0).is_empty());
    }

    #[test]
    fn test_out_of_range_index() {
        let mut store = ConstraintStore::new(2);
        assert!(matches!(
            store.add_indices(0, 5, ConstraintKind::CannotLink),
            Err(Error::UnknownPoint { index: 5, n_items: 2 })
        ));
    }

    #[test]
    fn test_self_constraint_rejected() {
        let mut store = ConstraintStore::new(2);
        assert!(store.add_indices(1, 1, ConstraintKind::MustLink).is_err());
        assert!(store.add_indices(0, 0, ConstraintKind::CannotLink).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_kind_codes() {
        assert_eq!(ConstraintKind::from_code("m"), Some(ConstraintKind::MustLink));
        assert_eq!(ConstraintKind::from_code("c"), Some(ConstraintKind::CannotLink));
        assert_eq!(ConstraintKind::from_code("x"), None);
        assert_eq!(ConstraintKind::from_code("must"), None);
    }

    #[test]
    fn test_find_inconsistency_through_chain() {
        let mut store = ConstraintStore::new(4);
        store.add_indices(0, 1, ConstraintKind::MustLink).unwrap();
        store.add_indices(1, 2, ConstraintKind::MustLink).unwrap();
        store.add_indices(3, 0, ConstraintKind::CannotLink).unwrap();
        assert_eq!(store.find_inconsistency(), None);

        store.add_indices(2, 0, ConstraintKind::CannotLink).unwrap();
        assert_eq!(store.find_inconsistency(), Some((0, 2)));
    }
}
