//! Tab-separated record readers and writers.
//!
//! Vector records: `label<TAB>feature<TAB>value<TAB>feature<TAB>value...`
//!
//! Constraint records: `label_a<TAB>label_b<TAB>m|c`
//!
//! Assignment records: `label<TAB>cluster`
//!
//! Malformed records are logged and skipped; only I/O failures are errors.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::cluster::CopKmeansFit;
use crate::constraint::{ConstraintKind, ConstraintStore};
use crate::dataset::{Dataset, Rejected};
use crate::error::{Error, Result};
use crate::sparse::SparseVector;

const DELIMITER: char = '\t';

/// Line counts from one record file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadStats {
    /// Non-blank lines seen.
    pub lines: usize,
    /// Records accepted.
    pub accepted: usize,
    /// Records skipped.
    pub skipped: usize,
}

/// Read vector records from `reader` into `dataset`.
pub fn read_vectors<R: BufRead>(reader: R, dataset: &mut Dataset) -> io::Result<ReadStats> {
    for_each_record(reader, |lineno, line| vector_record(lineno, line, dataset))
}

fn vector_record(lineno: usize, line: &str, dataset: &mut Dataset) -> bool {
    let fields: Vec<&str> = line.split(DELIMITER).collect();
    if fields.len() % 2 != 1 {
        warn!(line = lineno, "format error: odd number of feature/value fields");
        return false;
    }

    let mut values = Vec::with_capacity(fields.len() / 2);
    for pair in fields[1..].chunks_exact(2) {
        match pair[1].trim().parse::<f64>() {
            Ok(v) if v.is_finite() => values.push((pair[0], v)),
            _ => {
                warn!(
                    line = lineno,
                    value = pair[1],
                    "format error: value is not a finite number"
                );
                return false;
            }
        }
    }

    let mut vector = SparseVector::with_capacity(values.len());
    for (token, weight) in values {
        let key = dataset.features_mut().intern(token);
        vector.insert(key, weight);
    }

    let label = fields[0];
    match dataset.push(label, vector) {
        Ok(_) => true,
        Err(Rejected::DuplicateLabel) => {
            warn!(line = lineno, label, "duplicate label, keeping the first record");
            false
        }
        Err(reason) => {
            debug!(line = lineno, ?reason, "skipping empty record");
            false
        }
    }
}

/// Read constraint records from `reader` into `store`.
///
/// Labels are resolved against `dataset`; unknown labels drop the record.
pub fn read_constraints<R: BufRead>(
    reader: R,
    dataset: &Dataset,
    store: &mut ConstraintStore,
) -> io::Result<ReadStats> {
    for_each_record(reader, |lineno, line| {
        let fields: Vec<&str> = line.split(DELIMITER).collect();
        let parsed = match fields.as_slice() {
            [a, b, code] => ConstraintKind::from_code(code).map(|kind| (*a, *b, kind)),
            _ => None,
        };
        let Some((a, b, kind)) = parsed else {
            debug!(line = lineno, "ignoring constraint record");
            return false;
        };
        match store.add(dataset.catalog(), a, b, kind) {
            Ok(()) => true,
            Err(e) => {
                warn!(line = lineno, error = %e, "dropping {kind} constraint");
                false
            }
        }
    })
}

/// Feed each non-blank line to `record`, which reports whether it was accepted.
///
/// Lines are split on `\n` as raw bytes. A line that is not valid UTF-8 is
/// skipped without affecting the rest of the file.
fn for_each_record<R: BufRead>(
    mut reader: R,
    mut record: impl FnMut(usize, &str) -> bool,
) -> io::Result<ReadStats> {
    let mut stats = ReadStats::default();
    let mut buf = Vec::new();
    let mut lineno = 0;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        lineno += 1;
        let bytes = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);
        let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
        if bytes.is_empty() {
            continue;
        }
        stats.lines += 1;

        let accepted = match std::str::from_utf8(bytes) {
            Ok(line) => record(lineno, line),
            Err(e) => {
                warn!(line = lineno, error = %e, "format error: line is not valid UTF-8");
                false
            }
        };
        if accepted {
            stats.accepted += 1;
        } else {
            stats.skipped += 1;
        }
    }
    Ok(stats)
}

/// Load a vector file.
pub fn load_vectors(path: &Path) -> Result<Dataset> {
    let mut dataset = Dataset::new();
    let stats = open(path).and_then(|r| read_vectors(r, &mut dataset));
    let stats = stats.map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        accepted = stats.accepted,
        skipped = stats.skipped,
        features = dataset.features().len(),
        "loaded vectors"
    );
    Ok(dataset)
}

/// Load a constraint file for `dataset`.
pub fn load_constraints(path: &Path, dataset: &Dataset) -> Result<ConstraintStore> {
    let mut store = dataset.constraint_store();
    let stats = open(path).and_then(|r| read_constraints(r, dataset, &mut store));
    let stats = stats.map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        accepted = stats.accepted,
        skipped = stats.skipped,
        "loaded constraints"
    );
    Ok(store)
}

fn open(path: &Path) -> io::Result<BufReader<File>> {
    File::open(path).map(BufReader::new)
}

/// Write `label<TAB>cluster` lines in catalog order.
pub fn write_assignments<W: Write>(
    mut out: W,
    dataset: &Dataset,
    fit: &CopKmeansFit,
) -> io::Result<()> {
    for (label, cluster) in fit.labelled(dataset.catalog()) {
        writeln!(out, "{label}{DELIMITER}{cluster}")?;
    }
    out.flush()
}

/// Write every point as `label<TAB>key<TAB>weight...`, keys ascending.
pub fn write_vectors<W: Write>(mut out: W, dataset: &Dataset) -> io::Result<()> {
    for ((_, label), vector) in dataset.catalog().iter().zip(dataset.points()) {
        write!(out, "{label}")?;
        for &(key, weight) in vector.as_slice() {
            write!(out, "{DELIMITER}{key}{DELIMITER}{weight}")?;
        }
        writeln!(out)?;
    }
    out.flush()
}
