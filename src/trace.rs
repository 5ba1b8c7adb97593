//! Recording the state of a chain after every sweep
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use itertools::Itertools;
use std::collections::HashMap;
use thiserror::Error;

#[cfg(feature = "serde1")]
use std::io::Write;

/// The state of a chain after one sweep
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct Snapshot<P, G> {
    /// Concentration parameter
    pub alpha: f64,
    /// The cluster index of every item
    pub labels: Vec<usize>,
    /// The parameter value of every item's cluster, by item
    pub params: Vec<P>,
    /// Global parameters of the density, if any are sampled
    pub global_params: Option<G>,
}

impl<P, G> Snapshot<P, G> {
    /// Number of clusters
    pub fn n_clusters(&self) -> usize {
        self.labels.iter().unique().count()
    }
}

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "serde1")]
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    /// The sink refused the snapshot for its own reasons
    #[error("snapshot rejected: {0}")]
    Rejected(String),
}

/// A sink for the snapshots of a chain
pub trait Trace<P, G> {
    fn update(&mut self, snapshot: Snapshot<P, G>) -> Result<(), TraceError>;
}

/// Relabel so clusters are numbered in order of first appearance
pub fn canonical_labels(labels: &[usize]) -> Vec<usize> {
    let mut map: HashMap<usize, usize> = HashMap::new();
    labels
        .iter()
        .map(|&label| {
            let next = map.len();
            *map.entry(label).or_insert(next)
        })
        .collect()
}

/// Keeps every snapshot in memory
///
/// # Example
///
/// ```rust
/// use dpmix::trace::{MemoryTrace, Snapshot, Trace};
///
/// let mut trace: MemoryTrace<f64, ()> = MemoryTrace::new();
/// for labels in [vec![0, 0, 1], vec![1, 1, 0], vec![0, 1, 1]] {
///     let snapshot = Snapshot {
///         alpha: 1.0,
///         params: vec![0.5; 3],
///         labels,
///         global_params: None,
///     };
///     trace.update(snapshot).unwrap();
/// }
///
/// // The first two are the same partition with different labels
/// let (modal, freq) = trace.modal_partition(0).unwrap();
/// assert_eq!(modal, vec![0, 0, 1]);
/// assert!((freq - 2.0 / 3.0).abs() < 1E-12);
///
/// let cc = trace.co_clustering(0);
/// assert!((cc[0][1] - 2.0 / 3.0).abs() < 1E-12);
/// assert_eq!(cc[2][2], 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct MemoryTrace<P, G> {
    snapshots: Vec<Snapshot<P, G>>,
}

impl<P, G> Default for MemoryTrace<P, G> {
    fn default() -> Self {
        MemoryTrace {
            snapshots: Vec::new(),
        }
    }
}

impl<P, G> MemoryTrace<P, G> {
    pub fn new() -> Self {
        MemoryTrace::default()
    }

    /// Number of recorded snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn snapshots(&self) -> &[Snapshot<P, G>] {
        &self.snapshots
    }

    /// The recorded α values
    pub fn alphas(&self) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.alpha).collect()
    }

    /// Fraction of the snapshots after `burn_in` in which each pair of items
    /// share a cluster.
    ///
    /// Returns an empty matrix if no snapshots remain after burn in.
    pub fn co_clustering(&self, burn_in: usize) -> Vec<Vec<f64>> {
        let kept = self.snapshots.iter().skip(burn_in);
        let n_kept = kept.len();
        let Some(first) = self.snapshots.get(burn_in) else {
            return Vec::new();
        };
        let n = first.labels.len();
        let mut cc = vec![vec![0.0; n]; n];
        let w = (n_kept as f64).recip();
        kept.for_each(|snapshot| {
            let z = &snapshot.labels;
            for i in 0..n {
                for j in i..n {
                    if z[i] == z[j] {
                        cc[i][j] += w;
                        if i != j {
                            cc[j][i] += w;
                        }
                    }
                }
            }
        });
        cc
    }

    /// The most frequent partition after `burn_in`, in canonical labels, and
    /// the fraction of snapshots in which it appears.
    pub fn modal_partition(&self, burn_in: usize) -> Option<(Vec<usize>, f64)> {
        let n_kept = self.snapshots.len().checked_sub(burn_in)?;
        self.snapshots
            .iter()
            .skip(burn_in)
            .map(|snapshot| canonical_labels(&snapshot.labels))
            .counts()
            .into_iter()
            .max_by(|(za, ca), (zb, cb)| ca.cmp(cb).then_with(|| zb.cmp(za)))
            .map(|(z, ct)| (z, ct as f64 / n_kept as f64))
    }
}

impl<P, G> Trace<P, G> for MemoryTrace<P, G> {
    fn update(&mut self, snapshot: Snapshot<P, G>) -> Result<(), TraceError> {
        self.snapshots.push(snapshot);
        Ok(())
    }
}

/// Writes each snapshot as one line of JSON
///
/// # Example
///
/// ```rust
/// use dpmix::trace::{JsonLinesTrace, Snapshot, Trace};
///
/// let mut trace = JsonLinesTrace::new(Vec::new());
/// trace
///     .update(Snapshot::<f64, ()> {
///         alpha: 1.5,
///         labels: vec![0, 1],
///         params: vec![0.2, 0.9],
///         global_params: None,
///     })
///     .unwrap();
///
/// let text = String::from_utf8(trace.into_inner()).unwrap();
/// assert_eq!(text.lines().count(), 1);
/// assert!(text.starts_with("{\"alpha\":1.5"));
/// ```
#[cfg(feature = "serde1")]
#[derive(Debug)]
pub struct JsonLinesTrace<W: Write> {
    writer: W,
}

#[cfg(feature = "serde1")]
impl<W: Write> JsonLinesTrace<W> {
    pub fn new(writer: W) -> Self {
        JsonLinesTrace { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(feature = "serde1")]
impl<P, G, W> Trace<P, G> for JsonLinesTrace<W>
where
    P: Serialize,
    G: Serialize,
    W: Write,
{
    fn update(&mut self, snapshot: Snapshot<P, G>) -> Result<(), TraceError> {
        serde_json::to_writer(&mut self.writer, &snapshot)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1E-12;

    fn snapshot(labels: Vec<usize>) -> Snapshot<f64, ()> {
        let n = labels.len();
        Snapshot {
            alpha: 1.0,
            labels,
            params: vec![0.0; n],
            global_params: None,
        }
    }

    #[test]
    fn canonical_labels_by_first_appearance() {
        assert_eq!(canonical_labels(&[3, 3, 0, 7, 0]), vec![0, 0, 1, 2, 1]);
        assert!(canonical_labels(&[]).is_empty());
    }

    #[test]
    fn n_clusters_counts_distinct_labels() {
        assert_eq!(snapshot(vec![4, 1, 4, 2]).n_clusters(), 3);
    }

    #[test]
    fn co_clustering_skips_burn_in() {
        let mut trace: MemoryTrace<f64, ()> = MemoryTrace::new();
        trace.update(snapshot(vec![0, 1])).unwrap();
        trace.update(snapshot(vec![0, 0])).unwrap();
        trace.update(snapshot(vec![1, 1])).unwrap();

        let cc = trace.co_clustering(1);
        assert::close(cc[0][1], 1.0, TOL);
        assert::close(cc[1][0], 1.0, TOL);

        let cc = trace.co_clustering(0);
        assert::close(cc[0][1], 2.0 / 3.0, TOL);
        assert::close(cc[0][0], 1.0, TOL);

        assert!(trace.co_clustering(3).is_empty());
    }

    #[test]
    fn modal_partition_none_when_burned_out() {
        let mut trace: MemoryTrace<f64, ()> = MemoryTrace::new();
        trace.update(snapshot(vec![0, 1])).unwrap();
        assert!(trace.modal_partition(2).is_none());
        assert!(trace.modal_partition(1).is_none());
        assert_eq!(trace.modal_partition(0), Some((vec![0, 1], 1.0)));
    }

    #[test]
    fn alphas_in_order() {
        let mut trace: MemoryTrace<f64, ()> = MemoryTrace::new();
        for alpha in [0.5, 1.5, 2.5] {
            let mut s = snapshot(vec![0]);
            s.alpha = alpha;
            trace.update(s).unwrap();
        }
        assert_eq!(trace.alphas(), vec![0.5, 1.5, 2.5]);
        assert_eq!(trace.len(), 3);
    }

    #[cfg(feature = "serde1")]
    #[test]
    fn json_lines_round_trip() {
        let mut trace = JsonLinesTrace::new(Vec::new());
        trace.update(snapshot(vec![0, 0, 1])).unwrap();
        trace.update(snapshot(vec![0, 1, 2])).unwrap();
        let text = String::from_utf8(trace.into_inner()).unwrap();

        let back: Vec<Snapshot<f64, ()>> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(back, vec![snapshot(vec![0, 0, 1]), snapshot(vec![0, 1, 2])]);
    }
}
