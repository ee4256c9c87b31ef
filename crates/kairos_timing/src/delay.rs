//! Edge delay models.
//!
//! The graph stores topology only. Delays come from a [`DelayCalculator`]
//! looked up on demand, so one graph can be analyzed under several delay
//! models. Calculators must be pure: a parallel walker may call them from
//! several threads and more than once per edge.

use crate::graph::TimingGraph;
use crate::ids::EdgeId;
use crate::time::Time;
use serde::{Deserialize, Serialize};

/// Supplies the minimum and maximum propagation delay of an edge.
pub trait DelayCalculator: Sync {
    /// Shortest delay through `edge`, used by hold analysis.
    fn min_edge_delay(&self, graph: &TimingGraph, edge: EdgeId) -> Time;

    /// Longest delay through `edge`, used by setup analysis.
    fn max_edge_delay(&self, graph: &TimingGraph, edge: EdgeId) -> Time;
}

impl<C: DelayCalculator + ?Sized> DelayCalculator for &C {
    fn min_edge_delay(&self, graph: &TimingGraph, edge: EdgeId) -> Time {
        (**self).min_edge_delay(graph, edge)
    }

    fn max_edge_delay(&self, graph: &TimingGraph, edge: EdgeId) -> Time {
        (**self).max_edge_delay(graph, edge)
    }
}

/// The same delay on every edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantDelayCalculator {
    min: Time,
    max: Time,
}

impl ConstantDelayCalculator {
    /// Uses `delay_ns` as both the minimum and maximum delay.
    pub fn new(delay_ns: f64) -> Self {
        Self::with_min_max(delay_ns, delay_ns)
    }

    /// Separate minimum and maximum delays.
    pub fn with_min_max(min_ns: f64, max_ns: f64) -> Self {
        Self {
            min: Time::new(min_ns),
            max: Time::new(max_ns),
        }
    }
}

impl DelayCalculator for ConstantDelayCalculator {
    fn min_edge_delay(&self, graph: &TimingGraph, edge: EdgeId) -> Time {
        assert!(
            edge.index() < graph.edge_count(),
            "edge {edge} out of range ({} edges)",
            graph.edge_count()
        );
        self.min
    }

    fn max_edge_delay(&self, graph: &TimingGraph, edge: EdgeId) -> Time {
        assert!(
            edge.index() < graph.edge_count(),
            "edge {edge} out of range ({} edges)",
            graph.edge_count()
        );
        self.max
    }
}

/// Min/max delay of one edge in nanoseconds, mirroring a liberty-style
/// min/typ/max triple without the typical corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeDelay {
    /// Fast-corner delay.
    pub min_ns: f64,
    /// Slow-corner delay.
    pub max_ns: f64,
}

impl EdgeDelay {
    /// Creates a delay from its two corners.
    pub fn new(min_ns: f64, max_ns: f64) -> Self {
        Self { min_ns, max_ns }
    }

    /// A delay with identical corners.
    pub fn fixed(ns: f64) -> Self {
        Self::new(ns, ns)
    }
}

/// A precomputed delay for every edge, indexed by [`EdgeId`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixedDelayCalculator {
    delays: Vec<EdgeDelay>,
}

impl FixedDelayCalculator {
    /// Wraps a per-edge table. `delays[i]` belongs to edge `i`.
    pub fn new(delays: Vec<EdgeDelay>) -> Self {
        Self { delays }
    }

    /// Builds the table by evaluating `f` on every edge of `graph`.
    pub fn from_fn(graph: &TimingGraph, f: impl FnMut(EdgeId) -> EdgeDelay) -> Self {
        Self::new(graph.edge_ids().map(f).collect())
    }

    /// Overwrites the delay of one edge.
    pub fn set(&mut self, edge: EdgeId, delay: EdgeDelay) {
        self.delays[edge.index()] = delay;
    }

    /// Number of edges covered by the table.
    pub fn len(&self) -> usize {
        self.delays.len()
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.delays.is_empty()
    }

    fn lookup(&self, edge: EdgeId) -> &EdgeDelay {
        match self.delays.get(edge.index()) {
            Some(d) => d,
            None => panic!(
                "no delay for edge {edge}: table covers {} edges",
                self.delays.len()
            ),
        }
    }
}

impl DelayCalculator for FixedDelayCalculator {
    fn min_edge_delay(&self, _graph: &TimingGraph, edge: EdgeId) -> Time {
        Time::new(self.lookup(edge).min_ns)
    }

    fn max_edge_delay(&self, _graph: &TimingGraph, edge: EdgeId) -> Time {
        Time::new(self.lookup(edge).max_ns)
    }
}

/// Scales another calculator's delays to model on-chip variation.
#[derive(Debug, Clone, Copy)]
pub struct DeratedDelayCalculator<C> {
    inner: C,
    early: f64,
    late: f64,
}

impl<C: DelayCalculator> DeratedDelayCalculator<C> {
    /// Multiplies minimum delays by `early` and maximum delays by `late`.
    pub fn new(inner: C, early: f64, late: f64) -> Self {
        Self { inner, early, late }
    }
}

impl<C: DelayCalculator> DelayCalculator for DeratedDelayCalculator<C> {
    fn min_edge_delay(&self, graph: &TimingGraph, edge: EdgeId) -> Time {
        Time::new(self.inner.min_edge_delay(graph, edge).value() * self.early)
    }

    fn max_edge_delay(&self, graph: &TimingGraph, edge: EdgeId) -> Time {
        Time::new(self.inner.max_edge_delay(graph, edge).value() * self.late)
    }
}
