//! Per-node and per-edge slack storage.

use crate::graph::TimingGraph;
use crate::ids::{DomainId, EdgeId, NodeId};
use crate::time::Time;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Slack of one data tag. A domain appears once more for each startpoint
/// scoped apart by a path exception.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DomainSlack {
    /// The launch domain.
    pub domain: DomainId,
    /// `required - arrival`; negative means a violation.
    pub slack: Time,
}

/// The slacks at one node or edge, one entry per constrained domain.
pub type Slacks = SmallVec<[DomainSlack; 2]>;

/// Worst (smallest) slack in a set, if any.
pub fn worst(slacks: &[DomainSlack]) -> Option<Time> {
    slacks
        .iter()
        .map(|s| s.slack)
        .reduce(Time::min)
}

/// Slacks computed by visiting one node: its own, and those of its fan-out edges.
#[derive(Debug, Clone, Default)]
pub struct SlackUpdate {
    /// Slacks of the visited node.
    pub node: Slacks,
    /// Slacks of each outgoing edge.
    pub edges: Vec<(EdgeId, Slacks)>,
}

/// Slacks for every node and edge of a graph.
#[derive(Debug, Clone, Default)]
pub struct SlackStore {
    nodes: Vec<Slacks>,
    edges: Vec<Slacks>,
}

impl SlackStore {
    /// An empty store sized for `graph`.
    pub fn new(graph: &TimingGraph) -> Self {
        Self {
            nodes: vec![Slacks::new(); graph.node_count()],
            edges: vec![Slacks::new(); graph.edge_count()],
        }
    }

    /// Slacks of a node.
    pub fn node(&self, node: NodeId) -> &[DomainSlack] {
        &self.nodes[node.index()]
    }

    /// Slacks of an edge.
    pub fn edge(&self, edge: EdgeId) -> &[DomainSlack] {
        &self.edges[edge.index()]
    }

    /// Stores the result of visiting `node`.
    pub fn commit(&mut self, node: NodeId, update: SlackUpdate) {
        self.nodes[node.index()] = update.node;
        for (edge, slacks) in update.edges {
            self.edges[edge.index()] = slacks;
        }
    }

    /// Iterates every node with at least one slack.
    pub fn constrained_nodes(&self) -> impl Iterator<Item = (NodeId, &[DomainSlack])> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_empty())
            .map(|(i, s)| (NodeId::from_index(i), s.as_slice()))
    }

    /// The worst slack over all edges.
    pub fn worst_edge_slack(&self) -> Option<Time> {
        self.edges.iter().filter_map(|s| worst(s)).reduce(Time::min)
    }
}
