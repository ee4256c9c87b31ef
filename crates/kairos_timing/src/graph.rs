//! Timing graph: typed nodes, delay-free edges, and a precomputed levelization.
//!
//! A [`TimingGraph`] is assembled with a [`TimingGraphBuilder`] and finalized
//! by [`TimingGraphBuilder::build`], which checks the topology and partitions
//! the nodes into levels such that every edge goes from a lower level to a
//! strictly higher one. The finalized graph is immutable; tags, constraints
//! and delays live in separate structures keyed by [`NodeId`]/[`EdgeId`], so
//! one graph can be analyzed under several constraint sets or delay models.

use crate::error::GraphError;
use crate::ids::{EdgeId, LevelId, NodeId};
use serde::{Deserialize, Serialize};

/// The structural role of a timing node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// Origin of a data or clock path (primary input, register output). No fan-in.
    Source,
    /// Destination of a path (primary output, register data input). No fan-out.
    Sink,
    /// Input pin of a multi-input element.
    Ipin,
    /// Output pin of a multi-output element.
    Opin,
}

/// A node in the timing graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingNode {
    /// The unique ID of this node.
    pub id: NodeId,
    /// Human-readable name (e.g. `"lut_0/O"`), used in reports only.
    pub name: String,
    /// The structural role of this node.
    pub node_type: NodeType,
}

/// A directed edge. The delay is not stored here; it is looked up from a
/// [`DelayCalculator`](crate::delay::DelayCalculator).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingEdge {
    /// The unique ID of this edge.
    pub id: EdgeId,
    /// The driving node.
    pub from: NodeId,
    /// The driven node.
    pub to: NodeId,
}

/// Per-node edge lists in compressed sparse row form.
#[derive(Debug, Clone, Default)]
struct EdgeCsr {
    start: Vec<usize>,
    items: Vec<EdgeId>,
}

impl EdgeCsr {
    /// Groups edges by `keys[edge]`, keeping ascending edge order within a node.
    fn from_keys(num_nodes: usize, keys: &[NodeId]) -> Self {
        let mut start = vec![0usize; num_nodes + 1];
        let mut items = vec![EdgeId::from_raw(0); keys.len()];
        for key in keys {
            start[key.index()] += 1;
        }
        for i in 1..=num_nodes {
            start[i] += start[i - 1];
        }
        for (i, key) in keys.iter().enumerate().rev() {
            let slot = &mut start[key.index()];
            *slot -= 1;
            items[*slot] = EdgeId::from_index(i);
        }
        Self { start, items }
    }

    fn get(&self, node: NodeId) -> &[EdgeId] {
        let i = node.index();
        &self.items[self.start[i]..self.start[i + 1]]
    }
}

/// Collects nodes and edges before levelization.
///
/// Edges are not checked until [`build`](Self::build), so the builder can be
/// filled in any order (or deserialized from a persisted netlist).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimingGraphBuilder {
    nodes: Vec<TimingNode>,
    edges: Vec<TimingEdge>,
}

impl TimingGraphBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node and returns its ID.
    pub fn add_node(&mut self, name: impl Into<String>, node_type: NodeType) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(TimingNode {
            id,
            name: name.into(),
            node_type,
        });
        id
    }

    /// Adds a directed edge and returns its ID.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> EdgeId {
        let id = EdgeId::from_index(self.edges.len());
        self.edges.push(TimingEdge { id, from, to });
        id
    }

    /// Number of nodes added so far.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges added so far.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Validates the topology and levelizes it into an immutable graph.
    pub fn build(self) -> Result<TimingGraph, GraphError> {
        let node_count = self.nodes.len();
        if let Some((position, node)) = self
            .nodes
            .iter()
            .enumerate()
            .find(|(i, n)| n.id.index() != *i)
        {
            return Err(GraphError::NodeIdMismatch {
                position,
                id: node.id,
            });
        }
        if let Some((position, edge)) = self
            .edges
            .iter()
            .enumerate()
            .find(|(i, e)| e.id.index() != *i)
        {
            return Err(GraphError::EdgeIdMismatch {
                position,
                id: edge.id,
            });
        }
        for edge in &self.edges {
            for node in [edge.from, edge.to] {
                if node.index() >= node_count {
                    return Err(GraphError::NodeOutOfRange {
                        edge: edge.id,
                        node,
                        node_count,
                    });
                }
            }
            if edge.from == edge.to {
                return Err(GraphError::SelfLoop {
                    edge: edge.id,
                    node: edge.from,
                });
            }
        }

        let sources: Vec<NodeId> = self.edges.iter().map(|e| e.from).collect();
        let sinks: Vec<NodeId> = self.edges.iter().map(|e| e.to).collect();
        let fanout = EdgeCsr::from_keys(node_count, &sources);
        let fanin = EdgeCsr::from_keys(node_count, &sinks);

        for node in &self.nodes {
            match node.node_type {
                NodeType::Source => {
                    if let Some(&edge) = fanin.get(node.id).first() {
                        return Err(GraphError::SourceHasFanin {
                            node: node.id,
                            edge,
                        });
                    }
                }
                NodeType::Sink => {
                    if let Some(&edge) = fanout.get(node.id).first() {
                        return Err(GraphError::SinkHasFanout {
                            node: node.id,
                            edge,
                        });
                    }
                }
                NodeType::Ipin | NodeType::Opin => {}
            }
        }

        let node_levels = levelize(&self.edges, &fanin, &fanout, node_count)?;
        let level_count = node_levels
            .iter()
            .map(|l| l.index() + 1)
            .max()
            .unwrap_or(0);
        let mut levels: Vec<Vec<NodeId>> = vec![Vec::new(); level_count];
        for (i, level) in node_levels.iter().enumerate() {
            levels[level.index()].push(NodeId::from_index(i));
        }

        let primary_outputs: Vec<NodeId> = (0..node_count)
            .map(NodeId::from_index)
            .filter(|&n| fanout.get(n).is_empty())
            .collect();
        let boundary_nodes: Vec<NodeId> = (0..node_count)
            .map(NodeId::from_index)
            .filter(|&n| fanin.get(n).is_empty() || fanout.get(n).is_empty())
            .collect();

        log::debug!(
            "levelized timing graph: {} nodes, {} edges, {} levels, {} primary inputs, {} primary outputs",
            node_count,
            self.edges.len(),
            levels.len(),
            levels.first().map_or(0, Vec::len),
            primary_outputs.len()
        );

        Ok(TimingGraph {
            nodes: self.nodes,
            edges: self.edges,
            fanin,
            fanout,
            node_levels,
            levels,
            primary_outputs,
            boundary_nodes,
        })
    }
}

/// Assigns each node `1 + max(level of predecessors)`, with fan-in-free
/// nodes at level 0. Nodes never released (cycle members and everything
/// downstream of a cycle) make the graph invalid.
fn levelize(
    edges: &[TimingEdge],
    fanin: &EdgeCsr,
    fanout: &EdgeCsr,
    node_count: usize,
) -> Result<Vec<LevelId>, GraphError> {
    let mut pending: Vec<usize> = (0..node_count)
        .map(|i| fanin.get(NodeId::from_index(i)).len())
        .collect();
    let mut level = vec![0u32; node_count];
    let mut order: Vec<NodeId> = (0..node_count)
        .filter(|&i| pending[i] == 0)
        .map(NodeId::from_index)
        .collect();

    let mut head = 0;
    while head < order.len() {
        let node = order[head];
        head += 1;
        let next = level[node.index()] + 1;
        for &edge in fanout.get(node) {
            let to = edges[edge.index()].to.index();
            level[to] = level[to].max(next);
            pending[to] -= 1;
            if pending[to] == 0 {
                order.push(NodeId::from_index(to));
            }
        }
    }

    if order.len() < node_count {
        let example = pending
            .iter()
            .position(|&p| p > 0)
            .map(NodeId::from_index)
            .unwrap_or(NodeId::from_raw(0));
        return Err(GraphError::Cycle {
            remaining: node_count - order.len(),
            example,
        });
    }

    Ok(level.into_iter().map(LevelId::from_raw).collect())
}

/// A finalized, levelized timing graph.
#[derive(Debug, Clone)]
pub struct TimingGraph {
    nodes: Vec<TimingNode>,
    edges: Vec<TimingEdge>,
    fanin: EdgeCsr,
    fanout: EdgeCsr,
    node_levels: Vec<LevelId>,
    levels: Vec<Vec<NodeId>>,
    primary_outputs: Vec<NodeId>,
    boundary_nodes: Vec<NodeId>,
}

impl TimingGraph {
    /// Returns the node with the given ID.
    pub fn node(&self, id: NodeId) -> &TimingNode {
        &self.nodes[id.index()]
    }

    /// Returns the edge with the given ID.
    pub fn edge(&self, id: EdgeId) -> &TimingEdge {
        &self.edges[id.index()]
    }

    /// The structural role of a node.
    pub fn node_type(&self, id: NodeId) -> NodeType {
        self.node(id).node_type
    }

    /// The level a node was assigned to.
    pub fn node_level(&self, id: NodeId) -> LevelId {
        self.node_levels[id.index()]
    }

    /// The driving node of an edge.
    pub fn edge_src(&self, id: EdgeId) -> NodeId {
        self.edge(id).from
    }

    /// The driven node of an edge.
    pub fn edge_sink(&self, id: EdgeId) -> NodeId {
        self.edge(id).to
    }

    /// Edges arriving at `node`, in ascending ID order.
    pub fn in_edges(&self, node: NodeId) -> &[EdgeId] {
        self.fanin.get(node)
    }

    /// Edges leaving `node`, in ascending ID order.
    pub fn out_edges(&self, node: NodeId) -> &[EdgeId] {
        self.fanout.get(node)
    }

    /// Iterates all node IDs in ascending order.
    pub fn node_ids(&self) -> impl ExactSizeIterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|n| n.id)
    }

    /// Iterates all edge IDs in ascending order.
    pub fn edge_ids(&self) -> impl ExactSizeIterator<Item = EdgeId> + '_ {
        self.edges.iter().map(|e| e.id)
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of levels.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Levels in increasing order, `L0` first.
    pub fn levels(&self) -> impl DoubleEndedIterator<Item = LevelId> + ExactSizeIterator {
        (0..self.levels.len()).map(LevelId::from_index)
    }

    /// Levels in decreasing order, deepest level first.
    pub fn reversed_levels(&self) -> impl Iterator<Item = LevelId> {
        self.levels().rev()
    }

    /// Nodes of one level, in ascending ID order.
    pub fn level_nodes(&self, level: LevelId) -> &[NodeId] {
        &self.levels[level.index()]
    }

    /// Nodes without fan-in (level 0).
    pub fn primary_inputs(&self) -> &[NodeId] {
        self.levels.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Nodes without fan-out.
    pub fn primary_outputs(&self) -> &[NodeId] {
        &self.primary_outputs
    }

    /// Nodes that are primary inputs, primary outputs, or both, each once.
    pub fn boundary_nodes(&self) -> &[NodeId] {
        &self.boundary_nodes
    }

    /// `"n4 (ff0/D)"`, for diagnostics.
    pub fn describe_node(&self, id: NodeId) -> String {
        format!("{id} ({})", self.node(id).name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> (TimingGraph, [NodeId; 4]) {
        let mut b = TimingGraphBuilder::new();
        let a = b.add_node("a", NodeType::Source);
        let c = b.add_node("c", NodeType::Ipin);
        let d = b.add_node("d", NodeType::Ipin);
        let s = b.add_node("b", NodeType::Sink);
        b.add_edge(a, c);
        b.add_edge(a, d);
        b.add_edge(c, s);
        b.add_edge(d, s);
        (b.build().unwrap(), [a, c, d, s])
    }

    #[test]
    fn empty_graph() {
        let g = TimingGraphBuilder::new().build().unwrap();
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.level_count(), 0);
        assert!(g.primary_inputs().is_empty());
        assert!(g.primary_outputs().is_empty());
    }

    #[test]
    fn diamond_levels() {
        let (g, [a, c, d, s]) = diamond();
        assert_eq!(g.level_count(), 3);
        assert_eq!(g.level_nodes(LevelId::ZERO), &[a]);
        assert_eq!(g.level_nodes(LevelId::from_raw(1)), &[c, d]);
        assert_eq!(g.level_nodes(LevelId::from_raw(2)), &[s]);
        assert_eq!(g.primary_inputs(), &[a]);
        assert_eq!(g.primary_outputs(), &[s]);
        assert_eq!(g.boundary_nodes(), &[a, s]);
    }

    #[test]
    fn level_is_longest_path_depth() {
        // a -> b -> c and a -> c: c must sit below b, not at level 1.
        let mut b = TimingGraphBuilder::new();
        let n0 = b.add_node("a", NodeType::Source);
        let n1 = b.add_node("b", NodeType::Opin);
        let n2 = b.add_node("c", NodeType::Sink);
        b.add_edge(n0, n2);
        b.add_edge(n0, n1);
        b.add_edge(n1, n2);
        let g = b.build().unwrap();
        assert_eq!(g.node_level(n2), LevelId::from_raw(2));
    }

    #[test]
    fn every_edge_increases_level() {
        let (g, _) = diamond();
        for e in g.edge_ids() {
            assert!(g.node_level(g.edge_sink(e)) > g.node_level(g.edge_src(e)));
        }
    }

    #[test]
    fn fanin_fanout_lists() {
        let (g, [a, c, _d, s]) = diamond();
        assert_eq!(g.out_edges(a), &[EdgeId::from_raw(0), EdgeId::from_raw(1)]);
        assert_eq!(g.in_edges(s), &[EdgeId::from_raw(2), EdgeId::from_raw(3)]);
        assert_eq!(g.in_edges(c), &[EdgeId::from_raw(0)]);
        assert!(g.in_edges(a).is_empty());
        assert!(g.out_edges(s).is_empty());
    }

    #[test]
    fn reversed_levels_order() {
        let (g, _) = diamond();
        let rev: Vec<u32> = g.reversed_levels().map(LevelId::as_raw).collect();
        assert_eq!(rev, vec![2, 1, 0]);
    }

    #[test]
    fn cycle_is_fatal() {
        let mut b = TimingGraphBuilder::new();
        let src = b.add_node("in", NodeType::Source);
        let x = b.add_node("x", NodeType::Ipin);
        let y = b.add_node("y", NodeType::Opin);
        let out = b.add_node("out", NodeType::Sink);
        b.add_edge(src, x);
        b.add_edge(x, y);
        b.add_edge(y, x);
        b.add_edge(y, out);
        match b.build() {
            Err(GraphError::Cycle { remaining, .. }) => assert_eq!(remaining, 3),
            other => panic!("expected cycle error, got {other:?}"),
        }
    }

    #[test]
    fn dangling_edge_is_fatal() {
        let mut b = TimingGraphBuilder::new();
        let a = b.add_node("a", NodeType::Source);
        b.add_edge(a, NodeId::from_raw(5));
        assert_eq!(
            b.build().unwrap_err(),
            GraphError::NodeOutOfRange {
                edge: EdgeId::from_raw(0),
                node: NodeId::from_raw(5),
                node_count: 1,
            }
        );
    }

    #[test]
    fn self_loop_is_fatal() {
        let mut b = TimingGraphBuilder::new();
        let a = b.add_node("a", NodeType::Ipin);
        b.add_edge(a, a);
        assert!(matches!(b.build(), Err(GraphError::SelfLoop { .. })));
    }

    #[test]
    fn source_with_fanin_rejected() {
        let mut b = TimingGraphBuilder::new();
        let a = b.add_node("a", NodeType::Opin);
        let s = b.add_node("s", NodeType::Source);
        b.add_edge(a, s);
        assert!(matches!(b.build(), Err(GraphError::SourceHasFanin { .. })));
    }

    #[test]
    fn sink_with_fanout_rejected() {
        let mut b = TimingGraphBuilder::new();
        let s = b.add_node("s", NodeType::Sink);
        let a = b.add_node("a", NodeType::Ipin);
        b.add_edge(s, a);
        assert!(matches!(b.build(), Err(GraphError::SinkHasFanout { .. })));
    }

    #[test]
    fn isolated_node_is_input_and_output() {
        let mut b = TimingGraphBuilder::new();
        let lone = b.add_node("lone", NodeType::Ipin);
        let g = b.build().unwrap();
        assert_eq!(g.primary_inputs(), &[lone]);
        assert_eq!(g.primary_outputs(), &[lone]);
        assert_eq!(g.boundary_nodes(), &[lone]);
    }

    #[test]
    fn builder_serde_roundtrip() {
        let mut b = TimingGraphBuilder::new();
        let a = b.add_node("a", NodeType::Source);
        let z = b.add_node("z", NodeType::Sink);
        b.add_edge(a, z);
        let json = serde_json::to_string(&b).unwrap();
        let restored: TimingGraphBuilder = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.node_count(), 2);
        assert_eq!(restored.edge_count(), 1);
        let g = restored.build().unwrap();
        assert_eq!(g.node(z).name, "z");
        assert_eq!(g.describe_node(a), "n0 (a)");
    }

    #[test]
    fn stored_node_id_must_match_position() {
        let mut b = TimingGraphBuilder::new();
        let a = b.add_node("a", NodeType::Source);
        let z = b.add_node("z", NodeType::Sink);
        b.add_edge(a, z);
        let mut json: serde_json::Value = serde_json::to_value(&b).unwrap();
        json["nodes"][0]["id"] = serde_json::json!(5);
        let restored: TimingGraphBuilder = serde_json::from_value(json).unwrap();
        assert_eq!(
            restored.build().unwrap_err(),
            GraphError::NodeIdMismatch {
                position: 0,
                id: NodeId::from_raw(5),
            }
        );
    }

    #[test]
    fn stored_edge_id_must_match_position() {
        let mut b = TimingGraphBuilder::new();
        let a = b.add_node("a", NodeType::Source);
        let z = b.add_node("z", NodeType::Sink);
        b.add_edge(a, z);
        let mut json: serde_json::Value = serde_json::to_value(&b).unwrap();
        json["edges"][0]["id"] = serde_json::json!(3);
        let restored: TimingGraphBuilder = serde_json::from_value(json).unwrap();
        assert!(matches!(
            restored.build(),
            Err(GraphError::EdgeIdMismatch { position: 0, .. })
        ));
    }
}
