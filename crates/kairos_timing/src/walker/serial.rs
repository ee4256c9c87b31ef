use super::GraphWalker;
use crate::ids::NodeId;
use crate::visitor::GraphVisitor;

/// Visits nodes one at a time, in level order, on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialWalker;

impl SerialWalker {
    /// Creates a serial walker.
    pub fn new() -> Self {
        Self
    }
}

impl GraphWalker for SerialWalker {
    fn map_nodes<V, T, F>(&self, nodes: &[NodeId], visitor: &V, f: F) -> Vec<(NodeId, T)>
    where
        V: GraphVisitor,
        T: Send,
        F: Fn(&V, NodeId) -> T + Sync,
    {
        nodes.iter().map(|&node| (node, f(visitor, node))).collect()
    }
}
