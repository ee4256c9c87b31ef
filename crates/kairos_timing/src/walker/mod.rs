//! Traversal strategies.
//!
//! A walker decides the order and concurrency in which nodes are visited for
//! each analysis phase. Every strategy implements a single primitive,
//! [`GraphWalker::map_nodes`], which visits a batch of mutually independent
//! nodes. The phases are built on it: levels are processed strictly in order,
//! and the updates of a level are committed before the next level starts.
//! Commits always happen in the batch's node order, so serial and parallel
//! walkers produce bit-identical results.

mod parallel;
mod serial;

pub use parallel::ParallelWalker;
pub use serial::SerialWalker;

use crate::error::TimingError;
use crate::ids::NodeId;
use crate::visitor::{GraphVisitor, TimingContext};
use kairos_config::{TraversalConfig, WalkerKind};

/// Unconstrained boundary nodes found while seeding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalCounts {
    /// Nodes without fan-in and without input delay.
    pub unconstrained_startpoints: usize,
    /// Nodes without fan-out and without output delay.
    pub unconstrained_endpoints: usize,
}

/// Schedules visitor calls over the graph.
pub trait GraphWalker {
    /// Visits every node of `nodes` and returns the results in the same order.
    ///
    /// The nodes must not depend on each other.
    fn map_nodes<V, T, F>(&self, nodes: &[NodeId], visitor: &V, f: F) -> Vec<(NodeId, T)>
    where
        V: GraphVisitor,
        T: Send,
        F: Fn(&V, NodeId) -> T + Sync;

    /// Clears all visitor state.
    fn do_reset<V: GraphVisitor>(&self, cx: &TimingContext<'_>, visitor: &mut V) {
        visitor.reset(cx.graph);
    }

    /// Seeds every boundary node and counts the unconstrained ones.
    fn do_pre_traversal<V: GraphVisitor>(
        &self,
        cx: &TimingContext<'_>,
        visitor: &mut V,
    ) -> TraversalCounts {
        let results = self.map_nodes(cx.graph.boundary_nodes(), visitor, |v, node| {
            v.pre_traverse_node(cx, node)
        });
        let mut counts = TraversalCounts::default();
        for (node, (update, status)) in results {
            if status.unconstrained_startpoint {
                log::trace!("unconstrained startpoint {}", cx.graph.describe_node(node));
                counts.unconstrained_startpoints += 1;
            }
            if status.unconstrained_endpoint {
                log::trace!("unconstrained endpoint {}", cx.graph.describe_node(node));
                counts.unconstrained_endpoints += 1;
            }
            visitor.commit(node, update);
        }
        counts
    }

    /// Propagates arrivals from level 0 to the last level.
    fn do_forward_traversal<V: GraphVisitor>(&self, cx: &TimingContext<'_>, visitor: &mut V) {
        for level in cx.graph.levels() {
            let results = self.map_nodes(cx.graph.level_nodes(level), visitor, |v, node| {
                v.forward_traverse_node(cx, node)
            });
            for (node, update) in results {
                visitor.commit(node, update);
            }
        }
    }

    /// Propagates required times from the last level back to level 0.
    fn do_backward_traversal<V: GraphVisitor>(&self, cx: &TimingContext<'_>, visitor: &mut V) {
        for level in cx.graph.reversed_levels() {
            let results = self.map_nodes(cx.graph.level_nodes(level), visitor, |v, node| {
                v.backward_traverse_node(cx, node)
            });
            for (node, update) in results {
                visitor.commit(node, update);
            }
        }
    }

    /// Computes node and edge slacks. Order-independent: slacks only read tags.
    fn do_update_slack<V: GraphVisitor>(&self, cx: &TimingContext<'_>, visitor: &mut V) {
        let nodes: Vec<NodeId> = cx.graph.node_ids().collect();
        let results = self.map_nodes(&nodes, visitor, |v, node| v.update_slack_node(cx, node));
        for (node, update) in results {
            visitor.commit_slack(node, update);
        }
    }
}

/// A walker chosen at run time.
#[derive(Debug)]
pub enum AnyWalker {
    /// Single-threaded.
    Serial(SerialWalker),
    /// Level-parallel.
    Parallel(ParallelWalker),
}

impl AnyWalker {
    /// Builds the walker selected by `[analysis]` in `kairos.toml`.
    pub fn from_config(config: &TraversalConfig) -> Result<Self, TimingError> {
        match config.walker {
            WalkerKind::Serial => Ok(AnyWalker::Serial(SerialWalker::new())),
            WalkerKind::Parallel => {
                let walker = match config.threads {
                    Some(threads) => ParallelWalker::with_threads(threads)?,
                    None => ParallelWalker::new(),
                };
                Ok(AnyWalker::Parallel(walker))
            }
        }
    }
}

impl GraphWalker for AnyWalker {
    fn map_nodes<V, T, F>(&self, nodes: &[NodeId], visitor: &V, f: F) -> Vec<(NodeId, T)>
    where
        V: GraphVisitor,
        T: Send,
        F: Fn(&V, NodeId) -> T + Sync,
    {
        match self {
            AnyWalker::Serial(w) => w.map_nodes(nodes, visitor, f),
            AnyWalker::Parallel(w) => w.map_nodes(nodes, visitor, f),
        }
    }
}
