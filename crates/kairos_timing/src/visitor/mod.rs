//! Analysis policies applied at each node visit.
//!
//! A visitor decides *what* happens when a walker visits a node: which tags
//! are seeded, how arrivals and requirements propagate across edges, and how
//! slacks are derived. Visits are read-only (`&self`) and return an update;
//! the walker commits updates (`&mut self`) once every node of a level has
//! been visited. Nodes in one level never depend on each other, so any
//! visiting order or degree of concurrency yields the same committed state.
//!
//! Three policies are provided: [`SetupVisitor`], [`HoldVisitor`], and
//! [`SetupHoldVisitor`], which keeps both tag sets over one shared walk.

mod check;
mod setup_hold;
mod single;

pub use check::{CheckAnalysis, CheckKind};
pub use setup_hold::SetupHoldVisitor;
pub use single::{HoldVisitor, SetupVisitor};

use crate::constraints::{ConstraintIndex, TimingConstraints};
use crate::delay::DelayCalculator;
use crate::graph::TimingGraph;
use crate::ids::NodeId;

/// Everything a visit may read.
#[derive(Clone, Copy)]
pub struct TimingContext<'a> {
    /// The levelized graph.
    pub graph: &'a TimingGraph,
    /// Clock domains, I/O delays and exceptions.
    pub constraints: &'a TimingConstraints,
    /// Per-node view of `constraints`.
    pub index: &'a ConstraintIndex,
    /// Edge delay model.
    pub delays: &'a dyn DelayCalculator,
}

impl<'a> TimingContext<'a> {
    /// Bundles the analysis inputs.
    pub fn new(
        graph: &'a TimingGraph,
        constraints: &'a TimingConstraints,
        index: &'a ConstraintIndex,
        delays: &'a dyn DelayCalculator,
    ) -> Self {
        Self {
            graph,
            constraints,
            index,
            delays,
        }
    }
}

/// How a boundary node was seeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedStatus {
    /// A node without fan-in and without any input delay.
    pub unconstrained_startpoint: bool,
    /// A node without fan-out and without any output delay.
    pub unconstrained_endpoint: bool,
}

/// Per-node callbacks invoked by a [`GraphWalker`](crate::walker::GraphWalker).
pub trait GraphVisitor: Sync {
    /// New tag state for one node.
    type Update: Send;
    /// New slacks for one node and its fan-out edges.
    type SlackUpdate: Send;

    /// Clears all state and sizes it for `graph`.
    fn reset(&mut self, graph: &TimingGraph);

    /// Seeds a boundary node from its input and output delays.
    fn pre_traverse_node(&self, cx: &TimingContext<'_>, node: NodeId) -> (Self::Update, SeedStatus);

    /// Merges arrivals from the node's fan-in.
    fn forward_traverse_node(&self, cx: &TimingContext<'_>, node: NodeId) -> Self::Update;

    /// Merges required times from the node's fan-out.
    fn backward_traverse_node(&self, cx: &TimingContext<'_>, node: NodeId) -> Self::Update;

    /// Stores the result of a traversal visit.
    fn commit(&mut self, node: NodeId, update: Self::Update);

    /// Derives slacks for the node and its outgoing edges.
    fn update_slack_node(&self, cx: &TimingContext<'_>, node: NodeId) -> Self::SlackUpdate;

    /// Stores the result of a slack visit.
    fn commit_slack(&mut self, node: NodeId, update: Self::SlackUpdate);

    /// The setup analysis, if this policy runs one.
    fn setup(&self) -> Option<&CheckAnalysis> {
        None
    }

    /// The hold analysis, if this policy runs one.
    fn hold(&self) -> Option<&CheckAnalysis> {
        None
    }
}
