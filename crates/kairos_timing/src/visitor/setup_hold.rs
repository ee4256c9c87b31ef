//! Setup and hold over one shared walk.

use super::{CheckAnalysis, CheckKind, GraphVisitor, SeedStatus, TimingContext};
use crate::graph::TimingGraph;
use crate::ids::NodeId;
use crate::slack::SlackUpdate;
use crate::tags::TimingTags;

/// Runs setup and hold together. The two tag sets are stored and merged
/// independently; they only share the traversal.
#[derive(Debug, Clone)]
pub struct SetupHoldVisitor {
    setup: CheckAnalysis,
    hold: CheckAnalysis,
}

impl SetupHoldVisitor {
    /// Creates a visitor with no tags.
    pub fn new() -> Self {
        Self {
            setup: CheckAnalysis::new(CheckKind::Setup),
            hold: CheckAnalysis::new(CheckKind::Hold),
        }
    }
}

impl Default for SetupHoldVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphVisitor for SetupHoldVisitor {
    type Update = (TimingTags, TimingTags);
    type SlackUpdate = (SlackUpdate, SlackUpdate);

    fn reset(&mut self, graph: &TimingGraph) {
        self.setup.reset(graph);
        self.hold.reset(graph);
    }

    fn pre_traverse_node(&self, cx: &TimingContext<'_>, node: NodeId) -> (Self::Update, SeedStatus) {
        // Both checks see the same input and output delays, so their status agrees.
        let (setup, status) = self.setup.seed(cx, node);
        let (hold, _) = self.hold.seed(cx, node);
        ((setup, hold), status)
    }

    fn forward_traverse_node(&self, cx: &TimingContext<'_>, node: NodeId) -> Self::Update {
        (
            self.setup.propagate_arrivals(cx, node),
            self.hold.propagate_arrivals(cx, node),
        )
    }

    fn backward_traverse_node(&self, cx: &TimingContext<'_>, node: NodeId) -> Self::Update {
        (
            self.setup.propagate_required(cx, node),
            self.hold.propagate_required(cx, node),
        )
    }

    fn commit(&mut self, node: NodeId, (setup, hold): Self::Update) {
        self.setup.commit_tags(node, setup);
        self.hold.commit_tags(node, hold);
    }

    fn update_slack_node(&self, cx: &TimingContext<'_>, node: NodeId) -> Self::SlackUpdate {
        (
            self.setup.compute_slacks(cx, node),
            self.hold.compute_slacks(cx, node),
        )
    }

    fn commit_slack(&mut self, node: NodeId, (setup, hold): Self::SlackUpdate) {
        self.setup.commit_slacks(node, setup);
        self.hold.commit_slacks(node, hold);
    }

    fn setup(&self) -> Option<&CheckAnalysis> {
        Some(&self.setup)
    }

    fn hold(&self) -> Option<&CheckAnalysis> {
        Some(&self.hold)
    }
}
