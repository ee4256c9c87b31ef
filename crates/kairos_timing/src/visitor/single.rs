//! Visitors running a single check.

use super::{CheckAnalysis, CheckKind, GraphVisitor, SeedStatus, TimingContext};
use crate::graph::TimingGraph;
use crate::ids::NodeId;
use crate::slack::SlackUpdate;
use crate::tags::TimingTags;

macro_rules! single_check_visitor {
    ($(#[$meta:meta])* $name:ident, $kind:expr, $accessor:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            analysis: CheckAnalysis,
        }

        impl $name {
            /// Creates a visitor with no tags.
            pub fn new() -> Self {
                Self {
                    analysis: CheckAnalysis::new($kind),
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl GraphVisitor for $name {
            type Update = TimingTags;
            type SlackUpdate = SlackUpdate;

            fn reset(&mut self, graph: &TimingGraph) {
                self.analysis.reset(graph);
            }

            fn pre_traverse_node(&self, cx: &TimingContext<'_>, node: NodeId) -> (TimingTags, SeedStatus) {
                self.analysis.seed(cx, node)
            }

            fn forward_traverse_node(&self, cx: &TimingContext<'_>, node: NodeId) -> TimingTags {
                self.analysis.propagate_arrivals(cx, node)
            }

            fn backward_traverse_node(&self, cx: &TimingContext<'_>, node: NodeId) -> TimingTags {
                self.analysis.propagate_required(cx, node)
            }

            fn commit(&mut self, node: NodeId, update: TimingTags) {
                self.analysis.commit_tags(node, update);
            }

            fn update_slack_node(&self, cx: &TimingContext<'_>, node: NodeId) -> SlackUpdate {
                self.analysis.compute_slacks(cx, node)
            }

            fn commit_slack(&mut self, node: NodeId, update: SlackUpdate) {
                self.analysis.commit_slacks(node, update);
            }

            fn $accessor(&self) -> Option<&CheckAnalysis> {
                Some(&self.analysis)
            }
        }
    };
}

single_check_visitor!(
    /// Long-path analysis: maximum delays against the next capture edge.
    SetupVisitor,
    CheckKind::Setup,
    setup
);

single_check_visitor!(
    /// Short-path analysis: minimum delays against the previous capture edge.
    HoldVisitor,
    CheckKind::Hold,
    hold
);
