//! One timing check (setup or hold) over the whole graph.

use super::{SeedStatus, TimingContext};
use crate::constraints::{PathEnds, TimingConstraints};
use crate::graph::TimingGraph;
use crate::ids::{DomainId, EdgeId, NodeId};
use crate::slack::{self, DomainSlack, SlackStore, SlackUpdate, Slacks};
use crate::tags::{Merge, TagKey, TagType, TimingTag, TimingTags};
use crate::time::Time;
use smallvec::SmallVec;
use std::collections::BTreeSet;
use std::fmt;

/// Which check an analysis performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckKind {
    /// Long-path check against the next capture edge, using maximum delays.
    Setup,
    /// Short-path check against the previous capture edge, using minimum delays.
    Hold,
}

impl CheckKind {
    /// Delay of `edge` under this check.
    ///
    /// # Panics
    ///
    /// Panics if the delay calculator returns an invalid time.
    pub fn edge_delay(self, cx: &TimingContext<'_>, edge: EdgeId) -> Time {
        let delay = match self {
            CheckKind::Setup => cx.delays.max_edge_delay(cx.graph, edge),
            CheckKind::Hold => cx.delays.min_edge_delay(cx.graph, edge),
        };
        assert!(
            delay.is_valid(),
            "delay calculator returned an invalid {self} delay for edge {edge}"
        );
        delay
    }

    /// How arrivals from several fan-in edges combine.
    pub fn arrival_merge(self) -> Merge {
        match self {
            CheckKind::Setup => Merge::Max,
            CheckKind::Hold => Merge::Min,
        }
    }

    /// How requirements from several fan-out edges combine: the tightest
    /// requirement gives the smallest `required - arrival` slack.
    pub fn required_merge(self) -> Merge {
        Merge::Min
    }

    /// Time of the capture edge a clock tag is seeded at.
    pub fn capture_edge(self, constraints: &TimingConstraints, capture: DomainId) -> f64 {
        match self {
            CheckKind::Setup => constraints.domain(capture).period_ns,
            CheckKind::Hold => 0.0,
        }
    }

    /// Launch-to-capture requirement for a path, `None` if it is a false path.
    pub fn requirement(self, constraints: &TimingConstraints, ends: &PathEnds) -> Option<f64> {
        match self {
            CheckKind::Setup => constraints.setup_requirement(ends),
            CheckKind::Hold => constraints.hold_requirement(ends),
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckKind::Setup => write!(f, "setup"),
            CheckKind::Hold => write!(f, "hold"),
        }
    }
}

/// Tags and slacks of one check for every node.
#[derive(Debug, Clone)]
pub struct CheckAnalysis {
    kind: CheckKind,
    tags: Vec<TimingTags>,
    slacks: SlackStore,
}

impl CheckAnalysis {
    /// An empty analysis; call [`reset`](Self::reset) before visiting nodes.
    pub fn new(kind: CheckKind) -> Self {
        Self {
            kind,
            tags: Vec::new(),
            slacks: SlackStore::default(),
        }
    }

    /// The check performed.
    pub fn kind(&self) -> CheckKind {
        self.kind
    }

    /// Clears all tags and slacks.
    pub fn reset(&mut self, graph: &TimingGraph) {
        self.tags = vec![TimingTags::default(); graph.node_count()];
        self.slacks = SlackStore::new(graph);
    }

    /// Tags of a node.
    pub fn tags(&self, node: NodeId) -> &TimingTags {
        &self.tags[node.index()]
    }

    /// Per-domain slacks of a node.
    pub fn node_slacks(&self, node: NodeId) -> &[DomainSlack] {
        self.slacks.node(node)
    }

    /// Per-domain slacks of an edge.
    pub fn edge_slacks(&self, edge: EdgeId) -> &[DomainSlack] {
        self.slacks.edge(edge)
    }

    /// Worst slack at a node over all domains.
    pub fn worst_node_slack(&self, node: NodeId) -> Option<Time> {
        slack::worst(self.slacks.node(node))
    }

    /// Worst slack at an edge over all domains.
    pub fn worst_edge_slack(&self, edge: EdgeId) -> Option<Time> {
        slack::worst(self.slacks.edge(edge))
    }

    /// All stored slacks.
    pub fn slacks(&self) -> &SlackStore {
        &self.slacks
    }

    /// Largest valid required time of any data tag.
    pub fn max_required(&self) -> Option<Time> {
        self.tags
            .iter()
            .flat_map(|t| t.tags_of(TagType::Data))
            .map(|t| t.required)
            .filter(|r| r.is_valid())
            .reduce(Time::max)
    }

    /// Launch/capture domain pairs that meet at some capture point.
    pub fn exercised_domain_pairs(&self) -> BTreeSet<(DomainId, DomainId)> {
        let mut pairs = BTreeSet::new();
        for tags in &self.tags {
            for clock in tags.tags_of(TagType::Clock) {
                for data in tags.tags_of(TagType::Data) {
                    pairs.insert((data.domain, clock.domain));
                }
            }
        }
        pairs
    }

    /// Seeds data tags from input delays and clock tags from output delays.
    pub fn seed(&self, cx: &TimingContext<'_>, node: NodeId) -> (TimingTags, SeedStatus) {
        let mut tags = TimingTags::new();
        let inputs = cx.index.input_delays(node);
        let scope = cx.index.is_scoped_launch(node).then_some(node);
        for io in inputs {
            if cx.constraints.excludes_startpoint(node, io.domain) {
                continue;
            }
            let tag = TimingTag::new(io.domain, node, Time::new(io.delay_ns)).with_scope(scope);
            tags.merge_arrival(TagType::Data, tag, self.kind.arrival_merge());
        }

        let outputs = cx.index.output_delays(node);
        for io in outputs {
            let edge = self.kind.capture_edge(cx.constraints, io.domain);
            let required = Time::new(edge - io.delay_ns);
            let merged = tags.merge_required(TagType::Clock, io.domain, required, self.kind.required_merge());
            if !merged {
                let mut clock = TimingTag::new(io.domain, node, Time::ZERO);
                clock.required = required;
                tags.add_tag(TagType::Clock, clock);
            }
        }

        let status = SeedStatus {
            unconstrained_startpoint: cx.graph.in_edges(node).is_empty() && inputs.is_empty(),
            unconstrained_endpoint: cx.graph.out_edges(node).is_empty() && outputs.is_empty(),
        };
        (tags, status)
    }

    /// Merges fan-in arrivals; at capture points, also derives data requirements.
    pub fn propagate_arrivals(&self, cx: &TimingContext<'_>, node: NodeId) -> TimingTags {
        let mut tags = self.tags[node.index()].clone();
        let merge = self.kind.arrival_merge();
        for &edge in cx.graph.in_edges(node) {
            let from = cx.graph.edge_src(edge);
            let delay = self.kind.edge_delay(cx, edge);
            for tag in self.tags[from.index()].tags_of(TagType::Data) {
                let arrival = TimingTag::new(tag.domain, tag.launch_node, tag.arrival + delay)
                    .with_scope(tag.scope);
                tags.merge_arrival(TagType::Data, arrival, merge);
            }
        }

        if tags.num_tags(TagType::Clock) > 0 {
            let requirements: SmallVec<[(TagKey, Time); 2]> = tags
                .tags_of(TagType::Data)
                .iter()
                .map(|data| (data.key(), self.capture_requirement(cx, node, data, &tags)))
                .collect();
            for (key, required) in requirements {
                tags.merge_required(TagType::Data, key, required, self.kind.required_merge());
            }
        }
        tags
    }

    /// Required time of `data` at a capture point, merged over every capturing clock.
    fn capture_requirement(
        &self,
        cx: &TimingContext<'_>,
        node: NodeId,
        data: &TimingTag,
        tags: &TimingTags,
    ) -> Time {
        let merge = self.kind.required_merge();
        tags.tags_of(TagType::Clock)
            .iter()
            .filter_map(|clock| {
                let ends = PathEnds {
                    launch: data.domain,
                    launch_node: data.launch_node,
                    capture: clock.domain,
                    capture_node: node,
                };
                let requirement = self.kind.requirement(cx.constraints, &ends)?;
                let edge = self.kind.capture_edge(cx.constraints, clock.domain);
                Some(Time::new(requirement) + (clock.required - Time::new(edge)))
            })
            .fold(Time::INVALID, |acc, r| merge.apply(acc, r))
    }

    /// Merges required times back from the node's fan-out.
    pub fn propagate_required(&self, cx: &TimingContext<'_>, node: NodeId) -> TimingTags {
        let mut tags = self.tags[node.index()].clone();
        let merge = self.kind.required_merge();
        for &edge in cx.graph.out_edges(node) {
            let to = cx.graph.edge_sink(edge);
            let delay = self.kind.edge_delay(cx, edge);
            for tag in self.tags[to.index()].tags_of(TagType::Data) {
                if tag.required.is_valid() {
                    tags.merge_required(TagType::Data, tag.key(), tag.required - delay, merge);
                }
            }
        }
        tags
    }

    /// Slacks of the node and of each of its outgoing edges.
    pub fn compute_slacks(&self, cx: &TimingContext<'_>, node: NodeId) -> SlackUpdate {
        let tags = &self.tags[node.index()];
        let node_slacks: Slacks = tags
            .tags_of(TagType::Data)
            .iter()
            .filter_map(|t| {
                let value = t.slack();
                value.is_valid().then_some(DomainSlack {
                    domain: t.domain,
                    slack: value,
                })
            })
            .collect();

        let edges = cx
            .graph
            .out_edges(node)
            .iter()
            .map(|&edge| {
                let to = &self.tags[cx.graph.edge_sink(edge).index()];
                let delay = self.kind.edge_delay(cx, edge);
                let slacks: Slacks = tags
                    .tags_of(TagType::Data)
                    .iter()
                    .filter_map(|t| {
                        let downstream = to.find(TagType::Data, t.key())?;
                        downstream.required.is_valid().then_some(DomainSlack {
                            domain: t.domain,
                            slack: downstream.required - t.arrival - delay,
                        })
                    })
                    .collect();
                (edge, slacks)
            })
            .collect();

        SlackUpdate {
            node: node_slacks,
            edges,
        }
    }

    /// Stores new tags for a node.
    pub fn commit_tags(&mut self, node: NodeId, tags: TimingTags) {
        self.tags[node.index()] = tags;
    }

    /// Stores new slacks for a node and its fan-out.
    pub fn commit_slacks(&mut self, node: NodeId, update: SlackUpdate) {
        self.slacks.commit(node, update);
    }
}
