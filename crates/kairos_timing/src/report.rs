//! Timing report types and their construction from a finished analysis.
//!
//! A report summarizes each check at its capture points: worst slack, total
//! negative slack, per-launch-domain totals, and the critical paths
//! backtracked from the worst endpoints.

use crate::graph::{NodeType, TimingGraph};
use crate::ids::{DomainId, EdgeId, NodeId};
use crate::tags::{TagType, TimingTag};
use crate::visitor::{CheckAnalysis, TimingContext};
use kairos_common::{Ident, InternalError, KairosResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Results of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingReport {
    /// Setup summary, if the analysis ran a setup check.
    pub setup: Option<CheckSummary>,
    /// Hold summary, if the analysis ran a hold check.
    pub hold: Option<CheckSummary>,
    /// Startpoints without an input delay.
    pub unconstrained_startpoints: usize,
    /// Endpoints without an output delay.
    pub unconstrained_endpoints: usize,
}

impl TimingReport {
    /// `true` if every check that ran has no negative slack.
    pub fn met(&self) -> bool {
        self.setup.iter().chain(self.hold.iter()).all(|s| s.met)
    }
}

/// Summary of one check over all capture points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckSummary {
    /// Worst endpoint slack, or `None` if nothing is constrained.
    pub worst_slack_ns: Option<f64>,
    /// Sum of negative endpoint slacks.
    pub total_negative_slack_ns: f64,
    /// Capture points with at least one slack.
    pub constrained_endpoints: usize,
    /// Capture points with a negative slack.
    pub failing_endpoints: usize,
    /// `true` if no endpoint fails.
    pub met: bool,
    /// Per launch domain totals.
    pub domains: Vec<ClockDomainTiming>,
    /// Worst paths, most critical first.
    pub critical_paths: Vec<CriticalPath>,
}

/// Totals for paths launched by one clock domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockDomainTiming {
    /// The launch domain.
    pub domain: DomainId,
    /// Its clock name.
    pub clock_name: Ident,
    /// Its period.
    pub period_ns: f64,
    /// Worst endpoint slack of paths from this domain.
    pub worst_slack_ns: Option<f64>,
    /// Sum of negative endpoint slacks of paths from this domain.
    pub total_negative_slack_ns: f64,
    /// Capture points reached by this domain.
    pub endpoint_count: usize,
    /// `true` if no path from this domain fails.
    pub met: bool,
}

/// A worst path to one endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticalPath {
    /// Launch domain.
    pub domain: DomainId,
    /// Startpoint.
    pub launch: NodeId,
    /// Endpoint.
    pub capture: NodeId,
    /// Arrival at the endpoint.
    pub arrival_ns: f64,
    /// Required time at the endpoint.
    pub required_ns: f64,
    /// `required - arrival`.
    pub slack_ns: f64,
    /// Nodes from startpoint to endpoint.
    pub elements: Vec<PathElement>,
}

/// One node along a critical path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathElement {
    /// The node.
    pub node: NodeId,
    /// Its name.
    pub node_name: String,
    /// Its structural role.
    pub node_type: NodeType,
    /// The edge entering this node, `None` at the startpoint.
    pub edge: Option<EdgeId>,
    /// Delay of that edge.
    pub delay_ns: f64,
    /// Arrival at this node.
    pub arrival_ns: f64,
}

/// One (endpoint, launch domain) slack.
#[derive(Debug, Clone, Copy)]
struct EndpointSlack {
    node: NodeId,
    tag: TimingTag,
    slack: f64,
}

fn endpoint_slacks(check: &CheckAnalysis, graph: &TimingGraph) -> Vec<EndpointSlack> {
    let mut out = Vec::new();
    for node in graph.node_ids() {
        let tags = check.tags(node);
        if tags.num_tags(TagType::Clock) == 0 {
            continue;
        }
        for tag in tags.tags_of(TagType::Data) {
            if let Some(slack) = tag.slack().valid() {
                out.push(EndpointSlack {
                    node,
                    tag: *tag,
                    slack,
                });
            }
        }
    }
    out
}

/// Worst slack, total negative slack, and counts over a set of endpoint slacks.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct EndpointStats {
    pub worst: Option<f64>,
    pub tns: f64,
    pub constrained: usize,
    pub failing: usize,
}

fn collect_stats<'a>(slacks: impl Iterator<Item = &'a EndpointSlack>) -> EndpointStats {
    fn flush(stats: &mut EndpointStats, worst: Option<f64>) {
        if let Some(w) = worst {
            stats.constrained += 1;
            if w < 0.0 {
                stats.failing += 1;
                stats.tns += w;
            }
            stats.worst = Some(stats.worst.map_or(w, |cur| cur.min(w)));
        }
    }

    let mut stats = EndpointStats::default();
    let mut last: Option<NodeId> = None;
    let mut node_worst: Option<f64> = None;
    // Endpoint slacks arrive grouped by node; each endpoint counts once at its worst.
    for s in slacks {
        if last != Some(s.node) {
            flush(&mut stats, node_worst.take());
            last = Some(s.node);
        }
        node_worst = Some(node_worst.map_or(s.slack, |w| w.min(s.slack)));
    }
    flush(&mut stats, node_worst);
    stats
}

/// Endpoint statistics of a finished check.
pub(crate) fn check_stats(check: &CheckAnalysis, graph: &TimingGraph) -> EndpointStats {
    collect_stats(endpoint_slacks(check, graph).iter())
}

/// Builds the summary of a finished check.
pub fn summarize_check(
    check: &CheckAnalysis,
    cx: &TimingContext<'_>,
    max_critical_paths: usize,
) -> KairosResult<CheckSummary> {
    let (graph, constraints) = (cx.graph, cx.constraints);
    let mut endpoints = endpoint_slacks(check, graph);
    let total = collect_stats(endpoints.iter());

    let domains = constraints
        .domain_ids()
        .map(|domain| {
            let s = collect_stats(endpoints.iter().filter(|e| e.tag.domain == domain));
            let clock = constraints.domain(domain);
            ClockDomainTiming {
                domain,
                clock_name: clock.name,
                period_ns: clock.period_ns,
                worst_slack_ns: s.worst,
                total_negative_slack_ns: s.tns,
                endpoint_count: s.constrained,
                met: s.failing == 0,
            }
        })
        .collect();

    endpoints.sort_by(|a, b| {
        a.slack
            .partial_cmp(&b.slack)
            .unwrap_or(Ordering::Equal)
            .then(a.node.cmp(&b.node))
            .then(a.tag.key().cmp(&b.tag.key()))
    });
    let critical_paths = endpoints
        .iter()
        .take(max_critical_paths)
        .map(|e| backtrack(check, cx, e))
        .collect::<KairosResult<Vec<_>>>()?;

    Ok(CheckSummary {
        worst_slack_ns: total.worst,
        total_negative_slack_ns: total.tns,
        constrained_endpoints: total.constrained,
        failing_endpoints: total.failing,
        met: total.failing == 0,
        domains,
        critical_paths,
    })
}

/// Walks back from an endpoint along the fan-in edges that produced its arrival.
fn backtrack(
    check: &CheckAnalysis,
    cx: &TimingContext<'_>,
    endpoint: &EndpointSlack,
) -> KairosResult<CriticalPath> {
    let graph = cx.graph;
    let domain = endpoint.tag.domain;
    let key = endpoint.tag.key();
    let launch = endpoint.tag.launch_node;
    let mut elements = Vec::new();
    let mut current = endpoint.node;
    let mut arrival = endpoint.tag.arrival;

    loop {
        let node = graph.node(current);
        if current == launch || graph.in_edges(current).is_empty() {
            elements.push(PathElement {
                node: current,
                node_name: node.name.clone(),
                node_type: node.node_type,
                edge: None,
                delay_ns: 0.0,
                arrival_ns: arrival.value(),
            });
            break;
        }

        let step = graph.in_edges(current).iter().find_map(|&edge| {
            let from = graph.edge_src(edge);
            let tag = check.tags(from).find(TagType::Data, key)?;
            if tag.launch_node != launch {
                return None;
            }
            let delay = check.kind().edge_delay(cx, edge);
            (tag.arrival + delay).identical(arrival).then_some((edge, from, tag.arrival, delay))
        });
        let Some((edge, from, from_arrival, delay)) = step else {
            return Err(InternalError::new(format!(
                "cannot backtrack {} path to {} at {}",
                check.kind(),
                graph.describe_node(endpoint.node),
                graph.describe_node(current)
            )));
        };

        elements.push(PathElement {
            node: current,
            node_name: node.name.clone(),
            node_type: node.node_type,
            edge: Some(edge),
            delay_ns: delay.value(),
            arrival_ns: arrival.value(),
        });
        current = from;
        arrival = from_arrival;
    }

    elements.reverse();
    Ok(CriticalPath {
        domain,
        launch: current,
        capture: endpoint.node,
        arrival_ns: endpoint.tag.arrival.value(),
        required_ns: endpoint.tag.required.value(),
        slack_ns: endpoint.slack,
        elements,
    })
}
