//! The analyzer: composes a graph, constraints, delay model, walker, and
//! visitor into one `update_timing` / query API.
//!
//! Queries return snapshots of the last [`TimingAnalyzer::update_timing`] run
//! and stay valid until the next run or [`TimingAnalyzer::reset`]. Querying
//! before a run, or asking a setup-only analyzer for hold results, is a
//! programming error and panics.

use crate::constraints::{ConstraintIndex, TimingConstraints};
use crate::delay::DelayCalculator;
use crate::error::TimingError;
use crate::graph::TimingGraph;
use crate::ids::{DomainId, EdgeId, NodeId};
use crate::report::{self, TimingReport};
use crate::slack::DomainSlack;
use crate::tags::TimingTags;
use crate::time::Time;
use crate::visitor::{
    CheckAnalysis, CheckKind, GraphVisitor, HoldVisitor, SetupHoldVisitor, SetupVisitor,
    TimingContext,
};
use crate::walker::{AnyWalker, GraphWalker, SerialWalker, TraversalCounts};
use kairos_common::KairosResult;
use kairos_config::{AnalysisConfig, ReportConfig};
use kairos_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

const UNCONSTRAINED_STARTPOINTS: DiagnosticCode = DiagnosticCode::new(Category::Timing, 1);
const UNCONSTRAINED_ENDPOINTS: DiagnosticCode = DiagnosticCode::new(Category::Timing, 2);
const SETUP_NOT_MET: DiagnosticCode = DiagnosticCode::new(Category::Timing, 10);
const HOLD_NOT_MET: DiagnosticCode = DiagnosticCode::new(Category::Timing, 11);
const UNUSED_DOMAIN_CONSTRAINT: DiagnosticCode = DiagnosticCode::new(Category::Constraint, 1);

/// An analyzer running setup checks only.
pub type SetupAnalyzer<'a, W = SerialWalker> = TimingAnalyzer<'a, W, SetupVisitor>;
/// An analyzer running hold checks only.
pub type HoldAnalyzer<'a, W = SerialWalker> = TimingAnalyzer<'a, W, HoldVisitor>;
/// An analyzer running setup and hold over one walk.
pub type SetupHoldAnalyzer<'a, W = SerialWalker> = TimingAnalyzer<'a, W, SetupHoldVisitor>;

/// Wall-clock time spent in each phase of the last run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseTimes {
    /// Clearing tags.
    pub reset: Duration,
    /// Seeding boundary nodes.
    pub pre_traversal: Duration,
    /// Arrival propagation.
    pub forward_traversal: Duration,
    /// Required-time propagation.
    pub backward_traversal: Duration,
    /// Slack computation.
    pub update_slack: Duration,
}

impl PhaseTimes {
    /// Sum of all phases.
    pub fn total(&self) -> Duration {
        self.reset
            + self.pre_traversal
            + self.forward_traversal
            + self.backward_traversal
            + self.update_slack
    }
}

#[derive(Debug, Clone, Copy)]
struct AnalysisRun {
    counts: TraversalCounts,
    phase_times: PhaseTimes,
    setup_max_required: Option<Time>,
}

fn timed<R>(phase: &str, slot: &mut Duration, f: impl FnOnce() -> R) -> R {
    let start = Instant::now();
    let out = f();
    *slot = start.elapsed();
    log::debug!("{phase} took {:?}", *slot);
    out
}

/// Static timing analyzer.
pub struct TimingAnalyzer<'a, W, V> {
    graph: &'a TimingGraph,
    constraints: &'a TimingConstraints,
    index: ConstraintIndex,
    delays: &'a dyn DelayCalculator,
    walker: W,
    visitor: V,
    report_config: ReportConfig,
    run: Option<AnalysisRun>,
}

impl<'a, W: GraphWalker, V: GraphVisitor> TimingAnalyzer<'a, W, V> {
    /// Creates an analyzer after checking `constraints` against `graph`.
    pub fn new(
        graph: &'a TimingGraph,
        constraints: &'a TimingConstraints,
        delays: &'a dyn DelayCalculator,
        walker: W,
        visitor: V,
    ) -> Result<Self, TimingError> {
        constraints.validate(graph)?;
        Ok(Self {
            graph,
            constraints,
            index: ConstraintIndex::new(constraints, graph.node_count()),
            delays,
            walker,
            visitor,
            report_config: ReportConfig::default(),
            run: None,
        })
    }

    /// Replaces the report settings.
    pub fn with_report_config(mut self, config: ReportConfig) -> Self {
        self.report_config = config;
        self
    }

    fn context(&self) -> TimingContext<'_> {
        TimingContext::new(self.graph, self.constraints, &self.index, self.delays)
    }

    /// Runs a full analysis: reset, seed, forward, backward, slack.
    ///
    /// Unconstrained boundary nodes and failing checks are reported to `sink`
    /// as warnings; the run itself always completes.
    pub fn update_timing(&mut self, sink: &DiagnosticSink) {
        let cx = TimingContext::new(self.graph, self.constraints, &self.index, self.delays);
        let mut times = PhaseTimes::default();

        timed("reset", &mut times.reset, || {
            self.walker.do_reset(&cx, &mut self.visitor)
        });
        let counts = timed("pre-traversal", &mut times.pre_traversal, || {
            self.walker.do_pre_traversal(&cx, &mut self.visitor)
        });
        timed("forward traversal", &mut times.forward_traversal, || {
            self.walker.do_forward_traversal(&cx, &mut self.visitor)
        });
        timed("backward traversal", &mut times.backward_traversal, || {
            self.walker.do_backward_traversal(&cx, &mut self.visitor)
        });
        timed("slack update", &mut times.update_slack, || {
            self.walker.do_update_slack(&cx, &mut self.visitor)
        });

        self.run = Some(AnalysisRun {
            counts,
            phase_times: times,
            setup_max_required: self.visitor.setup().and_then(CheckAnalysis::max_required),
        });
        self.report_conditions(sink, counts);

        log::info!(
            "timing analysis of {} nodes in {} levels finished in {:?}",
            self.graph.node_count(),
            self.graph.level_count(),
            times.total()
        );
    }

    fn report_conditions(&self, sink: &DiagnosticSink, counts: TraversalCounts) {
        if self.report_config.warn_unconstrained {
            if counts.unconstrained_startpoints > 0 {
                sink.emit(
                    Diagnostic::warning(
                        UNCONSTRAINED_STARTPOINTS,
                        format!(
                            "{} startpoint(s) have no input delay and receive no arrival time",
                            counts.unconstrained_startpoints
                        ),
                    )
                    .with_help("add an input delay or mark the node as a clock source"),
                );
            }
            if counts.unconstrained_endpoints > 0 {
                sink.emit(
                    Diagnostic::warning(
                        UNCONSTRAINED_ENDPOINTS,
                        format!(
                            "{} endpoint(s) have no output delay and are not checked",
                            counts.unconstrained_endpoints
                        ),
                    )
                    .with_help("add an output delay or mark the node as a clock capture"),
                );
            }
        }

        let mut exercised = BTreeSet::new();
        for (check, code) in [
            (self.visitor.setup(), SETUP_NOT_MET),
            (self.visitor.hold(), HOLD_NOT_MET),
        ] {
            let Some(check) = check else { continue };
            exercised.extend(check.exercised_domain_pairs());
            let stats = report::check_stats(check, self.graph);
            if let Some(worst) = stats.worst.filter(|w| *w < 0.0) {
                sink.emit(
                    Diagnostic::warning(
                        code,
                        format!(
                            "{} timing not met: worst negative slack = {worst:.3} ns",
                            check.kind()
                        ),
                    )
                    .with_note(format!(
                        "{} of {} endpoints fail, total negative slack = {:.3} ns",
                        stats.failing, stats.constrained, stats.tns
                    )),
                );
            }
        }

        let declared: BTreeSet<(DomainId, DomainId)> = self
            .constraints
            .domain_constraints
            .iter()
            .map(|c| (c.launch, c.capture))
            .collect();
        for (launch, capture) in declared.difference(&exercised) {
            sink.emit(
                Diagnostic::warning(
                    UNUSED_DOMAIN_CONSTRAINT,
                    "domain constraint never applies to any path",
                )
                .at(format!("{launch} -> {capture}")),
            );
        }
    }

    /// Clears all tags and slacks.
    pub fn reset(&mut self) {
        let cx = TimingContext::new(self.graph, self.constraints, &self.index, self.delays);
        self.walker.do_reset(&cx, &mut self.visitor);
        self.run = None;
    }

    /// `true` once `update_timing` has run since construction or the last reset.
    pub fn is_analyzed(&self) -> bool {
        self.run.is_some()
    }

    fn run(&self) -> &AnalysisRun {
        match &self.run {
            Some(run) => run,
            None => panic!("timing queried before update_timing()"),
        }
    }

    fn check(&self, kind: CheckKind) -> &CheckAnalysis {
        self.run();
        let check = match kind {
            CheckKind::Setup => self.visitor.setup(),
            CheckKind::Hold => self.visitor.hold(),
        };
        match check {
            Some(check) => check,
            None => panic!("analyzer does not run a {kind} analysis"),
        }
    }

    /// Startpoints left without an arrival time in the last run.
    pub fn num_unconstrained_startpoints(&self) -> usize {
        self.run().counts.unconstrained_startpoints
    }

    /// Endpoints left without a requirement in the last run.
    pub fn num_unconstrained_endpoints(&self) -> usize {
        self.run().counts.unconstrained_endpoints
    }

    /// Phase timings of the last run.
    pub fn phase_times(&self) -> PhaseTimes {
        self.run().phase_times
    }

    /// The analyzed graph.
    pub fn graph(&self) -> &'a TimingGraph {
        self.graph
    }

    /// The constraints in force.
    pub fn constraints(&self) -> &'a TimingConstraints {
        self.constraints
    }

    /// The traversal strategy.
    pub fn walker(&self) -> &W {
        &self.walker
    }

    /// The analysis policy and its results.
    pub fn visitor(&self) -> &V {
        &self.visitor
    }

    /// Setup tags of a node.
    pub fn setup_tags(&self, node: NodeId) -> &TimingTags {
        self.check(CheckKind::Setup).tags(node)
    }

    /// Hold tags of a node.
    pub fn hold_tags(&self, node: NodeId) -> &TimingTags {
        self.check(CheckKind::Hold).tags(node)
    }

    /// Per-domain setup slacks of a node.
    pub fn setup_slack(&self, node: NodeId) -> &[DomainSlack] {
        self.check(CheckKind::Setup).node_slacks(node)
    }

    /// Per-domain setup slacks of an edge.
    pub fn setup_edge_slack(&self, edge: EdgeId) -> &[DomainSlack] {
        self.check(CheckKind::Setup).edge_slacks(edge)
    }

    /// Per-domain hold slacks of a node.
    pub fn hold_slack(&self, node: NodeId) -> &[DomainSlack] {
        self.check(CheckKind::Hold).node_slacks(node)
    }

    /// Per-domain hold slacks of an edge.
    pub fn hold_edge_slack(&self, edge: EdgeId) -> &[DomainSlack] {
        self.check(CheckKind::Hold).edge_slacks(edge)
    }

    /// Worst setup slack over all edges, `None` if nothing is constrained.
    pub fn worst_setup_slack(&self) -> Option<Time> {
        self.check(CheckKind::Setup).slacks().worst_edge_slack()
    }

    /// Worst hold slack over all edges, `None` if nothing is constrained.
    pub fn worst_hold_slack(&self) -> Option<Time> {
        self.check(CheckKind::Hold).slacks().worst_edge_slack()
    }

    /// Setup criticality of an edge in `[0, 1]`: `1 - slack / max_required`.
    ///
    /// `None` if no constrained domain crosses the edge.
    pub fn setup_edge_criticality(&self, edge: EdgeId) -> Option<f64> {
        let slack = self.check(CheckKind::Setup).worst_edge_slack(edge)?.value();
        let max_required = self.run().setup_max_required?.value();
        let criticality = if max_required > 0.0 {
            1.0 - slack / max_required
        } else if slack < 0.0 {
            1.0
        } else {
            0.0
        };
        Some(criticality.clamp(0.0, 1.0))
    }

    /// Summarizes the last run.
    pub fn report(&self) -> KairosResult<TimingReport> {
        let run = self.run();
        let cx = self.context();
        let max_paths = self.report_config.max_critical_paths;
        let setup = self
            .visitor
            .setup()
            .map(|check| report::summarize_check(check, &cx, max_paths))
            .transpose()?;
        let hold = self
            .visitor
            .hold()
            .map(|check| report::summarize_check(check, &cx, max_paths))
            .transpose()?;
        Ok(TimingReport {
            setup,
            hold,
            unconstrained_startpoints: run.counts.unconstrained_startpoints,
            unconstrained_endpoints: run.counts.unconstrained_endpoints,
        })
    }
}

impl<'a, V: GraphVisitor> TimingAnalyzer<'a, AnyWalker, V> {
    /// Creates an analyzer with the walker and report settings of `config`.
    pub fn from_config(
        graph: &'a TimingGraph,
        constraints: &'a TimingConstraints,
        delays: &'a dyn DelayCalculator,
        visitor: V,
        config: &AnalysisConfig,
    ) -> Result<Self, TimingError> {
        let walker = AnyWalker::from_config(&config.analysis)?;
        Ok(Self::new(graph, constraints, delays, walker, visitor)?
            .with_report_config(config.report.clone()))
    }
}
