//! Timing constraints: clock domains, I/O delays and path exceptions.
//!
//! Constraints are produced by an external loader and treated as read-only by
//! the engine. Nodes and domains are referenced by ID; [`TimingConstraints::validate`]
//! checks every reference against the graph before an analyzer is built.
//!
//! Launch and capture relationships follow the usual SDC model: a path launched
//! by domain L at time 0 must be captured by domain C no later than the setup
//! relationship (the first capture edge strictly after the launch edge) and no
//! earlier than the hold relationship (the capture edge one period before).

use crate::error::TimingError;
use crate::graph::TimingGraph;
use crate::ids::{DomainId, NodeId};
use kairos_common::Ident;
use serde::{Deserialize, Serialize};

/// Grid used to compare clock waveforms: 1 ps.
const EDGE_GRID_PER_NS: f64 = 1000.0;

/// Launch edges examined before giving up on the common period of two clocks.
const MAX_LAUNCH_EDGES: i64 = 1_000_000;

/// The full constraint set for one analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimingConstraints {
    /// Clock domains, indexed by [`DomainId`].
    pub domains: Vec<ClockDomain>,
    /// Arrival offsets at startpoints (`set_input_delay`, register launch).
    pub input_delays: Vec<IoDelay>,
    /// Required-time offsets at endpoints (`set_output_delay`, register capture).
    pub output_delays: Vec<IoDelay>,
    /// Explicit launch/capture setup relationships overriding the waveform-derived ones.
    pub domain_constraints: Vec<DomainConstraint>,
    /// Paths excluded from analysis.
    pub false_paths: Vec<FalsePath>,
    /// Paths allowed more than one capture cycle.
    pub multicycle_paths: Vec<MulticyclePath>,
    /// Paths with an explicit maximum delay.
    pub max_delay_paths: Vec<MaxDelayPath>,
}

/// A clock domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockDomain {
    /// The clock name.
    pub name: Ident,
    /// Clock period in nanoseconds. Zero models an asynchronous/virtual clock.
    pub period_ns: f64,
    /// Time of the first rising edge within the period.
    pub rise_edge_ns: f64,
}

impl ClockDomain {
    /// Target frequency in MHz, or 0 for a zero period.
    pub fn frequency_mhz(&self) -> f64 {
        if self.period_ns > 0.0 {
            1000.0 / self.period_ns
        } else {
            0.0
        }
    }
}

/// An input or output delay on a boundary node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IoDelay {
    /// The startpoint or endpoint.
    pub node: NodeId,
    /// The reference clock domain.
    pub domain: DomainId,
    /// Delay outside the graph, in nanoseconds.
    pub delay_ns: f64,
}

/// An explicit setup relationship between two domains.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DomainConstraint {
    /// The launching domain.
    pub launch: DomainId,
    /// The capturing domain.
    pub capture: DomainId,
    /// Time allowed from launch edge to capture edge.
    pub constraint_ns: f64,
}

/// One end of a path exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathPoint {
    /// Every path launched (or captured) by a domain.
    Domain(DomainId),
    /// Every path starting (or ending) at a node.
    Node(NodeId),
}

/// A `set_false_path` exception. An empty list matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FalsePath {
    /// Launch side.
    pub from: Vec<PathPoint>,
    /// Capture side.
    pub to: Vec<PathPoint>,
}

/// A `set_multicycle_path` exception.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MulticyclePath {
    /// Launch side.
    pub from: Vec<PathPoint>,
    /// Capture side.
    pub to: Vec<PathPoint>,
    /// Capture cycles allowed for setup; the hold check moves with it.
    pub cycles: u32,
}

/// A `set_max_delay` exception, replacing the setup relationship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxDelayPath {
    /// Launch side.
    pub from: Vec<PathPoint>,
    /// Capture side.
    pub to: Vec<PathPoint>,
    /// Maximum allowed launch-to-capture delay in nanoseconds.
    pub delay_ns: f64,
}

/// The launch and capture ends a path requirement is looked up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathEnds {
    /// Domain of the launching tag.
    pub launch: DomainId,
    /// Node the worst path was launched from. Exceptions naming a startpoint
    /// are exact only for tags scoped to it (see [`ConstraintIndex`]).
    pub launch_node: NodeId,
    /// Domain of the capturing clock.
    pub capture: DomainId,
    /// The endpoint.
    pub capture_node: NodeId,
}

fn point_matches(points: &[PathPoint], domain: DomainId, node: NodeId) -> bool {
    points.is_empty()
        || points.iter().any(|p| match *p {
            PathPoint::Domain(d) => d == domain,
            PathPoint::Node(n) => n == node,
        })
}

/// I/O delays grouped by node in declaration order.
#[derive(Debug, Clone, Default)]
struct IoDelayCsr {
    start: Vec<usize>,
    items: Vec<IoDelay>,
}

impl IoDelayCsr {
    fn new(node_count: usize, delays: &[IoDelay]) -> Self {
        let mut start = vec![0usize; node_count + 1];
        for d in delays {
            start[d.node.index()] += 1;
        }
        for i in 1..=node_count {
            start[i] += start[i - 1];
        }
        let mut items = delays.to_vec();
        for d in delays.iter().rev() {
            let slot = &mut start[d.node.index()];
            *slot -= 1;
            items[*slot] = *d;
        }
        Self { start, items }
    }

    fn get(&self, node: NodeId) -> &[IoDelay] {
        let i = node.index();
        &self.items[self.start[i]..self.start[i + 1]]
    }
}

/// Per-node lookups over a validated [`TimingConstraints`], built once per analyzer.
///
/// A startpoint named by a `from` list of an exception is *scoped*: its data
/// tags propagate apart from the rest of its domain, so the exception applies
/// to exactly the paths it launches.
#[derive(Debug, Clone, Default)]
pub struct ConstraintIndex {
    inputs: IoDelayCsr,
    outputs: IoDelayCsr,
    scoped: Vec<bool>,
}

impl ConstraintIndex {
    /// Indexes `constraints` for a graph of `node_count` nodes.
    ///
    /// # Panics
    ///
    /// Panics if a constraint names a node outside the graph; run
    /// [`TimingConstraints::validate`] first.
    pub fn new(constraints: &TimingConstraints, node_count: usize) -> Self {
        let mut scoped = vec![false; node_count];
        let launch_lists = constraints
            .false_paths
            .iter()
            .filter(|fp| !fp.to.is_empty())
            .map(|fp| &fp.from)
            .chain(constraints.multicycle_paths.iter().map(|mc| &mc.from))
            .chain(constraints.max_delay_paths.iter().map(|md| &md.from));
        for from in launch_lists {
            for point in from {
                if let PathPoint::Node(node) = *point {
                    scoped[node.index()] = true;
                }
            }
        }
        Self {
            inputs: IoDelayCsr::new(node_count, &constraints.input_delays),
            outputs: IoDelayCsr::new(node_count, &constraints.output_delays),
            scoped,
        }
    }

    /// Input delays declared on `node`.
    pub fn input_delays(&self, node: NodeId) -> &[IoDelay] {
        self.inputs.get(node)
    }

    /// Output delays declared on `node`.
    pub fn output_delays(&self, node: NodeId) -> &[IoDelay] {
        self.outputs.get(node)
    }

    /// `true` if an exception names `node` as a launch point.
    pub fn is_scoped_launch(&self, node: NodeId) -> bool {
        self.scoped[node.index()]
    }
}

impl TimingConstraints {
    /// Creates an empty constraint set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a clock domain with its first rising edge at 0.
    pub fn create_clock(&mut self, name: Ident, period_ns: f64) -> DomainId {
        self.create_clock_with_waveform(name, period_ns, 0.0)
    }

    /// Declares a clock domain with an explicit rising-edge offset.
    pub fn create_clock_with_waveform(
        &mut self,
        name: Ident,
        period_ns: f64,
        rise_edge_ns: f64,
    ) -> DomainId {
        let id = DomainId::from_index(self.domains.len());
        self.domains.push(ClockDomain {
            name,
            period_ns,
            rise_edge_ns,
        });
        id
    }

    /// Returns a clock domain.
    ///
    /// # Panics
    ///
    /// Panics if the domain was not created on this constraint set.
    pub fn domain(&self, id: DomainId) -> &ClockDomain {
        &self.domains[id.index()]
    }

    /// Looks a domain up by name.
    pub fn find_domain(&self, name: Ident) -> Option<DomainId> {
        self.domains
            .iter()
            .position(|d| d.name == name)
            .map(DomainId::from_index)
    }

    /// Number of declared clock domains.
    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }

    /// Iterates all domain IDs.
    pub fn domain_ids(&self) -> impl Iterator<Item = DomainId> {
        (0..self.domains.len()).map(DomainId::from_index)
    }

    /// Seeds `node` with an arrival of `delay_ns` in `domain`.
    pub fn set_input_delay(&mut self, node: NodeId, domain: DomainId, delay_ns: f64) {
        self.input_delays.push(IoDelay {
            node,
            domain,
            delay_ns,
        });
    }

    /// Requires `node` to settle `delay_ns` before the `domain` capture edge.
    pub fn set_output_delay(&mut self, node: NodeId, domain: DomainId, delay_ns: f64) {
        self.output_delays.push(IoDelay {
            node,
            domain,
            delay_ns,
        });
    }

    /// Marks `node` as launching `domain` data at the clock edge (a register output).
    pub fn add_clock_source(&mut self, node: NodeId, domain: DomainId) {
        self.set_input_delay(node, domain, 0.0);
    }

    /// Marks `node` as captured by `domain` at the clock edge (a register input).
    pub fn add_clock_capture(&mut self, node: NodeId, domain: DomainId) {
        self.set_output_delay(node, domain, 0.0);
    }

    /// Overrides the setup relationship from `launch` to `capture`.
    pub fn set_domain_constraint(&mut self, launch: DomainId, capture: DomainId, constraint_ns: f64) {
        self.domain_constraints.push(DomainConstraint {
            launch,
            capture,
            constraint_ns,
        });
    }

    /// Excludes matching paths from analysis.
    pub fn set_false_path(&mut self, from: Vec<PathPoint>, to: Vec<PathPoint>) {
        self.false_paths.push(FalsePath { from, to });
    }

    /// Allows matching paths `cycles` capture periods.
    pub fn set_multicycle_path(&mut self, from: Vec<PathPoint>, to: Vec<PathPoint>, cycles: u32) {
        self.multicycle_paths.push(MulticyclePath { from, to, cycles });
    }

    /// Constrains matching paths to `delay_ns`.
    pub fn set_max_delay(&mut self, from: Vec<PathPoint>, to: Vec<PathPoint>, delay_ns: f64) {
        self.max_delay_paths.push(MaxDelayPath { from, to, delay_ns });
    }

    /// `true` if a false path with an unrestricted capture side removes this launch.
    pub fn excludes_startpoint(&self, node: NodeId, domain: DomainId) -> bool {
        self.false_paths
            .iter()
            .any(|fp| fp.to.is_empty() && !fp.from.is_empty() && point_matches(&fp.from, domain, node))
    }

    /// The explicit setup relationship for a domain pair, if one was declared.
    /// The last declaration wins.
    pub fn explicit_domain_constraint(&self, launch: DomainId, capture: DomainId) -> Option<f64> {
        self.domain_constraints
            .iter()
            .rev()
            .find(|c| c.launch == launch && c.capture == capture)
            .map(|c| c.constraint_ns)
    }

    /// Time from a `launch` edge to the first `capture` edge that checks it for setup.
    pub fn setup_relationship(&self, launch: DomainId, capture: DomainId) -> f64 {
        self.explicit_domain_constraint(launch, capture)
            .unwrap_or_else(|| edge_separation(self.domain(launch), self.domain(capture)))
    }

    /// Time from a `launch` edge to the capture edge that checks it for hold:
    /// one capture period before the setup edge.
    pub fn hold_relationship(&self, launch: DomainId, capture: DomainId) -> f64 {
        self.setup_relationship(launch, capture) - self.domain(capture).period_ns
    }

    fn is_false_path(&self, ends: &PathEnds) -> bool {
        self.false_paths.iter().any(|fp| {
            point_matches(&fp.from, ends.launch, ends.launch_node)
                && point_matches(&fp.to, ends.capture, ends.capture_node)
        })
    }

    /// Capture cycles allowed for the path; the last matching exception wins.
    fn multicycle(&self, ends: &PathEnds) -> u32 {
        self.multicycle_paths
            .iter()
            .rev()
            .find(|mc| {
                point_matches(&mc.from, ends.launch, ends.launch_node)
                    && point_matches(&mc.to, ends.capture, ends.capture_node)
            })
            .map_or(1, |mc| mc.cycles)
    }

    fn max_delay(&self, ends: &PathEnds) -> Option<f64> {
        self.max_delay_paths
            .iter()
            .filter(|md| {
                point_matches(&md.from, ends.launch, ends.launch_node)
                    && point_matches(&md.to, ends.capture, ends.capture_node)
            })
            .map(|md| md.delay_ns)
            .reduce(f64::min)
    }

    /// Setup requirement for a path, relative to its launch edge.
    ///
    /// `None` means the path is false and carries no requirement.
    pub fn setup_requirement(&self, ends: &PathEnds) -> Option<f64> {
        if self.is_false_path(ends) {
            return None;
        }
        if let Some(max) = self.max_delay(ends) {
            return Some(max);
        }
        let extra_cycles = self.multicycle(ends).saturating_sub(1) as f64;
        Some(
            self.setup_relationship(ends.launch, ends.capture)
                + extra_cycles * self.domain(ends.capture).period_ns,
        )
    }

    /// Hold requirement for a path, relative to its launch edge.
    pub fn hold_requirement(&self, ends: &PathEnds) -> Option<f64> {
        if self.is_false_path(ends) {
            return None;
        }
        let extra_cycles = self.multicycle(ends).saturating_sub(1) as f64;
        Some(
            self.hold_relationship(ends.launch, ends.capture)
                + extra_cycles * self.domain(ends.capture).period_ns,
        )
    }

    /// Checks every node and domain reference against `graph`.
    pub fn validate(&self, graph: &TimingGraph) -> Result<(), TimingError> {
        let node_count = graph.node_count();
        let domain_count = self.domains.len();
        let check_node = |node: NodeId| {
            if node.index() < node_count {
                Ok(())
            } else {
                Err(TimingError::UnknownNode { node, node_count })
            }
        };
        let check_domain = |domain: DomainId| {
            if domain.index() < domain_count {
                Ok(())
            } else {
                Err(TimingError::UnknownDomain {
                    domain,
                    domain_count,
                })
            }
        };
        let check_value = |value: f64| {
            if value.is_finite() {
                Ok(())
            } else {
                Err(TimingError::InvalidDelay { value })
            }
        };
        let check_points = |points: &[PathPoint]| -> Result<(), TimingError> {
            for p in points {
                match *p {
                    PathPoint::Domain(d) => check_domain(d)?,
                    PathPoint::Node(n) => check_node(n)?,
                }
            }
            Ok(())
        };

        for (i, d) in self.domains.iter().enumerate() {
            let valid = d.period_ns.is_finite()
                && d.period_ns >= 0.0
                && d.rise_edge_ns.is_finite()
                && d.rise_edge_ns >= 0.0;
            if !valid {
                return Err(TimingError::InvalidClock {
                    domain: DomainId::from_index(i),
                    period_ns: d.period_ns,
                    rise_edge_ns: d.rise_edge_ns,
                });
            }
        }
        for io in &self.input_delays {
            check_node(io.node)?;
            check_domain(io.domain)?;
            check_value(io.delay_ns)?;
            if !graph.in_edges(io.node).is_empty() {
                return Err(TimingError::NotAStartpoint { node: io.node });
            }
        }
        for io in &self.output_delays {
            check_node(io.node)?;
            check_domain(io.domain)?;
            check_value(io.delay_ns)?;
            if !graph.out_edges(io.node).is_empty() {
                return Err(TimingError::NotAnEndpoint { node: io.node });
            }
        }
        for dc in &self.domain_constraints {
            check_domain(dc.launch)?;
            check_domain(dc.capture)?;
            check_value(dc.constraint_ns)?;
        }
        for fp in &self.false_paths {
            check_points(&fp.from)?;
            check_points(&fp.to)?;
        }
        for mc in &self.multicycle_paths {
            check_points(&mc.from)?;
            check_points(&mc.to)?;
            if mc.cycles == 0 {
                return Err(TimingError::InvalidMulticycle);
            }
        }
        for md in &self.max_delay_paths {
            check_points(&md.from)?;
            check_points(&md.to)?;
            check_value(md.delay_ns)?;
        }
        Ok(())
    }
}

fn to_grid(ns: f64) -> i64 {
    (ns * EDGE_GRID_PER_NS).round() as i64
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Smallest strictly positive distance from a launch rising edge to a capture
/// rising edge over one common period of the two clocks.
fn edge_separation(launch: &ClockDomain, capture: &ClockDomain) -> f64 {
    let launch_period = to_grid(launch.period_ns);
    let capture_period = to_grid(capture.period_ns);
    let launch_rise = to_grid(launch.rise_edge_ns);
    let capture_rise = to_grid(capture.rise_edge_ns);

    if launch_period == capture_period && launch_rise == capture_rise {
        return launch.period_ns;
    }
    if launch_period == 0 || capture_period == 0 {
        return 0.0;
    }

    let window = (launch_period / gcd(launch_period, capture_period))
        .checked_mul(capture_period)
        .filter(|w| w / launch_period <= MAX_LAUNCH_EDGES);
    let Some(window) = window else {
        log::debug!(
            "clocks with periods {} ns and {} ns share no short common period; using the capture period",
            launch.period_ns,
            capture.period_ns
        );
        return capture.period_ns;
    };
    let mut best = i64::MAX;
    for k in 0..=window / launch_period {
        let launch_edge = launch_rise + k * launch_period;
        // First capture edge strictly after this launch edge.
        let n = (launch_edge - capture_rise).div_euclid(capture_period) + 1;
        let capture_edge = capture_rise + n * capture_period;
        best = best.min(capture_edge - launch_edge);
    }
    best as f64 / EDGE_GRID_PER_NS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeType, TimingGraphBuilder};
    use kairos_common::Interner;

    fn two_clocks(interner: &Interner, launch: f64, capture: f64) -> (TimingConstraints, DomainId, DomainId) {
        let mut tc = TimingConstraints::new();
        let a = tc.create_clock(interner.get_or_intern("a"), launch);
        let b = tc.create_clock(interner.get_or_intern("b"), capture);
        (tc, a, b)
    }

    fn ends(launch: DomainId, capture: DomainId) -> PathEnds {
        PathEnds {
            launch,
            launch_node: NodeId::from_raw(0),
            capture,
            capture_node: NodeId::from_raw(1),
        }
    }

    #[test]
    fn same_clock_relationship_is_period() {
        let interner = Interner::new();
        let mut tc = TimingConstraints::new();
        let clk = tc.create_clock(interner.get_or_intern("clk"), 5.0);
        assert_eq!(tc.setup_relationship(clk, clk), 5.0);
        assert_eq!(tc.hold_relationship(clk, clk), 0.0);
        assert_eq!(tc.find_domain(interner.get_or_intern("clk")), Some(clk));
        assert!((tc.domain(clk).frequency_mhz() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn cross_clock_uses_closest_edges() {
        let interner = Interner::new();
        // Launch every 10 ns, capture every 4 ns: edges 10 -> 12 are 2 ns apart.
        let (tc, a, b) = two_clocks(&interner, 10.0, 4.0);
        assert!((tc.setup_relationship(a, b) - 2.0).abs() < 1e-9);
        assert!((tc.hold_relationship(a, b) + 2.0).abs() < 1e-9);
        // Capture every 10 ns from a 4 ns launch: 8 -> 10.
        assert!((tc.setup_relationship(b, a) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn phase_shifted_clock() {
        let interner = Interner::new();
        let mut tc = TimingConstraints::new();
        let a = tc.create_clock(interner.get_or_intern("a"), 10.0);
        let b = tc.create_clock_with_waveform(interner.get_or_intern("b"), 10.0, 3.0);
        assert!((tc.setup_relationship(a, b) - 3.0).abs() < 1e-9);
        assert!((tc.setup_relationship(b, a) - 7.0).abs() < 1e-9);
    }

    #[test]
    fn zero_period_gives_zero_relationship() {
        let interner = Interner::new();
        let (tc, a, b) = two_clocks(&interner, 0.0, 8.0);
        assert_eq!(tc.setup_relationship(a, b), 0.0);
    }

    #[test]
    fn explicit_constraint_overrides() {
        let interner = Interner::new();
        let (mut tc, a, b) = two_clocks(&interner, 10.0, 4.0);
        tc.set_domain_constraint(a, b, 6.5);
        assert_eq!(tc.setup_relationship(a, b), 6.5);
        assert!((tc.setup_relationship(b, a) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn false_path_removes_requirement() {
        let interner = Interner::new();
        let (mut tc, a, b) = two_clocks(&interner, 10.0, 10.0);
        tc.set_false_path(vec![PathPoint::Domain(a)], vec![PathPoint::Domain(b)]);
        assert_eq!(tc.setup_requirement(&ends(a, b)), None);
        assert_eq!(tc.hold_requirement(&ends(a, b)), None);
        assert_eq!(tc.setup_requirement(&ends(b, a)), Some(10.0));
    }

    #[test]
    fn multicycle_moves_setup_and_hold() {
        let interner = Interner::new();
        let mut tc = TimingConstraints::new();
        let clk = tc.create_clock(interner.get_or_intern("clk"), 4.0);
        tc.set_multicycle_path(vec![], vec![PathPoint::Node(NodeId::from_raw(1))], 3);
        assert_eq!(tc.setup_requirement(&ends(clk, clk)), Some(12.0));
        assert_eq!(tc.hold_requirement(&ends(clk, clk)), Some(8.0));
    }

    #[test]
    fn max_delay_replaces_setup_only() {
        let interner = Interner::new();
        let mut tc = TimingConstraints::new();
        let clk = tc.create_clock(interner.get_or_intern("clk"), 4.0);
        tc.set_max_delay(vec![PathPoint::Node(NodeId::from_raw(0))], vec![], 2.5);
        tc.set_max_delay(vec![], vec![PathPoint::Domain(clk)], 3.0);
        assert_eq!(tc.setup_requirement(&ends(clk, clk)), Some(2.5));
        assert_eq!(tc.hold_requirement(&ends(clk, clk)), Some(0.0));
    }

    #[test]
    fn startpoint_exclusion_needs_open_capture_side() {
        let interner = Interner::new();
        let mut tc = TimingConstraints::new();
        let clk = tc.create_clock(interner.get_or_intern("clk"), 4.0);
        let rst = NodeId::from_raw(2);
        tc.set_false_path(vec![PathPoint::Node(rst)], vec![]);
        assert!(tc.excludes_startpoint(rst, clk));
        assert!(!tc.excludes_startpoint(NodeId::from_raw(0), clk));

        let mut narrow = TimingConstraints::new();
        let clk = narrow.create_clock(interner.get_or_intern("clk"), 4.0);
        narrow.set_false_path(vec![PathPoint::Node(rst)], vec![PathPoint::Node(NodeId::from_raw(1))]);
        assert!(!narrow.excludes_startpoint(rst, clk));
    }

    #[test]
    fn unrelated_periods_fall_back_to_capture_period() {
        let interner = Interner::new();
        // Co-prime on the ps grid: the common period has a million launch edges.
        let (tc, a, b) = two_clocks(&interner, 999_983.0, 1_000_003.0);
        assert_eq!(tc.setup_relationship(a, b), 1_000_003.0);
        // The common period does not fit in an i64 of picoseconds.
        let (tc, a, b) = two_clocks(&interner, 1.0e9, 1.0e9 + 0.001);
        assert_eq!(tc.setup_relationship(a, b), 1.0e9 + 0.001);
    }

    #[test]
    fn index_groups_delays_by_node() {
        let interner = Interner::new();
        let mut tc = TimingConstraints::new();
        let a = tc.create_clock(interner.get_or_intern("a"), 5.0);
        let b = tc.create_clock(interner.get_or_intern("b"), 8.0);
        let (n0, n1, n2, n3) = (
            NodeId::from_raw(0),
            NodeId::from_raw(1),
            NodeId::from_raw(2),
            NodeId::from_raw(3),
        );
        tc.set_input_delay(n1, a, 0.5);
        tc.set_input_delay(n0, b, 0.25);
        tc.set_input_delay(n1, b, 0.75);
        tc.set_output_delay(n3, a, 1.0);

        let index = ConstraintIndex::new(&tc, 4);
        let at_n1: Vec<(DomainId, f64)> = index.input_delays(n1).iter().map(|d| (d.domain, d.delay_ns)).collect();
        assert_eq!(at_n1, vec![(a, 0.5), (b, 0.75)]);
        assert_eq!(index.input_delays(n0).len(), 1);
        assert!(index.input_delays(n2).is_empty());
        assert!(index.output_delays(n1).is_empty());
        assert_eq!(index.output_delays(n3)[0].delay_ns, 1.0);
    }

    #[test]
    fn exception_launch_nodes_are_scoped() {
        let mut tc = TimingConstraints::new();
        let (n0, n1, n2, n3) = (
            NodeId::from_raw(0),
            NodeId::from_raw(1),
            NodeId::from_raw(2),
            NodeId::from_raw(3),
        );
        tc.set_false_path(vec![PathPoint::Node(n0)], vec![PathPoint::Node(n3)]);
        tc.set_max_delay(vec![PathPoint::Node(n1)], vec![], 2.0);
        // Cuts the whole startpoint, nothing left to separate.
        tc.set_false_path(vec![PathPoint::Node(n2)], vec![]);
        // Capture-side node points never scope a launch.
        tc.set_multicycle_path(vec![], vec![PathPoint::Node(n3)], 2);

        let index = ConstraintIndex::new(&tc, 4);
        assert!(index.is_scoped_launch(n0));
        assert!(index.is_scoped_launch(n1));
        assert!(!index.is_scoped_launch(n2));
        assert!(!index.is_scoped_launch(n3));
    }

    fn small_graph() -> (TimingGraph, NodeId, NodeId) {
        let mut b = TimingGraphBuilder::new();
        let i = b.add_node("in", NodeType::Source);
        let o = b.add_node("out", NodeType::Sink);
        b.add_edge(i, o);
        (b.build().unwrap(), i, o)
    }

    #[test]
    fn validate_accepts_consistent_constraints() {
        let interner = Interner::new();
        let (g, i, o) = small_graph();
        let mut tc = TimingConstraints::new();
        let clk = tc.create_clock(interner.get_or_intern("clk"), 5.0);
        tc.set_input_delay(i, clk, 1.0);
        tc.set_output_delay(o, clk, 0.5);
        tc.set_false_path(vec![PathPoint::Node(i)], vec![PathPoint::Domain(clk)]);
        assert!(tc.validate(&g).is_ok());
    }

    #[test]
    fn validate_rejects_bad_references() {
        let interner = Interner::new();
        let (g, i, o) = small_graph();

        let mut tc = TimingConstraints::new();
        tc.set_input_delay(i, DomainId::from_raw(0), 1.0);
        assert!(matches!(tc.validate(&g), Err(TimingError::UnknownDomain { .. })));

        let mut tc = TimingConstraints::new();
        let clk = tc.create_clock(interner.get_or_intern("clk"), 5.0);
        tc.set_output_delay(NodeId::from_raw(7), clk, 0.0);
        assert!(matches!(tc.validate(&g), Err(TimingError::UnknownNode { .. })));

        let mut tc = TimingConstraints::new();
        let clk = tc.create_clock(interner.get_or_intern("clk"), 5.0);
        tc.set_input_delay(o, clk, 0.0);
        assert!(matches!(tc.validate(&g), Err(TimingError::NotAStartpoint { .. })));

        let mut tc = TimingConstraints::new();
        let clk = tc.create_clock(interner.get_or_intern("clk"), 5.0);
        tc.set_output_delay(i, clk, 0.0);
        assert!(matches!(tc.validate(&g), Err(TimingError::NotAnEndpoint { .. })));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let interner = Interner::new();
        let (g, _, _) = small_graph();

        let mut tc = TimingConstraints::new();
        tc.create_clock(interner.get_or_intern("clk"), -1.0);
        assert!(matches!(tc.validate(&g), Err(TimingError::InvalidClock { .. })));

        let mut tc = TimingConstraints::new();
        tc.set_multicycle_path(vec![], vec![], 0);
        assert!(matches!(tc.validate(&g), Err(TimingError::InvalidMulticycle)));

        let mut tc = TimingConstraints::new();
        tc.set_max_delay(vec![], vec![], f64::NAN);
        assert!(matches!(tc.validate(&g), Err(TimingError::InvalidDelay { .. })));
    }

    #[test]
    fn serde_roundtrip() {
        let interner = Interner::new();
        let mut tc = TimingConstraints::new();
        let clk = tc.create_clock(interner.get_or_intern("clk"), 5.0);
        tc.add_clock_source(NodeId::from_raw(0), clk);
        tc.set_false_path(vec![PathPoint::Domain(clk)], vec![]);
        let json = serde_json::to_string(&tc).unwrap();
        let back: TimingConstraints = serde_json::from_str(&json).unwrap();
        assert_eq!(back.domain_count(), 1);
        assert_eq!(back.input_delays.len(), 1);
        assert_eq!(back.false_paths[0].from, vec![PathPoint::Domain(clk)]);
    }
}
