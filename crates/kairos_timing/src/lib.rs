//! Static timing analysis engine for the Kairos FPGA toolchain.
//!
//! Given a levelized timing graph, a set of clock and I/O constraints, and a
//! delay model, the engine computes per-clock-domain arrival and required
//! times at every node, and the setup and hold slacks derived from them.
//!
//! # Usage
//!
//! ```ignore
//! use kairos_timing::{ConstantDelayCalculator, SerialWalker, SetupHoldVisitor, TimingAnalyzer};
//!
//! let graph = builder.build()?;
//! let mut analyzer = TimingAnalyzer::new(
//!     &graph,
//!     &constraints,
//!     &ConstantDelayCalculator::new(0.2),
//!     SerialWalker::new(),
//!     SetupHoldVisitor::new(),
//! )?;
//! analyzer.update_timing(&sink);
//! println!("worst setup slack: {:?}", analyzer.worst_setup_slack());
//! ```
//!
//! # Architecture
//!
//! - [`time`]: nanosecond values with an invalid state
//! - [`graph`]: node/edge topology and levelization
//! - [`constraints`]: clock domains, I/O delays, path exceptions
//! - [`delay`]: pluggable edge delay models
//! - [`tags`]: per-node, per-domain arrival/required storage and merge rules
//! - [`walker`]: serial and level-parallel traversal strategies
//! - [`visitor`]: setup, hold, and combined analysis policies
//! - [`analyzer`]: the `update_timing` / query façade
//! - [`report`]: endpoint summaries and critical paths

#![warn(missing_docs)]

pub mod analyzer;
pub mod constraints;
pub mod delay;
pub mod error;
pub mod graph;
pub mod ids;
pub mod report;
pub mod slack;
pub mod tags;
pub mod time;
pub mod visitor;
pub mod walker;

pub use analyzer::{HoldAnalyzer, PhaseTimes, SetupAnalyzer, SetupHoldAnalyzer, TimingAnalyzer};
pub use constraints::{
    ClockDomain, ConstraintIndex, DomainConstraint, FalsePath, IoDelay, MaxDelayPath,
    MulticyclePath, PathEnds, PathPoint, TimingConstraints,
};
pub use delay::{
    ConstantDelayCalculator, DelayCalculator, DeratedDelayCalculator, EdgeDelay,
    FixedDelayCalculator,
};
pub use error::{GraphError, TimingError};
pub use graph::{NodeType, TimingEdge, TimingGraph, TimingGraphBuilder, TimingNode};
pub use ids::{DomainId, EdgeId, LevelId, NodeId};
pub use report::{CheckSummary, ClockDomainTiming, CriticalPath, PathElement, TimingReport};
pub use slack::DomainSlack;
pub use tags::{Merge, TagKey, TagType, TimingTag, TimingTags};
pub use time::Time;
pub use visitor::{
    CheckAnalysis, CheckKind, GraphVisitor, HoldVisitor, SetupHoldVisitor, SetupVisitor,
    TimingContext,
};
pub use walker::{AnyWalker, GraphWalker, ParallelWalker, SerialWalker, TraversalCounts};
