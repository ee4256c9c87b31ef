//! Error types for graph construction and analyzer setup.

use crate::ids::{DomainId, EdgeId, NodeId};

/// A malformed timing graph. Fatal: no analysis can run on it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// A node's stored ID does not match its position in the builder.
    #[error("node at position {position} carries id {id}")]
    NodeIdMismatch {
        /// Index of the node in the builder.
        position: usize,
        /// The ID it carries.
        id: NodeId,
    },

    /// An edge's stored ID does not match its position in the builder.
    #[error("edge at position {position} carries id {id}")]
    EdgeIdMismatch {
        /// Index of the edge in the builder.
        position: usize,
        /// The ID it carries.
        id: EdgeId,
    },

    /// An edge names a node that does not exist.
    #[error("edge {edge} references node {node}, but the graph has {node_count} nodes")]
    NodeOutOfRange {
        /// The offending edge.
        edge: EdgeId,
        /// The missing node.
        node: NodeId,
        /// Number of nodes in the graph.
        node_count: usize,
    },

    /// An edge connects a node to itself.
    #[error("edge {edge} is a self-loop on node {node}")]
    SelfLoop {
        /// The offending edge.
        edge: EdgeId,
        /// The node it loops on.
        node: NodeId,
    },

    /// A `Source` node has an incoming edge.
    #[error("source node {node} has incoming edge {edge}")]
    SourceHasFanin {
        /// The source node.
        node: NodeId,
        /// One of its incoming edges.
        edge: EdgeId,
    },

    /// A `Sink` node has an outgoing edge.
    #[error("sink node {node} has outgoing edge {edge}")]
    SinkHasFanout {
        /// The sink node.
        node: NodeId,
        /// One of its outgoing edges.
        edge: EdgeId,
    },

    /// Some nodes could not be assigned a level because they lie on a cycle
    /// (or downstream of one).
    #[error("timing graph contains a cycle: {remaining} nodes could not be levelized (e.g. {example})")]
    Cycle {
        /// Number of nodes left without a level.
        remaining: usize,
        /// One node that was left without a level.
        example: NodeId,
    },
}

/// Errors raised while assembling an analyzer.
#[derive(Debug, thiserror::Error)]
pub enum TimingError {
    /// The graph failed to finalize.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A constraint names a node outside the graph.
    #[error("constraint references node {node}, but the graph has {node_count} nodes")]
    UnknownNode {
        /// The missing node.
        node: NodeId,
        /// Number of nodes in the graph.
        node_count: usize,
    },

    /// A constraint names a clock domain that was never created.
    #[error("constraint references clock domain {domain}, but only {domain_count} are defined")]
    UnknownDomain {
        /// The missing domain.
        domain: DomainId,
        /// Number of defined domains.
        domain_count: usize,
    },

    /// A clock period or edge offset is negative or not finite.
    #[error("clock domain {domain} has invalid waveform (period {period_ns} ns, rise {rise_edge_ns} ns)")]
    InvalidClock {
        /// The domain.
        domain: DomainId,
        /// Its declared period.
        period_ns: f64,
        /// Its declared rising-edge offset.
        rise_edge_ns: f64,
    },

    /// A delay value in the constraints is not finite.
    #[error("constraint value {value} ns is not finite")]
    InvalidDelay {
        /// The offending value.
        value: f64,
    },

    /// A multicycle exception with zero cycles.
    #[error("multicycle exception must allow at least one cycle")]
    InvalidMulticycle,

    /// An input delay on a node that has predecessors.
    #[error("input delay on node {node}, which is not a startpoint (it has fan-in)")]
    NotAStartpoint {
        /// The node.
        node: NodeId,
    },

    /// An output delay on a node that has successors.
    #[error("output delay on node {node}, which is not an endpoint (it has fan-out)")]
    NotAnEndpoint {
        /// The node.
        node: NodeId,
    },

    /// The parallel walker's thread pool could not be created.
    #[error("failed to build walker thread pool: {0}")]
    ThreadPool(String),

    /// The analysis configuration was rejected.
    #[error(transparent)]
    Config(#[from] kairos_config::ConfigError),
}
