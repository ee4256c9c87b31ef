//! Structured diagnostics for the timing engine.
//!
//! Conditions the caller should see but that do not stop an analysis run
//! (unconstrained I/O, violated checks, constraints that never applied) are
//! reported as [`Diagnostic`]s into a thread-safe [`DiagnosticSink`], and can be
//! printed with a [`DiagnosticRenderer`].

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
