//! Shared foundational types used across the Kairos timing analysis workspace.
//!
//! This crate provides interned names for clocks and constraint targets, and
//! the result type used to surface internal engine errors.

#![warn(missing_docs)]

pub mod ident;
pub mod result;

pub use ident::{Ident, Interner};
pub use result::{InternalError, KairosResult};
