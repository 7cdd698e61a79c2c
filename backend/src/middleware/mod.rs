//! Request middleware.
//!
//! Purpose: request lifecycle concerns, currently trace-id correlation.

pub mod trace;

pub use trace::Trace;
