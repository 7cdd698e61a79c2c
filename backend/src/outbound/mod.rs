//! Outbound adapters implementing the driven ports.

pub mod email;
pub mod persistence;
