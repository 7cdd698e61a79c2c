//! Online voting backend.
//!
//! Hexagonal layout: `domain` holds entities, ports, and services; `inbound`
//! adapts HTTP onto the driving ports; `outbound` implements the driven
//! ports over PostgreSQL and SMTP; `server` wires the two sides together.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use doc::ApiDoc;
pub use middleware::Trace;
