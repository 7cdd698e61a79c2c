//! HTTP inbound adapter.
//!
//! Handlers translate the wire contract to driving-port calls and never
//! touch storage or transports directly.

pub mod error;
pub mod health;
pub mod results;
pub mod state;
pub mod voting;

pub use error::{ApiResult, ErrorBody};

use actix_web::web;

/// Mount the voting API under `/api/voting`.
pub fn configure(config: &mut web::ServiceConfig) {
    config.service(
        web::scope("/api/voting")
            .service(voting::request_otp)
            .service(voting::verify_otp)
            .service(voting::cast)
            .service(results::results),
    );
}
