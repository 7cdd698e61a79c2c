//! OpenAPI documentation configuration.
//!
//! Generates the specification for the voting REST API; served by Swagger UI
//! in debug builds.

use utoipa::OpenApi;

use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::results::{CandidateResultBody, PositionResultBody};
use crate::inbound::http::voting::{
    CastAcceptedBody, CastBody, OtpFallbackBody, OtpSentBody, OtpVerifiedBody, RequestOtpBody,
    VerifyOtpBody,
};

/// OpenAPI document for the voting API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Voting backend API",
        description = "Passcode-gated voter authentication, atomic ballot casting, and live results."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::voting::request_otp,
        crate::inbound::http::voting::verify_otp,
        crate::inbound::http::voting::cast,
        crate::inbound::http::results::results,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        RequestOtpBody,
        OtpSentBody,
        OtpFallbackBody,
        VerifyOtpBody,
        OtpVerifiedBody,
        CastBody,
        CastAcceptedBody,
        PositionResultBody,
        CandidateResultBody,
        ErrorBody,
    )),
    tags(
        (name = "voting", description = "Voter authentication, casting, and results"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_contains_all_voting_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/api/voting/request_otp",
            "/api/voting/verify_otp",
            "/api/voting/cast",
            "/api/voting/results",
            "/healthz",
            "/readyz",
        ] {
            assert!(
                paths.iter().any(|path| *path == expected),
                "missing path {expected}"
            );
        }
    }

    #[test]
    fn error_schema_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components present");
        assert!(components.schemas.contains_key("ErrorBody"));
    }
}
