//! Voting session HTTP handlers.
//!
//! ```text
//! POST /api/voting/request_otp
//! POST /api/voting/verify_otp
//! POST /api/voting/cast
//! ```

use std::collections::BTreeMap;

use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{
    AuthenticateRequest, CastRequest, PasscodeDelivery, PasscodeRequest,
};
use crate::domain::Error;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{ApiResult, ErrorBody};

/// On-screen note accompanying the delivery fallback payload.
const FALLBACK_NOTE: &str =
    "Email service is temporarily unavailable. Please use the OTP code displayed on your screen.";

fn parse_uuid(value: &str, field: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| {
        Error::invalid_request(format!("{field} must be a valid UUID"))
            .with_details(json!({ "field": field, "value": value }))
    })
}

fn require_field(value: &str, field: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::invalid_request(format!("{field} is required"))
            .with_details(json!({ "field": field })));
    }
    Ok(())
}

/// Request payload for passcode issuance.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RequestOtpBody {
    /// Voter registration number.
    #[serde(rename = "regNo")]
    pub reg_no: String,
    /// Election identifier.
    #[schema(format = "uuid")]
    pub election: String,
}

/// Success payload when the passcode was emailed.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OtpSentBody {
    pub message: String,
    /// Masked delivery address, e.g. `gra***@example.com`.
    pub email_hint: String,
}

/// Success payload when email delivery failed and the code is shown on screen.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OtpFallbackBody {
    pub message: String,
    /// The raw passcode for on-screen display.
    pub otp: String,
    pub note: String,
    pub email_failed: bool,
}

/// Issue a passcode for a registered voter and attempt email delivery.
///
/// Delivery failure is not an error: the response degrades to the fallback
/// payload carrying the raw code so an email outage cannot block voting.
#[utoipa::path(
    post,
    path = "/api/voting/request_otp",
    request_body = RequestOtpBody,
    responses(
        (status = 200, description = "Passcode emailed, or issued with the on-screen fallback payload", body = OtpSentBody),
        (status = 400, description = "Invalid request, already voted, or no email on file", body = ErrorBody),
        (status = 404, description = "Voter registration not found", body = ErrorBody),
        (status = 503, description = "Service unavailable", body = ErrorBody)
    ),
    tags = ["voting"],
    operation_id = "requestOtp"
)]
#[post("/request_otp")]
pub async fn request_otp(
    state: web::Data<HttpState>,
    payload: web::Json<RequestOtpBody>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    require_field(&payload.reg_no, "regNo")?;
    require_field(&payload.election, "election")?;
    let election_id = parse_uuid(&payload.election, "election")?;

    let delivery = state
        .voting
        .request_passcode(PasscodeRequest {
            election_id,
            registration_number: payload.reg_no,
        })
        .await?;

    let response = match delivery {
        PasscodeDelivery::Emailed { email_hint } => {
            HttpResponse::Ok().json(OtpSentBody {
                message: "OTP sent successfully to your registered email".to_owned(),
                email_hint,
            })
        }
        PasscodeDelivery::Fallback { code } => HttpResponse::Ok().json(OtpFallbackBody {
            message: "OTP generated successfully".to_owned(),
            otp: code,
            note: FALLBACK_NOTE.to_owned(),
            email_failed: true,
        }),
    };
    Ok(response)
}

/// Request payload for passcode verification.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct VerifyOtpBody {
    /// Voter registration number.
    #[serde(rename = "regNo")]
    pub reg_no: String,
    /// The passcode received by email or on screen.
    pub otp: String,
    /// Election identifier.
    #[schema(format = "uuid")]
    pub election: String,
}

/// Success payload for passcode verification.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OtpVerifiedBody {
    pub message: String,
}

/// Verify a passcode for a registered voter.
///
/// Consumes the code: a second verification with the same code fails with
/// the generic invalid-code message.
#[utoipa::path(
    post,
    path = "/api/voting/verify_otp",
    request_body = VerifyOtpBody,
    responses(
        (status = 200, description = "Passcode verified", body = OtpVerifiedBody),
        (status = 400, description = "Invalid or expired passcode", body = ErrorBody),
        (status = 404, description = "Voter registration not found", body = ErrorBody),
        (status = 503, description = "Service unavailable", body = ErrorBody)
    ),
    tags = ["voting"],
    operation_id = "verifyOtp"
)]
#[post("/verify_otp")]
pub async fn verify_otp(
    state: web::Data<HttpState>,
    payload: web::Json<VerifyOtpBody>,
) -> ApiResult<web::Json<OtpVerifiedBody>> {
    let payload = payload.into_inner();
    require_field(&payload.reg_no, "regNo")?;
    require_field(&payload.otp, "otp")?;
    require_field(&payload.election, "election")?;
    let election_id = parse_uuid(&payload.election, "election")?;

    state
        .voting
        .authenticate(AuthenticateRequest {
            election_id,
            registration_number: payload.reg_no,
            code: payload.otp,
        })
        .await?;

    Ok(web::Json(OtpVerifiedBody {
        message: "OTP verified successfully".to_owned(),
    }))
}

/// Request payload for casting ballots.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CastBody {
    /// Voter registration number.
    #[serde(rename = "regNo")]
    pub reg_no: String,
    /// Position-to-candidate selections, one candidate per position.
    #[schema(value_type = std::collections::BTreeMap<uuid::Uuid, uuid::Uuid>)]
    pub votes: BTreeMap<String, String>,
    /// Election identifier.
    #[schema(format = "uuid")]
    pub election: String,
}

/// Success payload for a committed cast.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CastAcceptedBody {
    pub message: String,
    pub votes_count: u32,
}

/// Validate selections and commit the voter's ballots atomically.
#[utoipa::path(
    post,
    path = "/api/voting/cast",
    request_body = CastBody,
    responses(
        (status = 201, description = "Ballots recorded", body = CastAcceptedBody),
        (status = 400, description = "Invalid selection, empty votes, or already voted", body = ErrorBody),
        (status = 404, description = "Voter registration not found", body = ErrorBody),
        (status = 503, description = "Service unavailable", body = ErrorBody)
    ),
    tags = ["voting"],
    operation_id = "castVotes"
)]
#[post("/cast")]
pub async fn cast(
    state: web::Data<HttpState>,
    payload: web::Json<CastBody>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    require_field(&payload.reg_no, "regNo")?;
    require_field(&payload.election, "election")?;
    let election_id = parse_uuid(&payload.election, "election")?;

    if payload.votes.is_empty() {
        return Err(Error::invalid_request("No votes provided"));
    }

    let mut selections = BTreeMap::new();
    for (position, candidate) in &payload.votes {
        let position_id = parse_uuid(position, "votes.position")?;
        let candidate_id = parse_uuid(candidate, "votes.candidate")?;
        selections.insert(position_id, candidate_id);
    }

    let receipt = state
        .voting
        .cast(CastRequest {
            election_id,
            registration_number: payload.reg_no,
            selections,
        })
        .await?;

    Ok(HttpResponse::Created().json(CastAcceptedBody {
        message: "Vote cast successfully".to_owned(),
        votes_count: receipt.ballots_cast,
    }))
}
