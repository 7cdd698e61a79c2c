//! Election results HTTP handler.
//!
//! ```text
//! GET /api/voting/results?election=<id>
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{Error, PositionTally};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{ApiResult, ErrorBody};

/// Query parameters for the results endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ResultsQuery {
    /// Election identifier.
    pub election: String,
}

/// Ranked tally for one candidate.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CandidateResultBody {
    #[schema(format = "uuid")]
    pub id: Uuid,
    pub name: String,
    pub votes: i64,
}

/// Ranked result set for one position.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PositionResultBody {
    /// Position title.
    pub position: String,
    /// Candidates ordered by vote count descending.
    pub candidates: Vec<CandidateResultBody>,
}

impl From<PositionTally> for PositionResultBody {
    fn from(tally: PositionTally) -> Self {
        Self {
            position: tally.position_title,
            candidates: tally
                .candidates
                .into_iter()
                .map(|candidate| CandidateResultBody {
                    id: candidate.candidate_id,
                    name: candidate.full_name,
                    votes: candidate.votes,
                })
                .collect(),
        }
    }
}

/// Read the ranked per-position results for an election.
///
/// Safe to call while voting is in progress; each call reads one consistent
/// snapshot. An unknown election yields an empty array rather than an error.
#[utoipa::path(
    get,
    path = "/api/voting/results",
    params(ResultsQuery),
    responses(
        (status = 200, description = "Ranked results per position", body = [PositionResultBody]),
        (status = 400, description = "Invalid election identifier", body = ErrorBody),
        (status = 503, description = "Service unavailable", body = ErrorBody)
    ),
    tags = ["voting"],
    operation_id = "electionResults"
)]
#[get("/results")]
pub async fn results(
    state: web::Data<HttpState>,
    query: web::Query<ResultsQuery>,
) -> ApiResult<web::Json<Vec<PositionResultBody>>> {
    let election_id = Uuid::parse_str(&query.election).map_err(|_| {
        Error::invalid_request("election must be a valid UUID")
            .with_details(json!({ "field": "election", "value": query.election }))
    })?;

    let tallies = state.tally.tally(election_id).await?;
    Ok(web::Json(
        tallies.into_iter().map(PositionResultBody::from).collect(),
    ))
}
