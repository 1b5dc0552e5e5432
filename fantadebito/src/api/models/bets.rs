//! Request/response models for the bet lifecycle.

use crate::store::models::bets::{BetRow, Outcome, Participant, ProbationSubject};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateBetRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub subject: Option<String>,
    pub outcome: Option<String>,
    pub stance: Option<String>,
    #[serde(rename = "probationDetail")]
    pub probation_detail: Option<Vec<ProbationSubject>>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct JoinBetRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "betId")]
    pub bet_id: Option<String>,
    pub stance: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TerminateBetRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "betId")]
    pub bet_id: Option<String>,
    pub realized: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DeleteBetRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "betId")]
    pub bet_id: Option<String>,
}

/// Bet projection for clients: participants flattened to a plain id list
/// plus a parallel `{user_id, stance}` list, probation detail in structured
/// form, and the termination fields in their stored string representation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BetResponse {
    pub id: String,
    pub owner_id: String,
    pub subject: String,
    pub outcome: Outcome,
    pub probation_detail: Vec<ProbationSubject>,
    pub invite_code: String,
    pub participants: Vec<String>,
    pub stances: Vec<Participant>,
    pub created_at: String,
    pub terminated_at: String,
    pub realized: String,
}

impl From<BetRow> for BetResponse {
    fn from(row: BetRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            subject: row.subject,
            outcome: row.outcome,
            probation_detail: row.probation_detail,
            participants: row.participants.iter().map(|p| p.user_id.clone()).collect(),
            stances: row.participants,
            invite_code: row.invite_code,
            created_at: row.created_at,
            terminated_at: row.terminated_at.unwrap_or_default(),
            realized: match row.realized {
                Some(true) => "true".to_string(),
                Some(false) => "false".to_string(),
                None => String::new(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateBetResponse {
    pub status: String,
    pub bet: BetResponse,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JoinBetResponse {
    pub status: String,
    pub bet: BetResponse,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TerminateBetResponse {
    pub status: String,
    #[serde(rename = "betId")]
    pub bet_id: String,
    pub winners: Vec<String>,
    pub losers: Vec<String>,
    pub realized: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeleteBetResponse {
    pub status: String,
    #[serde(rename = "betId")]
    pub bet_id: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListBetsResponse {
    pub status: String,
    pub bets: Vec<BetResponse>,
}
