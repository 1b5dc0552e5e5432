//! Row model for the `bets` table.
//!
//! The table itself is all-Utf8; outcome, probation detail and participants
//! are normalized into typed values at the decode boundary and re-flattened
//! on encode. Domain logic never sees the raw column strings.

use crate::store::codec::{self, TableRow};
use crate::store::errors::Result;
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::OnceLock;
use utoipa::ToSchema;

/// A participant's declared side of a bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Stance {
    For,
    Against,
}

impl Stance {
    /// Lenient parse used on request input: invalid or absent input falls
    /// back to `For`.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value {
            Some("against") => Stance::Against,
            _ => Stance::For,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stance::For => "for",
            Stance::Against => "against",
        }
    }
}

/// Predicted academic outcome of a bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Admission,
    Probation,
    NonAdmission,
}

impl Outcome {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admission" => Some(Outcome::Admission),
            "probation" => Some(Outcome::Probation),
            "non_admission" => Some(Outcome::NonAdmission),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Admission => "admission",
            Outcome::Probation => "probation",
            Outcome::NonAdmission => "non_admission",
        }
    }
}

/// One subject/grade pair of a probation prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProbationSubject {
    #[serde(alias = "subject")]
    pub subject_name: String,
    pub grade: i32,
}

/// One participant entry, at most one per user id.
///
/// Stored rows can carry three shapes: the tagged record written today, an
/// object keyed `userId`, and a bare user-id string from the earliest data.
/// All of them normalize to this struct when the table is decoded; a legacy
/// entry without a stance is on neither side at settlement.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Participant {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stance: Option<Stance>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ParticipantWire {
    Bare(String),
    Record {
        #[serde(alias = "userId")]
        user_id: String,
        #[serde(default, deserialize_with = "lenient_stance")]
        stance: Option<Stance>,
    },
}

/// Stored stances outside the `for`/`against` domain normalize to "no
/// stance" rather than failing the whole table decode.
fn lenient_stance<'de, D>(deserializer: D) -> std::result::Result<Option<Stance>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().and_then(|s| match s {
        "for" => Some(Stance::For),
        "against" => Some(Stance::Against),
        _ => None,
    }))
}

impl<'de> Deserialize<'de> for Participant {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(match ParticipantWire::deserialize(deserializer)? {
            ParticipantWire::Bare(user_id) => Participant { user_id, stance: None },
            ParticipantWire::Record { user_id, stance } => Participant { user_id, stance },
        })
    }
}

/// One row of the `bets` table.
#[derive(Debug, Clone, PartialEq)]
pub struct BetRow {
    pub id: String,
    pub owner_id: String,
    pub subject: String,
    pub outcome: Outcome,
    /// Meaningful only when `outcome` is `Probation`; empty otherwise
    pub probation_detail: Vec<ProbationSubject>,
    /// Retained for display; not used for access control
    pub invite_code: String,
    pub participants: Vec<Participant>,
    pub created_at: String,
    /// `None` while the bet is open; set exactly once
    pub terminated_at: Option<String>,
    /// Meaningful only once terminated
    pub realized: Option<bool>,
}

impl BetRow {
    pub fn is_open(&self) -> bool {
        self.terminated_at.is_none()
    }

    /// Upsert this user's stance; never produces a duplicate entry.
    pub fn set_stance(&mut self, user_id: &str, stance: Stance) {
        match self.participants.iter_mut().find(|p| p.user_id == user_id) {
            Some(existing) => existing.stance = Some(stance),
            None => self.participants.push(Participant {
                user_id: user_id.to_string(),
                stance: Some(stance),
            }),
        }
    }

    /// Split participants into (winners, losers) for the given settlement.
    ///
    /// Recomputed deterministically from stored data wherever it is needed,
    /// so applying it twice over the same rows selects the same users.
    pub fn settlement_partition(&self, realized: bool) -> (Vec<String>, Vec<String>) {
        let (winning, losing) = if realized {
            (Stance::For, Stance::Against)
        } else {
            (Stance::Against, Stance::For)
        };

        let side = |stance: Stance| {
            self.participants
                .iter()
                .filter(|p| p.stance == Some(stance))
                .map(|p| p.user_id.clone())
                .collect::<Vec<_>>()
        };

        (side(winning), side(losing))
    }
}

static SCHEMA: OnceLock<SchemaRef> = OnceLock::new();

impl TableRow for BetRow {
    const TABLE_NAME: &'static str = "bets";

    fn schema() -> SchemaRef {
        SCHEMA
            .get_or_init(|| {
                Arc::new(Schema::new(vec![
                    Field::new("id", DataType::Utf8, false),
                    Field::new("owner_id", DataType::Utf8, false),
                    Field::new("subject", DataType::Utf8, false),
                    Field::new("esito", DataType::Utf8, false),
                    Field::new("sospensione_json", DataType::Utf8, false),
                    Field::new("invite_code", DataType::Utf8, false),
                    Field::new("participants_json", DataType::Utf8, false),
                    Field::new("created_at", DataType::Utf8, false),
                    Field::new("terminated_at", DataType::Utf8, false),
                    Field::new("realized", DataType::Utf8, false),
                ]))
            })
            .clone()
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        let mut esito = Vec::with_capacity(rows.len());
        let mut sospensione_json = Vec::with_capacity(rows.len());
        let mut participants_json = Vec::with_capacity(rows.len());
        let mut terminated_at = Vec::with_capacity(rows.len());
        let mut realized = Vec::with_capacity(rows.len());

        for row in rows {
            esito.push(row.outcome.as_str().to_string());
            sospensione_json.push(serde_json::to_string(&row.probation_detail)?);
            participants_json.push(serde_json::to_string(&row.participants)?);
            terminated_at.push(row.terminated_at.clone().unwrap_or_default());
            realized.push(match row.realized {
                Some(true) => "true".to_string(),
                Some(false) => "false".to_string(),
                None => String::new(),
            });
        }

        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.id.as_str()))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.owner_id.as_str()))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.subject.as_str()))),
            Arc::new(StringArray::from_iter_values(esito.iter().map(String::as_str))),
            Arc::new(StringArray::from_iter_values(sospensione_json.iter().map(String::as_str))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.invite_code.as_str()))),
            Arc::new(StringArray::from_iter_values(participants_json.iter().map(String::as_str))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.created_at.as_str()))),
            Arc::new(StringArray::from_iter_values(terminated_at.iter().map(String::as_str))),
            Arc::new(StringArray::from_iter_values(realized.iter().map(String::as_str))),
        ];

        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }

    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let id = codec::string_column(batch, "id")?;
        let owner_id = codec::string_column(batch, "owner_id")?;
        let subject = codec::string_column(batch, "subject")?;
        let esito = codec::string_column(batch, "esito")?;
        let sospensione_json = codec::string_column(batch, "sospensione_json")?;
        let invite_code = codec::string_column(batch, "invite_code")?;
        let participants_json = codec::string_column(batch, "participants_json")?;
        let created_at = codec::string_column(batch, "created_at")?;
        let terminated_at = codec::string_column(batch, "terminated_at")?;
        let realized = codec::string_column(batch, "realized")?;

        let mut rows = Vec::with_capacity(batch.num_rows());
        for i in 0..batch.num_rows() {
            // Rows written before the outcome column stabilized may hold an
            // unknown value; they read back as the default outcome.
            let outcome = Outcome::parse(esito.value(i)).unwrap_or(Outcome::Admission);

            let probation_detail = match sospensione_json.value(i) {
                "" => Vec::new(),
                json => serde_json::from_str(json)?,
            };
            let participants = match participants_json.value(i) {
                "" => Vec::new(),
                json => serde_json::from_str(json)?,
            };

            rows.push(BetRow {
                id: id.value(i).to_string(),
                owner_id: owner_id.value(i).to_string(),
                subject: subject.value(i).to_string(),
                outcome,
                probation_detail,
                invite_code: invite_code.value(i).to_string(),
                participants,
                created_at: created_at.value(i).to_string(),
                terminated_at: match terminated_at.value(i) {
                    "" => None,
                    ts => Some(ts.to_string()),
                },
                realized: match realized.value(i) {
                    "true" => Some(true),
                    "false" => Some(false),
                    _ => None,
                },
            });
        }

        Ok(rows)
    }
}
