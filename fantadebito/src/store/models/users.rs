//! Row model for the `users` table.

use crate::store::codec::{self, TableRow};
use crate::store::errors::Result;
use arrow::array::{ArrayRef, BooleanArray, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;
use std::sync::OnceLock;

/// One row of the `users` table.
///
/// `password` holds the credential token (or a legacy plain-text value, see
/// [`crate::auth::password`]). `wins`/`losses` never go negative.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub wins: i32,
    pub losses: i32,
    pub is_admin: bool,
}

static SCHEMA: OnceLock<SchemaRef> = OnceLock::new();

impl TableRow for UserRow {
    const TABLE_NAME: &'static str = "users";

    fn schema() -> SchemaRef {
        SCHEMA
            .get_or_init(|| {
                Arc::new(Schema::new(vec![
                    Field::new("id", DataType::Utf8, false),
                    Field::new("username", DataType::Utf8, false),
                    Field::new("password", DataType::Utf8, false),
                    Field::new("wins", DataType::Int32, false),
                    Field::new("losses", DataType::Int32, false),
                    Field::new("is_admin", DataType::Boolean, false),
                ]))
            })
            .clone()
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.id.as_str()))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.username.as_str()))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.password.as_str()))),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.wins))),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.losses))),
            Arc::new(BooleanArray::from_iter(rows.iter().map(|r| Some(r.is_admin)))),
        ];

        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }

    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let id = codec::string_column(batch, "id")?;
        let username = codec::string_column(batch, "username")?;
        let password = codec::string_column(batch, "password")?;
        let wins = codec::int32_column(batch, "wins")?;
        let losses = codec::int32_column(batch, "losses")?;
        let is_admin = codec::bool_column(batch, "is_admin")?;

        let mut rows = Vec::with_capacity(batch.num_rows());
        for i in 0..batch.num_rows() {
            rows.push(UserRow {
                id: id.value(i).to_string(),
                username: username.value(i).to_string(),
                password: password.value(i).to_string(),
                wins: wins.value(i),
                losses: losses.value(i),
                is_admin: is_admin.value(i),
            });
        }

        Ok(rows)
    }
}

impl UserRow {
    /// Fresh account: zeroed counters, no admin flag.
    pub fn new(id: String, username: String, password: String) -> Self {
        Self {
            id,
            username,
            password,
            wins: 0,
            losses: 0,
            is_admin: false,
        }
    }
}
