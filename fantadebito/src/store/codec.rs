//! Parquet encode/decode of fixed-schema row sets.
//!
//! Each table type implements [`TableRow`]; the whole row set is materialized
//! as a single `RecordBatch` and written as one Parquet buffer. Decoding reads
//! every batch back into memory - there is no streaming path, and re-decoding
//! the same buffer always yields the same rows in the same order.

use crate::store::errors::{Result, StoreError};
use arrow::array::{Array, BooleanArray, Int32Array, StringArray};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

/// A row of a logical table with a fixed columnar schema.
pub trait TableRow: Sized + Send + Sync {
    /// Logical table name; the object key is derived from it
    const TABLE_NAME: &'static str;

    /// The fixed Arrow schema of the table
    fn schema() -> SchemaRef;

    /// Build one batch holding the full row set
    fn to_batch(rows: &[Self]) -> Result<RecordBatch>;

    /// Read all rows out of one batch
    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>>;
}

/// Encode the full row set as a Parquet buffer. Zero rows produce a valid
/// empty-table buffer that still carries the schema.
pub fn encode<T: TableRow>(rows: &[T]) -> Result<Vec<u8>> {
    let batch = T::to_batch(rows)?;

    let mut buf = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buf, T::schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(buf)
}

/// Decode every row in the buffer.
pub fn decode<T: TableRow>(bytes: &[u8]) -> Result<Vec<T>> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(Bytes::copy_from_slice(bytes))?.build()?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch?;
        rows.extend(T::from_batch(&batch)?);
    }

    Ok(rows)
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a dyn Array> {
    batch
        .column_by_name(name)
        .map(|c| c.as_ref())
        .ok_or_else(|| StoreError::Codec {
            message: format!("missing column '{name}'"),
        })
}

pub(crate) fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    column(batch, name)?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| StoreError::Codec {
            message: format!("column '{name}' is not Utf8"),
        })
}

pub(crate) fn int32_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Int32Array> {
    column(batch, name)?
        .as_any()
        .downcast_ref::<Int32Array>()
        .ok_or_else(|| StoreError::Codec {
            message: format!("column '{name}' is not Int32"),
        })
}

pub(crate) fn bool_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a BooleanArray> {
    column(batch, name)?
        .as_any()
        .downcast_ref::<BooleanArray>()
        .ok_or_else(|| StoreError::Codec {
            message: format!("column '{name}' is not Boolean"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::users::UserRow;

    fn sample_rows() -> Vec<UserRow> {
        vec![
            UserRow {
                id: "1".to_string(),
                username: "demo".to_string(),
                password: "demo".to_string(),
                wins: 3,
                losses: 1,
                is_admin: true,
            },
            UserRow {
                id: "2".to_string(),
                username: "mn".to_string(),
                password: "pbkdf2$310000$aa$bb".to_string(),
                wins: 0,
                losses: 0,
                is_admin: false,
            },
        ]
    }

    #[test]
    fn test_round_trip() {
        let rows = sample_rows();
        let bytes = encode(&rows).unwrap();
        let decoded: Vec<UserRow> = decode(&bytes).unwrap();
        assert_eq!(decoded, rows);
    }

    #[test]
    fn test_decode_is_restartable() {
        let rows = sample_rows();
        let bytes = encode(&rows).unwrap();

        let first: Vec<UserRow> = decode(&bytes).unwrap();
        let second: Vec<UserRow> = decode(&bytes).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_table_round_trip() {
        let bytes = encode::<UserRow>(&[]).unwrap();
        assert!(!bytes.is_empty());

        let decoded: Vec<UserRow> = decode(&bytes).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_decode_garbage_fails_with_codec_error() {
        let result = decode::<UserRow>(b"not a parquet file");
        assert!(matches!(result, Err(StoreError::Codec { .. })));
    }

    #[test]
    fn test_decode_wrong_schema_fails() {
        use crate::store::models::bets::BetRow;

        let bytes = encode::<UserRow>(&sample_rows()).unwrap();
        let result = decode::<BetRow>(&bytes);
        assert!(result.is_err());
    }
}
