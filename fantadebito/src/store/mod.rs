//! Record store layered over object storage.
//!
//! There is no database server: every logical table is one binary columnar
//! object in a bucket, fetched whole, mutated in memory and overwritten
//! whole on every write.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │   Handlers   │  (store::handlers - ledger and bet lifecycle logic)
//! └──────┬───────┘
//!        │
//!        ↓
//! ┌──────────────┐
//! │  Repository  │  (store::repository - whole-table read/write)
//! └──────┬───────┘
//!        │
//!        ↓
//! ┌──────────────┐      ┌──────────────┐
//! │    Codec     │      │ Object store │
//! │ (Parquet ⇄   │ ───→ │ (S3 / local) │
//! │  row types)  │      └──────────────┘
//! └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: operations over the decoded row sets
//! - [`models`]: row structures matching the table schemas
//! - [`repository`]: generic whole-table read/write
//! - [`codec`]: Parquet encoding of fixed-schema row sets
//! - [`object`]: object-store backends
//! - [`errors`]: store-specific error types

pub mod codec;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod object;
pub mod repository;
