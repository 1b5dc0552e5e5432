//! Operations over the decoded row sets.
//!
//! Each handler wraps the [`TableRepository`](crate::store::repository::TableRepository)
//! and performs one read-mutate-write cycle per operation. Nothing is held
//! across operations; every call starts from a fresh table read.

pub mod bets;
pub mod users;

pub use bets::Bets;
pub use users::Users;
