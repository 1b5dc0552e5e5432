//! Row models matching the table schemas.

pub mod bets;
pub mod users;
