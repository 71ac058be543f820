//! `SeaORM` entity definitions.

pub mod prelude;

pub mod chat_turns;
pub mod tax_summaries;
pub mod transactions;
pub mod uploads;
pub mod users;
