//! Entity re-exports.

pub use super::chat_turns::Entity as ChatTurns;
pub use super::tax_summaries::Entity as TaxSummaries;
pub use super::transactions::Entity as Transactions;
pub use super::uploads::Entity as Uploads;
pub use super::users::Entity as Users;
