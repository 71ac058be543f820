//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! [`UploadRepository`] and [`ChatTurnRepository`] implement the core crate's
//! repository traits; the others serve the read-only endpoints.

pub mod chat;
pub mod error;
pub mod tax_summary;
pub mod transaction;
pub mod upload;
pub mod user;

pub use chat::ChatTurnRepository;
pub use error::RepositoryError;
pub use tax_summary::{TAX_SUMMARY_LIST_LIMIT, TaxSummaryRepository};
pub use transaction::{TRANSACTION_LIST_LIMIT, TransactionRepository};
pub use upload::{UPLOAD_LIST_LIMIT, UploadRepository};
pub use user::UserRepository;
