//! Staging area for uploaded statements using Apache OpenDAL.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               Apache OpenDAL                 │
//! ├──────────────────────────────────────────────┤
//! │ op.write("staging/{upload}/{file}", bytes)   │
//! │ op.read(key)            op.delete(key)       │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! `fs` is used in production, `memory` in tests.

mod error;
mod service;

pub use error::StagingError;
pub use service::{DocumentStaging, StagedDocument, StagingBackend};
