//! Bank statement transactions.
//!
//! Categories and payment modes are open strings: values from the recommended
//! sets are normalised to their canonical spelling, anything else is kept.

mod types;
mod validation;

pub use types::{
    DEFAULT_CATEGORY, DEFAULT_PAYMENT_MODE, Direction, NewTransaction, RECOMMENDED_CATEGORIES,
    RECOMMENDED_PAYMENT_MODES, Taxable, Transaction, UnknownDirection,
};
pub use validation::{EntryError, ExtractedStatement, MAX_TRANSACTION_AMOUNT, validate_entry};
