//! Transaction record types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use cognitax_shared::types::{TransactionId, UploadId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Categories the extraction prompt asks for. Other values are kept as-is.
pub const RECOMMENDED_CATEGORIES: [&str; 12] = [
    "Sales",
    "Bills",
    "Rent",
    "Salary",
    "Transfer",
    "Shopping",
    "Food",
    "Transport",
    "Medical",
    "Entertainment",
    "Investment",
    "Other",
];

/// Payment modes the extraction prompt asks for. Other values are kept as-is.
pub const RECOMMENDED_PAYMENT_MODES: [&str; 9] = [
    "UPI", "NEFT", "IMPS", "RTGS", "Cash", "Cheque", "ATM", "Card", "Unknown",
];

/// Category used when the extracted one is blank.
pub const DEFAULT_CATEGORY: &str = "Other";

/// Payment mode used when the extracted one is blank.
pub const DEFAULT_PAYMENT_MODE: &str = "Unknown";

/// Money flow direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Money in.
    Credit,
    /// Money out.
    Debit,
}

impl Direction {
    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a direction string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transaction direction '{0}'")]
pub struct UnknownDirection(pub String);

impl FromStr for Direction {
    type Err = UnknownDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "credit" | "cr" => Ok(Self::Credit),
            "debit" | "dr" => Ok(Self::Debit),
            _ => Err(UnknownDirection(s.to_string())),
        }
    }
}

/// Returns the canonical spelling of `value` if it is one of `known`,
/// otherwise the trimmed value itself.
pub(crate) fn canonicalize(value: &str, known: &[&str]) -> String {
    let trimmed = value.trim();
    known
        .iter()
        .find(|k| k.eq_ignore_ascii_case(trimmed))
        .map_or_else(|| trimmed.to_string(), |k| (*k).to_string())
}

/// A validated transaction that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// Transaction date as printed on the statement.
    pub date: String,
    /// Narration.
    pub description: String,
    /// Non-negative amount.
    pub amount: Decimal,
    /// Credit or debit.
    pub direction: Direction,
    /// Spending category.
    pub category: String,
    /// Payment rail (UPI, NEFT, ...).
    pub payment_mode: String,
}

/// A stored transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction ID.
    pub id: TransactionId,
    /// Owning user.
    pub owner_id: UserId,
    /// Upload the transaction was extracted from.
    pub upload_id: UploadId,
    /// Transaction date as printed on the statement.
    pub date: String,
    /// Narration.
    pub description: String,
    /// Non-negative amount.
    pub amount: Decimal,
    /// Credit or debit.
    pub direction: Direction,
    /// Spending category.
    pub category: String,
    /// Payment rail.
    pub payment_mode: String,
    /// When the record was stored.
    pub created_at: DateTime<Utc>,
}

/// Anything with a direction and an amount can be fed to the tax estimator.
pub trait Taxable {
    /// Credit or debit.
    fn direction(&self) -> Direction;
    /// Non-negative amount.
    fn amount(&self) -> Decimal;
}

impl Taxable for NewTransaction {
    fn direction(&self) -> Direction {
        self.direction
    }

    fn amount(&self) -> Decimal {
        self.amount
    }
}

impl Taxable for Transaction {
    fn direction(&self) -> Direction {
        self.direction
    }

    fn amount(&self) -> Decimal {
        self.amount
    }
}
