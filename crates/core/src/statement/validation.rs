//! Validation of extracted statement entries.

use cognitax_shared::types::parse_amount;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::types::{
    DEFAULT_CATEGORY, DEFAULT_PAYMENT_MODE, Direction, NewTransaction, RECOMMENDED_CATEGORIES,
    RECOMMENDED_PAYMENT_MODES, canonicalize,
};

/// Largest single amount accepted, ₹10^15.
///
/// Far beyond any real statement line, and low enough that millions of
/// entries still total well inside the `Decimal` range.
pub const MAX_TRANSACTION_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Statement as returned by the extraction step.
///
/// Entries stay untyped here so each one can be validated on its own.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractedStatement {
    /// Issuing bank, when the model could tell.
    #[serde(default)]
    pub bank_name: Option<String>,
    /// Statement period, when the model could tell.
    #[serde(default)]
    pub statement_period: Option<String>,
    /// Raw transaction entries.
    pub transactions: Vec<Value>,
}

/// Why a single entry was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    /// The entry is not a JSON object.
    #[error("entry is not an object")]
    NotAnObject,

    /// A required field is absent or null.
    #[error("missing field '{0}'")]
    Missing(&'static str),

    /// A field is present but unusable.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Field name.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

fn required<'a>(entry: &'a Map<String, Value>, field: &'static str) -> Result<&'a Value, EntryError> {
    match entry.get(field) {
        None | Some(Value::Null) => Err(EntryError::Missing(field)),
        Some(value) => Ok(value),
    }
}

fn required_text(entry: &Map<String, Value>, field: &'static str) -> Result<String, EntryError> {
    match required(entry, field)? {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(EntryError::Invalid {
            field,
            reason: format!("expected text, got {other}"),
        }),
    }
}

fn non_blank(value: String, field: &'static str) -> Result<String, EntryError> {
    if value.is_empty() {
        Err(EntryError::Invalid {
            field,
            reason: "must not be blank".to_string(),
        })
    } else {
        Ok(value)
    }
}

/// Validates one extracted entry and coerces it into a [`NewTransaction`].
///
/// Direction is read from `transaction_type`, falling back to `direction`.
/// Amounts are coerced to their absolute value; the direction carries the sign.
/// Blank categories and payment modes fall back to `Other` and `Unknown`.
///
/// # Errors
///
/// Returns an [`EntryError`] naming the first offending field.
pub fn validate_entry(entry: &Value) -> Result<NewTransaction, EntryError> {
    let Value::Object(map) = entry else {
        return Err(EntryError::NotAnObject);
    };

    let date = non_blank(required_text(map, "date")?, "date")?;
    let description = non_blank(required_text(map, "description")?, "description")?;

    let raw_amount = required(map, "amount")?;
    let amount = parse_amount(raw_amount)
        .ok_or_else(|| EntryError::Invalid {
            field: "amount",
            reason: format!("'{raw_amount}' is not a number"),
        })?
        .abs();
    if amount > MAX_TRANSACTION_AMOUNT {
        return Err(EntryError::Invalid {
            field: "amount",
            reason: format!("{amount} exceeds the largest accepted amount"),
        });
    }

    let direction_field = if map.contains_key("transaction_type") {
        "transaction_type"
    } else {
        "direction"
    };
    let direction = required_text(map, direction_field)?
        .parse::<Direction>()
        .map_err(|e| EntryError::Invalid {
            field: "transaction_type",
            reason: e.to_string(),
        })?;

    let category = required_text(map, "category")?;
    let category = if category.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        canonicalize(&category, &RECOMMENDED_CATEGORIES)
    };

    let mode_field = if map.contains_key("mode") {
        "mode"
    } else {
        "payment_mode"
    };
    let payment_mode = required_text(map, mode_field)?;
    let payment_mode = if payment_mode.is_empty() {
        DEFAULT_PAYMENT_MODE.to_string()
    } else {
        canonicalize(&payment_mode, &RECOMMENDED_PAYMENT_MODES)
    };

    Ok(NewTransaction {
        date,
        description,
        amount,
        direction,
        category,
        payment_mode,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn entry() -> Value {
        json!({
            "date": "01/04/2025",
            "description": "UPI/CR/ACME TRADERS",
            "amount": "1,20,000.00",
            "transaction_type": "credit",
            "category": "sales",
            "mode": "upi"
        })
    }

    #[test]
    fn test_valid_entry() {
        let txn = validate_entry(&entry()).unwrap();
        assert_eq!(txn.date, "01/04/2025");
        assert_eq!(txn.amount, dec!(120000.00));
        assert_eq!(txn.direction, Direction::Credit);
        assert_eq!(txn.category, "Sales");
        assert_eq!(txn.payment_mode, "UPI");
    }

    #[test]
    fn test_negative_amount_is_coerced() {
        let mut value = entry();
        value["amount"] = json!(-450.5);
        value["transaction_type"] = json!("debit");
        let txn = validate_entry(&value).unwrap();
        assert_eq!(txn.amount, dec!(450.5));
        assert_eq!(txn.direction, Direction::Debit);
    }

    #[test]
    fn test_alternate_field_names() {
        let value = json!({
            "date": "2025-04-02",
            "description": "Rent",
            "amount": 25000,
            "direction": "DR",
            "category": "Rent",
            "payment_mode": "NEFT"
        });
        let txn = validate_entry(&value).unwrap();
        assert_eq!(txn.direction, Direction::Debit);
        assert_eq!(txn.payment_mode, "NEFT");
    }

    #[test]
    fn test_blank_category_and_mode_default() {
        let mut value = entry();
        value["category"] = json!("  ");
        value["mode"] = json!("");
        let txn = validate_entry(&value).unwrap();
        assert_eq!(txn.category, "Other");
        assert_eq!(txn.payment_mode, "Unknown");
    }

    #[rstest]
    #[case("date", EntryError::Missing("date"))]
    #[case("description", EntryError::Missing("description"))]
    #[case("amount", EntryError::Missing("amount"))]
    #[case("transaction_type", EntryError::Missing("direction"))]
    #[case("category", EntryError::Missing("category"))]
    #[case("mode", EntryError::Missing("payment_mode"))]
    fn test_missing_fields(#[case] field: &str, #[case] expected: EntryError) {
        let mut value = entry();
        value.as_object_mut().unwrap().remove(field);
        assert_eq!(validate_entry(&value), Err(expected));
    }

    #[test]
    fn test_null_field_is_missing() {
        let mut value = entry();
        value["date"] = Value::Null;
        assert_eq!(validate_entry(&value), Err(EntryError::Missing("date")));
    }

    #[test]
    fn test_unparseable_amount() {
        let mut value = entry();
        value["amount"] = json!("about 500");
        assert!(matches!(
            validate_entry(&value),
            Err(EntryError::Invalid { field: "amount", .. })
        ));
    }

    #[test]
    fn test_amount_cap() {
        assert_eq!(MAX_TRANSACTION_AMOUNT, dec!(1000000000000000));

        let mut value = entry();
        value["amount"] = json!("1000000000000000");
        assert_eq!(validate_entry(&value).unwrap().amount, MAX_TRANSACTION_AMOUNT);

        value["amount"] = json!("70000000000000000000000000000");
        assert!(matches!(
            validate_entry(&value),
            Err(EntryError::Invalid { field: "amount", .. })
        ));
    }

    #[test]
    fn test_unknown_direction() {
        let mut value = entry();
        value["transaction_type"] = json!("refund");
        assert!(matches!(
            validate_entry(&value),
            Err(EntryError::Invalid { field: "transaction_type", .. })
        ));
    }

    #[test]
    fn test_not_an_object() {
        assert_eq!(validate_entry(&json!("txn")), Err(EntryError::NotAnObject));
    }

    #[test]
    fn test_extracted_statement_metadata_optional() {
        let statement: ExtractedStatement =
            serde_json::from_value(json!({"transactions": []})).unwrap();
        assert!(statement.bank_name.is_none());
        assert!(statement.transactions.is_empty());
    }
}
