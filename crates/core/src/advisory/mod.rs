//! Tax optimization tips.
//!
//! Tips come from a text-only generation call. The generator never fails:
//! anything other than at least five usable tips yields [`FALLBACK_TIPS`].

use std::sync::Arc;

use cognitax_shared::types::format_rupees;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::decoder::decode_json_payload;
use crate::extraction::DocumentExtractor;
use crate::tax::TaxComputation;

/// Number of tips returned.
pub const TIP_COUNT: usize = 5;

/// Tips used whenever generation fails.
pub const FALLBACK_TIPS: [&str; TIP_COUNT] = [
    "Maintain proper GST invoices for all transactions",
    "Claim deductions under Section 80C",
    "Consider tax-saving investments",
    "Keep records of business expenses",
    "File returns on time to avoid penalties",
];

const SYSTEM_INSTRUCTION: &str = "You are an Indian tax expert providing optimization advice.";

/// Exactly five tips.
pub type Tips = [String; TIP_COUNT];

/// Figures the tips are based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvisoryContext {
    /// Sum of credits.
    pub total_income: Decimal,
    /// Sum of debits.
    pub total_expenses: Decimal,
    /// Estimated turnover.
    pub estimated_turnover: Decimal,
}

impl From<&TaxComputation> for AdvisoryContext {
    fn from(tax: &TaxComputation) -> Self {
        Self {
            total_income: tax.total_income,
            total_expenses: tax.total_expenses,
            estimated_turnover: tax.estimated_turnover,
        }
    }
}

/// Returns the fallback tips.
#[must_use]
pub fn fallback_tips() -> Tips {
    FALLBACK_TIPS.map(String::from)
}

/// Builds the prompt for a context.
#[must_use]
pub fn build_prompt(ctx: &AdvisoryContext) -> String {
    format!(
        "Based on this financial data:\n\
         - Total Income: {}\n\
         - Total Expenses: {}\n\
         - Estimated Turnover: {}\n\n\
         Provide exactly 5 practical tax optimization tips for Indian businesses. \
         Return as JSON array of strings.\n\
         Example: [\"Tip 1\", \"Tip 2\", \"Tip 3\", \"Tip 4\", \"Tip 5\"]",
        format_rupees(ctx.total_income),
        format_rupees(ctx.total_expenses),
        format_rupees(ctx.estimated_turnover),
    )
}

/// Picks the first five non-blank tips, or `None` if there are fewer.
fn select_tips(candidates: Vec<String>) -> Option<Tips> {
    let usable: Vec<String> = candidates
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .take(TIP_COUNT)
        .collect();
    Tips::try_from(usable).ok()
}

/// Generates advisory tips through a [`DocumentExtractor`].
#[derive(Debug)]
pub struct AdvisoryGenerator<E: DocumentExtractor> {
    extractor: Arc<E>,
}

impl<E: DocumentExtractor> Clone for AdvisoryGenerator<E> {
    fn clone(&self) -> Self {
        Self {
            extractor: Arc::clone(&self.extractor),
        }
    }
}

impl<E: DocumentExtractor> AdvisoryGenerator<E> {
    /// Create a new generator.
    #[must_use]
    pub const fn new(extractor: Arc<E>) -> Self {
        Self { extractor }
    }

    /// Returns exactly five tips for the context, falling back on any failure.
    pub async fn advise(&self, ctx: &AdvisoryContext) -> Tips {
        let prompt = build_prompt(ctx);

        let raw = match self
            .extractor
            .generate(&prompt, None, Some(SYSTEM_INSTRUCTION))
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(stage = "advisory", error = %e, "Tip generation failed, using fallback tips");
                return fallback_tips();
            }
        };

        match decode_json_payload::<Vec<String>>(&raw) {
            Ok(candidates) => select_tips(candidates).unwrap_or_else(|| {
                warn!(stage = "advisory", "Fewer than five usable tips, using fallback tips");
                fallback_tips()
            }),
            Err(e) => {
                warn!(stage = "advisory", error = %e, "Tip response not decodable, using fallback tips");
                debug!(response = %raw, "Undecodable tip response");
                fallback_tips()
            }
        }
    }
}
