//! Generation prompts for statement extraction.

pub(super) const EXTRACTION_SYSTEM_INSTRUCTION: &str =
    "You are an expert at parsing Indian bank statements. Extract transaction data accurately.";

pub(super) const EXTRACTION_PROMPT: &str = r#"Analyze this Indian bank statement PDF and extract ALL transactions in JSON format.

For each transaction, provide:
- date (DD/MM/YYYY or DD-MMM-YYYY format)
- description (transaction narration)
- amount (numeric value)
- transaction_type ("credit" or "debit")
- category (classify as: Sales, Bills, Rent, Salary, Transfer, Shopping, Food, Transport, Medical, Entertainment, Investment, Other)
- mode (UPI, NEFT, IMPS, RTGS, Cash, Cheque, ATM, Card, or Unknown)

Also extract:
- bank_name
- statement_period (e.g., "Jan 2024 - Mar 2024")

Return ONLY valid JSON in this exact format:
{
  "bank_name": "string",
  "statement_period": "string",
  "transactions": [
    {
      "date": "string",
      "description": "string",
      "amount": number,
      "transaction_type": "credit" or "debit",
      "category": "string",
      "mode": "string"
    }
  ]
}"#;
