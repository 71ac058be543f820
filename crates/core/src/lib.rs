//! Core business logic for Cognitax.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence is reached through repository traits implemented by the db crate,
//! and the document-understanding service through the [`extraction::DocumentExtractor`]
//! trait so both can be faked in tests.
//!
//! # Modules
//!
//! - `extraction` - Client for the external document-understanding service
//! - `decoder` - Pulls JSON payloads out of free-form model output
//! - `statement` - Transaction records and their validation
//! - `tax` - Table-driven tax estimation
//! - `advisory` - Tax optimization tips with a fixed fallback
//! - `ingestion` - Upload lifecycle and the statement ingestion pipeline
//! - `staging` - Scoped storage for uploaded documents
//! - `analytics` - Cash-flow summaries over stored transactions
//! - `chat` - Tax assistant conversations
//! - `auth` - Password hashing and email normalisation

pub mod advisory;
pub mod analytics;
pub mod auth;
pub mod chat;
pub mod decoder;
pub mod extraction;
pub mod ingestion;
pub mod staging;
pub mod statement;
pub mod tax;
