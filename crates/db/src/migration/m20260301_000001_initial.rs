//! Initial database migration.
//!
//! Creates the users, uploads, transactions, tax summaries and chat turns
//! tables. Every row below `users` carries its owner's `user_id`.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(UPLOADS_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(TAX_SUMMARIES_SQL).await?;
        db.execute_unprepared(CHAT_TURNS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const USERS_SQL: &str = r"
CREATE TABLE users (
    id              UUID PRIMARY KEY,
    email           VARCHAR(255) NOT NULL UNIQUE,
    name            VARCHAR(255) NOT NULL,
    password_hash   TEXT NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const UPLOADS_SQL: &str = r"
CREATE TABLE uploads (
    id                  UUID PRIMARY KEY,
    user_id             UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    filename            TEXT NOT NULL,
    byte_size           BIGINT NOT NULL CHECK (byte_size > 0),
    bank_name           TEXT,
    statement_period    TEXT,
    status              VARCHAR(16) NOT NULL DEFAULT 'processing'
        CHECK (status IN ('processing', 'completed', 'failed')),
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_uploads_user_created ON uploads(user_id, created_at DESC);

-- Reconciliation sweep scans only in-flight uploads
CREATE INDEX idx_uploads_processing ON uploads(created_at) WHERE status = 'processing';
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id                  UUID PRIMARY KEY,
    user_id             UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    upload_id           UUID NOT NULL REFERENCES uploads(id) ON DELETE CASCADE,
    transaction_date    TEXT NOT NULL,
    description         TEXT NOT NULL,
    amount              NUMERIC NOT NULL CHECK (amount >= 0),
    direction           VARCHAR(8) NOT NULL CHECK (direction IN ('credit', 'debit')),
    category            TEXT NOT NULL,
    payment_mode        TEXT NOT NULL,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_transactions_user ON transactions(user_id, created_at);
CREATE INDEX idx_transactions_upload ON transactions(upload_id);
";

const TAX_SUMMARIES_SQL: &str = r"
CREATE TABLE tax_summaries (
    id                  UUID PRIMARY KEY,
    user_id             UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    upload_id           UUID NOT NULL UNIQUE REFERENCES uploads(id) ON DELETE CASCADE,
    total_income        NUMERIC NOT NULL,
    total_expenses      NUMERIC NOT NULL,
    estimated_turnover  NUMERIC NOT NULL,
    gst_amount          NUMERIC NOT NULL CHECK (gst_amount >= 0),
    itr_amount          NUMERIC NOT NULL CHECK (itr_amount >= 0),
    tds_amount          NUMERIC NOT NULL CHECK (tds_amount >= 0),
    optimization_tips   JSONB NOT NULL
        CHECK (jsonb_typeof(optimization_tips) = 'array'
               AND jsonb_array_length(optimization_tips) = 5),
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_tax_summaries_user_created ON tax_summaries(user_id, created_at DESC);
";

const CHAT_TURNS_SQL: &str = r"
CREATE TABLE chat_turns (
    id              UUID PRIMARY KEY,
    user_id         UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    session_id      TEXT NOT NULL,
    role            VARCHAR(16) NOT NULL CHECK (role IN ('user', 'assistant')),
    message         TEXT NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_chat_turns_session ON chat_turns(user_id, session_id, created_at);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS chat_turns;
DROP TABLE IF EXISTS tax_summaries;
DROP TABLE IF EXISTS transactions;
DROP TABLE IF EXISTS uploads;
DROP TABLE IF EXISTS users;
";
