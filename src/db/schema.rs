//! Schema bootstrap, applied on startup

use sqlx::PgPool;

use crate::error::Result;

pub const BASE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS programs (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    destination_city TEXT NOT NULL DEFAULT '',
    start_date DATE,
    end_date DATE,
    active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS program_quote_snapshots (
    id UUID PRIMARY KEY,
    program_id UUID NOT NULL REFERENCES programs(id) ON DELETE CASCADE,
    label TEXT NOT NULL,
    destination_city TEXT NOT NULL DEFAULT '',
    date_range TEXT NOT NULL DEFAULT '',
    input_state JSONB NOT NULL,
    single_price NUMERIC(14, 2) NOT NULL,
    double_price NUMERIC(14, 2) NOT NULL,
    summary TEXT NOT NULL DEFAULT '',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_program_quote_snapshots_program
    ON program_quote_snapshots (program_id, created_at DESC);
"#;

/// Create tables and indexes that do not exist yet
pub async fn apply(pool: &PgPool) -> Result<()> {
    sqlx::raw_sql(BASE_SCHEMA).execute(pool).await?;
    Ok(())
}
