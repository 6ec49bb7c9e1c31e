//! Versioned schema for the price store.

use ::duckdb::{params, Connection};
use tracing::debug;

struct Migration {
    version: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "0001_price_tables",
        sql: r#"
CREATE SEQUENCE IF NOT EXISTS companies_id_seq START 1;

CREATE TABLE IF NOT EXISTS companies (
    id BIGINT PRIMARY KEY DEFAULT nextval('companies_id_seq'),
    name TEXT NOT NULL UNIQUE,
    symbol TEXT NOT NULL UNIQUE,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS ohlc_data (
    symbol TEXT NOT NULL,
    date DATE NOT NULL,
    open DECIMAL(10,2) NOT NULL,
    high DECIMAL(10,2) NOT NULL,
    low DECIMAL(10,2) NOT NULL,
    close DECIMAL(10,2) NOT NULL,
    volume BIGINT NOT NULL DEFAULT 0,
    file_source TEXT,
    ingest_run TEXT NOT NULL,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY(symbol, date)
);

CREATE TABLE IF NOT EXISTS ingest_log (
    run_id TEXT NOT NULL,
    symbol TEXT NOT NULL,
    file_source TEXT,
    status TEXT NOT NULL,
    row_count BIGINT NOT NULL,
    timestamp TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#,
    },
    Migration {
        version: "0002_ingest_log_index",
        sql: r#"
CREATE INDEX IF NOT EXISTS idx_ingest_log_symbol_ts ON ingest_log(symbol, timestamp);
"#,
    },
];

/// Apply every migration not yet recorded in `schema_migrations`.
pub fn apply_migrations(connection: &Connection) -> Result<(), ::duckdb::Error> {
    connection.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#,
    )?;

    for migration in MIGRATIONS {
        let applied: i64 = connection.query_row(
            "SELECT COUNT(*) FROM schema_migrations WHERE version = ?",
            params![migration.version],
            |row| row.get(0),
        )?;
        if applied > 0 {
            continue;
        }

        debug!(version = migration.version, "applying migration");
        connection.execute_batch(migration.sql)?;
        connection.execute(
            "INSERT INTO schema_migrations (version) VALUES (?)",
            params![migration.version],
        )?;
    }

    Ok(())
}
