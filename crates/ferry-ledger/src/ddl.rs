//! Ledger table definitions.
//!
//! The `(version, direction)` uniqueness and the "unprocessed records are
//! neither succeeded nor failed" rule are enforced by the table itself, not
//! only by the code that writes it.

use ferry_core::VersionOrder;

/// DuckDB: surrogate ids come from a sequence.
pub(crate) const DUCKDB_SCHEMA: &str = "
CREATE SEQUENCE IF NOT EXISTS schema_migrations_id_seq START 1;
CREATE TABLE IF NOT EXISTS schema_migrations (
    id                BIGINT PRIMARY KEY DEFAULT nextval('schema_migrations_id_seq'),
    version           BIGINT NOT NULL CHECK (version >= 0),
    description       VARCHAR NOT NULL,
    direction         VARCHAR NOT NULL CHECK (direction IN ('UPGRADE', 'DOWNGRADE')),
    source_path       VARCHAR NOT NULL,
    content           VARCHAR NOT NULL,
    fingerprint       VARCHAR NOT NULL,
    execution_seconds BIGINT NOT NULL DEFAULT 0 CHECK (execution_seconds >= 0),
    processed         BOOLEAN NOT NULL DEFAULT FALSE,
    succeeded         BOOLEAN NOT NULL DEFAULT FALSE,
    error_message     VARCHAR,
    created_at        TIMESTAMP NOT NULL DEFAULT now(),
    updated_at        TIMESTAMP NOT NULL DEFAULT now(),
    UNIQUE (version, direction),
    CHECK (processed OR (NOT succeeded AND error_message IS NULL))
);
";

/// PostgreSQL: surrogate ids come from BIGSERIAL.
pub(crate) const POSTGRES_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS schema_migrations (
    id                BIGSERIAL PRIMARY KEY,
    version           BIGINT NOT NULL CHECK (version >= 0),
    description       TEXT NOT NULL,
    direction         TEXT NOT NULL CHECK (direction IN ('UPGRADE', 'DOWNGRADE')),
    source_path       TEXT NOT NULL,
    content           TEXT NOT NULL,
    fingerprint       TEXT NOT NULL,
    execution_seconds BIGINT NOT NULL DEFAULT 0 CHECK (execution_seconds >= 0),
    processed         BOOLEAN NOT NULL DEFAULT FALSE,
    succeeded         BOOLEAN NOT NULL DEFAULT FALSE,
    error_message     TEXT,
    created_at        TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at        TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT schema_migrations_version_direction_key UNIQUE (version, direction),
    CONSTRAINT schema_migrations_outcome_check
        CHECK (processed OR (NOT succeeded AND error_message IS NULL))
);
CREATE INDEX IF NOT EXISTS schema_migrations_source_path_idx
    ON schema_migrations (source_path);
";

/// Id of the successfully applied upgrade that defines the current version.
///
/// `u` is the candidate upgrade; a succeeded downgrade of the same version
/// marks it as reverted. Yields no row when nothing qualifies.
pub(crate) fn current_version_id_query(order: VersionOrder) -> String {
    let order_by = match order {
        VersionOrder::Insertion => "u.id DESC",
        VersionOrder::Numeric => "u.version DESC, u.id DESC",
    };
    format!(
        "SELECT u.id FROM schema_migrations u \
         WHERE u.direction = 'UPGRADE' AND u.succeeded \
         AND NOT EXISTS (\
             SELECT 1 FROM schema_migrations d \
             WHERE d.direction = 'DOWNGRADE' AND d.version = u.version AND d.succeeded\
         ) \
         ORDER BY {order_by} LIMIT 1"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_version_query_ordering() {
        assert!(current_version_id_query(VersionOrder::Insertion).contains("ORDER BY u.id DESC"));
        assert!(current_version_id_query(VersionOrder::Numeric)
            .contains("ORDER BY u.version DESC, u.id DESC"));
    }
}
