//! Versioned schema migrations for the SQLite backend.
//!
//! Applied once at startup against a `schema_version` table. Schema changes
//! belong here as new entries, never as conditional DDL inside request
//! handlers.

use sqlx::SqlitePool;

pub struct Migration {
    pub version: i64,
    pub comment: &'static str,
    pub statements: &'static [&'static str],
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        comment: "initial schema: stores, categories, items",
        statements: &[
            "CREATE TABLE stores (
                key  TEXT PRIMARY KEY,
                name TEXT NOT NULL DEFAULT ''
            )",
            "CREATE TABLE categories (
                store_key  TEXT NOT NULL REFERENCES stores(key) ON DELETE CASCADE,
                key        TEXT NOT NULL,
                label      TEXT NOT NULL DEFAULT '',
                sort_order INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (store_key, key)
            )",
            // Stock columns are TEXT on purpose: a malformed value must
            // degrade per-record at read time, not fail the whole scan.
            "CREATE TABLE items (
                id            TEXT PRIMARY KEY,
                store_key     TEXT NOT NULL REFERENCES stores(key) ON DELETE CASCADE,
                category_key  TEXT NOT NULL,
                name          TEXT NOT NULL,
                current_stock TEXT NOT NULL DEFAULT '0',
                min_stock     TEXT NOT NULL DEFAULT '0',
                unit          TEXT NOT NULL DEFAULT '',
                price         TEXT NOT NULL DEFAULT '',
                vendor        TEXT NOT NULL DEFAULT '',
                storage       TEXT NOT NULL DEFAULT '',
                origin        TEXT NOT NULL DEFAULT '',
                updated_at    TEXT NOT NULL,
                UNIQUE (store_key, category_key, name)
            )",
            "CREATE INDEX idx_items_store ON items (store_key)",
        ],
    },
    Migration {
        version: 2,
        comment: "purchasing hints on items",
        statements: &[
            "ALTER TABLE items ADD COLUMN buy_link TEXT NOT NULL DEFAULT ''",
            "ALTER TABLE items ADD COLUMN memo TEXT NOT NULL DEFAULT ''",
        ],
    },
];

/// Bring the database up to the latest version. Safe to call on every start.
pub async fn apply_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            comment    TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    let current: Option<i64> = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await?;
    let current = current.unwrap_or(0);

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        let mut tx = pool.begin().await?;
        for statement in migration.statements {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        sqlx::query("INSERT INTO schema_version (version, comment, applied_at) VALUES (?, ?, ?)")
            .bind(migration.version)
            .bind(migration.comment)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::info!(
            version = migration.version,
            comment = migration.comment,
            "applied schema migration"
        );
    }

    Ok(())
}
