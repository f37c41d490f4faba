//! PostgreSQL connection handle and migration runner.
//!
//! A [`Database`] is created once at startup, shared by cloning its pool
//! into repositories, and released with [`Database::close`] on shutdown.

use bookstore_kernel::settings::{redact_url, Settings};
use bookstore_kernel::Migration;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("migration {module}/{id} failed: {source}")]
    Migration {
        module: String,
        id: &'static str,
        #[source]
        source: sqlx::Error,
    },
    #[error(transparent)]
    SqlX(#[from] sqlx::Error),
}

pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Open a pool against the URL resolved for the configured environment.
    pub async fn connect(settings: &Settings) -> Result<Self, DbError> {
        let url = settings.database_url();
        tracing::info!(
            target: "bookstore-db",
            url = %redact_url(&url),
            max_connections = settings.database.max_connections,
            "connecting to database"
        );

        let pool = PgPoolOptions::new()
            .max_connections(settings.database.max_connections)
            .connect(&url)
            .await
            .map_err(|source| DbError::Connect {
                url: redact_url(&url),
                source,
            })?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply each `(module, migration)` pair that has not been recorded yet.
    /// Returns the number of migrations applied by this call.
    pub async fn run_migrations(&self, migrations: &[(String, Migration)]) -> Result<usize, DbError> {
        // language=postgresql
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                module     TEXT NOT NULL,
                id         TEXT NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                PRIMARY KEY (module, id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        let mut applied = 0;
        for (module, migration) in migrations {
            let mut tx = self.pool.begin().await?;

            // language=postgresql
            let recorded = sqlx::query_scalar::<_, i64>(
                r#"
                SELECT COUNT(*) FROM _migrations
                WHERE module = $1 AND id = $2
                "#,
            )
            .bind(module)
            .bind(migration.id)
            .fetch_one(&mut *tx)
            .await?;

            if recorded > 0 {
                tracing::debug!(target: "bookstore-db", %module, id = migration.id, "migration already applied");
                continue;
            }

            sqlx::raw_sql(migration.up)
                .execute(&mut *tx)
                .await
                .map_err(|source| DbError::Migration {
                    module: module.clone(),
                    id: migration.id,
                    source,
                })?;

            // language=postgresql
            sqlx::query(
                r#"
                INSERT INTO _migrations (module, id)
                VALUES ($1, $2)
                "#,
            )
            .bind(module)
            .bind(migration.id)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
            tracing::info!(target: "bookstore-db", %module, id = migration.id, "migration applied");
            applied += 1;
        }

        Ok(applied)
    }

    /// Wait for checked-out connections to return, then close the pool.
    pub async fn close(self) {
        tracing::info!(target: "bookstore-db", "closing database pool");
        self.pool.close().await;
    }
}
