//! Application bootstrap: database, modules, HTTP server, shutdown.

use std::sync::Arc;

use anyhow::Context;
use bookstore_db::Database;
use bookstore_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules::{self, books::repository::PgBookRepository, books::routes::SharedRepository};

/// Registry holding every module, with books served from `repository`.
pub fn registry(repository: SharedRepository) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, repository);
    registry
}

fn postgres_registry(db: &Database) -> ModuleRegistry {
    registry(Arc::new(PgBookRepository::new(db.pool().clone())))
}

async fn apply_migrations(db: &Database, registry: &ModuleRegistry) -> anyhow::Result<usize> {
    let migrations = registry.collect_migrations();
    let applied = db
        .run_migrations(&migrations)
        .await
        .context("failed to apply migrations")?;
    tracing::info!(applied, total = migrations.len(), "migrations complete");
    Ok(applied)
}

/// Run the service until a shutdown signal arrives. Modules are stopped and
/// the pool is closed even when the server exits with an error.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    tracing::info!(env = %settings.environment, "bookstore bootstrap starting");

    let db = Database::connect(settings)
        .await
        .context("failed to connect to database")?;
    let registry = postgres_registry(&db);
    let ctx = InitCtx { settings };

    let started = async {
        registry.init_modules(&ctx).await?;
        if settings.database.run_migrations {
            apply_migrations(&db, &registry).await?;
        }
        registry.start_modules(&ctx).await
    }
    .await;

    let served = match started {
        Ok(()) => bookstore_http::start_server(&registry, settings).await,
        Err(err) => Err(err),
    };

    let stopped = registry.stop_modules().await;
    db.close().await;

    served?;
    stopped?;
    tracing::info!("bookstore shut down cleanly");
    Ok(())
}

/// Apply pending migrations and exit.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let db = Database::connect(settings)
        .await
        .context("failed to connect to database")?;
    let applied = apply_migrations(&db, &postgres_registry(&db)).await;
    db.close().await;
    applied
}
