use async_trait::async_trait;
use axum::Router;

pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// A schema change applied at most once, keyed by `id`.
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// A unit of the service: routes mounted at `/{name}`, an OpenAPI
/// fragment, migrations and lifecycle hooks.
///
/// Hooks run as `init`, then pending migrations, then `start`; `stop` runs
/// in reverse registration order once the server has drained.
#[async_trait]
pub trait Module: Sync + Send {
    fn name(&self) -> &'static str;

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
    }

    /// Paths relative to the mount point plus `components.schemas`
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
