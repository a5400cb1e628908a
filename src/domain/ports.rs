use crate::domain::model::{CatalogService, Session};
use crate::utils::error::Result;
use async_trait::async_trait;
use tokio::sync::watch;

/// Async key/value persistence. Failures are reported, never fatal.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

/// Session-check collaborator (network or local credential check).
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve_session(&self) -> Result<Session>;

    /// Cleanup run on sign-out before the store settles on `Unauthenticated`.
    async fn end_session(&self) -> Result<()>;
}

/// Routing collaborator: current top-level segment and navigation.
pub trait Router: Send + Sync {
    fn current_route(&self) -> String;
    fn navigate_to(&self, route: &str) -> Result<()>;
    fn subscribe(&self) -> watch::Receiver<String>;
}

/// Supplies service listings for a category.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_services(&self, category: &str) -> Result<Vec<CatalogService>>;
}
