use crate::core::{CatalogService, CatalogSource, KeyValueStore, Role, Session, SessionResolver};
use crate::utils::error::{BookingError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.entries().clear();
        Ok(())
    }
}

/// Session resolver with a fixed answer. `None` simulates an unreachable
/// session backend.
#[derive(Debug)]
pub struct StaticSession {
    session: Option<Session>,
    ended: AtomicUsize,
}

impl StaticSession {
    pub fn new(role: Role) -> Self {
        Self {
            session: Some(Session::signed_in(role)),
            ended: AtomicUsize::new(0),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            session: None,
            ended: AtomicUsize::new(0),
        }
    }

    pub fn ended_count(&self) -> usize {
        self.ended.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionResolver for StaticSession {
    async fn resolve_session(&self) -> Result<Session> {
        self.session.ok_or_else(|| BookingError::SessionError {
            message: "session service unreachable".to_string(),
        })
    }

    async fn end_session(&self) -> Result<()> {
        self.ended.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Catalog backed by a fixed map of category to listings.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    categories: HashMap<String, Vec<CatalogService>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: &str, services: Vec<CatalogService>) -> Self {
        self.categories.insert(category.to_string(), services);
        self
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn fetch_services(&self, category: &str) -> Result<Vec<CatalogService>> {
        Ok(self.categories.get(category).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_get_set_clear() {
        let store = MemoryStore::new();
        assert_eq!(store.get("city").await.unwrap(), None);

        store.set("city", "Kolkata").await.unwrap();
        store.set("theme", "dark").await.unwrap();
        assert_eq!(store.get("city").await.unwrap().as_deref(), Some("Kolkata"));

        store.remove("theme").await.unwrap();
        assert_eq!(store.len(), 1);

        store.clear().await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_static_catalog_returns_listings_by_category() {
        let catalog = StaticCatalog::new().with_category(
            "appliance-repair",
            vec![CatalogService {
                id: "svc-1".to_string(),
                name: "AC Repair".to_string(),
                price: 499,
            }],
        );

        assert_eq!(catalog.fetch_services("appliance-repair").await.unwrap().len(), 1);
        assert!(catalog.fetch_services("salon").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_session_fails() {
        let resolver = StaticSession::unreachable();
        assert!(resolver.resolve_session().await.is_err());
        resolver.end_session().await.unwrap();
        assert_eq!(resolver.ended_count(), 1);
    }
}
