//! Selected-city store.
//!
//! Memory is updated first, then the value is written through to the
//! persistence port. Every `set_city`/`clear` bumps a revision counter; the
//! startup load only applies its result when the revision it started from is
//! still current, so a slow load can never overwrite a newer user choice.

use crate::core::{City, KeyValueStore, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

pub const DEFAULT_CITY_KEY: &str = "selected_city";

#[derive(Debug, Default)]
struct CityState {
    city: Option<City>,
    revision: u64,
}

pub struct CityStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
    state: Mutex<CityState>,
    changes: watch::Sender<Option<City>>,
    // Serializes write-through so the durable value follows issue order.
    write_lock: tokio::sync::Mutex<()>,
}

impl CityStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, DEFAULT_CITY_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            state: Mutex::new(CityState::default()),
            changes: watch::Sender::new(None),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CityState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Last known city; `None` until loaded or set.
    pub fn get_city(&self) -> Option<City> {
        self.lock().city.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<City>> {
        self.changes.subscribe()
    }

    /// Apply `city` in memory, then persist it. A persistence failure is
    /// returned but the in-memory value stays.
    pub async fn set_city(&self, city: City) -> Result<()> {
        let revision = {
            let mut state = self.lock();
            state.city = Some(city.clone());
            state.revision += 1;
            state.revision
        };
        self.changes.send_replace(Some(city.clone()));
        tracing::debug!(city = %city, revision, "city updated in memory");

        let _write = self.write_lock.lock().await;
        let superseded = self.lock().revision != revision;
        if superseded {
            tracing::debug!(city = %city, "skipping write-through, a newer change is pending");
            return Ok(());
        }

        if let Err(e) = self.store.set(&self.key, city.as_str()).await {
            tracing::warn!(city = %city, "failed to persist selected city: {}", e);
            return Err(e);
        }
        tracing::debug!(city = %city, "city persisted");
        Ok(())
    }

    /// Forget the selected city in memory and in storage.
    pub async fn clear(&self) -> Result<()> {
        let revision = {
            let mut state = self.lock();
            state.city = None;
            state.revision += 1;
            state.revision
        };
        self.changes.send_replace(None);

        let _write = self.write_lock.lock().await;
        let superseded = self.lock().revision != revision;
        if superseded {
            return Ok(());
        }
        if let Err(e) = self.store.remove(&self.key).await {
            tracing::warn!("failed to remove persisted city: {}", e);
            return Err(e);
        }
        Ok(())
    }

    /// Startup load. Returns the value in effect afterwards.
    pub async fn load(&self) -> Result<Option<City>> {
        let started_at = self.lock().revision;

        let raw = match self.store.get(&self.key).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("failed to load persisted city: {}", e);
                return Err(e);
            }
        };

        let loaded = raw.and_then(|value| match City::new(value) {
            Ok(city) => Some(city),
            Err(e) => {
                tracing::warn!("ignoring persisted city: {}", e);
                None
            }
        });

        let mut state = self.lock();
        if state.revision != started_at {
            tracing::debug!(
                loaded = ?loaded,
                current = ?state.city,
                "discarding superseded city load"
            );
            return Ok(state.city.clone());
        }

        if let Some(city) = loaded {
            tracing::info!(city = %city, "restored selected city");
            state.city = Some(city.clone());
            self.changes.send_replace(Some(city));
        }
        Ok(state.city.clone())
    }
}
