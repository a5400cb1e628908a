//! Explicit application state handed to the presentation layer.

use crate::config::AppConfig;
use crate::core::auth::AuthStore;
use crate::core::cart::CartStore;
use crate::core::city::CityStore;
use crate::core::guard::{GuardDriver, NavigationGuard, RouteRules};
use crate::core::{AuthSnapshot, City, KeyValueStore, Result, Router, SessionResolver};
use std::sync::Arc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub city: Option<City>,
    pub auth: AuthSnapshot,
    /// Set when the persisted city could not be read; startup continues.
    pub city_error: Option<String>,
}

pub struct AppState {
    pub city: Arc<CityStore>,
    pub auth: Arc<AuthStore>,
    pub cart: Arc<CartStore>,
    rules: RouteRules,
    cart_route: String,
}

impl AppState {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        resolver: Arc<dyn SessionResolver>,
        config: &AppConfig,
    ) -> Result<Self> {
        Ok(Self {
            city: Arc::new(CityStore::with_key(store, config.storage.city_key.clone())),
            auth: Arc::new(AuthStore::new(resolver)),
            cart: Arc::new(CartStore::new()),
            rules: config.route_rules()?,
            cart_route: config.navigation.cart_route.clone(),
        })
    }

    pub fn rules(&self) -> &RouteRules {
        &self.rules
    }

    /// Load the saved city and resolve the session concurrently.
    pub async fn bootstrap(&self) -> BootstrapReport {
        let (city, auth) = tokio::join!(self.city.load(), self.auth.initialize());
        let (city, city_error) = match city {
            Ok(city) => (city, None),
            Err(e) => (self.city.get_city(), Some(e.to_string())),
        };
        tracing::info!(
            city = ?city,
            role = %auth.role,
            "application state ready"
        );
        BootstrapReport {
            city,
            auth,
            city_error,
        }
    }

    /// Navigation behind the cart summary's "view cart" action.
    pub fn view_cart(&self, router: &dyn Router) -> Result<()> {
        router.navigate_to(&self.cart_route)
    }

    /// Sign out and drop the cart contents of the finished session.
    pub async fn sign_out(&self) -> AuthSnapshot {
        let snapshot = self.auth.sign_out().await;
        self.cart.clear();
        snapshot
    }

    pub fn guard(&self) -> NavigationGuard {
        NavigationGuard::new(self.rules.clone())
    }

    pub fn guard_driver(&self, router: Arc<dyn Router>) -> GuardDriver {
        GuardDriver::new(self.rules.clone(), self.auth.subscribe(), router)
    }

    pub fn spawn_guard(&self, router: Arc<dyn Router>) -> JoinHandle<()> {
        tokio::spawn(self.guard_driver(router).run())
    }
}
