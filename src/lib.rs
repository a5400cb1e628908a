pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};
pub use config::AppConfig;

pub use crate::core::app::{AppState, BootstrapReport};
pub use crate::core::auth::AuthStore;
pub use crate::core::cart::CartStore;
pub use crate::core::city::CityStore;
pub use crate::core::guard::{
    evaluate, GuardAction, GuardDriver, GuardOutcome, GuardState, NavigationGuard, RouteRules,
};
pub use crate::domain::model::{
    AuthSnapshot, CartLineItem, CartSummary, CartTotals, CatalogService, City, Role, Session,
};
pub use crate::domain::ports::{CatalogSource, KeyValueStore, Router, SessionResolver};
pub use crate::utils::error::{BookingError, Result};
