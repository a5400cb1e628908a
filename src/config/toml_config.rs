use crate::core::city::DEFAULT_CITY_KEY;
use crate::core::guard::{
    RouteRules, DEFAULT_CUSTOMER_LANDING, DEFAULT_CUSTOMER_ONLY_ROUTES, DEFAULT_PARTNER_LANDING,
    DEFAULT_PARTNER_ONLY_ROUTES,
};
use crate::utils::error::{BookingError, Result};
use crate::utils::validation::{
    validate_catalog_endpoint, validate_non_empty_string, validate_route_list, validate_store_file,
    Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: String,
    pub city_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "./booking-state.json".to_string(),
            city_key: DEFAULT_CITY_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub customer_only_routes: Vec<String>,
    pub partner_only_routes: Vec<String>,
    pub customer_landing: String,
    pub partner_landing: String,
    pub cart_route: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        let to_strings = |routes: &[&str]| -> Vec<String> {
            routes.iter().map(|r| r.to_string()).collect()
        };
        Self {
            customer_only_routes: to_strings(DEFAULT_CUSTOMER_ONLY_ROUTES),
            partner_only_routes: to_strings(DEFAULT_PARTNER_ONLY_ROUTES),
            customer_landing: DEFAULT_CUSTOMER_LANDING.to_string(),
            partner_landing: DEFAULT_PARTNER_LANDING.to_string(),
            cart_route: "cart".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl CatalogConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(BookingError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| BookingError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CATALOG_ENDPOINT})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| BookingError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn route_rules(&self) -> Result<RouteRules> {
        let nav = &self.navigation;
        RouteRules::new(
            nav.customer_only_routes.iter().cloned(),
            nav.partner_only_routes.iter().cloned(),
            nav.customer_landing.clone(),
            nav.partner_landing.clone(),
        )
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_store_file("storage.path", &self.storage.path)?;
        validate_non_empty_string("storage.city_key", &self.storage.city_key)?;

        validate_route_list(
            "navigation.customer_only_routes",
            &self.navigation.customer_only_routes,
        )?;
        validate_route_list(
            "navigation.partner_only_routes",
            &self.navigation.partner_only_routes,
        )?;
        validate_non_empty_string("navigation.cart_route", &self.navigation.cart_route)?;
        self.route_rules()?;

        if let Some(endpoint) = &self.catalog.endpoint {
            validate_catalog_endpoint("catalog.endpoint", endpoint)?;
        }
        Ok(())
    }
}
