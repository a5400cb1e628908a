use crate::core::{CatalogService, CatalogSource};
use crate::utils::error::{BookingError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Fetches listings from `GET {base}/categories/{category}/services`.
pub struct HttpCatalog {
    client: Client,
    base_url: Url,
}

impl HttpCatalog {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        crate::utils::validation::validate_catalog_endpoint("catalog.endpoint", base_url)?;
        let base_url = Url::parse(base_url).map_err(|e| BookingError::ConfigError {
            message: format!("invalid catalog endpoint: {}", e),
        })?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    fn services_url(&self, category: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BookingError::ConfigError {
                message: format!("catalog endpoint cannot be a base: {}", self.base_url),
            })?
            .pop_if_empty()
            .extend(["categories", category, "services"]);
        Ok(url)
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn fetch_services(&self, category: &str) -> Result<Vec<CatalogService>> {
        let url = self.services_url(category)?;
        tracing::debug!("Requesting catalog: {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        tracing::debug!("Catalog response status: {}", status);
        if !status.is_success() {
            return Err(BookingError::CatalogError {
                message: format!("{} returned {}", url, status),
            });
        }

        let listings: Vec<serde_json::Value> = response.json().await?;
        let total = listings.len();
        let services: Vec<CatalogService> = listings
            .into_iter()
            .filter_map(|listing| match parse_listing(listing) {
                Ok(service) => Some(service),
                Err(e) => {
                    tracing::warn!(category, "skipping catalog listing: {}", e);
                    None
                }
            })
            .collect();
        tracing::debug!(category, count = services.len(), total, "catalog loaded");
        Ok(services)
    }
}

/// One bad listing must not hide the rest of the category.
fn parse_listing(listing: serde_json::Value) -> Result<CatalogService> {
    let id = listing
        .get("id")
        .and_then(|id| id.as_str())
        .unwrap_or("<unknown>")
        .to_string();
    let service: CatalogService =
        serde_json::from_value(listing).map_err(|e| BookingError::InvalidCatalogEntry {
            id,
            reason: e.to_string(),
        })?;
    service.validate()?;
    Ok(service)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_services_url_is_built_from_segments() {
        let catalog = HttpCatalog::new("https://api.example.com/v1").unwrap();
        assert_eq!(
            catalog.services_url("ac-repair").unwrap().as_str(),
            "https://api.example.com/v1/categories/ac-repair/services"
        );

        let catalog = HttpCatalog::new("https://api.example.com/").unwrap();
        assert_eq!(
            catalog.services_url("home cleaning").unwrap().as_str(),
            "https://api.example.com/categories/home%20cleaning/services"
        );
    }

    #[test]
    fn test_parse_listing() {
        let service = parse_listing(serde_json::json!(
            {"id": "svc-5", "name": "Geyser Repair", "price": 199.5}
        ))
        .unwrap();
        assert_eq!(service.price, 19950);

        let err = parse_listing(serde_json::json!(
            {"id": "svc-6", "name": "Painting", "price": -5}
        ))
        .unwrap_err();
        assert!(matches!(err, BookingError::InvalidCatalogEntry { ref id, .. } if id == "svc-6"));
    }

    #[test]
    fn test_rejects_non_http_endpoints() {
        assert!(HttpCatalog::new("ftp://example.com").is_err());
    }
}
