use crate::utils::error::{BookingError, Result};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: &str, reason: impl Into<String>) -> BookingError {
    BookingError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Catalog base URL: http(s), with a host, and nothing after the path since
/// category paths are appended to it.
pub fn validate_catalog_endpoint(field_name: &str, endpoint: &str) -> Result<()> {
    let url = Url::parse(endpoint)
        .map_err(|e| invalid(field_name, endpoint, format!("not a catalog URL: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field_name,
            endpoint,
            format!("catalog must be served over http(s), got {}", url.scheme()),
        ));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid(field_name, endpoint, "catalog URL has no host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid(
            field_name,
            endpoint,
            "catalog URL cannot carry a query or fragment",
        ));
    }
    Ok(())
}

/// The store is a single file, so the path must name one.
pub fn validate_store_file(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() || path.contains('\0') {
        return Err(invalid(field_name, path, "store file path is unusable"));
    }
    if path.ends_with('/') || std::path::Path::new(path).file_name().is_none() {
        return Err(invalid(field_name, path, "store path must name a file"));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BookingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Every entry must be non-empty and unique within the list.
pub fn validate_route_list(field_name: &str, routes: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    for route in routes {
        validate_non_empty_string(field_name, route)?;
        if !seen.insert(route.as_str()) {
            return Err(BookingError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: route.clone(),
                reason: "Route is listed more than once".to_string(),
            });
        }
    }
    Ok(())
}

pub fn validate_disjoint(
    field_name: &str,
    left: &HashSet<String>,
    right: &HashSet<String>,
) -> Result<()> {
    let mut shared: Vec<&String> = left.intersection(right).collect();
    if shared.is_empty() {
        return Ok(());
    }
    shared.sort();
    Err(BookingError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: shared
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        reason: "Routes cannot be both customer-only and partner-only".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_validate_catalog_endpoint() {
        let field = "catalog.endpoint";
        assert!(validate_catalog_endpoint(field, "https://catalog.example.com/v1").is_ok());
        assert!(validate_catalog_endpoint(field, "http://127.0.0.1:8080").is_ok());
        assert!(validate_catalog_endpoint(field, "").is_err());
        assert!(validate_catalog_endpoint(field, "catalog.example.com").is_err());
        assert!(validate_catalog_endpoint(field, "ftp://catalog.example.com").is_err());
        assert!(validate_catalog_endpoint(field, "https://catalog.example.com/?city=Pune").is_err());
    }

    #[test]
    fn test_validate_store_file() {
        let field = "storage.path";
        assert!(validate_store_file(field, "state/booking.json").is_ok());
        assert!(validate_store_file(field, " ").is_err());
        assert!(validate_store_file(field, "state/").is_err());
        assert!(validate_store_file(field, "state/..").is_err());
    }

    #[test]
    fn test_validate_route_list() {
        let routes = vec!["home".to_string(), "cart".to_string()];
        assert!(validate_route_list("navigation.customer_only_routes", &routes).is_ok());

        let duplicated = vec!["home".to_string(), "home".to_string()];
        assert!(validate_route_list("navigation.customer_only_routes", &duplicated).is_err());

        let blank = vec!["  ".to_string()];
        assert!(validate_route_list("navigation.customer_only_routes", &blank).is_err());
    }

    #[test]
    fn test_validate_disjoint() {
        assert!(validate_disjoint("navigation", &set(&["home"]), &set(&["partner"])).is_ok());

        let err = validate_disjoint("navigation", &set(&["home", "jobs"]), &set(&["jobs"]))
            .unwrap_err();
        assert!(err.to_string().contains("jobs"));
    }
}
