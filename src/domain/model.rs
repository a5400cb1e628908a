use crate::utils::error::{BookingError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A service locality chosen by the user. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct City(String);

impl City {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(BookingError::InvalidCity {
                reason: "city name cannot be empty".to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for City {
    type Error = BookingError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<City> for String {
    fn from(city: City) -> Self {
        city.0
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Unauthenticated,
    Customer,
    Partner,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Unauthenticated => "unauthenticated",
            Role::Customer => "customer",
            Role::Partner => "partner",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Role {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unauthenticated" | "guest" | "none" => Ok(Role::Unauthenticated),
            "customer" => Ok(Role::Customer),
            "partner" => Ok(Role::Partner),
            other => Err(BookingError::InvalidConfigValueError {
                field: "role".to_string(),
                value: other.to_string(),
                reason: "expected one of: unauthenticated, customer, partner".to_string(),
            }),
        }
    }
}

/// Answer from the session-check collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub role: Role,
    pub authenticated: bool,
}

impl Session {
    pub fn signed_in(role: Role) -> Self {
        Self {
            role,
            authenticated: role != Role::Unauthenticated,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            role: Role::Unauthenticated,
            authenticated: false,
        }
    }

    /// The role this session grants. An unauthenticated session never
    /// carries a customer or partner role.
    pub fn effective_role(&self) -> Role {
        if self.authenticated {
            self.role
        } else {
            Role::Unauthenticated
        }
    }
}

/// Role and loading flag, always read together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuthSnapshot {
    pub role: Role,
    pub is_loading: bool,
}

impl AuthSnapshot {
    pub fn loading() -> Self {
        Self {
            role: Role::Unauthenticated,
            is_loading: true,
        }
    }

    pub fn resolved(role: Role) -> Self {
        Self {
            role,
            is_loading: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub service_id: String,
    pub name: String,
    /// Minor units.
    pub unit_price: u64,
    pub quantity: u32,
}

impl CartLineItem {
    pub fn line_total(&self) -> Option<u64> {
        self.unit_price.checked_mul(u64::from(self.quantity))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CartTotals {
    pub total_items: u64,
    pub total_price: u64,
}

impl CartTotals {
    /// Recompute both aggregates from the full line collection.
    /// `None` when either sum does not fit.
    pub fn compute(items: &[CartLineItem]) -> Option<Self> {
        items.iter().try_fold(Self::default(), |acc, item| {
            Some(Self {
                total_items: acc.total_items.checked_add(u64::from(item.quantity))?,
                total_price: acc.total_price.checked_add(item.line_total()?)?,
            })
        })
    }
}

/// What the cart summary bar shows. Hidden when the cart is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub visible: bool,
    pub total_items: u64,
    pub total_price: u64,
}

/// One listing from the catalog collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogService {
    pub id: String,
    pub name: String,
    /// Minor units; major-unit decimals on the wire.
    #[serde(with = "crate::domain::price")]
    pub price: u64,
}

impl CatalogService {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(BookingError::InvalidCatalogEntry {
                id: self.id.clone(),
                reason: "service id cannot be empty".to_string(),
            });
        }
        if self.name.trim().is_empty() {
            return Err(BookingError::InvalidCatalogEntry {
                id: self.id.clone(),
                reason: "service name cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}
