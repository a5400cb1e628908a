use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Persistence failed for key '{key}': {message}")]
    PersistenceError { key: String, message: String },

    #[error("Session resolution failed: {message}")]
    SessionError { message: String },

    #[error("Service '{service_id}' is not in the cart")]
    ItemNotInCart { service_id: String },

    #[error("Invalid quantity {quantity} for service '{service_id}': must be at least 1")]
    InvalidQuantity { service_id: String, quantity: u32 },

    #[error("Cart totals overflow while updating service '{service_id}'")]
    TotalsOverflow { service_id: String },

    #[error("Invalid city: {reason}")]
    InvalidCity { reason: String },

    #[error("Invalid catalog entry '{id}': {reason}")]
    InvalidCatalogEntry { id: String, reason: String },

    #[error("Navigation to '{route}' failed: {message}")]
    NavigationError { route: String, message: String },

    #[error("Catalog request failed: {message}")]
    CatalogError { message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Persistence,
    Session,
    Precondition,
    Navigation,
    Network,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl BookingError {
    pub fn persistence(key: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::PersistenceError {
            key: key.into(),
            message: message.to_string(),
        }
    }

    pub fn navigation(route: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::NavigationError {
            route: route.into(),
            message: message.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::PersistenceError { .. } | Self::SerializationError(_) => {
                ErrorCategory::Persistence
            }
            Self::SessionError { .. } => ErrorCategory::Session,
            Self::ItemNotInCart { .. }
            | Self::InvalidQuantity { .. }
            | Self::TotalsOverflow { .. }
            | Self::InvalidCity { .. }
            | Self::InvalidCatalogEntry { .. } => ErrorCategory::Precondition,
            Self::NavigationError { .. } => ErrorCategory::Navigation,
            Self::CatalogError { .. } | Self::HttpError(_) => ErrorCategory::Network,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 持久化失敗不影響記憶體中的狀態
            ErrorCategory::Persistence | ErrorCategory::Session => ErrorSeverity::Low,
            ErrorCategory::Navigation | ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Precondition | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.severity() < ErrorSeverity::High
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Persistence => {
                "The in-memory value is still in effect; check the storage location and retry"
            }
            ErrorCategory::Session => "Sign in again to restore the session",
            ErrorCategory::Precondition => {
                "Refresh the cart view; the requested item or quantity is no longer valid"
            }
            ErrorCategory::Navigation => "The redirect is retried on the next route or role change",
            ErrorCategory::Network => "Check the catalog endpoint and network connectivity",
            ErrorCategory::Configuration => "Fix the configuration file and run again",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::PersistenceError { .. } => {
                "Your selection was applied but could not be saved".to_string()
            }
            Self::SessionError { .. } => "We could not verify your session".to_string(),
            Self::ItemNotInCart { service_id } => {
                format!("'{}' is no longer in your cart", service_id)
            }
            Self::InvalidQuantity { .. } => "Quantity must be at least 1".to_string(),
            Self::NavigationError { route, .. } => format!("Could not open '{}'", route),
            Self::CatalogError { .. } | Self::HttpError(_) => {
                "Services could not be loaded right now".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BookingError>;
