use crate::core::Role;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "booking-state")]
#[command(about = "Inspect and drive the booking client's state layer")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the key/value store file from the configuration
    #[arg(long)]
    pub store: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Read or change the selected city
    City {
        #[command(subcommand)]
        action: CityAction,
    },
    /// Evaluate the navigation guard for one role/route combination
    Guard {
        #[arg(long, value_parser = parse_role)]
        role: Role,
        /// Treat the session as still resolving
        #[arg(long)]
        loading: bool,
        route: String,
    },
    /// Fetch a category from the catalog and build a cart from it
    Cart {
        #[arg(long)]
        category: String,
        /// Service to add, as ID or ID:QUANTITY (repeatable)
        #[arg(long = "add", value_parser = parse_cart_entry)]
        add: Vec<(String, u32)>,
        /// Override the catalog endpoint from the configuration
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Bootstrap a session with a fixed role and run the guard once
    Session {
        #[arg(long, value_parser = parse_role)]
        role: Role,
        #[arg(long, default_value = "home")]
        route: String,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum CityAction {
    Get,
    Set { name: String },
    Clear,
}

fn parse_role(value: &str) -> Result<Role, String> {
    value.parse::<Role>().map_err(|e| e.to_string())
}

fn parse_cart_entry(value: &str) -> Result<(String, u32), String> {
    let (id, quantity) = match value.split_once(':') {
        Some((id, quantity)) => {
            let quantity = quantity
                .parse::<u32>()
                .map_err(|e| format!("invalid quantity '{}': {}", quantity, e))?;
            (id, quantity)
        }
        None => (value, 1),
    };
    if id.trim().is_empty() {
        return Err("service id cannot be empty".to_string());
    }
    Ok((id.to_string(), quantity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cart_entry() {
        assert_eq!(parse_cart_entry("svc-1").unwrap(), ("svc-1".to_string(), 1));
        assert_eq!(parse_cart_entry("svc-1:3").unwrap(), ("svc-1".to_string(), 3));
        assert!(parse_cart_entry("svc-1:x").is_err());
        assert!(parse_cart_entry(":2").is_err());
    }

    #[test]
    fn test_parse_guard_command() {
        let cli = CliConfig::parse_from([
            "booking-state",
            "guard",
            "--role",
            "partner",
            "services",
        ]);
        match cli.command {
            Command::Guard { role, loading, route } => {
                assert_eq!(role, Role::Partner);
                assert!(!loading);
                assert_eq!(route, "services");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
