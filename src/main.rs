use anyhow::Context;
use booking_state::adapters::{FileStore, HttpCatalog, MemoryRouter, StaticSession};
use booking_state::config::cli::CityAction;
use booking_state::core::guard::{evaluate, GuardAction};
use booking_state::domain::price::format_minor_units;
use booking_state::utils::error::{BookingError, ErrorSeverity};
use booking_state::utils::{logger, validation::Validate};
use booking_state::{
    AppConfig, AppState, AuthSnapshot, CartStore, CatalogSource, City, CityStore, CliConfig,
    Command, Router,
};
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed to load config file '{}'", path))?,
        None => AppConfig::default(),
    };
    if let Some(store) = &cli.store {
        config.storage.path = store.clone();
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(cli.command, &config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(command: Command, config: &AppConfig) -> Result<(), BookingError> {
    match command {
        Command::City { action } => {
            let store = Arc::new(FileStore::new(&config.storage.path));
            let cities = CityStore::with_key(store, config.storage.city_key.clone());

            match action {
                CityAction::Get => {
                    cities.load().await?;
                    match cities.get_city() {
                        Some(city) => println!("{}", city),
                        None => println!("(no city selected)"),
                    }
                }
                CityAction::Set { name } => {
                    let city = City::new(name)?;
                    cities.set_city(city.clone()).await?;
                    println!("✅ City set to {}", city);
                }
                CityAction::Clear => {
                    cities.clear().await?;
                    println!("✅ City cleared");
                }
            }
        }
        Command::Guard {
            role,
            loading,
            route,
        } => {
            let auth = if loading {
                AuthSnapshot::loading()
            } else {
                AuthSnapshot::resolved(role)
            };
            match evaluate(&config.route_rules()?, auth, &route) {
                GuardAction::Suppress => println!("suppressed (session still loading)"),
                GuardAction::Allow => println!("allowed: {}", route),
                GuardAction::Redirect(target) => println!("redirect: {} -> {}", route, target),
            }
        }
        Command::Cart {
            category,
            add,
            endpoint,
        } => {
            let endpoint = endpoint
                .or_else(|| config.catalog.endpoint.clone())
                .ok_or_else(|| BookingError::MissingConfigError {
                    field: "catalog.endpoint".to_string(),
                })?;
            let catalog = HttpCatalog::with_timeout(&endpoint, config.catalog.timeout())?;
            let services = catalog.fetch_services(&category).await?;
            tracing::info!("📦 {} services in '{}'", services.len(), category);

            let cart = CartStore::new();
            for (service_id, quantity) in add {
                let service = services
                    .iter()
                    .find(|s| s.id == service_id)
                    .ok_or_else(|| BookingError::InvalidCatalogEntry {
                        id: service_id.clone(),
                        reason: format!("not listed in category '{}'", category),
                    })?;
                cart.add_service(service, quantity)?;
            }

            for line in cart.items() {
                println!(
                    "{:<12} {:<30} {:>4} x {:>8}",
                    line.service_id,
                    line.name,
                    line.quantity,
                    format_minor_units(line.unit_price)
                );
            }
            let summary = cart.summary();
            println!(
                "items: {}  total: {}",
                summary.total_items,
                format_minor_units(summary.total_price)
            );
        }
        Command::Session { role, route } => {
            let store = Arc::new(FileStore::new(&config.storage.path));
            let app = AppState::new(store, Arc::new(StaticSession::new(role)), config)?;
            let router = MemoryRouter::new(route);

            let report = app.bootstrap().await;
            if let Some(err) = &report.city_error {
                tracing::warn!("city not restored: {}", err);
            }
            let outcome = app
                .guard()
                .on_change(app.auth.snapshot(), &router.current_route(), &router)?;

            println!("role:   {}", report.auth.role);
            println!(
                "city:   {}",
                report.city.map(String::from).unwrap_or_else(|| "(unknown)".to_string())
            );
            println!("guard:  {:?}", outcome);
            println!("route:  {}", router.current_route());
        }
    }
    Ok(())
}
