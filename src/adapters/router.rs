use crate::core::Router;
use crate::utils::error::{BookingError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::sync::watch;

/// Router that keeps the current route in memory and records every
/// `navigate_to` call. Used by the CLI and in tests.
#[derive(Debug)]
pub struct MemoryRouter {
    current: watch::Sender<String>,
    history: Mutex<Vec<String>>,
    available: AtomicBool,
}

impl MemoryRouter {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            current: watch::Sender::new(initial.into()),
            history: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    /// User-driven navigation; not recorded in the history.
    pub fn visit(&self, route: impl Into<String>) {
        self.current.send_replace(route.into());
    }

    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

impl Router for MemoryRouter {
    fn current_route(&self) -> String {
        self.current.borrow().clone()
    }

    fn navigate_to(&self, route: &str) -> Result<()> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(BookingError::navigation(route, "router is not mounted"));
        }
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route.to_string());
        self.current.send_replace(route.to_string());
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<String> {
        self.current.subscribe()
    }
}
