//! Session role store.
//!
//! `Loading -> Resolved(role)`, once per resolution cycle. Role and loading
//! flag live in one watch slot so they are always read as a pair.

use crate::core::{AuthSnapshot, Role, SessionResolver};
use std::sync::Arc;
use tokio::sync::watch;

pub struct AuthStore {
    resolver: Arc<dyn SessionResolver>,
    state: watch::Sender<AuthSnapshot>,
    // Held for the whole of a transition so cycles never interleave.
    transition: tokio::sync::Mutex<()>,
}

impl AuthStore {
    pub fn new(resolver: Arc<dyn SessionResolver>) -> Self {
        Self {
            resolver,
            state: watch::Sender::new(AuthSnapshot::loading()),
            transition: tokio::sync::Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        *self.state.borrow()
    }

    pub fn role(&self) -> Role {
        self.snapshot().role
    }

    pub fn is_loading(&self) -> bool {
        self.snapshot().is_loading
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.state.subscribe()
    }

    /// Resolve the startup session. Does nothing once a role is known.
    pub async fn initialize(&self) -> AuthSnapshot {
        let _cycle = self.transition.lock().await;
        if !self.is_loading() {
            return self.snapshot();
        }
        let role = self.resolve_role().await;
        self.settle(role)
    }

    /// Start a new resolution cycle, e.g. after a sign-in completed.
    pub async fn refresh(&self) -> AuthSnapshot {
        let _cycle = self.transition.lock().await;
        self.state.send_replace(AuthSnapshot::loading());
        let role = self.resolve_role().await;
        self.settle(role)
    }

    /// Back to `Loading` while the session is torn down, then
    /// `Unauthenticated`. Cleanup failures are logged only.
    pub async fn sign_out(&self) -> AuthSnapshot {
        let _cycle = self.transition.lock().await;
        self.state.send_replace(AuthSnapshot::loading());
        tracing::info!("signing out");

        if let Err(e) = self.resolver.end_session().await {
            tracing::warn!("session cleanup failed: {}", e);
        }
        self.settle(Role::Unauthenticated)
    }

    async fn resolve_role(&self) -> Role {
        match self.resolver.resolve_session().await {
            Ok(session) => session.effective_role(),
            Err(e) => {
                tracing::warn!("session resolution failed, continuing unauthenticated: {}", e);
                Role::Unauthenticated
            }
        }
    }

    fn settle(&self, role: Role) -> AuthSnapshot {
        let snapshot = AuthSnapshot::resolved(role);
        self.state.send_replace(snapshot);
        tracing::info!(role = %role, "session resolved");
        snapshot
    }
}
