//! Role-based navigation guard.
//!
//! [`evaluate`] is the pure decision. [`NavigationGuard`] remembers the last
//! inputs it acted on so unchanged inputs never trigger a second redirect,
//! and [`GuardDriver`] re-evaluates whenever the session or route changes.

use crate::core::{AuthSnapshot, Result, Role, Router};
use crate::utils::error::BookingError;
use crate::utils::validation::validate_disjoint;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::watch;

pub const DEFAULT_CUSTOMER_ONLY_ROUTES: &[&str] =
    &["home", "services", "cart", "checkout", "bookings"];
pub const DEFAULT_PARTNER_ONLY_ROUTES: &[&str] = &["partner", "jobs", "earnings"];
pub const DEFAULT_CUSTOMER_LANDING: &str = "home";
pub const DEFAULT_PARTNER_LANDING: &str = "partner";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRules {
    customer_only: HashSet<String>,
    partner_only: HashSet<String>,
    customer_landing: String,
    partner_landing: String,
}

impl RouteRules {
    pub fn new<C, P>(
        customer_only: C,
        partner_only: P,
        customer_landing: impl Into<String>,
        partner_landing: impl Into<String>,
    ) -> Result<Self>
    where
        C: IntoIterator,
        C::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        let rules = Self {
            customer_only: customer_only.into_iter().map(Into::into).collect(),
            partner_only: partner_only.into_iter().map(Into::into).collect(),
            customer_landing: customer_landing.into(),
            partner_landing: partner_landing.into(),
        };
        rules.check()?;
        Ok(rules)
    }

    fn check(&self) -> Result<()> {
        validate_disjoint("navigation", &self.customer_only, &self.partner_only)?;

        for (field, landing) in [
            ("navigation.customer_landing", &self.customer_landing),
            ("navigation.partner_landing", &self.partner_landing),
        ] {
            if landing.trim().is_empty() {
                return Err(BookingError::MissingConfigError {
                    field: field.to_string(),
                });
            }
        }

        // A landing route inside the set it redirects away from would loop.
        if self.customer_only.contains(&self.partner_landing) {
            return Err(BookingError::InvalidConfigValueError {
                field: "navigation.partner_landing".to_string(),
                value: self.partner_landing.clone(),
                reason: "partner landing route is customer-only".to_string(),
            });
        }
        if self.partner_only.contains(&self.customer_landing) {
            return Err(BookingError::InvalidConfigValueError {
                field: "navigation.customer_landing".to_string(),
                value: self.customer_landing.clone(),
                reason: "customer landing route is partner-only".to_string(),
            });
        }
        Ok(())
    }

    pub fn is_customer_only(&self, route: &str) -> bool {
        self.customer_only.contains(route)
    }

    pub fn is_partner_only(&self, route: &str) -> bool {
        self.partner_only.contains(route)
    }

    pub fn customer_landing(&self) -> &str {
        &self.customer_landing
    }

    pub fn partner_landing(&self) -> &str {
        &self.partner_landing
    }
}

impl Default for RouteRules {
    fn default() -> Self {
        Self {
            customer_only: DEFAULT_CUSTOMER_ONLY_ROUTES
                .iter()
                .map(|r| r.to_string())
                .collect(),
            partner_only: DEFAULT_PARTNER_ONLY_ROUTES
                .iter()
                .map(|r| r.to_string())
                .collect(),
            customer_landing: DEFAULT_CUSTOMER_LANDING.to_string(),
            partner_landing: DEFAULT_PARTNER_LANDING.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardAction {
    Suppress,
    Allow,
    Redirect(String),
}

pub fn evaluate(rules: &RouteRules, auth: AuthSnapshot, route: &str) -> GuardAction {
    if auth.is_loading {
        return GuardAction::Suppress;
    }
    match auth.role {
        Role::Partner if rules.is_customer_only(route) => {
            GuardAction::Redirect(rules.partner_landing.clone())
        }
        Role::Customer | Role::Unauthenticated if rules.is_partner_only(route) => {
            GuardAction::Redirect(rules.customer_landing.clone())
        }
        _ => GuardAction::Allow,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GuardState {
    #[default]
    Suppressed,
    Allowed,
    Redirecting(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Same inputs as last time; nothing done.
    Unchanged,
    Suppressed,
    Allowed,
    Redirected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct GuardInputs {
    auth: AuthSnapshot,
    route: String,
}

#[derive(Debug)]
pub struct NavigationGuard {
    rules: RouteRules,
    last: Option<GuardInputs>,
    // Where the last successful redirect sent the user.
    landed: Option<String>,
    state: GuardState,
}

impl NavigationGuard {
    pub fn new(rules: RouteRules) -> Self {
        Self {
            rules,
            last: None,
            landed: None,
            state: GuardState::default(),
        }
    }

    pub fn rules(&self) -> &RouteRules {
        &self.rules
    }

    pub fn state(&self) -> &GuardState {
        &self.state
    }

    /// React to a change of session or route. A failed redirect is returned;
    /// the guard keeps its state and tries again on the next input change.
    ///
    /// Inputs equal to the previous call are a no-op, unless a redirect was
    /// made for them and the router is no longer on its target: the user got
    /// back to the blocked route and the route signal collapsed both moves.
    pub fn on_change(
        &mut self,
        auth: AuthSnapshot,
        route: &str,
        router: &dyn Router,
    ) -> Result<GuardOutcome> {
        let inputs = GuardInputs {
            auth,
            route: route.to_string(),
        };
        if self.last.as_ref() == Some(&inputs) {
            let returned = match &self.landed {
                Some(target) => router.current_route() != *target,
                None => false,
            };
            if !returned {
                return Ok(GuardOutcome::Unchanged);
            }
        }
        self.last = Some(inputs);
        self.landed = None;

        match evaluate(&self.rules, auth, route) {
            GuardAction::Suppress => {
                self.state = GuardState::Suppressed;
                Ok(GuardOutcome::Suppressed)
            }
            GuardAction::Allow => {
                self.state = GuardState::Allowed;
                Ok(GuardOutcome::Allowed)
            }
            GuardAction::Redirect(target) => {
                tracing::info!(role = %auth.role, from = route, to = %target, "redirecting");
                router.navigate_to(&target).map_err(|e| {
                    tracing::warn!(to = %target, "redirect failed: {}", e);
                    match e {
                        err @ BookingError::NavigationError { .. } => err,
                        other => BookingError::navigation(target.clone(), other),
                    }
                })?;
                self.landed = Some(target.clone());
                self.state = GuardState::Redirecting(target.clone());
                Ok(GuardOutcome::Redirected(target))
            }
        }
    }
}

/// Drives a [`NavigationGuard`] from the session and route signals.
pub struct GuardDriver {
    guard: NavigationGuard,
    auth: watch::Receiver<AuthSnapshot>,
    routes: watch::Receiver<String>,
    router: Arc<dyn Router>,
}

impl GuardDriver {
    pub fn new(
        rules: RouteRules,
        auth: watch::Receiver<AuthSnapshot>,
        router: Arc<dyn Router>,
    ) -> Self {
        let routes = router.subscribe();
        Self {
            guard: NavigationGuard::new(rules),
            auth,
            routes,
            router,
        }
    }

    /// Evaluate the current inputs once.
    pub fn step(&mut self) -> Result<GuardOutcome> {
        let auth = *self.auth.borrow_and_update();
        let route = self.routes.borrow_and_update().clone();
        self.guard.on_change(auth, &route, self.router.as_ref())
    }

    /// Runs until the session store or the router goes away.
    pub async fn run(mut self) {
        loop {
            match self.step() {
                Ok(GuardOutcome::Unchanged) => {}
                Ok(outcome) => tracing::debug!(?outcome, "guard evaluated"),
                Err(e) => tracing::warn!("navigation guard: {}", e),
            }

            tokio::select! {
                changed = self.auth.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = self.routes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        tracing::debug!("navigation guard stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::router::MemoryRouter;

    fn partner() -> AuthSnapshot {
        AuthSnapshot::resolved(Role::Partner)
    }

    fn customer() -> AuthSnapshot {
        AuthSnapshot::resolved(Role::Customer)
    }

    #[test]
    fn test_evaluate_rules() {
        let rules = RouteRules::default();

        assert_eq!(
            evaluate(&rules, partner(), "services"),
            GuardAction::Redirect("partner".to_string())
        );
        assert_eq!(evaluate(&rules, customer(), "services"), GuardAction::Allow);
        assert_eq!(
            evaluate(&rules, customer(), "jobs"),
            GuardAction::Redirect("home".to_string())
        );
        assert_eq!(
            evaluate(&rules, AuthSnapshot::resolved(Role::Unauthenticated), "earnings"),
            GuardAction::Redirect("home".to_string())
        );
        assert_eq!(evaluate(&rules, partner(), "profile"), GuardAction::Allow);
    }

    #[test]
    fn test_loading_suppresses_every_decision() {
        let rules = RouteRules::default();
        for route in ["services", "jobs", "profile"] {
            assert_eq!(
                evaluate(&rules, AuthSnapshot::loading(), route),
                GuardAction::Suppress
            );
        }
    }

    #[test]
    fn test_rules_reject_overlap_and_loops() {
        assert!(RouteRules::new(["home", "jobs"], ["jobs"], "home", "partner").is_err());
        assert!(RouteRules::new(["home", "partner"], ["jobs"], "home", "partner").is_err());
        assert!(RouteRules::new(["home"], ["jobs"], "jobs", "partner").is_err());
        assert!(RouteRules::new(["home"], ["jobs"], "", "partner").is_err());
        assert!(RouteRules::new(["home"], ["jobs"], "home", "partner").is_ok());
    }

    #[test]
    fn test_partner_on_customer_route_redirects_once() {
        let router = MemoryRouter::new("services");
        let mut guard = NavigationGuard::new(RouteRules::default());

        let outcome = guard.on_change(partner(), "services", &router).unwrap();
        assert_eq!(outcome, GuardOutcome::Redirected("partner".to_string()));
        assert_eq!(guard.state(), &GuardState::Redirecting("partner".to_string()));

        let again = guard.on_change(partner(), "services", &router).unwrap();
        assert_eq!(again, GuardOutcome::Unchanged);
        assert_eq!(router.history(), vec!["partner".to_string()]);
    }

    #[test]
    fn test_customer_on_customer_route_is_allowed() {
        let router = MemoryRouter::new("services");
        let mut guard = NavigationGuard::new(RouteRules::default());

        assert_eq!(
            guard.on_change(customer(), "services", &router).unwrap(),
            GuardOutcome::Allowed
        );
        assert!(router.history().is_empty());
    }

    #[test]
    fn test_redirect_happens_when_loading_finishes() {
        let router = MemoryRouter::new("services");
        let mut guard = NavigationGuard::new(RouteRules::default());

        assert_eq!(
            guard
                .on_change(AuthSnapshot::loading(), "services", &router)
                .unwrap(),
            GuardOutcome::Suppressed
        );
        assert!(router.history().is_empty());

        assert_eq!(
            guard.on_change(partner(), "services", &router).unwrap(),
            GuardOutcome::Redirected("partner".to_string())
        );
    }

    #[test]
    fn test_failed_redirect_is_surfaced_and_retried_on_change() {
        let router = MemoryRouter::new("services");
        router.set_available(false);
        let mut guard = NavigationGuard::new(RouteRules::default());

        let err = guard.on_change(partner(), "services", &router).unwrap_err();
        assert!(matches!(err, BookingError::NavigationError { .. }));
        assert_eq!(guard.state(), &GuardState::Suppressed);

        router.set_available(true);
        assert_eq!(
            guard.on_change(partner(), "services", &router).unwrap(),
            GuardOutcome::Unchanged
        );
        assert_eq!(
            guard.on_change(partner(), "cart", &router).unwrap(),
            GuardOutcome::Redirected("partner".to_string())
        );
    }

    #[test]
    fn test_returning_to_blocked_route_redirects_again() {
        let router = MemoryRouter::new("services");
        let mut guard = NavigationGuard::new(RouteRules::default());

        guard.on_change(partner(), "services", &router).unwrap();
        router.visit("services");
        assert_eq!(
            guard.on_change(partner(), "services", &router).unwrap(),
            GuardOutcome::Redirected("partner".to_string())
        );
        assert_eq!(router.history().len(), 2);
    }

    #[tokio::test]
    async fn test_driver_redirects_after_collapsed_route_updates() {
        let router = Arc::new(MemoryRouter::new("services"));
        let (_auth_tx, auth_rx) = watch::channel(partner());
        let mut driver = GuardDriver::new(RouteRules::default(), auth_rx, router.clone());

        assert_eq!(
            driver.step().unwrap(),
            GuardOutcome::Redirected("partner".to_string())
        );

        // partner -> services lands before the driver looks again.
        router.visit("services");
        assert_eq!(
            driver.step().unwrap(),
            GuardOutcome::Redirected("partner".to_string())
        );
        assert_eq!(router.current_route(), "partner");
        assert_eq!(router.history().len(), 2);
    }

    #[tokio::test]
    async fn test_driver_follows_session_changes() {
        let router = Arc::new(MemoryRouter::new("services"));
        let (auth_tx, auth_rx) = watch::channel(AuthSnapshot::loading());
        let mut driver = GuardDriver::new(RouteRules::default(), auth_rx, router.clone());

        assert_eq!(driver.step().unwrap(), GuardOutcome::Suppressed);

        auth_tx.send_replace(partner());
        assert_eq!(
            driver.step().unwrap(),
            GuardOutcome::Redirected("partner".to_string())
        );
        assert_eq!(router.current_route(), "partner");

        assert_eq!(driver.step().unwrap(), GuardOutcome::Allowed);
        assert_eq!(driver.step().unwrap(), GuardOutcome::Unchanged);
        assert_eq!(router.history().len(), 1);
    }
}
