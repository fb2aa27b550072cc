//! Stateful confirmation controller: one activation, one outcome, one
//! delayed navigation that dies with the controller.

use super::flow::ConfirmationFlow;
use crate::auth::AuthCapability;
use crate::models::confirm::{ConfirmationOutcome, Navigation, Routes};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Receives the single navigation request a controller makes.
pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, route: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn navigate(&self, route: &str) {
        self(route)
    }
}

pub struct ConfirmationController {
    flow: ConfirmationFlow,
    navigator: Arc<dyn Navigator>,
    routes: Routes,
    delay: Duration,
    activated: AtomicBool,
    torn_down: AtomicBool,
    outcome: watch::Sender<ConfirmationOutcome>,
    pending_navigation: Mutex<Option<JoinHandle<()>>>,
}

impl ConfirmationController {
    pub fn new(
        auth: Arc<dyn AuthCapability>,
        navigator: Arc<dyn Navigator>,
        routes: Routes,
        delay: Duration,
    ) -> Self {
        let (outcome, _) = watch::channel(ConfirmationOutcome::Verifying);
        Self {
            flow: ConfirmationFlow::new(auth),
            navigator,
            routes,
            delay,
            activated: AtomicBool::new(false),
            torn_down: AtomicBool::new(false),
            outcome,
            pending_navigation: Mutex::new(None),
        }
    }

    /// Outcome updates, starting from `Verifying`.
    pub fn subscribe(&self) -> watch::Receiver<ConfirmationOutcome> {
        self.outcome.subscribe()
    }

    pub fn outcome(&self) -> ConfirmationOutcome {
        self.outcome.borrow().clone()
    }

    /// Runs the confirmation for `url` and schedules the follow-up navigation.
    ///
    /// Only the first call does any work. Later calls, including ones made
    /// while the first is still waiting on the backend, return the current
    /// outcome without touching the auth backend.
    pub async fn activate(&self, url: &str) -> ConfirmationOutcome {
        if self.activated.swap(true, Ordering::SeqCst) {
            debug!("Controller already activated, ignoring");
            return self.outcome();
        }

        let outcome = self.flow.resolve(url).await;
        self.outcome.send_replace(outcome.clone());

        if let Some(navigation) = outcome.navigation(&self.routes, self.delay) {
            self.schedule(navigation);
        }
        outcome
    }

    fn schedule(&self, navigation: Navigation) {
        let mut pending = self
            .pending_navigation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if self.torn_down.load(Ordering::SeqCst) {
            debug!(route = %navigation.route, "Controller torn down, dropping navigation");
            return;
        }

        debug!(
            route = %navigation.route,
            delay = ?navigation.delay,
            "Scheduling navigation"
        );
        let navigator = self.navigator.clone();
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(navigation.delay).await;
            navigator.navigate(&navigation.route);
        }));
    }

    /// Cancels a navigation that has not fired yet. Also prevents one from
    /// being scheduled if the redemption is still in flight.
    pub fn teardown(&self) {
        self.torn_down.store(true, Ordering::SeqCst);
        let handle = self
            .pending_navigation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }
}

impl Drop for ConfirmationController {
    fn drop(&mut self) {
        self.teardown();
    }
}
