/*!
 * # Nearby session
 *
 * Screen-level state for the nearby-places view: a loading flag, the last
 * error, and the last successful result. Fetches run on mount and whenever
 * the app becomes active again. In-flight fetches are never cancelled;
 * whichever resolves last decides what is shown.
 */

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, instrument};

use crate::models::{FetchOutcome, LocationResult};
use crate::services::LocationService;

/// Events that start a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshTrigger {
    Mount,
    BecameActive,
}

/// Host application lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppLifecycleState {
    Active,
    Inactive,
    Background,
}

/// What the screen should render
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ScreenView {
    Loading,
    Error { message: String },
    Map(LocationResult),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenState {
    pub loading: bool,
    pub error: Option<String>,
    pub result: Option<LocationResult>,
    /// Number of outcomes applied so far
    pub revision: u64,
}

impl Default for ScreenState {
    fn default() -> Self {
        Self {
            loading: true,
            error: None,
            result: None,
            revision: 0,
        }
    }
}

impl ScreenState {
    /// Folds one fetch outcome into the state.
    pub fn apply(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Success(result) => {
                self.result = Some(result);
                self.error = None;
                self.loading = false;
            }
            FetchOutcome::Failure { message } => {
                self.error = Some(message);
                self.loading = false;
            }
            FetchOutcome::NoOp { .. } => {
                // keep whatever was on screen; spinner only if nothing ever was
                self.loading = self.result.is_none() && self.error.is_none();
            }
        }
        self.revision += 1;
    }

    /// Loading wins over error, error wins over the map.
    pub fn view(&self) -> ScreenView {
        if self.loading {
            return ScreenView::Loading;
        }
        if let Some(message) = &self.error {
            return ScreenView::Error {
                message: message.clone(),
            };
        }
        match &self.result {
            Some(result) => ScreenView::Map(result.clone()),
            None => ScreenView::Loading,
        }
    }
}

/// Drives [`LocationService`] from screen lifecycle events.
pub struct NearbySession {
    service: LocationService,
    state: Mutex<ScreenState>,
}

impl NearbySession {
    pub fn new(service: LocationService) -> Self {
        Self {
            service,
            state: Mutex::new(ScreenState::default()),
        }
    }

    pub async fn mount(&self) -> ScreenView {
        self.refresh(RefreshTrigger::Mount).await
    }

    /// Refreshes only when the app comes back to the foreground.
    pub async fn on_lifecycle_change(&self, state: AppLifecycleState) -> Option<ScreenView> {
        match state {
            AppLifecycleState::Active => Some(self.refresh(RefreshTrigger::BecameActive).await),
            AppLifecycleState::Inactive | AppLifecycleState::Background => None,
        }
    }

    #[instrument(skip(self))]
    pub async fn refresh(&self, trigger: RefreshTrigger) -> ScreenView {
        self.state().loading = true;
        let outcome = self.service.fetch_location_and_places().await;
        let mut state = self.state();
        state.apply(outcome);
        debug!(revision = state.revision, "screen state updated");
        state.view()
    }

    pub fn snapshot(&self) -> ScreenState {
        self.state().clone()
    }

    pub fn view(&self) -> ScreenView {
        self.state().view()
    }

    fn state(&self) -> MutexGuard<'_, ScreenState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
