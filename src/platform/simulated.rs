use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{Accuracy, Fix, LocationPlatform, PermissionStatus, PlatformError};
use crate::models::Coordinate;

#[derive(Debug, Clone)]
struct SimulatedState {
    permission: PermissionStatus,
    services_enabled: bool,
    fix: Result<Coordinate, PlatformError>,
    fix_delay: Option<Duration>,
    grant_on_request: bool,
}

/// In-memory [`LocationPlatform`] with scripted answers.
///
/// Backs the CLI and the test suites. Every knob can be changed while a
/// provider holds the platform, and every interaction is counted.
#[derive(Debug)]
pub struct SimulatedPlatform {
    state: Mutex<SimulatedState>,
    permission_requests: AtomicUsize,
    settings_opened: AtomicUsize,
    fix_requests: AtomicUsize,
    open_sessions: Arc<AtomicUsize>,
}

impl Default for SimulatedPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedPlatform {
    /// Permission granted, services on, no fix available.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SimulatedState {
                permission: PermissionStatus::Granted,
                services_enabled: true,
                fix: Err(PlatformError::NoFixAvailable),
                fix_delay: None,
                grant_on_request: false,
            }),
            permission_requests: AtomicUsize::new(0),
            settings_opened: AtomicUsize::new(0),
            fix_requests: AtomicUsize::new(0),
            open_sessions: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_permission(self, permission: PermissionStatus) -> Self {
        self.set_permission(permission);
        self
    }

    pub fn with_services_enabled(self, enabled: bool) -> Self {
        self.set_services_enabled(enabled);
        self
    }

    pub fn with_fix(self, coordinate: Coordinate) -> Self {
        self.set_fix(Ok(coordinate));
        self
    }

    pub fn with_fix_error(self, error: PlatformError) -> Self {
        self.set_fix(Err(error));
        self
    }

    pub fn with_fix_delay(self, delay: Duration) -> Self {
        self.state().fix_delay = Some(delay);
        self
    }

    /// Simulates a user who taps "allow" on the permission prompt.
    pub fn with_grant_on_request(self, grant: bool) -> Self {
        self.state().grant_on_request = grant;
        self
    }

    pub fn set_permission(&self, permission: PermissionStatus) {
        self.state().permission = permission;
    }

    pub fn set_services_enabled(&self, enabled: bool) {
        self.state().services_enabled = enabled;
    }

    pub fn set_fix(&self, fix: Result<Coordinate, PlatformError>) {
        self.state().fix = fix;
    }

    pub fn permission_requests(&self) -> usize {
        self.permission_requests.load(Ordering::SeqCst)
    }

    pub fn settings_opened(&self) -> usize {
        self.settings_opened.load(Ordering::SeqCst)
    }

    pub fn fix_requests(&self) -> usize {
        self.fix_requests.load(Ordering::SeqCst)
    }

    /// Location sessions currently held by in-flight `get_fix` calls.
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }

    fn state(&self) -> MutexGuard<'_, SimulatedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Held for the lifetime of one `get_fix` call.
struct LocationSession {
    open: Arc<AtomicUsize>,
}

impl LocationSession {
    fn acquire(open: &Arc<AtomicUsize>) -> Self {
        open.fetch_add(1, Ordering::SeqCst);
        Self { open: open.clone() }
    }
}

impl Drop for LocationSession {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl LocationPlatform for SimulatedPlatform {
    async fn check_permission(&self) -> PermissionStatus {
        self.state().permission
    }

    async fn request_permission(&self) {
        self.permission_requests.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state();
        if state.grant_on_request {
            state.permission = PermissionStatus::Granted;
        }
        debug!(granted = state.grant_on_request, "simulated permission prompt");
    }

    async fn is_enabled(&self) -> bool {
        self.state().services_enabled
    }

    async fn open_settings(&self) {
        self.settings_opened.fetch_add(1, Ordering::SeqCst);
    }

    async fn get_fix(&self, accuracy: Accuracy) -> Result<Fix, PlatformError> {
        self.fix_requests.fetch_add(1, Ordering::SeqCst);
        let _session = LocationSession::acquire(&self.open_sessions);

        let delay = self.state().fix_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state().clone();
        debug!(?accuracy, "simulated fix request");
        if !state.permission.is_granted() {
            return Err(PlatformError::PermissionRevoked);
        }
        if !state.services_enabled {
            return Err(PlatformError::NoFixAvailable);
        }
        let coordinate = state.fix?;
        Ok(Fix {
            accuracy_meters: Some(match accuracy {
                Accuracy::High => 5.0,
                Accuracy::Balanced => 40.0,
                Accuracy::LowPower => 500.0,
            }),
            ..Fix::new(coordinate)
        })
    }
}
