use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::{FetchOutcome, LocationResult, PendingReason};
use crate::services::location_provider::{LocationProvider, LocationStatus};
use crate::services::places::PlaceSource;

const FAILURE_PREFIX: &str = "Failed to fetch location data";

/// Resolves the user's location and the places around it in one call.
///
/// Never returns an error: pending permission or settings become
/// [`FetchOutcome::NoOp`], and anything unexpected from either collaborator,
/// panics included, becomes [`FetchOutcome::Failure`]. No retries happen here;
/// callers re-invoke on their next trigger.
#[derive(Clone)]
pub struct LocationService {
    provider: Arc<dyn LocationProvider>,
    places: Arc<dyn PlaceSource>,
}

enum Resolution {
    Pending(PendingReason),
    Failed { code: &'static str, detail: String },
}

impl Resolution {
    fn panicked(payload: &(dyn Any + Send)) -> Self {
        Resolution::Failed {
            code: "panic",
            detail: panic_message(payload),
        }
    }
}

impl From<ServiceError> for Resolution {
    fn from(error: ServiceError) -> Self {
        Resolution::Failed {
            code: error.code(),
            detail: error.to_string(),
        }
    }
}

impl LocationService {
    pub fn new(provider: Arc<dyn LocationProvider>, places: Arc<dyn PlaceSource>) -> Self {
        Self { provider, places }
    }

    #[instrument(skip(self), fields(fetch_id = %Uuid::new_v4()))]
    pub async fn fetch_location_and_places(&self) -> FetchOutcome {
        match self.resolve().await {
            Ok(result) => {
                info!(
                    source = ?result.source,
                    places = result.places.len(),
                    "location and places resolved"
                );
                FetchOutcome::Success(result)
            }
            Err(Resolution::Pending(reason)) => {
                info!(%reason, "location not available yet");
                FetchOutcome::NoOp { reason }
            }
            Err(Resolution::Failed { code, detail }) => {
                error!(code, %detail, "location fetch failed");
                FetchOutcome::Failure {
                    message: format!("{}: {}", FAILURE_PREFIX, detail),
                }
            }
        }
    }

    async fn resolve(&self) -> Result<LocationResult, Resolution> {
        let (location, source) = match guarded(|| self.provider.current_location()).await? {
            LocationStatus::Ready { coordinate, source } => (coordinate, source),
            LocationStatus::PermissionPending => {
                return Err(Resolution::Pending(PendingReason::PermissionPending))
            }
            LocationStatus::ServicesDisabled => {
                return Err(Resolution::Pending(PendingReason::LocationServicesDisabled))
            }
        };

        let mut places = guarded(|| self.places.nearby(location)).await?;
        // sources other than the generator are not required to sort
        places.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));

        Ok(LocationResult {
            location,
            source,
            places,
        })
    }
}

/// Calls a collaborator and awaits it, turning its error or a panic into a failure.
async fn guarded<T, F, Fut>(call: F) -> Result<T, Resolution>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    let future = std::panic::catch_unwind(AssertUnwindSafe(call))
        .map_err(|payload| Resolution::panicked(payload.as_ref()))?;
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result.map_err(Resolution::from),
        Err(payload) => Err(Resolution::panicked(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unexpected panic".to_string()
    }
}
