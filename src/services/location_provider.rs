use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::errors::ServiceError;
use crate::models::{Coordinate, FixSource};
use crate::platform::{Accuracy, LocationPlatform};

/// Fixed coordinate returned when a live fix cannot be obtained.
pub const DEFAULT_FALLBACK: Coordinate = Coordinate::new_unchecked(28.4595, 77.0266);

/// What the provider could determine about the user's position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationStatus {
    Ready {
        coordinate: Coordinate,
        source: FixSource,
    },
    /// A permission prompt has been raised; ask again later.
    PermissionPending,
    /// Location services are switched off; ask again later.
    ServicesDisabled,
}

/// Resolves the user's current coordinate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_location(&self) -> Result<LocationStatus, ServiceError>;
}

/// Options for [`DeviceLocationProvider`]
#[derive(Debug, Clone)]
pub struct ProviderOptions {
    pub fallback: Coordinate,
    pub accuracy: Accuracy,
    pub open_settings_when_disabled: bool,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            fallback: DEFAULT_FALLBACK,
            accuracy: Accuracy::High,
            open_settings_when_disabled: true,
        }
    }
}

/// Permission and settings state machine over a [`LocationPlatform`].
///
/// The only state kept between calls is whether the permission prompt has
/// been raised, so overlapping calls stay independent.
pub struct DeviceLocationProvider<P> {
    platform: Arc<P>,
    options: ProviderOptions,
    permission_requested: AtomicBool,
}

impl<P: LocationPlatform> DeviceLocationProvider<P> {
    pub fn new(platform: Arc<P>) -> Self {
        Self::with_options(platform, ProviderOptions::default())
    }

    pub fn with_options(platform: Arc<P>, options: ProviderOptions) -> Self {
        Self {
            platform,
            options,
            permission_requested: AtomicBool::new(false),
        }
    }

    pub fn options(&self) -> &ProviderOptions {
        &self.options
    }

    /// Whether the permission prompt has been raised by this provider.
    pub fn permission_requested(&self) -> bool {
        self.permission_requested.load(Ordering::SeqCst)
    }

    async fn fix_or_fallback(&self) -> LocationStatus {
        match self.platform.get_fix(self.options.accuracy).await {
            Ok(fix) if fix.coordinate.is_valid() => LocationStatus::Ready {
                coordinate: fix.coordinate,
                source: FixSource::Device,
            },
            Ok(fix) => {
                warn!(
                    latitude = fix.coordinate.latitude,
                    longitude = fix.coordinate.longitude,
                    "platform reported an invalid fix; using fallback coordinate"
                );
                self.fallback()
            }
            Err(error) => {
                warn!(%error, "location fix failed; using fallback coordinate");
                self.fallback()
            }
        }
    }

    fn fallback(&self) -> LocationStatus {
        LocationStatus::Ready {
            coordinate: self.options.fallback,
            source: FixSource::Fallback,
        }
    }
}

#[async_trait]
impl<P: LocationPlatform + 'static> LocationProvider for DeviceLocationProvider<P> {
    #[instrument(skip(self))]
    async fn current_location(&self) -> Result<LocationStatus, ServiceError> {
        if !self.platform.check_permission().await.is_granted() {
            // Prompt once. A user who declined gets the fallback from the
            // refused fix below instead of another prompt.
            if !self.permission_requested.swap(true, Ordering::SeqCst) {
                info!("location permission missing; requesting it");
                self.platform.request_permission().await;
                return Ok(LocationStatus::PermissionPending);
            }
            return Ok(self.fix_or_fallback().await);
        }

        if !self.platform.is_enabled().await {
            info!("location services disabled");
            if self.options.open_settings_when_disabled {
                self.platform.open_settings().await;
            }
            return Ok(LocationStatus::ServicesDisabled);
        }

        Ok(self.fix_or_fallback().await)
    }
}
