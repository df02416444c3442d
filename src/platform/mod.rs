/*!
 * # Location platform capability
 *
 * The device-facing seam. Everything the provider needs from the host OS
 * (permission state, the location settings switch, and a position fix) goes
 * through [`LocationPlatform`], so the rest of the crate runs without a device.
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Coordinate;

pub mod simulated;

pub use simulated::SimulatedPlatform;

/// Errors a platform fix request can fail with
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlatformError {
    #[error("location request timed out")]
    Timeout,
    #[error("no location fix available")]
    NoFixAvailable,
    #[error("location hardware error: {0}")]
    Hardware(String),
    #[error("location permission revoked")]
    PermissionRevoked,
}

/// Current grant state of the location permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

/// Requested fix quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accuracy {
    #[default]
    High,
    Balanced,
    LowPower,
}

impl std::str::FromStr for Accuracy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "high" => Ok(Accuracy::High),
            "balanced" => Ok(Accuracy::Balanced),
            "low_power" => Ok(Accuracy::LowPower),
            other => Err(format!(
                "unknown accuracy `{}`; expected one of: high, balanced, low_power",
                other
            )),
        }
    }
}

/// A single position reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub coordinate: Coordinate,
    /// Horizontal accuracy radius in meters, when the platform reports one
    pub accuracy_meters: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl Fix {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            accuracy_meters: None,
            timestamp: Utc::now(),
        }
    }
}

/// Host location capability.
///
/// `get_fix` implementations acquire their location handle for the duration
/// of the call and must release it on every exit path, including when the
/// returned future is dropped before completion.
#[async_trait]
pub trait LocationPlatform: Send + Sync {
    async fn check_permission(&self) -> PermissionStatus;

    /// Raises the permission prompt. The answer is observed through a later
    /// `check_permission`, never returned here.
    async fn request_permission(&self);

    /// Whether any location provider (GPS or network) is switched on.
    async fn is_enabled(&self) -> bool;

    /// Opens the system location settings screen.
    async fn open_settings(&self);

    /// Best-effort current fix. Timeouts are the platform's own.
    async fn get_fix(&self, accuracy: Accuracy) -> Result<Fix, PlatformError>;
}
