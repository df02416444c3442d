use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::errors::ServiceError;

pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// A position on the Earth's surface in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Coordinate {
    #[validate(custom = "validate_latitude")]
    pub latitude: f64,
    #[validate(custom = "validate_longitude")]
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ServiceError> {
        let coordinate = Self {
            latitude,
            longitude,
        };
        if !coordinate.is_valid() {
            return Err(ServiceError::InvalidCoordinate(format!(
                "({}, {}) is outside latitude [{}, {}] / longitude [{}, {}]",
                latitude, longitude, MIN_LATITUDE, MAX_LATITUDE, MIN_LONGITUDE, MAX_LONGITUDE
            )));
        }
        Ok(coordinate)
    }

    /// Builds a coordinate without range checks. Callers own the invariant.
    pub(crate) const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (MIN_LATITUDE..=MAX_LATITUDE).contains(&self.latitude)
            && (MIN_LONGITUDE..=MAX_LONGITUDE).contains(&self.longitude)
    }

    /// Shifts the coordinate by the given deltas in degrees.
    ///
    /// Latitude clamps at the poles; longitude wraps across the antimeridian.
    pub fn offset(&self, lat_delta: f64, lng_delta: f64) -> Self {
        let latitude = (self.latitude + lat_delta).clamp(MIN_LATITUDE, MAX_LATITUDE);
        Self {
            latitude,
            longitude: wrap_longitude(self.longitude + lng_delta),
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

impl std::str::FromStr for Coordinate {
    type Err = ServiceError;

    /// Parses `"lat,lng"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s.split_once(',').ok_or_else(|| {
            ServiceError::InvalidCoordinate(format!("expected `lat,lng`, got `{}`", s))
        })?;
        let parse = |raw: &str| {
            raw.trim().parse::<f64>().map_err(|e| {
                ServiceError::InvalidCoordinate(format!("`{}` is not a number: {}", raw.trim(), e))
            })
        };
        Coordinate::new(parse(lat)?, parse(lng)?)
    }
}

fn wrap_longitude(longitude: f64) -> f64 {
    if (MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude) {
        return longitude;
    }
    let wrapped = (longitude + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid maps +180 onto -180; both name the same meridian
    if wrapped == MIN_LONGITUDE && longitude > 0.0 {
        MAX_LONGITUDE
    } else {
        wrapped
    }
}

pub(crate) fn validate_latitude(value: f64) -> Result<(), ValidationError> {
    validate_component("latitude", value, MIN_LATITUDE, MAX_LATITUDE)
}

pub(crate) fn validate_longitude(value: f64) -> Result<(), ValidationError> {
    validate_component("longitude", value, MIN_LONGITUDE, MAX_LONGITUDE)
}

fn validate_component(
    code: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    if value.is_finite() && (min..=max).contains(&value) {
        return Ok(());
    }
    let mut err = ValidationError::new(code);
    err.message = Some(format!("{} must be a finite value between {} and {}", code, min, max).into());
    Err(err)
}
