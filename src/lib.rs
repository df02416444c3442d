//! Nearby Places Library
//!
//! Resolves the user's current location through an abstract platform
//! capability and lists synthetic points of interest around it, each
//! annotated with its geodesic distance and sorted nearest first.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod errors;
pub mod geo;
pub mod models;
pub mod platform;
pub mod services;
pub mod session;

pub use errors::ServiceError;
pub use models::{Coordinate, FetchOutcome, FixSource, LocationResult, PendingReason, Place};
pub use services::{LocationService, MockPlaceGenerator, PlaceCatalog};
