pub mod coordinate;
pub mod outcome;
pub mod place;

pub use coordinate::Coordinate;
pub use outcome::{FetchOutcome, PendingReason};
pub use place::{FixSource, LocationResult, Place};
