// Location resolution
pub mod location;
pub mod location_provider;

// Nearby places
pub mod places;

pub use location::LocationService;
pub use location_provider::{
    DeviceLocationProvider, LocationProvider, LocationStatus, ProviderOptions, DEFAULT_FALLBACK,
};
pub use places::{CatalogEntry, MockPlaceGenerator, PlaceCatalog, PlaceSource};
