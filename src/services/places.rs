use std::path::Path;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::errors::ServiceError;
use crate::geo;
use crate::models::{Coordinate, Place};

/// One named offset, in degrees, from the user's coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub lat_offset: f64,
    pub lng_offset: f64,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, lat_offset: f64, lng_offset: f64) -> Self {
        Self {
            name: name.into(),
            lat_offset,
            lng_offset,
        }
    }
}

static DEFAULT_ENTRIES: Lazy<Vec<CatalogEntry>> = Lazy::new(|| {
    vec![
        CatalogEntry::new("Movie Theatre", 0.002, 0.001),
        CatalogEntry::new("Park", 0.005, -0.003),
        CatalogEntry::new("Library", -0.003, 0.004),
        CatalogEntry::new("Pizza Hut", 0.001, -0.002),
        CatalogEntry::new("Gym", -0.004, -0.001),
        CatalogEntry::new("Shopping Mall", 0.006, 0.005),
        CatalogEntry::new("Hospital", -0.002, 0.003),
        CatalogEntry::new("Metro", 0.003, -0.004),
        CatalogEntry::new("Restaurant", 0.004, 0.002),
        CatalogEntry::new("Pharmacy", -0.001, -0.003),
    ]
});

/// Table of synthetic places the generator lays around a center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CatalogEntry>", into = "Vec<CatalogEntry>")]
pub struct PlaceCatalog {
    entries: Vec<CatalogEntry>,
}

impl TryFrom<Vec<CatalogEntry>> for PlaceCatalog {
    type Error = ServiceError;

    fn try_from(entries: Vec<CatalogEntry>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<PlaceCatalog> for Vec<CatalogEntry> {
    fn from(catalog: PlaceCatalog) -> Self {
        catalog.entries
    }
}

impl Default for PlaceCatalog {
    fn default() -> Self {
        Self {
            entries: DEFAULT_ENTRIES.clone(),
        }
    }
}

impl PlaceCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, ServiceError> {
        let catalog = Self { entries };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Loads a catalog from a JSON array of `{name, lat_offset, lng_offset}`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&raw)?;
        let catalog = Self::new(entries)?;
        info!(path = %path.display(), entries = catalog.len(), "loaded place catalog");
        Ok(catalog)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn validate(&self) -> Result<(), ServiceError> {
        if self.entries.is_empty() {
            return Err(ServiceError::Catalog("catalog has no entries".into()));
        }
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(ServiceError::Catalog(format!(
                    "entry {} has a blank name",
                    index
                )));
            }
            if !entry.lat_offset.is_finite() || !entry.lng_offset.is_finite() {
                return Err(ServiceError::Catalog(format!(
                    "entry {} ({}) has a non-finite offset",
                    index, entry.name
                )));
            }
        }
        Ok(())
    }
}

/// Source of places near a coordinate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaceSource: Send + Sync {
    async fn nearby(&self, center: Coordinate) -> Result<Vec<Place>, ServiceError>;
}

/// Lays the catalog around the center and sorts by distance.
#[derive(Debug, Clone, Default)]
pub struct MockPlaceGenerator {
    catalog: PlaceCatalog,
}

impl MockPlaceGenerator {
    pub fn new(catalog: PlaceCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &PlaceCatalog {
        &self.catalog
    }

    /// One place per catalog entry, ascending by distance. Ties keep catalog order.
    pub fn generate(&self, center: &Coordinate) -> Vec<Place> {
        let mut places: Vec<Place> = self
            .catalog
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let coordinate = center.offset(entry.lat_offset, entry.lng_offset);
                Place {
                    id: format!("place_{}", index),
                    name: entry.name.clone(),
                    distance_meters: geo::distance_meters(center, &coordinate),
                    coordinate,
                }
            })
            .collect();

        places.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));
        places
    }
}

#[async_trait]
impl PlaceSource for MockPlaceGenerator {
    #[instrument(skip(self), fields(catalog_size = self.catalog.len()))]
    async fn nearby(&self, center: Coordinate) -> Result<Vec<Place>, ServiceError> {
        let places = self.generate(&center);
        debug!(count = places.len(), "generated nearby places");
        Ok(places)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fallback() -> Coordinate {
        Coordinate::new(28.4595, 77.0266).unwrap()
    }

    #[test]
    fn generates_one_place_per_entry_sorted_by_distance() {
        let places = MockPlaceGenerator::default().generate(&fallback());
        assert_eq!(places.len(), 10);
        assert!(places
            .windows(2)
            .all(|pair| pair[0].distance_meters <= pair[1].distance_meters));
        assert_eq!(places[0].name, "Pizza Hut");
        assert_eq!(places[0].id, "place_3");
        assert_eq!(places.last().map(|p| p.name.as_str()), Some("Shopping Mall"));
    }

    #[test]
    fn coordinates_are_center_plus_offset() {
        let center = fallback();
        let places = MockPlaceGenerator::default().generate(&center);
        let theatre = places.iter().find(|p| p.id == "place_0").unwrap();
        assert_eq!(theatre.name, "Movie Theatre");
        assert!((theatre.coordinate.latitude - (center.latitude + 0.002)).abs() < 1e-12);
        assert!((theatre.coordinate.longitude - (center.longitude + 0.001)).abs() < 1e-12);
    }

    #[test]
    fn ties_keep_catalog_order() {
        let catalog = PlaceCatalog::new(vec![
            CatalogEntry::new("North", 0.001, 0.0),
            CatalogEntry::new("Here", 0.0, 0.0),
            CatalogEntry::new("North again", 0.001, 0.0),
        ])
        .unwrap();
        let places = MockPlaceGenerator::new(catalog).generate(&fallback());
        let ids: Vec<_> = places.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["place_1", "place_0", "place_2"]);
    }

    #[test]
    fn rejects_invalid_catalogs() {
        assert!(PlaceCatalog::new(vec![]).is_err());
        assert!(PlaceCatalog::new(vec![CatalogEntry::new("  ", 0.0, 0.0)]).is_err());
        assert!(PlaceCatalog::new(vec![CatalogEntry::new("Cafe", f64::NAN, 0.0)]).is_err());
    }

    #[test]
    fn deserializing_a_catalog_validates_it() {
        assert!(serde_json::from_str::<PlaceCatalog>("[]").is_err());
        let blank = r#"[{"name": "  ", "lat_offset": 0.001, "lng_offset": 0.0}]"#;
        let err = serde_json::from_str::<PlaceCatalog>(blank).unwrap_err();
        assert!(err.to_string().contains("blank name"), "got {}", err);

        let raw = r#"[{"name":"Cafe","lat_offset":0.001,"lng_offset":-0.002}]"#;
        let catalog: PlaceCatalog = serde_json::from_str(raw).unwrap();
        assert_eq!(catalog.entries()[0], CatalogEntry::new("Cafe", 0.001, -0.002));
        assert_eq!(serde_json::to_string(&catalog).unwrap(), raw);
    }

    #[test]
    fn loads_catalog_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "Cafe", "lat_offset": 0.001, "lng_offset": 0.0}},
                {{"name": "Bakery", "lat_offset": -0.002, "lng_offset": 0.001}}]"#
        )
        .unwrap();

        let catalog = PlaceCatalog::from_json_file(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.entries()[1].name, "Bakery");
    }

    #[test]
    fn missing_catalog_file_is_an_io_error() {
        let err = PlaceCatalog::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ServiceError::Io(_)));
    }

    #[tokio::test]
    async fn place_source_matches_generate() {
        let generator = MockPlaceGenerator::default();
        let via_trait = generator.nearby(fallback()).await.unwrap();
        assert_eq!(via_trait, generator.generate(&fallback()));
    }
}
