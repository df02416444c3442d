use serde::{Deserialize, Serialize};

use super::coordinate::Coordinate;

/// A point of interest annotated with its distance from the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub distance_meters: f64,
}

impl Place {
    /// Marker caption shown next to a place, e.g. `"245 meters away"`.
    pub fn distance_label(&self) -> String {
        format!("{} meters away", self.distance_meters.round() as u64)
    }
}

/// Where the coordinate of a [`LocationResult`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixSource {
    /// A live fix reported by the platform.
    Device,
    /// The configured constant used when no live fix could be obtained.
    Fallback,
}

/// The user's coordinate together with nearby places, ascending by distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationResult {
    pub location: Coordinate,
    pub source: FixSource,
    pub places: Vec<Place>,
}

impl LocationResult {
    pub fn nearest(&self) -> Option<&Place> {
        self.places.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(distance_meters: f64) -> Place {
        Place {
            id: "place_0".into(),
            name: "Park".into(),
            coordinate: Coordinate::new(28.46, 77.02).unwrap(),
            distance_meters,
        }
    }

    #[test]
    fn distance_label_rounds_to_whole_meters() {
        assert_eq!(place(244.6).distance_label(), "245 meters away");
        assert_eq!(place(0.2).distance_label(), "0 meters away");
    }

    #[test]
    fn place_serializes_with_flat_coordinate() {
        let json = serde_json::to_value(place(10.0)).unwrap();
        assert_eq!(json["latitude"], 28.46);
        assert_eq!(json["longitude"], 77.02);
        assert_eq!(json["distance_meters"], 10.0);
        assert!(json.get("coordinate").is_none());
    }
}
