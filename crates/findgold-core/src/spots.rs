//! Prospecting spot types returned by a gold search.
//!
//! JSON field names follow the camelCase shape the model is prompted with
//! (`isMainSpot`, `goldOrigin`, ...), so a normalized result serializes back
//! into the same document format it was parsed from.

use serde::{Deserialize, Serialize};

/// Latitude/longitude pair, serialized as a two-element array `[lat, lng]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `true` for the `(0, 0)` placeholder used when the model gave no position.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.lat == 0.0 && self.lng == 0.0
    }

    /// Google Maps link centred on this position.
    #[must_use]
    pub fn maps_url(&self) -> String {
        format!("https://www.google.com/maps?q={},{}&z=14", self.lat, self.lng)
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.lat, c.lng]
    }
}

/// A point of interest within a spot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    /// Where exactly, e.g. "inner bend downstream of the bridge".
    pub location: String,
    /// Why it is worth a look.
    pub description: String,
    /// BRGM reference or field report.
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoldOrigin {
    pub description: String,
    pub brgm_data: String,
    pub entry_points: Vec<String>,
    pub affluents: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferencedSpots {
    pub description: String,
    pub locations: Vec<String>,
    pub sources: Vec<String>,
}

/// A candidate prospecting site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoldLocation {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Coordinates,
    pub description: String,
    pub geology: String,
    pub history: String,
    /// 1 to 5.
    pub rating: u8,
    pub sources: Vec<String>,
    pub hotspots: Vec<Hotspot>,
    pub is_main_spot: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gold_origin: Option<GoldOrigin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_spots: Option<ReferencedSpots>,
}

impl GoldLocation {
    /// Rating as star glyphs, always between one and five stars.
    #[must_use]
    pub fn rating_stars(&self) -> String {
        "⭐".repeat(usize::from(self.rating.clamp(1, 5)))
    }
}

/// Ranked search result: top candidates and the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoldSearchResult {
    pub main_spots: Vec<GoldLocation>,
    pub secondary_spots: Vec<GoldLocation>,
}

impl GoldSearchResult {
    /// Total number of spots across both tiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.main_spots.len() + self.secondary_spots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.main_spots.is_empty() && self.secondary_spots.is_empty()
    }
}
