//! Normalization of raw model output into a [`GoldSearchResult`].
//!
//! The model is asked for a JSON document with `mainSpots` and
//! `secondarySpots` arrays, but nothing guarantees it complies. This module
//! never fails: a document it cannot use becomes a fixed placeholder result,
//! and a usable document has each entry repaired field by field so the
//! caller always gets fully-typed [`GoldLocation`]s.

use findgold_core::{
    Coordinates, GoldLocation, GoldOrigin, GoldSearchResult, Hotspot, ReferencedSpots,
};
use serde::Deserialize;
use serde_json::{Map, Value};

pub const DEFAULT_KIND: &str = "cours d'eau";
pub const DEFAULT_DESCRIPTION: &str = "Aucune description disponible";
pub const DEFAULT_GEOLOGY: &str = "Aucune information géologique disponible";
pub const DEFAULT_HISTORY: &str = "Aucun historique disponible";
pub const DEFAULT_RATING: u8 = 3;

const FALLBACK_KIND: &str = "rivière";
const FALLBACK_UNAVAILABLE: &str = "Information non disponible";
const FALLBACK_UNPARSEABLE_DESCRIPTION: &str = "Nous n'avons pas pu obtenir d'informations précises pour cette localisation. Essayez avec une ville plus connue ou une région aurifère comme 'Limousin', 'Cévennes', ou 'Ariège'.";
const FALLBACK_UPSTREAM_DESCRIPTION: &str = "Une erreur s'est produite lors de la recherche. Veuillez réessayer ultérieurement ou essayer avec une autre localisation.";

/// Why a placeholder result was produced. Only the description differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// The model answered, but not with a usable document.
    Unparseable,
    /// The backend could not be reached or returned nothing.
    Upstream,
}

/// Which list an entry came from. Authoritative for `is_main_spot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Main,
    Secondary,
}

impl Tier {
    fn placeholder_name(self, index: usize) -> String {
        match self {
            Tier::Main => format!("Spot principal {}", index + 1),
            Tier::Secondary => format!("Spot secondaire {}", index + 1),
        }
    }
}

/// One list entry as the model produced it. Every field is optional and
/// untyped; repair decides what survives.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawSpot {
    name: Option<Value>,
    #[serde(rename = "type")]
    kind: Option<Value>,
    coordinates: Option<Value>,
    description: Option<Value>,
    geology: Option<Value>,
    history: Option<Value>,
    rating: Option<Value>,
    sources: Option<Value>,
    hotspots: Option<Value>,
    gold_origin: Option<Value>,
    referenced_spots: Option<Value>,
}

/// Turns raw model text into a search result. Total: malformed input yields
/// [`fallback_result`] for `fallback_city` with [`FallbackReason::Unparseable`].
#[must_use]
pub fn normalize(raw_text: &str, fallback_city: &str) -> GoldSearchResult {
    match parse_document(raw_text) {
        Ok((main, secondary)) => GoldSearchResult {
            main_spots: repair_list(main, Tier::Main),
            secondary_spots: repair_list(secondary, Tier::Secondary),
        },
        Err(reason) => {
            tracing::warn!(city = fallback_city, reason, "unusable search response, using fallback");
            fallback_result(fallback_city, FallbackReason::Unparseable)
        }
    }
}

/// The fixed single-spot result shown when no real data is available.
#[must_use]
pub fn fallback_result(city: &str, reason: FallbackReason) -> GoldSearchResult {
    let description = match reason {
        FallbackReason::Unparseable => FALLBACK_UNPARSEABLE_DESCRIPTION,
        FallbackReason::Upstream => FALLBACK_UPSTREAM_DESCRIPTION,
    };

    GoldSearchResult {
        main_spots: vec![GoldLocation {
            name: city.trim().to_string(),
            kind: FALLBACK_KIND.to_string(),
            coordinates: Coordinates::default(),
            description: description.to_string(),
            geology: FALLBACK_UNAVAILABLE.to_string(),
            history: FALLBACK_UNAVAILABLE.to_string(),
            rating: DEFAULT_RATING,
            sources: Vec::new(),
            hotspots: vec![Hotspot {
                location: "Non disponible".to_string(),
                description: "Aucune information sur les points d'intérêt spécifiques".to_string(),
                source: "N/A".to_string(),
            }],
            is_main_spot: true,
            gold_origin: None,
            referenced_spots: None,
        }],
        secondary_spots: Vec::new(),
    }
}

/// Extracts the two spot lists, or names what was wrong with the document.
fn parse_document(raw_text: &str) -> Result<(Vec<Value>, Vec<Value>), &'static str> {
    let Some(Value::Object(mut doc)) = extract_json(raw_text) else {
        return Err("response is not a JSON object");
    };

    let main = take_array(&mut doc, "mainSpots").ok_or("'mainSpots' missing or not a list")?;
    let secondary =
        take_array(&mut doc, "secondarySpots").ok_or("'secondarySpots' missing or not a list")?;

    Ok((main, secondary))
}

/// Parses the whole text, or the body of a fenced ```` ```json ```` block
/// when the model wrapped its answer in Markdown.
pub(crate) fn extract_json(raw_text: &str) -> Option<Value> {
    let text = raw_text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Some(value);
    }

    let start = text.find("```")?;
    let rest = &text[start + 3..];
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let end = rest.find("```")?;
    serde_json::from_str(rest[..end].trim()).ok()
}

fn take_array(doc: &mut Map<String, Value>, key: &str) -> Option<Vec<Value>> {
    match doc.remove(key) {
        Some(Value::Array(items)) => Some(items),
        _ => None,
    }
}

fn repair_list(entries: Vec<Value>, tier: Tier) -> Vec<GoldLocation> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| repair_spot(entry, index, tier))
        .collect()
}

/// Repairs one entry. A non-object entry is rebuilt entirely from defaults
/// rather than dropped, so list positions stay stable.
fn repair_spot(entry: Value, index: usize, tier: Tier) -> GoldLocation {
    let raw: RawSpot = serde_json::from_value(entry).unwrap_or_default();

    GoldLocation {
        name: non_empty_string(raw.name).unwrap_or_else(|| tier.placeholder_name(index)),
        kind: string_or(raw.kind, DEFAULT_KIND),
        coordinates: raw
            .coordinates
            .as_ref()
            .and_then(parse_coordinates)
            .unwrap_or_default(),
        description: string_or(raw.description, DEFAULT_DESCRIPTION),
        geology: string_or(raw.geology, DEFAULT_GEOLOGY),
        history: string_or(raw.history, DEFAULT_HISTORY),
        rating: raw
            .rating
            .as_ref()
            .and_then(parse_rating)
            .unwrap_or(DEFAULT_RATING),
        sources: string_list(raw.sources.as_ref()),
        hotspots: parse_hotspots(raw.hotspots.as_ref()),
        is_main_spot: tier == Tier::Main,
        gold_origin: raw.gold_origin.as_ref().and_then(parse_gold_origin),
        referenced_spots: raw.referenced_spots.as_ref().and_then(parse_referenced_spots),
    }
}

fn non_empty_string(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    }
}

fn string_or(value: Option<Value>, default: &str) -> String {
    non_empty_string(value).unwrap_or_else(|| default.to_string())
}

fn text_of(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .unwrap_or_default()
}

/// Accepts `[lat, lng, ...]` or `{ "lat": .., "lng"|"lon": .. }`.
pub(crate) fn parse_coordinates(value: &Value) -> Option<Coordinates> {
    let (lat, lng) = match value {
        Value::Array(items) if items.len() >= 2 => (items[0].as_f64()?, items[1].as_f64()?),
        Value::Object(map) => (
            map.get("lat")?.as_f64()?,
            map.get("lng").or_else(|| map.get("lon"))?.as_f64()?,
        ),
        _ => return None,
    };

    (lat.is_finite() && lng.is_finite()).then_some(Coordinates::new(lat, lng))
}

/// Numeric (or numeric-string) ratings are rounded into 1..=5. Zero counts as
/// missing.
fn parse_rating(value: &Value) -> Option<u8> {
    let rating = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if !rating.is_finite() || rating == 0.0 {
        return None;
    }

    // Clamped to 1..=5 first, so the cast cannot truncate.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let stars = rating.round().clamp(1.0, 5.0) as u8;
    Some(stars)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_hotspots(value: Option<&Value>) -> Vec<Hotspot> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .map(|h| Hotspot {
                    location: text_of(h.get("location")),
                    description: text_of(h.get("description")),
                    source: text_of(h.get("source")),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_gold_origin(value: &Value) -> Option<GoldOrigin> {
    let map = value.as_object()?;
    Some(GoldOrigin {
        description: text_of(map.get("description")),
        brgm_data: text_of(map.get("brgmData")),
        entry_points: string_list(map.get("entryPoints")),
        affluents: string_list(map.get("affluents")),
    })
}

fn parse_referenced_spots(value: &Value) -> Option<ReferencedSpots> {
    let map = value.as_object()?;
    Some(ReferencedSpots {
        description: text_of(map.get("description")),
        locations: string_list(map.get("locations")),
        sources: string_list(map.get("sources")),
    })
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
