use findgold_core::Coordinates;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::{field_or_default, message_payload};
use crate::client::BackendClient;
use crate::error::SearchError;
use crate::normalize::parse_coordinates;

const ROCKS_PROMPT: &str =
    "Analysez les roches présentes sur cette image et évaluez leur potentiel aurifère.";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RockType {
    pub name: String,
    pub description: String,
    pub gold_potential: f64,
    /// Position of the rock in the photo or on the ground, when given.
    pub location: Coordinates,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RockAnalysis {
    pub rock_types: Vec<RockType>,
    pub overall_potential: f64,
    pub recommendations: Vec<String>,
}

impl RockAnalysis {
    /// Result shown when the photo could not be analyzed.
    #[must_use]
    pub fn undetermined() -> Self {
        Self {
            rock_types: vec![RockType {
                name: "Indéterminé".to_string(),
                description: "Impossible d'analyser les roches sur l'image".to_string(),
                gold_potential: 0.0,
                location: Coordinates::default(),
            }],
            overall_potential: 0.0,
            recommendations: vec![
                "Prenez une nouvelle photo avec un meilleur éclairage".to_string(),
                "Assurez-vous que les roches sont bien visibles".to_string(),
                "Incluez un objet pour l'échelle".to_string(),
            ],
        }
    }
}

/// Identifies rocks in a photo and rates their gold potential.
///
/// Never fails: a backend error yields [`RockAnalysis::undetermined`].
pub async fn analyze_rocks(client: &BackendClient, image_url: &str) -> RockAnalysis {
    match try_analyze_rocks(client, image_url).await {
        Ok(analysis) => analysis,
        Err(e) => {
            tracing::error!(error = %e, "rock analysis failed, returning undetermined result");
            RockAnalysis::undetermined()
        }
    }
}

async fn try_analyze_rocks(
    client: &BackendClient,
    image_url: &str,
) -> Result<RockAnalysis, SearchError> {
    let message = client.analyze_image(image_url, ROCKS_PROMPT).await?;
    let payload = message_payload(message);

    Ok(RockAnalysis {
        rock_types: parse_rock_types(payload.get("rockTypes")),
        overall_potential: field_or_default(&payload, "overallPotential"),
        recommendations: field_or_default(&payload, "recommendations"),
    })
}

/// Repairs each entry on its own so one badly shaped rock does not discard
/// the others. Bare strings are taken as names; other non-objects are dropped.
fn parse_rock_types(value: Option<&Value>) -> Vec<RockType> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(RockType {
                name: text(map.get("name")),
                description: text(map.get("description")),
                gold_potential: map
                    .get("goldPotential")
                    .and_then(parse_potential)
                    .unwrap_or_default(),
                location: map
                    .get("location")
                    .and_then(parse_coordinates)
                    .unwrap_or_default(),
            }),
            Value::String(name) if !name.trim().is_empty() => Some(RockType {
                name: name.clone(),
                ..RockType::default()
            }),
            _ => None,
        })
        .collect()
}

fn text(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .unwrap_or_default()
}

/// Numbers or numeric strings, kept within `0..=1`.
fn parse_potential(value: &Value) -> Option<f64> {
    let potential = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    potential.is_finite().then_some(potential.clamp(0.0, 1.0))
}
