use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::{field_or_default, message_payload};
use crate::client::{text_field, user_message, BackendClient};
use crate::error::SearchError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiverAnalysis {
    pub description: String,
    /// Points of interest as annotated by the model; shape varies by answer.
    pub points: Vec<Value>,
}

/// Reads a river section photo for gold-trapping features.
///
/// # Errors
///
/// Propagates backend errors from [`BackendClient::analyze_image`].
pub async fn analyze_river_for_gold(
    client: &BackendClient,
    image_url: &str,
    river_name: &str,
) -> Result<RiverAnalysis, SearchError> {
    let prompt = format!(
        "Analysez cette section de la rivière {river_name} en détail pour identifier les formations géologiques et caractéristiques fluviales favorables à l'accumulation d'or."
    );
    let message = client.analyze_image(image_url, &prompt).await.inspect_err(
        |e| tracing::error!(river = river_name, error = %e, "river analysis failed"),
    )?;
    let payload = message_payload(message);

    Ok(RiverAnalysis {
        description: text_field(&payload, "description")
            .unwrap_or_default()
            .to_string(),
        points: field_or_default(&payload, "points"),
    })
}

/// Asks for the geological context of a place and its gold potential.
///
/// # Errors
///
/// Propagates backend errors from [`BackendClient::chat`].
pub async fn analyze_geological_data(
    client: &BackendClient,
    location: &str,
) -> Result<String, SearchError> {
    let prompt = format!(
        "Analysez le contexte géologique de {location} pour évaluer le potentiel aurifère."
    );
    let message = client
        .chat(&[user_message(&prompt)])
        .await
        .inspect_err(|e| tracing::error!(location, error = %e, "geological analysis failed"))?;

    Ok(text_field(&message, "content")
        .unwrap_or("Aucune analyse disponible")
        .to_string())
}

/// Merges an image reading and a geological reading into one assessment.
///
/// # Errors
///
/// Propagates backend errors from [`BackendClient::chat`].
pub async fn combine_analysis(
    client: &BackendClient,
    image_analysis: &str,
    geological_analysis: &str,
) -> Result<String, SearchError> {
    let prompt = format!(
        "Combinez ces analyses pour une évaluation complète :\nImage: {image_analysis}\nGéologie: {geological_analysis}"
    );
    let message = client
        .chat(&[user_message(&prompt)])
        .await
        .inspect_err(|e| tracing::error!(error = %e, "combined analysis failed"))?;

    Ok(text_field(&message, "content")
        .unwrap_or("Aucune synthèse disponible")
        .to_string())
}
