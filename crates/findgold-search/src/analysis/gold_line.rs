use serde::{Deserialize, Serialize};

use crate::analysis::message_payload;
use crate::client::{text_field, BackendClient};
use crate::error::SearchError;

const GOLD_LINE_PROMPT: &str =
    "Analysez cette image de rivière et identifiez la gold line potentielle";
const DEFAULT_DESCRIPTION: &str = "Ligne d'or tracée selon le flux naturel de la rivière";
const DEFAULT_CONFIDENCE: f64 = 0.9;

/// The path heavy material follows through a river bend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoldLineAnalysis {
    pub description: String,
    /// Annotated image, empty when the model returned none.
    pub modified_image: String,
    /// 0.0 to 1.0.
    pub confidence: f64,
}

/// Traces the likely gold line on a river photo.
///
/// # Errors
///
/// Propagates backend errors from [`BackendClient::analyze_image`].
pub async fn analyze_gold_line(
    client: &BackendClient,
    image: &str,
) -> Result<GoldLineAnalysis, SearchError> {
    let message = client
        .analyze_image(image, GOLD_LINE_PROMPT)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "gold line analysis failed"))?;
    let payload = message_payload(message);

    // Zero confidence is treated like a missing value.
    let confidence = payload
        .get("confidence")
        .and_then(serde_json::Value::as_f64)
        .filter(|c| c.is_finite() && *c != 0.0)
        .map_or(DEFAULT_CONFIDENCE, |c| c.clamp(0.0, 1.0));

    Ok(GoldLineAnalysis {
        description: text_field(&payload, "description")
            .unwrap_or(DEFAULT_DESCRIPTION)
            .to_string(),
        modified_image: text_field(&payload, "modifiedImage")
            .unwrap_or_default()
            .to_string(),
        confidence,
    })
}
