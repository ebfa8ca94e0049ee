//! Gold-spot search around a city.

use findgold_core::GoldSearchResult;

use crate::client::{text_field, user_message, BackendClient};
use crate::error::SearchError;
use crate::normalize::{fallback_result, normalize, FallbackReason};

pub const DEFAULT_RADIUS_KM: u32 = 50;
pub const MAX_RADIUS_KM: u32 = 300;

/// Prompt sent to the model for a search.
#[must_use]
pub fn search_prompt(city: &str, radius_km: u32) -> String {
    format!(
        "Identifie les meilleurs spots pour l'orpaillage autour de {city} dans un rayon de {radius_km} km."
    )
}

/// Asks the model for prospecting spots within `radius_km` of `city`.
///
/// Whatever happens after the request is sent, a renderable result comes
/// back: backend failures and empty answers produce the
/// [`FallbackReason::Upstream`] placeholder, malformed answers the
/// [`FallbackReason::Unparseable`] one. The radius is clamped to
/// `0..=MAX_RADIUS_KM`.
///
/// # Errors
///
/// Returns [`SearchError::EmptyQuery`] if `city` is blank.
pub async fn search_gold_locations(
    client: &BackendClient,
    city: &str,
    radius_km: u32,
) -> Result<GoldSearchResult, SearchError> {
    let city = city.trim();
    if city.is_empty() {
        return Err(SearchError::EmptyQuery);
    }

    let radius_km = radius_km.min(MAX_RADIUS_KM);
    tracing::info!(city, radius_km, "searching gold locations");

    let message = match client
        .chat(&[user_message(&search_prompt(city, radius_km))])
        .await
    {
        Ok(message) => message,
        Err(e) => {
            tracing::error!(city, error = %e, "gold search request failed");
            return Ok(fallback_result(city, FallbackReason::Upstream));
        }
    };

    let Some(content) = text_field(&message, "content") else {
        tracing::error!(city, "gold search response had no content");
        return Ok(fallback_result(city, FallbackReason::Upstream));
    };

    let result = normalize(content, city);
    tracing::info!(
        city,
        main = result.main_spots.len(),
        secondary = result.secondary_spots.len(),
        "gold search complete"
    );
    Ok(result)
}
