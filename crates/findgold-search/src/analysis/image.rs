use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;

use crate::analysis::message_payload;
use crate::client::{text_field, BackendClient};
use crate::error::SearchError;

const IMAGE_PROMPT: &str = "Analysez cette image pour identifier les caractéristiques géologiques et géomorphologiques favorables à la présence d'or. Concentrez-vous sur les formations naturelles et les indices visibles.";

/// Padding is optional in the wild; accept both forms when validating.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Returned instead of an error when an image cannot be analyzed.
pub const PROSPECTING_GUIDE: &str = "Pour analyser un site d'orpaillage, recherchez les indices suivants :

1. Géologie favorable :
   - Affleurements rocheux avec veines de quartz
   - Zones de contact entre différentes formations
   - Signes d'altération hydrothermale

2. Morphologie du cours d'eau :
   - Méandres prononcés où l'or s'accumule
   - Zones de ralentissement naturel
   - Points de confluence avec des affluents

3. Indices physiques :
   - Bancs de gravier et sable noir
   - Marmites de géant dans le lit rocheux
   - Dépôts alluviaux anciens

4. Conseils pratiques :
   - Privilégiez les zones en aval des anciennes mines
   - Examinez les berges intérieures des méandres
   - Recherchez les points bas naturels du lit

N'hésitez pas à partager une nouvelle photo pour une analyse plus précise.";

/// Turns an image into a data URI the model accepts.
///
/// Data URIs (`data:image/...`) and `http(s)://` URLs pass through
/// untouched. Anything else must be bare base64 and is labelled as JPEG.
///
/// # Errors
///
/// Returns [`SearchError::InvalidImage`] if the text is not valid base64.
pub fn format_image(image: &str) -> Result<String, SearchError> {
    if image.starts_with("data:image/")
        || image.starts_with("https://")
        || image.starts_with("http://")
    {
        return Ok(image.to_string());
    }

    let compact: String = image.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(SearchError::InvalidImage("empty image data".to_string()));
    }
    LENIENT_STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| SearchError::InvalidImage(format!("invalid base64: {e}")))?;

    Ok(format!("data:image/jpeg;base64,{compact}"))
}

/// Encodes raw image bytes as a `data:` URI with the given MIME type.
#[must_use]
pub fn encode_image_bytes(bytes: &[u8], mime: &str) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Free-form geological reading of a photo.
///
/// Never fails: an invalid image or a backend error returns
/// [`PROSPECTING_GUIDE`], a reply without description returns a short
/// "no analysis" notice.
pub async fn analyze_image(client: &BackendClient, image: &str) -> String {
    match try_analyze_image(client, image).await {
        Ok(description) => description,
        Err(e) => {
            tracing::error!(error = %e, "image analysis failed, returning prospecting guide");
            PROSPECTING_GUIDE.to_string()
        }
    }
}

async fn try_analyze_image(client: &BackendClient, image: &str) -> Result<String, SearchError> {
    let image = format_image(image)?;
    let message = client.analyze_image(&image, IMAGE_PROMPT).await?;
    let payload = message_payload(message);

    Ok(text_field(&payload, "description")
        .unwrap_or("Aucune analyse disponible")
        .to_string())
}
