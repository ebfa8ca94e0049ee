//! Command handlers for the CLI.
//!
//! Each handler talks to the backend proxy through a [`BackendClient`] and
//! prints either a text rendering or, with `--json`, the normalized value.

use std::path::Path;
use std::sync::Arc;

use findgold_search::analysis::{
    analyze_geological_data, analyze_gold_line, analyze_image, analyze_river_for_gold,
    analyze_rocks, encode_image_bytes,
};
use findgold_search::{
    search_gold_locations, BackendClient, GeoApiCities, SuggestionDebouncer, SuggestionEvent,
};
use serde::Serialize;

use crate::render;

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Guess the image MIME type from a file extension, defaulting to JPEG.
pub(crate) fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        _ => "image/jpeg",
    }
}

/// Resolve an image argument: URLs and data URLs pass through, anything else
/// is read from disk and encoded as a data URL.
pub(crate) fn load_image(arg: &str) -> anyhow::Result<String> {
    if arg.starts_with("http://") || arg.starts_with("https://") || arg.starts_with("data:") {
        return Ok(arg.to_string());
    }
    let path = Path::new(arg);
    let bytes = std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("failed to read image {}: {e}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "loaded image from disk");
    Ok(encode_image_bytes(&bytes, mime_for_path(path)))
}

pub(crate) async fn run_search(
    client: &BackendClient,
    city: &str,
    radius_km: u32,
    json: bool,
) -> anyhow::Result<()> {
    let result = search_gold_locations(client, city, radius_km).await?;
    if json {
        return print_json(&result);
    }
    println!("Recherche autour de {} ({radius_km} km)\n", city.trim());
    print!("{}", render::search_result(&result));
    Ok(())
}

pub(crate) async fn run_analyze_image(
    client: &BackendClient,
    image: &str,
    json: bool,
) -> anyhow::Result<()> {
    let image = load_image(image)?;
    let description = analyze_image(client, &image).await;
    if json {
        return print_json(&serde_json::json!({ "description": description }));
    }
    println!("{description}");
    Ok(())
}

pub(crate) async fn run_rocks(
    client: &BackendClient,
    image: &str,
    json: bool,
) -> anyhow::Result<()> {
    let image = load_image(image)?;
    let analysis = analyze_rocks(client, &image).await;
    if json {
        return print_json(&analysis);
    }
    print!("{}", render::rocks(&analysis));
    Ok(())
}

pub(crate) async fn run_river(
    client: &BackendClient,
    image: &str,
    name: &str,
    json: bool,
) -> anyhow::Result<()> {
    let image = load_image(image)?;
    let analysis = analyze_river_for_gold(client, &image, name).await?;
    if json {
        return print_json(&analysis);
    }
    print!("{}", render::river(&analysis));
    Ok(())
}

pub(crate) async fn run_geology(
    client: &BackendClient,
    location: &str,
    json: bool,
) -> anyhow::Result<()> {
    let analysis = analyze_geological_data(client, location).await?;
    if json {
        return print_json(&serde_json::json!({ "analysis": analysis }));
    }
    println!("{analysis}");
    Ok(())
}

pub(crate) async fn run_gold_line(
    client: &BackendClient,
    image: &str,
    json: bool,
) -> anyhow::Result<()> {
    let image = load_image(image)?;
    let analysis = analyze_gold_line(client, &image).await?;
    if json {
        return print_json(&analysis);
    }
    print!("{}", render::gold_line(&analysis));
    Ok(())
}

/// Feed `text` through the debouncer as a single keystroke and wait for the
/// settled outcome.
pub(crate) async fn run_suggest(
    geo_api_url: Option<&str>,
    text: &str,
    json: bool,
) -> anyhow::Result<()> {
    let source = match geo_api_url {
        Some(url) => GeoApiCities::with_base_url(url)?,
        None => GeoApiCities::new()?,
    };
    let (mut debouncer, mut events) = SuggestionDebouncer::new(Arc::new(source));
    debouncer.on_input(text);

    while let Some(event) = events.recv().await {
        match event {
            SuggestionEvent::Loading { query } => {
                tracing::debug!(query, "waiting for suggestions");
            }
            SuggestionEvent::Suggestions { cities, .. } => {
                if json {
                    return print_json(&cities);
                }
                if cities.is_empty() {
                    println!("Aucune ville trouvée.");
                }
                for city in cities {
                    println!("{city}");
                }
                return Ok(());
            }
            SuggestionEvent::Failed { query, error } => {
                anyhow::bail!("city lookup for {query:?} failed: {error}");
            }
            SuggestionEvent::Cleared => {
                if json {
                    return print_json(&Vec::<String>::new());
                }
                println!("Saisissez au moins 2 caractères.");
                return Ok(());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for_path(Path::new("spot.PNG")), "image/png");
        assert_eq!(mime_for_path(Path::new("spot.webp")), "image/webp");
        assert_eq!(mime_for_path(Path::new("spot.jpg")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("spot")), "image/jpeg");
    }

    #[test]
    fn urls_pass_through_unchanged() {
        assert_eq!(
            load_image("https://img.example/river.jpg").expect("url"),
            "https://img.example/river.jpg"
        );
        assert_eq!(
            load_image("data:image/png;base64,AAAA").expect("data url"),
            "data:image/png;base64,AAAA"
        );
    }

    #[test]
    fn files_are_encoded_as_data_urls() {
        let path = std::env::temp_dir().join(format!("findgold-cli-{}.png", std::process::id()));
        std::fs::write(&path, b"abc").expect("write temp image");
        let encoded = load_image(path.to_str().expect("utf-8 path")).expect("encode");
        std::fs::remove_file(&path).ok();
        assert_eq!(encoded, "data:image/png;base64,YWJj");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_image("/definitely/not/here.jpg").expect_err("missing file");
        assert!(err.to_string().contains("failed to read image"));
    }
}
