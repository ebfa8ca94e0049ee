//! Integration tests for the search and analysis services against a mocked
//! backend proxy.

use findgold_search::analysis::{
    analyze_geological_data, analyze_gold_line, analyze_image, analyze_river_for_gold,
    analyze_rocks, combine_analysis, RockAnalysis, PROSPECTING_GUIDE,
};
use findgold_search::{
    search_gold_locations, BackendClient, CitySuggestionSource, GeoApiCities, SearchError,
};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend(server: &MockServer) -> BackendClient {
    BackendClient::with_base_url(&format!("{}/api", server.uri()))
        .expect("client construction should not fail")
}

fn assistant(content: &str) -> serde_json::Value {
    serde_json::json!({ "role": "assistant", "content": content })
}

async fn mount_chat(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_analyze(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/api/analyze-image"))
        .respond_with(response)
        .mount(server)
        .await;
}

// -------------------------------------------------------------------------
// search_gold_locations
// -------------------------------------------------------------------------

#[tokio::test]
async fn search_sends_prompt_and_normalizes_answer() {
    let server = MockServer::start().await;

    let content = serde_json::json!({
        "mainSpots": [
            { "name": "Gardon d'Anduze", "coordinates": [44.05, 3.98], "rating": 5 }
        ],
        "secondarySpots": [
            { "name": "Cèze", "isMainSpot": true }
        ]
    })
    .to_string();

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(serde_json::json!({
            "messages": [{
                "role": "user",
                "content": "Identifie les meilleurs spots pour l'orpaillage autour de Alès dans un rayon de 30 km."
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(assistant(&content)))
        .expect(1)
        .mount(&server)
        .await;

    let result = search_gold_locations(&backend(&server), "  Alès ", 30)
        .await
        .expect("search");

    assert_eq!(result.main_spots.len(), 1);
    assert_eq!(result.main_spots[0].name, "Gardon d'Anduze");
    assert_eq!(result.main_spots[0].rating, 5);
    assert_eq!(result.secondary_spots.len(), 1);
    assert!(!result.secondary_spots[0].is_main_spot);
    assert_eq!(result.secondary_spots[0].kind, "cours d'eau");
}

#[tokio::test]
async fn search_clamps_radius() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(serde_json::json!({
            "messages": [{
                "role": "user",
                "content": "Identifie les meilleurs spots pour l'orpaillage autour de Foix dans un rayon de 300 km."
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(assistant("{}")))
        .expect(1)
        .mount(&server)
        .await;

    search_gold_locations(&backend(&server), "Foix", 10_000)
        .await
        .expect("search");
}

#[tokio::test]
async fn search_with_malformed_answer_uses_generic_fallback() {
    let server = MockServer::start().await;
    mount_chat(
        &server,
        ResponseTemplate::new(200).set_body_json(assistant("Désolé, je ne sais pas.")),
    )
    .await;

    let result = search_gold_locations(&backend(&server), "Lyon", 50)
        .await
        .expect("search");

    assert_eq!(result.main_spots.len(), 1);
    assert_eq!(result.main_spots[0].name, "Lyon");
    assert!(result.main_spots[0].description.contains("Limousin"));
    assert!(result.secondary_spots.is_empty());
}

#[tokio::test]
async fn search_with_backend_error_uses_error_fallback() {
    let server = MockServer::start().await;
    mount_chat(
        &server,
        ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": "Erreur lors de la communication avec OpenAI"
        })),
    )
    .await;

    let result = search_gold_locations(&backend(&server), "Lyon", 50)
        .await
        .expect("search never fails once sent");

    assert_eq!(result.main_spots[0].name, "Lyon");
    assert!(result.main_spots[0].description.contains("erreur"));
}

#[tokio::test]
async fn search_without_content_uses_error_fallback() {
    let server = MockServer::start().await;
    mount_chat(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "role": "assistant", "content": null })),
    )
    .await;

    let result = search_gold_locations(&backend(&server), "Limoges", 50)
        .await
        .expect("search");
    assert!(result.main_spots[0].description.contains("erreur"));
}

// -------------------------------------------------------------------------
// analyses
// -------------------------------------------------------------------------

#[tokio::test]
async fn analyze_image_formats_bare_base64_and_returns_description() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/analyze-image"))
        .and(body_partial_json(serde_json::json!({
            "image": "data:image/jpeg;base64,/9j/4AAQ"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(assistant("Veines de quartz visibles.")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let text = analyze_image(&backend(&server), "/9j/4AAQ").await;
    assert_eq!(text, "Veines de quartz visibles.");
}

#[tokio::test]
async fn analyze_image_sends_urls_unchanged() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/analyze-image"))
        .and(body_partial_json(serde_json::json!({
            "image": "https://img.example/river.jpg"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(assistant("Méandre marqué.")))
        .expect(1)
        .mount(&server)
        .await;

    let text = analyze_image(&backend(&server), "https://img.example/river.jpg").await;
    assert_eq!(text, "Méandre marqué.");
}

#[tokio::test]
async fn analyze_image_returns_guide_on_backend_error() {
    let server = MockServer::start().await;
    mount_analyze(&server, ResponseTemplate::new(500)).await;

    let text = analyze_image(&backend(&server), "data:image/png;base64,AAAA").await;
    assert_eq!(text, PROSPECTING_GUIDE);
}

#[tokio::test]
async fn analyze_rocks_reads_structured_answer() {
    let server = MockServer::start().await;
    let content = serde_json::json!({
        "rockTypes": [{ "name": "Quartz", "description": "Filon laiteux", "goldPotential": 0.6 }],
        "overallPotential": 0.4,
        "recommendations": ["Suivre le filon"]
    })
    .to_string();
    mount_analyze(&server, ResponseTemplate::new(200).set_body_json(assistant(&content))).await;

    let analysis = analyze_rocks(&backend(&server), "https://img.example/rocks.jpg").await;
    assert_eq!(analysis.rock_types.len(), 1);
    assert_eq!(analysis.rock_types[0].name, "Quartz");
    assert!((analysis.overall_potential - 0.4).abs() < f64::EPSILON);
    assert_eq!(analysis.recommendations, vec!["Suivre le filon"]);
}

#[tokio::test]
async fn analyze_rocks_reads_fenced_answer_and_repairs_entries() {
    let server = MockServer::start().await;
    let content = "```json\n{\"rockTypes\":[{\"name\":\"Quartz\",\"location\":[1,2]},{\"name\":\"Schiste\",\"location\":\"en haut à gauche\"}],\"overallPotential\":0.6}\n```";
    mount_analyze(&server, ResponseTemplate::new(200).set_body_json(assistant(content))).await;

    let analysis = analyze_rocks(&backend(&server), "https://img.example/rocks.jpg").await;
    let names: Vec<&str> = analysis.rock_types.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Quartz", "Schiste"]);
    assert!(analysis.rock_types[1].location.is_unknown());
    assert!((analysis.overall_potential - 0.6).abs() < f64::EPSILON);
}

#[tokio::test]
async fn gold_line_reads_fenced_answer() {
    let server = MockServer::start().await;
    let content = "```json\n{\"description\":\"Ligne le long du méandre\",\"modifiedImage\":\"data:image/png;base64,AAAA\",\"confidence\":0.4}\n```";
    mount_analyze(&server, ResponseTemplate::new(200).set_body_json(assistant(content))).await;

    let analysis = analyze_gold_line(&backend(&server), "https://img.example/river.jpg")
        .await
        .expect("gold line analysis");
    assert_eq!(analysis.description, "Ligne le long du méandre");
    assert_eq!(analysis.modified_image, "data:image/png;base64,AAAA");
    assert!((analysis.confidence - 0.4).abs() < f64::EPSILON);
}

#[tokio::test]
async fn analyze_rocks_falls_back_on_backend_error() {
    let server = MockServer::start().await;
    mount_analyze(&server, ResponseTemplate::new(502)).await;

    let analysis = analyze_rocks(&backend(&server), "https://img.example/rocks.jpg").await;
    assert_eq!(analysis, RockAnalysis::undetermined());
}

#[tokio::test]
async fn analyze_river_propagates_errors() {
    let server = MockServer::start().await;
    mount_analyze(&server, ResponseTemplate::new(500)).await;

    let err = analyze_river_for_gold(&backend(&server), "https://img.example/r.jpg", "Ariège")
        .await
        .expect_err("500 should propagate");
    assert!(matches!(err, SearchError::UnexpectedStatus { status: 500, .. }));
}

#[tokio::test]
async fn analyze_river_uses_prose_as_description() {
    let server = MockServer::start().await;
    mount_analyze(
        &server,
        ResponseTemplate::new(200).set_body_json(assistant("Un méandre prometteur.")),
    )
    .await;

    let analysis = analyze_river_for_gold(&backend(&server), "https://img.example/r.jpg", "Ariège")
        .await
        .expect("analysis");
    assert_eq!(analysis.description, "Un méandre prometteur.");
    assert!(analysis.points.is_empty());
}

#[tokio::test]
async fn geological_and_combined_analyses_default_when_empty() {
    let server = MockServer::start().await;
    mount_chat(&server, ResponseTemplate::new(200).set_body_json(assistant(""))).await;
    let client = backend(&server);

    assert_eq!(
        analyze_geological_data(&client, "Cévennes").await.expect("geology"),
        "Aucune analyse disponible"
    );
    assert_eq!(
        combine_analysis(&client, "image", "géologie").await.expect("combined"),
        "Aucune synthèse disponible"
    );
}

#[tokio::test]
async fn gold_line_applies_defaults() {
    let server = MockServer::start().await;
    mount_analyze(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "role": "assistant" })),
    )
    .await;

    let analysis = analyze_gold_line(&backend(&server), "data:image/jpeg;base64,AAAA")
        .await
        .expect("gold line");
    assert_eq!(
        analysis.description,
        "Ligne d'or tracée selon le flux naturel de la rivière"
    );
    assert!(analysis.modified_image.is_empty());
    assert!((analysis.confidence - 0.9).abs() < f64::EPSILON);
}

// -------------------------------------------------------------------------
// city suggestions
// -------------------------------------------------------------------------

#[tokio::test]
async fn geo_api_returns_deduplicated_names() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/communes"))
        .and(query_param("nom", "Saint-Mar"))
        .and(query_param("boost", "population"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "nom": "Saint-Martin", "code": "05149" },
            { "nom": "Saint-Marcel", "code": "71445" },
            { "nom": "Saint-Martin", "code": "32398" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let source = GeoApiCities::with_base_url(&server.uri()).expect("source");
    let cities = source.suggest("Saint-Mar").await.expect("suggestions");
    assert_eq!(cities, vec!["Saint-Martin", "Saint-Marcel"]);
}

#[tokio::test]
async fn geo_api_maps_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/communes"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let source = GeoApiCities::with_base_url(&server.uri()).expect("source");
    let err = source.suggest("Ly").await.expect_err("503");
    assert!(matches!(err, SearchError::UnexpectedStatus { status: 503, .. }));
}
