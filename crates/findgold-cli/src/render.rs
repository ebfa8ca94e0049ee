//! Plain-text rendering of search results and analyses.

use std::fmt::Write as _;

use findgold_core::{GoldLocation, GoldSearchResult};
use findgold_search::analysis::{GoldLineAnalysis, RiverAnalysis, RockAnalysis};

pub(crate) fn search_result(result: &GoldSearchResult) -> String {
    let mut out = String::new();
    section(
        &mut out,
        "Spots principaux",
        &result.main_spots,
        "Aucun spot principal trouvé dans cette zone.",
    );
    out.push('\n');
    section(
        &mut out,
        "Autres cours d'eau",
        &result.secondary_spots,
        "Aucun spot secondaire trouvé dans cette zone.",
    );
    out
}

fn section(out: &mut String, title: &str, spots: &[GoldLocation], empty: &str) {
    let _ = writeln!(out, "== {title} ==");
    if spots.is_empty() {
        let _ = writeln!(out, "{empty}");
        return;
    }
    for spot in spots {
        out.push_str(&card(spot));
    }
}

pub(crate) fn card(spot: &GoldLocation) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{} [{}] {}", spot.name, spot.kind, spot.rating_stars());
    let _ = writeln!(out, "  {}", spot.description);
    let _ = writeln!(out, "  Géologie : {}", spot.geology);
    let _ = writeln!(out, "  Histoire : {}", spot.history);

    if !spot.hotspots.is_empty() {
        let _ = writeln!(out, "  Points d'intérêt :");
        for hotspot in &spot.hotspots {
            let _ = writeln!(
                out,
                "    - {} : {} ({})",
                hotspot.location, hotspot.description, hotspot.source
            );
        }
    }

    if let Some(origin) = &spot.gold_origin {
        let _ = writeln!(out, "  Origine de l'or : {}", origin.description);
        if !origin.affluents.is_empty() {
            let _ = writeln!(out, "    Affluents : {}", origin.affluents.join(", "));
        }
    }

    if !spot.sources.is_empty() {
        let _ = writeln!(out, "  Sources : {}", spot.sources.join(", "));
    }

    if !spot.coordinates.is_unknown() {
        let _ = writeln!(out, "  Carte : {}", spot.coordinates.maps_url());
    }
    out
}

pub(crate) fn rocks(analysis: &RockAnalysis) -> String {
    let mut out = String::new();
    for rock in &analysis.rock_types {
        let _ = writeln!(
            out,
            "- {} (potentiel {:.0} %) : {}",
            rock.name,
            rock.gold_potential * 100.0,
            rock.description
        );
    }
    let _ = writeln!(
        out,
        "Potentiel global : {:.0} %",
        analysis.overall_potential * 100.0
    );
    for recommendation in &analysis.recommendations {
        let _ = writeln!(out, "  * {recommendation}");
    }
    out
}

pub(crate) fn river(analysis: &RiverAnalysis) -> String {
    let mut out = format!("{}\n", analysis.description);
    for point in &analysis.points {
        let _ = writeln!(out, "  - {point}");
    }
    out
}

pub(crate) fn gold_line(analysis: &GoldLineAnalysis) -> String {
    format!(
        "{}\nConfiance : {:.0} %\n",
        analysis.description,
        analysis.confidence * 100.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use findgold_search::{fallback_result, FallbackReason};

    #[test]
    fn fallback_result_renders_both_sections() {
        let text = search_result(&fallback_result("Lyon", FallbackReason::Unparseable));
        assert!(text.contains("== Spots principaux =="));
        assert!(text.contains("Lyon [rivière] ⭐⭐⭐"));
        assert!(text.contains("Aucun spot secondaire trouvé dans cette zone."));
        assert!(
            !text.contains("Carte :"),
            "placeholder coordinates must not produce a map link"
        );
    }

    #[test]
    fn card_includes_map_link_for_known_position() {
        let mut spot = fallback_result("Foix", FallbackReason::Upstream)
            .main_spots
            .remove(0);
        spot.coordinates = findgold_core::Coordinates::new(42.96, 1.6);
        assert!(card(&spot).contains("https://www.google.com/maps?q=42.96,1.6&z=14"));
    }

    #[test]
    fn rocks_renders_percentages() {
        let text = rocks(&RockAnalysis::undetermined());
        assert!(text.contains("Indéterminé (potentiel 0 %)"));
        assert!(text.contains("Potentiel global : 0 %"));
    }
}
