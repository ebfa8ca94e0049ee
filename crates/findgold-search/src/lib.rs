//! Client-side FindGold services.
//!
//! Talks to the FindGold backend proxy, turns free-form model output into a
//! well-formed [`findgold_core::GoldSearchResult`], runs the photo analyses,
//! and drives debounced city autocompletion.

pub mod analysis;
pub mod autocomplete;
pub mod client;
pub mod error;
pub mod geo_api;
pub mod normalize;
pub mod search;

pub use autocomplete::{CitySuggestionSource, SuggestionDebouncer, SuggestionEvent};
pub use client::BackendClient;
pub use error::SearchError;
pub use geo_api::GeoApiCities;
pub use normalize::{fallback_result, normalize, FallbackReason};
pub use search::{search_gold_locations, DEFAULT_RADIUS_KM};
