//! Imports
//!
//! Best-effort classification of external model listing URLs. Nothing here
//! fails: unrecognised hosts fall back to Thingiverse and unparsable URLs fall
//! back to a generic name.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use url::Url;

use crate::{
    cart::{CartItemDraft, ModelSource},
    materials::MaterialKind,
};

/// Name used when no usable path segment can be found.
pub const FALLBACK_MODEL_NAME: &str = "Imported Model";

/// Classify the listing site a URL points at.
///
/// Matching is a case-sensitive substring check on the raw input.
pub fn classify_source(url: &str) -> ModelSource {
    if url.contains("makerworld") {
        ModelSource::MakerWorld
    } else {
        ModelSource::Thingiverse
    }
}

/// Derive a display name from the last non-empty path segment of a URL.
///
/// Hyphens become spaces and a leading numeric listing id (`123-cool-bracket`)
/// is dropped.
pub fn model_name(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.rfind(|segment| !segment.is_empty()))
                .map(slug_to_name)
        })
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_MODEL_NAME.to_string())
}

fn slug_to_name(segment: &str) -> String {
    let slug = match segment.split_once('-') {
        Some((id, rest))
            if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) && !rest.is_empty() =>
        {
            rest
        }
        _ => segment,
    };

    slug.replace('-', " ")
}

/// Build a cart draft for an imported listing at the given price.
///
/// Imported models are quoted as PLA with no weight estimate.
pub fn import_draft(url: &str, price: Money<'static, Currency>) -> CartItemDraft {
    CartItemDraft {
        name: model_name(url),
        source: classify_source(url),
        source_url: Some(url.to_string()),
        price,
        material: MaterialKind::Pla,
        weight_grams: Decimal::ZERO,
    }
}
