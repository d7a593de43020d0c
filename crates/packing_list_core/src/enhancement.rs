//! crates/packing_list_core/src/enhancement.rs
//!
//! Best-effort augmentation of a generated list with suggested items and advice.
//!
//! The base list is always computed first. Whatever happens during enhancement, the
//! caller gets a usable list back: either the enhanced one or the original with
//! `enhanced = false`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::{
    Destination, ItemCategory, Language, PackingList, Season, SuggestedItem, TripConfiguration,
};
use crate::ports::{EnhancementService, Localizer};

/// Upper bound on suggestions kept, whatever the service returns.
pub const MAX_SUGGESTIONS: usize = 5;

/// What the enhancement service is told about the trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementRequest {
    pub number_of_days: u32,
    pub season: Season,
    pub destination: Destination,
    pub has_large_luggage: bool,
    pub item_names: Vec<String>,
    pub response_language: Language,
}

impl EnhancementRequest {
    pub fn for_list(list: &PackingList, language: Language) -> Self {
        Self {
            number_of_days: list.trip.number_of_days,
            season: list.trip.current_season,
            destination: list.trip.destination(),
            has_large_luggage: list.trip.has_large_luggage,
            item_names: list
                .entries
                .iter()
                .map(|entry| entry.display_name.clone())
                .collect(),
            response_language: language,
        }
    }
}

/// The service's answer before validation. Every field may be missing or malformed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnhancementResponse {
    #[serde(default)]
    pub summary_text: Option<String>,
    #[serde(default)]
    pub suggested_items: Option<Vec<RawSuggestion>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSuggestion {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl RawSuggestion {
    /// Converts into a [`SuggestedItem`] when every field is present and valid.
    pub fn validate(&self) -> Option<SuggestedItem> {
        let name = non_blank(self.name.as_deref())?;
        let reason = non_blank(self.reason.as_deref())?;
        let category: ItemCategory = self.category.as_deref()?.parse().ok()?;
        if category == ItemCategory::Pending {
            return None;
        }
        let quantity = u32::try_from(self.quantity?).ok().filter(|q| *q > 0)?;

        Some(SuggestedItem {
            name: name.to_string(),
            category,
            quantity,
            reason: reason.to_string(),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Asks the service for suggestions and folds the valid ones into the list.
///
/// Never fails: a service error or a response without summary or suggestion array
/// returns `list` unchanged with `enhanced = false`. Individual suggestions that are
/// incomplete, use an unknown category or duplicate an existing name are dropped.
pub async fn enhance(
    mut list: PackingList,
    service: &dyn EnhancementService,
    language: Language,
) -> PackingList {
    let request = EnhancementRequest::for_list(&list, language);

    let response = match service.suggest(&request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(list_id = %list.id, "Enhancement failed, keeping base list: {}", e);
            list.enhanced = false;
            return list;
        }
    };

    let (summary, raw_suggestions) = match (
        non_blank(response.summary_text.as_deref()),
        response.suggested_items.as_ref(),
    ) {
        (Some(summary), Some(suggestions)) => (summary.to_string(), suggestions),
        _ => {
            tracing::warn!(list_id = %list.id, "Enhancement response is incomplete, keeping base list");
            list.enhanced = false;
            return list;
        }
    };

    let suggestions = select_suggestions(&list, raw_suggestions);
    tracing::info!(
        list_id = %list.id,
        offered = raw_suggestions.len(),
        kept = suggestions.len(),
        "Packing list enhanced"
    );

    list.enhancement_summary = Some(summary);
    list.suggested_items = suggestions;
    list.enhanced = true;
    list
}

/// Valid suggestions whose names are not already on the list, capped at [`MAX_SUGGESTIONS`].
pub fn select_suggestions(list: &PackingList, raw: &[RawSuggestion]) -> Vec<SuggestedItem> {
    let mut seen: HashSet<String> = list
        .entries
        .iter()
        .map(|entry| entry.display_name.to_lowercase())
        .collect();

    raw.iter()
        .filter_map(RawSuggestion::validate)
        .filter(|suggestion| seen.insert(suggestion.name.to_lowercase()))
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// A short packing tip for one item, or the localized "unavailable" text on failure.
pub async fn item_tip(
    service: &dyn EnhancementService,
    item_name: &str,
    trip: &TripConfiguration,
    locale: &dyn Localizer,
    language: Language,
) -> String {
    match service.item_tip(item_name, trip, language).await {
        Ok(tip) if !tip.trim().is_empty() => tip.trim().to_string(),
        Ok(_) => locale.text("ai.tip.unavailable"),
        Err(e) => {
            tracing::warn!(item = item_name, "Item tip failed: {}", e);
            locale.text("ai.tip.unavailable")
        }
    }
}
