//! crates/packing_list_core/src/engine.rs
//!
//! The list generation engine: evaluates every catalog item against a trip and
//! produces the quantified packing list entries.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Destination, ItemDefinition, PackingList, QuantityMode, ResolvedListEntry, Season,
    TripConfiguration,
};
use crate::ports::Localizer;

/// Evaluates the catalog against the trip, in catalog order.
///
/// Items are expected to be resolved already (see [`crate::defaults`]). Any field that
/// is still missing falls back to a fail-closed or neutral value instead of erroring:
/// no seasons or destinations excludes the item, no minimum means zero, no mode means
/// fixed with quantity 1.
pub fn generate(
    catalog: &[ItemDefinition],
    trip: &TripConfiguration,
    localizer: &dyn Localizer,
) -> Vec<ResolvedListEntry> {
    catalog
        .iter()
        .filter(|item| item_passes(item, trip))
        .map(|item| ResolvedListEntry {
            id: item.id.clone(),
            display_name: display_name(item, localizer),
            category: item.category,
            quantity: compute_quantity(item, trip.number_of_days),
            enhancement_note: None,
        })
        .collect()
}

/// Factory items are shown under their translated name; user-defined items have no
/// translation and keep the name they were saved with.
fn display_name(item: &ItemDefinition, localizer: &dyn Localizer) -> String {
    if item.is_user_defined {
        item.name.clone()
    } else {
        localizer.text(&item.text_key())
    }
}

/// Runs [`generate`] and wraps the entries into a fresh, unenhanced [`PackingList`].
pub fn build_packing_list(
    catalog: &[ItemDefinition],
    trip: &TripConfiguration,
    localizer: &dyn Localizer,
    generated_at: DateTime<Utc>,
) -> PackingList {
    let entries = generate(catalog, trip, localizer);
    tracing::debug!(
        catalog_size = catalog.len(),
        entries = entries.len(),
        days = trip.number_of_days,
        season = %trip.current_season,
        "Generated packing list"
    );

    PackingList {
        id: Uuid::new_v4(),
        trip: *trip,
        entries,
        generated_at,
        enhanced: false,
        enhancement_summary: None,
        suggested_items: Vec::new(),
    }
}

/// True when all four inclusion predicates hold for this trip.
pub fn item_passes(item: &ItemDefinition, trip: &TripConfiguration) -> bool {
    if trip.number_of_days < item.minimum_trip_days.unwrap_or(0) {
        return false;
    }

    if item.requires_large_luggage.unwrap_or(false) && !trip.has_large_luggage {
        return false;
    }

    if !applies_in_season(item, trip.current_season) {
        return false;
    }

    applies_to_destination(item, trip.destination())
}

fn applies_in_season(item: &ItemDefinition, season: Season) -> bool {
    item.applicable_seasons
        .as_deref()
        .is_some_and(|seasons| seasons.contains(&season))
}

fn applies_to_destination(item: &ItemDefinition, destination: Destination) -> bool {
    item.applicable_destinations
        .as_deref()
        .is_some_and(|destinations| destinations.contains(&destination))
}

/// Quantity for an included item on a trip of `days` days.
///
/// A fixed item without a positive quantity yields 1, which cannot be told apart
/// from an authored quantity of 1.
pub fn compute_quantity(item: &ItemDefinition, days: u32) -> u32 {
    match item.quantity_mode.unwrap_or(QuantityMode::Fixed) {
        QuantityMode::Fixed => match item.quantity {
            Some(quantity) if quantity > 0 => u32::try_from(quantity).unwrap_or(u32::MAX),
            _ => 1,
        },
        QuantityMode::PerDay => {
            let factor = item
                .daily_factor
                .filter(|factor| factor.is_finite() && *factor > 0.0)
                .unwrap_or(0.0);
            let raw = (factor * f64::from(days)).ceil();
            let quantity = if factor > 0.0 && factor < 1.0 {
                raw.max(1.0)
            } else {
                raw
            };
            // Float to int casts saturate.
            quantity as u32
        }
    }
}
