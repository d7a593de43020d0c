//! crates/packing_list_core/src/defaults.rs
//!
//! Reconciles item definitions with the catalog-wide defaults.
//!
//! The merge is done field by field. Scalar fields take the item's own value and
//! fall back to the default. The two set-valued fields (`seasons`, `includeFor`)
//! are replaced wholesale: a non-empty item value wins, otherwise the default's
//! list is used as-is. Lists are never unioned element-wise.

use crate::domain::{CatalogDefaults, ItemDefinition};

/// Fills every optional field of `item` that is absent with the default's value.
pub fn apply_defaults(item: &ItemDefinition, defaults: &CatalogDefaults) -> ItemDefinition {
    ItemDefinition {
        id: item.id.clone(),
        name: item.name.clone(),
        category: item.category,
        quantity_mode: item.quantity_mode.or(defaults.quantity_mode),
        quantity: item.quantity.or(defaults.quantity),
        daily_factor: item.daily_factor.or(defaults.daily_factor),
        applicable_seasons: replace_list(&item.applicable_seasons, &defaults.applicable_seasons),
        applicable_destinations: replace_list(
            &item.applicable_destinations,
            &defaults.applicable_destinations,
        ),
        minimum_trip_days: item.minimum_trip_days.or(defaults.minimum_trip_days),
        requires_large_luggage: item.requires_large_luggage.or(defaults.requires_large_luggage),
        is_user_defined: item.is_user_defined,
    }
}

/// Applies [`apply_defaults`] to every item, preserving catalog order.
pub fn resolve_catalog(items: &[ItemDefinition], defaults: &CatalogDefaults) -> Vec<ItemDefinition> {
    items
        .iter()
        .map(|item| apply_defaults(item, defaults))
        .collect()
}

fn replace_list<T: Clone>(own: &Option<Vec<T>>, default: &Option<Vec<T>>) -> Option<Vec<T>> {
    match own {
        Some(values) if !values.is_empty() => Some(values.clone()),
        _ => default.clone(),
    }
}
