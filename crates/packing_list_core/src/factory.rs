//! crates/packing_list_core/src/factory.rs
//!
//! The built-in catalog the user's catalog is seeded from and restored to.

use serde::{Deserialize, Serialize};

use crate::defaults::resolve_catalog;
use crate::domain::{CatalogDefaults, ItemDefinition};

const FACTORY_CONFIG: &str = include_str!("../data/items-config.json");

/// Layout of `items-config.json`: catalog defaults and minimal item definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<CatalogDefaults>,
    pub items: Vec<ItemDefinition>,
}

impl ItemsConfiguration {
    /// The items a fresh catalog is seeded with: defaults applied, none user-defined.
    pub fn factory_items(&self) -> Vec<ItemDefinition> {
        let mut items = match &self.defaults {
            Some(defaults) => resolve_catalog(&self.items, defaults),
            None => self.items.clone(),
        };
        for item in &mut items {
            item.is_user_defined = false;
        }
        items
    }
}

pub fn factory_configuration() -> Result<ItemsConfiguration, serde_json::Error> {
    serde_json::from_str(FACTORY_CONFIG)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Destination, ItemCategory, QuantityMode};
    use std::collections::HashSet;

    fn factory_items() -> Vec<ItemDefinition> {
        factory_configuration().unwrap().factory_items()
    }

    #[test]
    fn factory_items_are_fully_resolved() {
        let items = factory_items();
        assert!(!items.is_empty());

        for item in &items {
            assert!(item.quantity_mode.is_some(), "{}", item.id);
            assert!(item.minimum_trip_days.is_some(), "{}", item.id);
            assert!(item.requires_large_luggage.is_some(), "{}", item.id);
            assert!(
                item.applicable_seasons.as_ref().is_some_and(|s| !s.is_empty()),
                "{}",
                item.id
            );
            assert!(
                item.applicable_destinations.as_ref().is_some_and(|d| !d.is_empty()),
                "{}",
                item.id
            );
            if item.quantity_mode == Some(QuantityMode::PerDay) {
                assert!(item.daily_factor.is_some_and(|f| f > 0.0), "{}", item.id);
            }
            assert!(!item.is_user_defined);
        }
    }

    #[test]
    fn factory_ids_are_unique() {
        let items = factory_items();
        let ids: HashSet<_> = items.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids.len(), items.len());
    }

    #[test]
    fn factory_items_pass_editor_validation() {
        for item in factory_items() {
            assert!(crate::catalog::validate_item(&item).is_ok(), "{}", item.id);
        }
    }

    #[test]
    fn defaults_fill_destination_for_minimal_items() {
        let items = factory_items();
        let passport = items.iter().find(|item| item.id == "passport").unwrap();
        assert_eq!(passport.category, ItemCategory::Documents);
        assert_eq!(passport.applicable_destinations, Some(vec![Destination::General]));
        assert_eq!(passport.quantity, Some(1));
    }
}
