//! crates/packing_list_core/src/grouping.rs
//!
//! Groups a generated list by category for display.

use serde::Serialize;

use crate::domain::{ItemCategory, PackingList, ResolvedListEntry};
use crate::ports::Localizer;

/// One display section of a packing list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CategoryGroup {
    pub category: ItemCategory,
    pub label: String,
    pub entries: Vec<ResolvedListEntry>,
    /// Sum of the quantities in this group.
    pub item_count: u32,
}

/// Groups entries by category. Groups appear in the order their category first
/// appears in the list; entries keep their list order inside each group.
pub fn group_by_category(list: &PackingList) -> Vec<(ItemCategory, Vec<ResolvedListEntry>)> {
    let mut groups: Vec<(ItemCategory, Vec<ResolvedListEntry>)> = Vec::new();

    for entry in &list.entries {
        match groups.iter_mut().find(|(category, _)| *category == entry.category) {
            Some((_, entries)) => entries.push(entry.clone()),
            None => groups.push((entry.category, vec![entry.clone()])),
        }
    }

    groups
}

/// Like [`group_by_category`], with localized labels and per-group counts.
pub fn group_with_labels(list: &PackingList, localizer: &dyn Localizer) -> Vec<CategoryGroup> {
    group_by_category(list)
        .into_iter()
        .map(|(category, entries)| CategoryGroup {
            category,
            label: localizer.text(&category.text_key()),
            item_count: sum_quantities(&entries),
            entries,
        })
        .collect()
}

/// Sum of all entry quantities, saturating at `u32::MAX`.
pub fn total_count(list: &PackingList) -> u32 {
    sum_quantities(&list.entries)
}

fn sum_quantities(entries: &[ResolvedListEntry]) -> u32 {
    entries
        .iter()
        .map(|entry| entry.quantity)
        .fold(0, u32::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Season, TripConfiguration};
    use crate::ports::TextParams;
    use chrono::Utc;
    use uuid::Uuid;

    struct Labels;

    impl Localizer for Labels {
        fn resolve(&self, key: &str, _params: Option<&TextParams>) -> String {
            key.to_uppercase()
        }
    }

    fn entry(id: &str, category: ItemCategory, quantity: u32) -> ResolvedListEntry {
        ResolvedListEntry {
            id: id.to_string(),
            display_name: id.to_string(),
            category,
            quantity,
            enhancement_note: None,
        }
    }

    fn sample_list() -> PackingList {
        PackingList {
            id: Uuid::new_v4(),
            trip: TripConfiguration {
                number_of_days: 4,
                is_home_destination: false,
                has_large_luggage: false,
                current_season: Season::Summer,
                use_enhancement: false,
            },
            entries: vec![
                entry("tshirt", ItemCategory::Clothes, 4),
                entry("toothbrush", ItemCategory::Toiletries, 1),
                entry("socks", ItemCategory::Clothes, 5),
                entry("charger", ItemCategory::Electronics, 1),
                entry("shorts", ItemCategory::Clothes, 0),
            ],
            generated_at: Utc::now(),
            enhanced: false,
            enhancement_summary: None,
            suggested_items: Vec::new(),
        }
    }

    #[test]
    fn groups_preserve_first_appearance_and_entry_order() {
        let groups = group_by_category(&sample_list());
        let categories: Vec<_> = groups.iter().map(|(category, _)| *category).collect();
        assert_eq!(
            categories,
            vec![ItemCategory::Clothes, ItemCategory::Toiletries, ItemCategory::Electronics]
        );

        let clothes: Vec<_> = groups[0].1.iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(clothes, vec!["tshirt", "socks", "shorts"]);
    }

    #[test]
    fn grouping_loses_no_entries_and_totals_match() {
        let list = sample_list();
        let grouped: usize = group_by_category(&list)
            .iter()
            .map(|(_, entries)| entries.len())
            .sum();
        assert_eq!(grouped, list.entries.len());
        assert_eq!(total_count(&list), 11);

        let labelled = group_with_labels(&list, &Labels);
        assert_eq!(labelled[0].label, "CATEGORY.CLOTHES");
        assert_eq!(labelled[0].item_count, 9);
        assert_eq!(labelled.iter().map(|group| group.item_count).sum::<u32>(), 11);
    }

    #[test]
    fn totals_saturate_instead_of_overflowing() {
        let mut list = sample_list();
        list.entries = vec![
            entry("tent", ItemCategory::Misc, 3_000_000_000),
            entry("tarp", ItemCategory::Misc, 3_000_000_000),
            entry("stove", ItemCategory::Electronics, 1),
        ];

        assert_eq!(total_count(&list), u32::MAX);
        let labelled = group_with_labels(&list, &Labels);
        assert_eq!(labelled[0].item_count, u32::MAX);
        assert_eq!(labelled[1].item_count, 1);
    }

    #[test]
    fn empty_list_has_no_groups() {
        let mut list = sample_list();
        list.entries.clear();
        assert!(group_by_category(&list).is_empty());
        assert_eq!(total_count(&list), 0);
    }
}
