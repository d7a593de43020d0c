//! End-to-end flows over the factory catalog and the in-memory adapters.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use packing_list_core::domain::{Destination, QuantityMode};
use packing_list_core::engine::build_packing_list;
use packing_list_core::enhancement::{enhance, EnhancementRequest, EnhancementResponse, RawSuggestion};
use packing_list_core::grouping::{group_with_labels, total_count};
use packing_list_core::memory::{InMemoryCatalogStorage, InMemoryReminderStore, InMemoryTripHistory};
use packing_list_core::reminders::export_to_reminders;
use packing_list_core::{
    CatalogService, EnhancementService, ItemCategory, ItemDefinition, Language, LocaleContext,
    PackingList, PortError, PortResult, Season, TextCatalog, TripConfiguration, TripHistory,
};
use std::sync::Arc;

fn english() -> LocaleContext {
    LocaleContext::new(Language::En, Arc::new(TextCatalog::embedded().unwrap()))
}

fn catalog() -> CatalogService {
    CatalogService::new(Arc::new(InMemoryCatalogStorage::default())).unwrap()
}

fn trip(days: u32, season: Season, is_home: bool, large_luggage: bool) -> TripConfiguration {
    TripConfiguration {
        number_of_days: days,
        is_home_destination: is_home,
        has_large_luggage: large_luggage,
        current_season: season,
        use_enhancement: false,
    }
}

async fn generate(catalog: &CatalogService, trip: &TripConfiguration) -> PackingList {
    let snapshot = catalog.snapshot().await.unwrap();
    build_packing_list(&snapshot, trip, &english(), Utc::now())
}

fn quantity_of(list: &PackingList, id: &str) -> Option<u32> {
    list.entries
        .iter()
        .find(|entry| entry.id == id)
        .map(|entry| entry.quantity)
}

#[tokio::test]
async fn five_day_fall_trip_from_factory_catalog() {
    let catalog = catalog();
    let list = generate(&catalog, &trip(5, Season::Fall, false, false)).await;

    assert_eq!(quantity_of(&list, "umbrella"), Some(1));
    assert_eq!(quantity_of(&list, "socks"), Some(5));
    assert_eq!(quantity_of(&list, "tshirts"), Some(4));
    assert_eq!(quantity_of(&list, "pants"), Some(2));
    assert_eq!(quantity_of(&list, "travel_adapter"), Some(1));
    assert_eq!(quantity_of(&list, "first_aid_kit"), Some(1));
    assert_eq!(quantity_of(&list, "passport"), Some(1));

    assert_eq!(quantity_of(&list, "swimsuit"), None);
    assert_eq!(quantity_of(&list, "extra_shoes"), None);
    assert_eq!(quantity_of(&list, "shampoo"), None);

    let umbrella = list.entries.iter().find(|entry| entry.id == "umbrella").unwrap();
    assert_eq!(umbrella.display_name, "Umbrella");
}

#[tokio::test]
async fn home_trips_skip_general_only_items() {
    let catalog = catalog();
    let list = generate(&catalog, &trip(5, Season::Summer, true, true)).await;

    assert_eq!(quantity_of(&list, "passport"), None);
    assert_eq!(quantity_of(&list, "swimsuit"), None);
    assert_eq!(quantity_of(&list, "sunscreen"), Some(1));
    assert_eq!(quantity_of(&list, "underwear"), Some(5));
}

#[tokio::test]
async fn large_luggage_and_minimum_days_gate_items() {
    let catalog = catalog();

    let short = generate(&catalog, &trip(2, Season::Spring, false, true)).await;
    assert_eq!(quantity_of(&short, "extra_shoes"), None);
    assert_eq!(quantity_of(&short, "shampoo"), Some(1));

    let long = generate(&catalog, &trip(3, Season::Spring, false, true)).await;
    assert_eq!(quantity_of(&long, "extra_shoes"), Some(1));
}

#[tokio::test]
async fn custom_per_day_item_scales_with_trip_length() {
    let catalog = catalog();
    let mut snacks = ItemDefinition::new("Energy Bars", "Energy bars", ItemCategory::Misc);
    snacks.quantity_mode = Some(QuantityMode::PerDay);
    snacks.daily_factor = Some(1.25);
    snacks.applicable_destinations = Some(vec![Destination::General]);
    catalog.add(snacks).await.unwrap();

    let list = generate(&catalog, &trip(4, Season::Winter, false, false)).await;
    let bars = list.entries.iter().find(|entry| entry.id == "energy_bars").unwrap();
    assert_eq!(bars.quantity, 5);
    assert_eq!(bars.display_name, "Energy bars");
}

#[tokio::test]
async fn groups_follow_first_appearance_and_totals_add_up() {
    let catalog = catalog();
    let list = generate(&catalog, &trip(3, Season::Winter, false, false)).await;
    let groups = group_with_labels(&list, &english());

    assert_eq!(groups[0].category, ItemCategory::Basics);
    assert_eq!(groups[0].label, "Basics");
    assert_eq!(
        groups.iter().map(|group| group.item_count).sum::<u32>(),
        total_count(&list)
    );
}

struct Offline;

#[async_trait]
impl EnhancementService for Offline {
    async fn suggest(&self, _request: &EnhancementRequest) -> PortResult<EnhancementResponse> {
        Err(PortError::Unavailable("no network".to_string()))
    }

    async fn item_tip(&self, _: &str, _: &TripConfiguration, _: Language) -> PortResult<String> {
        Err(PortError::Unavailable("no network".to_string()))
    }
}

struct Helpful;

#[async_trait]
impl EnhancementService for Helpful {
    async fn suggest(&self, _request: &EnhancementRequest) -> PortResult<EnhancementResponse> {
        Ok(EnhancementResponse {
            summary_text: Some("- Expect rain".to_string()),
            suggested_items: Some(vec![RawSuggestion {
                name: Some("Rain poncho".to_string()),
                category: Some("clothes".to_string()),
                quantity: Some(1),
                reason: Some("Showers forecast".to_string()),
            }]),
        })
    }

    async fn item_tip(&self, _: &str, _: &TripConfiguration, _: Language) -> PortResult<String> {
        Ok("Roll it tight.".to_string())
    }
}

#[tokio::test]
async fn enhancement_is_best_effort() {
    let catalog = catalog();
    let base = generate(&catalog, &trip(4, Season::Fall, false, false)).await;

    let untouched = enhance(base.clone(), &Offline, Language::En).await;
    assert_eq!(untouched, base);

    let mut enhanced = enhance(base.clone(), &Helpful, Language::En).await;
    assert!(enhanced.enhanced);
    assert_eq!(enhanced.entries, base.entries);
    assert_eq!(enhanced.suggested_items.len(), 1);

    let accepted = enhanced.accept_suggestion(0).unwrap().clone();
    assert_eq!(accepted.id, "suggested_rain_poncho");
    assert_eq!(accepted.enhancement_note.as_deref(), Some("Showers forecast"));
    assert_eq!(enhanced.entries.len(), base.entries.len() + 1);
    assert!(enhanced.suggested_items.is_empty());
}

#[tokio::test]
async fn history_and_reminders_round_out_a_trip() {
    let catalog = catalog();
    let history = InMemoryTripHistory::default();
    let reminders = InMemoryReminderStore::new(true);

    let config = trip(6, Season::Winter, true, false);
    let mut list = generate(&catalog, &config).await;
    list.generated_at = Utc.with_ymd_and_hms(2026, 1, 10, 9, 30, 0).unwrap();

    history.save_packing_list(&list).await.unwrap();
    history.save_last_trip(&config).await.unwrap();
    assert_eq!(history.get_packing_list(list.id).await.unwrap(), list);
    assert_eq!(history.last_trip().await.unwrap(), Some(config));

    assert!(export_to_reminders(&list, &reminders, &english()).await);
    let batches = reminders.batches().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].reminder_count(), list.entries.len() + 1);
    assert_eq!(batches[0].trip.notes.lines().next(), Some("Generated on 2026-01-10"));
}
