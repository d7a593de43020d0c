//! crates/packing_list_core/src/domain.rs
//!
//! Defines the core data structures for the packing list engine.
//! The enumerations are closed so that every consumer matches them exhaustively.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Returned when a string does not name a variant of one of the closed enums.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

//=========================================================================================
// Enumerations
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

    pub fn as_str(self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
            Season::Winter => "winter",
        }
    }

    /// Northern-hemisphere season for a calendar month (1 = January).
    pub fn for_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Fall,
            _ => Season::Winter,
        }
    }

    pub fn current(now: DateTime<Utc>) -> Self {
        Self::for_month(now.month())
    }
}

impl FromStr for Season {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "fall" => Ok(Season::Fall),
            "winter" => Ok(Season::Winter),
            other => Err(ParseEnumError::new("season", other)),
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of place the traveler is going to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    General,
    Home,
}

impl Destination {
    pub const ALL: [Destination; 2] = [Destination::General, Destination::Home];

    pub fn for_trip(is_home_destination: bool) -> Self {
        if is_home_destination {
            Destination::Home
        } else {
            Destination::General
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Destination::General => "general",
            Destination::Home => "home",
        }
    }
}

impl FromStr for Destination {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "general" => Ok(Destination::General),
            "home" => Ok(Destination::Home),
            other => Err(ParseEnumError::new("destination", other)),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Basics,
    Clothes,
    Toiletries,
    Electronics,
    Documents,
    Accessories,
    Health,
    Misc,
    Pending,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 9] = [
        ItemCategory::Basics,
        ItemCategory::Clothes,
        ItemCategory::Toiletries,
        ItemCategory::Electronics,
        ItemCategory::Documents,
        ItemCategory::Accessories,
        ItemCategory::Health,
        ItemCategory::Misc,
        ItemCategory::Pending,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ItemCategory::Basics => "basics",
            ItemCategory::Clothes => "clothes",
            ItemCategory::Toiletries => "toiletries",
            ItemCategory::Electronics => "electronics",
            ItemCategory::Documents => "documents",
            ItemCategory::Accessories => "accessories",
            ItemCategory::Health => "health",
            ItemCategory::Misc => "misc",
            ItemCategory::Pending => "pending",
        }
    }

    /// Localization key for the category label.
    pub fn text_key(self) -> String {
        format!("category.{}", self.as_str())
    }
}

impl FromStr for ItemCategory {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        ItemCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == trimmed)
            .ok_or_else(|| ParseEnumError::new("category", trimmed))
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the quantity of an item is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum QuantityMode {
    /// A constant count, taken from `quantity`.
    #[serde(rename = "fixed")]
    Fixed,
    /// `dailyFactor` multiplied by the trip length.
    #[serde(rename = "perDay")]
    PerDay,
}

impl QuantityMode {
    pub fn as_str(self) -> &'static str {
        match self {
            QuantityMode::Fixed => "fixed",
            QuantityMode::PerDay => "perDay",
        }
    }
}

impl FromStr for QuantityMode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "fixed" => Ok(QuantityMode::Fixed),
            "perDay" => Ok(QuantityMode::PerDay),
            other => Err(ParseEnumError::new("quantity type", other)),
        }
    }
}

/// Languages the UI strings and item names are translated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ca,
    En,
    Es,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Ca, Language::En, Language::Es];

    pub fn code(self) -> &'static str {
        match self {
            Language::Ca => "ca",
            Language::En => "en",
            Language::Es => "es",
        }
    }

    /// English name of the language, used to instruct the enhancement model.
    pub fn prompt_name(self) -> &'static str {
        match self {
            Language::Ca => "Catalan",
            Language::En => "English",
            Language::Es => "Spanish",
        }
    }
}

impl FromStr for Language {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ca" => Ok(Language::Ca),
            "en" => Ok(Language::En),
            "es" => Ok(Language::Es),
            other => Err(ParseEnumError::new("language", other)),
        }
    }
}

//=========================================================================================
// Catalog Types
//=========================================================================================

/// A rule describing one packable thing.
///
/// Every field after `category` is optional until the catalog defaults have been
/// applied (see [`crate::defaults`]). The serialized field names match the catalog
/// exchange format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ItemDefinition {
    pub id: String,
    pub name: String,
    pub category: ItemCategory,
    #[serde(rename = "quantityType", default, skip_serializing_if = "Option::is_none")]
    pub quantity_mode: Option<QuantityMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_factor: Option<f64>,
    #[serde(rename = "seasons", default, skip_serializing_if = "Option::is_none")]
    pub applicable_seasons: Option<Vec<Season>>,
    #[serde(rename = "includeFor", default, skip_serializing_if = "Option::is_none")]
    pub applicable_destinations: Option<Vec<Destination>>,
    #[serde(rename = "minDays", default, skip_serializing_if = "Option::is_none")]
    pub minimum_trip_days: Option<u32>,
    #[serde(rename = "requiresBigLuggage", default, skip_serializing_if = "Option::is_none")]
    pub requires_large_luggage: Option<bool>,
    #[serde(rename = "isCustom", default)]
    pub is_user_defined: bool,
}

impl ItemDefinition {
    /// Creates a bare definition with only the required fields set.
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: ItemCategory) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            quantity_mode: None,
            quantity: None,
            daily_factor: None,
            applicable_seasons: None,
            applicable_destinations: None,
            minimum_trip_days: None,
            requires_large_luggage: None,
            is_user_defined: false,
        }
    }

    /// Localization key for the item's display name.
    pub fn text_key(&self) -> String {
        format!("item.{}", self.id)
    }

    /// Applies a partial update field by field. Fields absent from the patch are kept.
    pub fn apply_patch(&mut self, patch: ItemPatch) {
        let ItemPatch {
            name,
            category,
            quantity_mode,
            quantity,
            daily_factor,
            applicable_seasons,
            applicable_destinations,
            minimum_trip_days,
            requires_large_luggage,
            is_user_defined,
        } = patch;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(category) = category {
            self.category = category;
        }
        if quantity_mode.is_some() {
            self.quantity_mode = quantity_mode;
        }
        if quantity.is_some() {
            self.quantity = quantity;
        }
        if daily_factor.is_some() {
            self.daily_factor = daily_factor;
        }
        if applicable_seasons.is_some() {
            self.applicable_seasons = applicable_seasons;
        }
        if applicable_destinations.is_some() {
            self.applicable_destinations = applicable_destinations;
        }
        if minimum_trip_days.is_some() {
            self.minimum_trip_days = minimum_trip_days;
        }
        if requires_large_luggage.is_some() {
            self.requires_large_luggage = requires_large_luggage;
        }
        if let Some(is_user_defined) = is_user_defined {
            self.is_user_defined = is_user_defined;
        }
    }
}

/// Catalog-wide values used for any field an individual item omits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDefaults {
    #[serde(rename = "quantityType", default, skip_serializing_if = "Option::is_none")]
    pub quantity_mode: Option<QuantityMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_factor: Option<f64>,
    #[serde(rename = "seasons", default, skip_serializing_if = "Option::is_none")]
    pub applicable_seasons: Option<Vec<Season>>,
    #[serde(rename = "includeFor", default, skip_serializing_if = "Option::is_none")]
    pub applicable_destinations: Option<Vec<Destination>>,
    #[serde(rename = "minDays", default, skip_serializing_if = "Option::is_none")]
    pub minimum_trip_days: Option<u32>,
    #[serde(rename = "requiresBigLuggage", default, skip_serializing_if = "Option::is_none")]
    pub requires_large_luggage: Option<bool>,
}

/// A partial edit of an [`ItemDefinition`]. The id is the merge key and cannot change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<ItemCategory>,
    #[serde(rename = "quantityType", default)]
    pub quantity_mode: Option<QuantityMode>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub daily_factor: Option<f64>,
    #[serde(rename = "seasons", default)]
    pub applicable_seasons: Option<Vec<Season>>,
    #[serde(rename = "includeFor", default)]
    pub applicable_destinations: Option<Vec<Destination>>,
    #[serde(rename = "minDays", default)]
    pub minimum_trip_days: Option<u32>,
    #[serde(rename = "requiresBigLuggage", default)]
    pub requires_large_luggage: Option<bool>,
    #[serde(rename = "isCustom", default)]
    pub is_user_defined: Option<bool>,
}

//=========================================================================================
// Trip and Packing List Types
//=========================================================================================

/// The user's input for one generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TripConfiguration {
    pub number_of_days: u32,
    #[serde(rename = "isHome")]
    pub is_home_destination: bool,
    #[serde(rename = "hasBigLuggage")]
    pub has_large_luggage: bool,
    pub current_season: Season,
    #[serde(rename = "useAI", default)]
    pub use_enhancement: bool,
}

impl TripConfiguration {
    pub fn destination(&self) -> Destination {
        Destination::for_trip(self.is_home_destination)
    }
}

/// One line of a generated packing list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ResolvedListEntry {
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    pub category: ItemCategory,
    pub quantity: u32,
    #[serde(rename = "aiSuggestion", default, skip_serializing_if = "Option::is_none")]
    pub enhancement_note: Option<String>,
}

/// An item proposed by the enhancement step that the user has not accepted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SuggestedItem {
    pub name: String,
    pub category: ItemCategory,
    pub quantity: u32,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PackingList {
    pub id: Uuid,
    #[serde(rename = "travelConfig")]
    pub trip: TripConfiguration,
    #[serde(rename = "items")]
    pub entries: Vec<ResolvedListEntry>,
    pub generated_at: DateTime<Utc>,
    #[serde(rename = "aiEnhanced")]
    pub enhanced: bool,
    #[serde(rename = "aiSummary", default, skip_serializing_if = "Option::is_none")]
    pub enhancement_summary: Option<String>,
    #[serde(default)]
    pub suggested_items: Vec<SuggestedItem>,
}

impl PackingList {
    /// Moves the suggestion at `index` into the list entries. Returns the new entry.
    pub fn accept_suggestion(&mut self, index: usize) -> Option<&ResolvedListEntry> {
        if index >= self.suggested_items.len() {
            return None;
        }
        let suggestion = self.suggested_items.remove(index);
        let id = self.unused_entry_id(&format!("suggested_{}", slugify(&suggestion.name)));
        self.entries.push(ResolvedListEntry {
            id,
            display_name: suggestion.name,
            category: suggestion.category,
            quantity: suggestion.quantity,
            enhancement_note: Some(suggestion.reason),
        });
        self.entries.last()
    }

    pub fn decline_suggestion(&mut self, index: usize) -> Option<SuggestedItem> {
        (index < self.suggested_items.len()).then(|| self.suggested_items.remove(index))
    }

    /// `base`, or `base_2`, `base_3`, ... when an entry already uses it.
    fn unused_entry_id(&self, base: &str) -> String {
        let taken = |id: &str| self.entries.iter().any(|entry| entry.id == id);
        if !taken(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{base}_{n}"))
            .find(|id| !taken(id))
            .unwrap_or_else(|| base.to_string())
    }
}

/// Lowercases and joins the alphanumeric words of `raw` with `_`. Any other
/// character separates words.
pub fn slugify(raw: &str) -> String {
    raw.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn season_follows_northern_hemisphere_months() {
        assert_eq!(Season::for_month(1), Season::Winter);
        assert_eq!(Season::for_month(3), Season::Spring);
        assert_eq!(Season::for_month(8), Season::Summer);
        assert_eq!(Season::for_month(11), Season::Fall);
        assert_eq!(Season::for_month(12), Season::Winter);

        let october = Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap();
        assert_eq!(Season::current(october), Season::Fall);
    }

    #[test]
    fn category_parses_only_known_names() {
        assert_eq!("pending".parse::<ItemCategory>(), Ok(ItemCategory::Pending));
        assert_eq!(" health ".parse::<ItemCategory>(), Ok(ItemCategory::Health));
        let err = "snacks".parse::<ItemCategory>().unwrap_err();
        assert_eq!(err.kind, "category");
        assert_eq!(err.value, "snacks");
    }

    #[test]
    fn item_definition_uses_exchange_field_names() {
        let json = r#"{
            "id": "socks",
            "name": "Socks",
            "category": "clothes",
            "quantityType": "perDay",
            "dailyFactor": 1.0,
            "seasons": ["winter"],
            "includeFor": ["general", "home"],
            "minDays": 2,
            "requiresBigLuggage": false
        }"#;
        let item: ItemDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(item.quantity_mode, Some(QuantityMode::PerDay));
        assert_eq!(item.applicable_seasons, Some(vec![Season::Winter]));
        assert_eq!(item.minimum_trip_days, Some(2));
        assert!(!item.is_user_defined);

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["quantityType"], "perDay");
        assert!(back.get("quantity").is_none());
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut item = ItemDefinition::new("towel", "Towel", ItemCategory::Toiletries);
        item.quantity = Some(1);
        item.applicable_seasons = Some(vec![Season::Summer]);

        item.apply_patch(ItemPatch {
            name: Some("Beach towel".to_string()),
            quantity: Some(2),
            ..ItemPatch::default()
        });

        assert_eq!(item.id, "towel");
        assert_eq!(item.name, "Beach towel");
        assert_eq!(item.quantity, Some(2));
        assert_eq!(item.applicable_seasons, Some(vec![Season::Summer]));
    }

    #[test]
    fn accepting_a_suggestion_moves_it_into_the_entries() {
        let mut list = PackingList {
            id: Uuid::new_v4(),
            trip: TripConfiguration {
                number_of_days: 3,
                is_home_destination: false,
                has_large_luggage: true,
                current_season: Season::Winter,
                use_enhancement: true,
            },
            entries: Vec::new(),
            generated_at: Utc::now(),
            enhanced: true,
            enhancement_summary: None,
            suggested_items: vec![SuggestedItem {
                name: "Thermal Gloves".to_string(),
                category: ItemCategory::Clothes,
                quantity: 1,
                reason: "Sub-zero forecast".to_string(),
            }],
        };

        assert!(list.accept_suggestion(3).is_none());
        let entry = list.accept_suggestion(0).unwrap().clone();
        assert_eq!(entry.id, "suggested_thermal_gloves");
        assert_eq!(entry.enhancement_note.as_deref(), Some("Sub-zero forecast"));
        assert!(list.suggested_items.is_empty());
        assert!(list.decline_suggestion(0).is_none());
    }

    #[test]
    fn slugs_keep_only_alphanumeric_words() {
        assert_eq!(slugify("  Ski   Goggles "), "ski_goggles");
        assert_eq!(slugify("Socks,wool"), "socks_wool");
        assert_eq!(slugify("Sun \"cream\"\nSPF 50"), "sun_cream_spf_50");
        assert_eq!(slugify("snake_case"), "snake_case");
        assert_eq!(slugify("Crema solar"), "crema_solar");
    }

    #[test]
    fn suggestions_with_the_same_slug_get_distinct_ids() {
        let suggestion = |name: &str| SuggestedItem {
            name: name.to_string(),
            category: ItemCategory::Clothes,
            quantity: 1,
            reason: "Rain all week".to_string(),
        };
        let mut list = PackingList {
            id: Uuid::new_v4(),
            trip: TripConfiguration {
                number_of_days: 2,
                is_home_destination: false,
                has_large_luggage: false,
                current_season: Season::Spring,
                use_enhancement: true,
            },
            entries: Vec::new(),
            generated_at: Utc::now(),
            enhanced: true,
            enhancement_summary: None,
            suggested_items: vec![
                suggestion("Rain  jacket"),
                suggestion("rain jacket"),
                suggestion("Rain-jacket"),
            ],
        };

        let ids: Vec<_> = (0..3)
            .map(|_| list.accept_suggestion(0).unwrap().id.clone())
            .collect();
        assert_eq!(
            ids,
            vec!["suggested_rain_jacket", "suggested_rain_jacket_2", "suggested_rain_jacket_3"]
        );
    }
}
