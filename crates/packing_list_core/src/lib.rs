pub mod catalog;
pub mod defaults;
pub mod domain;
pub mod engine;
pub mod enhancement;
pub mod exchange;
pub mod factory;
pub mod grouping;
pub mod localization;
pub mod memory;
pub mod ports;
pub mod reminders;

/// Number of generated lists kept in the trip history.
pub const HISTORY_LIMIT: usize = 10;

pub use catalog::{CatalogError, CatalogService};
pub use domain::{
    Destination, ItemCategory, ItemDefinition, ItemPatch, Language, PackingList, QuantityMode,
    ResolvedListEntry, Season, SuggestedItem, TripConfiguration,
};
pub use localization::{LocaleContext, TextCatalog};
pub use ports::{
    CatalogStorage, EnhancementService, Localizer, PortError, PortResult, ReminderExporter,
    TripHistory,
};
