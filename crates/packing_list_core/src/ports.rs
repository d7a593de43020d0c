//! crates/packing_list_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific storage backends, LLM providers or reminder stores.

use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::{ItemDefinition, Language, PackingList, TripConfiguration};
use crate::enhancement::{EnhancementRequest, EnhancementResponse};
use crate::reminders::ReminderBatch;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Parameter values substituted into `{name}` placeholders of a localized string.
pub type TextParams = HashMap<String, String>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Persistence for the user's item catalog. The whole catalog is read and written at once.
#[async_trait]
pub trait CatalogStorage: Send + Sync {
    /// Returns `None` when nothing has been stored yet.
    async fn load_items(&self) -> PortResult<Option<Vec<ItemDefinition>>>;

    async fn save_items(&self, items: &[ItemDefinition]) -> PortResult<()>;

    /// Forgets the stored catalog so the next load starts from the factory items.
    async fn clear(&self) -> PortResult<()>;
}

/// Resolves localization keys such as `item.<id>` or `category.<category>`.
///
/// Unknown keys resolve to the key itself; this never fails.
pub trait Localizer: Send + Sync {
    fn resolve(&self, key: &str, params: Option<&TextParams>) -> String;

    fn text(&self, key: &str) -> String {
        self.resolve(key, None)
    }
}

/// The network-backed step that proposes extra items and advice for a list.
#[async_trait]
pub trait EnhancementService: Send + Sync {
    async fn suggest(&self, request: &EnhancementRequest) -> PortResult<EnhancementResponse>;

    /// A one or two sentence tip about packing a single item.
    async fn item_tip(
        &self,
        item_name: &str,
        trip: &TripConfiguration,
        language: Language,
    ) -> PortResult<String>;
}

/// A device reminders store the finished list can be exported to.
#[async_trait]
pub trait ReminderExporter: Send + Sync {
    /// Whether the user granted access to the reminders store.
    async fn has_permission(&self) -> bool;

    /// Creates every reminder of the batch in the named list.
    async fn create_reminders(&self, batch: &ReminderBatch) -> PortResult<()>;
}

/// Recently generated lists and the last trip the user configured.
#[async_trait]
pub trait TripHistory: Send + Sync {
    /// Stores the list, keeping only the most recent [`crate::HISTORY_LIMIT`] entries.
    async fn save_packing_list(&self, list: &PackingList) -> PortResult<()>;

    /// Oldest first.
    async fn list_packing_lists(&self) -> PortResult<Vec<PackingList>>;

    async fn get_packing_list(&self, id: Uuid) -> PortResult<PackingList>;

    async fn delete_packing_list(&self, id: Uuid) -> PortResult<()>;

    async fn save_last_trip(&self, trip: &TripConfiguration) -> PortResult<()>;

    async fn last_trip(&self) -> PortResult<Option<TripConfiguration>>;
}
