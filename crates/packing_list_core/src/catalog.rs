//! crates/packing_list_core/src/catalog.rs
//!
//! The user's item catalog: CRUD, factory reset, import/export, and the resolved
//! snapshot the engine evaluates.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::defaults::resolve_catalog;
use crate::domain::{slugify, CatalogDefaults, ItemCategory, ItemDefinition, ItemPatch, QuantityMode};
use crate::exchange::{self, ExchangeError};
use crate::factory::{factory_configuration, ItemsConfiguration};
use crate::ports::{CatalogStorage, PortError};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Item with ID \"{0}\" already exists")]
    DuplicateId(String),
    #[error("Item with ID \"{0}\" not found")]
    NotFound(String),
    #[error("Invalid item: {0}")]
    InvalidItem(String),
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
    #[error("Factory catalog could not be read: {0}")]
    Factory(#[from] serde_json::Error),
    #[error("Catalog storage error: {0}")]
    Port(#[from] PortError),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Largest fixed quantity the editor accepts.
pub const MAX_ITEM_QUANTITY: i64 = 999;
/// Largest per-day factor the editor accepts.
pub const MAX_DAILY_FACTOR: f64 = 100.0;

/// Lowercases the raw id and joins its words with `_`.
pub fn normalize_id(raw: &str) -> String {
    slugify(raw)
}

/// Checks the rules the item editor enforces before saving.
pub fn validate_item(item: &ItemDefinition) -> CatalogResult<()> {
    if item.id.trim().is_empty() {
        return Err(CatalogError::InvalidItem("id is required".to_string()));
    }
    if item.name.trim().is_empty() {
        return Err(CatalogError::InvalidItem("name is required".to_string()));
    }

    match item.quantity_mode.unwrap_or(QuantityMode::Fixed) {
        QuantityMode::Fixed => {
            if item
                .quantity
                .is_some_and(|quantity| !(1..=MAX_ITEM_QUANTITY).contains(&quantity))
            {
                return Err(CatalogError::InvalidItem(format!(
                    "quantity must be between 1 and {MAX_ITEM_QUANTITY}"
                )));
            }
        }
        QuantityMode::PerDay => {
            if !item
                .daily_factor
                .is_some_and(|factor| factor > 0.0 && factor <= MAX_DAILY_FACTOR)
            {
                return Err(CatalogError::InvalidItem(format!(
                    "daily factor must be greater than 0 and at most {MAX_DAILY_FACTOR}"
                )));
            }
        }
    }

    if item
        .applicable_destinations
        .as_ref()
        .is_some_and(|destinations| destinations.is_empty())
    {
        return Err(CatalogError::InvalidItem(
            "at least one destination is required".to_string(),
        ));
    }

    Ok(())
}

/// Owns the catalog persistence port and the factory configuration it is seeded from.
pub struct CatalogService {
    storage: Arc<dyn CatalogStorage>,
    factory: ItemsConfiguration,
    // Serializes read-modify-write edits.
    write_lock: Mutex<()>,
}

impl CatalogService {
    /// Creates a service seeded from the embedded factory catalog.
    pub fn new(storage: Arc<dyn CatalogStorage>) -> CatalogResult<Self> {
        Ok(Self::with_factory(storage, factory_configuration()?))
    }

    pub fn with_factory(storage: Arc<dyn CatalogStorage>, factory: ItemsConfiguration) -> Self {
        Self {
            storage,
            factory,
            write_lock: Mutex::new(()),
        }
    }

    /// Catalog-wide defaults applied before generation.
    pub fn defaults(&self) -> CatalogDefaults {
        self.factory.defaults.clone().unwrap_or_default()
    }

    /// All stored items. The first call on empty storage seeds the factory catalog.
    pub async fn load_all(&self) -> CatalogResult<Vec<ItemDefinition>> {
        if let Some(items) = self.storage.load_items().await? {
            return Ok(items);
        }

        let items = self.factory.factory_items();
        self.storage.save_items(&items).await?;
        tracing::info!(count = items.len(), "Initialized catalog from factory defaults");
        Ok(items)
    }

    /// One consistent copy of the catalog with the defaults applied, ready for the engine.
    pub async fn snapshot(&self) -> CatalogResult<Vec<ItemDefinition>> {
        let items = self.load_all().await?;
        Ok(resolve_catalog(&items, &self.defaults()))
    }

    /// Replaces the whole catalog. Ids must be unique.
    pub async fn save_all(&self, items: &[ItemDefinition]) -> CatalogResult<()> {
        let _guard = self.write_lock.lock().await;
        self.save_unique(items).await
    }

    async fn save_unique(&self, items: &[ItemDefinition]) -> CatalogResult<()> {
        let mut seen = HashSet::new();
        if let Some(duplicate) = items.iter().find(|item| !seen.insert(item.id.as_str())) {
            return Err(CatalogError::DuplicateId(duplicate.id.clone()));
        }
        self.storage.save_items(items).await?;
        tracing::debug!(count = items.len(), "Saved catalog");
        Ok(())
    }

    /// Adds a user-defined item. The id is normalized to lowercase snake case.
    pub async fn add(&self, mut item: ItemDefinition) -> CatalogResult<ItemDefinition> {
        item.id = normalize_id(&item.id);
        item.name = item.name.trim().to_string();
        item.is_user_defined = true;
        validate_item(&item)?;

        let _guard = self.write_lock.lock().await;
        let mut items = self.load_all().await?;
        if items.iter().any(|existing| existing.id == item.id) {
            return Err(CatalogError::DuplicateId(item.id));
        }

        items.push(item.clone());
        self.storage.save_items(&items).await?;
        tracing::info!(id = %item.id, "Added catalog item");
        Ok(item)
    }

    pub async fn update(&self, id: &str, patch: ItemPatch) -> CatalogResult<ItemDefinition> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.load_all().await?;
        let item = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

        item.apply_patch(patch);
        validate_item(item)?;
        let updated = item.clone();

        self.storage.save_items(&items).await?;
        tracing::info!(id, "Updated catalog item");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> CatalogResult<()> {
        let _guard = self.write_lock.lock().await;
        let items = self.load_all().await?;
        let remaining: Vec<_> = items.iter().filter(|item| item.id != id).cloned().collect();

        if remaining.len() == items.len() {
            return Err(CatalogError::NotFound(id.to_string()));
        }

        self.storage.save_items(&remaining).await?;
        tracing::info!(id, "Deleted catalog item");
        Ok(())
    }

    /// Drops every user edit and reseeds the factory catalog.
    pub async fn restore_factory_defaults(&self) -> CatalogResult<Vec<ItemDefinition>> {
        let _guard = self.write_lock.lock().await;
        self.storage.clear().await?;
        let items = self.load_all().await?;
        tracing::info!("Restored items to factory defaults");
        Ok(items)
    }

    pub async fn get(&self, id: &str) -> CatalogResult<ItemDefinition> {
        self.load_all()
            .await?
            .into_iter()
            .find(|item| item.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    pub async fn by_category(&self, category: ItemCategory) -> CatalogResult<Vec<ItemDefinition>> {
        let mut items = self.load_all().await?;
        items.retain(|item| item.category == category);
        Ok(items)
    }

    /// Case-insensitive substring match on name or id.
    pub async fn search(&self, query: &str) -> CatalogResult<Vec<ItemDefinition>> {
        let needle = query.to_lowercase();
        let mut items = self.load_all().await?;
        items.retain(|item| {
            item.name.to_lowercase().contains(&needle) || item.id.to_lowercase().contains(&needle)
        });
        Ok(items)
    }

    pub async fn export_json(&self, now: DateTime<Utc>) -> CatalogResult<String> {
        let items = self.load_all().await?;
        Ok(exchange::export_json(&items, now)?)
    }

    pub async fn export_csv(&self) -> CatalogResult<String> {
        let items = self.load_all().await?;
        Ok(exchange::export_csv(&items))
    }

    /// Replaces the catalog with the items of a JSON document. Returns the item count.
    pub async fn import_json(&self, json: &str) -> CatalogResult<usize> {
        let items = exchange::import_json(json)?;
        self.save_all(&items).await?;
        tracing::info!(count = items.len(), "Imported items from JSON");
        Ok(items.len())
    }

    /// Replaces the catalog with the rows of a CSV table. Returns the item count.
    pub async fn import_csv(&self, csv: &str) -> CatalogResult<usize> {
        let items = exchange::import_csv(csv)?;
        self.save_all(&items).await?;
        tracing::info!(count = items.len(), "Imported items from CSV");
        Ok(items.len())
    }
}
