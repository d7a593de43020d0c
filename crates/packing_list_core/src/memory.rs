//! crates/packing_list_core/src/memory.rs
//!
//! In-process implementations of the storage ports. Used by the service when no
//! database is configured, and by tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

use crate::domain::{ItemDefinition, PackingList, TripConfiguration};
use crate::ports::{CatalogStorage, PortError, PortResult, ReminderExporter, TripHistory};
use crate::reminders::ReminderBatch;
use crate::HISTORY_LIMIT;

fn poisoned<T>(_: PoisonError<T>) -> PortError {
    PortError::Unexpected("in-memory store lock poisoned".to_string())
}

/// Keeps the catalog in memory. Reads hand out owned copies.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStorage {
    items: RwLock<Option<Vec<ItemDefinition>>>,
}

#[async_trait]
impl CatalogStorage for InMemoryCatalogStorage {
    async fn load_items(&self) -> PortResult<Option<Vec<ItemDefinition>>> {
        Ok(self.items.read().map_err(poisoned)?.clone())
    }

    async fn save_items(&self, items: &[ItemDefinition]) -> PortResult<()> {
        *self.items.write().map_err(poisoned)? = Some(items.to_vec());
        Ok(())
    }

    async fn clear(&self) -> PortResult<()> {
        *self.items.write().map_err(poisoned)? = None;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTripHistory {
    lists: RwLock<VecDeque<PackingList>>,
    last_trip: RwLock<Option<TripConfiguration>>,
}

#[async_trait]
impl TripHistory for InMemoryTripHistory {
    async fn save_packing_list(&self, list: &PackingList) -> PortResult<()> {
        let mut lists = self.lists.write().map_err(poisoned)?;
        lists.retain(|existing| existing.id != list.id);
        lists.push_back(list.clone());
        while lists.len() > HISTORY_LIMIT {
            lists.pop_front();
        }
        Ok(())
    }

    async fn list_packing_lists(&self) -> PortResult<Vec<PackingList>> {
        Ok(self.lists.read().map_err(poisoned)?.iter().cloned().collect())
    }

    async fn get_packing_list(&self, id: Uuid) -> PortResult<PackingList> {
        self.lists
            .read()
            .map_err(poisoned)?
            .iter()
            .find(|list| list.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Packing list {} not found", id)))
    }

    async fn delete_packing_list(&self, id: Uuid) -> PortResult<()> {
        let mut lists = self.lists.write().map_err(poisoned)?;
        let before = lists.len();
        lists.retain(|list| list.id != id);
        if lists.len() == before {
            return Err(PortError::NotFound(format!("Packing list {} not found", id)));
        }
        Ok(())
    }

    async fn save_last_trip(&self, trip: &TripConfiguration) -> PortResult<()> {
        *self.last_trip.write().map_err(poisoned)? = Some(*trip);
        Ok(())
    }

    async fn last_trip(&self) -> PortResult<Option<TripConfiguration>> {
        Ok(*self.last_trip.read().map_err(poisoned)?)
    }
}

/// Collects exported batches in memory. Permission is fixed at construction.
#[derive(Debug)]
pub struct InMemoryReminderStore {
    granted: bool,
    batches: RwLock<Vec<ReminderBatch>>,
}

impl InMemoryReminderStore {
    pub fn new(granted: bool) -> Self {
        Self {
            granted,
            batches: RwLock::new(Vec::new()),
        }
    }

    pub fn batches(&self) -> PortResult<Vec<ReminderBatch>> {
        Ok(self.batches.read().map_err(poisoned)?.clone())
    }
}

#[async_trait]
impl ReminderExporter for InMemoryReminderStore {
    async fn has_permission(&self) -> bool {
        self.granted
    }

    async fn create_reminders(&self, batch: &ReminderBatch) -> PortResult<()> {
        self.batches.write().map_err(poisoned)?.push(batch.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Season;
    use chrono::Utc;

    fn list(days: u32) -> PackingList {
        PackingList {
            id: Uuid::new_v4(),
            trip: TripConfiguration {
                number_of_days: days,
                is_home_destination: false,
                has_large_luggage: false,
                current_season: Season::Spring,
                use_enhancement: false,
            },
            entries: Vec::new(),
            generated_at: Utc::now(),
            enhanced: false,
            enhancement_summary: None,
            suggested_items: Vec::new(),
        }
    }

    #[tokio::test]
    async fn catalog_storage_starts_empty_and_clears() {
        let storage = InMemoryCatalogStorage::default();
        assert!(storage.load_items().await.unwrap().is_none());

        storage.save_items(&[]).await.unwrap();
        assert_eq!(storage.load_items().await.unwrap(), Some(Vec::new()));

        storage.clear().await.unwrap();
        assert!(storage.load_items().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn history_keeps_the_most_recent_lists() {
        let history = InMemoryTripHistory::default();
        let lists: Vec<_> = (1..=12).map(list).collect();
        for list in &lists {
            history.save_packing_list(list).await.unwrap();
        }

        let stored = history.list_packing_lists().await.unwrap();
        assert_eq!(stored.len(), HISTORY_LIMIT);
        assert_eq!(stored[0].trip.number_of_days, 3);
        assert_eq!(stored[9].trip.number_of_days, 12);

        history.delete_packing_list(lists[5].id).await.unwrap();
        assert!(matches!(
            history.get_packing_list(lists[5].id).await,
            Err(PortError::NotFound(_))
        ));
        assert!(matches!(
            history.delete_packing_list(lists[0].id).await,
            Err(PortError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn last_trip_round_trips() {
        let history = InMemoryTripHistory::default();
        assert!(history.last_trip().await.unwrap().is_none());
        let trip = list(4).trip;
        history.save_last_trip(&trip).await.unwrap();
        assert_eq!(history.last_trip().await.unwrap(), Some(trip));
    }
}
