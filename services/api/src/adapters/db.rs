//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, the PostgreSQL implementation of the
//! `CatalogStorage`, `TripHistory` and `ReminderExporter` ports from the core crate.
//!
//! Catalog, lists and trips are stored as JSONB documents in their exchange shape, so
//! the domain types stay the single source of truth for their layout.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use packing_list_core::domain::{ItemDefinition, PackingList, TripConfiguration};
use packing_list_core::ports::{
    CatalogStorage, PortError, PortResult, ReminderExporter, TripHistory,
};
use packing_list_core::reminders::ReminderBatch;
use packing_list_core::HISTORY_LIMIT;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the storage ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
    reminders_enabled: bool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`. `reminders_enabled` is reported as the reminders permission.
    pub fn new(pool: PgPool, reminders_enabled: bool) -> Self {
        Self {
            pool,
            reminders_enabled,
        }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct CatalogRecord {
    items: Json<Vec<ItemDefinition>>,
}

#[derive(FromRow)]
struct PackingListRecord {
    id: Uuid,
    list: Json<PackingList>,
    generated_at: DateTime<Utc>,
}
impl PackingListRecord {
    fn to_domain(self) -> PackingList {
        let mut list = self.list.0;
        list.id = self.id;
        list.generated_at = self.generated_at;
        list
    }
}

#[derive(FromRow)]
struct TripRecord {
    trip: Json<TripConfiguration>,
}

//=========================================================================================
// `CatalogStorage` Trait Implementation
//=========================================================================================

#[async_trait]
impl CatalogStorage for DbAdapter {
    async fn load_items(&self) -> PortResult<Option<Vec<ItemDefinition>>> {
        let record = sqlx::query_as::<_, CatalogRecord>("SELECT items FROM catalog_state WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.map(|record| record.items.0))
    }

    async fn save_items(&self, items: &[ItemDefinition]) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO catalog_state (id, items, updated_at) VALUES (1, $1, NOW())
             ON CONFLICT (id) DO UPDATE SET items = EXCLUDED.items, updated_at = NOW()",
        )
        .bind(Json(items))
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn clear(&self) -> PortResult<()> {
        sqlx::query("DELETE FROM catalog_state WHERE id = 1")
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}

//=========================================================================================
// `TripHistory` Trait Implementation
//=========================================================================================

#[async_trait]
impl TripHistory for DbAdapter {
    async fn save_packing_list(&self, list: &PackingList) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        sqlx::query(
            "INSERT INTO packing_lists (id, list, generated_at, saved_at) VALUES ($1, $2, $3, NOW())
             ON CONFLICT (id) DO UPDATE SET list = EXCLUDED.list, saved_at = NOW()",
        )
        .bind(list.id)
        .bind(Json(list))
        .bind(list.generated_at)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;

        let trimmed = sqlx::query(
            "DELETE FROM packing_lists WHERE id NOT IN (
                 SELECT id FROM packing_lists ORDER BY saved_at DESC LIMIT $1
             )",
        )
        .bind(HISTORY_LIMIT as i64)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;

        if trimmed.rows_affected() > 0 {
            tracing::debug!(removed = trimmed.rows_affected(), "Trimmed packing list history");
        }
        Ok(())
    }

    async fn list_packing_lists(&self) -> PortResult<Vec<PackingList>> {
        let records = sqlx::query_as::<_, PackingListRecord>(
            "SELECT id, list, generated_at FROM packing_lists ORDER BY saved_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(PackingListRecord::to_domain).collect())
    }

    async fn get_packing_list(&self, id: Uuid) -> PortResult<PackingList> {
        let record = sqlx::query_as::<_, PackingListRecord>(
            "SELECT id, list, generated_at FROM packing_lists WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("Packing list {} not found", id)),
            _ => PortError::Unexpected(e.to_string()),
        })?;

        Ok(record.to_domain())
    }

    async fn delete_packing_list(&self, id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM packing_lists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Packing list {} not found", id)));
        }
        Ok(())
    }

    async fn save_last_trip(&self, trip: &TripConfiguration) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO last_trip (id, trip, updated_at) VALUES (1, $1, NOW())
             ON CONFLICT (id) DO UPDATE SET trip = EXCLUDED.trip, updated_at = NOW()",
        )
        .bind(Json(trip))
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn last_trip(&self) -> PortResult<Option<TripConfiguration>> {
        let record = sqlx::query_as::<_, TripRecord>("SELECT trip FROM last_trip WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.map(|record| record.trip.0))
    }
}

//=========================================================================================
// `ReminderExporter` Trait Implementation
//=========================================================================================

#[async_trait]
impl ReminderExporter for DbAdapter {
    async fn has_permission(&self) -> bool {
        self.reminders_enabled
    }

    async fn create_reminders(&self, batch: &ReminderBatch) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let drafts = std::iter::once(&batch.trip).chain(batch.items.iter());
        for (position, draft) in drafts.enumerate() {
            sqlx::query(
                "INSERT INTO reminders (id, list_name, title, notes, completed, packing_list_position)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(Uuid::new_v4())
            .bind(&batch.list_name)
            .bind(&draft.title)
            .bind(&draft.notes)
            .bind(draft.completed)
            .bind(position as i32)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        }

        tx.commit().await.map_err(unexpected)?;
        Ok(())
    }
}
