//! services/api/src/web/items.rs
//!
//! Axum handlers for the item catalog: CRUD, search, factory reset, import and export.

use crate::web::rest::{catalog_error, HandlerError};
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use chrono::Utc;
use packing_list_core::domain::{ItemCategory, ItemDefinition, ItemPatch};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemsResponse {
    pub items: Vec<ItemDefinition>,
    pub total: usize,
}

impl From<Vec<ItemDefinition>> for ItemsResponse {
    fn from(items: Vec<ItemDefinition>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImportResponse {
    pub imported: usize,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CategoryQuery {
    pub category: Option<ItemCategory>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Matched case-insensitively against item names and ids.
    pub q: String,
}

//=========================================================================================
// Catalog Handlers
//=========================================================================================

/// List the catalog, optionally restricted to one category.
#[utoipa::path(
    get,
    path = "/items",
    params(CategoryQuery),
    responses(
        (status = 200, description = "Catalog items", body = ItemsResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_items_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<ItemsResponse>, HandlerError> {
    let items = match query.category {
        Some(category) => app_state.catalog.by_category(category).await,
        None => app_state.catalog.load_all().await,
    }
    .map_err(catalog_error)?;
    Ok(Json(items.into()))
}

/// Add a user-defined item. The id is normalized to snake case.
#[utoipa::path(
    post,
    path = "/items",
    request_body = ItemDefinition,
    responses(
        (status = 201, description = "Item created", body = ItemDefinition),
        (status = 400, description = "Item does not pass validation"),
        (status = 409, description = "An item with this id already exists")
    )
)]
pub async fn create_item_handler(
    State(app_state): State<Arc<AppState>>,
    Json(item): Json<ItemDefinition>,
) -> Result<impl IntoResponse, HandlerError> {
    let item = app_state.catalog.add(item).await.map_err(catalog_error)?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    get,
    path = "/items/{id}",
    params(("id" = String, Path, description = "Item id")),
    responses(
        (status = 200, description = "The item", body = ItemDefinition),
        (status = 404, description = "Unknown item")
    )
)]
pub async fn get_item_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ItemDefinition>, HandlerError> {
    let item = app_state.catalog.get(&id).await.map_err(catalog_error)?;
    Ok(Json(item))
}

/// Update an item field by field. Fields missing from the body are kept.
#[utoipa::path(
    put,
    path = "/items/{id}",
    params(("id" = String, Path, description = "Item id")),
    request_body = ItemPatch,
    responses(
        (status = 200, description = "The updated item", body = ItemDefinition),
        (status = 400, description = "Updated item does not pass validation"),
        (status = 404, description = "Unknown item")
    )
)]
pub async fn update_item_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<ItemPatch>,
) -> Result<Json<ItemDefinition>, HandlerError> {
    let item = app_state
        .catalog
        .update(&id, patch)
        .await
        .map_err(catalog_error)?;
    Ok(Json(item))
}

#[utoipa::path(
    delete,
    path = "/items/{id}",
    params(("id" = String, Path, description = "Item id")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "Unknown item")
    )
)]
pub async fn delete_item_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, HandlerError> {
    app_state.catalog.delete(&id).await.map_err(catalog_error)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/items/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching items", body = ItemsResponse)
    )
)]
pub async fn search_items_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ItemsResponse>, HandlerError> {
    let items = app_state
        .catalog
        .search(&query.q)
        .await
        .map_err(catalog_error)?;
    Ok(Json(items.into()))
}

/// Discard every change to the catalog and restore the built-in items.
#[utoipa::path(
    post,
    path = "/items/restore",
    responses(
        (status = 200, description = "The factory catalog", body = ItemsResponse)
    )
)]
pub async fn restore_items_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<ItemsResponse>, HandlerError> {
    let items = app_state
        .catalog
        .restore_factory_defaults()
        .await
        .map_err(catalog_error)?;
    Ok(Json(items.into()))
}

#[utoipa::path(
    get,
    path = "/items/export.json",
    responses(
        (status = 200, description = "Versioned catalog document", content_type = "application/json", body = String)
    )
)]
pub async fn export_items_json_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HandlerError> {
    let json = app_state
        .catalog
        .export_json(Utc::now())
        .await
        .map_err(catalog_error)?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"packing-items.json\""),
        ],
        json,
    ))
}

#[utoipa::path(
    get,
    path = "/items/export.csv",
    responses(
        (status = 200, description = "Catalog as a CSV table", content_type = "text/csv", body = String)
    )
)]
pub async fn export_items_csv_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HandlerError> {
    let csv = app_state.catalog.export_csv().await.map_err(catalog_error)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"packing-items.csv\""),
        ],
        csv,
    ))
}

/// Replace the catalog with the items of a JSON document.
#[utoipa::path(
    post,
    path = "/items/import.json",
    request_body(content = String, content_type = "application/json", description = "A document produced by the JSON export."),
    responses(
        (status = 200, description = "Catalog replaced", body = ImportResponse),
        (status = 400, description = "Document is not a valid catalog"),
        (status = 409, description = "Document repeats an item id")
    )
)]
pub async fn import_items_json_handler(
    State(app_state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<ImportResponse>, HandlerError> {
    let imported = app_state
        .catalog
        .import_json(&body)
        .await
        .map_err(catalog_error)?;
    info!(imported, "Catalog replaced from JSON import");
    Ok(Json(ImportResponse { imported }))
}

/// Replace the catalog with the rows of a CSV table.
#[utoipa::path(
    post,
    path = "/items/import.csv",
    request_body(content = String, content_type = "text/csv", description = "A table with the CSV export header."),
    responses(
        (status = 200, description = "Catalog replaced", body = ImportResponse),
        (status = 400, description = "Table is not a valid catalog"),
        (status = 409, description = "Table repeats an item id")
    )
)]
pub async fn import_items_csv_handler(
    State(app_state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<ImportResponse>, HandlerError> {
    let imported = app_state
        .catalog
        .import_csv(&body)
        .await
        .map_err(catalog_error)?;
    info!(imported, "Catalog replaced from CSV import");
    Ok(Json(ImportResponse { imported }))
}
