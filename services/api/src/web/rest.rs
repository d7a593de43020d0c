//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the packing list endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::items;
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use packing_list_core::catalog::CatalogError;
use packing_list_core::domain::{
    Destination, ItemCategory, ItemDefinition, ItemPatch, Language, PackingList, QuantityMode,
    ResolvedListEntry, Season, SuggestedItem, TripConfiguration,
};
use packing_list_core::engine::build_packing_list;
use packing_list_core::enhancement::{enhance, item_tip};
use packing_list_core::grouping::{group_with_labels, total_count, CategoryGroup};
use packing_list_core::localization::{params, LocaleContext};
use packing_list_core::ports::{Localizer, PortError};
use packing_list_core::reminders::{build_reminders, export_to_reminders};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        generate_packing_list_handler,
        list_packing_lists_handler,
        get_packing_list_handler,
        delete_packing_list_handler,
        accept_suggestion_handler,
        decline_suggestion_handler,
        export_reminders_handler,
        item_tip_handler,
        last_trip_handler,
        items::list_items_handler,
        items::create_item_handler,
        items::get_item_handler,
        items::update_item_handler,
        items::delete_item_handler,
        items::search_items_handler,
        items::restore_items_handler,
        items::export_items_json_handler,
        items::export_items_csv_handler,
        items::import_items_json_handler,
        items::import_items_csv_handler,
    ),
    components(
        schemas(
            TripRequest, PackingListResponse, HistoryResponse, RemindersResponse,
            ItemTipRequest, ItemTipResponse, LastTripResponse,
            items::ItemsResponse, items::ImportResponse,
            PackingList, ResolvedListEntry, SuggestedItem, TripConfiguration, CategoryGroup,
            ItemDefinition, ItemPatch, ItemCategory, QuantityMode, Season, Destination, Language,
        )
    ),
    tags(
        (name = "Packing List API", description = "Generate packing lists for a trip and manage the item catalog.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Mapping
//=========================================================================================

pub type HandlerError = (StatusCode, String);

/// Maps catalog failures onto HTTP statuses.
pub fn catalog_error(e: CatalogError) -> HandlerError {
    match e {
        CatalogError::DuplicateId(_) => (StatusCode::CONFLICT, e.to_string()),
        CatalogError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
        CatalogError::InvalidItem(_) | CatalogError::Exchange(_) => {
            (StatusCode::BAD_REQUEST, e.to_string())
        }
        CatalogError::Factory(_) | CatalogError::Port(_) => {
            error!("Catalog operation failed: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Catalog operation failed".to_string(),
            )
        }
    }
}

pub fn port_error(e: PortError) -> HandlerError {
    match e {
        PortError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        PortError::Unavailable(_) | PortError::Unexpected(_) => {
            error!("Storage operation failed: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Storage operation failed".to_string(),
            )
        }
    }
}

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// Selects the response language. Defaults to the configured language.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct LanguageQuery {
    pub lang: Option<Language>,
}

/// The trip to generate a list for. Without a season, the current one is used.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    pub number_of_days: u32,
    #[serde(default)]
    pub is_home: bool,
    #[serde(default)]
    pub has_big_luggage: bool,
    pub season: Option<Season>,
    #[serde(default, rename = "useAI")]
    pub use_ai: bool,
}

impl TripRequest {
    fn into_trip(self) -> TripConfiguration {
        TripConfiguration {
            number_of_days: self.number_of_days,
            is_home_destination: self.is_home,
            has_large_luggage: self.has_big_luggage,
            current_season: self.season.unwrap_or_else(|| Season::current(Utc::now())),
            use_enhancement: self.use_ai,
        }
    }
}

/// A packing list with its display groups and totals.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PackingListResponse {
    pub list: PackingList,
    pub groups: Vec<CategoryGroup>,
    pub total_items: u32,
    pub total_label: String,
}

impl PackingListResponse {
    fn new(list: PackingList, locale: &LocaleContext) -> Self {
        let total_items = total_count(&list);
        Self {
            groups: group_with_labels(&list, locale),
            total_label: locale.resolve(
                "list.summary.totalItems",
                Some(&params([("count", total_items)])),
            ),
            total_items,
            list,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryResponse {
    /// Oldest first.
    pub lists: Vec<PackingList>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RemindersResponse {
    pub exported: bool,
    pub reminders: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemTipRequest {
    pub item_name: String,
    pub trip: TripConfiguration,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemTipResponse {
    pub tip: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LastTripResponse {
    pub trip: Option<TripConfiguration>,
}

//=========================================================================================
// Packing List Handlers
//=========================================================================================

/// Generate a packing list for a trip.
///
/// Enhancement runs only when requested and never fails the request: if the model is
/// unavailable the base list is returned with `aiEnhanced = false`.
#[utoipa::path(
    post,
    path = "/packing-lists",
    request_body = TripRequest,
    params(LanguageQuery),
    responses(
        (status = 201, description = "Packing list generated", body = PackingListResponse),
        (status = 400, description = "Invalid trip"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn generate_packing_list_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<LanguageQuery>,
    Json(request): Json<TripRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if request.number_of_days == 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "numberOfDays must be at least 1".to_string(),
        ));
    }

    let trip = request.into_trip();
    let locale = app_state.locale(query.lang);

    let snapshot = app_state.catalog.snapshot().await.map_err(catalog_error)?;
    let mut list = build_packing_list(&snapshot, &trip, &locale, Utc::now());

    if trip.use_enhancement {
        list = enhance(list, app_state.enhancement.as_ref(), locale.language).await;
    }

    if let Err(e) = app_state.history.save_packing_list(&list).await {
        warn!(list_id = %list.id, "Could not record packing list in history: {}", e);
    }
    if let Err(e) = app_state.history.save_last_trip(&trip).await {
        warn!("Could not remember last trip: {}", e);
    }

    info!(
        list_id = %list.id,
        entries = list.entries.len(),
        enhanced = list.enhanced,
        "Packing list generated"
    );
    Ok((
        StatusCode::CREATED,
        Json(PackingListResponse::new(list, &locale)),
    ))
}

/// List the recently generated packing lists.
#[utoipa::path(
    get,
    path = "/packing-lists",
    responses(
        (status = 200, description = "Stored packing lists", body = HistoryResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_packing_lists_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<HistoryResponse>, HandlerError> {
    let lists = app_state
        .history
        .list_packing_lists()
        .await
        .map_err(port_error)?;
    Ok(Json(HistoryResponse { lists }))
}

/// Fetch one stored packing list.
#[utoipa::path(
    get,
    path = "/packing-lists/{id}",
    params(("id" = Uuid, Path, description = "Packing list id"), LanguageQuery),
    responses(
        (status = 200, description = "The packing list", body = PackingListResponse),
        (status = 404, description = "Unknown packing list")
    )
)]
pub async fn get_packing_list_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<PackingListResponse>, HandlerError> {
    let list = app_state
        .history
        .get_packing_list(id)
        .await
        .map_err(port_error)?;
    Ok(Json(PackingListResponse::new(list, &app_state.locale(query.lang))))
}

/// Delete a stored packing list.
#[utoipa::path(
    delete,
    path = "/packing-lists/{id}",
    params(("id" = Uuid, Path, description = "Packing list id")),
    responses(
        (status = 204, description = "Packing list deleted"),
        (status = 404, description = "Unknown packing list")
    )
)]
pub async fn delete_packing_list_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HandlerError> {
    let _guard = app_state.history_edits.lock().await;
    app_state
        .history
        .delete_packing_list(id)
        .await
        .map_err(port_error)?;
    info!(list_id = %id, "Packing list deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn update_suggestion(
    app_state: &AppState,
    id: Uuid,
    index: usize,
    accept: bool,
) -> Result<PackingList, HandlerError> {
    let _guard = app_state.history_edits.lock().await;
    let mut list = app_state
        .history
        .get_packing_list(id)
        .await
        .map_err(port_error)?;

    let found = if accept {
        list.accept_suggestion(index).is_some()
    } else {
        list.decline_suggestion(index).is_some()
    };
    if !found {
        return Err((
            StatusCode::NOT_FOUND,
            format!("Packing list {} has no suggestion {}", id, index),
        ));
    }

    app_state
        .history
        .save_packing_list(&list)
        .await
        .map_err(port_error)?;
    Ok(list)
}

/// Move a suggested item into the list.
#[utoipa::path(
    post,
    path = "/packing-lists/{id}/suggestions/{index}/accept",
    params(
        ("id" = Uuid, Path, description = "Packing list id"),
        ("index" = usize, Path, description = "Position in `suggestedItems`"),
        LanguageQuery
    ),
    responses(
        (status = 200, description = "Suggestion accepted", body = PackingListResponse),
        (status = 404, description = "Unknown packing list or suggestion")
    )
)]
pub async fn accept_suggestion_handler(
    State(app_state): State<Arc<AppState>>,
    Path((id, index)): Path<(Uuid, usize)>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<PackingListResponse>, HandlerError> {
    let list = update_suggestion(&app_state, id, index, true).await?;
    Ok(Json(PackingListResponse::new(list, &app_state.locale(query.lang))))
}

/// Dismiss a suggested item.
#[utoipa::path(
    post,
    path = "/packing-lists/{id}/suggestions/{index}/decline",
    params(
        ("id" = Uuid, Path, description = "Packing list id"),
        ("index" = usize, Path, description = "Position in `suggestedItems`"),
        LanguageQuery
    ),
    responses(
        (status = 200, description = "Suggestion declined", body = PackingListResponse),
        (status = 404, description = "Unknown packing list or suggestion")
    )
)]
pub async fn decline_suggestion_handler(
    State(app_state): State<Arc<AppState>>,
    Path((id, index)): Path<(Uuid, usize)>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<PackingListResponse>, HandlerError> {
    let list = update_suggestion(&app_state, id, index, false).await?;
    Ok(Json(PackingListResponse::new(list, &app_state.locale(query.lang))))
}

/// Export a stored packing list to the reminders store.
#[utoipa::path(
    post,
    path = "/packing-lists/{id}/reminders",
    params(("id" = Uuid, Path, description = "Packing list id"), LanguageQuery),
    responses(
        (status = 200, description = "Export outcome", body = RemindersResponse),
        (status = 404, description = "Unknown packing list")
    )
)]
pub async fn export_reminders_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<RemindersResponse>, HandlerError> {
    let list = app_state
        .history
        .get_packing_list(id)
        .await
        .map_err(port_error)?;
    let locale = app_state.locale(query.lang);

    let exported = export_to_reminders(&list, app_state.reminders.as_ref(), &locale).await;
    let reminders = if exported {
        build_reminders(&list, &locale).reminder_count()
    } else {
        0
    };
    Ok(Json(RemindersResponse { exported, reminders }))
}

/// Ask for a short packing tip about one item.
#[utoipa::path(
    post,
    path = "/packing-lists/tips",
    request_body = ItemTipRequest,
    params(LanguageQuery),
    responses(
        (status = 200, description = "A tip, or a localized fallback text", body = ItemTipResponse)
    )
)]
pub async fn item_tip_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<LanguageQuery>,
    Json(request): Json<ItemTipRequest>,
) -> Json<ItemTipResponse> {
    let locale = app_state.locale(query.lang);
    let tip = item_tip(
        app_state.enhancement.as_ref(),
        &request.item_name,
        &request.trip,
        &locale,
        locale.language,
    )
    .await;
    Json(ItemTipResponse { tip })
}

/// The trip configured most recently, used to prefill the trip form.
#[utoipa::path(
    get,
    path = "/trips/last",
    responses(
        (status = 200, description = "Last trip, if any", body = LastTripResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn last_trip_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<LastTripResponse>, HandlerError> {
    let trip = app_state.history.last_trip().await.map_err(port_error)?;
    Ok(Json(LastTripResponse { trip }))
}
