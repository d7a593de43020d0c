pub mod items;
pub mod rest;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use state::AppState;
use std::sync::Arc;

pub use rest::ApiDoc;

/// All REST routes, bound to the shared state. CORS and Swagger UI are layered on by the binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    let packing_lists = Router::new()
        .route(
            "/packing-lists",
            post(rest::generate_packing_list_handler).get(rest::list_packing_lists_handler),
        )
        .route("/packing-lists/tips", post(rest::item_tip_handler))
        .route(
            "/packing-lists/{id}",
            get(rest::get_packing_list_handler).delete(rest::delete_packing_list_handler),
        )
        .route(
            "/packing-lists/{id}/suggestions/{index}/accept",
            post(rest::accept_suggestion_handler),
        )
        .route(
            "/packing-lists/{id}/suggestions/{index}/decline",
            post(rest::decline_suggestion_handler),
        )
        .route(
            "/packing-lists/{id}/reminders",
            post(rest::export_reminders_handler),
        )
        .route("/trips/last", get(rest::last_trip_handler));

    let items = Router::new()
        .route(
            "/items",
            get(items::list_items_handler).post(items::create_item_handler),
        )
        .route("/items/search", get(items::search_items_handler))
        .route("/items/restore", post(items::restore_items_handler))
        .route("/items/export.json", get(items::export_items_json_handler))
        .route("/items/export.csv", get(items::export_items_csv_handler))
        .route("/items/import.json", post(items::import_items_json_handler))
        .route("/items/import.csv", post(items::import_items_csv_handler))
        .route(
            "/items/{id}",
            get(items::get_item_handler)
                .put(items::update_item_handler)
                .delete(items::delete_item_handler),
        );

    Router::new()
        .merge(packing_lists)
        .merge(items)
        .with_state(app_state)
}
