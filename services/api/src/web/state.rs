//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use packing_list_core::catalog::CatalogService;
use packing_list_core::domain::Language;
use packing_list_core::localization::{LocaleContext, TextCatalog};
use packing_list_core::ports::{EnhancementService, ReminderExporter, TripHistory};
use std::sync::Arc;
use tokio::sync::Mutex;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<CatalogService>,
    pub history: Arc<dyn TripHistory>,
    pub enhancement: Arc<dyn EnhancementService>,
    pub reminders: Arc<dyn ReminderExporter>,
    pub texts: Arc<TextCatalog>,
    /// Held while a stored packing list is read, edited and saved back.
    pub history_edits: Arc<Mutex<()>>,
}

impl AppState {
    /// A localizer for the requested language, or the configured default.
    pub fn locale(&self, language: Option<Language>) -> LocaleContext {
        LocaleContext::new(
            language.unwrap_or(self.config.default_language),
            Arc::clone(&self.texts),
        )
    }
}
