//! crates/packing_list_core/src/reminders.rs
//!
//! Turns a finished packing list into reminders for an external reminders store.

use serde::Serialize;

use crate::domain::PackingList;
use crate::localization::params;
use crate::ports::{Localizer, ReminderExporter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderDraft {
    pub title: String,
    pub notes: String,
    pub completed: bool,
}

/// Everything needed to export one list: the target list name, one summary
/// reminder for the trip and one reminder per entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderBatch {
    pub list_name: String,
    pub trip: ReminderDraft,
    pub items: Vec<ReminderDraft>,
}

impl ReminderBatch {
    /// Number of reminders the batch creates, the trip summary included.
    pub fn reminder_count(&self) -> usize {
        self.items.len() + 1
    }
}

pub fn build_reminders(list: &PackingList, locale: &dyn Localizer) -> ReminderBatch {
    let trip_title_key = if list.trip.is_home_destination {
        "reminders.tripTitle.home"
    } else {
        "reminders.tripTitle.general"
    };
    let title = locale.resolve(trip_title_key, Some(&params([("days", list.trip.number_of_days)])));

    let season = locale.text(&format!("config.season.{}", list.trip.current_season));
    let enhanced = if list.enhanced {
        locale.text("reminders.tripNotes.yes")
    } else {
        locale.text("reminders.tripNotes.no")
    };
    let notes = format!(
        "{} {}\n{} {}\n{} {}",
        locale.text("reminders.tripNotes.generated"),
        list.generated_at.format("%Y-%m-%d"),
        locale.text("reminders.tripNotes.season"),
        season,
        locale.text("reminders.tripNotes.aiEnhanced"),
        enhanced,
    );

    let items = list
        .entries
        .iter()
        .map(|entry| {
            let title = if entry.quantity > 1 {
                locale.resolve(
                    "reminders.itemTitle.withQuantity",
                    Some(&params([
                        ("name", entry.display_name.clone()),
                        ("quantity", entry.quantity.to_string()),
                    ])),
                )
            } else {
                locale.resolve(
                    "reminders.itemTitle.single",
                    Some(&params([("name", entry.display_name.clone())])),
                )
            };

            let mut notes = format!(
                "{} {}",
                locale.text("reminders.itemNotes.category"),
                locale.text(&entry.category.text_key())
            );
            if let Some(tip) = &entry.enhancement_note {
                notes.push_str(&format!("\n\n{} {}", locale.text("reminders.itemNotes.aiTip"), tip));
            }

            ReminderDraft {
                title,
                notes,
                completed: false,
            }
        })
        .collect();

    ReminderBatch {
        list_name: locale.text("reminders.listName"),
        trip: ReminderDraft {
            title,
            notes,
            completed: false,
        },
        items,
    }
}

/// Exports the list and reports success. Missing permission or a store error yields `false`.
pub async fn export_to_reminders(
    list: &PackingList,
    exporter: &dyn ReminderExporter,
    locale: &dyn Localizer,
) -> bool {
    if !exporter.has_permission().await {
        tracing::warn!(list_id = %list.id, "Reminders permission not granted");
        return false;
    }

    let batch = build_reminders(list, locale);
    match exporter.create_reminders(&batch).await {
        Ok(()) => {
            tracing::info!(list_id = %list.id, reminders = batch.reminder_count(), "Exported packing list to reminders");
            true
        }
        Err(e) => {
            tracing::error!(list_id = %list.id, "Error exporting to reminders: {}", e);
            false
        }
    }
}
