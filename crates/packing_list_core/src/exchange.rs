//! crates/packing_list_core/src/exchange.rs
//!
//! The two catalog exchange formats: a versioned JSON document and a flat CSV table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::domain::{Destination, ItemDefinition, Season};

/// Schema version written into exported JSON documents.
pub const CATALOG_SCHEMA_VERSION: u32 = 1;

/// Column order of the CSV format.
pub const CSV_HEADERS: [&str; 11] = [
    "id",
    "name",
    "category",
    "quantityType",
    "quantity",
    "dailyFactor",
    "seasons",
    "includeFor",
    "minDays",
    "requiresBigLuggage",
    "isCustom",
];

#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid JSON format: missing items array")]
    MissingItems,
    #[error("Invalid item at index {index}: {reason}")]
    InvalidItem { index: usize, reason: String },
    #[error("Invalid CSV at row {row}: {reason}")]
    Csv { row: usize, reason: String },
}

/// The JSON exchange document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    pub version: u32,
    pub last_modified: DateTime<Utc>,
    pub items: Vec<ItemDefinition>,
}

impl CatalogDocument {
    pub fn new(items: Vec<ItemDefinition>, last_modified: DateTime<Utc>) -> Self {
        Self {
            version: CATALOG_SCHEMA_VERSION,
            last_modified,
            items,
        }
    }
}

//=========================================================================================
// JSON
//=========================================================================================

pub fn export_json(items: &[ItemDefinition], now: DateTime<Utc>) -> Result<String, ExchangeError> {
    let document = CatalogDocument::new(items.to_vec(), now);
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Parses a JSON document, checking the `items` array and each item's required fields.
///
/// Only `items` is required at the top level; a missing version or timestamp is accepted.
pub fn import_json(json: &str) -> Result<Vec<ItemDefinition>, ExchangeError> {
    let document: Value = serde_json::from_str(json)?;

    if let Some(version) = document.get("version").and_then(Value::as_u64) {
        if version != u64::from(CATALOG_SCHEMA_VERSION) {
            tracing::warn!(version, "Catalog document has a different schema version");
        }
    }

    let raw_items = document
        .get("items")
        .and_then(Value::as_array)
        .ok_or(ExchangeError::MissingItems)?;

    raw_items
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            for field in ["id", "name", "category"] {
                let present = raw
                    .get(field)
                    .and_then(Value::as_str)
                    .is_some_and(|value| !value.trim().is_empty());
                if !present {
                    return Err(ExchangeError::InvalidItem {
                        index,
                        reason: format!("missing required field '{field}'"),
                    });
                }
            }
            serde_json::from_value(raw.clone()).map_err(|e| ExchangeError::InvalidItem {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}

//=========================================================================================
// CSV
//=========================================================================================

/// One row per item. Absent values are written as `fixed`, `1`, empty factor and `0`.
pub fn export_csv(items: &[ItemDefinition]) -> String {
    let mut lines = vec![CSV_HEADERS.join(",")];

    for item in items {
        let seasons = item
            .applicable_seasons
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|season| season.as_str())
            .collect::<Vec<_>>()
            .join(";");
        let destinations = item
            .applicable_destinations
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|destination| destination.as_str())
            .collect::<Vec<_>>()
            .join(";");

        let row = [
            quote(&item.id),
            quote(&item.name),
            item.category.as_str().to_string(),
            item.quantity_mode
                .map_or("fixed", |mode| mode.as_str())
                .to_string(),
            item.quantity.map_or_else(|| "1".to_string(), |q| q.to_string()),
            item.daily_factor.map(|f| f.to_string()).unwrap_or_default(),
            quote(&seasons),
            quote(&destinations),
            item.minimum_trip_days
                .map_or_else(|| "0".to_string(), |days| days.to_string()),
            item.requires_large_luggage.unwrap_or(false).to_string(),
            item.is_user_defined.to_string(),
        ];
        lines.push(row.join(","));
    }

    lines.join("\n")
}

/// Reads a table produced by [`export_csv`]. The header row must match [`CSV_HEADERS`].
pub fn import_csv(csv: &str) -> Result<Vec<ItemDefinition>, ExchangeError> {
    let mut records = parse_records(csv)?.into_iter().enumerate();

    match records.next() {
        Some((_, header)) if header.iter().map(String::as_str).eq(CSV_HEADERS) => {}
        _ => {
            return Err(ExchangeError::Csv {
                row: 1,
                reason: format!("expected header '{}'", CSV_HEADERS.join(",")),
            })
        }
    }

    records
        .filter(|(_, record)| !(record.len() == 1 && record[0].trim().is_empty()))
        .map(|(index, record)| item_from_record(index + 1, &record))
        .collect()
}

fn item_from_record(row: usize, record: &[String]) -> Result<ItemDefinition, ExchangeError> {
    let fail = |reason: String| ExchangeError::Csv { row, reason };

    if record.len() != CSV_HEADERS.len() {
        return Err(fail(format!(
            "expected {} columns, found {}",
            CSV_HEADERS.len(),
            record.len()
        )));
    }

    let field = |i: usize| record[i].trim();
    if field(0).is_empty() || field(1).is_empty() {
        return Err(fail("missing id or name".to_string()));
    }

    let mut item = ItemDefinition::new(
        field(0),
        field(1),
        field(2).parse().map_err(|e| fail(format!("{e}")))?,
    );
    item.quantity_mode = optional(field(3)).map_err(fail)?;
    item.quantity = optional(field(4)).map_err(fail)?;
    item.daily_factor = optional(field(5)).map_err(fail)?;
    item.applicable_seasons = list::<Season>(field(6)).map_err(fail)?;
    item.applicable_destinations = list::<Destination>(field(7)).map_err(fail)?;
    item.minimum_trip_days = optional(field(8)).map_err(fail)?;
    item.requires_large_luggage = Some(boolean(field(9)).map_err(fail)?);
    item.is_user_defined = boolean(field(10)).map_err(fail)?;
    Ok(item)
}

fn optional<T>(raw: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|e| format!("invalid value '{raw}': {e}"))
}

fn list<T>(raw: &str) -> Result<Option<Vec<T>>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let values = raw
        .split(';')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| value.parse().map_err(|e: T::Err| e.to_string()))
        .collect::<Result<Vec<T>, String>>()?;
    Ok((!values.is_empty()).then_some(values))
}

fn boolean(raw: &str) -> Result<bool, String> {
    match raw {
        "true" => Ok(true),
        "false" | "" => Ok(false),
        other => Err(format!("expected true or false, found '{other}'")),
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Splits CSV text into records. Quoted fields may contain commas, newlines and `""`.
fn parse_records(text: &str) -> Result<Vec<Vec<String>>, ExchangeError> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(ExchangeError::Csv {
            row: records.len() + 1,
            reason: "unterminated quoted field".to_string(),
        });
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ItemCategory, QuantityMode};
    use chrono::TimeZone;

    fn socks() -> ItemDefinition {
        let mut item = ItemDefinition::new("socks", "Socks, wool", ItemCategory::Clothes);
        item.quantity_mode = Some(QuantityMode::PerDay);
        item.daily_factor = Some(1.25);
        item.applicable_seasons = Some(vec![Season::Fall, Season::Winter]);
        item.applicable_destinations = Some(vec![Destination::General, Destination::Home]);
        item.minimum_trip_days = Some(2);
        item.requires_large_luggage = Some(false);
        item
    }

    #[test]
    fn json_document_carries_version_and_timestamp() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let json = export_json(&[socks()], now).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["lastModified"], "2026-03-01T12:00:00Z");
        assert_eq!(value["items"][0]["dailyFactor"], 1.25);

        assert_eq!(import_json(&json).unwrap(), vec![socks()]);
    }

    #[test]
    fn json_import_requires_items_array() {
        assert!(matches!(
            import_json(r#"{"version": 1}"#),
            Err(ExchangeError::MissingItems)
        ));
        assert!(matches!(
            import_json(r#"{"items": {}}"#),
            Err(ExchangeError::MissingItems)
        ));
        assert!(matches!(import_json("not json"), Err(ExchangeError::Json(_))));
    }

    #[test]
    fn json_import_rejects_items_without_required_fields() {
        let json = r#"{"items": [
            {"id": "a", "name": "A", "category": "misc"},
            {"id": "b", "category": "misc"}
        ]}"#;
        match import_json(json) {
            Err(ExchangeError::InvalidItem { index, reason }) => {
                assert_eq!(index, 1);
                assert!(reason.contains("name"));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let bad_category = r#"{"items": [{"id": "a", "name": "A", "category": "snacks"}]}"#;
        assert!(matches!(
            import_json(bad_category),
            Err(ExchangeError::InvalidItem { index: 0, .. })
        ));
    }

    #[test]
    fn csv_uses_fixed_column_defaults() {
        let bare = ItemDefinition::new("passport", "Passport", ItemCategory::Documents);
        let csv = export_csv(&[bare]);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], CSV_HEADERS.join(","));
        assert_eq!(lines[1], r#""passport","Passport",documents,fixed,1,,"","",0,false,false"#);
    }

    #[test]
    fn csv_joins_lists_with_semicolons() {
        let csv = export_csv(&[socks()]);
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(
            row,
            r#""socks","Socks, wool",clothes,perDay,1,1.25,"fall;winter","general;home",2,false,false"#
        );
    }

    #[test]
    fn csv_import_reads_exported_rows() {
        let mut custom = ItemDefinition::new("ski_pass", "Ski \"pass\"", ItemCategory::Documents);
        custom.is_user_defined = true;
        custom.quantity = Some(1);
        custom.quantity_mode = Some(QuantityMode::Fixed);
        custom.minimum_trip_days = Some(0);
        custom.requires_large_luggage = Some(true);
        custom.applicable_seasons = Some(vec![Season::Winter]);
        custom.applicable_destinations = Some(vec![Destination::General]);

        let imported = import_csv(&export_csv(&[custom.clone()])).unwrap();
        assert_eq!(imported, vec![custom]);

        let imported = import_csv(&export_csv(&[socks()])).unwrap();
        assert_eq!(imported[0].name, "Socks, wool");
        assert_eq!(imported[0].daily_factor, Some(1.25));
        assert_eq!(imported[0].applicable_seasons, Some(vec![Season::Fall, Season::Winter]));
    }

    #[test]
    fn csv_round_trips_ids_with_separators() {
        let mut odd = socks();
        odd.id = "socks,wool \"x\"\nline".to_string();
        let imported = import_csv(&export_csv(&[odd.clone(), socks()])).unwrap();
        assert_eq!(imported.len(), 2);
        assert_eq!(imported[0].id, odd.id);
        assert_eq!(imported[1].id, "socks");
    }

    #[test]
    fn csv_import_reports_the_failing_row() {
        let csv = format!(
            "{}\nphone,\"Phone\",basics,fixed,1,,\"spring\",\"general\",0,false,false\nhat,\"Hat\",hats,fixed,1,,\"\",\"\",0,false,false",
            CSV_HEADERS.join(",")
        );
        match import_csv(&csv) {
            Err(ExchangeError::Csv { row, reason }) => {
                assert_eq!(row, 3);
                assert!(reason.contains("hats"));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        assert!(matches!(
            import_csv("name,id\n"),
            Err(ExchangeError::Csv { row: 1, .. })
        ));
    }
}
