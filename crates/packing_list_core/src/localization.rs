//! crates/packing_list_core/src/localization.rs
//!
//! String tables for the supported languages and the [`Localizer`] implementation
//! used by the engine. The language is always passed explicitly through a
//! [`LocaleContext`]; there is no process-wide "current language".

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::domain::Language;
use crate::ports::{Localizer, TextParams};

const CATALAN: &str = include_str!("../translations/ca.json");
const ENGLISH: &str = include_str!("../translations/en.json");
const SPANISH: &str = include_str!("../translations/es.json");

/// Language used when a key is missing from the requested table.
pub const FALLBACK_LANGUAGE: Language = Language::Ca;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid"))
}

/// All translated strings, keyed by language then by text id.
#[derive(Debug, Clone, Default)]
pub struct TextCatalog {
    tables: HashMap<Language, HashMap<String, String>>,
}

impl TextCatalog {
    /// Loads the string tables bundled with the crate.
    pub fn embedded() -> Result<Self, serde_json::Error> {
        let mut catalog = Self::default();
        for (language, source) in [
            (Language::Ca, CATALAN),
            (Language::En, ENGLISH),
            (Language::Es, SPANISH),
        ] {
            catalog.insert_table(language, serde_json::from_str(source)?);
        }
        Ok(catalog)
    }

    pub fn insert_table(&mut self, language: Language, table: HashMap<String, String>) {
        self.tables.insert(language, table);
    }

    /// Looks up `key` in `language`, then in the fallback language.
    pub fn lookup(&self, language: Language, key: &str) -> Option<&str> {
        self.tables
            .get(&language)
            .and_then(|table| table.get(key))
            .or_else(|| {
                self.tables
                    .get(&FALLBACK_LANGUAGE)
                    .and_then(|table| table.get(key))
            })
            .map(String::as_str)
    }

    /// Resolves a key and fills its `{name}` placeholders. Unknown keys come back verbatim.
    pub fn resolve(&self, language: Language, key: &str, params: Option<&TextParams>) -> String {
        let text = self.lookup(language, key).unwrap_or(key);
        match params {
            Some(params) if !params.is_empty() => interpolate(text, params),
            _ => text.to_string(),
        }
    }
}

/// Replaces `{name}` with `params["name"]`; placeholders without a value are left as-is.
pub fn interpolate(text: &str, params: &TextParams) -> String {
    placeholder_pattern()
        .replace_all(text, |caps: &Captures| match params.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// A [`Localizer`] bound to one language.
#[derive(Debug, Clone)]
pub struct LocaleContext {
    pub language: Language,
    catalog: Arc<TextCatalog>,
}

impl LocaleContext {
    pub fn new(language: Language, catalog: Arc<TextCatalog>) -> Self {
        Self { language, catalog }
    }
}

impl Localizer for LocaleContext {
    fn resolve(&self, key: &str, params: Option<&TextParams>) -> String {
        self.catalog.resolve(self.language, key, params)
    }
}

/// Builds a [`TextParams`] map from `(name, value)` pairs.
pub fn params<I, K, V>(pairs: I) -> TextParams
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: ToString,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.to_string()))
        .collect()
}
