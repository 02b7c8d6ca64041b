use crate::html::{is_html, strip_html_tags};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status stored when the contribution service reports the remote copy gone
pub const STATUS_DELETED: &str = "Deleted";

/// A user translation of one source string into one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub name: String,
    pub source_name: String,
    pub target_name: String,
    pub language: String,
    pub context: Option<String>,
    pub status: Option<String>,
    pub contributed_translation_doctype_name: Option<String>,
    pub modified: DateTime<Utc>,
}

impl TranslationRecord {
    /// Strip markup from the source text before it is persisted.
    ///
    /// Text without markup is left exactly as given, whitespace included.
    pub fn validate(&mut self) {
        strip_source_markup(&mut self.source_name);
    }

    /// Whether this record has a counterpart in the contribution service
    pub fn is_contributed(&self) -> bool {
        self.contributed_translation_doctype_name
            .as_deref()
            .is_some_and(|name| !name.is_empty())
    }

    pub(crate) fn apply(&mut self, update: TranslationUpdate) {
        if let Some(source_name) = update.source_name {
            self.source_name = source_name;
        }
        if let Some(target_name) = update.target_name {
            self.target_name = target_name;
        }
        if let Some(language) = update.language {
            self.language = language;
        }
        if let Some(context) = update.context {
            self.context = Some(context).filter(|c| !c.is_empty());
        }
    }
}

fn strip_source_markup(source_name: &mut String) {
    if is_html(source_name) {
        *source_name = strip_html_tags(source_name).trim().to_string();
    }
}

/// `source_name` as it will be stored after validation
pub fn clean_source_name(source_name: &str) -> String {
    let mut cleaned = source_name.to_string();
    strip_source_markup(&mut cleaned);
    cleaned
}

/// Fields accepted when inserting a translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTranslation {
    pub source_name: String,
    pub target_name: String,
    pub language: String,
    #[serde(default)]
    pub context: Option<String>,
}

impl NewTranslation {
    /// Same rules as [`TranslationRecord::validate`]
    pub fn validate(&mut self) {
        strip_source_markup(&mut self.source_name);
    }

    pub(crate) fn into_record(self, name: String) -> TranslationRecord {
        TranslationRecord {
            name,
            source_name: self.source_name,
            target_name: self.target_name,
            language: self.language,
            context: self.context.filter(|c| !c.is_empty()),
            status: None,
            contributed_translation_doctype_name: None,
            modified: Utc::now(),
        }
    }
}

/// Partial update of the user-editable fields.
///
/// An empty `context` clears the context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationUpdate {
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub target_name: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
}
