//! Starter templates loaded from a CSV table.
//!
//! The table is optional. A missing file is an empty store, not an error.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Deserializer};

/// A starter idea the user can load into the form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Template {
    #[serde(rename = "ID", deserialize_with = "integer_id")]
    pub id: i64,

    #[serde(rename = "Category")]
    pub category: String,

    #[serde(rename = "Rough Idea")]
    pub rough_idea: String,

    #[serde(rename = "Tags", default)]
    pub tags: String,

    #[serde(rename = "Suggested Clarifying Questions", default)]
    pub suggested_questions: String,
}

impl Template {
    /// Label shown in template pickers: `[Category] Rough Idea`.
    pub fn label(&self) -> String {
        format!("[{}] {}", self.category, self.rough_idea)
    }
}

/// Category filter for template pickers; `All` matches every template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Named(String),
}

impl CategoryFilter {
    fn matches(&self, template: &Template) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Named(name) => template.category == *name,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("All"),
            CategoryFilter::Named(name) => f.write_str(name),
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(value: &str) -> Self {
        if value == "All" {
            CategoryFilter::All
        } else {
            CategoryFilter::Named(value.to_string())
        }
    }
}

/// Read-only set of templates, in file order.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: Vec<Template>,
}

impl TemplateStore {
    /// Load templates from `path`. Returns an empty store if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no template file, using empty store");
            return Ok(Self::default());
        }

        let read_error = |source: csv::Error| Error::Read {
            path: path.display().to_string(),
            source,
        };
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_path(path)
            .map_err(read_error)?;
        let headers = reader.headers().map_err(read_error)?.clone();

        let mut templates = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let row_error = |source: csv::Error| Error::Row {
                path: path.display().to_string(),
                row: i + 1,
                source,
            };
            // Short rows leave their trailing cells empty.
            let mut record = record.map_err(row_error)?;
            while record.len() < headers.len() {
                record.push_field("");
            }
            let template: Template = record.deserialize(Some(&headers)).map_err(row_error)?;
            templates.push(template);
        }

        tracing::info!(path = %path.display(), count = templates.len(), "loaded templates");
        Ok(Self { templates })
    }

    /// Build a store from templates already in memory.
    pub fn from_templates(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Number of templates loaded.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.templates
            .iter()
            .map(|t| t.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Category filter choices: `All` followed by every category.
    ///
    /// An empty store offers no choices at all.
    pub fn category_choices(&self) -> Vec<CategoryFilter> {
        if self.is_empty() {
            return Vec::new();
        }
        std::iter::once(CategoryFilter::All)
            .chain(self.categories().into_iter().map(CategoryFilter::Named))
            .collect()
    }

    /// Templates in `filter`'s category, in file order.
    pub fn filter_by_category(&self, filter: &CategoryFilter) -> Vec<&Template> {
        self.templates.iter().filter(|t| filter.matches(t)).collect()
    }

    /// Look up a template by its `ID` column.
    pub fn get(&self, id: i64) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }
}

/// Accept integer ids written either as `3` or as `3.0`.
fn integer_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<i64>() {
        return Ok(id);
    }
    match raw.parse::<f64>() {
        Ok(id) if id.fract() == 0.0 && id.is_finite() => Ok(id as i64),
        _ => Err(serde::de::Error::custom(format!(
            "template ID '{raw}' is not an integer"
        ))),
    }
}

/// Errors from loading the template table.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to open template file '{path}'")]
    Read {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("malformed template file '{path}' at row {row}")]
    Row {
        path: String,
        row: usize,
        #[source]
        source: csv::Error,
    },
}
