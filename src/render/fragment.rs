use std::collections::BTreeMap;

use crate::{registry::registry_model::RegistryEntry, scan::scan_model::ScanRecord};

// ============================================================================
// Template keys and render context
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKey {
    RegistryRow,
    ActionOption,
    ScanNotice,
    ErrorMessage,
}

/// Named values substituted into a template. Absent keys are simply not
/// present; templates decide how to show them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderContext {
    values: BTreeMap<&'static str, String>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &'static str, value: Option<&str>) -> Self {
        if let Some(v) = value {
            self.values.insert(key, v.to_string());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn registry_row(entry: &RegistryEntry) -> Self {
        Self::new()
            .with("alias", entry.alias.as_deref())
            .with("uid", entry.uid.as_deref())
            .with("action_class", entry.action.as_deref())
            .with("parameter", entry.parameter.as_deref())
    }

    pub fn action_option(name: &str, description: &str, selected: bool) -> Self {
        Self::new()
            .with("name", Some(name))
            .with("description", Some(description))
            .with("selected", selected.then_some("selected"))
    }

    pub fn scan_notice(record: &ScanRecord) -> Self {
        Self::new()
            .with("uid", Some(&record.uid))
            .with("alias", record.alias.as_deref())
            .with("action_class", record.action.as_deref())
            .with("parameter", record.parameter.as_deref())
    }

    pub fn error_message(message: &str) -> Self {
        Self::new().with("message", Some(message))
    }
}

// ============================================================================
// UI fragments
// ============================================================================

/// A labelled piece of text inside a row. `class` names the column.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub class: &'static str,
    pub text: String,
}

/// Toolkit-independent description of a piece of UI.
///
/// Text inside a fragment is raw and may come straight off a tag; each
/// binding (`html`, `console`) is responsible for making it safe.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// A registry row. `key` is a markup-safe identifier for the row.
    Row { key: String, cells: Vec<Cell> },

    /// One option of the action selector.
    Choice {
        value: String,
        label: String,
        selected: bool,
    },

    Notice { text: String },

    Error { text: String },
}

impl Fragment {
    pub fn cell(&self, class: &str) -> Option<&str> {
        match self {
            Fragment::Row { cells, .. } => cells
                .iter()
                .find(|c| c.class == class)
                .map(|c| c.text.as_str()),
            _ => None,
        }
    }
}
