use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{form::draft::FormDraft, scan::scan_model::ActionClassField};

/// Shown in place of a missing attribute.
pub const PLACEHOLDER: &str = "-";

/// One registered tag as listed by GET /pummeluff/registry/.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireRegistryEntry")]
pub struct RegistryEntry {
    pub alias: Option<String>,
    pub uid: Option<String>,

    #[serde(rename = "action_class")]
    pub action: Option<String>,

    pub parameter: Option<String>,
}

#[derive(Deserialize)]
struct WireRegistryEntry {
    #[serde(default)]
    alias: Option<String>,
    #[serde(default)]
    uid: Option<String>,
    #[serde(default)]
    parameter: Option<String>,
    #[serde(flatten)]
    action: ActionClassField,
}

impl From<WireRegistryEntry> for RegistryEntry {
    fn from(wire: WireRegistryEntry) -> Self {
        Self {
            alias: wire.alias,
            uid: wire.uid,
            action: wire.action.resolve(),
            parameter: wire.parameter,
        }
    }
}

impl RegistryEntry {
    /// Copy the entry into a form draft. Missing attributes become empty
    /// fields, never the placeholder text.
    pub fn to_draft(&self) -> FormDraft {
        FormDraft {
            uid: self.uid.clone().unwrap_or_default(),
            alias: self.alias.clone().unwrap_or_default(),
            parameter: self.parameter.clone().unwrap_or_default(),
            action: self.action.clone().filter(|a| !a.is_empty()),
        }
    }
}

/// Display text for an optional attribute. Blank values count as missing
/// here: a row never shows an empty cell.
pub fn display_value(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => PLACEHOLDER,
    }
}

// ============================================================================
// Action catalog
// ============================================================================

/// Available action classes, name -> human-readable description.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ActionCatalog {
    entries: BTreeMap<String, String>,
}

impl From<BTreeMap<String, String>> for ActionCatalog {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }
}

impl ActionCatalog {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn description(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Entries in selector order (sorted by name).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The option a reset selector lands on.
    pub fn default_action(&self) -> Option<&str> {
        self.entries.keys().next().map(String::as_str)
    }
}
