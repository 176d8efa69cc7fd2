use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{
    form::draft::FormDraft,
    registry::registry_model::{ActionCatalog, RegistryEntry},
    scan::scan_model::ScanRecord,
    transport::error::TransportError,
};

// ============================================================================
// Backend endpoints
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Registry,
    Actions,
    Latest,
    Register,
    Unregister,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Registry => "/pummeluff/registry/",
            Endpoint::Actions => "/pummeluff/actions/",
            Endpoint::Latest => "/pummeluff/latest/",
            Endpoint::Register => "/pummeluff/register/",
            Endpoint::Unregister => "/pummeluff/unregister/",
        }
    }

    /// POST endpoints take a form-encoded draft, the rest are plain GETs.
    pub fn is_post(&self) -> bool {
        matches!(self, Endpoint::Register | Endpoint::Unregister)
    }
}

/// Which write endpoint a form submission goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitKind {
    Register,
    Unregister,
}

impl SubmitKind {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            SubmitKind::Register => Endpoint::Register,
            SubmitKind::Unregister => Endpoint::Unregister,
        }
    }
}

impl std::fmt::Display for SubmitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitKind::Register => write!(f, "register"),
            SubmitKind::Unregister => write!(f, "unregister"),
        }
    }
}

// ============================================================================
// Response bodies
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegistryResponse {
    #[serde(default)]
    pub tags: Vec<RegistryEntry>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogResponse {
    #[serde(default, alias = "action_classes", alias = "types")]
    pub actions: BTreeMap<String, String>,
}

/// Body of a register/unregister call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub message: Option<String>,
}

impl SubmitResponse {
    pub fn accepted() -> Self {
        Self {
            success: true,
            message: Some("Request successful".into()),
        }
    }

    pub fn rejected(message: &str) -> Self {
        Self {
            success: false,
            message: Some(message.to_string()),
        }
    }
}

// ============================================================================
// Transport trait
// ============================================================================

/// Stateless access to the backend endpoints.
///
/// Implementations are shared between the console and the poll thread, hence
/// the `Send + Sync` bound.
pub trait Transport: Send + Sync {
    fn fetch_registry(&self) -> Result<Vec<RegistryEntry>, TransportError>;

    fn fetch_catalog(&self) -> Result<ActionCatalog, TransportError>;

    fn fetch_latest(&self) -> Result<ScanRecord, TransportError>;

    /// Send a draft to the register/unregister endpoint.
    ///
    /// A backend-reported failure (`success: false`) is `Ok`; only failures
    /// to obtain a readable answer are `Err`.
    fn submit(&self, kind: SubmitKind, draft: &FormDraft) -> Result<SubmitResponse, TransportError>;
}
