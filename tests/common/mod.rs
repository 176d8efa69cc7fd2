#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use pummeluff_console::{
    form::draft::FormDraft,
    registry::registry_model::{ActionCatalog, RegistryEntry},
    scan::scan_model::ScanRecord,
    transport::{
        error::TransportError,
        transport::{Endpoint, SubmitKind, SubmitResponse, Transport},
    },
};

// ============================================================================
// Scripted in-memory transport
// ============================================================================

/// Transport double. `latest` answers are consumed in order; once the script
/// runs out the last successful record is repeated, like a backend whose
/// reader has gone quiet.
pub struct MockTransport {
    latest: Mutex<VecDeque<Result<ScanRecord, TransportError>>>,
    last_latest: Mutex<Option<ScanRecord>>,
    registry: Mutex<VecDeque<Result<Vec<RegistryEntry>, TransportError>>>,
    current_registry: Mutex<Vec<RegistryEntry>>,
    catalog: Mutex<BTreeMap<String, String>>,
    submits: Mutex<VecDeque<Result<SubmitResponse, TransportError>>>,

    pub submitted: Mutex<Vec<(SubmitKind, FormDraft)>>,
    pub latest_calls: AtomicUsize,
    pub registry_calls: AtomicUsize,
    pub catalog_calls: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            latest: Mutex::new(VecDeque::new()),
            last_latest: Mutex::new(None),
            registry: Mutex::new(VecDeque::new()),
            current_registry: Mutex::new(Vec::new()),
            catalog: Mutex::new(BTreeMap::new()),
            submits: Mutex::new(VecDeque::new()),
            submitted: Mutex::new(Vec::new()),
            latest_calls: AtomicUsize::new(0),
            registry_calls: AtomicUsize::new(0),
            catalog_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_latest(self, records: Vec<ScanRecord>) -> Self {
        self.latest.lock().unwrap().extend(records.into_iter().map(Ok));
        self
    }

    pub fn with_latest_results(self, results: Vec<Result<ScanRecord, TransportError>>) -> Self {
        self.latest.lock().unwrap().extend(results);
        self
    }

    /// Registry returned by every refresh unless a scripted answer is queued.
    pub fn with_registry(self, entries: Vec<RegistryEntry>) -> Self {
        *self.current_registry.lock().unwrap() = entries;
        self
    }

    /// Queue a one-off registry answer.
    pub fn then_registry(self, result: Result<Vec<RegistryEntry>, TransportError>) -> Self {
        self.registry.lock().unwrap().push_back(result);
        self
    }

    pub fn with_catalog(self, actions: &[(&str, &str)]) -> Self {
        *self.catalog.lock().unwrap() = actions
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self
    }

    pub fn with_submit(self, result: Result<SubmitResponse, TransportError>) -> Self {
        self.submits.lock().unwrap().push_back(result);
        self
    }

    pub fn registry_calls(&self) -> usize {
        self.registry_calls.load(Ordering::SeqCst)
    }

    pub fn latest_calls(&self) -> usize {
        self.latest_calls.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<(SubmitKind, FormDraft)> {
        self.submitted.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn fetch_registry(&self) -> Result<Vec<RegistryEntry>, TransportError> {
        self.registry_calls.fetch_add(1, Ordering::SeqCst);
        match self.registry.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(self.current_registry.lock().unwrap().clone()),
        }
    }

    fn fetch_catalog(&self) -> Result<ActionCatalog, TransportError> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ActionCatalog::from(self.catalog.lock().unwrap().clone()))
    }

    fn fetch_latest(&self) -> Result<ScanRecord, TransportError> {
        self.latest_calls.fetch_add(1, Ordering::SeqCst);
        match self.latest.lock().unwrap().pop_front() {
            Some(Ok(record)) => {
                *self.last_latest.lock().unwrap() = Some(record.clone());
                Ok(record)
            }
            Some(Err(e)) => Err(e),
            None => match self.last_latest.lock().unwrap().clone() {
                Some(record) => Ok(record),
                None => Err(unavailable(Endpoint::Latest)),
            },
        }
    }

    fn submit(&self, kind: SubmitKind, draft: &FormDraft) -> Result<SubmitResponse, TransportError> {
        self.submitted.lock().unwrap().push((kind, draft.clone()));
        match self.submits.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(SubmitResponse::accepted()),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn unavailable(endpoint: Endpoint) -> TransportError {
    TransportError::Status {
        endpoint,
        status: 503,
        body: String::new(),
    }
}

pub fn entry(alias: Option<&str>, uid: &str, action: Option<&str>, parameter: Option<&str>) -> RegistryEntry {
    RegistryEntry {
        alias: alias.map(str::to_string),
        uid: Some(uid.to_string()),
        action: action.map(str::to_string),
        parameter: parameter.map(str::to_string),
    }
}
