use std::fmt;

use crate::{
    form::draft::{DraftField, FormDraft},
    registry::registry_model::ActionCatalog,
    scan::scan_model::ScanRecord,
    transport::{
        error::TransportError,
        transport::{SubmitKind, SubmitResponse, Transport},
    },
};

// ============================================================================
// Form state machine
// ============================================================================

/// `Clean <-> Dirty -> Submitting -> {Clean | DirtyWithError}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Clean,
    Dirty,
    Submitting,
    DirtyWithError,
}

#[derive(Debug)]
pub enum FormError {
    /// A submission is already waiting for its answer
    SubmitInFlight,

    /// The backend could not be reached or answered garbage
    Transport(TransportError),

    /// The backend refused the submission; carries its message verbatim
    Rejected(String),
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::SubmitInFlight => write!(f, "A submission is already in progress"),
            FormError::Transport(e) => write!(f, "{}", e),
            FormError::Rejected(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for FormError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

/// Successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub kind: SubmitKind,
    pub message: Option<String>,
}

/// Snapshot of the draft taken when a submission starts. Must be handed back
/// to `finish_submit`.
#[derive(Debug)]
pub struct SubmitTicket {
    pub kind: SubmitKind,
    pub draft: FormDraft,
}

// ============================================================================
// Form controller
// ============================================================================

pub struct FormController {
    draft: FormDraft,
    state: FormState,
    error: Option<String>,
}

impl Default for FormController {
    fn default() -> Self {
        Self::new()
    }
}

impl FormController {
    pub fn new() -> Self {
        Self {
            draft: FormDraft::default(),
            state: FormState::Clean,
            error: None,
        }
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    /// Error text currently on display, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// User edit of a single field.
    pub fn set_field(&mut self, field: DraftField, value: &str) {
        self.draft.set(field, value);
        self.mark_dirty();
    }

    /// Populate the draft from a confirmed new scan.
    ///
    /// `uid` always follows the scan. The other fields are only touched when
    /// the record carries them, so a concurrent scan does not blank what the
    /// user is typing.
    pub fn apply_scan(&mut self, record: &ScanRecord) {
        self.draft.uid = record.uid.clone();

        if let Some(alias) = &record.alias {
            self.draft.alias = alias.clone();
        }
        if let Some(parameter) = &record.parameter {
            self.draft.parameter = parameter.clone();
        }
        if let Some(action) = &record.action {
            self.draft.action = Some(action.clone());
        }

        self.mark_dirty();
    }

    /// Replace the whole draft, e.g. from a selected registry row. No
    /// confirmation: whatever was being edited is gone.
    pub fn load_draft(&mut self, draft: FormDraft) {
        self.draft = draft;
        self.mark_dirty();
    }

    /// Clear every field and any error on display.
    pub fn reset(&mut self) {
        self.draft = FormDraft::default();
        self.error = None;
        if self.state != FormState::Submitting {
            self.state = FormState::Clean;
        }
    }

    /// Start a submission. Fails while another one is still in flight.
    pub fn begin_submit(&mut self, kind: SubmitKind) -> Result<SubmitTicket, FormError> {
        if self.state == FormState::Submitting {
            return Err(FormError::SubmitInFlight);
        }

        self.state = FormState::Submitting;
        Ok(SubmitTicket {
            kind,
            draft: self.draft.clone(),
        })
    }

    /// Apply the answer of a submission started with `begin_submit`.
    ///
    /// On success the draft and error display are cleared. On any failure the
    /// draft stays as it is and the error text is put on display.
    pub fn finish_submit(
        &mut self,
        ticket: SubmitTicket,
        result: Result<SubmitResponse, TransportError>,
    ) -> Result<SubmitOutcome, FormError> {
        match result {
            Ok(response) if response.success => {
                self.draft = FormDraft::default();
                self.error = None;
                self.state = FormState::Clean;
                Ok(SubmitOutcome {
                    kind: ticket.kind,
                    message: response.message,
                })
            }
            Ok(response) => {
                let message = response
                    .message
                    .unwrap_or_else(|| format!("{} request failed", ticket.kind));
                self.error = Some(message.clone());
                self.state = FormState::DirtyWithError;
                Err(FormError::Rejected(message))
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.state = FormState::DirtyWithError;
                Err(FormError::Transport(e))
            }
        }
    }

    /// Send the current draft through `transport` and apply the answer.
    pub fn submit(
        &mut self,
        transport: &dyn Transport,
        kind: SubmitKind,
    ) -> Result<SubmitOutcome, FormError> {
        let ticket = self.begin_submit(kind)?;
        let result = transport.submit(ticket.kind, &ticket.draft);
        self.finish_submit(ticket, result)
    }

    /// Like `submit`, but a draft with no action class sends `catalog`'s
    /// default option. The stored draft is left as it is.
    pub fn submit_selected(
        &mut self,
        transport: &dyn Transport,
        kind: SubmitKind,
        catalog: &ActionCatalog,
    ) -> Result<SubmitOutcome, FormError> {
        let mut ticket = self.begin_submit(kind)?;
        ticket.draft = ticket.draft.with_default_action(catalog);
        let result = transport.submit(ticket.kind, &ticket.draft);
        self.finish_submit(ticket, result)
    }

    fn mark_dirty(&mut self) {
        match self.state {
            FormState::Clean => self.state = FormState::Dirty,
            // An error stays on display until the next submission.
            FormState::Dirty | FormState::DirtyWithError | FormState::Submitting => {}
        }
    }
}
