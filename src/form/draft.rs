use crate::registry::registry_model::ActionCatalog;

/// Editable fields of the registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormDraft {
    pub uid: String,
    pub alias: String,
    pub parameter: String,

    /// Selected action class. `None` means the selector sits on its first
    /// (default) option.
    pub action: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Uid,
    Alias,
    Parameter,
    Action,
}

impl DraftField {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "uid" => Some(DraftField::Uid),
            "alias" => Some(DraftField::Alias),
            "parameter" | "param" => Some(DraftField::Parameter),
            "action" | "action_class" | "action-class" => Some(DraftField::Action),
            _ => None,
        }
    }
}

impl FormDraft {
    pub fn set(&mut self, field: DraftField, value: &str) {
        match field {
            DraftField::Uid => self.uid = value.to_string(),
            DraftField::Alias => self.alias = value.to_string(),
            DraftField::Parameter => self.parameter = value.to_string(),
            DraftField::Action => {
                self.action = (!value.is_empty()).then(|| value.to_string());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.uid.is_empty()
            && self.alias.is_empty()
            && self.parameter.is_empty()
            && self.action.is_none()
    }

    /// The draft as the selector presents it: without an explicit action
    /// class, the catalog's first option is the one that gets sent.
    pub fn with_default_action(mut self, catalog: &ActionCatalog) -> Self {
        if self.action.is_none() {
            self.action = catalog.default_action().map(str::to_string);
        }
        self
    }

    /// Form-encoded body sent to the register/unregister endpoints.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("uid", self.uid.clone()),
            ("alias", self.alias.clone()),
            ("parameter", self.parameter.clone()),
            ("action_class", self.action.clone().unwrap_or_default()),
        ]
    }
}
