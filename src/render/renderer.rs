use crate::{
    registry::registry_model::display_value,
    render::fragment::{Cell, Fragment, RenderContext, TemplateKey},
};

/// Registry row columns, in display order: (context key, cell class).
pub const ROW_COLUMNS: [(&str, &str); 4] = [
    ("alias", "alias"),
    ("uid", "uid"),
    ("action_class", "action-class"),
    ("parameter", "parameter"),
];

/// Turns a template key and its context into a UI fragment. Pure.
pub trait Renderer: Send + Sync {
    fn render(&self, template: TemplateKey, context: &RenderContext) -> Fragment;
}

pub struct DefaultRenderer;

impl Renderer for DefaultRenderer {
    fn render(&self, template: TemplateKey, context: &RenderContext) -> Fragment {
        match template {
            TemplateKey::RegistryRow => {
                let cells = ROW_COLUMNS
                    .iter()
                    .map(|&(key, class)| Cell {
                        class,
                        text: display_value(context.get(key)).to_string(),
                    })
                    .collect();

                Fragment::Row {
                    key: text_fingerprint(context.get("uid").unwrap_or_default()),
                    cells,
                }
            }

            TemplateKey::ActionOption => {
                let name = context.get("name").unwrap_or_default();
                let label = match context.get("description") {
                    Some(description) if !description.is_empty() => {
                        format!("{} ({})", name, description)
                    }
                    _ => name.to_string(),
                };

                Fragment::Choice {
                    value: name.to_string(),
                    label,
                    selected: context.get("selected").is_some(),
                }
            }

            TemplateKey::ScanNotice => {
                let mut text = format!("New scan: {}", display_value(context.get("uid")));
                if let Some(alias) = context.get("alias").filter(|a| !a.is_empty()) {
                    text.push_str(&format!(" ({})", alias));
                }
                if let Some(action) = context.get("action_class").filter(|a| !a.is_empty()) {
                    text.push_str(&format!(" -> {}", action));
                    if let Some(parameter) = context.get("parameter").filter(|p| !p.is_empty()) {
                        text.push_str(&format!(" [{}]", parameter));
                    }
                }
                Fragment::Notice { text }
            }

            TemplateKey::ErrorMessage => Fragment::Error {
                text: context.get("message").unwrap_or_default().to_string(),
            },
        }
    }
}

/// Hex SHA-1 of `text`; used as a row identifier that is safe to embed in
/// markup whatever the tag data looks like.
pub fn text_fingerprint(text: &str) -> String {
    use sha1::{Digest, Sha1};

    let mut hasher = Sha1::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
