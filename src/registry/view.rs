use crate::{
    form::draft::FormDraft,
    registry::registry_model::{ActionCatalog, RegistryEntry},
    render::{
        fragment::{Fragment, RenderContext, TemplateKey},
        renderer::Renderer,
    },
    transport::{error::TransportError, transport::Transport},
};

/// Client-side copy of the registry and the action catalog.
///
/// Both lists are replaced wholesale on every successful refresh. A failed
/// refresh leaves the previous copy on display.
#[derive(Debug, Default)]
pub struct RegistryView {
    entries: Vec<RegistryEntry>,
    rows: Vec<Fragment>,
    catalog: ActionCatalog,
    registry_refreshes: u64,
}

impl RegistryView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh the registry and then the catalog. Both are attempted even if
    /// the first one fails; the first error is returned.
    pub fn refresh(
        &mut self,
        transport: &dyn Transport,
        renderer: &dyn Renderer,
    ) -> Result<(), TransportError> {
        let registry = self.refresh_registry(transport, renderer);
        let catalog = self.refresh_catalog(transport);
        registry.and(catalog)
    }

    pub fn refresh_registry(
        &mut self,
        transport: &dyn Transport,
        renderer: &dyn Renderer,
    ) -> Result<(), TransportError> {
        let entries = transport.fetch_registry()?;

        self.rows = entries
            .iter()
            .map(|entry| renderer.render(TemplateKey::RegistryRow, &RenderContext::registry_row(entry)))
            .collect();
        self.entries = entries;
        self.registry_refreshes += 1;
        Ok(())
    }

    pub fn refresh_catalog(&mut self, transport: &dyn Transport) -> Result<(), TransportError> {
        self.catalog = transport.fetch_catalog()?;
        Ok(())
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Rendered rows, in backend order.
    pub fn rows(&self) -> &[Fragment] {
        &self.rows
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    /// Selector options for the catalog. `selected` falls back to the first
    /// option when it is `None` or not in the catalog.
    pub fn options(&self, renderer: &dyn Renderer, selected: Option<&str>) -> Vec<Fragment> {
        let selected = selected
            .filter(|name| self.catalog.contains(name))
            .or(self.catalog.default_action());

        self.catalog
            .iter()
            .map(|(name, description)| {
                let ctx = RenderContext::action_option(name, description, Some(name) == selected);
                renderer.render(TemplateKey::ActionOption, &ctx)
            })
            .collect()
    }

    /// Draft for the row at `index`, for quick editing.
    pub fn select_row(&self, index: usize) -> Option<FormDraft> {
        self.entries.get(index).map(RegistryEntry::to_draft)
    }

    /// Successful registry refreshes since creation.
    pub fn registry_refreshes(&self) -> u64 {
        self.registry_refreshes
    }
}
