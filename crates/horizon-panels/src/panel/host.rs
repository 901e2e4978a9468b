use std::sync::Arc;

use horizon_panels_core::{BusyState, Signal};

use super::{MenuItem, Panel, PanelContext, PanelError, PanelRegistry, UiSettings};
use crate::targets;

struct ActivePanel {
    key: String,
    panel: Box<dyn Panel>,
}

/// Owns the menu and the panel currently on screen.
///
/// Switching builds the new panel first. The previous panel stays mounted
/// until the new one has initialised, so a failed switch leaves the host
/// showing what it showed before.
pub struct PanelHost {
    registry: PanelRegistry,
    context: PanelContext,
    menu: Vec<MenuItem>,
    active: Option<ActivePanel>,
    busy: Arc<BusyState>,
    panel_changed: Signal<String>,
}

impl PanelHost {
    /// Create a host for the menu in `settings`.
    ///
    /// The settings are normalised so every menu item carries its effective
    /// UI configuration.
    pub fn new(registry: PanelRegistry, context: PanelContext, settings: &UiSettings) -> Self {
        let settings = settings.clone().normalized();
        Self {
            registry,
            context,
            menu: settings.menu.items,
            active: None,
            busy: Arc::new(BusyState::new()),
            panel_changed: Signal::new(),
        }
    }

    /// Busy while a panel is being built. Connect the window's loading
    /// indicator here.
    pub fn busy_state(&self) -> &Arc<BusyState> {
        &self.busy
    }

    /// Emitted with the new key after every successful switch.
    pub fn panel_changed(&self) -> &Signal<String> {
        &self.panel_changed
    }

    pub fn menu(&self) -> &[MenuItem] {
        &self.menu
    }

    pub fn context(&self) -> &PanelContext {
        &self.context
    }

    pub fn registry(&self) -> &PanelRegistry {
        &self.registry
    }

    pub fn active_key(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.key.as_str())
    }

    pub fn active_panel(&self) -> Option<&dyn Panel> {
        self.active.as_ref().map(|active| active.panel.as_ref())
    }

    pub fn active_panel_mut(&mut self) -> Option<&mut (dyn Panel + 'static)> {
        self.active.as_mut().map(|active| active.panel.as_mut())
    }

    /// Show the first menu item.
    pub fn switch_to_default(&mut self) -> Result<(), PanelError> {
        let key = self.menu.first().ok_or(PanelError::EmptyMenu)?.key.clone();
        self.switch_to(&key)
    }

    /// Build the panel for menu item `key` and make it the active panel.
    pub fn switch_to(&mut self, key: &str) -> Result<(), PanelError> {
        let item = self
            .menu
            .iter()
            .find(|item| item.key == key)
            .cloned()
            .ok_or_else(|| PanelError::UnknownMenuItem(key.to_string()))?;

        let mut panel = {
            let _busy = self.busy.enter();
            self.build(&item)?
        };

        if let Some(mut previous) = self.active.take() {
            tracing::debug!(target: targets::PANEL, key = %previous.key, "detaching panel");
            previous.panel.detach();
        }
        panel.mounted();
        self.active = Some(ActivePanel {
            key: item.key.clone(),
            panel,
        });
        tracing::info!(target: targets::PANEL, key = %item.key, name = %item.name, "panel switched");
        self.panel_changed.emit(item.key);
        Ok(())
    }

    /// Detach the active panel and show nothing.
    pub fn clear(&mut self) {
        if let Some(mut previous) = self.active.take() {
            previous.panel.detach();
        }
    }

    fn build(&self, item: &MenuItem) -> Result<Box<dyn Panel>, PanelError> {
        let mut panel = self.registry.create(&self.context, item)?;
        let init_failed = |source| PanelError::Init {
            key: item.key.clone(),
            source,
        };
        panel
            .init_view(&self.context, item)
            .map_err(init_failed)?;
        panel
            .init_data(&self.context, item)
            .map_err(init_failed)?;
        Ok(panel)
    }
}

impl Drop for PanelHost {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for PanelHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelHost")
            .field("menu", &self.menu.len())
            .field("active", &self.active_key())
            .field("busy", &self.busy)
            .finish()
    }
}
