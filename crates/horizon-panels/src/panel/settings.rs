//! Application UI settings: title, theme, and the data-driven menu.

use std::collections::HashMap;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::theme::Theme;

/// Font settings for a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Point size of body text.
    pub text_size: u32,
    pub bold: bool,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            text_size: 14,
            bold: false,
        }
    }
}

/// Per-panel presentation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub font: FontConfig,
}

/// One entry of the menu, naming the panel it opens.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MenuItem {
    /// Label shown in the menu.
    pub name: String,
    /// Registry key of the panel to open.
    pub key: String,
    /// Overrides the menu's settings for this panel.
    #[serde(default)]
    pub ui: Option<UiConfig>,
    /// Free-form parameters passed through to the panel.
    #[serde(default)]
    pub params: HashMap<String, serde_json::Value>,
}

impl MenuItem {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            ui: None,
            params: HashMap::new(),
        }
    }

    pub fn with_ui(mut self, ui: UiConfig) -> Self {
        self.ui = Some(ui);
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Read a parameter as `T`. Missing or mistyped parameters give `None`.
    pub fn param<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let value = self.params.get(name)?;
        match serde_json::from_value(value.clone()) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::debug!(
                    target: crate::targets::PANEL,
                    item = %self.key,
                    param = name,
                    error = %err,
                    "menu parameter has unexpected type"
                );
                None
            }
        }
    }

    /// The item's own settings, or the defaults.
    pub fn ui_or_default(&self) -> UiConfig {
        self.ui.unwrap_or_default()
    }
}

/// The menu: shared settings and its items in display order.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub ui: Option<UiConfig>,
    pub items: Vec<MenuItem>,
}

/// Top-level UI settings of an application.
///
/// Typically embedded in a host's own configuration and deserialized with
/// it:
///
/// ```
/// use horizon_panels::panel::UiSettings;
///
/// let settings: UiSettings = serde_json::from_str(r##"{
///     "title": "Ops Console",
///     "theme": { "primary": "#0050B3" },
///     "base_ui": { "font": { "text_size": 13 } },
///     "menu": {
///         "items": [
///             { "name": "Hosts", "key": "hosts" },
///             { "name": "Logs", "key": "logs", "params": { "tail": 200 } }
///         ]
///     }
/// }"##).unwrap();
///
/// let settings = settings.normalized();
/// assert_eq!(settings.menu.items[0].ui_or_default().font.text_size, 13);
/// assert_eq!(settings.item("logs").and_then(|i| i.param::<u32>("tail")), Some(200));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    pub title: String,
    pub theme: Theme,
    /// Settings inherited by the menu and every item that has none.
    pub base_ui: UiConfig,
    pub menu: MenuConfig,
}

impl UiSettings {
    /// Fill in inherited settings.
    ///
    /// The menu takes `base_ui` if it has no settings of its own, and each
    /// item without settings takes the menu's.
    pub fn normalized(mut self) -> Self {
        let menu_ui = *self.menu.ui.get_or_insert(self.base_ui);
        for item in &mut self.menu.items {
            item.ui.get_or_insert(menu_ui);
        }
        self
    }

    /// Look up a menu item by key.
    pub fn item(&self, key: &str) -> Option<&MenuItem> {
        self.menu.items.iter().find(|item| item.key == key)
    }
}
