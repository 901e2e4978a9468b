use std::collections::HashMap;

use super::{MenuItem, Panel, PanelContext, PanelError};

/// Builds a panel for a menu item.
pub type PanelFactory =
    Box<dyn Fn(&PanelContext, &MenuItem) -> Result<Box<dyn Panel>, PanelError> + Send + Sync>;

/// Maps panel keys to the factories that build them.
#[derive(Default)]
pub struct PanelRegistry {
    factories: HashMap<String, PanelFactory>,
}

impl PanelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `key`.
    ///
    /// Fails with [`PanelError::DuplicatePanel`] if the key is taken; the
    /// existing factory is kept.
    pub fn register<F>(&mut self, key: impl Into<String>, factory: F) -> Result<(), PanelError>
    where
        F: Fn(&PanelContext, &MenuItem) -> Result<Box<dyn Panel>, PanelError>
            + Send
            + Sync
            + 'static,
    {
        let key = key.into();
        if self.factories.contains_key(&key) {
            return Err(PanelError::DuplicatePanel(key));
        }
        tracing::debug!(target: crate::targets::PANEL, key = %key, "panel registered");
        self.factories.insert(key, Box::new(factory));
        Ok(())
    }

    /// Remove the factory for `key`. Returns `true` if one was registered.
    pub fn unregister(&mut self, key: &str) -> bool {
        self.factories.remove(key).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Registered keys in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build the panel `item.key` names.
    pub fn create(&self, ctx: &PanelContext, item: &MenuItem) -> Result<Box<dyn Panel>, PanelError> {
        let factory = self
            .factories
            .get(&item.key)
            .ok_or_else(|| PanelError::UnknownPanel(item.key.clone()))?;
        factory(ctx, item)
    }
}

impl std::fmt::Debug for PanelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("PanelRegistry").field("keys", &keys).finish()
    }
}
