//! The editable style state and its change notifications.
//!
//! Editors mutate the style through a [`StyleStore`]; renderers take a
//! [`snapshot`](StyleStore::snapshot) and never hold on to the store.

use serde_json::Value;

use crate::error::StyleError;
use crate::style::StyleDescription;

/// Handle returned by [`StyleStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&StyleDescription)>;

/// Keys older documents used, and the keys that replaced them.
const LEGACY_KEYS: [(&str, &str); 1] = [("shadowLength", "shadowDistance")];

/// Owns the current [`StyleDescription`] and notifies listeners of changes.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use iconforge::{Shape, StyleStore};
///
/// let mut store = StyleStore::new();
/// let calls = Rc::new(Cell::new(0));
/// let seen = Rc::clone(&calls);
/// store.subscribe(move |_style| seen.set(seen.get() + 1));
///
/// store.update(|style| style.shape = Shape::Circle);
/// store.update(|style| style.shape = Shape::Circle);
/// // once on subscribe, once for the actual change
/// assert_eq!(calls.get(), 2);
/// ```
pub struct StyleStore {
    style: StyleDescription,
    version: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl StyleStore {
    pub fn new() -> Self {
        Self::with_style(StyleDescription::default())
    }

    pub fn with_style(style: StyleDescription) -> Self {
        Self {
            style,
            version: 0,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// A copy of the current style.
    pub fn snapshot(&self) -> StyleDescription {
        self.style.clone()
    }

    pub fn style(&self) -> &StyleDescription {
        &self.style
    }

    /// Incremented on every committed change.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Applies `edit`, notifying listeners if the style actually changed.
    ///
    /// Returns whether it changed.
    pub fn update(&mut self, edit: impl FnOnce(&mut StyleDescription)) -> bool {
        let mut next = self.style.clone();
        edit(&mut next);
        self.commit(next)
    }

    /// Registers a listener and immediately calls it with the current style.
    pub fn subscribe(
        &mut self,
        mut listener: impl FnMut(&StyleDescription) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        listener(&self.style);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns false if the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// The current style as a JSON document.
    pub fn save_json(&self) -> Result<String, StyleError> {
        Ok(self.style.to_json_pretty()?)
    }

    /// Merges a JSON object over the current style.
    ///
    /// Keys absent from `json` keep their current values. On any error the
    /// store is left exactly as it was.
    pub fn load_json(&mut self, json: &str) -> Result<(), StyleError> {
        let Value::Object(incoming) = serde_json::from_str::<Value>(json)? else {
            return Err(StyleError::NotAnObject);
        };
        let mut merged = serde_json::to_value(&self.style)?;
        if let Value::Object(current) = &mut merged {
            for (legacy, canonical) in LEGACY_KEYS {
                if incoming.contains_key(legacy) {
                    current.remove(canonical);
                }
            }
            current.extend(incoming);
        }
        let next = StyleDescription::from_value(merged)?;
        tracing::debug!(bytes = json.len(), "loaded style document");
        self.commit(next);
        Ok(())
    }

    fn commit(&mut self, next: StyleDescription) -> bool {
        if next == self.style {
            return false;
        }
        self.style = next;
        self.version += 1;
        for (_, listener) in &mut self.listeners {
            listener(&self.style);
        }
        true
    }
}

impl Default for StyleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StyleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleStore")
            .field("style", &self.style)
            .field("version", &self.version)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
