//! Theme preference store.
//!
//! A tiny piece of persisted process-wide state. Consumers must
//! tolerate the transient state before the first load completes and
//! render neutrally rather than flash the wrong theme.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::storage::{self, JsonStorage, StoreKey};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    pub fn toggled(self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ThemeState {
    Loading,
    Ready(ThemePreference),
}

/// Persisted light/dark preference.
pub struct ThemeStore {
    state: ThemeState,
    storage: Option<Arc<JsonStorage>>,
}

impl ThemeStore {
    /// In-memory store that starts in the loading state.
    pub fn new() -> Self {
        Self {
            state: ThemeState::Loading,
            storage: None,
        }
    }

    /// Loads the persisted preference; absent or unreadable records
    /// fall back to light.
    pub fn load(storage: Arc<JsonStorage>) -> Self {
        let preference = match storage.load(StoreKey::Theme) {
            Ok(Some(preference)) => preference,
            Ok(None) => ThemePreference::default(),
            Err(e) => {
                tracing::warn!("failed to load theme preference: {}", e);
                ThemePreference::default()
            }
        };
        Self {
            state: ThemeState::Ready(preference),
            storage: Some(storage),
        }
    }

    /// True once the first load has completed.
    pub fn is_loaded(&self) -> bool {
        matches!(self.state, ThemeState::Ready(_))
    }

    /// Current preference; light until the first load completes.
    pub fn current(&self) -> ThemePreference {
        match self.state {
            ThemeState::Ready(preference) => preference,
            ThemeState::Loading => ThemePreference::Light,
        }
    }

    /// Sets and persists the preference, fire-and-forget.
    pub fn set(&mut self, preference: ThemePreference) {
        self.state = ThemeState::Ready(preference);
        if let Some(storage) = &self.storage {
            let storage = Arc::clone(storage);
            storage::persist_in_background(move || {
                if let Err(e) = storage.save(StoreKey::Theme, &preference) {
                    tracing::warn!("failed to persist theme preference: {}", e);
                }
            });
        }
    }

    pub fn toggle(&mut self) -> ThemePreference {
        let next = self.current().toggled();
        self.set(next);
        next
    }
}

impl Default for ThemeStore {
    fn default() -> Self {
        Self::new()
    }
}
