//! Creation preferences and their one-shot flags.
//!
//! Persisting the flags is the configuration collaborator's job; the engine
//! only reads a snapshot and asks for the flags to be cleared.

use parking_lot::RwLock;

use crate::config::CreationConfig;

/// Access to an account's creation preferences.
pub trait PreferenceStore: Send + Sync {
    /// Current snapshot of the preferences.
    fn creation(&self) -> CreationConfig;

    /// Clear the one-shot `create` flag.
    fn clear_create_flag(&self);

    /// Clear the `complete_tutorial` flag.
    fn clear_tutorial_flag(&self);
}

/// Preferences held in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    creation: RwLock<CreationConfig>,
}

impl InMemoryPreferences {
    /// Wrap the configured preferences.
    pub fn new(creation: CreationConfig) -> Self {
        Self {
            creation: RwLock::new(creation),
        }
    }
}

impl PreferenceStore for InMemoryPreferences {
    fn creation(&self) -> CreationConfig {
        self.creation.read().clone()
    }

    fn clear_create_flag(&self) {
        self.creation.write().create = false;
    }

    fn clear_tutorial_flag(&self) {
        self.creation.write().complete_tutorial = false;
    }
}
