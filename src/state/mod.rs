// Settings synchronization
//
// This module provides the SettingsSynchronizer, the single owner of the
// in-memory settings document. It persists every accepted document and emits
// change events so views never hold their own mutable copy.

use crate::logging::{CARD_FARMING_TAG, log_error_event, log_event};
use crate::metrics::Metrics;
use crate::models::SettingsDocument;
use crate::services::{ConstraintError, apply_toggle};
use crate::store::{KeyValueStore, SETTINGS_KEY, load_json, save_json};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when the in-memory settings change
#[derive(Clone, Debug, PartialEq)]
pub enum SettingsChange {
    /// A stored document was loaded into memory
    Loaded { document: SettingsDocument },

    /// A new document became current
    Updated {
        document: SettingsDocument,
        /// Whether the write to the store succeeded
        persisted: bool,
    },
}

/// Mutation requests a view can send to the synchronizer
#[derive(Clone, Debug, PartialEq)]
pub enum SettingsIntent {
    /// A checkbox changed; routed through the constraint engine
    Toggle {
        area: String,
        option: String,
        checked: bool,
    },

    /// Replace the whole document
    Replace(SettingsDocument),
}

/// Outcome of reading the `settings` key
enum StoredSettings {
    Found(SettingsDocument),
    Absent,
    Unreadable,
}

/// Single-writer owner of the current [`SettingsDocument`]
///
/// - Reads go through [`current()`](Self::current) or [`read()`](Self::read)
/// - Writes go through [`update()`](Self::update), [`toggle()`](Self::toggle) or
///   [`dispatch()`](Self::dispatch)
/// - [`subscribe()`](Self::subscribe) delivers every accepted document
///
/// # Persistence trade-off
///
/// `update` writes to the store first and then publishes. A failed write is
/// logged and counted but the in-memory document is **not** rolled back: the
/// UI keeps showing what the user asked for while the store holds the last
/// successful write. Callers that need durability must check
/// [`SettingsChange::Updated::persisted`].
pub struct SettingsSynchronizer {
    /// The in-memory document, `None` until loaded or first updated
    current: Arc<RwLock<Option<SettingsDocument>>>,

    store: Arc<dyn KeyValueStore>,

    metrics: Arc<Metrics>,

    /// Broadcast channel for emitting settings change events
    change_tx: broadcast::Sender<SettingsChange>,
}

impl SettingsSynchronizer {
    /// Create a synchronizer over `store` with an empty in-memory view
    ///
    /// # Returns
    /// A new SettingsSynchronizer with a broadcast channel buffer of 100 events
    pub fn new(store: Arc<dyn KeyValueStore>, metrics: Arc<Metrics>) -> Self {
        let (change_tx, _) = broadcast::channel(100);
        Self {
            current: Arc::new(RwLock::new(None)),
            store,
            metrics,
            change_tx,
        }
    }

    /// Read the stored document into memory
    ///
    /// Returns `None` if nothing was ever stored. Unreadable or malformed
    /// storage is logged and also reported as `None`; the caller then applies
    /// its defaults.
    pub fn load(&self) -> Option<SettingsDocument> {
        match self.read_stored() {
            StoredSettings::Found(document) => Some(document),
            StoredSettings::Absent | StoredSettings::Unreadable => None,
        }
    }

    /// Load the stored document, or fall back to `default`
    ///
    /// `default` is written to the store only when nothing was stored before.
    /// If the stored document cannot be read it is left in place and `default`
    /// is published in memory only, with `persisted: false`.
    pub fn load_or_init(&self, default: SettingsDocument) -> SettingsDocument {
        match self.read_stored() {
            StoredSettings::Found(document) => document,
            StoredSettings::Absent => {
                tracing::info!("Initializing settings with defaults");
                self.update(default.clone());
                default
            }
            StoredSettings::Unreadable => {
                tracing::warn!("Using default settings in memory, stored settings left untouched");
                *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(default.clone());

                let _ = self.change_tx.send(SettingsChange::Updated {
                    document: default.clone(),
                    persisted: false,
                });
                default
            }
        }
    }

    fn read_stored(&self) -> StoredSettings {
        let document = match load_json::<SettingsDocument>(self.store.as_ref(), SETTINGS_KEY) {
            Ok(Some(document)) => document,
            Ok(None) => {
                tracing::info!("No stored settings found");
                return StoredSettings::Absent;
            }
            Err(e) => {
                tracing::error!("Failed to load settings: {}", e);
                log_error_event(&format!("in (load settings): {}", e));
                return StoredSettings::Unreadable;
            }
        };

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(document.clone());

        tracing::info!(
            "Loaded settings: card_farming={:?}, areas={}",
            document.card_farming_mode(),
            document.other_areas.len() + 1
        );

        let _ = self.change_tx.send(SettingsChange::Loaded {
            document: document.clone(),
        });

        StoredSettings::Found(document)
    }

    /// Make `document` current: write it to the store, then publish it
    ///
    /// # Returns
    /// Whether the write succeeded. The in-memory document is updated either way.
    pub fn update(&self, document: SettingsDocument) -> bool {
        // Held across the write so concurrent updates land in call order
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);

        let persisted = match save_json(self.store.as_ref(), SETTINGS_KEY, &document) {
            Ok(()) => {
                self.metrics.record_settings_write();
                true
            }
            Err(e) => {
                self.metrics.record_storage_failure();
                tracing::error!("Failed to persist settings, keeping in-memory copy: {}", e);
                log_error_event(&format!("in (update settings): {}", e));
                false
            }
        };

        *current = Some(document.clone());
        drop(current);

        // Ignore send errors - it's OK if no one is listening
        let _ = self.change_tx.send(SettingsChange::Updated {
            document,
            persisted,
        });

        persisted
    }

    /// Apply a checkbox toggle to the current document and make the result current
    ///
    /// With nothing loaded yet the toggle applies to [`SettingsDocument::default`].
    /// An unknown area or option leaves everything unchanged.
    pub fn toggle(
        &self,
        area: &str,
        option: &str,
        checked: bool,
    ) -> Result<SettingsDocument, ConstraintError> {
        let base = self.current().unwrap_or_default();

        let next = apply_toggle(&base, area, option, checked).inspect_err(|e| {
            tracing::warn!("Rejected settings toggle: {}", e);
            log_error_event(&format!("in (toggle settings): {}", e));
        })?;

        self.metrics.record_toggle();
        self.update(next.clone());

        let value = next
            .option(area, option)
            .map(|value| value.to_string())
            .unwrap_or_default();
        log_event(&format!("{} Changed '{}' to '{}'", CARD_FARMING_TAG, option, value));

        Ok(next)
    }

    /// Handle a mutation request from a view
    pub fn dispatch(&self, intent: SettingsIntent) -> Result<SettingsDocument, ConstraintError> {
        match intent {
            SettingsIntent::Toggle {
                area,
                option,
                checked,
            } => self.toggle(&area, &option, checked),
            SettingsIntent::Replace(document) => {
                self.update(document.clone());
                Ok(document)
            }
        }
    }

    /// Snapshot of the current document
    pub fn current(&self) -> Option<SettingsDocument> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Execute a function with read access to the current document
    ///
    /// # Example
    /// ```ignore
    /// let mode = sync.read(|doc| doc.map(|d| d.card_farming_mode()));
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(Option<&SettingsDocument>) -> R,
    {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        f(current.as_ref())
    }

    /// Subscribe to settings change events
    pub fn subscribe(&self) -> broadcast::Receiver<SettingsChange> {
        self.change_tx.subscribe()
    }
}

// Clones share the same document, store and channel
impl Clone for SettingsSynchronizer {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
            store: Arc::clone(&self.store),
            metrics: Arc::clone(&self.metrics),
            change_tx: self.change_tx.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CardFarmingMode;
    use crate::store::MemoryStore;

    fn create_sync() -> (SettingsSynchronizer, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let sync = SettingsSynchronizer::new(store.clone(), Arc::new(Metrics::new()));
        (sync, store)
    }

    #[test]
    fn test_load_empty_store() {
        let (sync, _store) = create_sync();
        assert!(sync.load().is_none());
        assert!(sync.current().is_none());
    }

    #[test]
    fn test_load_or_init_persists_default() {
        let (sync, store) = create_sync();

        let doc = sync.load_or_init(SettingsDocument::default());

        assert_eq!(sync.current(), Some(doc.clone()));
        let stored: Option<SettingsDocument> = load_json(store.as_ref(), SETTINGS_KEY).unwrap();
        assert_eq!(stored, Some(doc));
    }

    #[test]
    fn test_malformed_settings_load_as_none() {
        let (sync, store) = create_sync();
        store.set(SETTINGS_KEY, "[1, 2").unwrap();

        assert!(sync.load().is_none());
    }

    #[test]
    fn test_load_or_init_keeps_malformed_settings_in_store() {
        let (sync, store) = create_sync();
        store.set(SETTINGS_KEY, "[1, 2").unwrap();

        let doc = sync.load_or_init(SettingsDocument::default());

        assert_eq!(doc, SettingsDocument::default());
        assert_eq!(sync.current(), Some(doc));
        assert_eq!(store.get(SETTINGS_KEY).unwrap().as_deref(), Some("[1, 2"));
    }

    #[test]
    fn test_toggle_updates_and_persists() {
        let (sync, store) = create_sync();
        sync.load_or_init(SettingsDocument::default());

        let next = sync.toggle("cardFarming", "allGames", true).unwrap();
        assert_eq!(next.card_farming_mode(), CardFarmingMode::AllGames);

        let stored: Option<SettingsDocument> = load_json(store.as_ref(), SETTINGS_KEY).unwrap();
        assert_eq!(stored.map(|d| d.card_farming_mode()), Some(CardFarmingMode::AllGames));
    }

    #[test]
    fn test_rejected_toggle_changes_nothing() {
        let (sync, _store) = create_sync();
        let doc = sync.load_or_init(SettingsDocument::default());
        let mut rx = sync.subscribe();

        assert!(sync.toggle("cardFarming", "bogus", true).is_err());

        assert_eq!(sync.current(), Some(doc));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dispatch_replace() {
        let (sync, _store) = create_sync();
        let mut doc = SettingsDocument::default();
        doc.card_farming.mode = CardFarmingMode::Off;

        sync.dispatch(SettingsIntent::Replace(doc.clone())).unwrap();

        assert_eq!(sync.read(|d| d.map(|d| d.card_farming_mode())), Some(CardFarmingMode::Off));
    }

    #[test]
    fn test_subscribe_receives_update() {
        let (sync, _store) = create_sync();
        let mut rx = sync.subscribe();

        sync.update(SettingsDocument::default());

        let event = rx.try_recv().unwrap();
        assert!(matches!(event, SettingsChange::Updated { persisted: true, .. }));
    }

    #[test]
    fn test_clone_shares_document() {
        let (sync1, _store) = create_sync();
        let sync2 = sync1.clone();

        sync1.update(SettingsDocument::default());

        assert!(sync2.current().is_some());
    }
}
