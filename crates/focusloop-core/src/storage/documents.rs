//! Typed access to the documents kept in a [`Store`].
//!
//! Loading never fails: a missing, unreadable or malformed document falls
//! back to its default and the problem is logged. A document that does not
//! decode is first copied to `<key>.unreadable` so a later save cannot
//! erase it. Saving settings validates them first so out-of-range values
//! can never reach the store.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, warn};

use super::Store;
use crate::error::{Result, StorageError};
use crate::settings::{self, Settings};
use crate::stats::StatsAggregate;
use crate::task::TaskList;

pub const SETTINGS_KEY: &str = "settings";
pub const STATS_KEY: &str = "stats";
pub const TASKS_KEY: &str = "tasks";

/// Suffix of the key an undecodable document is moved aside to.
pub const UNREADABLE_SUFFIX: &str = "unreadable";

fn load_or_default<T: DeserializeOwned + Default>(store: &dyn Store, key: &str) -> T {
    match store.get(key) {
        Ok(Some(document)) => match serde_json::from_value(document.clone()) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "stored document does not match its schema, using defaults");
                preserve_unreadable(store, key, &document);
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(e) => {
            warn!(key, error = %e, "failed to read stored document, using defaults");
            T::default()
        }
    }
}

/// First free `<key>.unreadable[.N]` slot for `document`, or `None` when an
/// identical copy is already kept.
fn unreadable_slot(
    store: &dyn Store,
    key: &str,
    document: &serde_json::Value,
) -> Result<Option<String>, StorageError> {
    let base = format!("{key}.{UNREADABLE_SUFFIX}");
    let mut candidate = base.clone();
    let mut n = 0u32;
    loop {
        match store.get(&candidate)? {
            None => return Ok(Some(candidate)),
            Some(existing) if existing == *document => return Ok(None),
            Some(_) => {
                n += 1;
                candidate = format!("{base}.{n}");
            }
        }
    }
}

/// Copy a document that failed to decode aside, so the next save of `key`
/// cannot destroy it.
fn preserve_unreadable(store: &dyn Store, key: &str, document: &serde_json::Value) {
    let kept = unreadable_slot(store, key, document).and_then(|slot| match slot {
        Some(backup) => store.put(&backup, document).map(|()| Some(backup)),
        None => Ok(None),
    });
    match kept {
        Ok(Some(backup)) => warn!(key, backup = %backup, "kept unreadable document"),
        Ok(None) => {}
        Err(e) => error!(key, error = %e, "failed to keep unreadable document"),
    }
}

fn put_document<T: Serialize>(store: &dyn Store, key: &str, value: &T) -> Result<()> {
    let document = serde_json::to_value(value)?;
    store.put(key, &document)?;
    Ok(())
}

pub fn load_settings(store: &dyn Store) -> Settings {
    let candidate: Settings = load_or_default(store, SETTINGS_KEY);
    match settings::validate(candidate) {
        Ok(valid) => valid,
        Err(e) => {
            warn!(error = %e, "stored settings are out of range, using defaults");
            Settings::default()
        }
    }
}

/// # Errors
/// Returns a validation error (and writes nothing) if any field is out of
/// range, or a storage error if the write fails.
pub fn save_settings(store: &dyn Store, candidate: &Settings) -> Result<Settings> {
    let valid = settings::validate(*candidate)?;
    put_document(store, SETTINGS_KEY, &valid)?;
    Ok(valid)
}

pub fn load_stats(store: &dyn Store) -> StatsAggregate {
    load_or_default(store, STATS_KEY)
}

pub fn save_stats(store: &dyn Store, stats: &StatsAggregate) -> Result<()> {
    put_document(store, STATS_KEY, stats)
}

pub fn load_tasks(store: &dyn Store) -> TaskList {
    load_or_default(store, TASKS_KEY)
}

pub fn save_tasks(store: &dyn Store, tasks: &TaskList) -> Result<()> {
    put_document(store, TASKS_KEY, tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::storage::MemoryStore;
    use serde_json::json;

    #[test]
    fn missing_documents_fall_back_to_defaults() {
        let store = MemoryStore::new();
        assert_eq!(load_settings(&store), Settings::default());
        assert_eq!(load_stats(&store), StatsAggregate::default());
        assert!(load_tasks(&store).is_empty());
    }

    #[test]
    fn malformed_documents_fall_back_to_defaults() {
        let store = MemoryStore::new();
        store.put(SETTINGS_KEY, &json!("not an object")).unwrap();
        store.put(STATS_KEY, &json!({"dailyStats": 42})).unwrap();
        store.put(TASKS_KEY, &json!({"id": 1})).unwrap();
        assert_eq!(load_settings(&store), Settings::default());
        assert_eq!(load_stats(&store), StatsAggregate::default());
        assert!(load_tasks(&store).is_empty());
    }

    #[test]
    fn undecodable_document_is_kept_aside() {
        let store = MemoryStore::new();
        let broken = json!({"dailyStats": {"2024-03-01": {"workSessions": "two"}}});
        store.put(STATS_KEY, &broken).unwrap();

        assert_eq!(load_stats(&store), StatsAggregate::default());
        save_stats(&store, &StatsAggregate::default()).unwrap();
        assert_eq!(store.get("stats.unreadable").unwrap(), Some(broken));
    }

    #[test]
    fn repeated_loads_keep_one_copy() {
        let store = MemoryStore::new();
        store.put(TASKS_KEY, &json!({"id": 1})).unwrap();
        load_tasks(&store);
        load_tasks(&store);
        assert_eq!(store.len(), 2);

        store.put(TASKS_KEY, &json!({"id": 2})).unwrap();
        load_tasks(&store);
        assert_eq!(store.get("tasks.unreadable.1").unwrap(), Some(json!({"id": 2})));
        assert_eq!(store.get("tasks.unreadable").unwrap(), Some(json!({"id": 1})));
    }

    #[test]
    fn out_of_range_stored_settings_fall_back() {
        let store = MemoryStore::new();
        store
            .put(SETTINGS_KEY, &json!({"workDuration": 5, "shortBreakDuration": 300}))
            .unwrap();
        assert_eq!(load_settings(&store), Settings::default());
    }

    #[test]
    fn save_settings_rejects_invalid_without_writing() {
        let store = MemoryStore::new();
        let bad = Settings {
            sessions_before_long_break: 42,
            ..Settings::default()
        };
        let err = save_settings(&store, &bad).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(store.get(SETTINGS_KEY).unwrap().is_none());
    }

    #[test]
    fn settings_roundtrip_through_store() {
        let store = MemoryStore::new();
        let custom = Settings {
            work_duration: 3000,
            auto_advance: true,
            ..Settings::default()
        };
        save_settings(&store, &custom).unwrap();
        assert_eq!(load_settings(&store), custom);
        assert_eq!(
            store.get(SETTINGS_KEY).unwrap().unwrap()["workDuration"],
            json!(3000)
        );
    }
}
