//! Persisted list of completed lesson ids, used for progress reporting.

use learn_core::model::Module;
use serde::Serialize;
use storage::keys;
use storage::repository::{KeyValueStore, StorageError};
use tracing::warn;

/// Completed lessons out of the module total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModuleProgress {
    pub completed: usize,
    pub total: usize,
}

impl ModuleProgress {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }
}

/// Stored completed ids; missing, unreadable or malformed entries read as empty.
pub async fn load_completed_ids(store: &dyn KeyValueStore, module_title: &str) -> Vec<String> {
    let key = keys::completed_lessons(module_title);
    match store.get(&key).await {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(%key, error = %err, "ignoring malformed completed-lesson ledger");
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(err) => {
            warn!(%key, error = %err, "could not read completed-lesson ledger");
            Vec::new()
        }
    }
}

/// Add `lesson_id` to the module's ledger, keeping ids unique and in completion order.
///
/// # Errors
///
/// Returns `StorageError` if the ledger cannot be written.
pub async fn record_completed(
    store: &dyn KeyValueStore,
    module_title: &str,
    lesson_id: &str,
) -> Result<(), StorageError> {
    let mut ids = load_completed_ids(store, module_title).await;
    if ids.iter().any(|id| id == lesson_id) {
        return Ok(());
    }
    ids.push(lesson_id.to_owned());
    let raw =
        serde_json::to_string(&ids).map_err(|err| StorageError::Serialization(err.to_string()))?;
    store.set(&keys::completed_lessons(module_title), &raw).await
}

/// Progress across sessions, counting only ids that still name a lesson of `module`.
pub async fn module_progress(store: &dyn KeyValueStore, module: &Module) -> ModuleProgress {
    let stored = load_completed_ids(store, module.title()).await;
    let completed = module
        .lesson_ids()
        .iter()
        .filter(|id| stored.contains(id))
        .count();
    ModuleProgress {
        completed,
        total: module.lesson_count(),
    }
}

/// Mark the module's assessment as passed.
///
/// # Errors
///
/// Returns `StorageError` if the store rejects the write.
pub async fn record_passed(store: &dyn KeyValueStore, module_title: &str) -> Result<(), StorageError> {
    store.set(&keys::assessment_passed(module_title), "true").await
}

/// Whether the module's assessment has ever been passed.
pub async fn assessment_passed(store: &dyn KeyValueStore, module_title: &str) -> bool {
    matches!(
        store.get(&keys::assessment_passed(module_title)).await,
        Ok(Some(value)) if value == "true"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use learn_core::model::Lesson;
    use storage::InMemoryStore;

    fn module() -> Module {
        Module::new(
            "Anomaly-Based Detection",
            vec![
                Lesson::new("Baselines", "a"),
                Lesson::new("Outliers", "b").with_id("an-2"),
                Lesson::new("Tuning", "c"),
            ],
            vec![],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn records_unique_ids_in_order() {
        let store = InMemoryStore::new();
        let title = "Anomaly-Based Detection";
        record_completed(&store, title, "baselines").await.unwrap();
        record_completed(&store, title, "an-2").await.unwrap();
        record_completed(&store, title, "baselines").await.unwrap();
        assert_eq!(
            load_completed_ids(&store, title).await,
            vec!["baselines".to_string(), "an-2".to_string()]
        );
    }

    #[tokio::test]
    async fn malformed_ledger_reads_as_empty() {
        let store = InMemoryStore::new();
        store
            .set(&keys::completed_lessons("M"), "{not json")
            .await
            .unwrap();
        assert!(load_completed_ids(&store, "M").await.is_empty());
    }

    #[tokio::test]
    async fn progress_ignores_unknown_ids() {
        let store = InMemoryStore::new();
        let module = module();
        for id in ["an-2", "retired-lesson"] {
            record_completed(&store, module.title(), id).await.unwrap();
        }
        let progress = module_progress(&store, &module).await;
        assert_eq!(progress, ModuleProgress { completed: 1, total: 3 });
        assert!(!progress.is_complete());
        assert!((progress.percent() - 100.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn passed_flag_requires_literal_true() {
        let store = InMemoryStore::new();
        assert!(!assessment_passed(&store, "M").await);
        store.set(&keys::assessment_passed("M"), "yes").await.unwrap();
        assert!(!assessment_passed(&store, "M").await);
        store.set(&keys::assessment_passed("M"), "true").await.unwrap();
        assert!(assessment_passed(&store, "M").await);
    }
}
