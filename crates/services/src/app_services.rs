use std::path::Path;
use std::sync::Arc;

use learn_core::assessment::{Answers, AssessmentReport, AssessmentState};
use learn_core::model::Catalog;
use learn_core::query::LessonQuery;
use storage::repository::Storage;
use tracing::warn;

use crate::Clock;
use crate::config::SessionConfig;
use crate::error::AppServicesError;
use crate::ledger::{self, ModuleProgress};
use crate::theory::TheorySession;

/// Assembles the catalog, durable store and session settings.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    catalog: Arc<Catalog>,
    clock: Clock,
    config: SessionConfig,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        catalog: Catalog,
        clock: Clock,
        config: SessionConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(storage, catalog, clock, config))
    }

    #[must_use]
    pub fn in_memory(catalog: Catalog, clock: Clock, config: SessionConfig) -> Self {
        Self::new(Storage::in_memory(), catalog, clock, config)
    }

    #[must_use]
    pub fn new(storage: Storage, catalog: Catalog, clock: Clock, config: SessionConfig) -> Self {
        Self {
            storage,
            catalog: Arc::new(catalog),
            clock,
            config,
        }
    }

    /// Read a JSON catalog from disk.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::CatalogIo` if the file cannot be read and
    /// `AppServicesError::Catalog` if it does not parse.
    pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog, AppServicesError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| AppServicesError::CatalogIo {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Catalog::from_json(&raw)?)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Open a session on the named module.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::UnknownModule` if the catalog has no such module.
    pub async fn open_module(
        &self,
        title: &str,
        query: LessonQuery,
    ) -> Result<TheorySession, AppServicesError> {
        let module = self
            .catalog
            .module(title)
            .cloned()
            .ok_or_else(|| AppServicesError::UnknownModule(title.to_owned()))?;
        Ok(TheorySession::open(
            module,
            query,
            Arc::clone(&self.storage.kv),
            self.clock,
            self.config,
        )
        .await)
    }

    /// Completed-lesson progress for the named module.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::UnknownModule` if the catalog has no such module.
    pub async fn progress(&self, title: &str) -> Result<ModuleProgress, AppServicesError> {
        let module = self
            .catalog
            .module(title)
            .ok_or_else(|| AppServicesError::UnknownModule(title.to_owned()))?;
        Ok(ledger::module_progress(self.storage.kv.as_ref(), module).await)
    }

    /// Score a complete answer set for the named module outside a live
    /// session, e.g. from the CLI. A pass is recorded like a session submit.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::UnknownModule` for a missing module and
    /// `AppServicesError::Assessment` when a question is unanswered.
    pub async fn score(
        &self,
        title: &str,
        answers: &Answers,
    ) -> Result<AssessmentReport, AppServicesError> {
        let module = self
            .catalog
            .module(title)
            .ok_or_else(|| AppServicesError::UnknownModule(title.to_owned()))?;
        let mut state = AssessmentState::new();
        for (question, option) in answers {
            state.select(*question, *option);
        }
        let report = state.submit(module.questions())?;
        if report.verdict.is_pass() {
            if let Err(err) = ledger::record_passed(self.storage.kv.as_ref(), title).await {
                warn!(module = title, error = %err, "could not persist assessment pass");
            }
        }
        Ok(report)
    }

    pub async fn passed(&self, title: &str) -> bool {
        ledger::assessment_passed(self.storage.kv.as_ref(), title).await
    }
}
