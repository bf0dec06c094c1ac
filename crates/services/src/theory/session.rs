use std::sync::Arc;

use learn_core::Clock;
use learn_core::assessment::AssessmentState;
use learn_core::classifier::classify;
use learn_core::gate::{CompletionGate, GateTransition};
use learn_core::model::{Lesson, LessonBlock, Module, lesson_id};
use learn_core::progression::{Navigation, ProgressionState};
use learn_core::query::LessonQuery;
use learn_core::resolver::resolve_index;
use storage::keys;
use storage::repository::KeyValueStore;
use tracing::{debug, warn};

use super::progress::LessonView;
use crate::config::SessionConfig;
use crate::dwell::DwellTimer;
use crate::ledger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Lessons,
    Assessment,
}

/// One learner's pass through a module's lessons.
///
/// The in-memory [`ProgressionState`] is authoritative. The `lesson` query
/// parameter and the durable store are one-way mirrors, rewritten after
/// every index change; mirror failures are logged and otherwise ignored.
///
/// All methods take `&mut self` and are meant to be driven from a single
/// event loop, e.g. `tokio::select!` over [`TheorySession::next_completion`]
/// and UI actions.
pub struct TheorySession {
    pub(super) module: Module,
    pub(super) progression: ProgressionState,
    query: LessonQuery,
    pub(super) store: Arc<dyn KeyValueStore>,
    clock: Clock,
    pub(super) config: SessionConfig,
    timer: DwellTimer,
    pub(super) mode: Mode,
    pub(super) assessment: Option<AssessmentState>,
    pub(super) retained: Option<AssessmentState>,
    /// Lessons completed in the gate whose ledger write has not finished.
    unrecorded: Vec<usize>,
}

impl TheorySession {
    /// Resolve the starting lesson and start its dwell timer.
    ///
    /// A valid `lesson` query value wins; otherwise a valid stored value is
    /// adopted and copied into the query; otherwise lesson 0. The store is
    /// not written during resolution.
    pub async fn open(
        module: Module,
        query: LessonQuery,
        store: Arc<dyn KeyValueStore>,
        clock: Clock,
        config: SessionConfig,
    ) -> Self {
        let mut query = query;
        let key = keys::last_lesson(module.title());
        let stored = match store.get(&key).await {
            Ok(value) => value,
            Err(err) => {
                warn!(%key, error = %err, "could not read stored lesson; ignoring");
                None
            }
        };

        let resolution = resolve_index(query.lesson(), stored.as_deref(), module.lesson_count());
        if resolution.rewrites_url() {
            query.set_lesson(resolution.index);
        }
        debug!(
            module = module.title(),
            index = resolution.index,
            source = ?resolution.source,
            "resolved starting lesson"
        );

        let progression = ProgressionState::new(
            module.title(),
            module.lesson_count(),
            resolution,
            CompletionGate::new(config.gate_dwell()),
        );

        let mut session = Self {
            module,
            progression,
            query,
            store,
            clock,
            timer: DwellTimer::new(config.dwell),
            config,
            mode: Mode::Lessons,
            assessment: None,
            retained: None,
            unrecorded: Vec::new(),
        };
        let transition = session.progression.enter_current(session.clock.now());
        session.apply_timer(transition);
        session
    }

    /// Re-run resolution for another module (or the same module with a
    /// changed lesson list). Nothing carries over from the current module.
    pub async fn switch_module(&mut self, module: Module, query: LessonQuery) {
        self.timer.cancel();
        self.flush_completed().await;
        *self = Self::open(
            module,
            query,
            Arc::clone(&self.store),
            self.clock,
            self.config,
        )
        .await;
    }

    #[must_use]
    pub fn module(&self) -> &Module {
        &self.module
    }

    #[must_use]
    pub fn progression(&self) -> &ProgressionState {
        &self.progression
    }

    #[must_use]
    pub fn query(&self) -> &LessonQuery {
        &self.query
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.progression.current_index()
    }

    #[must_use]
    pub fn current_lesson(&self) -> &Lesson {
        // Module guarantees at least one lesson and progression keeps the index in range.
        &self.module.lessons()[self.progression.current_index()]
    }

    /// Classified blocks of the current lesson, derived fresh on every call.
    #[must_use]
    pub fn blocks(&self) -> Vec<LessonBlock> {
        classify(&self.current_lesson().content)
    }

    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.mode == Mode::Lessons && self.progression.can_advance()
    }

    #[must_use]
    pub fn view(&self) -> LessonView {
        LessonView {
            index: self.current_index(),
            lesson_count: self.progression.lesson_count(),
            title: self.current_lesson().title.clone(),
            phase: self.progression.current_phase(),
            can_advance: self.can_advance(),
            can_retreat: self.mode == Mode::Lessons && self.progression.can_retreat(),
            next_is_assessment: self.progression.is_last(),
            percent: self.progression.percent(),
            blocks: self.blocks(),
        }
    }

    /// Forward navigation; from a complete last lesson this enters assessment mode.
    pub async fn next(&mut self) -> Navigation {
        if self.mode != Mode::Lessons {
            return Navigation::Unchanged;
        }
        let nav = self.progression.advance(self.clock.now());
        if nav == Navigation::EnterAssessment {
            self.enter_assessment();
        }
        self.after_navigation(nav).await;
        nav
    }

    pub async fn previous(&mut self) -> Navigation {
        if self.mode != Mode::Lessons {
            return Navigation::Unchanged;
        }
        let nav = self.progression.retreat(self.clock.now());
        self.after_navigation(nav).await;
        nav
    }

    /// Jump to a lesson chosen outside the next/previous flow.
    pub async fn go_to(&mut self, index: usize) -> Navigation {
        if self.mode != Mode::Lessons {
            return Navigation::Unchanged;
        }
        let nav = self.progression.go_to(index, self.clock.now());
        self.after_navigation(nav).await;
        nav
    }

    /// Wait for the current lesson's dwell timer and apply it.
    ///
    /// Returns the completed lesson index, or `None` when no timer can fire.
    /// Stale expiries are skipped.
    ///
    /// Cancel-safe: a completion whose ledger write was interrupted is
    /// written and reported again by the next call.
    pub async fn next_completion(&mut self) -> Option<usize> {
        if let Some(lesson) = self.flush_completed().await {
            return Some(lesson);
        }
        loop {
            self.timer.live_ticket()?;
            let ticket = self.timer.expired().await?;
            if let Some(lesson) = self.progression.gate_mut().expire(ticket) {
                self.unrecorded.push(lesson);
                self.flush_completed().await;
                return Some(lesson);
            }
        }
    }

    /// Apply expiries that already arrived without waiting, including
    /// completions still waiting on their ledger write.
    pub async fn process_pending(&mut self) -> Vec<usize> {
        let mut completed = self.unrecorded.clone();
        while let Some(ticket) = self.timer.try_expired() {
            if let Some(lesson) = self.progression.gate_mut().expire(ticket) {
                self.unrecorded.push(lesson);
                completed.push(lesson);
            }
        }
        self.flush_completed().await;
        completed
    }

    /// Write queued completions to the ledger, oldest first. An entry leaves
    /// the queue only after its write returns. Returns the first entry.
    async fn flush_completed(&mut self) -> Option<usize> {
        let first = self.unrecorded.first().copied();
        while let Some(&lesson) = self.unrecorded.first() {
            self.on_completed(lesson).await;
            self.unrecorded.remove(0);
        }
        first
    }

    async fn after_navigation(&mut self, nav: Navigation) {
        let Navigation::Moved { from, to, timer } = nav else {
            return;
        };
        debug!(module = self.module.title(), from, to, "lesson changed");
        self.apply_timer(timer);
        self.mirror_index(to).await;
    }

    fn apply_timer(&mut self, transition: GateTransition) {
        if transition.cancelled.is_some() {
            self.timer.cancel();
        }
        if let Some(ticket) = transition.started() {
            self.timer.schedule(ticket);
        }
    }

    async fn mirror_index(&mut self, index: usize) {
        self.query.set_lesson(index);
        let key = keys::last_lesson(self.module.title());
        if let Err(err) = self.store.set(&key, &index.to_string()).await {
            warn!(%key, error = %err, "could not persist lesson position");
        }
    }

    async fn on_completed(&mut self, lesson: usize) {
        debug!(module = self.module.title(), lesson, "lesson complete");
        let Some(entry) = self.module.lesson(lesson) else {
            return;
        };
        let id = lesson_id(entry, lesson);
        if let Err(err) =
            ledger::record_completed(self.store.as_ref(), self.module.title(), &id).await
        {
            warn!(lesson = %id, error = %err, "could not persist lesson completion");
        }
    }
}
