use learn_core::assessment::{AssessmentReport, AssessmentState};
use learn_core::model::QuestionId;
use tracing::{debug, info, warn};

use super::session::{Mode, TheorySession};
use crate::config::RetakePolicy;
use crate::error::SessionError;
use crate::ledger;

impl TheorySession {
    pub(super) fn enter_assessment(&mut self) {
        let state = match self.config.retake {
            RetakePolicy::Reset => AssessmentState::new(),
            RetakePolicy::Preserve => self.retained.take().unwrap_or_default(),
        };
        debug!(module = self.module.title(), "entering assessment");
        self.assessment = Some(state);
        self.mode = Mode::Assessment;
    }

    /// Return to the last lesson. Answers are kept or dropped per [`RetakePolicy`].
    pub fn leave_assessment(&mut self) {
        if self.mode != Mode::Assessment {
            return;
        }
        let state = self.assessment.take();
        if self.config.retake == RetakePolicy::Preserve {
            self.retained = state;
        }
        self.mode = Mode::Lessons;
    }

    #[must_use]
    pub fn assessment(&self) -> Option<&AssessmentState> {
        self.assessment.as_ref()
    }

    /// Select an option for one question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInAssessment` outside assessment mode,
    /// `SessionError::UnknownQuestion` or `SessionError::InvalidOption` for
    /// selections that do not exist in the module's question set.
    pub fn select_answer(&mut self, question: QuestionId, option: usize) -> Result<(), SessionError> {
        let state = self
            .assessment
            .as_mut()
            .ok_or(SessionError::NotInAssessment)?;
        let Some(q) = self.module.questions().iter().find(|q| q.id == question) else {
            return Err(SessionError::UnknownQuestion(question));
        };
        if option >= q.options.len() {
            return Err(SessionError::InvalidOption { question, option });
        }
        state.select(question, option);
        Ok(())
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.assessment
            .as_ref()
            .is_some_and(|state| state.can_submit(self.module.questions()))
    }

    /// Score the assessment. A pass is recorded in the durable store.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInAssessment` outside assessment mode and
    /// `SessionError::Assessment` while answers are missing.
    pub async fn submit(&mut self) -> Result<AssessmentReport, SessionError> {
        let state = self
            .assessment
            .as_mut()
            .ok_or(SessionError::NotInAssessment)?;
        let report = state.submit(self.module.questions())?;
        info!(
            module = self.module.title(),
            score = report.score,
            verdict = ?report.verdict,
            "assessment submitted"
        );

        if report.verdict.is_pass() {
            if let Err(err) = ledger::record_passed(self.store.as_ref(), self.module.title()).await {
                warn!(module = self.module.title(), error = %err, "could not persist assessment pass");
            }
        }
        Ok(report)
    }
}
