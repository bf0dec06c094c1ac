//! Scoring of a module's fixed multiple-choice question set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::QuestionId;

/// Minimum percentage for a passing verdict.
pub const PASSING_SCORE: f64 = 70.0;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AssessmentError {
    #[error("{} question(s) still need an answer", missing.len())]
    Unanswered { missing: Vec<QuestionId> },

    #[error("assessment has no questions")]
    NoQuestions,
}

//
// ─── QUESTIONS ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}

impl Question {
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_index: usize,
    ) -> Self {
        Self {
            id,
            prompt: prompt.into(),
            options,
            correct_index,
        }
    }
}

pub type Answers = BTreeMap<QuestionId, usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= PASSING_SCORE {
            Self::Pass
        } else {
            Self::Fail
        }
    }

    #[must_use]
    pub fn is_pass(self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// Number of questions whose submitted option equals the correct one.
#[must_use]
pub fn correct_count(questions: &[Question], answers: &Answers) -> usize {
    questions
        .iter()
        .filter(|q| answers.get(&q.id) == Some(&q.correct_index))
        .count()
}

/// Percentage of correctly answered questions, in `[0, 100]`.
///
/// Missing answers count as incorrect. An empty question set scores `0`.
///
/// ```
/// # use learn_core::assessment::{score, Answers, Question};
/// # use learn_core::model::QuestionId;
/// let questions = vec![
///     Question::new(QuestionId::new(0), "a", vec!["x".into(), "y".into()], 1),
///     Question::new(QuestionId::new(1), "b", vec!["x".into(), "y".into()], 1),
/// ];
/// let answers = Answers::from([(QuestionId::new(0), 1), (QuestionId::new(1), 0)]);
/// assert_eq!(score(&questions, &answers), 50.0);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn score(questions: &[Question], answers: &Answers) -> f64 {
    if questions.is_empty() {
        return 0.0;
    }
    let correct = correct_count(questions, answers);
    (correct as f64 / questions.len() as f64) * 100.0
}

//
// ─── ASSESSMENT STATE ──────────────────────────────────────────────────────────
//

/// Outcome of a submitted assessment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AssessmentReport {
    pub score: f64,
    pub correct: usize,
    pub total: usize,
    pub verdict: Verdict,
}

/// Selected answers and, once submitted, the resulting report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssessmentState {
    answers: Answers,
    report: Option<AssessmentReport>,
}

impl AssessmentState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or replace) the selected option for a question.
    pub fn select(&mut self, question: QuestionId, option: usize) {
        self.answers.insert(question, option);
    }

    #[must_use]
    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    #[must_use]
    pub fn selected(&self, question: QuestionId) -> Option<usize> {
        self.answers.get(&question).copied()
    }

    #[must_use]
    pub fn report(&self) -> Option<&AssessmentReport> {
        self.report.as_ref()
    }

    #[must_use]
    pub fn score(&self) -> Option<f64> {
        self.report.map(|r| r.score)
    }

    /// Questions that still lack a selected option, in question order.
    #[must_use]
    pub fn missing(&self, questions: &[Question]) -> Vec<QuestionId> {
        questions
            .iter()
            .filter(|q| !self.answers.contains_key(&q.id))
            .map(|q| q.id)
            .collect()
    }

    /// Whether the submit affordance should be enabled.
    #[must_use]
    pub fn can_submit(&self, questions: &[Question]) -> bool {
        !questions.is_empty() && self.missing(questions).is_empty()
    }

    /// Score the answers once every question has one.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::NoQuestions` for an empty set and
    /// `AssessmentError::Unanswered` while any answer is missing.
    pub fn submit(&mut self, questions: &[Question]) -> Result<AssessmentReport, AssessmentError> {
        if questions.is_empty() {
            return Err(AssessmentError::NoQuestions);
        }
        let missing = self.missing(questions);
        if !missing.is_empty() {
            return Err(AssessmentError::Unanswered { missing });
        }
        let score = score(questions, &self.answers);
        let report = AssessmentReport {
            score,
            correct: correct_count(questions, &self.answers),
            total: questions.len(),
            verdict: Verdict::from_score(score),
        };
        self.report = Some(report);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_questions() -> Vec<Question> {
        vec![
            Question::new(
                QuestionId::new(0),
                "What is hybrid detection?",
                vec!["A".into(), "B".into(), "C".into()],
                1,
            ),
            Question::new(
                QuestionId::new(1),
                "What is a limitation?",
                vec!["X".into(), "Y".into(), "Z".into()],
                1,
            ),
        ]
    }

    #[test]
    fn half_correct_fails() {
        let questions = two_questions();
        let answers = Answers::from([(QuestionId::new(0), 1), (QuestionId::new(1), 0)]);
        let s = score(&questions, &answers);
        assert!((s - 50.0).abs() < f64::EPSILON);
        assert_eq!(Verdict::from_score(s), Verdict::Fail);
    }

    #[test]
    fn all_correct_passes() {
        let questions = two_questions();
        let answers = Answers::from([(QuestionId::new(0), 1), (QuestionId::new(1), 1)]);
        let s = score(&questions, &answers);
        assert!((s - 100.0).abs() < f64::EPSILON);
        assert!(Verdict::from_score(s).is_pass());
    }

    #[test]
    fn missing_answers_count_as_incorrect() {
        let questions = two_questions();
        let answers = Answers::from([(QuestionId::new(1), 1)]);
        assert!((score(&questions, &answers) - 50.0).abs() < f64::EPSILON);
        assert_eq!(score(&questions, &Answers::new()), 0.0);
    }

    #[test]
    fn answers_for_unknown_questions_are_ignored() {
        let questions = two_questions();
        let answers = Answers::from([(QuestionId::new(9), 1)]);
        assert_eq!(correct_count(&questions, &answers), 0);
    }

    #[test]
    fn threshold_is_inclusive() {
        assert_eq!(Verdict::from_score(70.0), Verdict::Pass);
        assert_eq!(Verdict::from_score(69.99), Verdict::Fail);
    }

    #[test]
    fn submit_requires_every_answer() {
        let questions = two_questions();
        let mut state = AssessmentState::new();
        state.select(QuestionId::new(0), 1);
        assert!(!state.can_submit(&questions));
        assert_eq!(
            state.submit(&questions).unwrap_err(),
            AssessmentError::Unanswered {
                missing: vec![QuestionId::new(1)]
            }
        );
        assert!(state.report().is_none());

        state.select(QuestionId::new(1), 2);
        state.select(QuestionId::new(1), 1);
        let report = state.submit(&questions).unwrap();
        assert_eq!(report.correct, 2);
        assert_eq!(report.total, 2);
        assert_eq!(report.verdict, Verdict::Pass);
        assert_eq!(state.score(), Some(100.0));
    }

    #[test]
    fn empty_question_set_cannot_be_submitted() {
        let mut state = AssessmentState::new();
        assert_eq!(state.submit(&[]).unwrap_err(), AssessmentError::NoQuestions);
    }
}
