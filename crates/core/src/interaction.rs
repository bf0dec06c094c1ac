//! Transient UI state for classified blocks, keyed by block position.
//!
//! None of this is persisted, and none of it lives inside [`LessonBlock`].

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{BlockKind, LessonBlock};

/// Free-text answer being typed into a quiz block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizDraft {
    answer: String,
    submitted: bool,
}

impl QuizDraft {
    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Replace the draft text. Ignored once submitted.
    pub fn edit(&mut self, text: impl Into<String>) {
        if !self.submitted {
            self.answer = text.into();
        }
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.submitted && !self.answer.trim().is_empty()
    }

    /// Returns whether the submission was accepted.
    pub fn submit(&mut self) -> bool {
        if !self.can_submit() {
            return false;
        }
        self.submitted = true;
        true
    }

    /// Feedback is shown exactly when an answer was provided and submitted.
    #[must_use]
    pub fn shows_feedback(&self) -> bool {
        self.submitted && !self.answer.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockInteractions {
    disclosed: BTreeSet<usize>,
    quizzes: BTreeMap<usize, QuizDraft>,
}

impl BlockInteractions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the disclosure of a `TryIt`/`Interactive` block.
    ///
    /// Returns the new state, or `None` when the block at `position` is not disclosable.
    pub fn toggle(&mut self, blocks: &[LessonBlock], position: usize) -> Option<bool> {
        if !blocks.get(position)?.kind().is_disclosable() {
            return None;
        }
        if self.disclosed.remove(&position) {
            Some(false)
        } else {
            self.disclosed.insert(position);
            Some(true)
        }
    }

    #[must_use]
    pub fn is_disclosed(&self, position: usize) -> bool {
        self.disclosed.contains(&position)
    }

    #[must_use]
    pub fn quiz(&self, position: usize) -> Option<&QuizDraft> {
        self.quizzes.get(&position)
    }

    /// Draft for the quiz block at `position`, created on first access.
    pub fn quiz_mut(&mut self, blocks: &[LessonBlock], position: usize) -> Option<&mut QuizDraft> {
        if blocks.get(position)?.kind() != BlockKind::Quiz {
            return None;
        }
        Some(self.quizzes.entry(position).or_default())
    }

    /// Forget everything, e.g. when a different lesson is shown.
    pub fn clear(&mut self) {
        self.disclosed.clear();
        self.quizzes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;

    fn blocks() -> Vec<LessonBlock> {
        classify("Intro\n\n**Try it:** > ping\n\n**Quiz:** - true or false?")
    }

    #[test]
    fn disclosure_defaults_closed_and_toggles() {
        let blocks = blocks();
        let mut ui = BlockInteractions::new();
        assert!(!ui.is_disclosed(1));
        assert_eq!(ui.toggle(&blocks, 1), Some(true));
        assert!(ui.is_disclosed(1));
        assert_eq!(ui.toggle(&blocks, 1), Some(false));
        assert_eq!(ui.toggle(&blocks, 0), None);
        assert_eq!(ui.toggle(&blocks, 42), None);
    }

    #[test]
    fn quiz_feedback_requires_submitted_answer() {
        let blocks = blocks();
        let mut ui = BlockInteractions::new();
        assert!(ui.quiz_mut(&blocks, 1).is_none());

        let draft = ui.quiz_mut(&blocks, 2).unwrap();
        assert!(!draft.submit());
        draft.edit("   ");
        assert!(!draft.submit());
        assert!(!draft.shows_feedback());

        draft.edit("true");
        assert!(draft.submit());
        assert!(draft.shows_feedback());
        draft.edit("false");
        assert_eq!(draft.answer(), "true");
        assert!(!draft.submit());
    }

    #[test]
    fn clear_resets_state() {
        let blocks = blocks();
        let mut ui = BlockInteractions::new();
        ui.toggle(&blocks, 1);
        ui.quiz_mut(&blocks, 2).unwrap().edit("x");
        ui.clear();
        assert!(!ui.is_disclosed(1));
        assert!(ui.quiz(2).is_none());
    }
}
