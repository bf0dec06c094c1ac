//! Current-lesson bookkeeping for one module.

use chrono::{DateTime, Utc};

use crate::gate::{CompletionGate, GateTransition, LessonPhase};
use crate::resolver::Resolution;

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Moved {
        from: usize,
        to: usize,
        timer: GateTransition,
    },
    /// Advance requested while the current lesson is not yet complete.
    Blocked,
    /// Retreat requested on the first lesson.
    AtStart,
    /// Requested index equals the current one, or lies outside the module.
    Unchanged,
    /// Advance from a complete last lesson.
    EnterAssessment,
}

impl Navigation {
    #[must_use]
    pub fn moved_to(&self) -> Option<usize> {
        match self {
            Self::Moved { to, .. } => Some(*to),
            _ => None,
        }
    }
}

/// `current_index` is always in `[0, lesson_count)`; completed lessons are never revoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressionState {
    module_title: String,
    lesson_count: usize,
    current: usize,
    gate: CompletionGate,
}

impl ProgressionState {
    /// Start at a resolved position. `lesson_count` must be at least 1; an
    /// out-of-range resolution is clamped.
    #[must_use]
    pub fn new(
        module_title: impl Into<String>,
        lesson_count: usize,
        resolution: Resolution,
        gate: CompletionGate,
    ) -> Self {
        let lesson_count = lesson_count.max(1);
        Self {
            module_title: module_title.into(),
            lesson_count,
            current: resolution.index.min(lesson_count - 1),
            gate,
        }
    }

    #[must_use]
    pub fn module_title(&self) -> &str {
        &self.module_title
    }

    #[must_use]
    pub fn lesson_count(&self) -> usize {
        self.lesson_count
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn gate(&self) -> &CompletionGate {
        &self.gate
    }

    pub fn gate_mut(&mut self) -> &mut CompletionGate {
        &mut self.gate
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 == self.lesson_count
    }

    #[must_use]
    pub fn current_phase(&self) -> LessonPhase {
        self.gate.phase(self.current)
    }

    /// Whether the forward affordance is available.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.gate.is_complete(self.current)
    }

    #[must_use]
    pub fn can_retreat(&self) -> bool {
        self.current > 0
    }

    #[must_use]
    pub fn all_complete(&self) -> bool {
        self.gate.all_complete(self.lesson_count)
    }

    /// Position progress: `current / lesson_count × 100`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> f64 {
        self.current as f64 / self.lesson_count as f64 * 100.0
    }

    /// Start timing the current lesson, e.g. right after load.
    pub fn enter_current(&mut self, now: DateTime<Utc>) -> GateTransition {
        self.gate.enter(self.current, now)
    }

    pub fn advance(&mut self, now: DateTime<Utc>) -> Navigation {
        if !self.can_advance() {
            return Navigation::Blocked;
        }
        if self.is_last() {
            return Navigation::EnterAssessment;
        }
        self.move_to(self.current + 1, now)
    }

    pub fn retreat(&mut self, now: DateTime<Utc>) -> Navigation {
        if !self.can_retreat() {
            return Navigation::AtStart;
        }
        self.move_to(self.current - 1, now)
    }

    /// Jump to an arbitrary lesson (sidebar link, external set).
    pub fn go_to(&mut self, index: usize, now: DateTime<Utc>) -> Navigation {
        if index >= self.lesson_count || index == self.current {
            return Navigation::Unchanged;
        }
        self.move_to(index, now)
    }

    fn move_to(&mut self, to: usize, now: DateTime<Utc>) -> Navigation {
        let from = self.current;
        self.current = to;
        let timer = self.gate.enter(to, now);
        Navigation::Moved { from, to, timer }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::EnterOutcome;
    use crate::resolver::resolve_index;
    use crate::time::fixed_clock;
    use chrono::Duration;

    fn state(count: usize, url: Option<&str>) -> ProgressionState {
        ProgressionState::new(
            "Signature-Based Detection",
            count,
            resolve_index(url, None, count),
            CompletionGate::default(),
        )
    }

    #[test]
    fn advance_is_blocked_until_complete() {
        let mut clock = fixed_clock();
        let mut s = state(3, None);
        s.enter_current(clock.now());
        assert_eq!(s.advance(clock.now()), Navigation::Blocked);
        assert_eq!(s.current_index(), 0);

        clock.advance(Duration::seconds(20));
        assert_eq!(s.gate_mut().poll(clock.now()), Some(0));
        let nav = s.advance(clock.now());
        assert_eq!(nav.moved_to(), Some(1));
        assert_eq!(s.current_phase(), LessonPhase::Timing);
    }

    #[test]
    fn retreat_at_start_is_noop() {
        let mut s = state(3, None);
        assert_eq!(s.retreat(fixed_clock().now()), Navigation::AtStart);
        assert_eq!(s.current_index(), 0);
    }

    #[test]
    fn advancing_past_last_enters_assessment() {
        let now = fixed_clock().now();
        let mut s = state(2, Some("1"));
        let ticket = s.enter_current(now).started().unwrap();
        s.gate_mut().expire(ticket);
        assert!(s.is_last());
        assert_eq!(s.advance(now), Navigation::EnterAssessment);
        assert_eq!(s.current_index(), 1);
    }

    #[test]
    fn retreat_cancels_live_timer_and_revisits_complete_lesson() {
        let now = fixed_clock().now();
        let mut s = state(3, None);
        let t0 = s.enter_current(now).started().unwrap();
        s.gate_mut().expire(t0);
        s.advance(now);
        let Navigation::Moved { timer, .. } = s.retreat(now) else {
            panic!("expected move");
        };
        assert_eq!(timer.entered, EnterOutcome::AlreadyComplete);
        assert_eq!(timer.cancelled.map(|t| t.lesson()), Some(1));
        assert!(s.can_advance());
    }

    #[test]
    fn go_to_rejects_out_of_range() {
        let now = fixed_clock().now();
        let mut s = state(3, None);
        assert_eq!(s.go_to(3, now), Navigation::Unchanged);
        assert_eq!(s.go_to(0, now), Navigation::Unchanged);
        assert_eq!(s.go_to(2, now).moved_to(), Some(2));
        assert!((s.percent() - 200.0 / 3.0).abs() < 1e-9);
    }
}
