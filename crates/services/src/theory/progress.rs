use learn_core::gate::LessonPhase;
use learn_core::model::LessonBlock;

/// Snapshot of the current lesson, useful for UI.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonView {
    pub index: usize,
    pub lesson_count: usize,
    pub title: String,
    pub phase: LessonPhase,
    pub can_advance: bool,
    pub can_retreat: bool,
    /// The forward affordance leads to the assessment instead of another lesson.
    pub next_is_assessment: bool,
    pub percent: f64,
    pub blocks: Vec<LessonBlock>,
}
