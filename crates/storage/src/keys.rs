//! Durable-store key formats. Each module title is its own namespace.

use learn_core::model::slugify;

/// `theory:<moduleTitle>:last:lesson` → string-encoded lesson index.
#[must_use]
pub fn last_lesson(module_title: &str) -> String {
    format!("theory:{module_title}:last:lesson")
}

/// `module-<slug>-completed-lesson-ids` → JSON array of lesson ids.
#[must_use]
pub fn completed_lessons(module_title: &str) -> String {
    format!("module-{}-completed-lesson-ids", slugify(module_title))
}

/// `assessment:<slug>:passed` → `"true"` once the assessment was passed.
#[must_use]
pub fn assessment_passed(module_title: &str) -> String {
    format!("assessment:{}:passed", slugify(module_title))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_formats() {
        assert_eq!(
            last_lesson("Hybrid Detection"),
            "theory:Hybrid Detection:last:lesson"
        );
        assert_eq!(
            completed_lessons("Hybrid Detection"),
            "module-hybrid-detection-completed-lesson-ids"
        );
        assert_eq!(
            assessment_passed("Hybrid Detection"),
            "assessment:hybrid-detection:passed"
        );
    }

    #[test]
    fn module_titles_do_not_collide() {
        assert_ne!(last_lesson("Anomaly"), last_lesson("Anomaly Based"));
    }
}
