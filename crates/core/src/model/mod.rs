mod block;
mod ids;
mod lesson;

pub use block::{BlockKind, LessonBlock, WATCH_PLACEHOLDER_URL};
pub use ids::{ParseIdError, QuestionId, slugify};
pub use lesson::{Catalog, CatalogError, Lesson, Module, ModuleError, lesson_id};
