mod assessment;
mod progress;
mod session;

// Public API of the theory subsystem.
pub use crate::error::SessionError;
pub use progress::LessonView;
pub use session::{Mode, TheorySession};
