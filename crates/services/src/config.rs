use std::time::Duration;

use learn_core::gate::DEFAULT_DWELL_SECS;

/// What happens to assessment answers when the learner leaves the
/// assessment and comes back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetakePolicy {
    /// Answers and score are discarded; re-entry starts a fresh attempt.
    #[default]
    Reset,
    /// Answers and score are kept until the session ends.
    Preserve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub dwell: Duration,
    pub retake: RetakePolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dwell: Duration::from_secs(DEFAULT_DWELL_SECS.unsigned_abs()),
            retake: RetakePolicy::default(),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_dwell(mut self, dwell: Duration) -> Self {
        self.dwell = dwell;
        self
    }

    #[must_use]
    pub fn with_retake(mut self, retake: RetakePolicy) -> Self {
        self.retake = retake;
        self
    }

    pub(crate) fn gate_dwell(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.dwell)
            .unwrap_or_else(|_| learn_core::gate::default_dwell())
    }
}
