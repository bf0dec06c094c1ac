//! Per-lesson dwell gate: `Unseen → Timing → Complete`.
//!
//! The gate never schedules anything itself. Entering a lesson hands out a
//! [`TimerTicket`]; whoever owns the real timer reports expiry with that
//! ticket through [`CompletionGate::expire`]. Only the ticket of the single
//! live timing can complete a lesson, so an expiry that races a cancellation
//! is ignored. Hosts without a timer can call [`CompletionGate::poll`] with
//! the current time instead.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};

/// Minimum time a lesson must stay current before it completes.
pub const DEFAULT_DWELL_SECS: i64 = 20;

#[must_use]
pub fn default_dwell() -> Duration {
    Duration::seconds(DEFAULT_DWELL_SECS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonPhase {
    Unseen,
    Timing,
    Complete,
}

/// Handle for one scheduled dwell timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerTicket {
    lesson: usize,
    id: u64,
}

impl TimerTicket {
    #[must_use]
    pub fn lesson(&self) -> usize {
        self.lesson
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterOutcome {
    /// A fresh timer must be scheduled for this ticket.
    Started(TimerTicket),
    /// The lesson is already timing; nothing to schedule.
    AlreadyTiming(TimerTicket),
    AlreadyComplete,
}

/// Result of entering a lesson: what to schedule and what to cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateTransition {
    pub entered: EnterOutcome,
    pub cancelled: Option<TimerTicket>,
}

impl GateTransition {
    #[must_use]
    pub fn started(&self) -> Option<TimerTicket> {
        match self.entered {
            EnterOutcome::Started(ticket) => Some(ticket),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Timing {
    ticket: TimerTicket,
    started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionGate {
    dwell: Duration,
    completed: BTreeSet<usize>,
    timing: Option<Timing>,
    next_ticket: u64,
}

impl Default for CompletionGate {
    fn default() -> Self {
        Self::new(default_dwell())
    }
}

impl CompletionGate {
    #[must_use]
    pub fn new(dwell: Duration) -> Self {
        Self {
            dwell,
            completed: BTreeSet::new(),
            timing: None,
            next_ticket: 0,
        }
    }

    #[must_use]
    pub fn dwell(&self) -> Duration {
        self.dwell
    }

    /// The learner's current lesson became `lesson`.
    ///
    /// Any timing for a different lesson is cancelled. Re-entering the lesson
    /// that is already timing keeps its original start.
    pub fn enter(&mut self, lesson: usize, now: DateTime<Utc>) -> GateTransition {
        if let Some(timing) = self.timing.filter(|t| t.ticket.lesson == lesson) {
            return GateTransition {
                entered: EnterOutcome::AlreadyTiming(timing.ticket),
                cancelled: None,
            };
        }

        let cancelled = self.leave();
        if self.completed.contains(&lesson) {
            return GateTransition {
                entered: EnterOutcome::AlreadyComplete,
                cancelled,
            };
        }

        let ticket = TimerTicket {
            lesson,
            id: self.next_ticket,
        };
        self.next_ticket = self.next_ticket.wrapping_add(1);
        self.timing = Some(Timing {
            ticket,
            started_at: now,
        });
        GateTransition {
            entered: EnterOutcome::Started(ticket),
            cancelled,
        }
    }

    /// Cancel the live timing, if any. No partial credit is kept.
    pub fn leave(&mut self) -> Option<TimerTicket> {
        self.timing.take().map(|t| t.ticket)
    }

    /// A scheduled timer fired. Returns the completed lesson, or `None` for a
    /// stale ticket.
    pub fn expire(&mut self, ticket: TimerTicket) -> Option<usize> {
        match self.timing {
            Some(timing) if timing.ticket == ticket => {
                self.timing = None;
                self.completed.insert(ticket.lesson);
                Some(ticket.lesson)
            }
            _ => None,
        }
    }

    /// Clock-driven alternative to [`Self::expire`].
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<usize> {
        let timing = self.timing?;
        if now.signed_duration_since(timing.started_at) >= self.dwell {
            self.expire(timing.ticket)
        } else {
            None
        }
    }

    #[must_use]
    pub fn live_ticket(&self) -> Option<TimerTicket> {
        self.timing.map(|t| t.ticket)
    }

    #[must_use]
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.timing.map(|t| t.started_at + self.dwell)
    }

    /// Time left on the live timing, floored at zero.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.deadline()
            .map(|deadline| (deadline - now).max(Duration::zero()))
    }

    #[must_use]
    pub fn phase(&self, lesson: usize) -> LessonPhase {
        if self.completed.contains(&lesson) {
            LessonPhase::Complete
        } else if self.timing.is_some_and(|t| t.ticket.lesson == lesson) {
            LessonPhase::Timing
        } else {
            LessonPhase::Unseen
        }
    }

    #[must_use]
    pub fn is_complete(&self, lesson: usize) -> bool {
        self.completed.contains(&lesson)
    }

    #[must_use]
    pub fn completed(&self) -> &BTreeSet<usize> {
        &self.completed
    }

    #[must_use]
    pub fn all_complete(&self, lesson_count: usize) -> bool {
        (0..lesson_count).all(|i| self.completed.contains(&i))
    }
}
