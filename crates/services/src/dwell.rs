//! Runtime side of the completion gate: one cancellable tokio sleep per
//! entered lesson.

use std::time::Duration;

use learn_core::gate::TimerTicket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// Schedules dwell expiries and reports them on a channel.
///
/// At most one timer is live: scheduling aborts the previous task first.
/// An abort can lose the race against a send that already happened, so
/// receivers must still check tickets against the gate.
pub struct DwellTimer {
    dwell: Duration,
    tx: mpsc::UnboundedSender<TimerTicket>,
    rx: mpsc::UnboundedReceiver<TimerTicket>,
    live: Option<(TimerTicket, JoinHandle<()>)>,
}

impl DwellTimer {
    #[must_use]
    pub fn new(dwell: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            dwell,
            tx,
            rx,
            live: None,
        }
    }

    #[must_use]
    pub fn dwell(&self) -> Duration {
        self.dwell
    }

    #[must_use]
    pub fn live_ticket(&self) -> Option<TimerTicket> {
        self.live.as_ref().map(|(ticket, _)| *ticket)
    }

    /// Start a timer for `ticket`. Must be called inside a tokio runtime.
    pub fn schedule(&mut self, ticket: TimerTicket) {
        self.cancel();
        let tx = self.tx.clone();
        let dwell = self.dwell;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(dwell).await;
            let _ = tx.send(ticket);
        });
        trace!(lesson = ticket.lesson(), "dwell timer scheduled");
        self.live = Some((ticket, handle));
    }

    pub fn cancel(&mut self) {
        if let Some((ticket, handle)) = self.live.take() {
            handle.abort();
            trace!(lesson = ticket.lesson(), "dwell timer cancelled");
        }
    }

    /// Wait for the next expiry. Cancel-safe.
    pub async fn expired(&mut self) -> Option<TimerTicket> {
        let ticket = self.rx.recv().await?;
        self.forget(ticket);
        Some(ticket)
    }

    /// Expiry that already arrived, without waiting.
    pub fn try_expired(&mut self) -> Option<TimerTicket> {
        let ticket = self.rx.try_recv().ok()?;
        self.forget(ticket);
        Some(ticket)
    }

    fn forget(&mut self, ticket: TimerTicket) {
        if self.live_ticket() == Some(ticket) {
            self.live = None;
        }
    }
}

impl Drop for DwellTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
