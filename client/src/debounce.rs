use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Posted to the owner's channel when a quiet period has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuietPeriod {
    pub token: u64,
}

/// Single-slot register for the deferred action that follows an edit.
///
/// Each [`notify`](Self::notify) aborts the armed timer and arms a new one
/// under a fresh token. A timer that fired before it could be aborted still
/// carries its old token, so [`take`](Self::take) rejects it.
pub struct DebounceScheduler<M> {
    delay: Duration,
    token: u64,
    pending: Option<JoinHandle<()>>,
    sender: UnboundedSender<M>,
}

impl<M> DebounceScheduler<M>
where
    M: From<QuietPeriod> + Send + 'static,
{
    pub fn new(delay: Duration, sender: UnboundedSender<M>) -> Self {
        Self {
            delay,
            token: 0,
            pending: None,
            sender,
        }
    }

    /// Restarts the quiet period. Returns the newly armed token.
    pub fn notify(&mut self) -> u64 {
        self.abort_pending();
        self.token += 1;

        let token = self.token;
        let delay = self.delay;
        let sender = self.sender.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // A closed channel means the owner is gone.
            let _ = sender.send(QuietPeriod { token }.into());
        }));

        trace!(token, delay_ms = delay.as_millis() as u64, "Debounce armed");
        token
    }

    /// Claims an elapsed period. Only the armed token is accepted, once.
    pub fn take(&mut self, period: QuietPeriod) -> bool {
        if self.pending.is_some() && period.token == self.token {
            self.pending = None;
            true
        } else {
            debug!(token = period.token, armed = self.token, "Ignoring superseded quiet period");
            false
        }
    }

    pub fn cancel(&mut self) {
        self.abort_pending();
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl<M> DebounceScheduler<M> {
    fn abort_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl<M> Drop for DebounceScheduler<M> {
    fn drop(&mut self) {
        self.abort_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use tokio::time::{sleep, timeout};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn burst_fires_once_with_last_token() {
        let (tx, mut rx) = mpsc::unbounded_channel::<QuietPeriod>();
        let mut debounce = DebounceScheduler::new(ms(200), tx);

        let mut last = 0;
        for _ in 0..5 {
            last = debounce.notify();
            sleep(ms(100)).await;
        }

        let period = rx.recv().await.unwrap();
        assert_eq!(period.token, last);
        assert!(debounce.take(period));
        assert!(!debounce.is_pending());

        assert!(timeout(ms(5_000), rx.recv()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn separated_edits_fire_separately() {
        let (tx, mut rx) = mpsc::unbounded_channel::<QuietPeriod>();
        let mut debounce = DebounceScheduler::new(ms(200), tx);

        debounce.notify();
        let first = rx.recv().await.unwrap();
        assert!(debounce.take(first));

        debounce.notify();
        let second = rx.recv().await.unwrap();
        assert!(debounce.take(second));
        assert_ne!(first.token, second.token);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_token_is_rejected() {
        let (tx, _rx) = mpsc::unbounded_channel::<QuietPeriod>();
        let mut debounce = DebounceScheduler::new(ms(200), tx);

        let old = debounce.notify();
        let new = debounce.notify();

        assert!(!debounce.take(QuietPeriod { token: old }));
        assert!(debounce.is_pending());
        assert!(debounce.take(QuietPeriod { token: new }));
        assert!(!debounce.take(QuietPeriod { token: new }));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_suppresses_pending_action() {
        let (tx, mut rx) = mpsc::unbounded_channel::<QuietPeriod>();
        let mut debounce = DebounceScheduler::new(ms(200), tx);

        let token = debounce.notify();
        debounce.cancel();

        assert!(!debounce.is_pending());
        assert!(timeout(ms(1_000), rx.recv()).await.is_err());
        assert!(!debounce.take(QuietPeriod { token }));
    }
}
