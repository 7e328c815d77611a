//! Conversation Polling
//!
//! While a chat screen is open, a background task re-fetches the thread on
//! a fixed period and hands each result to the state-owning event loop
//! through a channel.
//!
//! # Lifecycle
//!
//! - The first tick fires one full period after the task starts; the
//!   initial load is the chat screen's job.
//! - Each fetch is awaited before the next tick is considered, and ticks
//!   missed during a slow fetch are skipped, so fetches never overlap.
//! - Fetch failures are logged at debug level and dropped. The screen keeps
//!   showing its last good data.
//! - [`PollHandle`] aborts the task on [`PollHandle::cancel`] and on drop.
//!   Every update carries the handle's generation so a receiver can ignore
//!   anything sent by a handle it no longer owns.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::error::Result;
use crate::gateway::ApiGateway;
use crate::models::{Message, RecordId};

/// Refresh period for an open conversation
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Anything that can produce the message thread with one counterpart
#[async_trait]
pub trait ThreadSource: Send + Sync {
    async fn fetch_thread(&self, counterpart: RecordId) -> Result<Vec<Message>>;
}

#[async_trait]
impl ThreadSource for ApiGateway {
    async fn fetch_thread(&self, counterpart: RecordId) -> Result<Vec<Message>> {
        self.messages().thread(counterpart).await
    }
}

/// One successful refresh
#[derive(Clone, Debug, PartialEq)]
pub struct PollUpdate {
    pub generation: u64,
    pub counterpart: RecordId,
    pub messages: Vec<Message>,
}

/// Owner of a running poll task
#[derive(Debug)]
pub struct PollHandle {
    generation: u64,
    counterpart: RecordId,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Start polling `counterpart`'s thread every `period`
    pub fn spawn(
        source: Arc<dyn ThreadSource>,
        counterpart: RecordId,
        period: Duration,
        updates: mpsc::Sender<PollUpdate>,
    ) -> Self {
        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        let task = tokio::spawn(run(source, counterpart, period, generation, updates));

        tracing::debug!(
            generation,
            counterpart,
            period_ms = period.as_millis() as u64,
            "Conversation polling started"
        );

        Self {
            generation,
            counterpart,
            task,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn counterpart(&self) -> RecordId {
        self.counterpart
    }

    /// Whether `update` came from this handle
    pub fn owns(&self, update: &PollUpdate) -> bool {
        update.generation == self.generation && update.counterpart == self.counterpart
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the task. No fetch starts after this returns.
    pub fn cancel(&self) {
        if !self.task.is_finished() {
            tracing::debug!(generation = self.generation, "Conversation polling stopped");
        }
        self.task.abort();
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run(
    source: Arc<dyn ThreadSource>,
    counterpart: RecordId,
    period: Duration,
    generation: u64,
    updates: mpsc::Sender<PollUpdate>,
) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        match source.fetch_thread(counterpart).await {
            Ok(messages) => {
                let update = PollUpdate {
                    generation,
                    counterpart,
                    messages,
                };
                if updates.send(update).await.is_err() {
                    tracing::debug!(generation, "Poll receiver gone, stopping");
                    break;
                }
            }
            Err(e) => {
                tracing::debug!(generation, counterpart, error = %e, "Poll tick failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::gateway::TransportError;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::AtomicUsize;

    /// Counts fetches and fails every other one
    struct CountingSource {
        calls: AtomicUsize,
        fail_even: bool,
        seen: Mutex<Vec<RecordId>>,
    }

    impl CountingSource {
        fn new(fail_even: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail_even,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ThreadSource for CountingSource {
        async fn fetch_thread(&self, counterpart: RecordId) -> Result<Vec<Message>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.seen.lock().push(counterpart);
            if self.fail_even && n % 2 == 0 {
                return Err(ClientError::Transport(TransportError::Timeout));
            }
            Ok(vec![Message {
                id: n as i64,
                sender_id: counterpart,
                receiver_id: 1,
                trip_id: None,
                message: format!("tick {n}"),
                created_at: "2026-05-01T08:00:00".into(),
                read_at: None,
            }])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_one_period() {
        let source = CountingSource::new(false);
        let (tx, mut rx) = mpsc::channel(8);
        let handle = PollHandle::spawn(source.clone(), 7, Duration::from_secs(5), tx);

        time::sleep(Duration::from_millis(4_900)).await;
        assert_eq!(source.calls(), 0);

        let update = rx.recv().await.unwrap();
        assert!(handle.owns(&update));
        assert_eq!(update.counterpart, 7);
        assert_eq!(source.calls(), 1);
        assert_eq!(source.seen.lock().as_slice(), &[7]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_are_skipped() {
        let source = CountingSource::new(true);
        let (tx, mut rx) = mpsc::channel(8);
        let _handle = PollHandle::spawn(source.clone(), 7, Duration::from_secs(5), tx);

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.messages[0].message, "tick 1");
        assert_eq!(second.messages[0].message, "tick 3");
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_fetching() {
        let source = CountingSource::new(false);
        let (tx, mut rx) = mpsc::channel(8);
        let handle = PollHandle::spawn(source.clone(), 7, Duration::from_secs(5), tx);

        rx.recv().await.unwrap();
        handle.cancel();
        tokio::task::yield_now().await;
        let calls = source.calls();

        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls(), calls);
        assert!(!handle.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_fetching() {
        let source = CountingSource::new(false);
        let (tx, _rx) = mpsc::channel(8);
        let handle = PollHandle::spawn(source.clone(), 7, Duration::from_secs(5), tx);
        drop(handle);

        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_generations_are_distinct() {
        let source = CountingSource::new(false);
        let (tx, _rx) = mpsc::channel(8);
        let a = PollHandle::spawn(source.clone(), 7, DEFAULT_POLL_INTERVAL, tx.clone());
        let b = PollHandle::spawn(source, 7, DEFAULT_POLL_INTERVAL, tx);
        assert_ne!(a.generation(), b.generation());

        let stale = PollUpdate {
            generation: a.generation(),
            counterpart: 7,
            messages: Vec::new(),
        };
        assert!(!b.owns(&stale));
    }
}
