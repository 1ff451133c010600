//! Client-side dashboard state
//!
//! Tracks the online flag, the offline queue, seated players and the
//! latest snapshot pushed by the server.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use clubhours_core::{DisplaySnapshot, ServerMessage};
use tokio::sync::watch;

use crate::active_table::ActiveTable;
use crate::error::ClientError;
use crate::offline_queue::{OfflineQueue, OperationExecutor, PendingOperation, ReplayReport};

/// What happened to a submitted write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Applied,
    Queued,
}

pub struct Dashboard<E: OperationExecutor> {
    executor: E,
    queue: tokio::sync::Mutex<OfflineQueue>,
    /// Realtime link to the server is up
    connected: AtomicBool,
    /// Last write or replay reached the server
    online: AtomicBool,
    table: Mutex<ActiveTable>,
    snapshot: watch::Sender<Option<DisplaySnapshot>>,
}

impl<E: OperationExecutor> Dashboard<E> {
    /// Starts offline until a connection is confirmed
    pub fn new(executor: E, max_attempts: u32) -> Self {
        let (snapshot, _) = watch::channel(None);
        Self {
            executor,
            queue: tokio::sync::Mutex::new(OfflineQueue::new(max_attempts)),
            connected: AtomicBool::new(false),
            online: AtomicBool::new(false),
            table: Mutex::new(ActiveTable::new()),
            snapshot,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    pub async fn pending(&self) -> usize {
        self.queue.lock().await.len()
    }

    /// Record the realtime link state. Connecting replays the queue.
    pub async fn set_online(&self, online: bool) -> Option<ReplayReport> {
        let was_connected = self.connected.swap(online, Ordering::SeqCst);
        if online && !was_connected {
            tracing::info!("Back online");
            return Some(self.replay().await);
        }
        if !online {
            if was_connected {
                tracing::warn!("Connection lost; writes will be queued");
            }
            self.online.store(false, Ordering::SeqCst);
        }
        None
    }

    /// Replay queued writes now
    pub async fn replay(&self) -> ReplayReport {
        let mut queue = self.queue.lock().await;
        self.replay_locked(&mut queue).await
    }

    /// Retry queued writes if the link is up and anything is waiting
    pub async fn retry_pending(&self) -> Option<ReplayReport> {
        if !self.connected.load(Ordering::SeqCst) {
            return None;
        }
        let mut queue = self.queue.lock().await;
        if queue.is_empty() {
            return None;
        }
        Some(self.replay_locked(&mut queue).await)
    }

    async fn replay_locked(&self, queue: &mut OfflineQueue) -> ReplayReport {
        let report = queue.replay(&self.executor).await;
        let reachable = !report.halted && self.connected.load(Ordering::SeqCst);
        self.online.store(reachable, Ordering::SeqCst);
        report
    }

    /// Send a write now, or queue it if the server cannot be reached.
    ///
    /// Older queued writes always go first; a new write is only sent
    /// directly once the queue has drained.
    pub async fn submit(&self, operation: PendingOperation) -> Result<SubmitOutcome, ClientError> {
        let mut queue = self.queue.lock().await;

        if !self.connected.load(Ordering::SeqCst) {
            queue.push(operation);
            return Ok(SubmitOutcome::Queued);
        }

        if !queue.is_empty() {
            self.replay_locked(&mut queue).await;
            if !queue.is_empty() {
                queue.push(operation);
                return Ok(SubmitOutcome::Queued);
            }
        }

        match self.executor.execute(&operation).await {
            Ok(()) => {
                self.online.store(true, Ordering::SeqCst);
                Ok(SubmitOutcome::Applied)
            }
            Err(e) if e.is_offline() => {
                tracing::warn!(op = %operation.label(), "Request failed, queueing: {}", e);
                self.online.store(false, Ordering::SeqCst);
                queue.push(operation);
                Ok(SubmitOutcome::Queued)
            }
            Err(e) => Err(e),
        }
    }

    pub fn seat_in(&self, player_id: i64, at: DateTime<Utc>) -> Result<(), ClientError> {
        self.lock_table().seat_in(player_id, at)?;
        Ok(())
    }

    /// Stop a player's timer and record the resulting session
    pub async fn seat_out(&self, player_id: i64, at: DateTime<Utc>) -> Result<SubmitOutcome, ClientError> {
        let session = self.lock_table().seat_out(player_id, at)?;
        self.submit(PendingOperation::CreateSession(session)).await
    }

    pub fn seated(&self) -> Vec<(i64, DateTime<Utc>)> {
        self.lock_table().seated()
    }

    fn lock_table(&self) -> std::sync::MutexGuard<'_, ActiveTable> {
        // Timer state stays valid even if a holder panicked
        self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Apply a realtime message; snapshots replace local state wholesale
    pub fn apply_server_message(&self, message: ServerMessage) {
        match message {
            ServerMessage::Snapshot { snapshot } => {
                self.snapshot.send_replace(Some(snapshot));
            }
            ServerMessage::Error { message } => {
                tracing::warn!("Realtime error from server: {}", message);
            }
            ServerMessage::Pong => {}
        }
    }

    pub fn snapshot(&self) -> Option<DisplaySnapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<DisplaySnapshot>> {
        self.snapshot.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::atomic::AtomicUsize;

    /// Succeeds while `reachable` is set, otherwise reports offline
    #[derive(Default)]
    struct FlakyServer {
        reachable: AtomicBool,
        applied: AtomicUsize,
    }

    #[async_trait]
    impl OperationExecutor for FlakyServer {
        async fn execute(&self, _operation: &PendingOperation) -> Result<(), ClientError> {
            if self.reachable.load(Ordering::SeqCst) {
                self.applied.fetch_add(1, Ordering::SeqCst);
                Ok(())
            } else {
                Err(ClientError::Offline("network down".to_string()))
            }
        }
    }

    /// Answers 500 for one session id and records every delete it sees
    struct RejectingServer {
        reject_id: i64,
        calls: Mutex<Vec<i64>>,
    }

    impl RejectingServer {
        fn new(reject_id: i64) -> Self {
            Self { reject_id, calls: Mutex::new(Vec::new()) }
        }

        fn calls(&self) -> Vec<i64> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OperationExecutor for RejectingServer {
        async fn execute(&self, operation: &PendingOperation) -> Result<(), ClientError> {
            if let PendingOperation::DeleteSession { id } = operation {
                self.calls.lock().unwrap().push(*id);
                if *id == self.reject_id {
                    return Err(ClientError::Api { status: 500, message: "boom".to_string() });
                }
            }
            Ok(())
        }
    }

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 2, h, 0, 0).unwrap()
    }

    fn empty_snapshot() -> DisplaySnapshot {
        DisplaySnapshot {
            players: vec![],
            sessions: vec![],
            promotions: vec![],
            leaderboards: vec![],
            penalties: vec![],
            addons: vec![],
            generated_at: at(12),
        }
    }

    #[tokio::test]
    async fn test_offline_writes_are_queued_then_replayed() {
        let dashboard = Dashboard::new(FlakyServer::default(), 3);
        assert!(!dashboard.is_online());

        dashboard.seat_in(5, at(18)).unwrap();
        let outcome = dashboard.seat_out(5, at(21)).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Queued);
        assert_eq!(dashboard.pending().await, 1);

        dashboard.executor().reachable.store(true, Ordering::SeqCst);
        let report = dashboard.set_online(true).await.unwrap();
        assert_eq!(report.applied, 1);
        assert_eq!(dashboard.pending().await, 0);
        assert_eq!(dashboard.executor().applied.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_flips_offline() {
        let dashboard = Dashboard::new(FlakyServer::default(), 3);
        dashboard.set_online(true).await;
        assert!(dashboard.is_online());

        let outcome = dashboard
            .submit(PendingOperation::DeleteSession { id: 1 })
            .await
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Queued);
        assert!(!dashboard.is_online());
        assert_eq!(dashboard.pending().await, 1);
    }

    #[tokio::test]
    async fn test_recovers_from_blip_while_connected() {
        let dashboard = Dashboard::new(FlakyServer::default(), 3);
        dashboard.set_online(true).await;

        let first = dashboard.submit(PendingOperation::DeleteSession { id: 1 }).await.unwrap();
        assert_eq!(first, SubmitOutcome::Queued);
        assert!(!dashboard.is_online());

        dashboard.executor().reachable.store(true, Ordering::SeqCst);
        for id in 2..=6 {
            let outcome = dashboard.submit(PendingOperation::DeleteSession { id }).await.unwrap();
            assert_eq!(outcome, SubmitOutcome::Applied);
        }
        assert!(dashboard.is_online());
        assert_eq!(dashboard.pending().await, 0);
        assert_eq!(dashboard.executor().applied.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_halted_replay_retried_on_next_message() {
        let dashboard = Dashboard::new(FlakyServer::default(), 3);
        dashboard.submit(PendingOperation::DeleteSession { id: 1 }).await.unwrap();

        let report = dashboard.set_online(true).await.unwrap();
        assert!(report.halted);
        assert!(!dashboard.is_online());

        dashboard.executor().reachable.store(true, Ordering::SeqCst);
        let report = dashboard.retry_pending().await.unwrap();
        assert_eq!(report.applied, 1);
        assert!(dashboard.is_online());
        assert!(dashboard.retry_pending().await.is_none());
    }

    #[tokio::test]
    async fn test_new_write_waits_behind_rejected_one() {
        let dashboard = Dashboard::new(RejectingServer::new(1), 3);
        dashboard.submit(PendingOperation::DeleteSession { id: 1 }).await.unwrap();

        let report = dashboard.set_online(true).await.unwrap();
        assert_eq!(report.retained, 1);

        let outcome = dashboard.submit(PendingOperation::DeleteSession { id: 2 }).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Queued);
        assert_eq!(dashboard.pending().await, 2);
        assert_eq!(dashboard.executor().calls(), vec![1, 1]);

        // Third rejection drops id 1, then id 2 goes through
        dashboard.replay().await;
        assert_eq!(dashboard.executor().calls(), vec![1, 1, 1, 2]);
        assert_eq!(dashboard.pending().await, 0);
    }

    #[tokio::test]
    async fn test_seat_out_without_seat_in_fails() {
        let dashboard = Dashboard::new(FlakyServer::default(), 3);
        let err = dashboard.seat_out(8, at(20)).await.unwrap_err();
        assert!(matches!(err, ClientError::Table(_)));
        assert_eq!(dashboard.pending().await, 0);
    }

    #[test]
    fn test_snapshot_replaced_wholesale() {
        let dashboard = Dashboard::new(FlakyServer::default(), 3);
        let mut rx = dashboard.subscribe();
        assert!(dashboard.snapshot().is_none());

        dashboard.apply_server_message(ServerMessage::Snapshot { snapshot: empty_snapshot() });
        assert!(rx.has_changed().unwrap());
        assert_eq!(dashboard.snapshot().unwrap().generated_at, at(12));

        let mut newer = empty_snapshot();
        newer.generated_at = at(13);
        dashboard.apply_server_message(ServerMessage::Snapshot { snapshot: newer });
        assert_eq!(rx.borrow_and_update().as_ref().unwrap().generated_at, at(13));

        dashboard.apply_server_message(ServerMessage::Pong);
        assert_eq!(dashboard.snapshot().unwrap().generated_at, at(13));
    }
}
