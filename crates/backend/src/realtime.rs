//! Snapshot publisher for the realtime feed
//!
//! Writes only mark the club state as changed. One task turns those marks
//! into snapshots, so broadcasts go out in the order they were loaded and
//! a burst of writes collapses into a single fresh load.

use std::future::Future;
use std::sync::Arc;

use clubhours_core::{DisplaySnapshot, ServerMessage};
use tokio::sync::{broadcast, Notify};

use crate::db::DbError;

pub async fn publish_changes<F, Fut>(
    changes: Arc<Notify>,
    events: broadcast::Sender<ServerMessage>,
    mut load: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<DisplaySnapshot, DbError>>,
{
    loop {
        changes.notified().await;

        if events.receiver_count() == 0 {
            continue;
        }

        match load().await {
            Ok(snapshot) => {
                let _ = events.send(ServerMessage::Snapshot { snapshot });
            }
            Err(e) => tracing::error!("Failed to publish snapshot: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
    use std::time::Duration;

    fn snapshot_at(version: i64) -> DisplaySnapshot {
        DisplaySnapshot {
            players: vec![],
            sessions: vec![],
            promotions: vec![],
            leaderboards: vec![],
            penalties: vec![],
            addons: vec![],
            generated_at: Utc.timestamp_opt(version, 0).unwrap(),
        }
    }

    async fn next_time(rx: &mut broadcast::Receiver<ServerMessage>) -> DateTime<Utc> {
        let msg = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("no snapshot published")
            .unwrap();
        match msg {
            ServerMessage::Snapshot { snapshot } => snapshot.generated_at,
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slow_load_never_overtakes_newer_write() {
        let changes = Arc::new(Notify::new());
        let (events, mut rx) = broadcast::channel(16);

        // The first load reads the state, then stalls while a second write lands
        let version = Arc::new(AtomicI64::new(1));
        let loads = Arc::new(AtomicUsize::new(0));
        let loader = {
            let version = Arc::clone(&version);
            let loads = Arc::clone(&loads);
            move || {
                let seen = version.load(Ordering::SeqCst);
                let call = loads.fetch_add(1, Ordering::SeqCst);
                async move {
                    if call == 0 {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                    Ok(snapshot_at(seen))
                }
            }
        };
        let publisher = tokio::spawn(publish_changes(Arc::clone(&changes), events, loader));

        changes.notify_one();
        tokio::time::sleep(Duration::from_millis(20)).await;
        version.store(2, Ordering::SeqCst);
        changes.notify_one();

        assert_eq!(next_time(&mut rx).await, snapshot_at(1).generated_at);
        assert_eq!(next_time(&mut rx).await, snapshot_at(2).generated_at);
        assert_eq!(loads.load(Ordering::SeqCst), 2);

        publisher.abort();
    }

    #[tokio::test]
    async fn test_burst_of_writes_loads_once() {
        let changes = Arc::new(Notify::new());
        let (events, mut rx) = broadcast::channel(16);
        let loads = Arc::new(AtomicUsize::new(0));

        // Marked dirty three times before the publisher gets to run
        changes.notify_one();
        changes.notify_one();
        changes.notify_one();

        let counter = Arc::clone(&loads);
        let publisher = tokio::spawn(publish_changes(Arc::clone(&changes), events, move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) as i64;
            async move { Ok(snapshot_at(n)) }
        }));

        next_time(&mut rx).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        publisher.abort();
    }
}
