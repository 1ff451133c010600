//! Writes made while offline, replayed in order on reconnect
//!
//! Each item is tried at most `max_attempts` times across replays and
//! then dropped. There are no idempotency keys: an operation that reached
//! the server but whose response was lost will be applied twice.

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clubhours_core::{NewAddon, NewPenalty, NewPlayer, NewSession};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// A write that can be deferred until the server is reachable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PendingOperation {
    CreatePlayer(NewPlayer),
    CreateSession(NewSession),
    CreatePenalty(NewPenalty),
    CreateAddon(NewAddon),
    DeleteSession { id: i64 },
}

impl PendingOperation {
    pub fn label(&self) -> &'static str {
        match self {
            PendingOperation::CreatePlayer(_) => "create_player",
            PendingOperation::CreateSession(_) => "create_session",
            PendingOperation::CreatePenalty(_) => "create_penalty",
            PendingOperation::CreateAddon(_) => "create_addon",
            PendingOperation::DeleteSession { .. } => "delete_session",
        }
    }
}

/// Something that can push a pending operation to the server
#[async_trait]
pub trait OperationExecutor: Send + Sync {
    async fn execute(&self, operation: &PendingOperation) -> Result<(), ClientError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedOperation {
    pub operation: PendingOperation,
    /// Failed attempts so far
    pub attempts: u32,
    pub queued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub applied: usize,
    /// Failed this round but still queued
    pub retained: usize,
    /// Failed for the last allowed time and discarded
    pub dropped: usize,
    /// Replay stopped early because the server became unreachable
    pub halted: bool,
}

#[derive(Debug)]
pub struct OfflineQueue {
    items: VecDeque<QueuedOperation>,
    max_attempts: u32,
}

impl OfflineQueue {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            items: VecDeque::new(),
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn push(&mut self, operation: PendingOperation) {
        tracing::info!(op = %operation.label(), "Queued operation while offline");
        self.items.push_back(QueuedOperation {
            operation,
            attempts: 0,
            queued_at: Utc::now(),
        });
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueuedOperation> {
        self.items.iter()
    }

    /// Execute queued operations front to back.
    ///
    /// A rejected operation is counted and kept in place for the next
    /// replay. A transport failure also stops the replay, leaving the
    /// rest of the queue untouched.
    pub async fn replay<E: OperationExecutor + ?Sized>(&mut self, executor: &E) -> ReplayReport {
        let mut report = ReplayReport::default();
        let mut kept: VecDeque<QueuedOperation> = VecDeque::with_capacity(self.items.len());

        while let Some(mut item) = self.items.pop_front() {
            match executor.execute(&item.operation).await {
                Ok(()) => report.applied += 1,
                Err(e) => {
                    item.attempts += 1;
                    let offline = e.is_offline();

                    if item.attempts >= self.max_attempts {
                        tracing::warn!(
                            op = %item.operation.label(),
                            attempts = %item.attempts,
                            "Dropping queued operation: {}",
                            e
                        );
                        report.dropped += 1;
                    } else {
                        tracing::debug!(
                            op = %item.operation.label(),
                            attempts = %item.attempts,
                            "Queued operation failed: {}",
                            e
                        );
                        report.retained += 1;
                        kept.push_back(item);
                    }

                    if offline {
                        report.halted = true;
                        break;
                    }
                }
            }
        }

        // Retained items stay ahead of anything not reached this round
        kept.append(&mut self.items);
        self.items = kept;
        report
    }
}
