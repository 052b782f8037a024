//! Mirror of the backend deployment queue and the active run

use std::sync::atomic::{AtomicU64, Ordering};

use clue_api::models::{ActiveRun, QueueEntry, QueueStatus};
use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

/// Point-in-time view of the queue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueueSnapshot {
    pub entries: Vec<QueueEntry>,
    pub size: usize,
    /// Index of the entry shown in the paged view
    pub cursor: usize,
    pub active_run: Option<ActiveRun>,
    /// Token of the refresh this snapshot came from
    pub token: u64,
}

impl QueueSnapshot {
    /// Entry under the cursor
    pub fn current(&self) -> Option<&QueueEntry> {
        self.entries.get(self.cursor)
    }

    fn clamp_cursor(&mut self) {
        self.cursor = clamp(self.cursor, self.entries.len());
    }
}

fn clamp(cursor: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        cursor.min(len - 1)
    }
}

/// Observable queue mirror.
///
/// Every refresh takes a token from [`QueueStore::issue_token`] before it
/// starts. A response is only applied when its token is newer than the one
/// already applied, so a slow response can never overwrite a fresher one.
#[derive(Debug)]
pub struct QueueStore {
    tx: watch::Sender<QueueSnapshot>,
    next_token: AtomicU64,
}

impl Default for QueueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueStore {
    pub fn new() -> Self {
        Self {
            tx: watch::Sender::new(QueueSnapshot::default()),
            next_token: AtomicU64::new(1),
        }
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueueSnapshot> {
        self.tx.subscribe()
    }

    pub fn active_run(&self) -> Option<ActiveRun> {
        self.tx.borrow().active_run.clone()
    }

    pub fn issue_token(&self) -> u64 {
        self.next_token.fetch_add(1, Ordering::SeqCst)
    }

    /// Apply a refresh result. Returns false when it was stale and dropped.
    pub fn apply(&self, token: u64, status: QueueStatus, active_run: Option<ActiveRun>) -> bool {
        let mut applied = false;
        self.tx.send_if_modified(|snap| {
            if token <= snap.token {
                debug!("Dropping stale queue refresh {} (applied {})", token, snap.token);
                return false;
            }
            snap.size = status.queue_size.max(status.queue.len());
            snap.entries = status.queue;
            snap.active_run = active_run;
            snap.token = token;
            snap.clamp_cursor();
            applied = true;
            true
        });
        applied
    }

    /// Move the cursor forward, stopping at the last entry
    pub fn next(&self) -> usize {
        self.move_cursor(|c| c.saturating_add(1))
    }

    /// Move the cursor back, stopping at the first entry
    pub fn prev(&self) -> usize {
        self.move_cursor(|c| c.saturating_sub(1))
    }

    /// Put the cursor on `index`, clamped to the queue
    pub fn seek(&self, index: usize) -> usize {
        self.move_cursor(|_| index)
    }

    fn move_cursor(&self, f: impl FnOnce(usize) -> usize) -> usize {
        let mut cursor = 0;
        self.tx.send_if_modified(|snap| {
            let moved = clamp(f(snap.cursor), snap.entries.len());
            let changed = moved != snap.cursor;
            snap.cursor = moved;
            cursor = moved;
            changed
        });
        cursor
    }
}
