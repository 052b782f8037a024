//! Bounded buffer of deployment log lines

use std::collections::VecDeque;
use std::sync::RwLock;

use tokio::sync::broadcast;

pub const DEFAULT_CAPACITY: usize = 200;

/// Insertion-ordered log lines. When full, the oldest lines are dropped.
#[derive(Debug)]
pub struct LogBuffer {
    lines: RwLock<VecDeque<String>>,
    capacity: usize,
    appended: broadcast::Sender<String>,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (appended, _) = broadcast::channel(capacity);
        Self {
            lines: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
            appended,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&self, line: impl Into<String>) {
        let line = line.into();
        {
            let mut lines = self.lines.write().unwrap_or_else(|e| e.into_inner());
            if lines.len() == self.capacity {
                lines.pop_front();
            }
            lines.push_back(line.clone());
        }
        // no receivers is fine
        let _ = self.appended.send(line);
    }

    pub fn extend<I>(&self, lines: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        for line in lines {
            self.push(line);
        }
    }

    /// Drop everything and start over from `lines`
    pub fn replace<I>(&self, lines: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.clear();
        self.extend(lines);
    }

    pub fn clear(&self) {
        self.lines.write().unwrap_or_else(|e| e.into_inner()).clear();
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lines.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Receive every line appended from now on
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.appended.subscribe()
    }
}
