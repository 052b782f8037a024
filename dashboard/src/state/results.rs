//! Local list of experiment results

use std::cmp::Ordering;
use std::sync::RwLock;

use chrono::{DateTime, NaiveDateTime};
use clue_api::models::ResultEntry;

/// Timestamp format the deployer writes into result records
pub const RESULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SortKey {
    #[default]
    Timestamp,
    Sut,
    Status,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Active sort of the results list. Newest first by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortOrder {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    pub fn compare(&self, a: &ResultEntry, b: &ResultEntry) -> Ordering {
        let ord = match self.key {
            SortKey::Timestamp => TimeKey::of(&a.timestamp).cmp(&TimeKey::of(&b.timestamp)),
            SortKey::Sut => a.sut.cmp(&b.sut),
            SortKey::Status => a.status.rank().cmp(&b.status.rank()),
        }
        .then_with(|| a.uuid.cmp(&b.uuid));
        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// Sort key for a timestamp. Parsed times order before unparseable ones,
/// which fall back to plain string order among themselves.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum TimeKey {
    Parsed(NaiveDateTime),
    Raw(String),
}

impl TimeKey {
    fn of(raw: &str) -> Self {
        parse_timestamp(raw)
            .map(TimeKey::Parsed)
            .unwrap_or_else(|| TimeKey::Raw(raw.to_string()))
    }
}

/// Parse a result timestamp in the deployer format or RFC 3339
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, RESULT_TIMESTAMP_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()))
}

/// Sorted result list
#[derive(Debug, Default)]
pub struct ResultsStore {
    entries: RwLock<Vec<ResultEntry>>,
    order: RwLock<SortOrder>,
}

impl ResultsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order(&self) -> SortOrder {
        *self.order.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the list, keeping the active sort
    pub fn replace(&self, mut entries: Vec<ResultEntry>) {
        let order = self.order();
        entries.sort_by(|a, b| order.compare(a, b));
        *self.entries.write().unwrap_or_else(|e| e.into_inner()) = entries;
    }

    pub fn sort(&self, order: SortOrder) {
        *self.order.write().unwrap_or_else(|e| e.into_inner()) = order;
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .sort_by(|a, b| order.compare(a, b));
    }

    pub fn entries(&self) -> Vec<ResultEntry> {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn find(&self, id: &str) -> Option<ResultEntry> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|e| e.uuid == id)
            .cloned()
    }

    pub fn remove(&self, id: &str) -> Option<ResultEntry> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let pos = entries.iter().position(|e| e.uuid == id)?;
        Some(entries.remove(pos))
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
