//! Queue mirror and synchroniser tests

use std::sync::Arc;

use clue_api::models::{NameList, QueueEntry, QueueStatus};
use clue_dashboard::state::draft::DraftStore;
use clue_dashboard::state::queue::QueueStore;
use clue_dashboard::sync::dashboard::DashboardSync;

use crate::fakes::FakeQueue;

fn entry(sut: &str) -> QueueEntry {
    QueueEntry {
        sut: sut.into(),
        variants: NameList::parse("base"),
        workloads: NameList::parse("shaped"),
        n_iterations: 1,
        deploy_only: false,
        status: None,
    }
}

fn status(suts: &[&str]) -> QueueStatus {
    QueueStatus {
        queue: suts.iter().map(|s| entry(s)).collect(),
        queue_size: suts.len(),
    }
}

fn sync(api: Arc<FakeQueue>) -> DashboardSync {
    DashboardSync::new(api, Arc::new(QueueStore::new()), Arc::new(DraftStore::new()))
}

#[tokio::test]
async fn test_cursor_in_bounds_after_removals() {
    let api = Arc::new(FakeQueue::default());
    api.set_status(status(&["a", "b", "c"]));
    let sync = sync(api.clone());
    sync.refresh().await;

    assert_eq!(sync.next(), 1);
    assert_eq!(sync.next(), 2);

    sync.remove_current().await.unwrap();
    let snap = sync.snapshot();
    assert_eq!(snap.entries.len(), 2);
    assert_eq!(snap.cursor, 1);
    assert_eq!(snap.current().map(|e| e.sut.as_str()), Some("b"));

    sync.remove(0).await.unwrap();
    sync.remove(0).await.unwrap();
    let snap = sync.snapshot();
    assert!(snap.entries.is_empty());
    assert_eq!(snap.cursor, 0);
    assert!(snap.current().is_none());

    assert!(sync.remove_current().await.is_err());
    assert_eq!(sync.prev(), 0);
    assert_eq!(sync.next(), 0);
}

#[tokio::test]
async fn test_failed_action_still_refreshes() {
    let api = Arc::new(FakeQueue::default());
    api.set_status(status(&["a"]));
    let sync = sync(api.clone());

    assert!(sync.remove(5).await.is_err());
    assert_eq!(sync.snapshot().entries.len(), 1);
}

#[tokio::test]
async fn test_flush_empties_mirror() {
    let api = Arc::new(FakeQueue::default());
    api.set_status(status(&["a", "b"]));
    let sync = sync(api.clone());
    sync.refresh().await;
    sync.next();

    sync.flush().await.unwrap();
    let snap = sync.snapshot();
    assert!(snap.entries.is_empty());
    assert_eq!(snap.size, 0);
    assert_eq!(snap.cursor, 0);
}

#[test]
fn test_late_response_does_not_win() {
    let store = QueueStore::new();
    let first = store.issue_token();
    let second = store.issue_token();

    assert!(store.apply(second, status(&["fresh"]), None));
    assert!(!store.apply(first, status(&["old", "older"]), None));

    let snap = store.snapshot();
    assert_eq!(snap.entries.len(), 1);
    assert_eq!(snap.entries[0].sut, "fresh");
}

#[test]
fn test_seek_clamps() {
    let store = QueueStore::new();
    store.apply(store.issue_token(), status(&["a", "b"]), None);
    assert_eq!(store.seek(9), 1);
    assert_eq!(store.seek(0), 0);
}

#[tokio::test]
async fn test_subscribers_notified_on_refresh() {
    let api = Arc::new(FakeQueue::default());
    api.set_status(status(&["a"]));
    let sync = sync(api.clone());
    let mut rx = sync.queue().subscribe();

    sync.refresh().await;
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().entries.len(), 1);
}
