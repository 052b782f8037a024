//! Results store and browser tests

use std::sync::Arc;

use clue_api::models::{NameList, ResultEntry, ResultStatus};
use clue_dashboard::form::submit::{ExperimentForm, Navigation, SubmitTarget};
use clue_dashboard::results::browser::ResultsBrowser;
use clue_dashboard::state::draft::DraftStore;
use clue_dashboard::state::queue::QueueStore;
use clue_dashboard::state::results::{SortDirection, SortKey, SortOrder};
use clue_dashboard::sync::dashboard::DashboardSync;

use crate::fakes::{FakeQueue, FakeResults};

fn result(id: &str, sut: &str, timestamp: &str, status: ResultStatus) -> ResultEntry {
    ResultEntry {
        uuid: id.into(),
        sut: sut.into(),
        variants: NameList::parse("base,scaled"),
        workloads: NameList::parse("shaped"),
        timestamp: timestamp.into(),
        n_iterations: 2,
        deploy_only: false,
        status,
    }
}

fn entries() -> Vec<ResultEntry> {
    vec![
        result("r1", "shop", "2024-03-01_10-00-00", ResultStatus::Completed),
        result("r2", "bank", "2024-03-02_09-30-00", ResultStatus::Failed),
        result("r3", "shop", "2024-02-28_23-59-59", ResultStatus::Started),
    ]
}

fn browser(api: FakeResults) -> (ResultsBrowser, Arc<FakeQueue>) {
    let queue = Arc::new(FakeQueue::default());
    let draft = Arc::new(DraftStore::new());
    let sync = Arc::new(DashboardSync::new(
        queue.clone(),
        Arc::new(QueueStore::new()),
        draft.clone(),
    ));
    let form = Arc::new(ExperimentForm::new(draft, queue.clone(), sync, SubmitTarget::Deploy));
    (ResultsBrowser::new(Arc::new(api), form), queue)
}

fn ids(entries: &[ResultEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.uuid.as_str()).collect()
}

#[tokio::test]
async fn test_loaded_newest_first() {
    let (browser, _) = browser(FakeResults {
        entries: entries(),
        ..Default::default()
    });
    let loaded = browser.load().await;
    assert_eq!(ids(&loaded), vec!["r2", "r1", "r3"]);

    let by_sut = browser.sort(SortOrder::new(SortKey::Sut, SortDirection::Asc));
    assert_eq!(by_sut[0].sut, "bank");
}

#[tokio::test]
async fn test_delete_removes_row() {
    let (browser, _) = browser(FakeResults {
        entries: entries(),
        ..Default::default()
    });
    browser.load().await;

    browser.delete("r1").await.unwrap();
    assert_eq!(ids(&browser.entries()), vec!["r2", "r3"]);
}

#[tokio::test]
async fn test_failed_delete_leaves_list_unchanged() {
    let (browser, _) = browser(FakeResults {
        entries: entries(),
        fail_delete: true,
        ..Default::default()
    });
    let before = browser.load().await;

    assert!(browser.delete("r1").await.is_err());
    assert_eq!(browser.entries(), before);
}

#[tokio::test]
async fn test_repeat_resubmits_configuration() {
    let (browser, queue) = browser(FakeResults {
        entries: entries(),
        ..Default::default()
    });
    browser.load().await;

    assert_eq!(browser.repeat("r2").await.unwrap(), Navigation::Dashboard);
    let deployed = queue.deployed.lock().unwrap().clone();
    assert_eq!(deployed.len(), 1);
    assert_eq!(deployed[0].sut, "bank");
    assert_eq!(deployed[0].variants.joined(), "base,scaled");
    assert_eq!(deployed[0].n_iterations, 2);
}

#[tokio::test]
async fn test_panel_degrades_to_empty() {
    let (browser, _) = browser(FakeResults::default());
    let panel = browser
        .panel(
            "r1",
            &clue_dashboard::http::results::PanelKey {
                workload: "shaped".into(),
                variant: "base".into(),
                iteration: 1,
            },
        )
        .await;
    assert!(panel.metrics.is_empty());
    assert!(panel.plots.is_empty());
}

#[tokio::test]
async fn test_download_saves_archive() {
    let dir = tempfile::tempdir().unwrap();
    let (browser, _) = browser(FakeResults {
        archive: vec![b"PK".to_vec(), b"rest".to_vec()],
        ..Default::default()
    });
    let path = browser.download("r1", dir.path()).await.unwrap();
    assert_eq!(std::fs::read(path).unwrap(), b"PKrest");
}

#[tokio::test]
async fn test_broken_download_leaves_no_partial_archive() {
    let dir = tempfile::tempdir().unwrap();
    let (browser, _) = browser(FakeResults {
        archive: vec![b"PK".to_vec()],
        archive_breaks: true,
        ..Default::default()
    });
    assert!(browser.download("r1", dir.path()).await.is_err());
    assert!(!dir.path().join("results-r1.zip").exists());
}
