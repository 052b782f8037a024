//! Client, synchroniser and worker tests against an in-process backend

use std::sync::Arc;
use std::time::Duration;

use clue_dashboard::app::options::AppOptions;
use clue_dashboard::app::state::AppState;
use clue_dashboard::http::client::HttpClient;
use clue_dashboard::workers::log_stream;

mod mock;
mod test_client;
mod test_results;
mod test_server;

use mock::MockBackend;

pub fn options() -> AppOptions {
    AppOptions {
        log_stream: log_stream::Options {
            poll_interval: Duration::from_millis(20),
        },
        ..Default::default()
    }
}

pub fn client(backend: &MockBackend) -> Arc<HttpClient> {
    Arc::new(HttpClient::new(&backend.base_url, Duration::from_secs(5)).unwrap())
}

pub fn app(backend: &MockBackend) -> Arc<AppState> {
    Arc::new(AppState::with_client(&options(), client(backend)))
}
