//! Application state management

use std::sync::Arc;

use tracing::info;

use crate::app::options::AppOptions;
use crate::errors::DashboardError;
use crate::form::submit::ExperimentForm;
use crate::http::client::HttpClient;
use crate::results::browser::ResultsBrowser;
use crate::state::catalog::SutCatalog;
use crate::state::draft::DraftStore;
use crate::state::log_buffer::LogBuffer;
use crate::state::queue::QueueStore;
use crate::sync::dashboard::DashboardSync;
use crate::workers::log_stream::LogStreamer;

/// Main application state
pub struct AppState {
    /// HTTP client for backend communication
    pub http_client: Arc<HttpClient>,

    /// Draft being edited and the deploying flag
    pub draft: Arc<DraftStore>,

    /// Queue mirror
    pub queue: Arc<QueueStore>,

    /// SUT catalog
    pub catalog: Arc<SutCatalog>,

    /// Local log lines
    pub log_buffer: Arc<LogBuffer>,

    pub sync: Arc<DashboardSync>,
    pub form: Arc<ExperimentForm>,
    pub streamer: Arc<LogStreamer>,
    pub results: Arc<ResultsBrowser>,
}

impl AppState {
    /// Initialize application state
    pub fn init(options: &AppOptions) -> Result<Self, DashboardError> {
        info!("Initializing application state for {}...", options.backend.base_url);
        let http_client = Arc::new(HttpClient::new(
            &options.backend.base_url,
            options.backend.request_timeout,
        )?);
        Ok(Self::with_client(options, http_client))
    }

    /// Wire every component to one client
    pub fn with_client(options: &AppOptions, http_client: Arc<HttpClient>) -> Self {
        let draft = Arc::new(DraftStore::new());
        let queue = Arc::new(QueueStore::new());
        let catalog = Arc::new(SutCatalog::new(http_client.clone()));
        let log_buffer = Arc::new(LogBuffer::new(options.log_buffer_capacity));

        let sync = Arc::new(DashboardSync::new(
            http_client.clone(),
            queue.clone(),
            draft.clone(),
        ));
        let form = Arc::new(ExperimentForm::new(
            draft.clone(),
            http_client.clone(),
            sync.clone(),
            options.submit_target,
        ));
        let streamer = Arc::new(LogStreamer::new(
            http_client.clone(),
            log_buffer.clone(),
            options.log_stream.clone(),
        ));
        let results = Arc::new(ResultsBrowser::new(http_client.clone(), form.clone()));

        Self {
            http_client,
            draft,
            queue,
            catalog,
            log_buffer,
            sync,
            form,
            streamer,
            results,
        }
    }
}
