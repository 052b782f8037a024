//! Server state

use std::sync::Arc;

use crate::state::draft::DraftStore;
use crate::sync::dashboard::DashboardSync;
use crate::workers::log_stream::LogStreamer;

/// Server state shared across handlers
pub struct ServerState {
    pub sync: Arc<DashboardSync>,
    pub draft: Arc<DraftStore>,
    pub streamer: Arc<LogStreamer>,
}

impl ServerState {
    pub fn new(
        sync: Arc<DashboardSync>,
        draft: Arc<DraftStore>,
        streamer: Arc<LogStreamer>,
    ) -> Self {
        Self {
            sync,
            draft,
            streamer,
        }
    }
}
