//! Live deployment log streaming
//!
//! While a run is active the streamer seeds the buffer from `GET /api/logs`
//! and then follows the event stream. When the stream errors or ends it falls
//! back to polling until the run ends or shutdown is signalled.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use futures::StreamExt;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::errors::DashboardError;
use crate::http::logs::LogsApi;
use crate::http::sse::{LogEvent, SseDecoder};
use crate::state::log_buffer::LogBuffer;

/// Log streamer options
#[derive(Debug, Clone)]
pub struct Options {
    /// Polling interval while the stream is unavailable
    pub poll_interval: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
        }
    }
}

/// Connection state of the log view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamState {
    Disconnected,
    StreamConnected,
    PollingFallback,
}

enum StreamOutcome {
    /// Stop was signalled while streaming
    Stopped,
    /// The stream failed or ended
    Failed,
}

/// Index in `snapshot` where lines unknown to `local` begin
///
/// Looks for the latest point in the snapshot that the tail of the local
/// buffer lines up with. `None` when the two share nothing, which means the
/// backend log was cleared or rolled past everything held locally.
fn resume_point(local: &[String], snapshot: &[String]) -> Option<usize> {
    if local.is_empty() {
        return None;
    }
    (1..=snapshot.len()).rev().find(|&end| {
        let overlap = end.min(local.len());
        snapshot[end - overlap..end] == local[local.len() - overlap..]
    })
}

/// Skips the lines the stream replays on connect that were already seeded
struct ReplayFilter<'a> {
    seed: &'a [String],
    matched: usize,
    done: bool,
}

impl<'a> ReplayFilter<'a> {
    fn new(seed: &'a [String]) -> Self {
        Self {
            seed,
            matched: 0,
            done: seed.is_empty(),
        }
    }

    /// True when `line` is the next seeded line and should be dropped
    fn skip(&mut self, line: &str) -> bool {
        if self.done {
            return false;
        }
        if self.seed.get(self.matched).map(String::as_str) == Some(line) {
            self.matched += 1;
            self.done = self.matched == self.seed.len();
            true
        } else {
            self.done = true;
            false
        }
    }
}

pub struct LogStreamer {
    api: Arc<dyn LogsApi>,
    buffer: Arc<LogBuffer>,
    state: watch::Sender<StreamState>,
    last_error: RwLock<Option<String>>,
    options: Options,
}

impl LogStreamer {
    pub fn new(api: Arc<dyn LogsApi>, buffer: Arc<LogBuffer>, options: Options) -> Self {
        Self {
            api,
            buffer,
            state: watch::Sender::new(StreamState::Disconnected),
            last_error: RwLock::new(None),
            options,
        }
    }

    pub fn buffer(&self) -> &Arc<LogBuffer> {
        &self.buffer
    }

    pub fn state(&self) -> StreamState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<StreamState> {
        self.state.subscribe()
    }

    /// Last error event reported by the backend stream
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set_state(&self, state: StreamState) {
        self.state.send_if_modified(|current| {
            let changed = *current != state;
            if changed {
                debug!("Log stream state {:?} -> {:?}", current, state);
            }
            *current = state;
            changed
        });
    }

    /// `DELETE /api/logs`. The local buffer is only emptied if the backend cleared.
    pub async fn clear(&self) -> Result<(), DashboardError> {
        self.api.clear_logs().await?;
        self.buffer.clear();
        info!("Log buffer cleared");
        Ok(())
    }

    /// Replace the buffer with the backend's current log
    pub async fn seed(&self) -> Vec<String> {
        match self.api.fetch_logs().await {
            Ok(lines) => {
                self.buffer.replace(lines.iter().cloned());
                lines
            }
            Err(e) => {
                warn!("Failed to fetch logs: {}", e);
                Vec::new()
            }
        }
    }

    /// Follow the log of one run until `stop` resolves
    pub async fn follow<S, F, T>(&self, sleep_fn: &S, stop: T)
    where
        S: Fn(Duration) -> F,
        F: Future<Output = ()>,
        T: Future<Output = ()>,
    {
        tokio::pin!(stop);

        let seed = self.seed().await;
        if let StreamOutcome::Stopped = self.stream(&seed, &mut stop).await {
            self.set_state(StreamState::Disconnected);
            return;
        }

        info!("Log stream unavailable, polling every {:?}", self.options.poll_interval);
        self.set_state(StreamState::PollingFallback);

        loop {
            tokio::select! {
                _ = stop.as_mut() => break,
                _ = sleep_fn(self.options.poll_interval) => {}
            }
            self.poll_once().await;
        }

        self.set_state(StreamState::Disconnected);
        info!("Log follow stopped");
    }

    async fn poll_once(&self) {
        let lines = match self.api.fetch_logs().await {
            Ok(lines) => lines,
            Err(e) => {
                warn!("Log poll failed: {}", e);
                return;
            }
        };
        match resume_point(&self.buffer.lines(), &lines) {
            Some(start) => self.buffer.extend(lines.into_iter().skip(start)),
            None => {
                debug!("Server log no longer matches local tail, restarting");
                self.buffer.replace(lines);
            }
        }
    }

    async fn stream<T>(&self, seed: &[String], stop: &mut Pin<&mut T>) -> StreamOutcome
    where
        T: Future<Output = ()>,
    {
        let opened = tokio::select! {
            _ = stop.as_mut() => return StreamOutcome::Stopped,
            opened = self.api.open_log_stream() => opened,
        };
        let mut body = match opened {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to open log stream: {}", e);
                return StreamOutcome::Failed;
            }
        };

        info!("Log stream connected");
        self.set_state(StreamState::StreamConnected);

        let mut decoder = SseDecoder::new();
        let mut replay = ReplayFilter::new(seed);

        loop {
            let chunk = tokio::select! {
                _ = stop.as_mut() => return StreamOutcome::Stopped,
                chunk = body.next() => chunk,
            };
            match chunk {
                Some(Ok(bytes)) => {
                    for data in decoder.push(&bytes) {
                        self.handle_event(&data, &mut replay);
                    }
                }
                Some(Err(e)) => {
                    warn!("Log stream error: {}", e);
                    break;
                }
                None => {
                    if let Some(data) = decoder.finish() {
                        self.handle_event(&data, &mut replay);
                    }
                    info!("Log stream ended");
                    break;
                }
            }
        }

        StreamOutcome::Failed
    }

    fn handle_event(&self, data: &str, replay: &mut ReplayFilter<'_>) {
        match LogEvent::parse(data) {
            LogEvent::Line(line) => {
                if !replay.skip(&line) {
                    self.buffer.push(line);
                }
            }
            LogEvent::Error(err) => {
                warn!("Backend log stream reported: {}", err);
                *self.last_error.write().unwrap_or_else(|e| e.into_inner()) = Some(err);
            }
        }
    }

    /// Attach to the log whenever `deploying` is true, until shutdown
    pub async fn supervise<S, F>(
        &self,
        mut deploying: watch::Receiver<bool>,
        sleep_fn: S,
        mut shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
    ) where
        S: Fn(Duration) -> F,
        F: Future<Output = ()>,
    {
        info!("Log streamer starting...");
        loop {
            while !*deploying.borrow_and_update() {
                tokio::select! {
                    _ = &mut shutdown_signal => {
                        info!("Log streamer shutting down...");
                        return;
                    }
                    changed = deploying.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                }
            }

            info!("Run active, following deployment log");
            let mut run_rx = deploying.clone();
            let mut shutting_down = false;
            self.follow(&sleep_fn, async {
                tokio::select! {
                    _ = async {
                        let _ = run_rx.wait_for(|d| !*d).await;
                    } => {}
                    _ = &mut shutdown_signal => shutting_down = true,
                }
            })
            .await;

            if shutting_down {
                info!("Log streamer shutting down...");
                return;
            }
        }
    }
}
