//! Watch mode run loop

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::app::options::{AppOptions, LifecycleOptions};
use crate::app::state::AppState;
use crate::errors::DashboardError;
use crate::server::serve::serve;
use crate::server::state::ServerState;
use crate::workers::poller;

/// Run the dashboard in watch mode until `shutdown_signal` resolves
pub async fn run(
    app_state: Arc<AppState>,
    options: AppOptions,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), DashboardError> {
    info!("Starting CLUE dashboard watch...");

    let (shutdown_tx, _shutdown_rx): (broadcast::Sender<()>, _) = broadcast::channel(1);
    let mut shutdown_manager = ShutdownManager::new(shutdown_tx.clone(), options.lifecycle.clone());

    if let Err(e) = init(&app_state, &options, &shutdown_tx, &mut shutdown_manager).await {
        error!("Failed to start watch: {}", e);
        shutdown_manager.shutdown().await?;
        return Err(e);
    }

    shutdown_signal.await;
    info!("Shutdown signal received, shutting down...");

    drop(shutdown_tx);
    shutdown_manager.shutdown().await
}

// =============================== INITIALIZATION ================================== //

async fn init(
    app_state: &Arc<AppState>,
    options: &AppOptions,
    shutdown_tx: &broadcast::Sender<()>,
    shutdown_manager: &mut ShutdownManager,
) -> Result<(), DashboardError> {
    app_state.catalog.load().await;

    if options.enable_poller {
        init_poller_worker(
            options.poller.clone(),
            app_state.clone(),
            shutdown_manager,
            shutdown_tx.subscribe(),
        )?;
    } else {
        app_state.sync.refresh().await;
    }

    init_log_stream_worker(app_state.clone(), shutdown_manager, shutdown_tx.subscribe())?;

    if options.enable_status_server {
        init_status_server(
            options,
            app_state.clone(),
            shutdown_manager,
            shutdown_tx.subscribe(),
        )
        .await?;
    }

    Ok(())
}

fn init_poller_worker(
    options: poller::Options,
    app_state: Arc<AppState>,
    shutdown_manager: &mut ShutdownManager,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DashboardError> {
    info!("Initializing queue poller...");

    let sync = app_state.sync.clone();
    let poller_handle = tokio::spawn(async move {
        poller::run(
            &options,
            sync.as_ref(),
            tokio::time::sleep,
            Box::pin(async move {
                let _ = shutdown_rx.recv().await;
            }),
        )
        .await;
    });

    shutdown_manager.with_poller_worker_handle(poller_handle)
}

fn init_log_stream_worker(
    app_state: Arc<AppState>,
    shutdown_manager: &mut ShutdownManager,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DashboardError> {
    info!("Initializing log streamer...");

    let streamer = app_state.streamer.clone();
    let deploying = app_state.draft.subscribe_deploying();
    let log_stream_handle = tokio::spawn(async move {
        streamer
            .supervise(
                deploying,
                tokio::time::sleep,
                Box::pin(async move {
                    let _ = shutdown_rx.recv().await;
                }),
            )
            .await;
    });

    shutdown_manager.with_log_stream_worker_handle(log_stream_handle)
}

async fn init_status_server(
    options: &AppOptions,
    app_state: Arc<AppState>,
    shutdown_manager: &mut ShutdownManager,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DashboardError> {
    info!("Initializing local status server...");

    let server_state = ServerState::new(
        app_state.sync.clone(),
        app_state.draft.clone(),
        app_state.streamer.clone(),
    );

    let server_handle = serve(&options.server, Arc::new(server_state), async move {
        let _ = shutdown_rx.recv().await;
    })
    .await?;

    shutdown_manager.with_status_server_handle(server_handle)
}

// ================================= SHUTDOWN ===================================== //

struct ShutdownManager {
    shutdown_tx: broadcast::Sender<()>,
    lifecycle_options: LifecycleOptions,
    status_server_handle: Option<JoinHandle<Result<(), DashboardError>>>,
    poller_worker_handle: Option<JoinHandle<()>>,
    log_stream_worker_handle: Option<JoinHandle<()>>,
}

impl ShutdownManager {
    pub fn new(shutdown_tx: broadcast::Sender<()>, lifecycle_options: LifecycleOptions) -> Self {
        Self {
            shutdown_tx,
            lifecycle_options,
            status_server_handle: None,
            poller_worker_handle: None,
            log_stream_worker_handle: None,
        }
    }

    pub fn with_poller_worker_handle(&mut self, handle: JoinHandle<()>) -> Result<(), DashboardError> {
        if self.poller_worker_handle.is_some() {
            return Err(DashboardError::Shutdown("poller_handle already set".to_string()));
        }
        self.poller_worker_handle = Some(handle);
        Ok(())
    }

    pub fn with_log_stream_worker_handle(
        &mut self,
        handle: JoinHandle<()>,
    ) -> Result<(), DashboardError> {
        if self.log_stream_worker_handle.is_some() {
            return Err(DashboardError::Shutdown("log_stream_handle already set".to_string()));
        }
        self.log_stream_worker_handle = Some(handle);
        Ok(())
    }

    pub fn with_status_server_handle(
        &mut self,
        handle: JoinHandle<Result<(), DashboardError>>,
    ) -> Result<(), DashboardError> {
        if self.status_server_handle.is_some() {
            return Err(DashboardError::Shutdown("server_handle already set".to_string()));
        }
        self.status_server_handle = Some(handle);
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), DashboardError> {
        let _ = self.shutdown_tx.send(());

        let delay = self.lifecycle_options.max_shutdown_delay;
        match tokio::time::timeout(delay, self.shutdown_impl()).await {
            Ok(result) => result,
            Err(_) => {
                error!("Shutdown timed out after {:?}, aborting workers...", delay);
                self.abort_all();
                Err(DashboardError::Shutdown(format!("timed out after {:?}", delay)))
            }
        }
    }

    fn abort_all(&mut self) {
        for handle in [
            self.poller_worker_handle.take(),
            self.log_stream_worker_handle.take(),
        ]
        .into_iter()
        .flatten()
        {
            handle.abort();
        }
        if let Some(handle) = self.status_server_handle.take() {
            handle.abort();
        }
    }

    async fn shutdown_impl(&mut self) -> Result<(), DashboardError> {
        info!("Shutting down CLUE dashboard...");

        // 1. Poller worker
        if let Some(handle) = self.poller_worker_handle.take() {
            handle.await.map_err(|e| DashboardError::Shutdown(e.to_string()))?;
        }

        // 2. Log streamer
        if let Some(handle) = self.log_stream_worker_handle.take() {
            handle.await.map_err(|e| DashboardError::Shutdown(e.to_string()))?;
        }

        // 3. Status server
        if let Some(handle) = self.status_server_handle.take() {
            handle.await.map_err(|e| DashboardError::Shutdown(e.to_string()))??;
        }

        info!("Shutdown complete");
        Ok(())
    }
}
