//! Application Startup
//!
//! Server lifecycle: open the store, bring up the administrative and client
//! listeners, signal readiness, and on request tear everything down in
//! order with a bounded drain time per listener.
//!
//! ```text
//! Stopped -> Starting -> Running -> Stopping -> Stopped
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use crate::application::services::{
    AuthService, AuthServiceImpl, DocumentService, RoomService, SecretProvisioner,
};
use crate::config::Settings;
use crate::infrastructure::database::Store;
use crate::infrastructure::repositories::{
    SqliteDocumentRepository, SqliteRoomRepository, SqliteSecretRepository,
};
use crate::presentation::http::routes;
use crate::presentation::websocket::ChatHub;
use crate::shared::fatal::FatalSignal;

/// Lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// Store or listener failure while starting or stopping. Never recoverable:
/// the process must not keep serving after one.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("failed to open store in {path}: {source}")]
    StoreOpen {
        path: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to bind {listener} listener on {addr}: {source}")]
    Bind {
        listener: &'static str,
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("{listener} listener failed: {message}")]
    Listener { listener: &'static str, message: String },

    #[error("{listener} listener did not drain within {timeout:?}")]
    ShutdownTimeout { listener: &'static str, timeout: Duration },

    #[error("failed to close store: {0}")]
    StoreClose(#[source] sqlx::Error),

    #[error("lifecycle task ended unexpectedly")]
    Aborted,

    #[error("shutdown failed: {}", join_errors(.0))]
    Shutdown(Vec<LifecycleError>),
}

fn join_errors(errors: &[LifecycleError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: Store,
    pub rooms: Arc<RoomService>,
    pub documents: Arc<DocumentService>,
    pub auth: Arc<dyn AuthService>,
    pub provisioner: Arc<SecretProvisioner>,
    pub hub: Arc<ChatHub>,
    pub fatal: FatalSignal,
    pub lifecycle: watch::Receiver<LifecycleState>,
    pub started_at: Instant,
}

impl AppState {
    /// Wire repositories and services over an opened store.
    pub fn new(
        settings: Settings,
        store: Store,
        fatal: FatalSignal,
        lifecycle: watch::Receiver<LifecycleState>,
    ) -> Self {
        let pool = store.pool().clone();
        let documents = Arc::new(SqliteDocumentRepository::new(pool.clone()));
        let rooms = Arc::new(SqliteRoomRepository::new(pool.clone()));
        let secrets = Arc::new(SqliteSecretRepository::new(pool));

        let provisioner = Arc::new(SecretProvisioner::new(secrets));
        let auth = Arc::new(AuthServiceImpl::new(
            provisioner.clone(),
            fatal.clone(),
            settings.token_expiry_days,
        ));

        Self {
            settings: Arc::new(settings),
            store,
            rooms: Arc::new(RoomService::new(rooms, documents.clone())),
            documents: Arc::new(DocumentService::new(documents)),
            auth,
            provisioner,
            hub: Arc::new(ChatHub::new()),
            fatal,
            lifecycle,
            started_at: Instant::now(),
        }
    }
}

/// A running axum listener and the means to stop it.
struct Listener {
    name: &'static str,
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

impl Listener {
    /// Bind and start serving. Connections are accepted once this returns.
    async fn bind(name: &'static str, addr: SocketAddr, router: Router) -> Result<Self, LifecycleError> {
        let bind_err = |source| LifecycleError::Bind { listener: name, addr, source };

        let listener = TcpListener::bind(addr).await.map_err(bind_err)?;
        let addr = listener.local_addr().map_err(bind_err)?;

        let (shutdown, signal) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = signal.await;
                })
                .await
        });

        tracing::info!(listener = name, addr = %addr, "Listener accepting connections");
        Ok(Self { name, addr, shutdown, task })
    }

    /// Stop accepting, let in-flight requests finish for up to `timeout`,
    /// then abort whatever is left.
    async fn shutdown(self, timeout: Duration) -> Result<(), LifecycleError> {
        let Self { name, addr, shutdown, mut task } = self;
        let _ = shutdown.send(());

        let result = match tokio::time::timeout(timeout, &mut task).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(e))) => Err(LifecycleError::Listener { listener: name, message: e.to_string() }),
            Ok(Err(join)) => Err(LifecycleError::Listener { listener: name, message: join.to_string() }),
            Err(_) => {
                task.abort();
                Err(LifecycleError::ShutdownTimeout { listener: name, timeout })
            }
        };

        match &result {
            Ok(()) => tracing::info!(listener = name, addr = %addr, "Listener stopped"),
            Err(e) => tracing::error!(listener = name, addr = %addr, error = %e, "Listener stop failed"),
        }
        result
    }
}

/// Everything owned by a running server.
struct Running {
    store: Store,
    hub: Arc<ChatHub>,
    drain_timeout: Duration,
    admin: Listener,
    client: Listener,
}

impl Running {
    /// Ordered startup: store, admin listener, client listener. Whatever
    /// was already up is torn down again if a later step fails.
    async fn start(
        settings: Settings,
        fatal: FatalSignal,
        lifecycle: watch::Receiver<LifecycleState>,
    ) -> Result<Self, LifecycleError> {
        let store = Store::open(&settings.data_dir).await.map_err(|source| LifecycleError::StoreOpen {
            path: settings.data_dir.display().to_string(),
            source,
        })?;

        let admin_addr = settings.admin_addr();
        let client_addr = settings.client_addr();
        let drain_timeout = settings.shutdown_timeout();
        let state = AppState::new(settings, store.clone(), fatal, lifecycle);
        let hub = state.hub.clone();

        let admin = match Listener::bind("admin", admin_addr, routes::create_admin_router(state.clone())).await {
            Ok(admin) => admin,
            Err(e) => {
                close_store(&store).await;
                return Err(e);
            }
        };

        let client = match Listener::bind("client", client_addr, routes::create_router(state)).await {
            Ok(client) => client,
            Err(e) => {
                let _ = admin.shutdown(drain_timeout).await;
                close_store(&store).await;
                return Err(e);
            }
        };

        Ok(Self { store, hub, drain_timeout, admin, client })
    }

    /// Ordered teardown: client listener, admin listener, store. Every step
    /// runs even when an earlier one failed.
    async fn shutdown(self) -> Result<(), LifecycleError> {
        let mut errors = Vec::new();

        // Open chat streams would otherwise hold the client listener open
        self.hub.close();

        if let Err(e) = self.client.shutdown(self.drain_timeout).await {
            errors.push(e);
        }
        if let Err(e) = self.admin.shutdown(self.drain_timeout).await {
            errors.push(e);
        }
        if let Err(e) = self.store.close().await {
            errors.push(LifecycleError::StoreClose(e));
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(LifecycleError::Shutdown(errors)),
        }
    }
}

async fn close_store(store: &Store) {
    if let Err(e) = store.close().await {
        tracing::error!(error = %e, "Failed to close store after aborted start");
    }
}

struct Ready {
    client_addr: SocketAddr,
    admin_addr: SocketAddr,
}

/// Server entry point
pub struct Server;

impl Server {
    /// Start a server and wait until it is ready.
    ///
    /// Returns once the store is open and both listeners accept
    /// connections, or with the error that prevented it.
    pub async fn start(settings: Settings) -> Result<ServerHandle, LifecycleError> {
        let (state_tx, state_rx) = watch::channel(LifecycleState::Stopped);
        let (started_tx, started_rx) = oneshot::channel();
        let (stop_tx, stop_rx) = oneshot::channel();
        let (stopped_tx, stopped_rx) = oneshot::channel();
        let fatal = FatalSignal::new();

        let task = tokio::spawn(lifecycle(
            settings,
            state_tx,
            fatal.clone(),
            started_tx,
            stop_rx,
            stopped_tx,
        ));

        match started_rx.await {
            Ok(Ok(ready)) => Ok(ServerHandle {
                client_addr: ready.client_addr,
                admin_addr: ready.admin_addr,
                state: state_rx,
                fatal,
                stop: Some(stop_tx),
                stopped: Some(stopped_rx),
                task,
            }),
            Ok(Err(e)) => {
                let _ = task.await;
                Err(e)
            }
            Err(_) => Err(LifecycleError::Aborted),
        }
    }
}

/// The lifecycle task. Each one-shot fires exactly once.
async fn lifecycle(
    settings: Settings,
    state: watch::Sender<LifecycleState>,
    fatal: FatalSignal,
    started: oneshot::Sender<Result<Ready, LifecycleError>>,
    stop: oneshot::Receiver<()>,
    stopped: oneshot::Sender<Result<(), LifecycleError>>,
) {
    state.send_replace(LifecycleState::Starting);
    tracing::info!("Server starting");

    let running = match Running::start(settings, fatal, state.subscribe()).await {
        Ok(running) => running,
        Err(e) => {
            tracing::error!(error = %e, "Server failed to start");
            state.send_replace(LifecycleState::Stopped);
            let _ = started.send(Err(e));
            return;
        }
    };

    state.send_replace(LifecycleState::Running);
    let ready = Ready { client_addr: running.client.addr, admin_addr: running.admin.addr };
    tracing::info!(client = %ready.client_addr, admin = %ready.admin_addr, "Server ready");

    // A dropped caller counts as a stop request
    if started.send(Ok(ready)).is_ok() {
        let _ = stop.await;
    }

    state.send_replace(LifecycleState::Stopping);
    tracing::info!("Server stopping");

    let result = running.shutdown().await;
    state.send_replace(LifecycleState::Stopped);
    match &result {
        Ok(()) => tracing::info!("Server stopped"),
        Err(e) => tracing::error!(error = %e, "Server stopped with errors"),
    }
    let _ = stopped.send(result);
}

/// Handle on a running server
pub struct ServerHandle {
    client_addr: SocketAddr,
    admin_addr: SocketAddr,
    state: watch::Receiver<LifecycleState>,
    fatal: FatalSignal,
    stop: Option<oneshot::Sender<()>>,
    stopped: Option<oneshot::Receiver<Result<(), LifecycleError>>>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Bound address of the client listener
    pub fn client_addr(&self) -> SocketAddr {
        self.client_addr
    }

    /// Bound address of the administrative listener
    pub fn admin_addr(&self) -> SocketAddr {
        self.admin_addr
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Watch lifecycle transitions
    pub fn subscribe_state(&self) -> watch::Receiver<LifecycleState> {
        self.state.clone()
    }

    /// Resolves with the reason once a component reports an unrecoverable
    /// error. The server keeps running until [`ServerHandle::stop`].
    pub async fn fatal(&self) -> String {
        self.fatal.raised().await
    }

    /// Request shutdown and wait until the listeners and the store are
    /// closed.
    pub async fn stop(mut self) -> Result<(), LifecycleError> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        let result = match self.stopped.take() {
            Some(stopped) => stopped.await.unwrap_or(Err(LifecycleError::Aborted)),
            None => Ok(()),
        };
        let _ = (&mut self.task).await;
        result
    }
}
