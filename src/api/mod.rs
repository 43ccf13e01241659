//! HTTP surface for the paginated listings
pub mod error;
pub mod handlers;

use crate::database::{Database, repository::BookingRepository};
use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::sync::oneshot;
use tracing::info;

pub use error::{ApiError, ErrorBody};

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn BookingRepository>,
    /// Checked by `/health` when present
    pub database: Option<Arc<Database>>,
    pub stopping: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(repository: Arc<dyn BookingRepository>) -> Self {
        Self { repository, database: None, stopping: Arc::new(AtomicBool::new(false)) }
    }

    pub fn with_database(mut self, database: Arc<Database>) -> Self {
        self.database = Some(database);
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/bookings", get(handlers::list_bookings))
        .route("/customers", get(handlers::list_customers))
        .route("/customers/:id", get(handlers::get_customer))
        .with_state(state)
}

pub struct ApiServer {
    addr: SocketAddr,
    shutdown_tx: parking_lot::Mutex<Option<oneshot::Sender<()>>>,
}

impl ApiServer {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr, shutdown_tx: parking_lot::Mutex::new(None) }
    }

    /// Serve until [`ApiServer::shutdown`] is called
    pub async fn run(&self, state: AppState) -> std::io::Result<()> {
        let stopping = state.stopping.clone();
        let app = router(state);

        let (tx, rx) = oneshot::channel();
        *self.shutdown_tx.lock() = Some(tx);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        info!("API listening on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
                stopping.store(true, Ordering::SeqCst);
                info!("API server received shutdown signal");
            })
            .await
    }

    pub fn shutdown(&self) {
        if let Some(tx) = self.shutdown_tx.lock().take() {
            let _ = tx.send(());
        }
    }
}
