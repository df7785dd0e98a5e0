//! HTTP layer - routing table, shared state and request handlers.
//!
//! Handlers authenticate the caller, apply the role check for their endpoint,
//! delegate to [`crate::core`] and serialize the result through [`payloads`].

/// Token authentication: extractor and `/auth` endpoints
pub mod auth;
/// Cart endpoints
pub mod cart;
/// Group membership endpoints
pub mod groups;
/// Menu endpoints
pub mod menu;
/// Order endpoints for customers, administrators and delivery crew
pub mod orders;
/// JSON request and response shapes
pub mod payloads;

use crate::{config::settings::ServerConfig, core::group::Role, errors::Result};
use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use sea_orm::DatabaseConnection;
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared data available to all handlers.
/// This structure holds the database connection and any other global state
/// that handlers need to access.
#[derive(Clone)]
pub struct AppState {
    /// Database connection for all database operations
    pub db: DatabaseConnection,
}

impl AppState {
    /// Creates a new `AppState` with the given database connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn group_routes(role: Role, base: &str) -> Router<AppState> {
    Router::new()
        .route(
            &format!("{base}/"),
            get(move |state, user| groups::list_members(state, user, role))
                .post(move |state, user, body| groups::add_member(state, user, body, role)),
        )
        .route(
            &format!("{base}/{{user_id}}/"),
            delete(move |state, user, path| groups::remove_member(state, user, path, role)),
        )
}

/// Builds the routing table.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/menu-items/", get(menu::list).post(menu::create))
        .route(
            "/api/menu-items/{id}/",
            get(menu::detail)
                .put(menu::update)
                .patch(menu::update)
                .delete(menu::remove),
        )
        .merge(group_routes(Role::Manager, "/api/groups/manager/users"))
        .merge(group_routes(
            Role::DeliveryCrew,
            "/api/groups/delivery-crew/users",
        ))
        .route(
            "/api/cart/menu-items/",
            get(cart::list).post(cart::add).delete(cart::clear),
        )
        .route("/api/orders/", get(orders::list_own).post(orders::place))
        .route(
            "/api/orders/{id}/",
            get(orders::detail_own)
                .put(orders::update_own)
                .patch(orders::update_own),
        )
        .route("/api/orders/all/", get(orders::list_all))
        .route(
            "/api/orders/all/{id}/",
            get(orders::detail_any)
                .put(orders::update_any)
                .patch(orders::update_any)
                .delete(orders::remove),
        )
        .route("/api/orders/delivery-crew/", get(orders::list_assigned))
        .route("/api/orders/{id}/status/", patch(orders::set_status))
        .route("/api/auth/users/", post(auth::register))
        .route("/api/auth/users/me/", get(auth::me))
        .route("/api/auth/token/login/", post(auth::login))
        .route("/api/auth/token/logout/", post(auth::logout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the listener and serves until Ctrl-C or SIGTERM.
pub async fn serve(server: &ServerConfig, state: AppState) -> Result<()> {
    let address = server.address();
    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
