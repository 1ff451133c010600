//! Club Hours Backend Server
//!
//! Provides:
//! - REST API for the roster, sessions, promotions and adjustments
//! - JSON aggregate for the TV display
//! - WebSocket feed that pushes full snapshots after every write
//! - PostgreSQL storage

mod config;
mod db;
mod realtime;
mod routes;
mod ws_handler;

use axum::{
    routing::{get, post, delete},
    Router,
};
use chrono::FixedOffset;
use clubhours_core::ServerMessage;
use deadpool_postgres::{Pool, Runtime};
use tokio::sync::{broadcast, Notify};
use tokio_postgres::NoTls;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use std::sync::Arc;

use crate::config::ServerConfig;

pub struct AppState {
    pub db_pool: Pool,
    pub club_offset: FixedOffset,
    /// Realtime feed; every message is a complete snapshot
    pub events: broadcast::Sender<ServerMessage>,
    /// Marked after every write; drained by [`realtime::publish_changes`]
    pub changes: Arc<Notify>,
}

impl AppState {
    pub fn new(db_pool: Pool, club_offset: FixedOffset, realtime_buffer: usize) -> Self {
        let (events, _) = broadcast::channel(realtime_buffer);
        Self {
            db_pool,
            club_offset,
            events,
            changes: Arc::new(Notify::new()),
        }
    }

    /// Tell realtime subscribers the club state changed
    pub fn notify_change(&self) {
        self.changes.notify_one();
    }

    /// Start the task that publishes snapshots after writes
    pub fn spawn_publisher(&self) -> tokio::task::JoinHandle<()> {
        let pool = self.db_pool.clone();
        let offset = self.club_offset;
        tokio::spawn(realtime::publish_changes(
            Arc::clone(&self.changes),
            self.events.clone(),
            move || {
                let pool = pool.clone();
                async move { db::load_snapshot(&pool, offset).await }
            },
        ))
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(|| async { "OK" }))
        // Realtime feed
        .route("/ws", get(ws_handler::ws_handler))
        // Players
        .route("/api/players", get(routes::list_players).post(routes::create_player))
        .route(
            "/api/players/{id}",
            get(routes::get_player)
                .put(routes::update_player)
                .delete(routes::delete_player),
        )
        .route("/api/players/{id}/stats", get(routes::get_player_stats))
        // Sessions
        .route("/api/sessions", get(routes::list_sessions).post(routes::create_session))
        .route("/api/sessions/{id}", delete(routes::delete_session))
        // Promotions
        .route("/api/promotions", get(routes::list_promotions).post(routes::create_promotion))
        .route(
            "/api/promotions/{id}",
            get(routes::get_promotion)
                .put(routes::update_promotion)
                .delete(routes::delete_promotion),
        )
        .route("/api/promotions/{id}/active", post(routes::set_promotion_active))
        .route("/api/promotions/{id}/leaderboard", get(routes::get_leaderboard))
        // Penalties and addons
        .route("/api/penalties", get(routes::list_penalties).post(routes::create_penalty))
        .route("/api/penalties/{id}", delete(routes::delete_penalty))
        .route("/api/addons", get(routes::list_addons).post(routes::create_addon))
        .route("/api/addons/{id}", delete(routes::delete_addon))
        // Stats and display
        .route("/api/stats/recalculate", post(routes::recalculate_all))
        .route("/api/display", get(routes::get_display))
        .with_state(state)
        .layer(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "clubhours_backend=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();

    // Database connection pool
    let db_pool = config.db.create_pool(Some(Runtime::Tokio1), NoTls)
        .expect("Failed to create database pool");

    // Test connection and make sure the tables exist
    db::ensure_schema(&db_pool).await.expect("Failed to prepare database schema");
    tracing::info!("Connected to database");

    let state = Arc::new(AppState::new(db_pool, config.club_offset, config.realtime_buffer));
    state.spawn_publisher();
    let app = build_router(state);

    tracing::info!("Starting server on {}", config.bind_address);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await
        .expect("Failed to bind address");
    axum::serve(listener, app).await.expect("Server error");
}
