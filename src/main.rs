use std::sync::{Arc, Mutex};

use axum::routing::{get, patch, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use salonette::config::AppConfig;
use salonette::db;
use salonette::handlers;
use salonette::services::notify::SqliteNotificationSink;
use salonette::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;
    let db = Arc::new(Mutex::new(conn));

    let state = Arc::new(AppState {
        db: Arc::clone(&db),
        config: config.clone(),
        notifier: Box::new(SqliteNotificationSink::new(db)),
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/salons", post(handlers::salons::create_salon))
        .route("/api/salons", get(handlers::salons::list_salons))
        .route("/api/salons/:id", get(handlers::salons::get_salon))
        .route(
            "/api/salons/:id/settings",
            put(handlers::salons::update_salon_settings),
        )
        .route(
            "/api/salons/:id/services",
            get(handlers::catalog::list_salon_services),
        )
        .route("/api/services", post(handlers::catalog::create_service))
        .route("/api/slots", get(handlers::slots::get_available_slots))
        .route(
            "/api/appointments",
            post(handlers::appointments::create_appointment),
        )
        .route(
            "/api/appointments",
            get(handlers::appointments::list_appointments),
        )
        .route(
            "/api/appointments/:id",
            get(handlers::appointments::get_appointment),
        )
        .route(
            "/api/appointments/:id/status",
            patch(handlers::appointments::update_status),
        )
        .route(
            "/api/appointments/:id/cancel",
            post(handlers::appointments::cancel_appointment),
        )
        .route(
            "/api/appointments/:id/reschedule",
            put(handlers::appointments::reschedule_appointment),
        )
        .route(
            "/api/notifications",
            get(handlers::notifications::list_notifications),
        )
        .route(
            "/api/notifications/:id/read",
            post(handlers::notifications::mark_read),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
