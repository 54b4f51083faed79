use axum::{middleware::from_fn, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use tagihan_api::database::manager::DatabaseManager;
use tagihan_api::handlers;
use tagihan_api::middleware::auth::jwt_auth_middleware;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = tagihan_api::config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting collection API in {:?} mode", config.environment);

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("TAGIHAN_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_auth_routes())
        // Protected API behind JWT middleware
        .merge(protected_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn public_auth_routes() -> Router {
    use axum::routing::post;

    Router::new().route("/auth/login", post(handlers::auth::login))
}

fn protected_routes() -> Router {
    use axum::routing::{patch, post};

    Router::new()
        // Identity
        .route("/api/auth/whoami", get(handlers::auth::whoami))
        // Field reports and their validation lifecycle
        .route(
            "/api/reports/visit",
            get(handlers::reports::visit_get).post(handlers::reports::visit_post),
        )
        .route(
            "/api/reports/visit/:id",
            patch(handlers::reports::visit_patch),
        )
        .route(
            "/api/reports/payment",
            get(handlers::reports::payment_get).post(handlers::reports::payment_post),
        )
        .route(
            "/api/reports/payment/:id",
            patch(handlers::reports::payment_patch),
        )
        // Collector dashboard rollups
        .route(
            "/api/collector/dashboard",
            get(handlers::dashboard::collector_dashboard),
        )
        // Asset management
        .route(
            "/api/assets",
            get(handlers::assets::list).post(handlers::assets::create),
        )
        .route(
            "/api/assets/:id",
            get(handlers::assets::get)
                .put(handlers::assets::update)
                .delete(handlers::assets::delete),
        )
        .route("/api/assets/import", post(handlers::assets::import))
        // Bulk assignment
        .route("/api/assignments/bulk", post(handlers::assignments::bulk))
        .layer(from_fn(jwt_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Tagihan API",
            "version": version,
            "description": "Collection management API - visit/payment validation workflow",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "login": "/auth/login (public - token acquisition)",
                "whoami": "/api/auth/whoami (protected)",
                "reports": "/api/reports/visit, /api/reports/payment (protected)",
                "dashboard": "/api/collector/dashboard (protected)",
                "assets": "/api/assets[/:id], /api/assets/import (protected)",
                "assignments": "/api/assignments/bulk (protected)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
