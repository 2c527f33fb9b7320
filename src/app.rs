use crate::config::Config;
use crate::site::{Site, SiteOptions};
use crate::tmdb::{MovieDbApi, TmdbClient};
use crate::view::{movie_cards, MoviePageView};
use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub site: Arc<Site>,
}

pub async fn run_server(config: Config) -> Result<()> {
    let tmdb: Arc<dyn MovieDbApi> = Arc::new(TmdbClient::new(
        &config.tmdb_base_url,
        &config.tmdb_api_key,
    )?);
    info!(
        "Generating site from {} (policy {}, fallback {})",
        config.tmdb_base_url, config.policy, config.fallback
    );
    let site = Site::build(
        tmdb,
        SiteOptions {
            policy: config.policy,
            fallback: config.fallback,
            prerender_concurrency: config.prerender_concurrency,
        },
    )
    .await?;

    let app = build_router(AppState {
        site: Arc::new(site),
    });

    info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/paths", get(static_paths))
        .route("/movies/:id", get(movie))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn home(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "movies": movie_cards(state.site.home()) }))
}

async fn static_paths(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.site.paths()))
}

async fn movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let prerendered = state.site.is_prerendered(&id);
    match state.site.movie_page(&id).await {
        Some(data) => (
            StatusCode::OK,
            Json(json!({
                "id": id,
                "prerendered": prerendered,
                "available": !data.is_degraded(),
                "page": MoviePageView::from_page_data(&data),
                "record": data.record(),
            })),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": "error", "message": "Movie not found" })),
        ),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        term.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
