//! HTTP surface over the commute core.
//!
//! Thin by design: handlers validate query parameters, call into the core,
//! and serialize the result. Any core failure maps to a generic 500 with the
//! detail kept in the server log; malformed parameters map to 400.

use crate::browser::ChromiumLauncher;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::Error;
use crate::limiter::CrawlLimiter;
use crate::providers::ProviderSet;
use crate::scrape;
use crate::select::{select_route, SelectionStrategy};
use crate::types::GeoPoint;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

/// Shared state for all routes.
pub struct AppState {
    pub config: Config,
    pub providers: ProviderSet,
    pub police: crate::alerts::PoliceAlerts,
    pub cameras: crate::alerts::SpeedCameras,
    pub limiter: Mutex<CrawlLimiter>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let http = crate::http_client::HttpClient::new(config.http_timeout_ms);
        Self {
            providers: ProviderSet::new(&config, Arc::clone(&clock)),
            police: crate::alerts::PoliceAlerts::new(http.clone(), Arc::clone(&clock)),
            cameras: crate::alerts::SpeedCameras::new(http, Arc::clone(&clock)),
            limiter: Mutex::new(CrawlLimiter::new(config.min_crawl_interval)),
            clock,
            config,
        }
    }
}

/// Build the axum Router with all endpoints.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/commute", get(handle_commute))
        .route("/commute/best", get(handle_commute_best))
        .route("/provider/:name", get(handle_provider))
        .route("/alerts", get(handle_alerts))
        .route("/camera", get(handle_camera))
        .layer(cors)
        .with_state(state)
}

/// Serve until shutdown.
pub async fn serve(state: Arc<AppState>, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "server started");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[derive(Deserialize)]
struct RouteQuery {
    from: String,
    to: String,
}

#[derive(Deserialize)]
struct PointQuery {
    at: String,
}

/// Parse `"lat,lng"` into a point.
fn parse_point(value: &str) -> Option<GeoPoint> {
    let (lat, lng) = value.split_once(',')?;
    Some(GeoPoint::new(
        lat.trim().parse().ok()?,
        lng.trim().parse().ok()?,
    ))
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": message })),
    )
        .into_response()
}

fn internal_error(err: &Error) -> Response {
    tracing::warn!(error = %err, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "upstream query failed" })),
    )
        .into_response()
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Limiter check plus the crawl itself, shared by both commute routes.
async fn run_crawl(
    state: &AppState,
    origin: GeoPoint,
    destination: GeoPoint,
) -> Result<Vec<crate::types::CommutingInfo>, Response> {
    if !state.limiter.lock().await.try_acquire(Instant::now()) {
        return Err((
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "crawl interval not elapsed" })),
        )
            .into_response());
    }

    scrape::crawl(
        &ChromiumLauncher,
        state.clock.as_ref(),
        origin,
        destination,
        state.config.scrape_timeout_ms,
    )
    .await
    .map_err(|e| internal_error(&e))
}

async fn handle_commute(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RouteQuery>,
) -> Response {
    let (Some(origin), Some(destination)) = (parse_point(&query.from), parse_point(&query.to))
    else {
        return bad_request("from/to must be lat,lng");
    };

    match run_crawl(&state, origin, destination).await {
        Ok(trips) => Json(trips).into_response(),
        Err(response) => response,
    }
}

async fn handle_commute_best(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RouteQuery>,
) -> Response {
    let (Some(origin), Some(destination)) = (parse_point(&query.from), parse_point(&query.to))
    else {
        return bad_request("from/to must be lat,lng");
    };

    match run_crawl(&state, origin, destination).await {
        Ok(trips) => match select_route(&trips, SelectionStrategy::MinimumMinutes) {
            Some(best) => Json(best.clone()).into_response(),
            None => internal_error(&Error::Extraction("no candidate routes".into())),
        },
        Err(response) => response,
    }
}

async fn handle_provider(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<RouteQuery>,
) -> Response {
    let (Some(origin), Some(destination)) =
        (parse_point(&query.from), parse_point(&query.to))
    else {
        return bad_request("from/to must be lat,lng");
    };

    match state.providers.fetch(&name, origin, destination).await {
        Ok(info) => Json(info).into_response(),
        Err(e) => internal_error(&e),
    }
}

async fn handle_alerts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PointQuery>,
) -> Response {
    let Some(point) = parse_point(&query.at) else {
        return bad_request("at must be lat,lng");
    };

    match state.police.fetch(point).await {
        Ok(alerts) => Json(alerts).into_response(),
        Err(e) => internal_error(&e),
    }
}

async fn handle_camera(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PointQuery>,
) -> Response {
    let Some(point) = parse_point(&query.at) else {
        return bad_request("at must be lat,lng");
    };

    match state.cameras.fetch_nearest(point).await {
        Ok(camera) => Json(camera).into_response(),
        Err(e) => internal_error(&e),
    }
}
