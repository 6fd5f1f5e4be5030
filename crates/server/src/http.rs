//! HTTP surface: `POST /suggestion` and `GET /healthz`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use pipeline::{ExerciseSummary, UserPreferences};

use crate::aggregator::RecommendationAggregator;
use crate::config::{load_aggregator, ServeConfig};

#[derive(Clone)]
pub struct AppState {
    aggregator: Arc<RecommendationAggregator>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionRequest {
    #[serde(default)]
    pub user_details: Option<Value>,
    #[serde(default)]
    pub user_preferences: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestionResponse {
    pub suggestions: Vec<ExerciseSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

/// Build the service router around a shared aggregator
pub fn router(aggregator: Arc<RecommendationAggregator>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/suggestion", post(suggestion_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { aggregator })
}

/// Load the models, bind and serve until Ctrl-C
pub async fn serve(config: ServeConfig) -> Result<()> {
    let aggregator = load_aggregator(&config.paths, config.ranking.to_config())?;
    let app = router(Arc::new(aggregator));

    let addr: SocketAddr = config
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", config.bind))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("rep-recs listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server shutdown")?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn suggestion_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SuggestionRequest>, JsonRejection>,
) -> std::result::Result<Json<SuggestionResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        (
            rejection.status(),
            Json(ErrorBody {
                error: rejection.body_text(),
            }),
        )
    })?;

    let (Some(details), Some(preferences)) = (
        request.user_details.filter(is_truthy),
        request.user_preferences.filter(is_truthy),
    ) else {
        return Err(bad_request("Missing user details or preferences"));
    };

    let preferences: UserPreferences = serde_json::from_value(stringify_scalars(preferences))
        .map_err(|e| bad_request(format!("Invalid user preferences: {e}")))?;
    debug!(user_details = %details, muscle = %preferences.muscle, "Suggestion request");

    let aggregator = state.aggregator.clone();
    let suggestions = tokio::task::spawn_blocking(move || aggregator.recommend(&preferences))
        .await
        .map_err(|e| internal_error(format!("suggestion task failed: {e}")))?
        .map_err(|e| {
            error!("Failed to generate suggestions: {}", e);
            internal_error(e.to_string())
        })?;

    Ok(Json(SuggestionResponse { suggestions }))
}

/// Numbers and booleans become their text form and `null` becomes `""`.
/// Arrays and nested objects are left for deserialization to reject.
fn stringify_scalars(value: Value) -> Value {
    match value {
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, field)| {
                    let field = match field {
                        Value::Null => Value::String(String::new()),
                        Value::Bool(b) => Value::String(b.to_string()),
                        Value::Number(n) => Value::String(n.to_string()),
                        other => other,
                    };
                    (key, field)
                })
                .collect(),
        ),
        other => other,
    }
}

/// `null`, `false`, zero and empty strings, arrays or objects count as absent
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

fn internal_error(message: impl Into<String>) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}
