//! HTTP boundary: the form page and the prediction endpoint.

use crate::app::App;
use crate::models::{ErrorBody, PredictRequest};
use crate::Error;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Build the router serving `/`, `/health` and `/api/predict`.
pub fn router(app: Arc<App>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route(
            "/api/predict",
            post(predict).fallback(method_not_allowed),
        )
        .with_state(app)
}

/// Serve until the listener fails.
pub async fn serve(listener: TcpListener, app: Arc<App>) -> crate::Result<()> {
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(app)).await?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

async fn predict(
    State(app): State<Arc<App>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4();

    async move {
        let request = match payload {
            Ok(Json(request)) => request,
            Err(rejection) => {
                warn!("Rejected prediction body: {}", rejection.body_text());
                return error_response(StatusCode::BAD_REQUEST, &rejection.body_text());
            }
        };

        let dream = request.dream.unwrap_or_default();
        info!("Prediction requested ({} chars)", dream.chars().count());

        match app.predict(&dream).await {
            Ok(result) => {
                info!(
                    "Prediction ready: {} lucky numbers, confidence {}",
                    result.lucky_numbers.len(),
                    result.confidence
                );
                (StatusCode::OK, Json(result)).into_response()
            }
            Err(e) => {
                let status = status_for(&e);
                if status.is_server_error() {
                    error!("Prediction failed: {}", e);
                } else {
                    warn!("Prediction rejected: {}", e);
                }
                error_response(status, &e.to_string())
            }
        }
    }
    .instrument(info_span!("predict", %request_id))
    .await
}

/// HTTP status for an error surfaced at the request boundary.
pub fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::InvalidInput => StatusCode::BAD_REQUEST,
        Error::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}
