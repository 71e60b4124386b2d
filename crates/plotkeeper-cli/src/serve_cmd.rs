use std::net::SocketAddr;

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use plotkeeper_core::plot::{self, PlotError, PlotIdInput, PlotInput};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }
}

impl From<PlotError> for AppError {
    fn from(err: PlotError) -> Self {
        let status = match &err {
            PlotError::BadRequest(_) => StatusCode::BAD_REQUEST,
            PlotError::NotFound(_) => StatusCode::NOT_FOUND,
            PlotError::Conflict(_) => StatusCode::CONFLICT,
            PlotError::Store(e) => {
                tracing::error!(error = %format!("{e:#}"), "store failure while handling plot request");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "message": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(pool: PgPool) -> Router {
    Router::new()
        .route(
            "/plots",
            get(list_plots)
                .post(create_plot)
                .patch(update_plot)
                .delete(delete_plot),
        )
        .route("/plots/{id}", get(get_plot))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(pool)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(pool: PgPool, bind: &str, port: u16) -> Result<()> {
    let app = build_router(pool);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("plotkeeper serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("plotkeeper serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn list_plots(State(pool): State<PgPool>) -> Result<Response, AppError> {
    let envelope = plot::list_all(&pool).await?;
    Ok(Json(envelope).into_response())
}

async fn get_plot(
    State(pool): State<PgPool>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let envelope = plot::get_by_id(&pool, &id).await?;
    Ok(Json(envelope).into_response())
}

async fn create_plot(
    State(pool): State<PgPool>,
    payload: Result<Json<PlotInput>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = payload?;
    let envelope = plot::create(&pool, &body).await?;
    Ok((StatusCode::CREATED, Json(envelope)).into_response())
}

async fn update_plot(
    State(pool): State<PgPool>,
    payload: Result<Json<PlotInput>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = payload?;
    let envelope = plot::update(&pool, &body).await?;
    Ok(Json(envelope).into_response())
}

/// A DELETE with no body, or a body that is not JSON, names no plot; the
/// service answers it with its own "id required" message.
async fn delete_plot(
    State(pool): State<PgPool>,
    headers: HeaderMap,
    raw: Bytes,
) -> Result<Response, AppError> {
    let body = if is_json(&headers) && !raw.iter().all(u8::is_ascii_whitespace) {
        let Json(body) = Json::<PlotIdInput>::from_bytes(&raw)?;
        body
    } else {
        PlotIdInput::default()
    };
    let envelope = plot::delete(&pool, body.plot_id()).await?;
    Ok(Json(envelope).into_response())
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(';').next().unwrap_or_default().trim().to_ascii_lowercase())
        .is_some_and(|essence| {
            essence == "application/json"
                || (essence.starts_with("application/") && essence.ends_with("+json"))
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
