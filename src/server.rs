//! HTTP surface over the query service.

use axum::{
  extract::{rejection::QueryRejection, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  routing::{get, post},
  Json, Router,
};
use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::error::Error;
use crate::query::{
  DetailView, HealthReport, IngestReport, QueryService, SummaryLink, SummaryName, DEFAULT_LIMIT,
};
use crate::source::SourceGateway;
use crate::store::RecordStore;

type SharedService<S, G> = Arc<QueryService<S, G>>;

#[derive(Debug, Deserialize)]
pub struct IngestParams {
  limit: Option<u32>,
  offset: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
  limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct NameParams {
  name: String,
}

pub fn router<S, G>(service: SharedService<S, G>) -> Router
where
  S: RecordStore + 'static,
  G: SourceGateway + 'static,
{
  Router::new()
    .route("/health", get(health::<S, G>))
    .route("/ingest", post(ingest::<S, G>))
    .route("/summaries", get(list::<S, G>))
    .route("/summaries/url", get(resolve_url::<S, G>))
    .route("/summaries/detail", get(detail::<S, G>))
    .route("/summaries/detail/refresh", post(refresh_detail::<S, G>))
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http())
    .with_state(service)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, app: Router) -> Result<()> {
  let listener = tokio::net::TcpListener::bind(addr)
    .await
    .map_err(|e| eyre!("Failed to bind {}: {}", addr, e))?;
  info!("Listening on http://{}", addr);

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| eyre!("HTTP server error: {}", e))
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  info!("shutting down");
}

async fn health<S, G>(State(service): State<SharedService<S, G>>) -> Result<Json<HealthReport>, Error>
where
  S: RecordStore + 'static,
  G: SourceGateway + 'static,
{
  Ok(Json(service.health().await?))
}

async fn ingest<S, G>(
  State(service): State<SharedService<S, G>>,
  params: Result<Query<IngestParams>, QueryRejection>,
) -> Result<Json<IngestReport>, Error>
where
  S: RecordStore + 'static,
  G: SourceGateway + 'static,
{
  let Query(params) = params?;
  let report = service
    .ingest(params.limit.unwrap_or(DEFAULT_LIMIT), params.offset.unwrap_or(0))
    .await?;
  Ok(Json(report))
}

async fn list<S, G>(
  State(service): State<SharedService<S, G>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<SummaryName>>, Error>
where
  S: RecordStore + 'static,
  G: SourceGateway + 'static,
{
  let Query(params) = params?;
  Ok(Json(service.list(params.limit.unwrap_or(DEFAULT_LIMIT)).await?))
}

async fn resolve_url<S, G>(
  State(service): State<SharedService<S, G>>,
  params: Result<Query<NameParams>, QueryRejection>,
) -> Result<Json<SummaryLink>, Error>
where
  S: RecordStore + 'static,
  G: SourceGateway + 'static,
{
  let Query(params) = params?;
  Ok(Json(service.resolve_url(&params.name).await?))
}

async fn detail<S, G>(
  State(service): State<SharedService<S, G>>,
  params: Result<Query<NameParams>, QueryRejection>,
) -> Result<Json<DetailView>, Error>
where
  S: RecordStore + 'static,
  G: SourceGateway + 'static,
{
  let Query(params) = params?;
  Ok(Json(service.detail(&params.name).await?))
}

async fn refresh_detail<S, G>(
  State(service): State<SharedService<S, G>>,
  params: Result<Query<NameParams>, QueryRejection>,
) -> Result<Json<DetailView>, Error>
where
  S: RecordStore + 'static,
  G: SourceGateway + 'static,
{
  let Query(params) = params?;
  Ok(Json(service.refresh_detail(&params.name).await?))
}

impl From<QueryRejection> for Error {
  fn from(rejection: QueryRejection) -> Self {
    Error::InvalidInput(rejection.body_text())
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, detail) = match &self {
      Error::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
      Error::InvalidInput(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
      Error::Upstream { .. } => {
        warn!(error = %self, "upstream failure");
        (StatusCode::BAD_GATEWAY, self.to_string())
      }
      Error::Store(_) | Error::StoreUnavailable(_) => {
        error!(error = %self, "storage failure");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          "internal storage error".to_string(),
        )
      }
    };

    (status, Json(serde_json::json!({ "detail": detail }))).into_response()
  }
}
