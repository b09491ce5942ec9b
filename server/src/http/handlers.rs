use axum::{
    Json,
    body::Bytes,
    extract::{
        Path, Query, State,
        rejection::{BytesRejection, QueryRejection},
    },
};
use shared_types::{Environment, Metadata};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    dto::{HealthResponse, UidParams},
    error::{ApiError, ApiResult},
    response::ApiResponse,
    state::AppState,
};

/// Decode a request body into an environment. Nothing reaches the store
/// unless this succeeds.
fn parse_environment(body: Result<Bytes, BytesRejection>) -> ApiResult<Environment> {
    let body = body.map_err(|e| {
        ApiError::MalformedRequest(format!("Failed to read request body: {e}"))
    })?;

    serde_json::from_slice(&body).map_err(|e| {
        warn!(
            body = %String::from_utf8_lossy(&body),
            "Failed to unmarshal request body"
        );
        ApiError::MalformedRequest(format!("Invalid environment: {e}"))
    })
}

/// Read the optional `?uid=` selector; a query that does not parse is a malformed request.
fn parse_uid(query: Result<Query<UidParams>, QueryRejection>) -> ApiResult<Option<String>> {
    let Query(params) =
        query.map_err(|e| ApiError::MalformedRequest(format!("Invalid query string: {e}")))?;
    Ok(params.uid)
}

/// GET /environments
#[instrument(skip(state))]
pub async fn list_environments(
    State(state): State<Arc<AppState>>,
) -> ApiResult<ApiResponse<Vec<Environment>>> {
    let environments = state.storage.list().await?;
    info!("Listed {} environments", environments.len());

    Ok(ApiResponse::ok(environments))
}

/// POST /environments
/// Store the first version of a new environment
#[instrument(skip(state, body))]
pub async fn create_environment(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<ApiResponse<Metadata>> {
    let env = parse_environment(body)?;
    info!("Creating environment: {}", env.name());

    let uid = state.storage.create(&env).await?;

    Ok(ApiResponse::created(Metadata::new(env.metadata.name, uid)))
}

/// GET /environments/:name?uid=
/// Fetch one version, the latest when no uid is given
#[instrument(skip(state))]
pub async fn get_environment(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    query: Result<Query<UidParams>, QueryRejection>,
) -> ApiResult<ApiResponse<Environment>> {
    let uid = parse_uid(query)?;

    // Virtual environments win over storage and ignore any uid.
    if let Some(env) = state.virtuals.resolve(&name) {
        debug!("Resolved virtual environment: {}", name);
        return Ok(ApiResponse::ok(env));
    }

    let meta = Metadata::with_optional_uid(name, uid);
    let env = state.storage.get(&meta).await?;

    Ok(ApiResponse::ok(env))
}

/// PUT /environments/:name
/// Record a new version of an existing environment
#[instrument(skip(state, body))]
pub async fn update_environment(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<ApiResponse<Metadata>> {
    let env = parse_environment(body)?;

    if env.metadata.name != name {
        return Err(ApiError::InvalidArgument(format!(
            "Environment name doesn't match URL: {:?} != {:?}",
            env.metadata.name, name
        )));
    }

    info!("Updating environment: {}", name);
    let uid = state.storage.update(&env).await?;

    Ok(ApiResponse::ok(Metadata::new(name, uid)))
}

/// DELETE /environments/:name?uid=
/// Delete one version, or every version when no uid is given
#[instrument(skip(state))]
pub async fn delete_environment(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    query: Result<Query<UidParams>, QueryRejection>,
) -> ApiResult<ApiResponse<()>> {
    let meta = Metadata::with_optional_uid(name, parse_uid(query)?);

    if meta.has_uid() {
        info!("Deleting environment version: {}", meta);
    } else {
        warn!(environment = %meta.name, "Deleting all versions");
    }

    state.storage.delete(&meta).await?;

    Ok(ApiResponse::empty())
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "environment-registry".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
