use std::collections::BTreeMap;

use axum::Json;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// ApiIndex
///
/// Landing document served at `/`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ApiIndex {
    pub message: String,
    pub version: String,
    pub endpoints: BTreeMap<String, String>,
}

/// health
///
/// [Public Route] Liveness probe; never touches the database.
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "CMS API is running".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "API index", body = ApiIndex))
)]
pub async fn index() -> Json<ApiIndex> {
    let endpoints = [
        ("health", "/api/health"),
        ("auth", "/api/auth"),
        ("articles", "/api/articles"),
        ("categories", "/api/categories"),
        ("pages", "/api/pages"),
        ("comments", "/api/comments"),
        ("docs", "/swagger-ui"),
    ]
    .into_iter()
    .map(|(name, path)| (name.to_string(), path.to_string()))
    .collect();

    Json(ApiIndex {
        message: "CMS Backend API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints,
    })
}

/// Fallback for unmatched routes.
pub async fn not_found() -> AppError {
    AppError::not_found("Route not found")
}
