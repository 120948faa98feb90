//! HTTP Routes
//!
//! Request payloads map 1:1 onto `AccessRuleService` calls and the remote
//! result is returned as the response body.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::AppResult;
use crate::service::{AccessRuleService, ClientFactory};
use crate::teo::{
    DescribeL7AccRulesRequest, DescribeL7AccRulesResponse, ModifyL7AccRuleRequest,
    ModifyL7AccRuleResponse,
};

#[derive(Clone)]
pub struct AppState {
    pub access_rules: AccessRuleService,
}

impl AppState {
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            access_rules: AccessRuleService::new(factory),
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(echo_headers))
        .route("/health", get(health_check))
        .route("/access_rules/get_rules/:zone_id", get(get_rules))
        .route("/access_rules/update_source", put(update_source))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Raw inbound headers, for debugging what reaches the gateway
async fn echo_headers(headers: HeaderMap) -> Json<Map<String, Value>> {
    let mut echoed = Map::new();

    for name in headers.keys() {
        let joined = headers
            .get_all(name)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        echoed.insert(name.as_str().to_string(), Value::String(joined));
    }

    Json(echoed)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "teo-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Optional paging for `DescribeL7AccRules`
#[derive(Debug, Default, Deserialize)]
pub struct RulesQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

async fn get_rules(
    State(state): State<AppState>,
    Path(zone_id): Path<String>,
    Query(query): Query<RulesQuery>,
) -> AppResult<Json<DescribeL7AccRulesResponse>> {
    let request = DescribeL7AccRulesRequest {
        zone_id,
        limit: query.limit,
        offset: query.offset,
    };

    let response = state.access_rules.get_access_rules(request).await?;
    Ok(Json(response))
}

async fn update_source(
    State(state): State<AppState>,
    Json(request): Json<ModifyL7AccRuleRequest>,
) -> AppResult<Json<ModifyL7AccRuleResponse>> {
    let response = state.access_rules.update_access_rule(request).await?;
    Ok(Json(response))
}
