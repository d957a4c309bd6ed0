use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::config::{ActionKind, MatchKind};
use crate::http::server::AppState;
use crate::routing::Resolution;

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub environment: Option<String>,
    pub public_path: String,
    pub fallback: String,
    pub rules: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RuleSummary {
    pub index: usize,
    pub name: String,
    #[serde(rename = "match")]
    pub kind: MatchKind,
    pub pattern: String,
    pub action: ActionKind,
    pub target: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct ResolveResult {
    pub path: String,
    #[serde(flatten)]
    pub resolution: Resolution,
    pub rule: Option<String>,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.environment.as_deref().map(str::to_string),
        public_path: state.resolver.base_path().as_public_path(),
        fallback: state.resolver.fallback().to_string(),
        rules: state.resolver.rules().len(),
    })
}

pub async fn get_rules(State(state): State<AppState>) -> Json<Vec<RuleSummary>> {
    let rules = state
        .resolver
        .rules()
        .iter()
        .enumerate()
        .map(|(index, rule)| RuleSummary {
            index,
            name: rule.name().to_string(),
            kind: rule.matcher().kind(),
            pattern: rule.matcher().source().to_string(),
            action: rule.action().kind(),
            target: rule.action().target().map(str::to_string),
        })
        .collect();

    Json(rules)
}

pub async fn get_resolve(
    State(state): State<AppState>,
    Query(params): Query<ResolveParams>,
) -> Response {
    if !params.path.starts_with('/') {
        return (StatusCode::BAD_REQUEST, "path must start with `/`").into_response();
    }

    let decision = state.resolver.classify(&params.path);
    Json(ResolveResult {
        rule: decision.rule.map(str::to_string),
        resolution: decision.resolution,
        path: params.path,
    })
    .into_response()
}
