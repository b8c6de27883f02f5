use std::sync::Arc;

use adb_sdk::{Db, Document, Operation, ResourceKind, Response, SdkError, SdkResult};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

/// Body of `POST /v1/query`.
///
/// `query` is either the JSON text of an operation or the operation object
/// itself.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: Value,
    #[serde(default)]
    pub variables: Value,
}

/// Health check handler.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Info handler. A store or registry failure is a 500, not zero counts.
pub async fn info_handler(
    State(db): State<Arc<Db>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    db_info(&db).map(Json).map_err(|err| {
        warn!(error = %err, "info lookup failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": err.to_string() })),
        )
    })
}

fn db_info(db: &Db) -> SdkResult<Value> {
    let count = |kind| db.store().count(kind);
    Ok(json!({
        "name": "adb-server",
        "version": env!("CARGO_PKG_VERSION"),
        "sources": count(ResourceKind::Source)?,
        "bytecodes": count(ResourceKind::Bytecode)?,
        "compilations": count(ResourceKind::Compilation)?,
        "contracts": db.contract_names()?,
    }))
}

/// Query handler. Errors are reported in the response body, not the status.
pub async fn query_handler(
    State(db): State<Arc<Db>>,
    Json(request): Json<QueryRequest>,
) -> Json<Response> {
    let document = match request.query {
        Value::String(text) => Document::Text(text),
        other => match serde_json::from_value::<Operation>(other) {
            Ok(operation) => Document::Parsed(operation),
            Err(e) => {
                let err = SdkError::Validation(format!("invalid operation: {e}"));
                return Json(Response::error(&err));
            }
        },
    };

    let variables = request.variables;
    let response = tokio::task::spawn_blocking(move || db.execute(document, &variables))
        .await
        .unwrap_or_else(|e| Response::error(&SdkError::Internal(e.to_string())));
    Json(response)
}
