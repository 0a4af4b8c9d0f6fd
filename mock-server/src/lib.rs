use std::collections::BTreeMap;

use axum::{
    extract::{Path, RawQuery},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// What `/echo` saw, sent back as JSON.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Echo {
    pub id: Uuid,
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/status/{code}", get(status))
        .route("/text", get(text))
        .route("/empty", get(empty))
        .route("/delay/{ms}", get(delay))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, uri: Uri, RawQuery(query): RawQuery, headers: HeaderMap, body: String) -> impl IntoResponse {
    let echo = Echo {
        id: Uuid::new_v4(),
        method: method.to_string(),
        path: uri.path().to_string(),
        query,
        headers: headers
            .iter()
            .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
            .collect(),
        body,
    };
    tracing::debug!(method = %echo.method, path = %echo.path, "echo");
    ([(REQUEST_ID_HEADER, echo.id.to_string())], Json(echo))
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, Json<serde_json::Value>), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, Json(serde_json::json!({ "status": code }))))
}

async fn text() -> &'static str {
    "plain text, not json"
}

async fn empty() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Reply `{"delayed": ms}` after sleeping, capped at ten seconds.
async fn delay(Path(ms): Path<u64>) -> Json<serde_json::Value> {
    tokio::time::sleep(std::time::Duration::from_millis(ms.min(10_000))).await;
    Json(serde_json::json!({ "delayed": ms }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_serializes_to_json() {
        let echo = Echo {
            id: Uuid::nil(),
            method: "GET".to_string(),
            path: "/echo".to_string(),
            query: Some("a=1".to_string()),
            headers: BTreeMap::new(),
            body: String::new(),
        };
        let json = serde_json::to_value(&echo).unwrap();
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["method"], "GET");
        assert_eq!(json["query"], "a=1");
    }

    #[test]
    fn echo_roundtrips_through_json() {
        let echo = Echo {
            id: Uuid::new_v4(),
            method: "POST".to_string(),
            path: "/echo/users".to_string(),
            query: None,
            headers: BTreeMap::from([("content-type".to_string(), "application/json".to_string())]),
            body: r#"{"a":1}"#.to_string(),
        };
        let json = serde_json::to_string(&echo).unwrap();
        let back: Echo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, echo);
    }
}
