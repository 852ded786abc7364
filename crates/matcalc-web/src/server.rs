use std::net::SocketAddr;

use anyhow::Context;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::assets;
use crate::handler::{self, ApiOptions};
use crate::protocol::CalculateResponse;

/// Everything the server needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    /// Allow cross-origin calls to `/calculate`.
    pub cors: bool,
    pub api: ApiOptions,
}

#[derive(Clone)]
struct AppState {
    api: ApiOptions,
}

pub fn router(api: ApiOptions, cors: bool) -> Router {
    let router = Router::new()
        .route("/", get(assets::index))
        .route("/static/{*path}", get(assets::static_file))
        .route("/calculate", post(calculate))
        .with_state(AppState { api })
        .layer(TraceLayer::new_for_http());

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

async fn calculate(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<CalculateResponse>) {
    let response = handler::calculate(&body, &state.api);
    let status = if response.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(response))
}

/// Serve on an already-bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, api: ApiOptions, cors: bool) -> anyhow::Result<()> {
    axum::serve(listener, router(api, cors))
        .await
        .context("http server failed")
}

/// Run the HTTP server. Blocks until the process is stopped.
pub fn run_server(settings: ServerSettings) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(async move {
        let listener = TcpListener::bind(settings.addr)
            .await
            .with_context(|| format!("failed to bind {}", settings.addr))?;
        info!("listening on http://{}", listener.local_addr()?);
        serve(listener, settings.api, settings.cors).await
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::net::TcpListener as StdTcpListener;
    use tokio::runtime::Runtime;

    fn spawn_server(api: ApiOptions) -> (String, Runtime) {
        let std_listener = StdTcpListener::bind("127.0.0.1:0").unwrap();
        std_listener.set_nonblocking(true).expect("nonblocking");
        let addr = std_listener.local_addr().unwrap();
        let rt = Runtime::new().unwrap();
        rt.spawn(async move {
            let listener = TcpListener::from_std(std_listener).unwrap();
            serve(listener, api, false).await.unwrap();
        });
        (format!("http://{addr}"), rt)
    }

    fn post(base: &str, body: &str) -> (u16, Value) {
        let result = ureq::post(&format!("{base}/calculate"))
            .set("Content-Type", "application/json")
            .send_string(body);
        let resp = match result {
            Ok(resp) => resp,
            Err(ureq::Error::Status(_, resp)) => resp,
            Err(e) => panic!("transport error: {e}"),
        };
        let status = resp.status();
        (status, resp.into_json().unwrap())
    }

    #[test]
    fn test_calculate_ok() {
        let (base, _rt) = spawn_server(ApiOptions::default());
        let body = json!({
            "size": 2,
            "operation": "+",
            "matrices": [[[1, 2], [3, 4]], [[5, 6], [7, 8]]]
        });
        let (status, out) = post(&base, &body.to_string());
        assert_eq!(status, 200);
        assert_eq!(
            out,
            json!({"success": true, "result": {"type": "matrix", "data": [[6.0, 8.0], [10.0, 12.0]]}})
        );
    }

    #[test]
    fn test_calculate_error_is_400() {
        let (base, _rt) = spawn_server(ApiOptions::default());
        let (status, out) = post(&base, r#"{"size": 2, "operation": "+"}"#);
        assert_eq!(status, 400);
        assert_eq!(out["success"], json!(false));
        assert!(out["error"].as_str().unwrap().contains("matrices"));

        let (status, out) = post(&base, "not json at all");
        assert_eq!(status, 400);
        assert_eq!(out["success"], json!(false));
    }

    #[test]
    fn test_index_and_assets() {
        let (base, _rt) = spawn_server(ApiOptions::default());

        let resp = ureq::get(&format!("{base}/")).call().unwrap();
        assert!(resp.content_type().starts_with("text/html"));
        assert!(resp.into_string().unwrap().contains("/static/script.js"));

        let resp = ureq::get(&format!("{base}/static/script.js")).call().unwrap();
        assert!(resp.into_string().unwrap().contains("/calculate"));

        match ureq::get(&format!("{base}/static/missing.txt")).call() {
            Err(ureq::Error::Status(code, _)) => assert_eq!(code, 404),
            other => panic!("expected 404, got {other:?}"),
        }
    }
}
