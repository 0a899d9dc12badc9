use axum::{response::IntoResponse, Json};

pub const SERVICE: &str = "stockroom";

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "ok": true,
        "service": SERVICE,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
