use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stockroom_core::StoreKey;
use stockroom_inventory::StoreRecord;

use crate::app::errors;
use crate::app::dto;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/stores", get(list_stores).post(register_store))
}

pub async fn list_stores(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.store().list_stores().await {
        Ok(stores) => (StatusCode::OK, Json(stores)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn register_store(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterStoreRequest>,
) -> axum::response::Response {
    let key = match StoreKey::new(&body.key) {
        Ok(k) => k,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services
        .store()
        .register_store(StoreRecord::new(key.clone(), body.name))
        .await
    {
        Ok(()) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "key": key })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
