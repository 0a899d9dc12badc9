use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

use stockroom_core::{CategoryKey, StoreKey};
use stockroom_inventory::Category;

use crate::app::dto;
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/stores/:store/categories", get(list_categories))
        .route(
            "/stores/:store/categories/:key",
            put(put_category).delete(delete_category),
        )
}

fn parse_scope(store: &str, key: &str) -> Result<(StoreKey, CategoryKey), axum::response::Response> {
    let store = StoreKey::new(store).map_err(errors::domain_error_to_response)?;
    let key = CategoryKey::new(key).map_err(errors::domain_error_to_response)?;
    Ok((store, key))
}

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
    Path(store): Path<String>,
) -> axum::response::Response {
    let store = match StoreKey::new(&store) {
        Ok(k) => k,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store().list_categories(&store).await {
        Ok(categories) => (StatusCode::OK, Json(categories)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn put_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path((store, key)): Path<(String, String)>,
    Json(body): Json<dto::PutCategoryRequest>,
) -> axum::response::Response {
    let (store, key) = match parse_scope(&store, &key) {
        Ok(scope) => scope,
        Err(resp) => return resp,
    };

    let category = Category::new(key, body.label, body.sort_order);
    match services.store().put_category(&store, category).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path((store, key)): Path<(String, String)>,
) -> axum::response::Response {
    let (store, key) = match parse_scope(&store, &key) {
        Ok(scope) => scope,
        Err(resp) => return resp,
    };

    match services.store().delete_category(&store, &key).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
