use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stockroom_core::{CategoryKey, ItemId, StoreKey};
use stockroom_inventory::{ItemDraft, ItemPatch};

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route(
            "/stores/:store/categories/:key/items",
            get(list_category_items).post(add_item),
        )
        .route(
            "/stores/:store/items",
            get(list_items),
        )
        .route(
            "/stores/:store/items/:id",
            get(get_item).patch(update_item).delete(delete_item),
        )
}

fn parse_store(store: &str) -> Result<StoreKey, axum::response::Response> {
    StoreKey::new(store).map_err(errors::domain_error_to_response)
}

fn parse_item_id(id: &str) -> Result<ItemId, axum::response::Response> {
    id.parse().map_err(errors::domain_error_to_response)
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Path(store): Path<String>,
) -> axum::response::Response {
    let store = match parse_store(&store) {
        Ok(k) => k,
        Err(resp) => return resp,
    };

    match services.store().list_items(&store).await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_category_items(
    Extension(services): Extension<Arc<AppServices>>,
    Path((store, key)): Path<(String, String)>,
) -> axum::response::Response {
    let store = match parse_store(&store) {
        Ok(k) => k,
        Err(resp) => return resp,
    };
    let key = match CategoryKey::new(&key) {
        Ok(k) => k,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store().list_items(&store).await {
        Ok(items) => {
            let mut items: Vec<_> = items
                .into_iter()
                .filter(|i| i.category_key == key)
                .collect();
            items.sort_by(|a, b| a.name.cmp(&b.name));
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn add_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path((store, key)): Path<(String, String)>,
    Json(draft): Json<ItemDraft>,
) -> axum::response::Response {
    let store = match parse_store(&store) {
        Ok(k) => k,
        Err(resp) => return resp,
    };
    let key = match CategoryKey::new(&key) {
        Ok(k) => k,
        Err(e) => return errors::domain_error_to_response(e),
    };
    if let Err(e) = draft.validate() {
        return errors::domain_error_to_response(e);
    }

    match services.store().add_item(&store, &key, draft).await {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path((store, id)): Path<(String, String)>,
) -> axum::response::Response {
    let store = match parse_store(&store) {
        Ok(k) => k,
        Err(resp) => return resp,
    };
    let id = match parse_item_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.store().get_item(&store, &id).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path((store, id)): Path<(String, String)>,
    Json(patch): Json<ItemPatch>,
) -> axum::response::Response {
    let store = match parse_store(&store) {
        Ok(k) => k,
        Err(resp) => return resp,
    };
    let id = match parse_item_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if let Err(e) = patch.validate() {
        return errors::domain_error_to_response(e);
    }

    match services.store().update_item(&store, &id, patch).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path((store, id)): Path<(String, String)>,
) -> axum::response::Response {
    let store = match parse_store(&store) {
        Ok(k) => k,
        Err(resp) => return resp,
    };
    let id = match parse_item_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.store().delete_item(&store, &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
