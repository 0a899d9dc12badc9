use axum::Router;

pub mod categories;
pub mod items;
pub mod shortages;
pub mod stores;
pub mod system;

/// Router for all store-scoped endpoints.
pub fn router() -> Router {
    Router::new()
        .merge(stores::router())
        .merge(categories::router())
        .merge(items::router())
        .merge(shortages::router())
}
