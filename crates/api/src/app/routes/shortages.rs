use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stockroom_core::StoreKey;
use stockroom_inventory::shortage_report;

use crate::app::dto;
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/stores/:store/shortages", get(get_shortages))
}

/// The shortage report: items below their minimum, canonically ordered.
/// `?order=urgency` re-sorts by descending need (presentation only).
pub async fn get_shortages(
    Extension(services): Extension<Arc<AppServices>>,
    Path(store): Path<String>,
    Query(query): Query<dto::ShortageQuery>,
) -> axum::response::Response {
    let store = match StoreKey::new(&store) {
        Ok(k) => k,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match shortage_report(services.store(), &store).await {
        Ok(report) => {
            let report = if query.order.as_deref() == Some("urgency") {
                report.most_urgent_first()
            } else {
                report
            };
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(e) => errors::shortage_error_to_response(e),
    }
}
