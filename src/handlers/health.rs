//! Health check endpoint handler.

use crate::{
    handlers::AppState,
    models::{HealthResponse, StoreStatus},
};
use actix_web::{Error, HttpRequest, Result, web};
use paperclip::actix::api_v2_operation;

/// Health check endpoint
///
/// Reports `degraded` when the attempt store cannot be read, since bans are
/// not enforced while that lasts.
#[api_v2_operation(
    summary = "Health Check Endpoint",
    description = "Returns the current health status of the API in JSON format.",
    tags("Health"),
    responses(
        (status = 200, description = "Successful response", body = HealthResponse)
    )
)]
pub async fn health(req: HttpRequest) -> Result<web::Json<HealthResponse>, Error> {
    let store_readable = match req.app_data::<web::Data<AppState>>() {
        Some(state) => {
            let guard = state.guard.clone();
            web::block(move || guard.store().read_existing().is_ok())
                .await
                .unwrap_or(false)
        }
        None => true,
    };

    let store = if store_readable {
        StoreStatus::Readable
    } else {
        StoreStatus::Unreadable
    };

    Ok(web::Json(HealthResponse::from_store(store)))
}
