//! Metrics endpoint handler.

use crate::handlers::AppState;
use actix_web::{Error, HttpRequest, HttpResponse, Result, web};
use paperclip::actix::api_v2_operation;

/// Prometheus metrics endpoint
///
/// Returns Prometheus-formatted guard metrics (failures, bans, denials,
/// notification and storage outcomes).
#[api_v2_operation(
    summary = "Prometheus Metrics Endpoint",
    description = "Returns Prometheus-formatted metrics for the login guard.",
    tags("Metrics"),
    responses(
        (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
        (status = 503, description = "Metrics collection disabled")
    )
)]
pub async fn get_metrics(req: HttpRequest) -> Result<HttpResponse, Error> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        return Err(actix_web::error::ErrorServiceUnavailable(
            "Metrics not available",
        ));
    };

    let metrics = match state.guard.metrics() {
        Some(metrics) if state.metrics_config.enabled => metrics,
        _ => {
            return Ok(HttpResponse::ServiceUnavailable()
                .content_type("text/plain")
                .body("Metrics collection is disabled"));
        }
    };

    match metrics.render() {
        Ok(metrics_output) => Ok(HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4; charset=utf-8")
            .body(metrics_output)),
        Err(e) => Err(actix_web::error::ErrorInternalServerError(format!(
            "Failed to render metrics: {}",
            e
        ))),
    }
}
