use actix_web::HttpServer;
use facecontrol::{AppState, create_app};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("FACECONTROL_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_tracing();

    let state = AppState::from_env().map_err(|e| std::io::Error::other(e.to_string()))?;
    let bind = std::env::var("FACECONTROL_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    let config = state.guard.config();
    info!(
        bind = %bind,
        store = %config.store_path.display(),
        allowed_failures = config.allowed_failures,
        ban_period_days = config.ban_period_days,
        allow_list_entries = config.ip_allow_list.len(),
        "Starting facecontrol"
    );

    HttpServer::new(move || create_app(state.clone()))
        .bind(bind)?
        .run()
        .await
}
