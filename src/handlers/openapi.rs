//! OpenAPI specification generation and app factory.

use std::sync::Arc;

use crate::{
    config::{GuardConfig, MetricsConfig},
    error::GuardError,
    handlers::{get_metrics, health, login},
    services::{
        CredentialVerifier, GuardMetrics, LogNotifier, LoginGuard, Notifier, StaticCredentials,
        WebhookNotifier,
    },
    utils::ClientIpResolver,
};
use actix_web::App;
use paperclip::actix::{OpenApiExt, web};
use paperclip::v2::models::{DefaultApiRaw, Info};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub guard: Arc<LoginGuard>,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub resolver: ClientIpResolver,
    pub metrics_config: MetricsConfig,
}

impl AppState {
    pub fn new(guard: LoginGuard, verifier: Arc<dyn CredentialVerifier>) -> Self {
        let resolver = ClientIpResolver::new(guard.config().trusted_proxies.clone());
        Self {
            guard: Arc::new(guard),
            verifier,
            resolver,
            metrics_config: MetricsConfig::default(),
        }
    }

    pub fn with_metrics_config(mut self, metrics_config: MetricsConfig) -> Self {
        self.metrics_config = metrics_config;
        self
    }

    /// Build the state from `FACECONTROL_*` environment variables.
    ///
    /// A configured webhook URL selects the webhook notifier, otherwise
    /// notifications go to the log.
    pub fn from_env() -> Result<Self, GuardError> {
        let config = GuardConfig::from_env();
        let metrics_config = MetricsConfig::from_env();

        let notifier: Arc<dyn Notifier> = match &config.notification.webhook_url {
            Some(url) => Arc::new(WebhookNotifier::new(url.clone())),
            None => Arc::new(LogNotifier),
        };

        let mut guard = LoginGuard::new(config).with_notifier(notifier);
        if metrics_config.enabled {
            guard = guard.with_metrics(GuardMetrics::new()?);
        }

        Ok(Self::new(guard, Arc::new(StaticCredentials::from_env()))
            .with_metrics_config(metrics_config))
    }
}

/// Creates the OpenAPI specification for the API
pub fn create_openapi_spec() -> DefaultApiRaw {
    DefaultApiRaw {
        info: Info {
            title: "Facecontrol".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            description: Some(
                "Login endpoint protected by a brute-force guard and an optional IP allow-list.\n\n\
                ## Login guard\n\
                - Clients on a configured allow-list are the only ones allowed to log in\n\
                - Failed logins are counted per client IP and calendar day\n\
                - After `FACECONTROL_ALLOWED_FAILURES` failures in one day the IP is banned for \
                `FACECONTROL_BAN_PERIOD_DAYS` days\n\
                - Policy denials respond `403` with an empty message".into()
            ),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Creates the app around a prepared [`AppState`]
///
/// Routes:
/// - `POST /auth/login`
/// - `GET /api/health`
/// - `GET /api/metrics`
/// - `GET /api/spec/v2` (OpenAPI document)
pub fn create_app(
    state: AppState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap_api_with_spec(create_openapi_spec())
        .app_data(web::Data::new(state))
        .service(web::resource("/api/health").route(web::get().to(health)))
        .service(web::resource("/api/metrics").route(web::get().to(get_metrics)))
        .service(web::resource("/auth/login").route(web::post().to(login)))
        .with_json_spec_at("/api/spec/v2")
        .build()
}
