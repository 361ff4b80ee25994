//! Authentication endpoint handlers.
//!
//! The login handler drives the guard's three extension points around the
//! credential check. Guard work touches the filesystem, so it runs on the
//! blocking pool; if that pool fails the request proceeds as if the guard
//! had allowed it.

use crate::{
    handlers::AppState,
    models::{
        GateDecision, LoginContext, LoginRequest, LoginResponse,
        audit::{AuthAuditEvent, AuthEventOutcome, AuthEventType},
    },
    utils::http::extract_user_agent,
};
use actix_web::{Error, HttpRequest, HttpResponse, Result, web};
use paperclip::actix::api_v2_operation;
use tracing::warn;
use uuid::Uuid;

/// User login endpoint
///
/// Authenticates users with username/password and returns an access token.
/// Refused outright when the client IP is banned or not allow-listed.
#[api_v2_operation(
    summary = "User Login",
    description = "Authenticate user and return access token",
    tags("Authentication"),
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Login failed", body = LoginResponse),
        (status = 403, description = "Client IP banned or not allow-listed", body = LoginResponse)
    )
)]
pub async fn login(req: HttpRequest, payload: web::Json<LoginRequest>) -> Result<HttpResponse, Error> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorServiceUnavailable("Login guard not configured"))?;

    let ctx = LoginContext::new(state.resolver.resolve_or_empty(&req))
        .with_user_agent(extract_user_agent(&req));

    let decision = {
        let guard = state.guard.clone();
        let ctx = ctx.clone();
        web::block(move || guard.before_authenticate(&ctx))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Access gate unavailable, allowing login attempt");
                GateDecision::Allow
            })
    };

    if let GateDecision::Deny { reason, silent } = decision {
        let message = if silent {
            String::new()
        } else {
            reason.to_string()
        };
        return Ok(HttpResponse::Forbidden().json(LoginResponse::rejected(message)));
    }

    let LoginRequest { username, password } = payload.into_inner();

    match state.verifier.verify(&username, &password) {
        Some(full_name) => {
            {
                let guard = state.guard.clone();
                let ctx = ctx.clone();
                if let Err(e) = web::block(move || guard.on_login_success(&ctx, &full_name)).await {
                    warn!(error = %e, "Login success hook did not run");
                }
            }

            AuthAuditEvent::new(
                AuthEventType::LoginSuccess,
                AuthEventOutcome::Success,
                ctx.ip.clone(),
            )
            .with_user_id(Some(username))
            .with_user_agent(ctx.user_agent.clone())
            .log();

            Ok(HttpResponse::Ok().json(LoginResponse::granted(format!(
                "token_{}",
                Uuid::new_v4()
            ))))
        }
        None => {
            let outcome = {
                let guard = state.guard.clone();
                let ctx = ctx.clone();
                web::block(move || guard.on_login_failure(&ctx)).await
            };

            let mut event = AuthAuditEvent::new(
                AuthEventType::LoginFailure,
                AuthEventOutcome::Failure,
                ctx.ip.clone(),
            )
            .with_user_agent(ctx.user_agent.clone());
            match outcome {
                Ok(outcome) if outcome.tracked => event = event.with_attempts(outcome.attempts),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Login failure hook did not run"),
            }
            event.log();

            Ok(HttpResponse::Unauthorized().json(LoginResponse::rejected("Invalid credentials")))
        }
    }
}
