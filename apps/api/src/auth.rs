use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use butik_core::{AdminIdentity, AppError};
use tower_sessions::Session;

use crate::dto::{AdminIdentityResponse, AdminLoginRequest, AdminSetupRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub const SESSION_ADMIN_KEY: &str = "admin_identity";

pub async fn setup_handler(
    State(state): State<AppState>,
    Json(payload): Json<AdminSetupRequest>,
) -> ApiResult<StatusCode> {
    state
        .admin_account_service
        .bootstrap(
            &payload.setup_key,
            &payload.email,
            &payload.password,
            &payload.display_name,
        )
        .await?;

    Ok(StatusCode::CREATED)
}

pub async fn login_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    session: Session,
    Json(payload): Json<AdminLoginRequest>,
) -> ApiResult<Json<AdminIdentityResponse>> {
    let client = client_key(&headers, peer);

    let admission = state.login_limiter.check(&client)?;
    if !admission.allowed {
        return Err(AppError::RateLimited(
            "terlalu banyak percobaan login, coba lagi nanti".to_owned(),
        )
        .into());
    }
    state.login_limiter.record(&client)?;

    let identity = state
        .admin_account_service
        .login(&payload.email, &payload.password)
        .await?;

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_ADMIN_KEY, &identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    Ok(Json(AdminIdentityResponse {
        admin_id: identity.admin_id.to_string(),
        email: identity.email,
    }))
}

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(session: Session) -> ApiResult<Json<AdminIdentityResponse>> {
    let identity = session
        .get::<AdminIdentity>(SESSION_ADMIN_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    Ok(Json(AdminIdentityResponse {
        admin_id: identity.admin_id.to_string(),
        email: identity.email,
    }))
}

/// Prefers the forwarded client address when a proxy sits in front of the API.
fn client_key(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| peer.ip().to_string())
}
