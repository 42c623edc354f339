use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use butik_core::{AdminIdentity, AppError};
use tower_sessions::Session;

use crate::auth::SESSION_ADMIN_KEY;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn require_admin(
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session
        .get::<AdminIdentity>(SESSION_ADMIN_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if mutates_state(request.method()) {
        let headers = request.headers();

        if headers.get("sec-fetch-site") == Some(&HeaderValue::from_static("cross-site")) {
            return Err(AppError::Unauthorized("cross-site request blocked".to_owned()).into());
        }

        let header_text = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_owned()
        };
        let origin = header_text(header::ORIGIN);
        let referer = header_text(header::REFERER);

        let storefront = state.frontend_url;
        if origin != storefront && !referer.starts_with(&storefront) {
            return Err(AppError::Unauthorized("origin validation failed".to_owned()).into());
        }
    }

    Ok(next.run(request).await)
}

fn mutates_state(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}
