use std::str::FromStr;

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use butik_application::{FormUpdate, RegionLevel, SessionId, StepOutcome};
use butik_core::AppError;
use butik_domain::{ProductId, ProofImage, RegionRef, ShippingMethod};
use uuid::Uuid;

use crate::dto::{
    AdvanceResponse, CheckoutSessionResponse, SelectRegionRequest, StartCheckoutRequest,
    SubmitOrderResponse, UpdateFormRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn start_session_handler(
    State(state): State<AppState>,
    Json(payload): Json<StartCheckoutRequest>,
) -> ApiResult<(StatusCode, Json<CheckoutSessionResponse>)> {
    let product_uuid = Uuid::parse_str(&payload.product_id)
        .map_err(|error| AppError::Validation(format!("invalid product id: {error}")))?;

    let (session_id, session) = state
        .checkout_service
        .start_session(
            ProductId::from_uuid(product_uuid),
            payload.quantity,
            &payload.fingerprint,
            &payload.environment,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutSessionResponse::from_session(
            &session_id.to_string(),
            &session,
        )),
    ))
}

pub async fn session_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<CheckoutSessionResponse>> {
    let id = SessionId::from_uuid(session_id);
    let session = state.checkout_service.session(id)?;

    Ok(Json(CheckoutSessionResponse::from_session(
        &id.to_string(),
        &session,
    )))
}

pub async fn update_form_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<UpdateFormRequest>,
) -> ApiResult<Json<CheckoutSessionResponse>> {
    let shipping_method = payload
        .shipping_method
        .as_deref()
        .map(ShippingMethod::from_str)
        .transpose()?;

    let id = SessionId::from_uuid(session_id);
    let session = state.checkout_service.update_form(
        id,
        FormUpdate {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            address_detail: payload.address_detail,
            shipping_method,
            data_confirmed: payload.data_confirmed,
        },
    )?;

    Ok(Json(CheckoutSessionResponse::from_session(
        &id.to_string(),
        &session,
    )))
}

pub async fn select_region_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<SelectRegionRequest>,
) -> ApiResult<Json<CheckoutSessionResponse>> {
    let level = match payload.level.as_str() {
        "province" => RegionLevel::Province,
        "regency" => RegionLevel::Regency,
        "district" => RegionLevel::District,
        "village" => RegionLevel::Village,
        other => {
            return Err(AppError::Validation(format!("unknown region level '{other}'")).into());
        }
    };

    let id = SessionId::from_uuid(session_id);
    let session = state.checkout_service.select_region(
        id,
        level,
        RegionRef {
            id: payload.id,
            name: payload.name,
        },
    )?;

    Ok(Json(CheckoutSessionResponse::from_session(
        &id.to_string(),
        &session,
    )))
}

pub async fn advance_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<AdvanceResponse>> {
    let id = SessionId::from_uuid(session_id);
    let outcome = state.checkout_service.advance(id)?;
    let session = state.checkout_service.session(id)?;

    let (moved, field_errors) = match outcome {
        StepOutcome::Advanced(_) => (true, Default::default()),
        StepOutcome::Blocked(errors) => (false, errors),
    };

    Ok(Json(AdvanceResponse {
        moved,
        session: CheckoutSessionResponse::from_session(&id.to_string(), &session),
        field_errors,
    }))
}

pub async fn back_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<CheckoutSessionResponse>> {
    let id = SessionId::from_uuid(session_id);
    state.checkout_service.back(id)?;
    let session = state.checkout_service.session(id)?;

    Ok(Json(CheckoutSessionResponse::from_session(
        &id.to_string(),
        &session,
    )))
}

pub async fn submit_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<SubmitOrderResponse>)> {
    let proof = read_proof(multipart).await?;

    let submitted = state
        .checkout_service
        .submit(SessionId::from_uuid(session_id), proof)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitOrderResponse {
            order_id: submitted.order_id.to_string(),
            order_number: submitted.order_number.to_string(),
            confirmation_code: submitted.confirmation_code.as_str().to_owned(),
            total_price: submitted.total_price,
        }),
    ))
}

pub async fn abandon_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .checkout_service
        .abandon(SessionId::from_uuid(session_id))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Pulls the `proof` file out of the multipart body.
async fn read_proof(mut multipart: Multipart) -> ApiResult<ProofImage> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| AppError::Validation(format!("invalid multipart body: {error}")))?
    {
        if field.name() != Some("proof") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("bukti-pembayaran").to_owned();
        let content_type = field.content_type().unwrap_or_default().to_owned();
        let bytes = field
            .bytes()
            .await
            .map_err(|error| AppError::Validation(format!("failed to read proof file: {error}")))?
            .to_vec();

        return Ok(ProofImage {
            file_name,
            content_type,
            bytes,
        });
    }

    Err(AppError::Validation("Bukti pembayaran wajib diunggah".to_owned()).into())
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::body::Body;
    use axum::extract::{DefaultBodyLimit, Multipart};
    use axum::http::{Request, StatusCode, header};
    use axum::response::IntoResponse;
    use axum::routing::post;
    use butik_domain::MAX_PROOF_BYTES;
    use tower::ServiceExt;

    use super::read_proof;
    use crate::PROOF_UPLOAD_LIMIT_BYTES;

    const BOUNDARY: &str = "butik-proof-test";

    fn multipart_body(proof_len: usize) -> Vec<u8> {
        let mut body = Vec::with_capacity(proof_len + 256);
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"proof\"; filename=\"bukti.jpg\"\r\n",
        );
        body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
        body.extend(vec![0xAB_u8; proof_len]);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn proof_router() -> Router {
        Router::new()
            .route(
                "/submit",
                post(|multipart: Multipart| async move {
                    match read_proof(multipart).await {
                        Ok(proof) => {
                            (StatusCode::CREATED, proof.bytes.len().to_string()).into_response()
                        }
                        Err(error) => error.into_response(),
                    }
                }),
            )
            .layer(DefaultBodyLimit::max(PROOF_UPLOAD_LIMIT_BYTES))
    }

    fn submit_request(proof_len: usize) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/submit")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(proof_len)))
            .unwrap_or_else(|_| unreachable!())
    }

    #[tokio::test]
    async fn full_size_proof_passes_the_body_limit() {
        let router = proof_router();
        let response = router
            .oneshot(submit_request(MAX_PROOF_BYTES))
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = axum::body::to_bytes(response.into_body(), 64)
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(body, MAX_PROOF_BYTES.to_string().as_bytes());
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected_at_the_body_limit() {
        let router = proof_router();
        let response = router
            .oneshot(submit_request(PROOF_UPLOAD_LIMIT_BYTES))
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
