//! Teaching contract API handlers

use axum::{
    body::Body,
    extract::{
        multipart::Field,
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Multipart, Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::BytesMut;
use staffing_core::error::StaffingError;
use staffing_core::traits::Id;
use staffing_services::SignatureUpload;
use staffing_validation::{ContractDraft, ListFilterDraft, StatusOverrideDraft};
use tracing::debug;

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser, Pagination};

/// POST /teaching-contracts
pub async fn create_contract(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<ContractDraft>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(draft) = payload?;
    let contract = state.contracts.create(user.caller(), &draft).await?;
    Ok((StatusCode::CREATED, Json(contract)))
}

/// GET /teaching-contracts
pub async fn list_contracts(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Pagination(page): Pagination,
    filters: Result<Query<ListFilterDraft>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(filters) = filters?;
    let page = state.contracts.list(user.caller(), &filters, page).await?;
    Ok(Json(page))
}

/// GET /teaching-contracts/:id
pub async fn get_contract(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    id: Result<Path<Id>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = id?;
    let view = state.contracts.detail(user.caller(), id).await?;
    Ok(Json(view))
}

/// GET /teaching-contracts/:id/pdf
pub async fn contract_pdf(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    id: Result<Path<Id>, PathRejection>,
) -> ApiResult<Response> {
    let Path(id) = id?;
    let pdf = state.contracts.render(user.caller(), id).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", pdf.filename()),
        )
        .header(header::CACHE_CONTROL, "no-store")
        .body(Body::from(pdf.bytes))
        .map_err(|e| StaffingError::Internal(e.to_string()).into())
}

/// POST /teaching-contracts/:id/signature
///
/// Multipart form with a `file` part and a `who` text part.
pub async fn submit_signature(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    id: Result<Path<Id>, PathRejection>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = id?;
    let max_bytes = state.contracts.config().signature_max_bytes;

    let mut who: Option<String> = None;
    let mut upload: Option<SignatureUpload> = None;
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("who") => who = Some(field.text().await?),
            Some("file") => upload = Some(read_upload(field, max_bytes).await?),
            other => debug!(field = ?other, "Ignoring multipart field"),
        }
    }

    let contract = state
        .contracts
        .submit_signature(user.caller(), id, who.as_deref(), upload)
        .await?;
    Ok(Json(contract))
}

/// Buffer a file part, refusing to hold more than `max_bytes`
async fn read_upload(mut field: Field<'_>, max_bytes: usize) -> ApiResult<SignatureUpload> {
    let content_type = field.content_type().map(str::to_string);
    let filename = field.file_name().map(str::to_string);

    let mut data = BytesMut::new();
    while let Some(chunk) = field.chunk().await? {
        data.extend_from_slice(&chunk);
        if data.len() > max_bytes {
            return Err(StaffingError::PayloadTooLarge {
                size: data.len(),
                max: max_bytes,
            }
            .into());
        }
    }

    Ok(SignatureUpload {
        content_type,
        filename,
        data: data.freeze(),
    })
}

/// PATCH /teaching-contracts/:id/status
pub async fn override_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    id: Result<Path<Id>, PathRejection>,
    payload: Result<Json<StatusOverrideDraft>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = id?;
    let Json(draft) = payload?;
    let contract = state.contracts.override_status(user.caller(), id, &draft).await?;
    Ok(Json(contract))
}

/// DELETE /teaching-contracts/:id
pub async fn delete_contract(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    id: Result<Path<Id>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    state.contracts.delete(user.caller(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
