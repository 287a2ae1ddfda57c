//! Phone catalog handlers.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State, rejection::PathRejection},
    http::{StatusCode, header},
    response::IntoResponse,
};
use bilemo_core::PhoneId;
use serde_json::Value;

use super::{MALFORMED_BODY, PageParam, acknowledge, path_id};
use crate::error::{AppError, Result};
use crate::middleware::RequireIdentity;
use crate::models::{PhoneDetails, Record};
use crate::pagination::{Paginator, SerializedPage};
use crate::services::PhoneService;
use crate::state::AppState;
use crate::updater::UpdateDocument;

/// List the catalog. Paged only when `?page=` is present.
pub async fn index(
    State(state): State<AppState>,
    RequireIdentity(_): RequireIdentity,
    page: PageParam,
) -> Result<Json<SerializedPage>> {
    let page = page
        .as_deref()
        .map(|raw| Paginator::normalize_page(Some(raw)));
    Ok(Json(PhoneService::new(&state).list(page).await?))
}

pub async fn show(
    State(state): State<AppState>,
    RequireIdentity(_): RequireIdentity,
    path: std::result::Result<Path<String>, PathRejection>,
) -> Result<Json<Value>> {
    let id: PhoneId = path_id(path, "Phone")?;
    Ok(Json(PhoneService::new(&state).get(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    RequireIdentity(_): RequireIdentity,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let draft: PhoneDetails =
        serde_json::from_slice(&body).map_err(|_| AppError::BadRequest(MALFORMED_BODY.to_owned()))?;

    let phone = PhoneService::new(&state).create(draft).await?;

    let (status, body) = acknowledge(
        StatusCode::CREATED,
        "Phone has been added to the database !".to_owned(),
    );
    Ok((status, [(header::LOCATION, phone.self_href())], body))
}

pub async fn update(
    State(state): State<AppState>,
    RequireIdentity(_): RequireIdentity,
    path: std::result::Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let id: PhoneId = path_id(path, "Phone")?;
    let document =
        UpdateDocument::from_json(&body).map_err(|_| AppError::BadRequest(MALFORMED_BODY.to_owned()))?;

    let phone = PhoneService::new(&state).update(id, &document).await?;

    Ok(acknowledge(
        StatusCode::OK,
        format!("Phone : {} has been updated !", phone.id),
    ))
}

pub async fn destroy(
    State(state): State<AppState>,
    RequireIdentity(_): RequireIdentity,
    path: std::result::Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse> {
    let id: PhoneId = path_id(path, "Phone")?;
    PhoneService::new(&state).delete(id).await?;
    Ok(acknowledge(StatusCode::OK, "Phone has been removed !".to_owned()))
}
