//! End-user handlers. Every handler acts as the token's customer.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State, rejection::PathRejection},
    http::{StatusCode, header},
    response::IntoResponse,
};
use bilemo_core::UserId;
use serde_json::Value;

use super::{MALFORMED_BODY, PageParam, acknowledge, path_id};
use crate::error::{AppError, Result};
use crate::middleware::RequireIdentity;
use crate::models::{Record, UserProfile};
use crate::pagination::{Paginator, SerializedPage};
use crate::services::UserService;
use crate::state::AppState;
use crate::updater::UpdateDocument;

pub async fn index(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    page: PageParam,
) -> Result<Json<SerializedPage>> {
    let page = Paginator::normalize_page(page.as_deref());
    Ok(Json(UserService::new(&state, &identity).list(page).await?))
}

pub async fn show(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    path: std::result::Result<Path<String>, PathRejection>,
) -> Result<Json<Value>> {
    let id: UserId = path_id(path, "User")?;
    Ok(Json(UserService::new(&state, &identity).get(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let profile: UserProfile =
        serde_json::from_slice(&body).map_err(|_| AppError::BadRequest(MALFORMED_BODY.to_owned()))?;

    let user = UserService::new(&state, &identity).create(profile).await?;

    let (status, body) = acknowledge(
        StatusCode::CREATED,
        "User has been added to the database !".to_owned(),
    );
    Ok((status, [(header::LOCATION, user.self_href())], body))
}

pub async fn update(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    path: std::result::Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let id: UserId = path_id(path, "User")?;
    let document =
        UpdateDocument::from_json(&body).map_err(|_| AppError::BadRequest(MALFORMED_BODY.to_owned()))?;

    let user = UserService::new(&state, &identity)
        .update(id, &document)
        .await?;

    Ok(acknowledge(
        StatusCode::OK,
        format!("User : {} has been updated !", user.id),
    ))
}

pub async fn destroy(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    path: std::result::Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse> {
    let id: UserId = path_id(path, "User")?;
    UserService::new(&state, &identity).delete(id).await?;
    Ok(acknowledge(StatusCode::OK, "User has been removed !".to_owned()))
}
