//! Customer directory handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
};
use bilemo_core::CustomerId;
use serde_json::Value;

use super::{PageParam, path_id};
use crate::error::Result;
use crate::middleware::RequireIdentity;
use crate::pagination::{Paginator, SerializedPage};
use crate::services::CustomerService;
use crate::state::AppState;

pub async fn index(
    State(state): State<AppState>,
    RequireIdentity(_): RequireIdentity,
    page: PageParam,
) -> Result<Json<SerializedPage>> {
    let page = Paginator::normalize_page(page.as_deref());
    Ok(Json(CustomerService::new(&state).list(page).await?))
}

pub async fn show(
    State(state): State<AppState>,
    RequireIdentity(_): RequireIdentity,
    path: std::result::Result<Path<String>, PathRejection>,
) -> Result<Json<Value>> {
    let id: CustomerId = path_id(path, "Customer")?;
    Ok(Json(CustomerService::new(&state).get(id).await?))
}
