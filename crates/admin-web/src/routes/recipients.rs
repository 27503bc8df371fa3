//! Recipient directory maintenance.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use database::recipient;
use database::{NewRecipient, RecipientRecord};
use serde::Deserialize;

use crate::error::Result;
use crate::state::AppState;

/// Register a recipient in an existing region.
pub async fn create(
    State(state): State<AppState>,
    Json(new_recipient): Json<NewRecipient>,
) -> Result<(StatusCode, Json<RecipientRecord>)> {
    let created = recipient::create_recipient(state.db.pool(), &new_recipient).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
pub struct ActiveFlag {
    pub active: bool,
}

/// Opt a recipient in or out of alerts.
pub async fn set_active(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(flag): Json<ActiveFlag>,
) -> Result<StatusCode> {
    recipient::set_active(state.db.pool(), id, flag.active).await?;
    Ok(StatusCode::NO_CONTENT)
}
