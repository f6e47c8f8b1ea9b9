//! Handlers for `/uploads` endpoints.
//!
//! Both endpoints take a `multipart/form-data` body with a single `file`
//! part and answer `{"url": "..."}`.

use axum::{
  Json,
  extract::{Multipart, Query, State},
};
use causw_core::{
  Error,
  upload::{FileUploader, ImageLocation},
};
use serde::{Deserialize, Serialize};

use crate::{AppState, Store, auth::ActingUser, error::ApiError};

/// Name of the multipart part carrying the payload.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct Uploaded {
  pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageParams {
  pub category: Option<ImageLocation>,
}

/// Pull the `file` part's name and bytes out of the form.
async fn read_file(mut multipart: Multipart) -> Result<(String, axum::body::Bytes), ApiError> {
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| ApiError::BadRequest(e.to_string()))?
  {
    if field.name() != Some(FILE_FIELD) {
      continue;
    }
    let filename = field
      .file_name()
      .filter(|name| !name.is_empty())
      .map(str::to_owned)
      .ok_or_else(|| ApiError::BadRequest("file part has no filename".into()))?;
    let data = field
      .bytes()
      .await
      .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    return Ok((filename, data));
  }
  Err(ApiError::BadRequest(format!("missing `{FILE_FIELD}` part")))
}

/// `POST /uploads/files`
pub async fn file<S, U>(
  State(state): State<AppState<S, U>>,
  ActingUser(user_id): ActingUser,
  multipart: Multipart,
) -> Result<Json<Uploaded>, ApiError>
where
  S: Store,
  U: FileUploader + 'static,
{
  let (filename, data) = read_file(multipart).await?;
  tracing::debug!(%user_id, %filename, size = data.len(), "uploading attachment");

  let url = state
    .uploader
    .upload_file(data, filename)
    .await
    .map_err(Error::upload)?;
  Ok(Json(Uploaded { url }))
}

/// `POST /uploads/images[?category=<location>]`
pub async fn image<S, U>(
  State(state): State<AppState<S, U>>,
  ActingUser(user_id): ActingUser,
  Query(params): Query<ImageParams>,
  multipart: Multipart,
) -> Result<Json<Uploaded>, ApiError>
where
  S: Store,
  U: FileUploader + 'static,
{
  let (filename, data) = read_file(multipart).await?;
  tracing::debug!(%user_id, %filename, category = ?params.category, "uploading image");

  let url = state
    .uploader
    .upload_image(data, filename, params.category)
    .await
    .map_err(Error::upload)?;
  Ok(Json(Uploaded { url }))
}
