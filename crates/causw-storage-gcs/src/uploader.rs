//! [`GcsUploader`], object uploads over the Cloud Storage JSON API.

use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use causw_core::{
  clock::Clock,
  upload::{FileUploader, ImageLocation},
};
use reqwest::{Client, Url, header::CONTENT_TYPE};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  path::{attachment_path, image_path},
};

/// Connection settings for a single bucket.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GcsConfig {
  /// Base URL of the storage API, without a trailing path.
  pub endpoint:           String,
  pub bucket:             String,
  /// OAuth bearer token sent with each upload. Omitted when `None`.
  pub access_token:       Option<String>,
  /// Base of an attachment's public link; `{bucket}/{path}` is appended as
  /// percent-encoded path segments.
  pub public_link_prefix: String,
}

impl Default for GcsConfig {
  fn default() -> Self {
    Self {
      endpoint:           "https://storage.googleapis.com".into(),
      bucket:             String::new(),
      access_token:       None,
      public_link_prefix: "https://storage.googleapis.com/".into(),
    }
  }
}

/// The subset of the object resource returned by an upload.
#[derive(Debug, Deserialize)]
struct ObjectResource {
  name:       String,
  #[serde(rename = "mediaLink")]
  media_link: Option<String>,
}

/// Uploads objects to one bucket.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct GcsUploader {
  client: Client,
  config: GcsConfig,
  clock:  Arc<dyn Clock>,
}

impl GcsUploader {
  pub fn new(config: GcsConfig, clock: Arc<dyn Clock>) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, config, clock })
  }

  fn upload_url(&self) -> String {
    format!(
      "{}/upload/storage/v1/b/{}/o",
      self.config.endpoint.trim_end_matches('/'),
      self.config.bucket
    )
  }

  /// `POST /upload/storage/v1/b/{bucket}/o?uploadType=media&name={path}`
  async fn put_object(&self, path: &str, data: Bytes) -> Result<ObjectResource> {
    let size = data.len();
    let mut req = self
      .client
      .post(self.upload_url())
      .query(&[("uploadType", "media"), ("name", path)])
      .header(CONTENT_TYPE, "application/octet-stream")
      .body(data);
    if let Some(token) = &self.config.access_token {
      req = req.bearer_auth(token);
    }

    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      tracing::warn!(%status, path, "object upload rejected");
      return Err(Error::Status { status: status.as_u16(), body });
    }

    let object: ObjectResource = resp.json().await?;
    tracing::info!(bucket = %self.config.bucket, name = %object.name, size, "object uploaded");
    Ok(object)
  }

  /// `{public_link_prefix}{bucket}/{path}`, each segment percent-encoded.
  fn public_link(&self, path: &str) -> Result<String> {
    let invalid = || Error::PublicLinkPrefix(self.config.public_link_prefix.clone());
    let mut url = Url::parse(&self.config.public_link_prefix).map_err(|_| invalid())?;
    url
      .path_segments_mut()
      .map_err(|()| invalid())?
      .pop_if_empty()
      .push(&self.config.bucket)
      .extend(path.split('/'));
    Ok(url.into())
  }
}

impl FileUploader for GcsUploader {
  type Error = Error;

  async fn upload_file(&self, data: Bytes, filename: String) -> Result<String> {
    let path = attachment_path(self.clock.now(), Uuid::new_v4(), &filename);
    let link = self.public_link(&path)?;
    self.put_object(&path, data).await?;
    Ok(link)
  }

  async fn upload_image(
    &self,
    data: Bytes,
    filename: String,
    location: Option<ImageLocation>,
  ) -> Result<String> {
    let path = image_path(self.clock.now(), Uuid::new_v4(), location, &filename);
    let object = self.put_object(&path, data).await?;
    object.media_link.ok_or(Error::MissingMediaLink(object.name))
  }
}
