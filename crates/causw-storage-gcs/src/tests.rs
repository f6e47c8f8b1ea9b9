//! Upload tests against a local fake of the storage JSON API.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex},
};

use axum::{
  Json, Router,
  body::Bytes,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode, header::AUTHORIZATION},
  response::{IntoResponse, Response},
  routing::post,
};
use chrono::{TimeZone, Utc};
use reqwest::Url;
use causw_core::{
  clock::FixedClock,
  upload::{FileUploader, ImageLocation},
};

use crate::{Error, GcsConfig, GcsUploader};

#[derive(Debug, Clone)]
struct Upload {
  bucket: String,
  name:   String,
  auth:   Option<String>,
  body:   Vec<u8>,
}

#[derive(Clone, Default)]
struct Recorded(Arc<Mutex<Vec<Upload>>>);

impl Recorded {
  fn all(&self) -> Vec<Upload> { self.0.lock().unwrap().clone() }
}

async fn fake_upload(
  State(recorded): State<Recorded>,
  Path(bucket): Path<String>,
  Query(query): Query<HashMap<String, String>>,
  headers: HeaderMap,
  body: Bytes,
) -> Response {
  if bucket == "forbidden" {
    return (StatusCode::FORBIDDEN, "denied").into_response();
  }
  let name = query.get("name").cloned().unwrap_or_default();
  recorded.0.lock().unwrap().push(Upload {
    bucket: bucket.clone(),
    name:   name.clone(),
    auth:   headers
      .get(AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .map(str::to_owned),
    body:   body.to_vec(),
  });

  if bucket == "linkless" {
    return Json(serde_json::json!({ "name": name, "bucket": bucket })).into_response();
  }
  Json(serde_json::json!({
    "name": name,
    "bucket": bucket,
    "mediaLink": format!("http://fake/download/{bucket}/{name}"),
  }))
  .into_response()
}

async fn serve(recorded: Recorded) -> String {
  let app = Router::new()
    .route("/upload/storage/v1/b/{bucket}/o", post(fake_upload))
    .with_state(recorded);
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
  format!("http://{addr}")
}

fn uploader(endpoint: String, bucket: &str) -> GcsUploader {
  let config = GcsConfig {
    endpoint,
    bucket: bucket.into(),
    access_token: Some("token-1".into()),
    public_link_prefix: "https://storage.googleapis.com/".into(),
  };
  let clock = FixedClock(Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap());
  GcsUploader::new(config, Arc::new(clock)).unwrap()
}

#[tokio::test]
async fn upload_file_returns_public_link() {
  let recorded = Recorded::default();
  let endpoint = serve(recorded.clone()).await;

  let link = uploader(endpoint, "causw")
    .upload_file(Bytes::from_static(b"%PDF"), "minutes.pdf".into())
    .await
    .unwrap();

  let uploads = recorded.all();
  assert_eq!(uploads.len(), 1);
  assert_eq!(uploads[0].bucket, "causw");
  let name = &uploads[0].name;
  assert!(name.starts_with("ATTACHMENTS/2024-03-05-14-07-09-000+0000/"));
  assert!(name.ends_with("_minutes.pdf"));
  assert_eq!(link, format!("https://storage.googleapis.com/causw/{name}"));
  assert_eq!(uploads[0].auth.as_deref(), Some("Bearer token-1"));
  assert_eq!(uploads[0].body, b"%PDF");
}

#[tokio::test]
async fn upload_image_returns_media_link() {
  let recorded = Recorded::default();
  let endpoint = serve(recorded.clone()).await;

  let link = uploader(endpoint, "causw")
    .upload_image(
      Bytes::from_static(b"\x89PNG"),
      "club logo.png".into(),
      Some(ImageLocation::CircleProfile),
    )
    .await
    .unwrap();

  let name = recorded.all()[0].name.clone();
  assert!(name.starts_with("CIRCLE_PROFILE/2024-03-05/14-07-09-000+0000_"));
  assert!(name.ends_with("_club logo.png"));
  assert_eq!(link, format!("http://fake/download/causw/{name}"));
}

#[tokio::test]
async fn public_link_encodes_reserved_characters() {
  let recorded = Recorded::default();
  let endpoint = serve(recorded.clone()).await;

  let link = uploader(endpoint, "causw")
    .upload_file(Bytes::from_static(b"%PDF"), "report #1?.pdf".into())
    .await
    .unwrap();

  let name = recorded.all()[0].name.clone();
  assert!(name.ends_with("_report #1?.pdf"));

  let url = Url::parse(&link).unwrap();
  assert_eq!(url.fragment(), None);
  assert_eq!(url.query(), None);
  let segments: Vec<&str> = url.path_segments().unwrap().collect();
  assert_eq!(segments.len(), 4);
  assert_eq!(segments[0], "causw");
  assert_eq!(segments[1], "ATTACHMENTS");
  assert!(segments[3].ends_with("_report%20%231%3F.pdf"));
}

#[tokio::test]
async fn invalid_public_link_prefix_is_rejected_before_upload() {
  let recorded = Recorded::default();
  let endpoint = serve(recorded.clone()).await;
  let config = GcsConfig {
    endpoint,
    bucket: "causw".into(),
    access_token: None,
    public_link_prefix: "not a url".into(),
  };
  let clock = FixedClock(Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap());
  let up = GcsUploader::new(config, Arc::new(clock)).unwrap();

  let err = up
    .upload_file(Bytes::from_static(b"x"), "x.txt".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PublicLinkPrefix(ref p) if p == "not a url"));
  assert!(recorded.all().is_empty());
}

#[tokio::test]
async fn each_upload_creates_a_new_object() {
  let recorded = Recorded::default();
  let endpoint = serve(recorded.clone()).await;
  let up = uploader(endpoint, "causw");

  up.upload_image(Bytes::from_static(b"a"), "a.png".into(), None).await.unwrap();
  up.upload_image(Bytes::from_static(b"b"), "a.png".into(), None).await.unwrap();

  let uploads = recorded.all();
  assert_eq!(uploads.len(), 2);
  assert!(uploads[0].name.starts_with("ETC/2024-03-05/14-07-09-000+0000_"));
  assert!(uploads[1].name.ends_with("_a.png"));
  assert_ne!(uploads[0].name, uploads[1].name);
}

#[tokio::test]
async fn rejected_upload_surfaces_status() {
  let endpoint = serve(Recorded::default()).await;

  let err = uploader(endpoint, "forbidden")
    .upload_file(Bytes::from_static(b"x"), "x.txt".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Status { status: 403, ref body } if body == "denied"));
}

#[tokio::test]
async fn missing_media_link_is_an_error() {
  let endpoint = serve(Recorded::default()).await;

  let err = uploader(endpoint, "linkless")
    .upload_image(Bytes::from_static(b"x"), "x.png".into(), None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::MissingMediaLink(_)));
}

#[tokio::test]
async fn unreachable_endpoint_is_an_http_error() {
  let err = uploader("http://127.0.0.1:1".into(), "causw")
    .upload_file(Bytes::from_static(b"x"), "x.txt".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Http(_)));
}
