//! Object-storage upload port.

use std::{fmt, future::Future};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// The category an uploaded image belongs to; becomes the top-level folder
/// of the stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageLocation {
  UserProfile,
  UserAdmission,
  CircleProfile,
  Post,
  #[default]
  Etc,
}

impl ImageLocation {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::UserProfile => "USER_PROFILE",
      Self::UserAdmission => "USER_ADMISSION",
      Self::CircleProfile => "CIRCLE_PROFILE",
      Self::Post => "POST",
      Self::Etc => "ETC",
    }
  }
}

impl fmt::Display for ImageLocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Uploads payloads to object storage and hands back a public URL.
///
/// Every call creates a new, uniquely named object. There is no retry.
pub trait FileUploader: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Store an attachment and return its public link.
  fn upload_file(
    &self,
    data: Bytes,
    filename: String,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;

  /// Store an image under `location` (default [`ImageLocation::Etc`]) and
  /// return the media link reported by storage.
  fn upload_image(
    &self,
    data: Bytes,
    filename: String,
    location: Option<ImageLocation>,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;
}
