//! Error type for `causw-storage-gcs`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// Storage answered with a non-success status.
  #[error("storage returned {status}: {body}")]
  Status { status: u16, body: String },

  #[error("storage response carried no media link for {0:?}")]
  MissingMediaLink(String),

  /// `public_link_prefix` is not an absolute URL that can carry a path.
  #[error("invalid public link prefix {0:?}")]
  PublicLinkPrefix(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
