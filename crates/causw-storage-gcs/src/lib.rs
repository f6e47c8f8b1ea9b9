//! Google Cloud Storage adapter for the CAUSW platform.
//!
//! Implements [`FileUploader`](causw_core::upload::FileUploader) with the
//! JSON API's simple media upload. Object names combine the upload time with
//! a fresh random id so repeated uploads of the same file never overwrite
//! each other.

mod path;
mod uploader;

pub mod error;

pub use error::{Error, Result};
pub use path::{attachment_path, image_path};
pub use uploader::{GcsConfig, GcsUploader};

#[cfg(test)]
mod tests;
