//! Core types, ports and application services for the CAUSW club platform.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage and object-storage backends implement the traits in [`store`] and
//! [`upload`]; the API layer drives the services in [`service`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod board;
pub mod clock;
pub mod dto;
pub mod error;
pub mod locker;
pub mod service;
pub mod settings;
pub mod store;
pub mod upload;
pub mod user;
pub mod validation;

pub use error::{Error, ErrorKind, Result};
