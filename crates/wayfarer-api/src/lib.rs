//! Client for the travel-plans REST API.
//!
//! [`ApiClient`] wraps a base URL and a [`Session`]; it attaches the
//! bearer token and JSON headers to every call and turns failed responses
//! into [`ApiError`]s.

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod models;
pub mod session;

pub use client::ApiClient;
pub use config::ApiConfig;
pub use error::ApiError;
pub use session::{FileStorage, MemoryStorage, Session, SessionStorage, StorageError};
