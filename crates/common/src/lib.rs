//! Common utilities and shared types for maru.
//!
//! This crate provides foundational components used across all maru crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Access tokens**: Cookie-borne JWT minting/verification via [`TokenCodec`]
//! - **Storage**: File storage backends (local, S3-compatible)

pub mod config;
pub mod error;
pub mod id;
pub mod storage;
pub mod token;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use storage::{LocalStorage, StorageBackend, StoredImage};
pub use token::{AccessTokenClaims, TokenCodec};
