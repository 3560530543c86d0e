//! Core business logic for maru.

pub mod services;

pub use services::*;
