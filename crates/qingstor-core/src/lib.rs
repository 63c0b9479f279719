//! Client configuration and shared types for the QingStor SDK.
//!
//! This crate provides the building blocks every other SDK crate depends on:
//! the client-wide [`ClientConfig`], the [`Zone`] identifier and the
//! [`DocumentFormat`] used for structured bodies.

mod config;
mod error;
mod types;

pub use config::{ClientConfig, DEFAULT_CHUNK_SIZE};
pub use error::{CoreError, CoreResult};
pub use types::{DocumentFormat, Zone};
