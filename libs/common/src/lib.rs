//! CropSync basic library
//!
//! Provides basic functions shared by the service and CLI tools, including:
//! - API response models
//! - logging functions
//! - shared serde helpers

pub mod api_types;
pub mod logging;
pub mod serde_helpers;

// Re-export commonly used API types
pub use api_types::{
    ComponentHealth, ErrorInfo, ErrorResponse, HealthStatus, ServiceStatus, SuccessResponse,
};

// Re-export AppError when axum feature is enabled
#[cfg(feature = "axum")]
pub use api_types::AppError;

// Re-export common dependencies
pub use anyhow;
pub use serde;
pub use serde_json;
pub use tokio;

/// Default bind host for service APIs
pub const DEFAULT_API_HOST: &str = "0.0.0.0";
