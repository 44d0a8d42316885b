//! Error handling for the Synchronization Service

use thiserror::Error;

/// Synchronization Service Error Type
#[derive(Error, Debug, Clone)]
pub enum SyncSrvError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Input/Output operation errors
    #[error("IO error: {0}")]
    IoError(String),

    /// Spreadsheet source errors (missing file, unreadable sheet)
    #[error("Sheet error: {0}")]
    SheetError(String),

    /// Data handling errors (serialization, parsing, conversion)
    #[error("Data error: {0}")]
    DataError(String),

    /// Storage errors (SQLite)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Barangay errors (unknown region)
    #[error("Barangay error: {0}")]
    BarangayError(String),

    /// Validation errors (invalid parameter, bad request body)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Permission errors (missing or mismatched CSRF token)
    #[error("Permission error: {0}")]
    PermissionError(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result type alias for the Synchronization Service
pub type Result<T> = std::result::Result<T, SyncSrvError>;

impl SyncSrvError {
    pub fn config(msg: impl Into<String>) -> Self {
        SyncSrvError::ConfigError(msg.into())
    }

    pub fn io(msg: impl Into<String>) -> Self {
        SyncSrvError::IoError(msg.into())
    }

    pub fn sheet(msg: impl Into<String>) -> Self {
        SyncSrvError::SheetError(msg.into())
    }

    pub fn data(msg: impl Into<String>) -> Self {
        SyncSrvError::DataError(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        SyncSrvError::StorageError(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        SyncSrvError::ValidationError(msg.into())
    }

    pub fn permission(msg: impl Into<String>) -> Self {
        SyncSrvError::PermissionError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        SyncSrvError::InternalError(msg.into())
    }

    // Convenience constructors for specific cases
    pub fn unknown_barangay(name: impl std::fmt::Display) -> Self {
        SyncSrvError::BarangayError(format!("Unknown barangay: {}", name))
    }

    pub fn sheet_not_found(path: impl std::fmt::Display) -> Self {
        SyncSrvError::SheetError(format!("Sheet not found: {}", path))
    }
}

// ============================================================================
// From implementations for external error types
// ============================================================================

impl From<std::io::Error> for SyncSrvError {
    fn from(err: std::io::Error) -> Self {
        SyncSrvError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for SyncSrvError {
    fn from(err: serde_json::Error) -> Self {
        SyncSrvError::DataError(format!("JSON: {err}"))
    }
}

impl From<serde_yaml::Error> for SyncSrvError {
    fn from(err: serde_yaml::Error) -> Self {
        SyncSrvError::DataError(format!("YAML: {err}"))
    }
}

impl From<sqlx::Error> for SyncSrvError {
    fn from(err: sqlx::Error) -> Self {
        SyncSrvError::StorageError(format!("SQLite: {err}"))
    }
}

impl From<csv::Error> for SyncSrvError {
    fn from(err: csv::Error) -> Self {
        SyncSrvError::SheetError(format!("CSV: {err}"))
    }
}

impl From<anyhow::Error> for SyncSrvError {
    fn from(err: anyhow::Error) -> Self {
        SyncSrvError::InternalError(err.to_string())
    }
}

// ============================================================================
// API Adaptation: SyncSrvError → AppError conversion
// ============================================================================

impl From<SyncSrvError> for common::AppError {
    fn from(err: SyncSrvError) -> Self {
        use common::AppError;

        match &err {
            SyncSrvError::ValidationError(_) | SyncSrvError::BarangayError(_) => {
                AppError::bad_request(err.to_string())
            },
            SyncSrvError::PermissionError(_) => AppError::forbidden(err.to_string()),
            SyncSrvError::SheetError(_) => {
                AppError::service_unavailable(err.to_string())
            },
            SyncSrvError::ConfigError(_)
            | SyncSrvError::IoError(_)
            | SyncSrvError::DataError(_)
            | SyncSrvError::StorageError(_)
            | SyncSrvError::InternalError(_) => AppError::internal_error(err.to_string()),
        }
    }
}

impl axum::response::IntoResponse for SyncSrvError {
    fn into_response(self) -> axum::response::Response {
        common::AppError::from(self).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_error_http_mapping() {
        let err: common::AppError = SyncSrvError::unknown_barangay("Atlantis").into();
        assert_eq!(err.status.as_u16(), 400);

        let err: common::AppError = SyncSrvError::permission("CSRF token mismatch").into();
        assert_eq!(err.status.as_u16(), 403);

        let err: common::AppError = SyncSrvError::storage("disk full").into();
        assert_eq!(err.status.as_u16(), 500);
    }

    #[test]
    fn test_error_display() {
        let err = SyncSrvError::sheet_not_found("config/sheets/poblacion.csv");
        assert_eq!(
            err.to_string(),
            "Sheet error: Sheet not found: config/sheets/poblacion.csv"
        );
    }
}
