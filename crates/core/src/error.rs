//! Error types for the a2t core.

use crate::types::ErrorDetail;
use serde::{Deserialize, Serialize};

/// Result type for catalog operations.
pub type A2tResult<T> = Result<T, A2tError>;

/// Errors raised by providers and the query engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum A2tError {
    /// No tool registered under this name.
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// No group registered under this id.
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    /// The provider does not implement the requested capability tier.
    #[error("{0} not supported")]
    NotSupported(String),

    /// Offset or limit was negative.
    #[error("Invalid pagination: {field} must not be negative (got {value})")]
    InvalidPagination { field: &'static str, value: i64 },

    /// A tool with this name is already registered.
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    /// A group with this id is already registered.
    #[error("Group already registered: {0}")]
    DuplicateGroup(String),

    #[error("Invalid tool: {0}")]
    InvalidTool(String),

    #[error("Invalid group: {0}")]
    InvalidGroup(String),
}

impl A2tError {
    /// Shorthand for the groups capability check.
    pub fn groups_not_supported() -> Self {
        Self::NotSupported("groups".to_string())
    }

    /// Protocol error code this error is reported under.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::ToolNotFound(_) => ErrorCode::ToolNotFound,
            Self::GroupNotFound(_) => ErrorCode::GroupNotFound,
            Self::NotSupported(_) => ErrorCode::NotSupported,
            Self::InvalidPagination { .. }
            | Self::DuplicateTool(_)
            | Self::DuplicateGroup(_)
            | Self::InvalidTool(_)
            | Self::InvalidGroup(_) => ErrorCode::InvalidRequest,
        }
    }

    /// Whether the error is catalog-level data rather than a malformed request.
    /// Protocol errors travel in a 200-class body.
    pub fn is_protocol_error(&self) -> bool {
        self.code() != ErrorCode::InvalidRequest
    }

    pub fn to_detail(&self) -> ErrorDetail {
        ErrorDetail::new(self.code(), self.to_string())
    }
}

impl From<A2tError> for ErrorDetail {
    fn from(err: A2tError) -> Self {
        err.to_detail()
    }
}

/// Protocol error codes as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ToolNotFound,
    ExecutionError,
    GroupNotFound,
    NotSupported,
    InvalidRequest,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToolNotFound => "tool_not_found",
            Self::ExecutionError => "execution_error",
            Self::GroupNotFound => "group_not_found",
            Self::NotSupported => "not_supported",
            Self::InvalidRequest => "invalid_request",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
