use serde::{Deserialize, Serialize};

#[cfg(feature = "utoipa")]
use utoipa::ToSchema;

/// Uniform error body returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct ErrorResponse {
    #[cfg_attr(feature = "utoipa", schema(example = "Unauthorized"))]
    pub error_message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error_message: message.into(),
        }
    }

    /// The body sent on every authorization denial.
    pub fn unauthorized() -> Self {
        Self::new("Unauthorized")
    }
}

/// Body returned by the user resource endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct SuccessResponse {
    /// Name of the operation that served the request.
    #[cfg_attr(feature = "utoipa", schema(example = "GetGame"))]
    pub api: String,
    /// Raw `Auth-Type` header value.
    #[cfg_attr(feature = "utoipa", schema(example = "user"))]
    pub auth_type: String,
    /// `User-Id` header value, or `N/A` when absent.
    #[cfg_attr(feature = "utoipa", schema(example = "u1"))]
    pub header_user_id: String,
    /// `user_id` path parameter.
    #[cfg_attr(feature = "utoipa", schema(example = "u1"))]
    pub path_user_id: String,
    #[cfg_attr(feature = "utoipa", schema(example = "success"))]
    pub message: String,
}
