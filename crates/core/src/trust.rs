use std::fmt;

use serde::{Deserialize, Serialize};

/// Header set by the gateway to mark where a request entered the snapend.
pub const GATEWAY_HEADER: &str = "Gateway";
/// Header set by the gateway with the authentication scheme it validated.
pub const AUTH_TYPE_HEADER: &str = "Auth-Type";
/// Header set by the gateway with the authenticated user id.
pub const USER_ID_HEADER: &str = "User-Id";

/// `Gateway` header value for calls originating inside the snapend.
pub const GATEWAY_INTERNAL: &str = "internal";

/// Where a request entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayOrigin {
    /// Routed through the public gateway.
    External,
    /// Sent by another service inside the snapend. Trusted.
    Internal,
}

impl GatewayOrigin {
    /// Parse the `Gateway` header value. Anything other than `internal` is external.
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case(GATEWAY_INTERNAL) => Self::Internal,
            _ => Self::External,
        }
    }

    pub fn is_internal(self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Authentication scheme the gateway validated before forwarding the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthType {
    None,
    User,
    ApiKey,
    App,
}

impl AuthType {
    /// Parse the `Auth-Type` header value. Missing or unknown values map to [`AuthType::None`].
    pub fn from_header(value: Option<&str>) -> Self {
        let Some(raw) = value.map(str::trim) else {
            return Self::None;
        };
        match raw.to_ascii_lowercase().as_str() {
            "user" => Self::User,
            "api-key" => Self::ApiKey,
            "app" => Self::App,
            _ => Self::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::User => "user",
            Self::ApiKey => "api-key",
            Self::App => "app",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized trust signals for a single request.
///
/// Built once from the gateway headers and the resolved resource owner, then
/// only read. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustContext {
    gateway_origin: GatewayOrigin,
    auth_type: AuthType,
    caller_user_id: String,
    target_resource_user_id: String,
}

impl TrustContext {
    /// Build a context from raw header values.
    ///
    /// `resource_user_id` is the user id taken from the URL. When it is `None`
    /// the target falls back to the caller, so endpoints should only pass
    /// `None` when they bind the resource to the caller on purpose.
    pub fn from_headers(
        gateway: Option<&str>,
        auth_type: Option<&str>,
        user_id: Option<&str>,
        resource_user_id: Option<&str>,
    ) -> Self {
        let caller_user_id = user_id.map(str::trim).unwrap_or_default().to_owned();
        let target_resource_user_id = resource_user_id
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| caller_user_id.clone());

        Self {
            gateway_origin: GatewayOrigin::from_header(gateway),
            auth_type: AuthType::from_header(auth_type),
            caller_user_id,
            target_resource_user_id,
        }
    }

    /// Build a context from already-parsed signals.
    pub fn new(
        gateway_origin: GatewayOrigin,
        auth_type: AuthType,
        caller_user_id: impl Into<String>,
        target_resource_user_id: impl Into<String>,
    ) -> Self {
        Self {
            gateway_origin,
            auth_type,
            caller_user_id: caller_user_id.into(),
            target_resource_user_id: target_resource_user_id.into(),
        }
    }

    pub fn gateway_origin(&self) -> GatewayOrigin {
        self.gateway_origin
    }

    pub fn auth_type(&self) -> AuthType {
        self.auth_type
    }

    pub fn caller_user_id(&self) -> &str {
        &self.caller_user_id
    }

    pub fn target_resource_user_id(&self) -> &str {
        &self.target_resource_user_id
    }

    /// Whether the caller is acting on their own resource.
    pub fn is_resource_owner(&self) -> bool {
        !self.caller_user_id.is_empty() && self.caller_user_id == self.target_resource_user_id
    }
}
