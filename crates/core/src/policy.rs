use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;
use crate::trust::{AuthType, TrustContext};

/// A trust level an endpoint may accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrustLevel {
    /// Call originated inside the snapend (`Gateway: internal`).
    Internal,
    /// Gateway validated an API key.
    ApiKey,
    /// Gateway validated an app key. Never implied by [`TrustLevel::ApiKey`].
    App,
    /// Gateway validated a user token and the caller owns the target resource.
    User,
}

impl TrustLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::ApiKey => "api-key",
            Self::App => "app",
            Self::User => "user",
        }
    }

    /// Whether the given context satisfies this level on its own.
    pub fn is_satisfied_by(self, ctx: &TrustContext) -> bool {
        let internal = ctx.gateway_origin().is_internal();
        match self {
            Self::Internal => internal,
            Self::ApiKey => !internal && ctx.auth_type() == AuthType::ApiKey,
            Self::App => !internal && ctx.auth_type() == AuthType::App,
            Self::User => {
                !internal && ctx.auth_type() != AuthType::ApiKey && ctx.is_resource_owner()
            }
        }
    }
}

impl fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrustLevel {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "internal" => Ok(Self::Internal),
            "api-key" | "api_key" => Ok(Self::ApiKey),
            "app" => Ok(Self::App),
            "user" => Ok(Self::User),
            other => Err(PolicyError::UnknownLevel(other.to_owned())),
        }
    }
}

/// Where the gate finds the user id of the resource being acted on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceBinding {
    /// Read the target user id from the named path parameter.
    PathParam(String),
    /// The resource is the caller's own. The `user` level then passes for
    /// any authenticated user.
    Caller,
}

impl ResourceBinding {
    pub fn path_param(name: impl Into<String>) -> Self {
        Self::PathParam(name.into())
    }
}

/// Status returned when no level matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DenialStatus {
    /// 401: the auth combination is not accepted by this endpoint.
    #[default]
    Unauthorized,
    /// 403: the caller is authenticated but the resource is not theirs.
    Forbidden,
}

impl DenialStatus {
    pub fn status_code(self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
        }
    }
}

/// Ordered set of trust levels attached to one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationPolicy {
    levels: Vec<TrustLevel>,
    resource: ResourceBinding,
    denial: DenialStatus,
}

impl AuthorizationPolicy {
    /// Create a policy. Duplicate levels are dropped, keeping the first occurrence.
    pub fn new(
        levels: impl IntoIterator<Item = TrustLevel>,
        resource: ResourceBinding,
    ) -> Result<Self, PolicyError> {
        let mut ordered: Vec<TrustLevel> = Vec::new();
        for level in levels {
            if !ordered.contains(&level) {
                ordered.push(level);
            }
        }
        if ordered.is_empty() {
            return Err(PolicyError::Empty);
        }
        if let ResourceBinding::PathParam(name) = &resource
            && name.trim().is_empty()
        {
            return Err(PolicyError::EmptyPathParam);
        }
        Ok(Self {
            levels: ordered,
            resource,
            denial: DenialStatus::default(),
        })
    }

    /// Set the status returned on denial.
    #[must_use]
    pub fn with_denial(mut self, denial: DenialStatus) -> Self {
        self.denial = denial;
        self
    }

    pub fn levels(&self) -> &[TrustLevel] {
        &self.levels
    }

    pub fn resource(&self) -> &ResourceBinding {
        &self.resource
    }

    pub fn denial(&self) -> DenialStatus {
        self.denial
    }

    /// Name of the path parameter holding the target user id, if any.
    pub fn resource_param(&self) -> Option<&str> {
        match &self.resource {
            ResourceBinding::PathParam(name) => Some(name),
            ResourceBinding::Caller => None,
        }
    }
}

/// Outcome of evaluating a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The first level, in policy order, that the context satisfied.
    Allow(TrustLevel),
    Deny(DenialStatus),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow(_))
    }
}

/// Evaluate `policy` against `ctx`, stopping at the first satisfied level.
pub fn authorize(ctx: &TrustContext, policy: &AuthorizationPolicy) -> Decision {
    policy
        .levels
        .iter()
        .copied()
        .find(|level| level.is_satisfied_by(ctx))
        .map_or(Decision::Deny(policy.denial), Decision::Allow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trust::GatewayOrigin;

    fn policy(levels: &[TrustLevel]) -> AuthorizationPolicy {
        AuthorizationPolicy::new(levels.iter().copied(), ResourceBinding::path_param("user_id"))
            .unwrap()
    }

    fn ctx(origin: GatewayOrigin, auth: AuthType, caller: &str, target: &str) -> TrustContext {
        TrustContext::new(origin, auth, caller, target)
    }

    /// Reference oracle for the `{internal, api-key, user}` policy.
    fn expected_full(c: &TrustContext) -> bool {
        if c.gateway_origin() == GatewayOrigin::Internal {
            return true;
        }
        if c.auth_type() == AuthType::ApiKey {
            return true;
        }
        !c.caller_user_id().is_empty() && c.caller_user_id() == c.target_resource_user_id()
    }

    #[test]
    fn full_policy_truth_table() {
        let p = policy(&[TrustLevel::Internal, TrustLevel::ApiKey, TrustLevel::User]);
        let origins = [GatewayOrigin::External, GatewayOrigin::Internal];
        let auths = [AuthType::None, AuthType::User, AuthType::ApiKey, AuthType::App];
        let ids = ["", "u1", "u2"];

        let mut rows = 0;
        for origin in origins {
            for auth in auths {
                for caller in ids {
                    for target in ids {
                        let c = ctx(origin, auth, caller, target);
                        let decision = authorize(&c, &p);
                        assert_eq!(
                            decision.is_allowed(),
                            expected_full(&c),
                            "origin={origin:?} auth={auth:?} caller={caller:?} target={target:?}"
                        );
                        rows += 1;
                    }
                }
            }
        }
        assert_eq!(rows, 2 * 4 * 3 * 3);
    }

    #[test]
    fn internal_origin_bypasses_everything() {
        let p = policy(&[TrustLevel::Internal, TrustLevel::ApiKey, TrustLevel::User]);
        let c = TrustContext::from_headers(Some("internal"), None, None, Some("u2"));
        assert_eq!(authorize(&c, &p), Decision::Allow(TrustLevel::Internal));
    }

    #[test]
    fn internal_only_policy_denies_everything_external() {
        let p = policy(&[TrustLevel::Internal]);
        let cases = [
            ctx(GatewayOrigin::External, AuthType::ApiKey, "u1", "u1"),
            ctx(GatewayOrigin::External, AuthType::User, "u1", "u1"),
            ctx(GatewayOrigin::External, AuthType::App, "u1", "u1"),
            ctx(GatewayOrigin::External, AuthType::None, "", ""),
        ];
        for c in &cases {
            assert_eq!(authorize(c, &p), Decision::Deny(DenialStatus::Unauthorized));
        }
    }

    #[test]
    fn user_acting_on_another_user_is_denied() {
        let p = policy(&[TrustLevel::Internal, TrustLevel::ApiKey, TrustLevel::User]);
        let c = TrustContext::from_headers(None, Some("user"), Some("u1"), Some("u2"));
        assert_eq!(authorize(&c, &p), Decision::Deny(DenialStatus::Unauthorized));
    }

    #[test]
    fn api_key_does_not_pass_the_user_level() {
        let p = policy(&[TrustLevel::User]);
        let c = ctx(GatewayOrigin::External, AuthType::ApiKey, "u1", "u1");
        assert!(!authorize(&c, &p).is_allowed());
    }

    #[test]
    fn app_requires_explicit_level() {
        let without_app = policy(&[TrustLevel::Internal, TrustLevel::ApiKey]);
        let with_app = policy(&[TrustLevel::Internal, TrustLevel::ApiKey, TrustLevel::App]);
        let c = ctx(GatewayOrigin::External, AuthType::App, "", "u9");

        assert!(!authorize(&c, &without_app).is_allowed());
        assert_eq!(authorize(&c, &with_app), Decision::Allow(TrustLevel::App));
    }

    #[test]
    fn first_declared_level_wins() {
        let p = policy(&[TrustLevel::User, TrustLevel::Internal]);
        // Internal origin never satisfies `user`, so `internal` is reported.
        let c = ctx(GatewayOrigin::Internal, AuthType::User, "u1", "u1");
        assert_eq!(authorize(&c, &p), Decision::Allow(TrustLevel::Internal));

        let p = policy(&[TrustLevel::User, TrustLevel::App]);
        let c = ctx(GatewayOrigin::External, AuthType::App, "u1", "u1");
        assert_eq!(authorize(&c, &p), Decision::Allow(TrustLevel::User));
    }

    #[test]
    fn forbidden_denial_status() {
        let p = policy(&[TrustLevel::User]).with_denial(DenialStatus::Forbidden);
        let c = ctx(GatewayOrigin::External, AuthType::User, "u1", "u2");
        let decision = authorize(&c, &p);
        assert_eq!(decision, Decision::Deny(DenialStatus::Forbidden));
        assert_eq!(DenialStatus::Forbidden.status_code(), 403);
    }

    #[test]
    fn empty_policy_is_rejected() {
        let err = AuthorizationPolicy::new([], ResourceBinding::Caller).unwrap_err();
        assert!(matches!(err, PolicyError::Empty));
    }

    #[test]
    fn blank_path_param_is_rejected() {
        let err = AuthorizationPolicy::new([TrustLevel::User], ResourceBinding::path_param(" "))
            .unwrap_err();
        assert!(matches!(err, PolicyError::EmptyPathParam));
    }

    #[test]
    fn duplicate_levels_are_collapsed() {
        let p = policy(&[TrustLevel::ApiKey, TrustLevel::Internal, TrustLevel::ApiKey]);
        assert_eq!(p.levels(), &[TrustLevel::ApiKey, TrustLevel::Internal]);
    }

    #[test]
    fn level_parsing() {
        assert_eq!("api-key".parse::<TrustLevel>().unwrap(), TrustLevel::ApiKey);
        assert_eq!("Internal".parse::<TrustLevel>().unwrap(), TrustLevel::Internal);
        assert!(matches!(
            "admin".parse::<TrustLevel>(),
            Err(PolicyError::UnknownLevel(_))
        ));
    }
}
