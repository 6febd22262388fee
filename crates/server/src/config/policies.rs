use byosnap_core::{AuthorizationPolicy, DenialStatus, ResourceBinding, TrustLevel};
use serde::Deserialize;

use crate::api::Endpoint;
use crate::error::ServerError;

/// The only path parameter the user routes bind.
const USER_ID_PARAM: &str = "user_id";

/// Override of one endpoint's authorization policy.
///
/// ```toml
/// [[policies]]
/// endpoint = "delete_user"
/// levels = ["internal", "api-key"]
/// denial = "forbidden"
/// resource = "user_id"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Endpoint name, see [`Endpoint::name`].
    pub endpoint: String,
    /// Trust levels in evaluation order.
    pub levels: Vec<String>,
    /// `"unauthorized"` (401) or `"forbidden"` (403). Defaults to the
    /// endpoint's built-in denial status.
    #[serde(default)]
    pub denial: Option<DenialStatus>,
    /// `"user_id"` to bind the target to the route's path parameter, or
    /// `"caller"` to bind it to the caller. Defaults to `user_id`.
    #[serde(default)]
    pub resource: Option<String>,
}

impl PolicyConfig {
    /// Resolve the endpoint and build the policy it describes.
    pub fn to_policy(&self) -> Result<(Endpoint, AuthorizationPolicy), ServerError> {
        let endpoint: Endpoint = self.endpoint.parse()?;

        let levels = self
            .levels
            .iter()
            .map(|l| l.parse::<TrustLevel>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| policy_error(&self.endpoint, &e))?;

        let resource = match self.resource.as_deref().map(str::trim) {
            None | Some(USER_ID_PARAM) => ResourceBinding::path_param(USER_ID_PARAM),
            Some(r) if r.eq_ignore_ascii_case("caller") => ResourceBinding::Caller,
            Some(other) => {
                return Err(ServerError::Config(format!(
                    "policy for '{}': unknown resource '{other}' (expected '{USER_ID_PARAM}' or 'caller')",
                    self.endpoint
                )));
            }
        };

        let denial = self.denial.unwrap_or_else(|| endpoint.default_denial());
        let policy = AuthorizationPolicy::new(levels, resource)
            .map_err(|e| policy_error(&self.endpoint, &e))?
            .with_denial(denial);

        Ok((endpoint, policy))
    }
}

fn policy_error(endpoint: &str, e: &byosnap_core::PolicyError) -> ServerError {
    ServerError::Config(format!("policy for '{endpoint}': {e}"))
}
