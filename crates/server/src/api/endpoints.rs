use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use byosnap_core::{AuthorizationPolicy, DenialStatus, ResourceBinding, TrustLevel};

use crate::config::PolicyConfig;
use crate::error::ServerError;

/// The gated user endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `GET /users/{user_id}/game`
    GetGame,
    /// `POST /users/{user_id}/game`
    UpdateGame,
    /// `DELETE /users/{user_id}`
    DeleteUser,
    /// `PUT /users/{user_id}/profile`
    UpsertProfile,
    /// `POST /user/{user_id}/win`
    Win,
    /// `POST /user/{user_id}/lose`
    Lose,
}

impl Endpoint {
    pub const ALL: [Self; 6] = [
        Self::GetGame,
        Self::UpdateGame,
        Self::DeleteUser,
        Self::UpsertProfile,
        Self::Win,
        Self::Lose,
    ];

    /// Name used in configuration and logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::GetGame => "get_game",
            Self::UpdateGame => "update_game",
            Self::DeleteUser => "delete_user",
            Self::UpsertProfile => "upsert_profile",
            Self::Win => "win",
            Self::Lose => "lose",
        }
    }

    /// Operation name reported in the `api` field of success bodies.
    pub fn operation(self) -> &'static str {
        match self {
            Self::GetGame => "GetGame",
            Self::UpdateGame => "PostGame",
            Self::DeleteUser => "DeleteUser",
            Self::UpsertProfile => "UpdateUserProfile",
            Self::Win => "Win",
            Self::Lose => "Lose",
        }
    }

    pub fn default_levels(self) -> &'static [TrustLevel] {
        use TrustLevel::{ApiKey, App, Internal, User};
        match self {
            Self::GetGame | Self::UpsertProfile => &[User, ApiKey, Internal],
            Self::UpdateGame => &[ApiKey, Internal],
            Self::DeleteUser => &[Internal],
            Self::Win | Self::Lose => &[Internal, ApiKey, App, User],
        }
    }

    pub fn default_denial(self) -> DenialStatus {
        match self {
            Self::Win | Self::Lose => DenialStatus::Forbidden,
            _ => DenialStatus::Unauthorized,
        }
    }

    fn default_policy(self) -> Result<AuthorizationPolicy, ServerError> {
        AuthorizationPolicy::new(
            self.default_levels().iter().copied(),
            ResourceBinding::path_param("user_id"),
        )
        .map(|p| p.with_denial(self.default_denial()))
        .map_err(|e| ServerError::Config(format!("default policy for '{self}': {e}")))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Endpoint {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.name() == s.trim())
            .ok_or_else(|| ServerError::Config(format!("unknown endpoint '{s}'")))
    }
}

/// The effective policy of every endpoint.
#[derive(Debug, Clone)]
pub struct EndpointPolicies {
    get_game: Arc<AuthorizationPolicy>,
    update_game: Arc<AuthorizationPolicy>,
    delete_user: Arc<AuthorizationPolicy>,
    upsert_profile: Arc<AuthorizationPolicy>,
    win: Arc<AuthorizationPolicy>,
    lose: Arc<AuthorizationPolicy>,
}

impl EndpointPolicies {
    /// Built-in policies with `overrides` applied on top. A later override
    /// of the same endpoint replaces an earlier one.
    pub fn from_config(overrides: &[PolicyConfig]) -> Result<Self, ServerError> {
        let mut policies = Self {
            get_game: Arc::new(Endpoint::GetGame.default_policy()?),
            update_game: Arc::new(Endpoint::UpdateGame.default_policy()?),
            delete_user: Arc::new(Endpoint::DeleteUser.default_policy()?),
            upsert_profile: Arc::new(Endpoint::UpsertProfile.default_policy()?),
            win: Arc::new(Endpoint::Win.default_policy()?),
            lose: Arc::new(Endpoint::Lose.default_policy()?),
        };
        for config in overrides {
            let (endpoint, policy) = config.to_policy()?;
            *policies.slot_mut(endpoint) = Arc::new(policy);
        }
        Ok(policies)
    }

    pub fn defaults() -> Result<Self, ServerError> {
        Self::from_config(&[])
    }

    /// Policy of `endpoint`.
    pub fn get(&self, endpoint: Endpoint) -> Arc<AuthorizationPolicy> {
        let slot = match endpoint {
            Endpoint::GetGame => &self.get_game,
            Endpoint::UpdateGame => &self.update_game,
            Endpoint::DeleteUser => &self.delete_user,
            Endpoint::UpsertProfile => &self.upsert_profile,
            Endpoint::Win => &self.win,
            Endpoint::Lose => &self.lose,
        };
        Arc::clone(slot)
    }

    fn slot_mut(&mut self, endpoint: Endpoint) -> &mut Arc<AuthorizationPolicy> {
        match endpoint {
            Endpoint::GetGame => &mut self.get_game,
            Endpoint::UpdateGame => &mut self.update_game,
            Endpoint::DeleteUser => &mut self.delete_user,
            Endpoint::UpsertProfile => &mut self.upsert_profile,
            Endpoint::Win => &mut self.win,
            Endpoint::Lose => &mut self.lose,
        }
    }
}
