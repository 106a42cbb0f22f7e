// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity resolution.
//!
//! Works out who the user is, in strict priority order:
//! 1. Host context (verified user plus signed init data)
//! 2. `userId` query parameter on the page URL (deep links)
//! 3. Fixed development user, only on loopback origins
//! 4. Failure, reported as state rather than an error
//!
//! Resolution runs once per resolver; later calls return the same result.

use std::net::IpAddr;
use std::sync::{Arc, OnceLock};

use reqwest::Url;

use crate::host::HostPlatform;
use crate::models::{parse_int_prefix, Credentials, HostUser, UserId};

/// Sentinel user for local development.
pub const DEV_USER_ID: UserId = UserId(12345);

/// Message shown when the app was opened outside the host.
pub const NO_IDENTITY_MESSAGE: &str = "Please open via Telegram bot";

/// Which method supplied the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    Host,
    UrlParameter,
    Development,
}

/// A resolved user identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: UserId,
    pub user: HostUser,
    /// Opaque token handed verbatim to the task service (empty if unsigned)
    pub auth_token: String,
    pub source: IdentitySource,
}

impl Identity {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.user_id, self.auth_token.clone())
    }
}

/// Outcome of identity resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// Resolution has not run yet.
    Pending,
    Resolved(Identity),
    /// No identity source applied; the session cannot continue.
    Failed(String),
}

static PENDING: AuthState = AuthState::Pending;

impl AuthState {
    pub fn user_id(&self) -> Option<UserId> {
        self.identity().map(|i| i.user_id)
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthState::Resolved(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AuthState::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.identity().map(Identity::credentials)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Pending)
    }

    pub fn is_ready(&self) -> bool {
        self.identity().is_some()
    }
}

/// Resolves the session identity once from the host and the page location.
pub struct IdentityResolver {
    host: Option<Arc<dyn HostPlatform>>,
    location: Url,
    state: OnceLock<AuthState>,
}

impl IdentityResolver {
    pub fn new(host: Option<Arc<dyn HostPlatform>>, location: Url) -> Self {
        Self {
            host,
            location,
            state: OnceLock::new(),
        }
    }

    pub fn host(&self) -> Option<&dyn HostPlatform> {
        self.host.as_deref()
    }

    /// Current state without triggering resolution.
    pub fn state(&self) -> &AuthState {
        self.state.get().unwrap_or(&PENDING)
    }

    /// Resolve the identity, running the fallback chain on first call only.
    pub fn resolve(&self) -> &AuthState {
        self.state.get_or_init(|| self.authenticate())
    }

    fn authenticate(&self) -> AuthState {
        if let Some(host) = self.host.as_deref() {
            host.ready();
            host.expand();
        }

        // Method 1: host context
        if let Some(host) = self.host.as_deref() {
            if let Some(user) = host.user() {
                tracing::info!(user_id = %user.id, "Using host platform auth");
                return AuthState::Resolved(Identity {
                    user_id: user.id,
                    user,
                    auth_token: host.init_data(),
                    source: IdentitySource::Host,
                });
            }
        }

        // Method 2: deep link parameter
        if let Some(user_id) = user_id_param(&self.location) {
            tracing::info!(user_id = %user_id, "Using userId from URL");
            return AuthState::Resolved(Identity {
                user_id,
                user: HostUser::placeholder(user_id, "User"),
                auth_token: String::new(),
                source: IdentitySource::UrlParameter,
            });
        }

        // Method 3: local development
        if is_development_origin(&self.location) {
            tracing::info!(user_id = %DEV_USER_ID, "Development mode - using mock user");
            return AuthState::Resolved(Identity {
                user_id: DEV_USER_ID,
                user: HostUser::placeholder(DEV_USER_ID, "Dev User"),
                auth_token: String::new(),
                source: IdentitySource::Development,
            });
        }

        tracing::warn!(location = %self.location, "No authentication method available");
        AuthState::Failed(NO_IDENTITY_MESSAGE.to_string())
    }
}

/// The first `userId` query parameter, if it starts with an integer.
fn user_id_param(location: &Url) -> Option<UserId> {
    location
        .query_pairs()
        .find(|(key, _)| key == "userId")
        .and_then(|(_, value)| parse_int_prefix(&value))
        .map(UserId)
}

/// Loopback hostnames only; never true for a deployed origin.
pub fn is_development_origin(location: &Url) -> bool {
    let Some(host) = location.host_str() else {
        return false;
    };
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .map(|ip| ip.is_loopback())
        .unwrap_or(false)
}
