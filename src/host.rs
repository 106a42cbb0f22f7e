// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Host-platform capability.
//!
//! The chat host that embeds the mini-app exposes lifecycle signals, the
//! launching user, a signed init-data payload, and optionally haptics. All of
//! it is injected through [`HostPlatform`] so tests can substitute a fake.

use crate::models::{HostUser, Timestamp};

/// Capabilities the embedding host provides.
pub trait HostPlatform: Send + Sync {
    /// Tell the host the app has loaded.
    fn ready(&self);

    /// Ask the host to expand the app to full height.
    fn expand(&self);

    /// The verified launching user, if the host supplied one.
    fn user(&self) -> Option<HostUser>;

    /// Raw signed init-data payload (empty when absent).
    fn init_data(&self) -> String;

    /// Haptic feedback, when the host supports it.
    fn haptics(&self) -> Option<&dyn HapticFeedback> {
        None
    }
}

/// Host haptic feedback API.
pub trait HapticFeedback: Send + Sync {
    fn impact_occurred(&self, style: ImpactStyle);
    fn notification_occurred(&self, kind: NotificationKind);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactStyle {
    Light,
    Medium,
    Heavy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Warning,
    Error,
}

/// Feedback cues the app fires on user interactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Haptic {
    Light,
    Medium,
    Success,
    Error,
}

/// Fire a haptic cue if the host supports it; silently does nothing otherwise.
pub fn trigger_haptic(host: Option<&dyn HostPlatform>, cue: Haptic) {
    let Some(haptics) = host.and_then(|h| h.haptics()) else {
        return;
    };
    match cue {
        Haptic::Light => haptics.impact_occurred(ImpactStyle::Light),
        Haptic::Medium => haptics.impact_occurred(ImpactStyle::Medium),
        Haptic::Success => haptics.notification_occurred(NotificationKind::Success),
        Haptic::Error => haptics.notification_occurred(NotificationKind::Error),
    }
}

/// Errors reading the host payload.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Malformed init data: {0}")]
    Malformed(String),

    #[error("Invalid user in init data: {0}")]
    InvalidUser(#[from] serde_json::Error),
}

/// Parsed form of the host's signed init-data payload
/// (`query_id=…&user=<json>&auth_date=…&hash=…`).
///
/// The signature is not checked here; the raw string is forwarded to the task
/// service, which verifies it.
#[derive(Debug, Clone, PartialEq)]
pub struct InitData {
    raw: String,
    pub query_id: Option<String>,
    pub user: Option<HostUser>,
    pub auth_date: Option<Timestamp>,
    pub hash: Option<String>,
}

impl InitData {
    pub fn parse(raw: &str) -> Result<Self, HostError> {
        let mut init = InitData {
            raw: raw.to_string(),
            query_id: None,
            user: None,
            auth_date: None,
            hash: None,
        };

        for pair in raw.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = decode_component(value)?;
            match decode_component(key)?.as_str() {
                "query_id" => init.query_id = Some(value),
                "user" => init.user = Some(serde_json::from_str(&value)?),
                "auth_date" => init.auth_date = Timestamp::parse_lenient(&value),
                "hash" => init.hash = Some(value),
                _ => {}
            }
        }

        Ok(init)
    }

    /// The payload exactly as received.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// Decode a form-encoded component (`+` is a space).
fn decode_component(raw: &str) -> Result<String, HostError> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .map_err(|e| HostError::Malformed(e.to_string()))
}

/// Host backed by an init-data string handed to the process, e.g. when the
/// app is driven from a launcher outside the chat client.
pub struct InitDataHost {
    init_data: InitData,
}

impl InitDataHost {
    pub fn new(raw: &str) -> Result<Self, HostError> {
        Ok(Self {
            init_data: InitData::parse(raw)?,
        })
    }
}

impl HostPlatform for InitDataHost {
    fn ready(&self) {
        tracing::debug!("Host ready signal");
    }

    fn expand(&self) {
        tracing::debug!("Host expand signal");
    }

    fn user(&self) -> Option<HostUser> {
        self.init_data.user.clone()
    }

    fn init_data(&self) -> String {
        self.init_data.raw().to_string()
    }
}
