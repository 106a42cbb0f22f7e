// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Taskbot mini-app core.
//!
//! Client-side core of the gamified task manager that runs inside the chat
//! host: resolves who the user is, keeps cached copies of their tasks and
//! gamification profile in sync with the task service, and arranges the data
//! the views display. All business logic (auth verification, XP, achievements)
//! lives in the remote task service.

pub mod board;
pub mod config;
pub mod error;
pub mod host;
pub mod models;
pub mod onboarding;
pub mod services;
pub mod time_utils;

use std::sync::Arc;

use anyhow::anyhow;
use reqwest::Url;

use config::Config;
use error::{AppError, Result};
use host::{trigger_haptic, Haptic, HostPlatform};
use models::{CompletionReward, CreatedTask, DeletionPenalty, TaskDraft, TaskId};
use onboarding::{OnboardingStore, StartupScreen};
use services::{ApiClient, AuthState, IdentityResolver, TaskSynchronizer};

/// A running mini-app session.
pub struct MiniApp {
    pub config: Config,
    identity: IdentityResolver,
    sync: TaskSynchronizer,
    onboarding: OnboardingStore,
}

impl MiniApp {
    /// Resolve the identity, load the initial data and the onboarding flag.
    ///
    /// Identity failure is not an error here: check [`MiniApp::auth`] and show
    /// the "open via the bot" message instead of the main UI.
    pub async fn start(config: Config, host: Option<Arc<dyn HostPlatform>>) -> Result<Self> {
        let location = Url::parse(&config.app_url)
            .map_err(|e| AppError::Internal(anyhow!("invalid app URL {}: {}", config.app_url, e)))?;

        let identity = IdentityResolver::new(host, location);
        let credentials = identity.resolve().credentials();

        let sync = TaskSynchronizer::new(ApiClient::new(config.api_base_url.as_str()), credentials);
        sync.bootstrap().await;

        let onboarding = OnboardingStore::load(&config.storage_path)?;

        Ok(Self {
            config,
            identity,
            sync,
            onboarding,
        })
    }

    pub fn auth(&self) -> &AuthState {
        self.identity.state()
    }

    pub fn sync(&self) -> &TaskSynchronizer {
        &self.sync
    }

    fn host(&self) -> Option<&dyn HostPlatform> {
        self.identity.host()
    }

    /// Screen to show after sign-in; `None` until an identity is available.
    pub fn startup_screen(&self) -> Option<StartupScreen> {
        self.auth()
            .is_ready()
            .then(|| self.onboarding.startup_screen())
    }

    pub fn finish_onboarding(&mut self) -> Result<()> {
        self.onboarding.mark_complete()?;
        trigger_haptic(self.host(), Haptic::Success);
        Ok(())
    }

    /// Pull to refresh.
    pub async fn refresh(&self) -> Result<()> {
        trigger_haptic(self.host(), Haptic::Light);
        self.sync.refresh().await
    }

    pub async fn create_task(&self, draft: &TaskDraft) -> Result<CreatedTask> {
        trigger_haptic(self.host(), Haptic::Medium);
        match self.sync.create_task(draft).await {
            Ok(created) => {
                trigger_haptic(self.host(), Haptic::Success);
                Ok(created)
            }
            Err(err) => {
                trigger_haptic(self.host(), Haptic::Error);
                Err(err)
            }
        }
    }

    pub async fn complete_task(&self, id: &TaskId) -> Result<CompletionReward> {
        trigger_haptic(self.host(), Haptic::Medium);
        match self.sync.complete_task(id).await {
            Ok(reward) => {
                if reward.xp_earned > 0 {
                    trigger_haptic(self.host(), Haptic::Success);
                }
                Ok(reward)
            }
            Err(err) => {
                trigger_haptic(self.host(), Haptic::Error);
                Err(err)
            }
        }
    }

    pub async fn delete_task(&self, id: &TaskId) -> Result<DeletionPenalty> {
        trigger_haptic(self.host(), Haptic::Medium);
        self.sync.delete_task(id).await.inspect_err(|_| {
            trigger_haptic(self.host(), Haptic::Error);
        })
    }
}
