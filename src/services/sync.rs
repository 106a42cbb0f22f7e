// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Task and profile synchronizer.
//!
//! Owns the client-side caches of the task list and the gamification
//! profile. Every mutation goes to the task service and is followed by a
//! full re-fetch (tasks, then profile for XP-affecting mutations); caches
//! are never patched locally.
//!
//! Overlapping operations are not serialized. Each runs its own
//! request-then-refresh sequence and the last response to land wins.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use crate::error::{AppError, Result};
use crate::models::{
    AdminStats, CompletionReward, CreatedTask, Credentials, DeletionPenalty, ParsedTask, Profile,
    Task, TaskDraft, TaskId, UserId,
};
use crate::services::ApiClient;

/// Texts shorter than this are not worth sending for AI parsing.
const MIN_PARSE_TEXT_CHARS: usize = 5;

/// Read-only view of the synchronizer state for the rendering layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncSnapshot {
    pub tasks: Vec<Task>,
    pub profile: Option<Profile>,
    /// A task list fetch is in flight
    pub loading: bool,
    /// A profile fetch is in flight
    pub profile_loading: bool,
    /// Last task list fetch failure, cleared by the next success
    pub error: Option<String>,
}

impl SyncSnapshot {
    /// Tasks still to do.
    pub fn active_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| !t.is_done())
    }
}

#[derive(Default)]
struct Caches {
    tasks: Vec<Task>,
    profile: Option<Profile>,
    error: Option<String>,
}

/// Raises a busy flag for the lifetime of the guard.
struct BusyFlag<'a>(&'a AtomicBool);

impl<'a> BusyFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for BusyFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Synchronizes the task list and profile with the task service.
pub struct TaskSynchronizer {
    api: ApiClient,
    credentials: Option<Credentials>,
    caches: RwLock<Caches>,
    loading: AtomicBool,
    profile_loading: AtomicBool,
    initialized: AtomicBool,
}

impl TaskSynchronizer {
    /// Create a synchronizer. Without credentials, fetches are no-ops and
    /// mutations fail with [`AppError::Unauthenticated`].
    pub fn new(api: ApiClient, credentials: Option<Credentials>) -> Self {
        Self {
            api,
            credentials,
            caches: RwLock::new(Caches::default()),
            loading: AtomicBool::new(false),
            profile_loading: AtomicBool::new(false),
            initialized: AtomicBool::new(false),
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.credentials.as_ref().map(|c| c.user_id)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    fn require_credentials(&self) -> Result<&Credentials> {
        self.credentials.as_ref().ok_or(AppError::Unauthenticated)
    }

    /// Clone out the current state.
    pub async fn snapshot(&self) -> SyncSnapshot {
        let caches = self.caches.read().await;
        SyncSnapshot {
            tasks: caches.tasks.clone(),
            profile: caches.profile.clone(),
            loading: self.loading.load(Ordering::SeqCst),
            profile_loading: self.profile_loading.load(Ordering::SeqCst),
            error: caches.error.clone(),
        }
    }

    /// Cached tasks that are not done.
    pub async fn active_tasks(&self) -> Vec<Task> {
        self.caches
            .read()
            .await
            .tasks
            .iter()
            .filter(|t| !t.is_done())
            .cloned()
            .collect()
    }

    pub async fn profile(&self) -> Option<Profile> {
        self.caches.read().await.profile.clone()
    }

    /// Initial load: tasks then profile, exactly once per synchronizer.
    ///
    /// Returns true if this call performed the load.
    pub async fn bootstrap(&self) -> bool {
        let Some(user_id) = self.user_id() else {
            return false;
        };
        if self.initialized.swap(true, Ordering::SeqCst) {
            return false;
        }

        tracing::info!(user_id = %user_id, "Starting data load");
        // A failure here is recorded in the snapshot's error field.
        self.fetch_tasks().await.ok();
        self.fetch_profile().await;
        true
    }

    /// Replace the cached task list with the server's.
    ///
    /// No-op without a user. On failure the previous list is kept and the
    /// error is both recorded in the snapshot and returned.
    pub async fn fetch_tasks(&self) -> Result<()> {
        let Some(creds) = self.credentials.as_ref() else {
            return Ok(());
        };
        let _busy = BusyFlag::raise(&self.loading);

        tracing::debug!(user_id = %creds.user_id, "Fetching tasks");
        match self.api.list_tasks(creds).await {
            Ok(tasks) => {
                tracing::info!(count = tasks.len(), "Tasks loaded");
                let mut caches = self.caches.write().await;
                caches.tasks = tasks;
                caches.error = None;
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "Error fetching tasks");
                self.caches.write().await.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Replace the cached profile with the server's.
    ///
    /// Failures are logged only: a stale profile is acceptable.
    pub async fn fetch_profile(&self) {
        let Some(creds) = self.credentials.as_ref() else {
            return;
        };
        let _busy = BusyFlag::raise(&self.profile_loading);

        tracing::debug!(user_id = %creds.user_id, "Fetching profile");
        match self.api.get_profile(creds).await {
            Ok(profile) => {
                tracing::info!(
                    level = profile.level,
                    total_xp = profile.total_xp,
                    "Profile loaded"
                );
                self.caches.write().await.profile = Some(profile);
            }
            Err(err) => {
                tracing::error!(error = %err, "Error fetching profile");
            }
        }
    }

    /// Manual refresh (pull to refresh).
    pub async fn refresh(&self) -> Result<()> {
        self.fetch_tasks().await
    }

    /// Create a task, then re-fetch the list to pick up server-assigned fields.
    pub async fn create_task(&self, draft: &TaskDraft) -> Result<CreatedTask> {
        let creds = self.require_credentials()?;
        draft.validate()?;

        let created = self.api.create_task(creds, draft).await.map_err(|err| {
            tracing::error!(error = %err, "Error creating task");
            err
        })?;
        tracing::info!(task_id = ?created.id(), "Task created");

        self.reconcile(false).await;
        Ok(created)
    }

    /// Complete a task. Returns the XP awarded after both caches are refreshed.
    pub async fn complete_task(&self, id: &TaskId) -> Result<CompletionReward> {
        let creds = self.require_credentials()?;

        let reward = self.api.complete_task(creds, id).await.map_err(|err| {
            tracing::error!(task_id = %id, error = %err, "Error completing task");
            err
        })?;
        tracing::info!(
            task_id = %id,
            xp_earned = reward.xp_earned,
            level_up = reward.level_up,
            "Task completed"
        );

        self.reconcile(true).await;
        Ok(reward)
    }

    /// Delete a task. Returns the XP penalty after both caches are refreshed.
    pub async fn delete_task(&self, id: &TaskId) -> Result<DeletionPenalty> {
        let creds = self.require_credentials()?;

        let penalty = self.api.delete_task(creds, id).await.map_err(|err| {
            tracing::error!(task_id = %id, error = %err, "Error deleting task");
            err
        })?;
        tracing::info!(task_id = %id, xp_lost = penalty.xp_lost, "Task deleted");

        self.reconcile(true).await;
        Ok(penalty)
    }

    /// Re-fetch after a successful mutation. The mutation already happened,
    /// so refresh failures only show up in the snapshot and the logs.
    async fn reconcile(&self, include_profile: bool) {
        if let Err(err) = self.fetch_tasks().await {
            tracing::warn!(error = %err, "Task list refresh after mutation failed");
        }
        if include_profile {
            self.fetch_profile().await;
        }
    }

    /// Best-effort extraction of task fields from free text.
    ///
    /// Returns `None` for short texts, without a user, or on any failure.
    pub async fn parse_task(&self, text: &str) -> Option<ParsedTask> {
        let creds = self.credentials.as_ref()?;
        let text = text.trim();
        if text.chars().count() < MIN_PARSE_TEXT_CHARS {
            return None;
        }

        match self.api.parse_task(creds, text).await {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::warn!(error = %err, "AI parse failed");
                None
            }
        }
    }

    /// Global statistics, only for profiles carrying the admin role claim.
    ///
    /// The service re-checks authorization; this gate only avoids a
    /// pointless request.
    pub async fn admin_stats(&self) -> Result<AdminStats> {
        let creds = self.require_credentials()?;
        let is_admin = self
            .caches
            .read()
            .await
            .profile
            .as_ref()
            .is_some_and(Profile::is_admin);
        if !is_admin {
            return Err(AppError::Forbidden);
        }
        self.api.admin_stats(creds).await
    }
}
