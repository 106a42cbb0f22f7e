// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Task service API client.
//!
//! Every request carries the host's signed payload in `X-Telegram-Init-Data`
//! and the user id as a `userId` query parameter, which the service falls
//! back to when the header does not make it through.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{AppError, Result};
use crate::models::gamification::{CompleteTaskResponse, DeleteTaskResponse};
use crate::models::task::TaskList;
use crate::models::{
    AdminStats, CompletionReward, CreatedTask, Credentials, DeletionPenalty, ParsedTask, Profile,
    Task, TaskDraft, TaskId,
};

/// Header carrying the host's signed init data.
pub const INIT_DATA_HEADER: &str = "X-Telegram-Init-Data";

/// Task service API client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the service at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List all tasks for the user, done ones included.
    pub async fn list_tasks(&self, creds: &Credentials) -> Result<Vec<Task>> {
        let list: TaskList = self.send_json(self.get(creds, "/tasks")).await?;
        Ok(list.tasks)
    }

    /// Get the user's gamification profile.
    pub async fn get_profile(&self, creds: &Credentials) -> Result<Profile> {
        self.send_json(self.get(creds, "/profile")).await
    }

    /// Create a task from a draft.
    pub async fn create_task(&self, creds: &Credentials, draft: &TaskDraft) -> Result<CreatedTask> {
        let request = self
            .authorized(self.http.post(self.url("/tasks")), creds)
            .json(draft);
        self.send_json(request).await
    }

    /// Mark a task done; returns the XP awarded.
    pub async fn complete_task(&self, creds: &Credentials, id: &TaskId) -> Result<CompletionReward> {
        let path = format!("/tasks/{}/complete", urlencoding::encode(id.as_str()));
        let request = self.authorized(self.http.put(self.url(&path)), creds);
        let response: CompleteTaskResponse = self.send_json(request).await?;
        Ok(response.gamification.unwrap_or_default())
    }

    /// Delete a task; returns the XP penalty (zero for finished tasks).
    pub async fn delete_task(&self, creds: &Credentials, id: &TaskId) -> Result<DeletionPenalty> {
        let path = format!("/tasks/{}", urlencoding::encode(id.as_str()));
        let request = self.authorized(self.http.delete(self.url(&path)), creds);
        let response: DeleteTaskResponse = self.send_json(request).await?;
        Ok(response.gamification.unwrap_or_default())
    }

    /// Ask the service to extract task fields from free text.
    pub async fn parse_task(&self, creds: &Credentials, text: &str) -> Result<ParsedTask> {
        #[derive(Serialize)]
        struct ParseData<'a> {
            text: &'a str,
        }

        #[derive(Serialize)]
        struct ParseRequest<'a> {
            action: &'static str,
            data: ParseData<'a>,
        }

        let body = ParseRequest {
            action: "parse_task",
            data: ParseData { text },
        };
        let request = self
            .authorized(self.http.post(self.url("/ai/parse-task")), creds)
            .json(&body);
        self.send_json(request).await
    }

    /// Global statistics; the service answers 403 for non-admins.
    pub async fn admin_stats(&self, creds: &Credentials) -> Result<AdminStats> {
        self.send_json(self.get(creds, "/admin/stats")).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, creds: &Credentials, path: &str) -> reqwest::RequestBuilder {
        self.authorized(self.http.get(self.url(path)), creds)
    }

    /// Attach the auth header and the `userId` fallback parameter.
    fn authorized(
        &self,
        request: reqwest::RequestBuilder,
        creds: &Credentials,
    ) -> reqwest::RequestBuilder {
        request
            .header(INIT_DATA_HEADER, creds.auth_token.as_str())
            .query(&[("userId", creds.user_id.to_string())])
    }

    /// Send the request, check the status and parse the JSON body.
    async fn send_json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 => AppError::Unauthorized,
                403 => AppError::Forbidden,
                404 => AppError::NotFound(body),
                _ => AppError::Api(format!("HTTP {}: {}", status, body)),
            });
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Api(format!("JSON parse error: {}", e)))
    }
}
