// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Taskbot mini-app session runner.
//!
//! Resolves the user, loads their tasks and profile from the task service,
//! and logs the board the mini-app would render.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use taskbot_miniapp::{
    board::{CalendarMonth, TaskBoard},
    config::Config,
    host::{HostPlatform, InitDataHost},
    time_utils::{format_reminder, local_offset},
    MiniApp,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(api = %config.api_base_url, app_url = %config.app_url, "Starting Taskbot mini-app");

    let host: Option<Arc<dyn HostPlatform>> = match config.init_data.as_deref() {
        Some(raw) => {
            let host = InitDataHost::new(raw).context("Failed to parse TELEGRAM_INIT_DATA")?;
            Some(Arc::new(host))
        }
        None => None,
    };

    let app = MiniApp::start(config, host)
        .await
        .context("Failed to start session")?;

    if let Some(message) = app.auth().error() {
        tracing::error!(reason = message, "No identity available");
        return Ok(());
    }

    tracing::info!(screen = ?app.startup_screen(), "Session ready");

    let snapshot = app.sync().snapshot().await;
    if let Some(error) = snapshot.error.as_deref() {
        tracing::warn!(error, "Task list unavailable");
    }

    let now = Utc::now();
    let offset = local_offset();
    let board = TaskBoard::arrange(&snapshot.tasks, now);
    for (bucket, tasks) in board.columns() {
        tracing::info!(bucket = bucket.title(), count = tasks.len(), "Board column");
        for task in tasks {
            tracing::info!(
                task_id = %task.id,
                priority = task.priority.as_str(),
                remind_at = %format_reminder(task.remind_at, &offset),
                tags = ?task.tags,
                "{}",
                task.text
            );
        }
    }

    let today = now.with_timezone(&offset).date_naive();
    if let Some(month) = CalendarMonth::containing(today) {
        let scheduled = (1..=month.days_in_month())
            .filter(|&day| !month.tasks_on(&snapshot.tasks, day, &offset).is_empty())
            .count();
        tracing::info!(month = %month.title(), days_with_tasks = scheduled, "Calendar");
    }

    if let Some(profile) = snapshot.profile.as_ref() {
        let activity = profile.activity_window(today);
        let active_days = activity.iter().filter(|d| d.count > 0).count();
        tracing::info!(
            level = profile.level,
            total_xp = profile.total_xp,
            progress = profile.level_progress(),
            streak = profile.streak,
            tasks_completed = profile.tasks_completed,
            achievements = profile.achievements.len(),
            active_days,
            "Profile"
        );
    }

    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("taskbot_miniapp=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
