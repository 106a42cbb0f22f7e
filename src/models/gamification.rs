// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gamification payloads returned by task mutations.
//!
//! These are server-computed deltas, used only for celebratory display.
//! Profile state is never re-derived from them; the profile is re-fetched.

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{lenient_count, lenient_opt_count};

/// XP and achievement delta from completing a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionReward {
    /// Base XP for the task's priority
    #[serde(default, deserialize_with = "lenient_count")]
    pub xp_earned: i64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub streak_bonus: i64,
    /// XP awarded for achievements unlocked by this completion
    #[serde(default, deserialize_with = "lenient_count")]
    pub achievement_xp: i64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_xp: i64,
    #[serde(default, deserialize_with = "lenient_opt_count")]
    pub new_level: Option<i64>,
    #[serde(default)]
    pub level_up: bool,
    #[serde(default, deserialize_with = "lenient_count")]
    pub streak: i64,
    /// Display names of newly unlocked achievements
    #[serde(default, deserialize_with = "nullable_names")]
    pub unlocked_achievements: Vec<String>,
}

impl CompletionReward {
    /// Toast text for the completion, or `None` when nothing was earned.
    pub fn summary(&self) -> Option<String> {
        if self.xp_earned == 0 {
            return None;
        }
        match (self.level_up, self.new_level) {
            (true, Some(level)) => Some(format!(
                "🎉 +{} XP! Level UP to {}!",
                self.xp_earned, level
            )),
            _ => Some(format!("✅ +{} XP earned!", self.xp_earned)),
        }
    }

    pub fn unlocked_any(&self) -> bool {
        !self.unlocked_achievements.is_empty()
    }
}

/// XP penalty from deleting a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeletionPenalty {
    #[serde(default, deserialize_with = "lenient_count")]
    pub xp_lost: i64,
    #[serde(
        default,
        deserialize_with = "lenient_opt_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_xp: Option<i64>,
}

impl DeletionPenalty {
    pub fn summary(&self) -> Option<String> {
        (self.xp_lost > 0).then(|| format!("❌ -{} XP lost", self.xp_lost))
    }
}

/// `PUT /tasks/{id}/complete` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteTaskResponse {
    #[serde(default)]
    pub gamification: Option<CompletionReward>,
}

/// `DELETE /tasks/{id}` response body.
///
/// The service has shipped the penalty under both `gamification` and
/// `penalty`; deleting a finished task yields `null`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteTaskResponse {
    #[serde(default, alias = "penalty")]
    pub gamification: Option<DeletionPenalty>,
}

fn nullable_names<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
