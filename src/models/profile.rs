// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gamification profile (levels, XP, streaks, achievements).
//!
//! Every counter here is computed by the task service. The client formats
//! and displays them; it never recomputes level thresholds or streaks.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::models::{count_from_value, lenient_count, UserId};

/// Number of days shown in the activity history.
pub const ACTIVITY_WINDOW_DAYS: i64 = 60;

/// Role claim that unlocks the admin statistics view.
pub const ADMIN_ROLE: &str = "admin";

/// User profile as returned by `GET /profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default = "default_level", deserialize_with = "lenient_count")]
    pub level: i64,
    #[serde(rename = "totalXP", default, deserialize_with = "lenient_count")]
    pub total_xp: i64,
    /// XP earned inside the current level
    #[serde(default, deserialize_with = "lenient_count")]
    pub xp_progress: i64,
    #[serde(default = "default_xp_for_next_level", deserialize_with = "lenient_count")]
    pub xp_for_next_level: i64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub streak: i64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub tasks_completed: i64,
    /// Unlocked achievements, in unlock order
    #[serde(default, deserialize_with = "nullable_achievements")]
    pub achievements: Vec<Achievement>,
    /// How many achievements exist in total
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_achievements: i64,
    /// Completions per day, keyed by ISO date ("YYYY-MM-DD")
    #[serde(default, deserialize_with = "lenient_activity_log")]
    pub activity_log: BTreeMap<String, i64>,
    /// Server-issued role claim ("admin" for operators)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

fn default_level() -> i64 {
    1
}

fn default_xp_for_next_level() -> i64 {
    100
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            user_id: None,
            level: default_level(),
            total_xp: 0,
            xp_progress: 0,
            xp_for_next_level: default_xp_for_next_level(),
            streak: 0,
            tasks_completed: 0,
            achievements: Vec::new(),
            total_achievements: 0,
            activity_log: BTreeMap::new(),
            role: None,
        }
    }
}

impl Profile {
    /// Whether the server granted this user the admin role.
    pub fn is_admin(&self) -> bool {
        self.role
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case(ADMIN_ROLE))
    }

    /// Fraction of the current level completed, in `[0, 1]`.
    pub fn level_progress(&self) -> f64 {
        if self.xp_for_next_level <= 0 {
            return 0.0;
        }
        (self.xp_progress as f64 / self.xp_for_next_level as f64).clamp(0.0, 1.0)
    }

    /// Completions logged on `date`; absent days count as zero.
    pub fn completions_on(&self, date: NaiveDate) -> i64 {
        self.activity_log
            .get(&date.format("%Y-%m-%d").to_string())
            .copied()
            .unwrap_or(0)
    }

    /// The last [`ACTIVITY_WINDOW_DAYS`] days ending at `today`, oldest first.
    pub fn activity_window(&self, today: NaiveDate) -> Vec<ActivityDay> {
        (0..ACTIVITY_WINDOW_DAYS)
            .rev()
            .map(|back| {
                let date = today - Duration::days(back);
                let count = self.completions_on(date);
                ActivityDay {
                    date,
                    count,
                    weekday: date.weekday().num_days_from_sunday(),
                    level: ActivityLevel::from_count(count),
                }
            })
            .collect()
    }
}

/// Unlocked achievement, normalized from either a bare id or a full record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl<'de> Deserialize<'de> for Achievement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawAchievement {
            Id(String),
            Record {
                id: String,
                #[serde(default)]
                name: Option<String>,
                #[serde(default)]
                description: Option<String>,
            },
        }

        Ok(match RawAchievement::deserialize(deserializer)? {
            RawAchievement::Id(id) => Achievement {
                name: id.clone(),
                id,
                description: String::new(),
            },
            RawAchievement::Record {
                id,
                name,
                description,
            } => Achievement {
                name: name.unwrap_or_else(|| id.clone()),
                id,
                description: description.unwrap_or_default(),
            },
        })
    }
}

/// One cell of the activity history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityDay {
    pub date: NaiveDate,
    pub count: i64,
    /// 0 = Sunday
    pub weekday: u32,
    pub level: ActivityLevel,
}

/// Heat level of an activity cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActivityLevel {
    None,
    Low,
    Medium,
    High,
}

impl ActivityLevel {
    pub fn from_count(count: i64) -> Self {
        match count {
            i64::MIN..=0 => ActivityLevel::None,
            1..=2 => ActivityLevel::Low,
            3..=4 => ActivityLevel::Medium,
            _ => ActivityLevel::High,
        }
    }
}

fn lenient_activity_log<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, i64>, D::Error> {
    let raw = Option::<BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(date, count)| (date, count_from_value(&count)))
        .collect())
}

fn nullable_achievements<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<Achievement>, D::Error> {
    Ok(Option::<Vec<Achievement>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_from_service_payload() {
        let profile: Profile = serde_json::from_value(json!({
            "userId": 42,
            "level": 3,
            "totalXP": 245,
            "xpProgress": 45,
            "xpForNextLevel": 100,
            "streak": 4,
            "tasksCompleted": 12,
            "achievements": [
                {"id": "first_task", "name": "🎯 First Task", "description": "Complete your first task"},
                "night_owl"
            ],
            "totalAchievements": 7,
            "activityLog": {"2024-01-15": 2, "2024-01-16": "3"}
        }))
        .unwrap();

        assert_eq!(profile.user_id, Some(UserId(42)));
        assert_eq!(profile.level, 3);
        assert_eq!(profile.total_xp, 245);
        assert_eq!(profile.achievements.len(), 2);
        assert_eq!(profile.achievements[0].name, "🎯 First Task");
        assert_eq!(profile.achievements[1].id, "night_owl");
        assert_eq!(profile.achievements[1].name, "night_owl");
        assert_eq!(profile.achievements[1].description, "");
        assert_eq!(profile.activity_log.get("2024-01-16"), Some(&3));
        assert!(!profile.is_admin());
    }

    #[test]
    fn test_profile_defaults_when_sparse() {
        let profile: Profile =
            serde_json::from_value(json!({"totalXP": 12.0, "achievements": null})).unwrap();
        assert_eq!(profile.level, 1);
        assert_eq!(profile.xp_for_next_level, 100);
        assert_eq!(profile.total_xp, 12);
        assert!(profile.achievements.is_empty());
        assert!(profile.activity_log.is_empty());
    }

    #[test]
    fn test_level_progress_clamped() {
        let mut profile = Profile {
            xp_progress: 45,
            ..Profile::default()
        };
        assert!((profile.level_progress() - 0.45).abs() < f64::EPSILON);

        profile.xp_progress = 250;
        assert_eq!(profile.level_progress(), 1.0);

        profile.xp_for_next_level = 0;
        assert_eq!(profile.level_progress(), 0.0);
    }

    #[test]
    fn test_admin_role_claim() {
        let profile: Profile = serde_json::from_value(json!({"role": "Admin"})).unwrap();
        assert!(profile.is_admin());
    }

    #[test]
    fn test_activity_window_covers_sixty_days() {
        let mut profile = Profile::default();
        profile.activity_log.insert("2024-03-01".to_string(), 5);
        profile.activity_log.insert("2024-01-02".to_string(), 1);
        // Outside the window
        profile.activity_log.insert("2023-12-01".to_string(), 9);

        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let window = profile.activity_window(today);

        assert_eq!(window.len(), 60);
        assert_eq!(window.first().unwrap().date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(window.first().unwrap().count, 1);
        assert_eq!(window.first().unwrap().level, ActivityLevel::Low);

        let last = window.last().unwrap();
        assert_eq!(last.date, today);
        assert_eq!(last.count, 5);
        assert_eq!(last.level, ActivityLevel::High);
        // 2024-03-01 was a Friday
        assert_eq!(last.weekday, 5);

        let total: i64 = window.iter().map(|d| d.count).sum();
        assert_eq!(total, 6);
    }

    #[test]
    fn test_activity_levels() {
        assert_eq!(ActivityLevel::from_count(0), ActivityLevel::None);
        assert_eq!(ActivityLevel::from_count(2), ActivityLevel::Low);
        assert_eq!(ActivityLevel::from_count(4), ActivityLevel::Medium);
        assert_eq!(ActivityLevel::from_count(5), ActivityLevel::High);
    }
}
