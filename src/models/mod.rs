// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the task service payloads.

use serde::{Deserialize, Deserializer};

pub mod gamification;
pub mod profile;
pub mod stats;
pub mod task;
pub mod user;

pub use gamification::{CompletionReward, DeletionPenalty};
pub use profile::{Achievement, ActivityDay, ActivityLevel, Profile};
pub use stats::AdminStats;
pub use task::{CreatedTask, ParsedTask, Priority, Task, TaskDraft, TaskId, TaskStatus, Timestamp};
pub use user::{Credentials, HostUser, UserId};

/// Parse the leading integer of a string: leading whitespace and an optional
/// sign, then digits up to the first non-digit. `"42abc"` is 42.
pub(crate) fn parse_int_prefix(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let value = rest[..end].parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}

/// Counters come out of a document store and may be encoded as floats or
/// strings; anything unreadable counts as zero.
pub(crate) fn count_from_value(value: &serde_json::Value) -> i64 {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse::<f64>().map(|f| f.trunc() as i64).unwrap_or(0),
        _ => 0,
    }
}

pub(crate) fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(count_from_value(&value))
}

/// Like [`lenient_count`], but `null` stays absent.
pub(crate) fn lenient_opt_count<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<i64>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok((!value.is_null()).then(|| count_from_value(&value)))
}
