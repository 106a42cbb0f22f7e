// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Task model as served by the task service, plus the client-side draft.
//!
//! The service is loose about shapes: ids may be strings or numbers and
//! `remindAt` may arrive as a number or a numeric string. Everything is
//! normalized here so the rest of the crate sees one canonical form.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{AppError, Result};
use crate::models::parse_int_prefix;

/// Server-assigned task identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => TaskId(s),
            RawId::Unsigned(n) => TaskId(n.to_string()),
            RawId::Signed(n) => TaskId(n.to_string()),
        })
    }
}

/// Task priority. Drives the XP the service awards; the client only displays it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Case-insensitive parse; `None` for anything unrecognized.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(Priority::parse).unwrap_or_default())
    }
}

/// Completion status. Anything other than `done` is treated as pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    Pending,
    Done,
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Done => "done",
        })
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref() {
            Some("done") => TaskStatus::Done,
            _ => TaskStatus::Pending,
        })
    }
}

/// Unix timestamp in whole seconds.
///
/// Deserializes from a number, a numeric string (leading digits only),
/// or null. Unparsable values become 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn from_datetime<Tz: TimeZone>(date: &DateTime<Tz>) -> Self {
        Self(date.timestamp())
    }

    pub fn seconds(&self) -> i64 {
        self.0
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.0, 0)
    }

    /// Parse the leading integer of a string, ignoring surrounding whitespace.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        parse_int_prefix(raw).map(Self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct TimestampVisitor;

        impl<'de> de::Visitor<'de> for TimestampVisitor {
            type Value = Timestamp;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a unix timestamp as number or numeric string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Timestamp, E> {
                Ok(Timestamp(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Timestamp, E> {
                Ok(Timestamp(i64::try_from(v).unwrap_or(i64::MAX)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Timestamp, E> {
                Ok(Timestamp(if v.is_finite() { v.trunc() as i64 } else { 0 }))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Timestamp, E> {
                Ok(Timestamp::parse_lenient(v).unwrap_or_default())
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<Timestamp, E> {
                Ok(Timestamp::default())
            }

            fn visit_none<E: de::Error>(self) -> std::result::Result<Timestamp, E> {
                Ok(Timestamp::default())
            }
        }

        deserializer.deserialize_any(TimestampVisitor)
    }
}

/// A task as returned by `GET /tasks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Server-assigned id (older payloads call it `taskId`)
    #[serde(alias = "taskId")]
    pub id: TaskId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    /// When the reminder fires (and which bucket the task lands in)
    #[serde(default)]
    pub remind_at: Timestamp,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
}

impl Task {
    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `GET /tasks` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks: Vec<Task>,
}

/// Default reminder offset for new drafts.
const DEFAULT_REMIND_IN_SECS: i64 = 60 * 60;

/// The user-supplied fields of a task that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub text: String,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub remind_at: Timestamp,
}

impl TaskDraft {
    /// New medium-priority draft reminding one hour after `now`.
    pub fn new(text: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            priority: Priority::default(),
            tags: Vec::new(),
            remind_at: Timestamp::from_datetime(&(now + Duration::seconds(DEFAULT_REMIND_IN_SECS))),
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_remind_at<Tz: TimeZone>(mut self, at: &DateTime<Tz>) -> Self {
        self.remind_at = Timestamp::from_datetime(at);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            self.add_tag(tag.as_ref());
        }
        self
    }

    /// Add a tag, stripping one leading `#` and whitespace. Returns false if
    /// the tag was empty or already present.
    pub fn add_tag(&mut self, raw: &str) -> bool {
        let trimmed = raw.trim();
        let tag = trimmed.strip_prefix('#').unwrap_or(trimmed).trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }

    /// Reject drafts the service would store as blank tasks.
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(AppError::InvalidDraft("task text is empty".to_string()));
        }
        Ok(())
    }

    /// Merge an AI suggestion into the draft. Fields the suggestion leaves
    /// out (or that fail to parse) stay as they were.
    pub fn apply_suggestion(&mut self, suggestion: &ParsedTask, offset: &FixedOffset) {
        if let Some(text) = suggestion.text.as_deref().filter(|t| !t.trim().is_empty()) {
            self.text = text.to_string();
        }
        if let Some(priority) = suggestion.priority() {
            self.priority = priority;
        }
        if let Some(due) = suggestion.due_local(offset) {
            self.remind_at = Timestamp::from_datetime(&due);
        }
    }
}

/// Result of `POST /ai/parse-task`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ParsedTask {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

impl ParsedTask {
    pub fn priority(&self) -> Option<Priority> {
        self.priority.as_deref().and_then(Priority::parse)
    }

    /// Due date truncated to minute precision (`YYYY-MM-DDTHH:MM`).
    pub fn due_minute(&self) -> Option<&str> {
        let due = self.due_date.as_deref()?;
        due.get(..16).or(Some(due))
    }

    /// Due date interpreted as wall-clock time in `offset`.
    pub fn due_local(&self, offset: &FixedOffset) -> Option<DateTime<FixedOffset>> {
        let naive = NaiveDateTime::parse_from_str(self.due_minute()?, "%Y-%m-%dT%H:%M").ok()?;
        offset.from_local_datetime(&naive).single()
    }
}

/// `POST /tasks` response. Newer deployments echo the task, older ones
/// only return its id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTask {
    #[serde(default)]
    pub task: Option<Task>,
    #[serde(default)]
    pub task_id: Option<TaskId>,
    #[serde(default)]
    pub message: Option<String>,
}

impl CreatedTask {
    pub fn id(&self) -> Option<&TaskId> {
        self.task
            .as_ref()
            .map(|t| &t.id)
            .or(self.task_id.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_accepts_string_and_numeric_remind_at() {
        let a: Task = serde_json::from_value(json!({
            "id": "a1", "text": "x", "remindAt": "1700000000"
        }))
        .unwrap();
        let b: Task = serde_json::from_value(json!({
            "id": "a1", "text": "x", "remindAt": 1700000000
        }))
        .unwrap();
        assert_eq!(a.remind_at, Timestamp(1_700_000_000));
        assert_eq!(a.remind_at, b.remind_at);
    }

    #[test]
    fn test_task_legacy_id_and_defaults() {
        let task: Task = serde_json::from_value(json!({
            "taskId": 17, "text": "legacy", "tags": null, "remindAt": null
        }))
        .unwrap();
        assert_eq!(task.id.as_str(), "17");
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.remind_at, Timestamp(0));
        assert!(task.tags.is_empty());
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_unknown_priority_and_status_fall_back() {
        let task: Task = serde_json::from_value(json!({
            "id": "t", "priority": "URGENT", "status": "archived"
        }))
        .unwrap();
        assert_eq!(task.priority, Priority::Medium);
        assert!(!task.is_done());

        let done: Task =
            serde_json::from_value(json!({"id": "t", "priority": "High", "status": "done"})).unwrap();
        assert_eq!(done.priority, Priority::High);
        assert!(done.is_done());
    }

    #[test]
    fn test_parse_lenient_takes_leading_digits() {
        assert_eq!(Timestamp::parse_lenient("42"), Some(Timestamp(42)));
        assert_eq!(Timestamp::parse_lenient(" 42abc"), Some(Timestamp(42)));
        assert_eq!(Timestamp::parse_lenient("-5"), Some(Timestamp(-5)));
        assert_eq!(Timestamp::parse_lenient("abc"), None);
        assert_eq!(Timestamp::parse_lenient(""), None);
    }

    #[test]
    fn test_draft_tags_deduplicated_in_order() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let draft = TaskDraft::new("Buy milk", now).with_tags(["#home", "errands", "home", " ", "#"]);
        assert_eq!(draft.tags, vec!["home", "errands"]);
        assert_eq!(draft.remind_at, Timestamp(1_700_003_600));
    }

    #[test]
    fn test_add_tag_strips_only_leading_hash() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let mut draft = TaskDraft::new("Learn", now);
        assert!(draft.add_tag("c#"));
        assert!(draft.add_tag(" #f# "));
        assert!(draft.add_tag("##rust"));
        assert_eq!(draft.tags, vec!["c#", "f#", "#rust"]);
    }

    #[test]
    fn test_draft_serializes_wire_shape() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let draft = TaskDraft::new("Call mom", now)
            .with_priority(Priority::High)
            .with_tags(["family"]);
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(
            value,
            json!({
                "text": "Call mom",
                "priority": "high",
                "tags": ["family"],
                "remindAt": 1_700_003_600
            })
        );
    }

    #[test]
    fn test_blank_draft_rejected() {
        let now = DateTime::from_timestamp(0, 0).unwrap();
        let err = TaskDraft::new("   ", now).validate().unwrap_err();
        assert!(matches!(err, AppError::InvalidDraft(_)));
    }

    #[test]
    fn test_apply_suggestion() {
        let now = DateTime::from_timestamp(0, 0).unwrap();
        let mut draft = TaskDraft::new("gym tmrw 7am important", now);
        let suggestion = ParsedTask {
            text: Some("Go to the gym".to_string()),
            priority: Some("HIGH".to_string()),
            due_date: Some("2024-03-02T07:00:00Z".to_string()),
        };
        let offset = FixedOffset::east_opt(3600).unwrap();

        draft.apply_suggestion(&suggestion, &offset);

        assert_eq!(draft.text, "Go to the gym");
        assert_eq!(draft.priority, Priority::High);
        // 07:00 at UTC+1 is 06:00 UTC
        let expected = Utc.with_ymd_and_hms(2024, 3, 2, 6, 0, 0).unwrap();
        assert_eq!(draft.remind_at, Timestamp::from_datetime(&expected));
    }

    #[test]
    fn test_empty_suggestion_keeps_draft() {
        let now = DateTime::from_timestamp(0, 0).unwrap();
        let original = TaskDraft::new("Read book", now).with_priority(Priority::Low);
        let mut draft = original.clone();
        let suggestion = ParsedTask {
            text: None,
            priority: Some("whenever".to_string()),
            due_date: Some("tomorrow".to_string()),
        };

        draft.apply_suggestion(&suggestion, &FixedOffset::east_opt(0).unwrap());

        assert_eq!(draft, original);
    }

    #[test]
    fn test_created_task_id_from_either_shape() {
        let echoed: CreatedTask =
            serde_json::from_value(json!({"task": {"id": "abc", "text": "t"}})).unwrap();
        assert_eq!(echoed.id().map(TaskId::as_str), Some("abc"));

        let bare: CreatedTask =
            serde_json::from_value(json!({"taskId": "def", "message": "Task created"})).unwrap();
        assert_eq!(bare.id().map(TaskId::as_str), Some("def"));
    }
}
