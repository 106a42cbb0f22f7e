//! Aggregate statistics for the admin view.

use serde::{Deserialize, Serialize};

/// `GET /admin/stats` response body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(rename = "totalXP", default)]
    pub total_xp: i64,
    #[serde(default)]
    pub total_tasks: u64,
}
