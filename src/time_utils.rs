// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{FixedOffset, Local, Offset};

use crate::models::Timestamp;

/// Format a reminder time as local wall-clock "YYYY-MM-DD HH:MM".
pub fn format_reminder(at: Timestamp, offset: &FixedOffset) -> String {
    match at.to_datetime() {
        Some(date) => date.with_timezone(offset).format("%Y-%m-%d %H:%M").to_string(),
        None => "—".to_string(),
    }
}

/// UTC offset of the machine's local time zone right now.
pub fn local_offset() -> FixedOffset {
    Local::now().offset().fix()
}
