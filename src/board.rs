// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Arrangements of the task list used by the views: the four time buckets
//! of the task board, and the month grid of the calendar.

use chrono::{DateTime, Datelike, FixedOffset, Months, NaiveDate, Utc};

use crate::models::{Task, Timestamp};

const ONE_DAY_SECS: i64 = 86_400;
const TWO_DAYS_SECS: i64 = 2 * ONE_DAY_SECS;
const ONE_WEEK_SECS: i64 = 7 * ONE_DAY_SECS;

/// Time-based grouping of active tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeBucket {
    Today,
    Tomorrow,
    Week,
    Later,
}

impl TimeBucket {
    /// Buckets in display order.
    pub const ALL: [TimeBucket; 4] = [
        TimeBucket::Today,
        TimeBucket::Tomorrow,
        TimeBucket::Week,
        TimeBucket::Later,
    ];

    /// Bucket for a reminder relative to `now`. Overdue tasks count as today.
    pub fn categorize(remind_at: Timestamp, now: DateTime<Utc>) -> Self {
        let diff = remind_at.seconds().saturating_sub(now.timestamp());
        if diff < ONE_DAY_SECS {
            TimeBucket::Today
        } else if diff < TWO_DAYS_SECS {
            TimeBucket::Tomorrow
        } else if diff < ONE_WEEK_SECS {
            TimeBucket::Week
        } else {
            TimeBucket::Later
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TimeBucket::Today => "Today",
            TimeBucket::Tomorrow => "Tomorrow",
            TimeBucket::Week => "This Week",
            TimeBucket::Later => "Later",
        }
    }

    fn index(&self) -> usize {
        match self {
            TimeBucket::Today => 0,
            TimeBucket::Tomorrow => 1,
            TimeBucket::Week => 2,
            TimeBucket::Later => 3,
        }
    }
}

/// Active tasks grouped into time buckets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskBoard {
    columns: [Vec<Task>; 4],
}

impl TaskBoard {
    /// Drop done tasks and bucket the rest, keeping input order per bucket.
    pub fn arrange(tasks: &[Task], now: DateTime<Utc>) -> Self {
        let mut board = TaskBoard::default();
        for task in tasks.iter().filter(|t| !t.is_done()) {
            let bucket = TimeBucket::categorize(task.remind_at, now);
            board.columns[bucket.index()].push(task.clone());
        }
        board
    }

    pub fn bucket(&self, bucket: TimeBucket) -> &[Task] {
        &self.columns[bucket.index()]
    }

    /// Buckets with their tasks, in display order.
    pub fn columns(&self) -> impl Iterator<Item = (TimeBucket, &[Task])> {
        TimeBucket::ALL.into_iter().map(|b| (b, self.bucket(b)))
    }

    pub fn len(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// One month of the calendar grid, weeks starting on Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarMonth {
    first: NaiveDate,
    days_in_month: u32,
}

impl CalendarMonth {
    /// `month` is 1-based. `None` for an invalid month.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = first.checked_add_months(Months::new(1))?;
        let days_in_month = u32::try_from((next - first).num_days()).ok()?;
        Some(Self {
            first,
            days_in_month,
        })
    }

    pub fn containing(date: NaiveDate) -> Option<Self> {
        Self::new(date.year(), date.month())
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn days_in_month(&self) -> u32 {
        self.days_in_month
    }

    /// Empty cells before day 1 (0 when the month starts on Sunday).
    pub fn leading_blanks(&self) -> u32 {
        self.first.weekday().num_days_from_sunday()
    }

    /// "January 2024"
    pub fn title(&self) -> String {
        format!("{} {}", MONTH_NAMES[self.first.month0() as usize], self.year())
    }

    /// Grid cells: blanks, then day numbers 1..=days_in_month.
    pub fn cells(&self) -> Vec<Option<u32>> {
        (0..self.leading_blanks())
            .map(|_| None)
            .chain((1..=self.days_in_month).map(Some))
            .collect()
    }

    /// Tasks whose reminder falls on `day` of this month, in `offset` local time.
    pub fn tasks_on<'a>(&self, tasks: &'a [Task], day: u32, offset: &FixedOffset) -> Vec<&'a Task> {
        let Some(date) = self.first.with_day(day) else {
            return Vec::new();
        };
        tasks
            .iter()
            .filter(|t| {
                t.remind_at
                    .to_datetime()
                    .is_some_and(|at| at.with_timezone(offset).date_naive() == date)
            })
            .collect()
    }

    pub fn is_today(&self, day: u32, today: NaiveDate) -> bool {
        self.first.with_day(day) == Some(today)
    }
}
