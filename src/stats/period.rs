use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::Session;

/// Aggregation window requested from the statistics endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl StatsPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatsPeriod::Daily => "daily",
            StatsPeriod::Weekly => "weekly",
            StatsPeriod::Monthly => "monthly",
        }
    }

    pub(crate) fn bucketing(&self) -> &'static dyn BucketSpec {
        match self {
            StatsPeriod::Daily => &DailyBuckets,
            StatsPeriod::Weekly => &WeeklyBuckets,
            StatsPeriod::Monthly => &MonthlyBuckets,
        }
    }
}

impl std::str::FromStr for StatsPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(StatsPeriod::Daily),
            "weekly" => Ok(StatsPeriod::Weekly),
            "monthly" => Ok(StatsPeriod::Monthly),
            other => Err(format!("unknown period: {other}")),
        }
    }
}

/// Identity of one time bucket. Days for daily/weekly, (year, month) pairs
/// for monthly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum BucketKey {
    Day(NaiveDate),
    Month { year: i32, month: u32 },
}

pub(crate) struct Bucket {
    pub key: BucketKey,
    pub label: String,
}

/// Per-period bucketing strategy: how many buckets the period has, what they
/// are called, and which bucket a session lands in.
pub(crate) trait BucketSpec: Sync {
    /// Chronologically ordered buckets ending at `today`.
    fn buckets(&self, today: NaiveDate) -> Vec<Bucket>;

    /// Bucket key for a session, or `None` when the session can never be
    /// bucketed for this period (no `ended_at`). Keys outside the window are
    /// dropped later by lookup.
    fn key_for(&self, session: &Session, today: NaiveDate) -> Option<BucketKey>;

    /// Fixed divisor for the average-per-unit summary: 1, 7, or 12
    /// regardless of how many buckets actually hold data.
    fn fixed_divisor(&self) -> u32;
}

pub(crate) fn day_label(date: NaiveDate) -> String {
    date.format("%a %-d %b").to_string()
}

pub(crate) fn month_label(year: i32, month: u32) -> String {
    // Borrow any date in the month for formatting.
    match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(date) => date.format("%b %Y").to_string(),
        None => format!("{year}-{month:02}"),
    }
}

/// Single bucket holding everything the API already filtered to today.
struct DailyBuckets;

impl BucketSpec for DailyBuckets {
    fn buckets(&self, today: NaiveDate) -> Vec<Bucket> {
        vec![Bucket {
            key: BucketKey::Day(today),
            label: today.format("%A, %-d %B").to_string(),
        }]
    }

    fn key_for(&self, _session: &Session, today: NaiveDate) -> Option<BucketKey> {
        // The caller/API guarantees daily input is already today's sessions,
        // so everything goes into the one bucket, open sessions included.
        Some(BucketKey::Day(today))
    }

    fn fixed_divisor(&self) -> u32 {
        1
    }
}

/// Seven calendar days, (today - 6) through today.
struct WeeklyBuckets;

impl BucketSpec for WeeklyBuckets {
    fn buckets(&self, today: NaiveDate) -> Vec<Bucket> {
        (0..7)
            .rev()
            .filter_map(|i| today.checked_sub_days(chrono::Days::new(i)))
            .map(|date| Bucket {
                key: BucketKey::Day(date),
                label: day_label(date),
            })
            .collect()
    }

    fn key_for(&self, session: &Session, _today: NaiveDate) -> Option<BucketKey> {
        session.ended_at.map(|t| BucketKey::Day(t.date()))
    }

    fn fixed_divisor(&self) -> u32 {
        7
    }
}

/// Twelve calendar months, (this month - 11) through this month.
struct MonthlyBuckets;

impl BucketSpec for MonthlyBuckets {
    fn buckets(&self, today: NaiveDate) -> Vec<Bucket> {
        (0..12)
            .rev()
            .filter_map(|i| today.checked_sub_months(Months::new(i)))
            .map(|date| Bucket {
                key: BucketKey::Month {
                    year: date.year(),
                    month: date.month(),
                },
                label: month_label(date.year(), date.month()),
            })
            .collect()
    }

    fn key_for(&self, session: &Session, _today: NaiveDate) -> Option<BucketKey> {
        session.ended_at.map(|t| BucketKey::Month {
            year: t.date().year(),
            month: t.date().month(),
        })
    }

    fn fixed_divisor(&self) -> u32 {
        12
    }
}
