use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::period::{day_label, month_label, BucketKey, StatsPeriod};
use crate::models::{Session, SessionType, TaskRollup};

/// A work session counts as a full pomodoro from this duration up.
pub const FULL_POMODORO_MINUTES: f64 = 25.0;

/// Parallel, equal-length series handed to chart rendering. One entry per
/// bucket of the requested period, chronological.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub full_counts: Vec<u32>,
    pub half_counts: Vec<u32>,
    pub minute_totals: Vec<f64>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Headline numbers computed over the whole (unbucketed) session list.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total_work_minutes: f64,
    pub full_pomodoros: u32,
    pub half_pomodoros: u32,
    /// Total minutes divided by the period's fixed unit count (1, 7 or 12),
    /// not by the number of buckets that actually hold data.
    pub average_minutes: f64,
    /// Label of the day (daily/weekly) or month (monthly) with the most work
    /// sessions; `None` when there is nothing to rank.
    pub best_bucket: Option<String>,
}

/// Everything the statistics screen needs for one period.
#[derive(Debug, Clone, Serialize)]
pub struct StatsView {
    pub period: StatsPeriod,
    pub series: ChartSeries,
    pub summary: Summary,
    pub task_rollups: Vec<TaskRollup>,
    /// True when the backend was unreachable and the data is sample filler.
    pub synthetic: bool,
}

enum PomodoroClass {
    Full,
    Half,
    Empty,
}

fn classify(duration_minutes: f64) -> PomodoroClass {
    if duration_minutes >= FULL_POMODORO_MINUTES {
        PomodoroClass::Full
    } else if duration_minutes > 0.0 {
        PomodoroClass::Half
    } else {
        PomodoroClass::Empty
    }
}

/// Buckets work sessions into the period's chart series. Non-work sessions
/// never count; weekly/monthly additionally require a close timestamp and
/// silently drop sessions outside the window.
pub fn build_series(sessions: &[Session], period: StatsPeriod, today: NaiveDate) -> ChartSeries {
    let bucketing = period.bucketing();
    let buckets = bucketing.buckets(today);

    let mut series = ChartSeries {
        labels: buckets.iter().map(|b| b.label.clone()).collect(),
        full_counts: vec![0; buckets.len()],
        half_counts: vec![0; buckets.len()],
        minute_totals: vec![0.0; buckets.len()],
    };
    let index_of: HashMap<BucketKey, usize> = buckets
        .iter()
        .enumerate()
        .map(|(i, b)| (b.key, i))
        .collect();

    for session in sessions {
        if session.session_type != SessionType::Work {
            continue;
        }
        let Some(key) = bucketing.key_for(session, today) else {
            continue;
        };
        let Some(&i) = index_of.get(&key) else {
            continue; // outside the window
        };
        series.minute_totals[i] += session.duration_minutes;
        match classify(session.duration_minutes) {
            PomodoroClass::Full => series.full_counts[i] += 1,
            PomodoroClass::Half => series.half_counts[i] += 1,
            PomodoroClass::Empty => {} // minutes only
        }
    }

    series
}

/// Summary over the full input. The best bucket ranks by raw work-session
/// count; ties go to the first key encountered in input order.
pub fn summarize(sessions: &[Session], period: StatsPeriod, today: NaiveDate) -> Summary {
    let mut total_work_minutes = 0.0;
    let mut full_pomodoros = 0;
    let mut half_pomodoros = 0;
    // Insertion-ordered counts so tie-breaking is deterministic.
    let mut bucket_order: Vec<String> = Vec::new();
    let mut bucket_counts: HashMap<String, u32> = HashMap::new();

    for session in sessions {
        if session.session_type != SessionType::Work {
            continue;
        }
        total_work_minutes += session.duration_minutes;
        match classify(session.duration_minutes) {
            PomodoroClass::Full => full_pomodoros += 1,
            PomodoroClass::Half => half_pomodoros += 1,
            PomodoroClass::Empty => {}
        }

        if let Some(ended_at) = session.ended_at {
            let label = match period {
                StatsPeriod::Monthly => {
                    month_label(ended_at.date().year(), ended_at.date().month())
                }
                _ => day_label(ended_at.date()),
            };
            if !bucket_counts.contains_key(&label) {
                bucket_order.push(label.clone());
            }
            *bucket_counts.entry(label).or_insert(0) += 1;
        }
    }

    let mut best_bucket: Option<(String, u32)> = None;
    for label in &bucket_order {
        let count = bucket_counts[label];
        match &best_bucket {
            Some((_, best)) if *best >= count => {}
            _ => best_bucket = Some((label.clone(), count)),
        }
    }

    let divisor = period.bucketing().fixed_divisor() as f64;
    Summary {
        total_work_minutes,
        full_pomodoros,
        half_pomodoros,
        average_minutes: total_work_minutes / divisor,
        best_bucket: best_bucket.map(|(label, _)| label),
    }
}
