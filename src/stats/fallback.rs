//! Degradation policy for the statistics screen: when the backend cannot be
//! reached, produce an internally consistent sample view instead of handing
//! the chart layer a hole.

use chrono::{Local, NaiveDate};
use rand::Rng;

use super::aggregate::{build_series, summarize, ChartSeries, StatsView, Summary};
use super::period::StatsPeriod;
use crate::api::ApiClient;

/// Fetches and aggregates statistics for `period`. On any API failure the
/// returned view is fully populated sample data flagged `synthetic`.
pub async fn load_statistics(api: &dyn ApiClient, period: StatsPeriod) -> StatsView {
    let today = Local::now().date_naive();
    match api.statistics(period).await {
        Ok(payload) => StatsView {
            period,
            series: build_series(&payload.sessions, period, today),
            summary: summarize(&payload.sessions, period, today),
            task_rollups: payload.task_statistics,
            synthetic: false,
        },
        Err(err) => {
            log::warn!("statistics unavailable, showing sample data: {err}");
            synthetic_view(period, today)
        }
    }
}

/// Sample view with the same shape guarantees as the real one: bucket-count
/// sequences of equal length and a summary consistent with the series.
pub fn synthetic_view(period: StatsPeriod, today: NaiveDate) -> StatsView {
    let mut rng = rand::thread_rng();
    let buckets = period.bucketing().buckets(today);

    let mut series = ChartSeries {
        labels: buckets.iter().map(|b| b.label.clone()).collect(),
        full_counts: Vec::with_capacity(buckets.len()),
        half_counts: Vec::with_capacity(buckets.len()),
        minute_totals: Vec::with_capacity(buckets.len()),
    };

    for _ in &buckets {
        let (full, half) = match period {
            StatsPeriod::Daily => (5, 3),
            StatsPeriod::Weekly => (rng.gen_range(1..=3), rng.gen_range(0..=2)),
            StatsPeriod::Monthly => (rng.gen_range(5..=24), rng.gen_range(2..=11)),
        };
        series.full_counts.push(full);
        series.half_counts.push(half);
        series
            .minute_totals
            .push(f64::from(full) * 25.0 + f64::from(half) * 15.0);
    }

    let total_work_minutes: f64 = series.minute_totals.iter().sum();
    let full_pomodoros: u32 = series.full_counts.iter().sum();
    let half_pomodoros: u32 = series.half_counts.iter().sum();

    // Best bucket: most full pomodoros, earliest wins ties.
    let best_bucket = series
        .full_counts
        .iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| a.cmp(b).then(ib.cmp(ia)))
        .map(|(i, _)| series.labels[i].clone());

    let summary = Summary {
        total_work_minutes,
        full_pomodoros,
        half_pomodoros,
        average_minutes: total_work_minutes / f64::from(period.bucketing().fixed_divisor()),
        best_bucket,
    };

    StatsView {
        period,
        series,
        summary,
        task_rollups: Vec::new(),
        synthetic: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use crate::models::StatisticsPayload;

    #[test]
    fn synthetic_view_is_internally_consistent() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        for (period, buckets) in [
            (StatsPeriod::Daily, 1),
            (StatsPeriod::Weekly, 7),
            (StatsPeriod::Monthly, 12),
        ] {
            let view = synthetic_view(period, today);
            assert!(view.synthetic);
            assert_eq!(view.series.labels.len(), buckets);
            assert_eq!(view.series.full_counts.len(), buckets);
            assert_eq!(view.series.half_counts.len(), buckets);
            assert_eq!(view.series.minute_totals.len(), buckets);
            assert_eq!(
                view.summary.full_pomodoros,
                view.series.full_counts.iter().sum::<u32>()
            );
            assert!(view.summary.best_bucket.is_some());
            let expected_total: f64 = view.series.minute_totals.iter().sum();
            assert!((view.summary.total_work_minutes - expected_total).abs() < 1e-9);
        }
    }

    #[tokio::test]
    async fn load_statistics_falls_back_when_api_is_down() {
        let api = MockApi::new();
        api.fail_stats();
        let view = load_statistics(&api, StatsPeriod::Weekly).await;
        assert!(view.synthetic);
        assert_eq!(view.series.labels.len(), 7);
    }

    #[tokio::test]
    async fn load_statistics_uses_real_payload_when_available() {
        let api = MockApi::new();
        api.set_stats(StatisticsPayload::default());
        let view = load_statistics(&api, StatsPeriod::Daily).await;
        assert!(!view.synthetic);
        assert_eq!(view.series.labels.len(), 1);
        assert_eq!(view.summary.full_pomodoros, 0);
    }
}
