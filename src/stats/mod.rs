pub mod aggregate;
pub mod fallback;
pub mod period;

pub use aggregate::{build_series, summarize, ChartSeries, StatsView, Summary, FULL_POMODORO_MINUTES};
pub use fallback::{load_statistics, synthetic_view};
pub use period::StatsPeriod;
