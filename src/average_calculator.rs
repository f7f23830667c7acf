use crate::usage_data::UsageEntry;
use jiff::civil::Date;

pub const DAYS_PER_YEAR: f64 = 365.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Consumption between two chronologically adjacent entries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalAverage {
    pub from: Date,
    pub to: Date,
    pub days: f64,
    pub kwh_delta: f64,
    pub avg_per_day: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageAverages {
    pub intervals: Vec<IntervalAverage>,
    /// Absent with fewer than two entries. Zero is a real projection.
    pub yearly_projection: Option<f64>,
}

impl UsageAverages {
    pub fn average_per_day(&self) -> Option<f64> {
        self.yearly_projection.map(|projection| projection / DAYS_PER_YEAR)
    }

    pub fn total_kwh(&self) -> f64 {
        self.intervals.iter().map(|interval| interval.kwh_delta).sum()
    }

    pub fn total_days(&self) -> f64 {
        self.intervals.iter().map(|interval| interval.days).sum()
    }
}

/// Days between two dates, both taken at UTC midnight.
pub fn days_between(from: Date, to: Date) -> f64 {
    to.duration_since(from).as_secs_f64() / SECONDS_PER_DAY
}

/// Derives per-interval averages and the blended yearly projection.
///
/// `entries` must already be sorted ascending by date. Decreasing readings are not
/// rejected here and simply produce negative deltas.
pub fn calculate_averages(entries: &[UsageEntry]) -> UsageAverages {
    if entries.len() < 2 {
        return UsageAverages::default();
    }
    let intervals: Vec<IntervalAverage> = entries
        .windows(2)
        .map(|pair| {
            let (prev, curr) = (&pair[0], &pair[1]);
            let days = days_between(prev.date, curr.date);
            let kwh_delta = curr.reading - prev.reading;
            IntervalAverage {
                from: prev.date,
                to: curr.date,
                days,
                kwh_delta,
                avg_per_day: if days > 0.0 { kwh_delta / days } else { 0.0 },
            }
        })
        .collect();
    let (total_kwh, total_days) = intervals
        .iter()
        .fold((0.0, 0.0), |(kwh, days), interval| {
            (kwh + interval.kwh_delta, days + interval.days)
        });
    let avg_per_day = if total_days > 0.0 {
        total_kwh / total_days
    } else {
        0.0
    };
    UsageAverages {
        intervals,
        yearly_projection: Some(avg_per_day * DAYS_PER_YEAR),
    }
}
