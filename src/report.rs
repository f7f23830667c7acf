use crate::average_calculator::UsageAverages;
use crate::usage_data::UsageEntry;
use std::fmt::Write;

pub fn render_entries(entries: &[UsageEntry]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>5}  {:<10}  {:>12}", "#", "Date", "KWH");
    for (index, entry) in entries.iter().enumerate() {
        let _ = writeln!(out, "{:>5}  {:<10}  {:>12}", index, entry.date, entry.reading);
    }
    out
}

pub fn render_averages(averages: &UsageAverages) -> String {
    let mut out = String::new();
    if !averages.intervals.is_empty() {
        let _ = writeln!(
            out,
            "{:<10}  {:<10}  {:>7}  {:>10}  {:>8}",
            "From", "To", "Days", "KWH Used", "Avg/Day"
        );
        for interval in &averages.intervals {
            let _ = writeln!(
                out,
                "{:<10}  {:<10}  {:>7.1}  {:>10.2}  {:>8.2}",
                interval.from, interval.to, interval.days, interval.kwh_delta, interval.avg_per_day
            );
        }
        if let Some(avg_per_day) = averages.average_per_day() {
            let _ = writeln!(
                out,
                "Total: {:.2} KWH over {:.1} days ({avg_per_day:.2} KWH/day)",
                averages.total_kwh(),
                averages.total_days()
            );
        }
    }
    if let Some(projection) = averages.yearly_projection {
        let _ = writeln!(out, "Projected 12-month Consumption: {projection:.2} KWH");
    }
    out
}
