//! Day-aligned display windows over the forecast series.
//!
//! Hourly data is assumed to come in 24-entry, midnight-aligned days with
//! day 0 at index 0, which is what Open-Meteo returns for `timezone=auto`.

use chrono::NaiveDate;

use crate::types::{DailySeries, HourlySeries};

pub const DAILY_WINDOW_DAYS: usize = 7;
pub const HOURS_PER_DAY: usize = 24;
/// Length of the compact hourly strip on the current-conditions card.
pub const HOURLY_STRIP_LEN: usize = 12;

/// Index of `today` in the daily series, or 0 when the series doesn't contain it.
pub fn today_index(series: &DailySeries, today: NaiveDate) -> usize {
    series.time.iter().position(|d| *d == today).unwrap_or(0)
}

/// Up to seven days starting at today.
pub fn daily_window(series: &DailySeries, today: NaiveDate) -> DailySeries {
    series.slice(today_index(series, today), DAILY_WINDOW_DAYS)
}

/// First hourly index shown for `selected_day`.
///
/// Today starts at the current hour; later days start at their midnight.
pub fn hourly_start(selected_day: usize, current_hour: u32) -> usize {
    if selected_day == 0 {
        current_hour as usize
    } else {
        selected_day.saturating_mul(HOURS_PER_DAY)
    }
}

/// Twenty-four hours for the selected day, clipped to the series.
pub fn hourly_window(series: &HourlySeries, selected_day: usize, current_hour: u32) -> HourlySeries {
    hourly_strip(series, selected_day, current_hour, HOURS_PER_DAY)
}

/// `len` hours for the selected day, clipped to the series.
pub fn hourly_strip(
    series: &HourlySeries,
    selected_day: usize,
    current_hour: u32,
    len: usize,
) -> HourlySeries {
    series.slice(hourly_start(selected_day, current_hour), len)
}
