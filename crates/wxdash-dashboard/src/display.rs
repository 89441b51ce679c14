//! View models for the dashboard.
//!
//! Everything here is pure: a [`WeatherBundle`] plus the selected day and the
//! current instant go in, serializable cards come out.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::Serialize;
use wxdash_core::TemperatureUnit;
use wxdash_weather::window::{daily_window, hourly_strip, hourly_window, HOURLY_STRIP_LEN};
use wxdash_weather::{
    describe_wmo_code, to_fahrenheit, DailySeries, HourlySeries, Location, WeatherBundle,
    WeatherCategory,
};

/// Rounds half up, so -0.5 shows as 0 rather than -1.
fn round_display(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn rounded_at(series: &[Option<f64>], i: usize) -> Option<i64> {
    series.get(i).copied().flatten().map(round_display)
}

/// A temperature in both units, rounded for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemperaturePair {
    pub celsius: i64,
    pub fahrenheit: i64,
}

impl TemperaturePair {
    pub fn from_celsius(celsius: f64) -> Self {
        Self {
            celsius: round_display(celsius),
            fahrenheit: round_display(to_fahrenheit(celsius)),
        }
    }

    /// "72°F / 22°C", or Celsius first when that is the preferred unit.
    pub fn format(&self, unit: TemperatureUnit) -> String {
        match unit {
            TemperatureUnit::Celsius => format!("{}°C / {}°F", self.celsius, self.fahrenheit),
            TemperatureUnit::Auto | TemperatureUnit::Fahrenheit => {
                format!("{}°F / {}°C", self.fahrenheit, self.celsius)
            }
        }
    }

    /// Just the preferred unit, e.g. "72°".
    pub fn short(&self, unit: TemperatureUnit) -> String {
        match unit {
            TemperatureUnit::Celsius => format!("{}°", self.celsius),
            TemperatureUnit::Auto | TemperatureUnit::Fahrenheit => format!("{}°", self.fahrenheit),
        }
    }
}

/// "Today" for today, the full weekday name otherwise.
pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else {
        date.format("%A").to_string()
    }
}

/// "2 PM"
pub fn hour_label(time: NaiveDateTime) -> String {
    time.format("%-I %p").to_string()
}

/// "Boston, US"
pub fn location_title(location: &Location) -> String {
    if location.country.is_empty() {
        location.name.clone()
    } else {
        format!("{}, {}", location.name, location.country)
    }
}

/// Search result line including the region, e.g. "Boston, Massachusetts, US".
pub fn location_label(location: &Location) -> String {
    match location.region.as_deref() {
        Some(region) if !region.is_empty() => {
            format!("{}, {}, {}", location.name, region, location.country)
        }
        _ => location_title(location),
    }
}

pub fn hourly_heading(selected_day: usize) -> &'static str {
    if selected_day == 0 {
        "Hourly Forecast - Weather Details"
    } else {
        "Hourly Forecast - Full day (00:00 - 23:00)"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentCard {
    pub temperature: TemperaturePair,
    pub temperature_text: String,
    pub category: WeatherCategory,
    pub icon: &'static str,
    pub description: &'static str,
    pub wind_kmh: i64,
    /// Humidity of the current local hour; absent when the series doesn't cover it
    pub humidity: Option<i64>,
    pub observed_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCard {
    pub date: NaiveDate,
    pub label: String,
    pub high: TemperaturePair,
    pub low: TemperaturePair,
    pub high_text: String,
    pub low_text: String,
    pub category: WeatherCategory,
    pub icon: &'static str,
    pub sunrise: String,
    pub sunset: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourCard {
    pub time: NaiveDateTime,
    pub label: String,
    pub temperature: TemperaturePair,
    pub temperature_text: String,
    pub category: WeatherCategory,
    pub icon: &'static str,
    pub humidity: Option<i64>,
    pub precipitation_probability: Option<i64>,
    pub wind_kmh: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastView {
    pub title: String,
    pub timezone: String,
    pub current: CurrentCard,
    pub days: Vec<DayCard>,
    pub selected_day: usize,
    pub hourly_heading: &'static str,
    pub hours: Vec<HourCard>,
    /// Compact strip on the current-conditions card, starting at the current hour
    pub strip: Vec<HourCard>,
}

pub fn current_card(bundle: &WeatherBundle, unit: TemperatureUnit, local_now: NaiveDateTime) -> CurrentCard {
    let current = &bundle.current;
    let temperature = TemperaturePair::from_celsius(current.temperature_2m);
    CurrentCard {
        temperature,
        temperature_text: temperature.format(unit),
        category: current.category(),
        icon: current.category().icon_name(),
        description: describe_wmo_code(current.weather_code),
        wind_kmh: round_display(current.wind_speed_10m),
        humidity: bundle.humidity_at(local_now).map(round_display),
        observed_at: current.time,
    }
}

pub fn day_cards(daily: &DailySeries, today: NaiveDate, unit: TemperatureUnit) -> Vec<DayCard> {
    daily
        .time
        .iter()
        .zip(&daily.temperature_2m_max)
        .zip(&daily.temperature_2m_min)
        .zip(&daily.weather_code)
        .zip(daily.sunrise.iter().zip(&daily.sunset))
        .map(|((((date, max), min), code), (sunrise, sunset))| {
            let high = TemperaturePair::from_celsius(*max);
            let low = TemperaturePair::from_celsius(*min);
            let category = WeatherCategory::from_wmo_code(*code);
            DayCard {
                date: *date,
                label: day_label(*date, today),
                high,
                low,
                high_text: high.format(unit),
                low_text: low.format(unit),
                category,
                icon: category.icon_name(),
                sunrise: sunrise.format("%H:%M").to_string(),
                sunset: sunset.format("%H:%M").to_string(),
            }
        })
        .collect()
}

pub fn hour_cards(hourly: &HourlySeries, unit: TemperatureUnit) -> Vec<HourCard> {
    hourly
        .time
        .iter()
        .zip(&hourly.temperature_2m)
        .zip(&hourly.weather_code)
        .enumerate()
        .map(|(i, ((time, temp), code))| {
            let temperature = TemperaturePair::from_celsius(*temp);
            let category = WeatherCategory::from_wmo_code(*code);
            HourCard {
                time: *time,
                label: hour_label(*time),
                temperature,
                temperature_text: temperature.format(unit),
                category,
                icon: category.icon_name(),
                humidity: rounded_at(&hourly.relative_humidity_2m, i),
                precipitation_probability: rounded_at(&hourly.precipitation_probability, i),
                wind_kmh: rounded_at(&hourly.wind_speed_10m, i),
            }
        })
        .collect()
}

/// Build the whole forecast panel. "Today" and the current hour are taken at
/// the forecast location, not on the host.
pub fn forecast_view(
    location: &Location,
    bundle: &WeatherBundle,
    selected_day: usize,
    unit: TemperatureUnit,
    now: DateTime<Utc>,
) -> ForecastView {
    let local_now = bundle.local_time(now);
    let today = local_now.date();
    let hour = local_now.hour();

    ForecastView {
        title: location_title(location),
        timezone: bundle.timezone.clone(),
        current: current_card(bundle, unit, local_now),
        days: day_cards(&daily_window(&bundle.daily, today), today, unit),
        selected_day,
        hourly_heading: hourly_heading(selected_day),
        hours: hour_cards(&hourly_window(&bundle.hourly, selected_day, hour), unit),
        strip: hour_cards(&hourly_strip(&bundle.hourly, 0, hour, HOURLY_STRIP_LEN), unit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use wxdash_weather::CurrentWeather;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
    }

    fn boston() -> Location {
        Location {
            name: "Boston".into(),
            region: Some("Massachusetts".into()),
            country: "US".into(),
            latitude: 42.3601,
            longitude: -71.0589,
        }
    }

    /// Eight days from Oct 18 in a UTC-4 zone.
    fn bundle() -> WeatherBundle {
        let days: Vec<NaiveDate> = (18..26).map(date).collect();
        let start = date(18).and_hms_opt(0, 0, 0).unwrap();
        let hours = days.len() * 24;
        WeatherBundle {
            current: CurrentWeather {
                temperature_2m: 22.2,
                weather_code: 2,
                wind_speed_10m: 11.6,
                time: date(18).and_hms_opt(14, 0, 0).unwrap(),
            },
            hourly: HourlySeries {
                time: (0..hours).map(|i| start + Duration::hours(i as i64)).collect(),
                temperature_2m: (0..hours).map(|i| (i % 24) as f64).collect(),
                relative_humidity_2m: (0..hours).map(|i| Some(40.0 + (i % 24) as f64)).collect(),
                precipitation_probability: vec![None; hours],
                wind_speed_10m: vec![Some(9.6); hours],
                weather_code: vec![61; hours],
            },
            daily: DailySeries {
                sunrise: days.iter().map(|d| d.and_hms_opt(7, 5, 0).unwrap()).collect(),
                sunset: days.iter().map(|d| d.and_hms_opt(17, 55, 0).unwrap()).collect(),
                temperature_2m_max: vec![18.0; days.len()],
                temperature_2m_min: vec![-0.5; days.len()],
                weather_code: vec![0; days.len()],
                time: days,
            },
            timezone: "America/New_York".into(),
            utc_offset_seconds: -4 * 3600,
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn temperature_pair_formats() {
        let pair = TemperaturePair::from_celsius(22.2);
        assert_eq!(pair, TemperaturePair { celsius: 22, fahrenheit: 72 });
        assert_eq!(pair.format(TemperatureUnit::Auto), "72°F / 22°C");
        assert_eq!(pair.format(TemperatureUnit::Celsius), "22°C / 72°F");
        assert_eq!(pair.short(TemperatureUnit::Fahrenheit), "72°");
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(TemperaturePair::from_celsius(-0.5).celsius, 0);
        assert_eq!(TemperaturePair::from_celsius(0.5).celsius, 1);
        assert_eq!(TemperaturePair::from_celsius(-40.0).fahrenheit, -40);
    }

    #[test]
    fn labels() {
        assert_eq!(day_label(date(18), date(18)), "Today");
        assert_eq!(day_label(date(19), date(18)), "Monday");
        assert_eq!(hour_label(date(18).and_hms_opt(14, 0, 0).unwrap()), "2 PM");
        assert_eq!(hour_label(date(18).and_hms_opt(0, 0, 0).unwrap()), "12 AM");
        assert_eq!(location_title(&boston()), "Boston, US");
        assert_eq!(location_label(&boston()), "Boston, Massachusetts, US");
    }

    #[test]
    fn forecast_view_uses_location_time() {
        // 02:30 UTC on the 19th is 22:30 on the 18th in Boston
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 2, 30, 0).unwrap();
        let view = forecast_view(&boston(), &bundle(), 0, TemperatureUnit::Auto, now);

        assert_eq!(view.title, "Boston, US");
        assert_eq!(view.days.len(), 7);
        assert_eq!(view.days[0].label, "Today");
        assert_eq!(view.days[0].date, date(18));
        assert_eq!(view.days[0].sunrise, "07:05");
        assert_eq!(view.days[0].low.celsius, 0);

        assert_eq!(view.hours.len(), 24);
        assert_eq!(view.hours[0].label, "10 PM");
        assert_eq!(view.strip.len(), HOURLY_STRIP_LEN);
        assert_eq!(view.hourly_heading, "Hourly Forecast - Weather Details");

        assert_eq!(view.current.humidity, Some(62));
        assert_eq!(view.current.temperature_text, "72°F / 22°C");
        assert_eq!(view.current.wind_kmh, 12);
        assert_eq!(view.current.category, WeatherCategory::Cloudy);
    }

    #[test]
    fn forecast_view_later_day_starts_at_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 18, 0, 0).unwrap();
        let view = forecast_view(&boston(), &bundle(), 2, TemperatureUnit::Celsius, now);

        assert_eq!(view.hours.len(), 24);
        assert_eq!(view.hours[0].time, date(20).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(view.hours[0].precipitation_probability, None);
        assert_eq!(view.hours[0].wind_kmh, Some(10));
        assert_eq!(view.hourly_heading, "Hourly Forecast - Full day (00:00 - 23:00)");
        assert!(view.days[0].high_text.starts_with("18°C"));
    }

    #[test]
    fn humidity_absent_outside_series() {
        let now = Utc.with_ymd_and_hms(2026, 12, 1, 12, 0, 0).unwrap();
        let view = forecast_view(&boston(), &bundle(), 0, TemperatureUnit::Auto, now);
        assert_eq!(view.current.humidity, None);
    }
}
