//! Display conversions for raw metric measurements.
//!
//! Raw values are always kept in metric units; everything here is a pure
//! function of its arguments. Rounding is half away from zero (`f64::round`)
//! and always happens after unit conversion.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

const KPH_TO_MPH: f64 = 0.621371;

/// Display unit preference. Also selects metric vs imperial wind speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            TemperatureUnit::Celsius => TemperatureUnit::Fahrenheit,
            TemperatureUnit::Fahrenheit => TemperatureUnit::Celsius,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

impl std::fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TemperatureUnit {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "celsius" | "c" => Ok(TemperatureUnit::Celsius),
            "fahrenheit" | "f" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(anyhow::anyhow!(
                "Unknown unit '{value}'. Supported units: celsius, fahrenheit."
            )),
        }
    }
}

/// Temperature in the target unit, rounded to a whole degree.
pub fn temperature_display(celsius: f64, unit: TemperatureUnit) -> i64 {
    let value = match unit {
        TemperatureUnit::Celsius => celsius,
        TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
    };
    value.round() as i64
}

pub fn format_temperature(celsius: f64, unit: TemperatureUnit) -> String {
    format!("{}{}", temperature_display(celsius, unit), unit.symbol())
}

/// Wind speed as km/h (celsius) or mph (fahrenheit), rounded.
pub fn wind_speed_display(kph: f64, unit: TemperatureUnit) -> i64 {
    match unit {
        TemperatureUnit::Celsius => kph.round() as i64,
        TemperatureUnit::Fahrenheit => (kph * KPH_TO_MPH).round() as i64,
    }
}

pub fn format_wind_speed(kph: f64, unit: TemperatureUnit) -> String {
    let suffix = match unit {
        TemperatureUnit::Celsius => "km/h",
        TemperatureUnit::Fahrenheit => "mph",
    };
    format!("{} {suffix}", wind_speed_display(kph, unit))
}

pub fn visibility_display(meters: f64) -> String {
    if meters >= 1000.0 {
        format!("{:.1} km", meters / 1000.0)
    } else {
        format!("{} m", meters.round() as i64)
    }
}

pub fn pressure_display(hpa: f64) -> String {
    format!("{} hPa", hpa.round() as i64)
}

pub fn humidity_display(percent: f64) -> String {
    format!("{}%", percent.round() as i64)
}

pub fn precipitation_probability_display(percent: f64) -> String {
    format!("{}%", percent.round() as i64)
}

/// Risk tier on the UV index scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UvTier {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl UvTier {
    pub fn label(&self) -> &'static str {
        match self {
            UvTier::Low => "Low",
            UvTier::Moderate => "Moderate",
            UvTier::High => "High",
            UvTier::VeryHigh => "Very High",
            UvTier::Extreme => "Extreme",
        }
    }

    pub fn color_class(&self) -> &'static str {
        match self {
            UvTier::Low => "text-green-500",
            UvTier::Moderate => "text-yellow-500",
            UvTier::High => "text-orange-500",
            UvTier::VeryHigh => "text-red-500",
            UvTier::Extreme => "text-purple-500",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvIndex {
    /// Rounded to one decimal.
    pub value: f64,
    pub tier: UvTier,
}

impl UvIndex {
    pub fn color_class(&self) -> &'static str {
        self.tier.color_class()
    }
}

/// Classify a UV index. Each boundary belongs to the lower tier.
pub fn uv_index_tier(uv: f64) -> UvIndex {
    let tier = if uv <= 2.0 {
        UvTier::Low
    } else if uv <= 5.0 {
        UvTier::Moderate
    } else if uv <= 7.0 {
        UvTier::High
    } else if uv <= 10.0 {
        UvTier::VeryHigh
    } else {
        UvTier::Extreme
    };

    UvIndex {
        value: (uv * 10.0).round() / 10.0,
        tier,
    }
}

/// US EPA air quality category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AqiTier {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiTier {
    pub fn label(&self) -> &'static str {
        match self {
            AqiTier::Good => "Good",
            AqiTier::Moderate => "Moderate",
            AqiTier::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiTier::Unhealthy => "Unhealthy",
            AqiTier::VeryUnhealthy => "Very Unhealthy",
            AqiTier::Hazardous => "Hazardous",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            AqiTier::Good => "bg-green-500",
            AqiTier::Moderate => "bg-yellow-500",
            AqiTier::UnhealthyForSensitiveGroups => "bg-orange-500",
            AqiTier::Unhealthy => "bg-red-500",
            AqiTier::VeryUnhealthy => "bg-purple-500",
            AqiTier::Hazardous => "bg-rose-900",
        }
    }
}

pub fn aqi_tier(aqi: f64) -> AqiTier {
    if aqi <= 50.0 {
        AqiTier::Good
    } else if aqi <= 100.0 {
        AqiTier::Moderate
    } else if aqi <= 150.0 {
        AqiTier::UnhealthyForSensitiveGroups
    } else if aqi <= 200.0 {
        AqiTier::Unhealthy
    } else if aqi <= 300.0 {
        AqiTier::VeryUnhealthy
    } else {
        AqiTier::Hazardous
    }
}

/// "Today", "Tomorrow", or the short weekday name, by calendar date.
pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        return "Today".to_string();
    }
    if today.succ_opt() == Some(date) {
        return "Tomorrow".to_string();
    }
    date.format("%a").to_string()
}

/// Coarse "how long ago" label.
pub fn relative_time<Tz: TimeZone>(then: &DateTime<Tz>, now: &DateTime<Tz>) -> String {
    let minutes = now.clone().signed_duration_since(then.clone()).num_minutes();

    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    format!("{}d ago", hours / 24)
}

pub fn is_night(hour: u32) -> bool {
    !(6..20).contains(&hour)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    Dawn,
    Day,
    Dusk,
    Night,
}

pub fn time_of_day(hour: u32) -> TimeOfDay {
    match hour {
        5..=6 => TimeOfDay::Dawn,
        7..=16 => TimeOfDay::Day,
        17..=19 => TimeOfDay::Dusk,
        _ => TimeOfDay::Night,
    }
}

/// 12-hour clock hour, e.g. `3 PM`.
pub fn format_hour(time: NaiveTime) -> String {
    let (pm, hour) = time.hour12();
    format!("{hour} {}", if pm { "PM" } else { "AM" })
}

/// 12-hour clock time, e.g. `6:05 AM`.
pub fn format_clock(time: NaiveTime) -> String {
    let (pm, hour) = time.hour12();
    format!("{hour}:{:02} {}", time.minute(), if pm { "PM" } else { "AM" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn temperature_conversion_reference_points() {
        assert_eq!(temperature_display(0.0, TemperatureUnit::Fahrenheit), 32);
        assert_eq!(temperature_display(100.0, TemperatureUnit::Fahrenheit), 212);
        assert_eq!(temperature_display(20.0, TemperatureUnit::Celsius), 20);
        assert_eq!(temperature_display(-40.0, TemperatureUnit::Fahrenheit), -40);
    }

    #[test]
    fn temperature_rounds_after_conversion() {
        // 20.3C = 68.54F -> 69, whereas rounding first would give 20C = 68F.
        assert_eq!(temperature_display(20.3, TemperatureUnit::Fahrenheit), 69);
        assert_eq!(temperature_display(15.5, TemperatureUnit::Celsius), 16);
        assert_eq!(temperature_display(-2.5, TemperatureUnit::Celsius), -3);
    }

    #[test]
    fn format_temperature_appends_symbol() {
        assert_eq!(format_temperature(15.4, TemperatureUnit::Celsius), "15°C");
        assert_eq!(format_temperature(15.4, TemperatureUnit::Fahrenheit), "60°F");
    }

    #[test]
    fn wind_speed_uses_unit_as_metric_imperial_switch() {
        assert_eq!(wind_speed_display(10.4, TemperatureUnit::Celsius), 10);
        assert_eq!(wind_speed_display(100.0, TemperatureUnit::Fahrenheit), 62);
        assert_eq!(format_wind_speed(20.0, TemperatureUnit::Celsius), "20 km/h");
        assert_eq!(format_wind_speed(20.0, TemperatureUnit::Fahrenheit), "12 mph");
    }

    #[test]
    fn visibility_switches_to_km_at_1000m() {
        assert_eq!(visibility_display(999.4), "999 m");
        assert_eq!(visibility_display(1000.0), "1.0 km");
        assert_eq!(visibility_display(24140.0), "24.1 km");
    }

    #[test]
    fn pressure_and_humidity_are_rounded_with_suffix() {
        assert_eq!(pressure_display(1013.6), "1014 hPa");
        assert_eq!(humidity_display(64.4), "64%");
        assert_eq!(precipitation_probability_display(35.0), "35%");
    }

    #[test]
    fn uv_tier_boundaries_belong_to_lower_tier() {
        assert_eq!(uv_index_tier(2.0).tier, UvTier::Low);
        assert_eq!(uv_index_tier(2.01).tier, UvTier::Moderate);
        assert_eq!(uv_index_tier(5.0).tier, UvTier::Moderate);
        assert_eq!(uv_index_tier(7.0).tier, UvTier::High);
        assert_eq!(uv_index_tier(10.0).tier, UvTier::VeryHigh);
        assert_eq!(uv_index_tier(10.5).tier, UvTier::Extreme);
        assert_eq!(uv_index_tier(2.0).tier.label(), "Low");
    }

    #[test]
    fn uv_value_is_rounded_to_one_decimal() {
        let uv = uv_index_tier(6.46);
        assert_eq!(uv.value, 6.5);
        assert_eq!(uv.color_class(), "text-orange-500");
    }

    #[test]
    fn aqi_tier_boundaries() {
        assert_eq!(aqi_tier(50.0).label(), "Good");
        assert_eq!(aqi_tier(51.0).label(), "Moderate");
        assert_eq!(aqi_tier(150.0), AqiTier::UnhealthyForSensitiveGroups);
        assert_eq!(aqi_tier(200.0), AqiTier::Unhealthy);
        assert_eq!(aqi_tier(300.0), AqiTier::VeryUnhealthy);
        assert_eq!(aqi_tier(301.0), AqiTier::Hazardous);
        assert_eq!(aqi_tier(301.0).color(), "bg-rose-900");
    }

    #[test]
    fn day_label_uses_calendar_dates() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 4).expect("valid date"); // Monday
        let tomorrow = NaiveDate::from_ymd_opt(2024, 3, 5).expect("valid date");
        let later = NaiveDate::from_ymd_opt(2024, 3, 7).expect("valid date");

        assert_eq!(day_label(today, today), "Today");
        assert_eq!(day_label(tomorrow, today), "Tomorrow");
        assert_eq!(day_label(later, today), "Thu");
    }

    #[test]
    fn relative_time_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap();

        assert_eq!(relative_time(&now, &now), "Just now");
        assert_eq!(relative_time(&(now - chrono::Duration::minutes(5)), &now), "5m ago");
        assert_eq!(relative_time(&(now - chrono::Duration::hours(3)), &now), "3h ago");
        assert_eq!(relative_time(&(now - chrono::Duration::days(2)), &now), "2d ago");
    }

    #[test]
    fn night_and_time_of_day() {
        assert!(is_night(5));
        assert!(!is_night(6));
        assert!(is_night(20));
        assert_eq!(time_of_day(5), TimeOfDay::Dawn);
        assert_eq!(time_of_day(12), TimeOfDay::Day);
        assert_eq!(time_of_day(18), TimeOfDay::Dusk);
        assert_eq!(time_of_day(23), TimeOfDay::Night);
    }

    #[test]
    fn clock_formatting() {
        let t = NaiveTime::from_hms_opt(15, 5, 0).expect("valid time");
        assert_eq!(format_hour(t), "3 PM");
        assert_eq!(format_clock(t), "3:05 PM");

        let midnight = NaiveTime::from_hms_opt(0, 0, 0).expect("valid time");
        assert_eq!(format_hour(midnight), "12 AM");
    }

    #[test]
    fn unit_parse_and_toggle() {
        assert_eq!(
            TemperatureUnit::try_from("Fahrenheit").expect("parse"),
            TemperatureUnit::Fahrenheit
        );
        assert!(TemperatureUnit::try_from("kelvin").is_err());
        assert_eq!(TemperatureUnit::Celsius.toggle(), TemperatureUnit::Fahrenheit);
        assert_eq!(TemperatureUnit::default(), TemperatureUnit::Celsius);
    }
}
