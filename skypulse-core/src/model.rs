use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
    conditions::{ConditionInfo, condition_info},
    units::{AqiTier, aqi_tier},
};

/// A selectable place. Identity is derived from the coordinates, see [`Location::id`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl Location {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            country: None,
            admin1: None,
            timezone: None,
        }
    }
}

impl Default for Location {
    /// New York, used until the user picks something else.
    fn default() -> Self {
        Self {
            name: "New York".to_string(),
            latitude: 40.7128,
            longitude: -74.006,
            country: Some("United States".to_string()),
            admin1: Some("New York".to_string()),
            timezone: None,
        }
    }
}

/// Point-in-time conditions, in the upstream's metric units and field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    #[serde(with = "local_time")]
    pub time: NaiveDateTime,
    /// Seconds covered by the observation.
    #[serde(default)]
    pub interval: u32,
    pub temperature_2m: f64,
    pub relative_humidity_2m: f64,
    pub apparent_temperature: f64,
    pub is_day: u8,
    pub precipitation: f64,
    pub rain: f64,
    pub showers: f64,
    pub snowfall: f64,
    pub weather_code: i32,
    pub cloud_cover: f64,
    pub pressure_msl: f64,
    pub surface_pressure: f64,
    pub wind_speed_10m: f64,
    pub wind_direction_10m: f64,
    pub wind_gusts_10m: f64,
    pub uv_index: f64,
    pub visibility: f64,
}

impl CurrentConditions {
    pub fn is_day(&self) -> bool {
        self.is_day == 1
    }

    pub fn condition(&self) -> ConditionInfo {
        condition_info(self.weather_code, !self.is_day())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecastItem {
    pub time: NaiveDateTime,
    pub temperature: f64,
    pub weather_code: i32,
    pub precipitation_probability: f64,
    pub is_day: bool,
}

impl HourlyForecastItem {
    pub fn condition(&self) -> ConditionInfo {
        condition_info(self.weather_code, !self.is_day)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastItem {
    pub date: NaiveDate,
    pub weather_code: i32,
    pub temp_max: f64,
    pub temp_min: f64,
    pub precipitation_probability: f64,
    pub precipitation_sum: f64,
    pub sunrise: NaiveDateTime,
    pub sunset: NaiveDateTime,
    pub uv_index_max: f64,
    pub wind_speed_max: f64,
}

impl DailyForecastItem {
    pub fn condition(&self) -> ConditionInfo {
        condition_info(self.weather_code, false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityData {
    /// US AQI scale.
    pub aqi: f64,
    pub pm10: f64,
    pub pm2_5: f64,
    pub carbon_monoxide: f64,
    pub nitrogen_dioxide: f64,
    pub sulphur_dioxide: f64,
    pub ozone: f64,
    pub last_updated: NaiveDateTime,
}

impl AirQualityData {
    pub fn tier(&self) -> AqiTier {
        aqi_tier(self.aqi)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Minor,
    Moderate,
    Severe,
    Extreme,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub id: String,
    pub event: String,
    pub headline: String,
    pub description: String,
    pub severity: AlertSeverity,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

/// Everything the weather views render for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    pub location: Location,
    pub current: CurrentConditions,
    pub hourly: Vec<HourlyForecastItem>,
    pub daily: Vec<DailyForecastItem>,
    /// Empty means "no active alerts".
    pub alerts: Vec<WeatherAlert>,
    pub last_updated: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::System => "system",
        }
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ThemeMode {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            "system" => Ok(ThemeMode::System),
            _ => Err(anyhow::anyhow!(
                "Unknown theme '{value}'. Supported themes: light, dark, system."
            )),
        }
    }
}

/// Parse an upstream local timestamp (`2024-01-01T10:00`, seconds optional).
pub fn parse_local_time(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Serde adapter for upstream local timestamps without an offset.
pub mod local_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M";

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_local_time(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid local time '{s}'")))
    }
}
