//! Turn raw upstream payloads into the application model.
//!
//! Every function here is pure: the caller supplies "now" so results are
//! reproducible. Malformed input is rejected as a whole; nothing here returns
//! a partially filled model.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, Timelike, Utc};

use crate::{
    error::{Result, WeatherError},
    location::FavoriteCity,
    model::{
        AirQualityData, DailyForecastItem, HourlyForecastItem, Location, WeatherData,
        parse_local_time,
    },
    provider::open_meteo::{
        AirQualityResponse, DailySeries, GeocodingResult, HourlySeries, WeatherResponse,
    },
};

/// Maximum number of hours in the hourly window.
pub const HOURLY_WINDOW: usize = 24;

/// Wall-clock time at a location, given the offset the upstream reported for it.
pub fn local_now(utc_offset_seconds: i32, now: DateTime<Utc>) -> NaiveDateTime {
    let offset = FixedOffset::east_opt(utc_offset_seconds).unwrap_or_else(|| {
        tracing::warn!(utc_offset_seconds, "ignoring out-of-range UTC offset");
        Utc.fix()
    });
    now.with_timezone(&offset).naive_local()
}

/// Build [`WeatherData`] from a forecast response.
///
/// Fails with [`WeatherError::MissingCurrentConditions`] when the response has no
/// `current` block. Absent `hourly`/`daily` blocks produce empty lists.
pub fn normalize_weather(
    raw: &WeatherResponse,
    location: &Location,
    now_local: NaiveDateTime,
) -> Result<WeatherData> {
    let current = raw
        .current
        .clone()
        .ok_or(WeatherError::MissingCurrentConditions)?;

    let hourly = match &raw.hourly {
        Some(series) => hourly_window(series, now_local)?,
        None => Vec::new(),
    };

    let daily = match &raw.daily {
        Some(series) => daily_items(series)?,
        None => Vec::new(),
    };

    Ok(WeatherData {
        location: Location {
            timezone: Some(raw.timezone.clone()),
            ..location.clone()
        },
        current,
        hourly,
        daily,
        alerts: Vec::new(),
        last_updated: now_local,
    })
}

/// Index of the entry for the current local hour.
///
/// Falls back to the hour of day, which is correct for a series anchored at
/// local midnight of its first day.
fn window_start(times: &[String], now_local: NaiveDateTime) -> usize {
    let is_current_hour =
        |t: NaiveDateTime| t.date() == now_local.date() && t.hour() == now_local.hour();

    times
        .iter()
        .position(|t| parse_local_time(t).is_some_and(is_current_hour))
        .unwrap_or(now_local.hour() as usize)
}

/// Hourly entries from the current hour on.
///
/// A `null` temperature or weather code inside the window rejects the series;
/// a `null` precipitation probability reads as 0 and a `null` day flag as night.
fn hourly_window(
    series: &HourlySeries,
    now_local: NaiveDateTime,
) -> Result<Vec<HourlyForecastItem>> {
    let len = series.time.len();
    check_column("hourly.temperature_2m", &series.temperature_2m, len)?;
    check_column("hourly.weather_code", &series.weather_code, len)?;
    check_column(
        "hourly.precipitation_probability",
        &series.precipitation_probability,
        len,
    )?;
    check_column("hourly.is_day", &series.is_day, len)?;

    let start = window_start(&series.time, now_local);
    let end = start.saturating_add(HOURLY_WINDOW).min(len);

    (start..end)
        .map(|i| {
            Ok(HourlyForecastItem {
                time: parse_time("hourly.time", &series.time[i])?,
                temperature: *required("hourly.temperature_2m", &series.temperature_2m, i)?,
                weather_code: *required("hourly.weather_code", &series.weather_code, i)?,
                precipitation_probability: series.precipitation_probability[i].unwrap_or(0.0),
                is_day: series.is_day[i] == Some(1),
            })
        })
        .collect()
}

/// One item per upstream day.
///
/// Weather code, temperatures, sunrise and sunset must be present; the
/// remaining measurements read `null` as 0.
fn daily_items(series: &DailySeries) -> Result<Vec<DailyForecastItem>> {
    let len = series.time.len();
    check_column("daily.weather_code", &series.weather_code, len)?;
    check_column("daily.temperature_2m_max", &series.temperature_2m_max, len)?;
    check_column("daily.temperature_2m_min", &series.temperature_2m_min, len)?;
    check_column("daily.sunrise", &series.sunrise, len)?;
    check_column("daily.sunset", &series.sunset, len)?;
    check_column("daily.uv_index_max", &series.uv_index_max, len)?;
    check_column("daily.precipitation_sum", &series.precipitation_sum, len)?;
    check_column(
        "daily.precipitation_probability_max",
        &series.precipitation_probability_max,
        len,
    )?;
    check_column("daily.wind_speed_10m_max", &series.wind_speed_10m_max, len)?;

    (0..len)
        .map(|i| {
            let raw_date = &series.time[i];
            let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|_| {
                WeatherError::MalformedResponse(format!("daily.time: invalid date '{raw_date}'"))
            })?;
            let sunrise = required("daily.sunrise", &series.sunrise, i)?;
            let sunset = required("daily.sunset", &series.sunset, i)?;

            Ok(DailyForecastItem {
                date,
                weather_code: *required("daily.weather_code", &series.weather_code, i)?,
                temp_max: *required("daily.temperature_2m_max", &series.temperature_2m_max, i)?,
                temp_min: *required("daily.temperature_2m_min", &series.temperature_2m_min, i)?,
                precipitation_probability: series.precipitation_probability_max[i].unwrap_or(0.0),
                precipitation_sum: series.precipitation_sum[i].unwrap_or(0.0),
                sunrise: parse_time("daily.sunrise", sunrise)?,
                sunset: parse_time("daily.sunset", sunset)?,
                uv_index_max: series.uv_index_max[i].unwrap_or(0.0),
                wind_speed_max: series.wind_speed_10m_max[i].unwrap_or(0.0),
            })
        })
        .collect()
}

fn check_column<T>(name: &str, column: &[T], expected: usize) -> Result<()> {
    let actual = column.len();
    if actual < expected {
        return Err(WeatherError::MalformedResponse(format!(
            "{name} has {actual} entries, expected {expected}"
        )));
    }
    Ok(())
}

fn required<'a, T>(name: &str, column: &'a [Option<T>], index: usize) -> Result<&'a T> {
    column[index]
        .as_ref()
        .ok_or_else(|| WeatherError::MalformedResponse(format!("{name}[{index}] is null")))
}

fn parse_time(field: &str, value: &str) -> Result<NaiveDateTime> {
    parse_local_time(value).ok_or_else(|| {
        WeatherError::MalformedResponse(format!("{field}: invalid timestamp '{value}'"))
    })
}

/// `None` when the response carries no `current` block: there is simply no
/// air-quality panel to show.
pub fn normalize_air_quality(
    raw: &AirQualityResponse,
    now_local: NaiveDateTime,
) -> Option<AirQualityData> {
    let current = raw.current.as_ref()?;

    Some(AirQualityData {
        aqi: current.us_aqi,
        pm10: current.pm10,
        pm2_5: current.pm2_5,
        carbon_monoxide: current.carbon_monoxide,
        nitrogen_dioxide: current.nitrogen_dioxide,
        sulphur_dioxide: current.sulphur_dioxide,
        ozone: current.ozone,
        last_updated: now_local,
    })
}

pub fn to_location(result: &GeocodingResult) -> Location {
    Location {
        name: result.name.clone(),
        latitude: result.latitude,
        longitude: result.longitude,
        country: result.country.clone(),
        admin1: result.admin1.clone(),
        timezone: result.timezone.clone(),
    }
}

/// Anything that can be shown as "name, region, country".
pub trait Labeled {
    fn name(&self) -> &str;
    fn admin1(&self) -> Option<&str>;
    fn country(&self) -> Option<&str>;
}

impl Labeled for Location {
    fn name(&self) -> &str {
        &self.name
    }
    fn admin1(&self) -> Option<&str> {
        self.admin1.as_deref()
    }
    fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }
}

impl Labeled for GeocodingResult {
    fn name(&self) -> &str {
        &self.name
    }
    fn admin1(&self) -> Option<&str> {
        self.admin1.as_deref()
    }
    fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }
}

impl Labeled for FavoriteCity {
    fn name(&self) -> &str {
        &self.name
    }
    fn admin1(&self) -> Option<&str> {
        self.admin1.as_deref()
    }
    fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }
}

/// Join name, region (when it differs from the name) and country with `", "`.
pub fn display_label<L: Labeled + ?Sized>(place: &L) -> String {
    let name = place.name();
    let admin1 = place.admin1().filter(|a| *a != name);

    [Some(name), admin1, place.country()]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveTime, TimeZone};

    fn at(date: &str, hour: u32) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .expect("date")
            .and_time(NaiveTime::from_hms_opt(hour, 17, 0).expect("time"))
    }

    fn hourly_times(start: NaiveDateTime, n: usize) -> Vec<String> {
        (0..n)
            .map(|i| {
                let t = start + Duration::hours(i as i64);
                t.format("%Y-%m-%dT%H:%M").to_string()
            })
            .collect()
    }

    fn current_json() -> serde_json::Value {
        serde_json::json!({
            "time": "2024-01-01T10:15",
            "interval": 900,
            "temperature_2m": 15.4,
            "relative_humidity_2m": 62,
            "apparent_temperature": 14.1,
            "is_day": 1,
            "precipitation": 0.0,
            "rain": 0.0,
            "showers": 0.0,
            "snowfall": 0.0,
            "weather_code": 2,
            "cloud_cover": 40,
            "pressure_msl": 1016.2,
            "surface_pressure": 1014.9,
            "wind_speed_10m": 12.3,
            "wind_direction_10m": 240,
            "wind_gusts_10m": 25.2,
            "uv_index": 3.45,
            "visibility": 24140.0
        })
    }

    fn response(hours: usize, with_current: bool) -> WeatherResponse {
        let start = at("2024-01-01", 0) - Duration::minutes(17);
        let temperatures: Vec<f64> = (0..hours).map(|i| i as f64).collect();
        let is_day: Vec<u8> = (0..hours)
            .map(|i| u8::from((7..17).contains(&(i % 24))))
            .collect();
        let mut json = serde_json::json!({
            "latitude": 40.71,
            "longitude": -74.0,
            "timezone": "America/New_York",
            "utc_offset_seconds": -18000,
            "hourly": {
                "time": hourly_times(start, hours),
                "temperature_2m": temperatures,
                "weather_code": vec![3; hours],
                "precipitation_probability": vec![10.0; hours],
                "is_day": is_day
            },
            "daily": {
                "time": ["2024-01-01", "2024-01-02"],
                "weather_code": [3, 61],
                "temperature_2m_max": [18.0, 12.5],
                "temperature_2m_min": [9.0, 7.5],
                "sunrise": ["2024-01-01T07:20", "2024-01-02T07:20"],
                "sunset": ["2024-01-01T16:39", "2024-01-02T16:40"],
                "uv_index_max": [2.1, 1.0],
                "precipitation_sum": [0.0, 4.2],
                "precipitation_probability_max": [5.0, 80.0],
                "wind_speed_10m_max": [20.0, 31.0]
            }
        });
        if with_current {
            json["current"] = current_json();
        }
        serde_json::from_value(json).expect("valid weather response")
    }

    fn normalize_at(raw: &WeatherResponse, date: &str, hour: u32) -> Result<WeatherData> {
        normalize_weather(raw, &Location::default(), at(date, hour))
    }

    #[test]
    fn missing_current_block_is_an_error() {
        let err = normalize_at(&response(48, false), "2024-01-01", 10).unwrap_err();
        assert_eq!(err, WeatherError::MissingCurrentConditions);
    }

    #[test]
    fn hourly_window_starts_at_current_hour() {
        let data = normalize_at(&response(48, true), "2024-01-01", 10).expect("normalize");

        assert_eq!(data.hourly.len(), HOURLY_WINDOW);
        assert_eq!(data.hourly[0].time.hour(), 10);
        assert_eq!(data.hourly[0].temperature, 10.0);
        assert_eq!(data.hourly[23].temperature, 33.0);
        assert!(data.hourly[0].is_day);
        assert!(!data.hourly[10].is_day);
    }

    #[test]
    fn hourly_window_is_clamped_not_padded() {
        let data = normalize_at(&response(30, true), "2024-01-01", 10).expect("normalize");

        assert_eq!(data.hourly.len(), 20);
        assert_eq!(data.hourly[0].temperature, 10.0);
        assert_eq!(data.hourly[19].temperature, 29.0);
    }

    #[test]
    fn hourly_window_finds_hour_on_second_day() {
        let data = normalize_at(&response(48, true), "2024-01-02", 5).expect("normalize");

        assert_eq!(data.hourly[0].temperature, 29.0);
        assert_eq!(data.hourly.len(), 19);
    }

    #[test]
    fn hourly_window_falls_back_to_hour_of_day() {
        // "now" is outside the series' dates, so the hour itself is the index.
        let data = normalize_at(&response(48, true), "2030-06-01", 4).expect("normalize");
        assert_eq!(data.hourly[0].temperature, 4.0);
    }

    #[test]
    fn short_column_is_rejected() {
        let mut raw = response(48, true);
        if let Some(h) = raw.hourly.as_mut() {
            h.is_day.truncate(10);
        }
        let err = normalize_at(&raw, "2024-01-01", 10).unwrap_err();
        assert!(
            matches!(err, WeatherError::MalformedResponse(msg) if msg.contains("hourly.is_day"))
        );
    }

    #[test]
    fn daily_maps_one_to_one() {
        let data = normalize_at(&response(48, true), "2024-01-01", 10).expect("normalize");

        assert_eq!(data.daily.len(), 2);
        let tomorrow = &data.daily[1];
        assert_eq!(tomorrow.date, NaiveDate::from_ymd_opt(2024, 1, 2).expect("date"));
        assert_eq!(tomorrow.weather_code, 61);
        assert_eq!(tomorrow.temp_max, 12.5);
        assert_eq!(tomorrow.precipitation_probability, 80.0);
        assert_eq!(tomorrow.sunset.format("%H:%M").to_string(), "16:40");
    }

    #[test]
    fn absent_blocks_give_empty_lists() {
        let mut raw = response(48, true);
        raw.hourly = None;
        raw.daily = None;
        let data = normalize_at(&raw, "2024-01-01", 10).expect("ok");
        assert!(data.hourly.is_empty());
        assert!(data.daily.is_empty());
    }

    #[test]
    fn location_gets_upstream_timezone_and_alerts_are_empty() {
        let now = at("2024-01-01", 10);
        let data = normalize_weather(&response(48, true), &Location::default(), now)
            .expect("ok");

        assert_eq!(data.location.name, "New York");
        assert_eq!(data.location.timezone.as_deref(), Some("America/New_York"));
        assert!(data.alerts.is_empty());
        assert_eq!(data.last_updated, now);
        assert_eq!(data.current.temperature_2m, 15.4);
        assert!(data.current.is_day());
    }

    #[test]
    fn nulls_in_optional_columns_read_as_defaults() {
        let mut raw = response(48, true);
        if let Some(h) = raw.hourly.as_mut() {
            h.precipitation_probability[11] = None;
            h.is_day[11] = None;
        }
        if let Some(d) = raw.daily.as_mut() {
            d.uv_index_max[1] = None;
            d.precipitation_sum[1] = None;
        }

        let data = normalize_at(&raw, "2024-01-01", 10).expect("normalize");
        assert_eq!(data.hourly[1].precipitation_probability, 0.0);
        assert!(!data.hourly[1].is_day);
        assert_eq!(data.daily[1].uv_index_max, 0.0);
        assert_eq!(data.daily[1].precipitation_sum, 0.0);
    }

    #[test]
    fn null_temperature_inside_window_is_rejected() {
        let mut raw = response(48, true);
        if let Some(h) = raw.hourly.as_mut() {
            h.temperature_2m[12] = None;
        }

        let err = normalize_at(&raw, "2024-01-01", 10).unwrap_err();
        assert_eq!(
            err,
            WeatherError::MalformedResponse("hourly.temperature_2m[12] is null".to_string())
        );
    }

    #[test]
    fn null_outside_window_is_ignored() {
        let mut raw = response(48, true);
        if let Some(h) = raw.hourly.as_mut() {
            h.temperature_2m[3] = None;
            h.weather_code[40] = None;
        }

        let data = normalize_at(&raw, "2024-01-01", 10).expect("normalize");
        assert_eq!(data.hourly.len(), HOURLY_WINDOW);
    }

    #[test]
    fn null_sunrise_is_rejected() {
        let mut raw = response(48, true);
        if let Some(d) = raw.daily.as_mut() {
            d.sunrise[0] = None;
        }

        let err = normalize_at(&raw, "2024-01-01", 10).unwrap_err();
        assert!(
            matches!(err, WeatherError::MalformedResponse(msg) if msg.contains("daily.sunrise"))
        );
    }

    #[test]
    fn air_quality_absent_is_none() {
        let raw: AirQualityResponse =
            serde_json::from_str(r#"{"latitude": 1.0, "longitude": 2.0}"#).expect("parse");
        assert!(normalize_air_quality(&raw, at("2024-01-01", 10)).is_none());
    }

    #[test]
    fn air_quality_fields_are_mapped() {
        let raw: AirQualityResponse = serde_json::from_value(serde_json::json!({
            "latitude": 40.7,
            "longitude": -74.0,
            "current": {
                "time": "2024-01-01T10:00",
                "us_aqi": 42,
                "pm10": 12.1,
                "pm2_5": 6.3,
                "carbon_monoxide": 210.0,
                "nitrogen_dioxide": 18.4,
                "sulphur_dioxide": 3.2,
                "ozone": 55.0
            }
        }))
        .expect("parse");

        let aq = normalize_air_quality(&raw, at("2024-01-01", 10)).expect("present");
        assert_eq!(aq.aqi, 42.0);
        assert_eq!(aq.pm2_5, 6.3);
        assert_eq!(aq.tier().label(), "Good");
    }

    #[test]
    fn local_now_applies_offset() {
        let utc = Utc.with_ymd_and_hms(2024, 1, 1, 15, 0, 0).unwrap();
        assert_eq!(local_now(-18000, utc).hour(), 10);
        assert_eq!(local_now(19800, utc).format("%H:%M").to_string(), "20:30");
    }

    fn result(name: &str, admin1: Option<&str>, country: Option<&str>) -> GeocodingResult {
        GeocodingResult {
            id: 1,
            name: name.to_string(),
            latitude: 1.0,
            longitude: 2.0,
            country: country.map(str::to_string),
            country_code: None,
            admin1: admin1.map(str::to_string),
            timezone: Some("Europe/Paris".to_string()),
            population: None,
            elevation: None,
        }
    }

    #[test]
    fn label_skips_duplicate_and_missing_parts() {
        assert_eq!(
            display_label(&result("Paris", Some("Île-de-France"), Some("France"))),
            "Paris, Île-de-France, France"
        );
        assert_eq!(
            display_label(&result("Berlin", Some("Berlin"), Some("Germany"))),
            "Berlin, Germany"
        );
        assert_eq!(display_label(&result("Atlantis", None, None)), "Atlantis");
        assert_eq!(display_label(&result("Nowhere", Some(""), Some(""))), "Nowhere");
    }

    #[test]
    fn to_location_copies_fields() {
        let loc = to_location(&result("Paris", Some("Île-de-France"), Some("France")));
        assert_eq!(loc.name, "Paris");
        assert_eq!(loc.timezone.as_deref(), Some("Europe/Paris"));
        assert_eq!(display_label(&loc), "Paris, Île-de-France, France");
    }
}
