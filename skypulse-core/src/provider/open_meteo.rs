use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    config::{Config, Endpoints},
    error::{Result, WeatherError},
    model::{CurrentConditions, Location},
    provider::{Geocoder, WeatherProvider, truncate_body},
};

pub const CURRENT_PARAMS: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "apparent_temperature",
    "is_day",
    "precipitation",
    "rain",
    "showers",
    "snowfall",
    "weather_code",
    "cloud_cover",
    "pressure_msl",
    "surface_pressure",
    "wind_speed_10m",
    "wind_direction_10m",
    "wind_gusts_10m",
    "uv_index",
    "visibility",
];

pub const HOURLY_PARAMS: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "apparent_temperature",
    "precipitation_probability",
    "precipitation",
    "weather_code",
    "wind_speed_10m",
    "uv_index",
    "is_day",
];

pub const DAILY_PARAMS: &[&str] = &[
    "weather_code",
    "temperature_2m_max",
    "temperature_2m_min",
    "apparent_temperature_max",
    "apparent_temperature_min",
    "sunrise",
    "sunset",
    "uv_index_max",
    "precipitation_sum",
    "precipitation_probability_max",
    "wind_speed_10m_max",
];

pub const AIR_QUALITY_PARAMS: &[&str] = &[
    "us_aqi",
    "pm10",
    "pm2_5",
    "carbon_monoxide",
    "nitrogen_dioxide",
    "sulphur_dioxide",
    "ozone",
];

pub const FORECAST_DAYS: u8 = 7;

/// Queries shorter than this (after trimming) are answered locally with no results.
pub const MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    #[serde(default)]
    pub utc_offset_seconds: i32,
    pub current: Option<CurrentConditions>,
    pub hourly: Option<HourlySeries>,
    pub daily: Option<DailySeries>,
}

/// Column-oriented hourly forecast; every column is indexed by `time`.
///
/// Upstream reports a missing value as `null`, so value columns are optional
/// per entry. Requested columns that nothing reads are not decoded.
#[derive(Debug, Clone, Deserialize)]
pub struct HourlySeries {
    pub time: Vec<String>,
    pub temperature_2m: Vec<Option<f64>>,
    pub weather_code: Vec<Option<i32>>,
    pub precipitation_probability: Vec<Option<f64>>,
    pub is_day: Vec<Option<u8>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailySeries {
    pub time: Vec<String>,
    pub weather_code: Vec<Option<i32>>,
    pub temperature_2m_max: Vec<Option<f64>>,
    pub temperature_2m_min: Vec<Option<f64>>,
    pub sunrise: Vec<Option<String>>,
    pub sunset: Vec<Option<String>>,
    pub uv_index_max: Vec<Option<f64>>,
    pub precipitation_sum: Vec<Option<f64>>,
    pub precipitation_probability_max: Vec<Option<f64>>,
    pub wind_speed_10m_max: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AirQualityResponse {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub utc_offset_seconds: i32,
    pub current: Option<CurrentAirQuality>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentAirQuality {
    pub time: String,
    pub us_aqi: f64,
    pub pm10: f64,
    pub pm2_5: f64,
    pub carbon_monoxide: f64,
    pub nitrogen_dioxide: f64,
    pub sulphur_dioxide: f64,
    pub ozone: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingResponse {
    pub results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeocodingResult {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub admin1: Option<String>,
    pub timezone: Option<String>,
    pub population: Option<u64>,
    pub elevation: Option<f64>,
}

/// HTTP client for the Open-Meteo forecast, air-quality and geocoding APIs.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: Client,
    endpoints: Endpoints,
}

impl OpenMeteoClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            endpoints: config.endpoints.clone(),
        })
    }

    /// GET `url` and decode the JSON body, mapping failures to [`WeatherError`].
    async fn get_json<T: DeserializeOwned>(
        &self,
        what: &str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        tracing::debug!(%url, ?query, "requesting {what}");

        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                WeatherError::network(None, format!("Failed to send {what} request: {e}"))
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            WeatherError::network(Some(status.as_u16()), format!("Failed to read {what} body: {e}"))
        })?;

        if !status.is_success() {
            return Err(WeatherError::network(
                Some(status.as_u16()),
                format!("{what} request failed: {}", truncate_body(&body)),
            ));
        }

        serde_json::from_str(&body)
            .map_err(|e| WeatherError::MalformedResponse(format!("{what} JSON: {e}")))
    }

    fn location_query(location: &Location) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("timezone", "auto".to_string()),
        ]
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    async fn fetch_weather(&self, location: &Location) -> Result<WeatherResponse> {
        let url = format!("{}/forecast", self.endpoints.forecast);

        let mut query = Self::location_query(location);
        query.extend([
            ("current", CURRENT_PARAMS.join(",")),
            ("hourly", HOURLY_PARAMS.join(",")),
            ("daily", DAILY_PARAMS.join(",")),
            ("forecast_days", FORECAST_DAYS.to_string()),
        ]);

        self.get_json("weather", &url, &query).await
    }

    async fn fetch_air_quality(&self, location: &Location) -> Result<AirQualityResponse> {
        let url = format!("{}/air-quality", self.endpoints.air_quality);

        let mut query = Self::location_query(location);
        query.push(("current", AIR_QUALITY_PARAMS.join(",")));

        self.get_json("air quality", &url, &query).await
    }
}

#[async_trait]
impl Geocoder for OpenMeteoClient {
    async fn search(&self, query: &str, count: u8) -> Result<Vec<GeocodingResult>> {
        let name = query.trim();
        if name.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        let url = format!("{}/search", self.endpoints.geocoding);
        let params = [
            ("name", name.to_string()),
            ("count", count.to_string()),
            ("language", "en".to_string()),
            ("format", "json".to_string()),
        ];

        let response: GeocodingResponse = self.get_json("geocoding", &url, &params).await?;
        Ok(response.results.unwrap_or_default())
    }
}
