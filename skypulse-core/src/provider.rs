use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::Result,
    model::Location,
    provider::open_meteo::{AirQualityResponse, GeocodingResult, WeatherResponse},
};

pub mod open_meteo;
pub mod rainviewer;

pub use open_meteo::OpenMeteoClient;
pub use rainviewer::RainViewerClient;

/// Upstream source of raw forecast and air-quality payloads.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_weather(&self, location: &Location) -> Result<WeatherResponse>;

    async fn fetch_air_quality(&self, location: &Location) -> Result<AirQualityResponse>;
}

/// City search by name.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn search(&self, query: &str, count: u8) -> Result<Vec<GeocodingResult>>;
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_bodies_are_kept() {
        assert_eq!(truncate_body("oops"), "oops");
    }

    #[test]
    fn long_bodies_are_cut_on_a_char_boundary() {
        let body = "é".repeat(150);
        let cut = truncate_body(&body);
        assert!(cut.ends_with("..."));
        assert!(cut.len() <= 203);
    }
}
