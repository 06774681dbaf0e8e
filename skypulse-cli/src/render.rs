//! Plain-text rendering of weather data for the terminal.

use skypulse_core::{
    TemperatureUnit, WeatherData,
    location::Favorites,
    model::AirQualityData,
    normalize::display_label,
    provider::{open_meteo::GeocodingResult, rainviewer::RadarData},
    units::{
        day_label, format_clock, format_hour, format_temperature, format_wind_speed,
        humidity_display, precipitation_probability_display, pressure_display, uv_index_tier,
        visibility_display,
    },
};
use std::fmt::Write;

const COMPASS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

fn compass(degrees: f64) -> &'static str {
    let idx = (degrees.rem_euclid(360.0) / 45.0).round() as usize % COMPASS.len();
    COMPASS[idx]
}

pub fn current(weather: &WeatherData, unit: TemperatureUnit) -> String {
    let c = &weather.current;
    let condition = c.condition();
    let uv = uv_index_tier(c.uv_index);

    let mut out = String::new();
    let _ = writeln!(out, "{}", display_label(&weather.location));
    let _ = writeln!(
        out,
        "  {}  {}  (feels like {})",
        format_temperature(c.temperature_2m, unit),
        condition.description,
        format_temperature(c.apparent_temperature, unit),
    );
    let _ = writeln!(
        out,
        "  Wind {} {} (gusts {})",
        format_wind_speed(c.wind_speed_10m, unit),
        compass(c.wind_direction_10m),
        format_wind_speed(c.wind_gusts_10m, unit),
    );
    let _ = writeln!(
        out,
        "  Humidity {}  Pressure {}  Visibility {}",
        humidity_display(c.relative_humidity_2m),
        pressure_display(c.pressure_msl),
        visibility_display(c.visibility),
    );
    let _ = writeln!(out, "  UV {} ({})", uv.value, uv.tier.label());
    out
}

pub fn hourly(weather: &WeatherData, unit: TemperatureUnit) -> String {
    let mut out = String::from("Next hours\n");
    for item in &weather.hourly {
        let _ = writeln!(
            out,
            "  {:>5}  {:>5}  {:>4}  {}",
            format_hour(item.time.time()),
            format_temperature(item.temperature, unit),
            precipitation_probability_display(item.precipitation_probability),
            item.condition().description,
        );
    }
    out
}

pub fn daily(weather: &WeatherData, unit: TemperatureUnit) -> String {
    let today = weather.last_updated.date();

    let mut out = String::from("7-day forecast\n");
    for day in &weather.daily {
        let _ = writeln!(
            out,
            "  {:<8}  {:>5} / {:<5}  {:>4}  {}  sunrise {} sunset {}",
            day_label(day.date, today),
            format_temperature(day.temp_max, unit),
            format_temperature(day.temp_min, unit),
            precipitation_probability_display(day.precipitation_probability),
            day.condition().description,
            format_clock(day.sunrise.time()),
            format_clock(day.sunset.time()),
        );
    }
    out
}

pub fn air_quality(aq: Option<&AirQualityData>) -> String {
    let Some(aq) = aq else {
        return "Air quality: unavailable\n".to_string();
    };

    format!(
        "Air quality: {} ({})\n  PM2.5 {:.1}  PM10 {:.1}  O3 {:.1}  NO2 {:.1}  SO2 {:.1}  CO {:.0} (µg/m³)\n",
        aq.aqi.round(),
        aq.tier().label(),
        aq.pm2_5,
        aq.pm10,
        aq.ozone,
        aq.nitrogen_dioxide,
        aq.sulphur_dioxide,
        aq.carbon_monoxide,
    )
}

pub fn search_results(results: &[GeocodingResult]) -> String {
    if results.is_empty() {
        return "No matching cities.\n".to_string();
    }

    let mut out = String::new();
    for (i, r) in results.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {}  ({:.4}, {:.4})",
            i + 1,
            display_label(r),
            r.latitude,
            r.longitude
        );
    }
    out
}

pub fn favorites(favs: &Favorites) -> String {
    if favs.is_empty() {
        return "No favorite cities yet.\n".to_string();
    }

    let mut out = String::new();
    for fav in favs {
        let _ = writeln!(out, "{:<22} {}", fav.id, display_label(fav));
    }
    out
}

pub fn radar(data: &RadarData) -> String {
    let Some(frame) = data.latest() else {
        return "No radar frames published.\n".to_string();
    };

    let taken = chrono::DateTime::from_timestamp(frame.time, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| frame.time.to_string());

    format!(
        "Radar: {} past frames, {} nowcast frames\n  latest {}\n  tiles  {}\n",
        data.radar.past.len(),
        data.radar.nowcast.len(),
        taken,
        data.tile_url(frame),
    )
}
