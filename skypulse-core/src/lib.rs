//! Core library for the `skypulse` weather client.
//!
//! This crate defines:
//! - Configuration and on-disk settings
//! - Clients for the Open-Meteo and RainViewer HTTP APIs
//! - Normalization of upstream responses into a unit-aware domain model
//! - Formatting helpers, the weather-condition catalog and favorites rules
//! - The fetch cycle that keeps the current weather up to date
//!
//! It is used by `skypulse-cli`, but carries no terminal-specific code.

pub mod conditions;
pub mod config;
pub mod deep_link;
pub mod error;
pub mod fetch;
pub mod location;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod radar;
pub mod settings;
pub mod storage;
pub mod units;

pub use config::{Config, Endpoints};
pub use error::{GeolocationError, Result, WeatherError};
pub use fetch::{FetchOutcome, FetchState, WeatherFetcher};
pub use location::{FavoriteCity, Favorites, location_id};
pub use model::{Location, ThemeMode, WeatherData};
pub use provider::{Geocoder, OpenMeteoClient, RainViewerClient, WeatherProvider};
pub use settings::{Settings, SettingsSnapshot};
pub use units::TemperatureUnit;
