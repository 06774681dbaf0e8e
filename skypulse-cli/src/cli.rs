use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use inquire::Select;
use skypulse_core::{
    Config, FetchOutcome, FetchState, Geocoder, Location, OpenMeteoClient, RainViewerClient,
    Settings, TemperatureUnit, ThemeMode, WeatherError, WeatherFetcher,
    deep_link::{parse_location_str, share_url},
    normalize::{display_label, to_location},
    provider::open_meteo::GeocodingResult,
    radar::{REFRESH_INTERVAL, spawn_refresh},
    storage::FileStore,
};
use std::{fmt, sync::Arc};
use url::Url;

use crate::render;

const DEFAULT_SHARE_BASE: &str = "https://skypulse.app/";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "skypulse",
    version,
    about = "Weather, air quality and radar in the terminal"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search for a city by name.
    Search {
        query: String,

        /// Maximum number of matches; defaults to the configured count.
        #[arg(long)]
        count: Option<u8>,

        /// Choose one of the matches interactively and make it the current location.
        #[arg(long)]
        pick: bool,
    },

    /// Show current conditions, forecast and air quality.
    Show {
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Display name for `--lat/--lon`.
        #[arg(long)]
        name: Option<String>,

        /// Shared link carrying `lat`, `lon` and `name`.
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        link: Option<String>,

        /// Override the saved unit for this run only.
        #[arg(long, value_enum)]
        unit: Option<UnitChoice>,
    },

    /// Show or change the temperature unit.
    Unit {
        #[arg(value_enum)]
        value: Option<UnitChoice>,
    },

    /// Show or change the color theme preference.
    Theme {
        #[arg(value_enum)]
        mode: Option<ThemeArg>,
    },

    /// Manage favorite cities.
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },

    /// Print a link that opens the current location.
    Share {
        #[arg(long, default_value = DEFAULT_SHARE_BASE)]
        base: String,
    },

    /// Show the latest precipitation radar frames.
    Radar {
        /// Keep running and print every refresh.
        #[arg(long)]
        watch: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum FavoritesAction {
    /// List favorites with their ids.
    List,
    /// Add the current location.
    Add,
    /// Remove a favorite by id.
    Remove { id: String },
    /// Add or remove the current location.
    Toggle,
    /// Make a favorite the current location.
    Select { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnitChoice {
    Celsius,
    Fahrenheit,
    /// The other unit than the saved one.
    Toggle,
}

impl UnitChoice {
    pub fn resolve(self, current: TemperatureUnit) -> TemperatureUnit {
        match self {
            UnitChoice::Celsius => TemperatureUnit::Celsius,
            UnitChoice::Fahrenheit => TemperatureUnit::Fahrenheit,
            UnitChoice::Toggle => current.toggle(),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
    System,
}

impl From<ThemeArg> for ThemeMode {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => ThemeMode::Light,
            ThemeArg::Dark => ThemeMode::Dark,
            ThemeArg::System => ThemeMode::System,
        }
    }
}

/// Search match as shown in the interactive picker.
struct Choice(GeocodingResult);

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&display_label(&self.0))
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;
        let settings_path = Config::settings_file_path()?;
        let mut settings = Settings::load(FileStore::open(settings_path));

        match self.command {
            Command::Search { query, count, pick } => {
                let client = OpenMeteoClient::new(&config)?;
                let count = count.unwrap_or(config.geocoding_count);
                let results = client.search(&query, count).await.map_err(with_hint)?;

                if !pick || results.is_empty() {
                    print!("{}", render::search_results(&results));
                    return Ok(());
                }

                let choices = results.into_iter().map(Choice).collect();
                let Choice(picked) = Select::new("Choose a city:", choices)
                    .prompt()
                    .context("City selection cancelled")?;

                let location = to_location(&picked);
                println!("Current location: {}", display_label(&location));
                settings.set_current_location(location)?;
            }

            Command::Show {
                lat,
                lon,
                name,
                link,
                unit,
            } => {
                let location = match (link, lat, lon) {
                    (Some(link), _, _) => Some(
                        parse_location_str(&link)
                            .ok_or_else(|| anyhow!("Link does not name a location: {link}"))?,
                    ),
                    (None, Some(lat), Some(lon)) => Some(Location::new(
                        name.unwrap_or_else(|| format!("{lat:.4}, {lon:.4}")),
                        lat,
                        lon,
                    )),
                    _ => None,
                };

                if let Some(location) = location {
                    settings.set_current_location(location)?;
                }

                let saved = settings.unit();
                let unit = unit.map_or(saved, |choice| choice.resolve(saved));
                show(&config, &settings.current_location(), unit).await?;
            }

            Command::Unit { value } => {
                if let Some(choice) = value {
                    settings.set_unit(choice.resolve(settings.unit()))?;
                }
                let unit = settings.unit();
                println!("Unit: {unit} ({})", unit.symbol());
            }

            Command::Theme { mode } => {
                if let Some(mode) = mode {
                    settings.set_theme(mode.into())?;
                }
                println!("Theme: {}", settings.theme());
            }

            Command::Favorites { action } => favorites(&mut settings, action)?,

            Command::Share { base } => {
                let base = Url::parse(&base)
                    .with_context(|| format!("Invalid base URL: {base}"))?;
                println!("{}", share_url(&base, &settings.current_location()));
            }

            Command::Radar { watch } => {
                let client = RainViewerClient::new(&config)?;

                if !watch {
                    let data = client.fetch().await.map_err(with_hint)?;
                    print!("{}", render::radar(&data));
                    return Ok(());
                }

                let (handle, mut frames) = spawn_refresh(client, REFRESH_INTERVAL);
                while frames.changed().await.is_ok() {
                    if let Some(data) = frames.borrow_and_update().as_ref() {
                        print!("{}", render::radar(data));
                    }
                }
                handle.abort();
            }
        }

        Ok(())
    }
}

async fn show(config: &Config, location: &Location, unit: TemperatureUnit) -> Result<()> {
    let client = OpenMeteoClient::new(config)?;
    let fetcher = WeatherFetcher::new(Arc::new(client));

    if fetcher.fetch(location).await == FetchOutcome::Skipped {
        println!("No location selected. Try `skypulse search <city> --pick`.");
        return Ok(());
    }

    match fetcher.state() {
        FetchState::Ready {
            weather,
            air_quality,
        } => {
            print!("{}", render::current(&weather, unit));
            println!();
            print!("{}", render::air_quality(air_quality.as_ref()));
            println!();
            print!("{}", render::hourly(&weather, unit));
            println!();
            print!("{}", render::daily(&weather, unit));
            Ok(())
        }
        FetchState::Failed(err) => {
            let hint = format!("{} Run `skypulse show` again to retry.", err.user_message());
            Err(anyhow::Error::new(err).context(hint))
        }
        other => Err(anyhow!("Fetch ended in unexpected state: {other:?}")),
    }
}

/// Put the user-facing message on top, keeping the error as its cause.
fn with_hint(err: WeatherError) -> anyhow::Error {
    let hint = err.user_message();
    anyhow::Error::new(err).context(hint)
}

fn favorites(settings: &mut Settings<FileStore>, action: FavoritesAction) -> Result<()> {
    let current = settings.current_location();

    match action {
        FavoritesAction::List => print!("{}", render::favorites(&settings.favorites())),
        FavoritesAction::Add => {
            if settings.add_favorite(&current)? {
                println!("Added {}", display_label(&current));
            } else {
                println!("{} is already a favorite", display_label(&current));
            }
        }
        FavoritesAction::Remove { id } => {
            if settings.remove_favorite(&id)? {
                println!("Removed {id}");
            } else {
                println!("No favorite with id {id}");
            }
        }
        FavoritesAction::Toggle => {
            let verb = if settings.toggle_favorite(&current)? {
                "Added"
            } else {
                "Removed"
            };
            println!("{verb} {}", display_label(&current));
        }
        FavoritesAction::Select { id } => {
            let location = settings
                .favorites()
                .get(&id)
                .map(Location::from)
                .ok_or_else(|| anyhow!("No favorite with id {id}"))?;
            println!("Current location: {}", display_label(&location));
            settings.set_current_location(location)?;
        }
    }

    Ok(())
}
