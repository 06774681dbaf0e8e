//! Fetch cycle for one location: weather and air quality, concurrently.
//!
//! Weather is mandatory and its failure fails the cycle. Air quality is best
//! effort: a failed request leaves the panel absent and is only logged.

use chrono::{DateTime, Utc};
use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicU64, Ordering},
};
use tokio::sync::watch;

use crate::{
    error::WeatherError,
    model::{AirQualityData, Location, WeatherData},
    normalize::{local_now, normalize_air_quality, normalize_weather},
    provider::WeatherProvider,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Ready {
        weather: Box<WeatherData>,
        air_quality: Option<AirQualityData>,
    },
    Failed(WeatherError),
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn weather(&self) -> Option<&WeatherData> {
        match self {
            FetchState::Ready { weather, .. } => Some(&**weather),
            _ => None,
        }
    }

    pub fn air_quality(&self) -> Option<&AirQualityData> {
        match self {
            FetchState::Ready { air_quality, .. } => air_quality.as_ref(),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&WeatherError> {
        match self {
            FetchState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// What happened to a single call of [`WeatherFetcher::fetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The cycle's result is now the current state.
    Committed,
    /// No location selected; nothing was requested.
    Skipped,
    /// A newer cycle started before this one finished; its result was dropped.
    Superseded,
}

pub struct WeatherFetcher<P: WeatherProvider + ?Sized> {
    provider: Arc<P>,
    state: watch::Sender<FetchState>,
    generation: AtomicU64,
    last_location: Mutex<Option<Location>>,
    clock: fn() -> DateTime<Utc>,
}

impl<P: WeatherProvider + ?Sized> std::fmt::Debug for WeatherFetcher<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherFetcher")
            .field("provider", &self.provider)
            .field("state", &*self.state.borrow())
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl<P: WeatherProvider + ?Sized> WeatherFetcher<P> {
    pub fn new(provider: Arc<P>) -> Self {
        let (state, _) = watch::channel(FetchState::Idle);
        Self {
            provider,
            state,
            generation: AtomicU64::new(0),
            last_location: Mutex::new(None),
            clock: Utc::now,
        }
    }

    /// Replace the wall clock used to compute "now" at the location.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> FetchState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.state.subscribe()
    }

    /// Run one cycle for `location` and commit its result unless superseded.
    pub async fn fetch(&self, location: &Location) -> FetchOutcome {
        if location.is_unset() {
            tracing::debug!("no location selected, skipping fetch");
            return FetchOutcome::Skipped;
        }

        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self
            .last_location
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(location.clone());
        self.state.send_replace(FetchState::Loading);

        let (weather, air_quality) = tokio::join!(
            self.provider.fetch_weather(location),
            self.provider.fetch_air_quality(location),
        );
        let now = (self.clock)();

        let next = match weather.and_then(|raw| {
            normalize_weather(&raw, location, local_now(raw.utc_offset_seconds, now))
        }) {
            Ok(weather) => {
                let air_quality = match air_quality {
                    Ok(raw) => normalize_air_quality(&raw, local_now(raw.utc_offset_seconds, now)),
                    Err(err) => {
                        tracing::warn!(%err, location = %location.name, "air quality unavailable");
                        None
                    }
                };
                FetchState::Ready {
                    weather: Box::new(weather),
                    air_quality,
                }
            }
            Err(err) => {
                tracing::warn!(%err, location = %location.name, "weather fetch failed");
                FetchState::Failed(err)
            }
        };

        let committed = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != ticket {
                return false;
            }
            *state = next;
            true
        });

        if committed {
            tracing::info!(location = %location.name, "fetch cycle complete");
            FetchOutcome::Committed
        } else {
            tracing::debug!(ticket, "discarding superseded fetch result");
            FetchOutcome::Superseded
        }
    }

    /// Repeat the most recent fetch.
    pub async fn refetch(&self) -> FetchOutcome {
        let last = self
            .last_location
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        match last {
            Some(location) => self.fetch(&location).await,
            None => FetchOutcome::Skipped,
        }
    }
}
