use thiserror::Error;

/// Why the device location could not be determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location information unavailable")]
    PositionUnavailable,
    #[error("location request timed out")]
    Timeout,
    #[error("geolocation not supported")]
    Unsupported,
}

impl GeolocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            GeolocationError::PermissionDenied => {
                "Location access denied. Please enable location permissions."
            }
            GeolocationError::PositionUnavailable => "Location information is unavailable.",
            GeolocationError::Timeout => "Location request timed out.",
            GeolocationError::Unsupported => "Geolocation is not supported on this device.",
        }
    }
}

/// Errors produced while fetching or normalizing weather data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeatherError {
    /// Non-2xx response or transport failure.
    #[error("network error{}: {message}", status_suffix(.status))]
    Network {
        status: Option<u16>,
        message: String,
    },

    /// Upstream weather response carried no `current` block.
    #[error("no current weather data available")]
    MissingCurrentConditions,

    /// A forecast column did not line up with its time axis.
    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("geolocation error: {0}")]
    Geolocation(#[from] GeolocationError),

    /// Persisted value present but unreadable. Recovered by the storage layer.
    #[error("could not parse stored value for '{key}': {message}")]
    StorageParse { key: String, message: String },
}

impl WeatherError {
    pub fn network(status: Option<u16>, message: impl Into<String>) -> Self {
        WeatherError::Network {
            status,
            message: message.into(),
        }
    }

    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::Network { status: Some(s), .. } if *s >= 500 => {
                "The weather service is having trouble. Please try again later."
            }
            WeatherError::Network { status: Some(_), .. } => {
                "The weather request failed. Please try again."
            }
            WeatherError::Network { status: None, .. } => {
                "Unable to reach the weather service. Check your internet connection."
            }
            WeatherError::MissingCurrentConditions => "No current weather data is available.",
            WeatherError::MalformedResponse(_) => {
                "Received an unexpected response from the weather service."
            }
            WeatherError::Geolocation(e) => e.user_message(),
            WeatherError::StorageParse { .. } => "Saved settings could not be read.",
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        WeatherError::Network {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
