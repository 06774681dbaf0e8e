use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::{Result, WeatherError},
    provider::truncate_body,
};

/// One radar image set, identified by its capture time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadarFrame {
    /// Unix timestamp, seconds.
    pub time: i64,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RadarFrames {
    #[serde(default)]
    pub past: Vec<RadarFrame>,
    #[serde(default)]
    pub nowcast: Vec<RadarFrame>,
}

/// Radar frame index published by RainViewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadarData {
    pub host: String,
    pub radar: RadarFrames,
}

impl RadarData {
    /// Most recent observed frame.
    pub fn latest(&self) -> Option<&RadarFrame> {
        self.radar.past.iter().max_by_key(|f| f.time)
    }

    /// Tile URL template for a frame, with `{z}/{x}/{y}` left for the map layer.
    pub fn tile_url(&self, frame: &RadarFrame) -> String {
        format!("{}{}/256/{{z}}/{{x}}/{{y}}/2/1_1.png", self.host, frame.path)
    }
}

#[derive(Debug, Clone)]
pub struct RainViewerClient {
    http: Client,
    url: String,
}

impl RainViewerClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            url: config.endpoints.radar.clone(),
        })
    }

    pub async fn fetch(&self) -> Result<RadarData> {
        tracing::debug!(url = %self.url, "requesting radar frames");

        let res = self.http.get(&self.url).send().await?;
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(WeatherError::network(
                Some(status.as_u16()),
                format!("radar request failed: {}", truncate_body(&body)),
            ));
        }

        serde_json::from_str(&body)
            .map_err(|e| WeatherError::MalformedResponse(format!("radar JSON: {e}")))
    }
}
