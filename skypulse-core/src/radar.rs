//! Periodic refresh of the radar frame index, independent of the weather fetch.

use async_trait::async_trait;
use std::time::Duration;
use tokio::{sync::watch, task::JoinHandle, time::MissedTickBehavior};

use crate::{
    error::Result,
    provider::{RainViewerClient, rainviewer::RadarData},
};

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[async_trait]
pub trait RadarSource: Send + Sync + 'static {
    async fn fetch(&self) -> Result<RadarData>;
}

#[async_trait]
impl RadarSource for RainViewerClient {
    async fn fetch(&self) -> Result<RadarData> {
        RainViewerClient::fetch(self).await
    }
}

/// Fetch now and then every `period`, publishing each successful result.
///
/// The receiver holds `None` until the first success. A failed refresh is
/// logged and leaves the previous frames in place. The task ends when the
/// handle is aborted or every receiver has been dropped.
pub fn spawn_refresh<S: RadarSource>(
    source: S,
    period: Duration,
) -> (JoinHandle<()>, watch::Receiver<Option<RadarData>>) {
    let (tx, rx) = watch::channel(None);

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = tx.closed() => break,
            }

            match source.fetch().await {
                Ok(data) => {
                    tracing::debug!(frames = data.radar.past.len(), "radar frames refreshed");
                    tx.send_replace(Some(data));
                }
                Err(err) => tracing::warn!(%err, "radar refresh failed, keeping previous frames"),
            }
        }

        tracing::debug!("radar refresh stopped");
    });

    (handle, rx)
}
