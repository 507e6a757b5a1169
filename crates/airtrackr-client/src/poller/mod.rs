// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Periodic polling of the current-positions feed.
//!
//! The poller runs in a background task, fetching once immediately and then on
//! a fixed interval. Each tick yields the complete collection; there is no
//! incremental update.

use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::http::ApiClient;
use crate::protocol::AircraftReport;

/// Configuration for the position poller.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Time between fetches.
    pub interval: Duration,
    /// Channel buffer size for poll events.
    pub buffer_size: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            buffer_size: 8,
        }
    }
}

/// Events emitted by the poller.
#[derive(Debug, Clone)]
pub enum PollEvent {
    /// A fresh, complete report collection.
    Reports(Vec<AircraftReport>),
    /// The fetch failed; the previous collection is still the latest.
    Failed(String),
}

/// Handle to the background poll task.
///
/// Dropping the handle stops polling.
pub struct Poller {
    event_rx: mpsc::Receiver<PollEvent>,
    cancel_token: CancellationToken,
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("cancel_token", &self.cancel_token)
            .finish_non_exhaustive()
    }
}

impl Poller {
    /// Spawn the poll task on the current runtime.
    #[must_use]
    pub fn spawn(api: ApiClient, config: PollerConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel(config.buffer_size.max(1));
        let cancel_token = CancellationToken::new();
        let task_cancel = cancel_token.clone();

        tokio::spawn(async move {
            poll_loop(api, event_tx, task_cancel, config.interval).await;
        });

        Self {
            event_rx,
            cancel_token,
        }
    }

    /// Next event, without waiting.
    pub fn try_recv(&mut self) -> Option<PollEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Wait for the next event. Returns `None` once the poller has stopped.
    pub async fn recv(&mut self) -> Option<PollEvent> {
        self.event_rx.recv().await
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

async fn poll_loop(
    api: ApiClient,
    event_tx: mpsc::Sender<PollEvent>,
    cancel_token: CancellationToken,
    period: Duration,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!("Polling {} every {}s", api.current_url(), period.as_secs());

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            () = cancel_token.cancelled() => {
                info!("Poller cancelled");
                return;
            }
        }

        let event = tokio::select! {
            result = api.fetch_current() => match result {
                Ok(reports) => {
                    debug!("Poll returned {} aircraft", reports.len());
                    PollEvent::Reports(reports)
                }
                Err(e) => {
                    warn!("Poll failed: {}", e);
                    PollEvent::Failed(e.to_string())
                }
            },
            () = cancel_token.cancelled() => {
                info!("Poller cancelled during fetch");
                return;
            }
        };

        if event_tx.send(event).await.is_err() {
            return; // Receiver dropped
        }
    }
}
