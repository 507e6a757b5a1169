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

//! Client library for the AirTrackr flight map.
//!
//! The library turns a periodically polled list of aircraft positions into the
//! set of markers a map should draw, and manages the selected aircraft with its
//! photo and history trail. The layers can be used on their own:
//!
//! - **Geo / render layer**: pure bounds filtering, selection lookup,
//!   randomized thinning and the [`Reconciler`] that combines them
//! - **Protocol layer**: GeoJSON and photo API decoding
//! - **HTTP layer**: [`ApiClient`] for the backend, [`PhotoService`] for photos
//! - **Session layer**: selection state, debounced history refresh
//! - **Background layer**: [`Poller`] and [`FetchWorker`] tasks
//!
//! # Quick Start
//!
//! Use the [`Client`] type from a UI loop:
//!
//! ```no_run
//! use airtrackr_client::{Client, ClientConfig, GeoPoint, ViewportBounds};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut client = Client::spawn(ClientConfig {
//!         api_url: "http://localhost:8080".to_string(),
//!         ..Default::default()
//!     });
//!     client.set_bounds(Some(ViewportBounds::new(
//!         GeoPoint::new(62.0, 14.0),
//!         GeoPoint::new(59.0, 7.0),
//!     )));
//!
//!     loop {
//!         let updates = client.poll_updates();
//!         if updates.reports {
//!             for aircraft in client.render_set().unwrap_or_default() {
//!                 println!("{} {}", aircraft.icao, aircraft.callsign);
//!             }
//!         }
//!         tokio::time::sleep(std::time::Duration::from_millis(16)).await;
//!     }
//! }
//! ```
//!
//! # Using Individual Layers
//!
//! ```
//! use airtrackr_client::render::reconcile;
//! use airtrackr_client::{AircraftReport, GeoPoint, ViewportBounds};
//!
//! let reports = vec![AircraftReport {
//!     icao: "45AC37".to_string(),
//!     callsign: "SAS1812".to_string(),
//!     position: GeoPoint::new(57.82393, 16.3162),
//!     altitude: 37000,
//!     speed: 494,
//!     vertical_speed: 0,
//!     track: 39,
//!     timestamp: "2024-03-15T12:49:19Z".to_string(),
//! }];
//! let bounds = ViewportBounds::new(GeoPoint::new(60.0, 20.0), GeoPoint::new(56.0, 12.0));
//!
//! let set = reconcile(Some(&reports[..]), Some(&bounds), Some("45AC37"), &mut rand::rng());
//! assert_eq!(set.map(|s| s.len()), Some(1));
//! ```

pub mod error;
pub mod fetch;
pub mod geo;
pub mod http;
pub mod poller;
pub mod protocol;
pub mod render;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

use std::time::Duration;

use chrono::{DateTime, Utc};
use log::info;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

pub use error::{NetworkError, SearchError};
pub use fetch::{FetchOutcome, FetchRequest, FetchWorker};
pub use geo::{in_bounds, GeoPoint, ViewportBounds};
pub use http::{ApiClient, PhotoService, DEFAULT_API_URL, PLANESPOTTERS_URL};
pub use poller::{PollEvent, Poller, PollerConfig};
pub use protocol::{AircraftReport, HistoryTrail, Photo, PhotoLookup, Thumbnail, TrailLength};
pub use render::{find_by_icao_or_callsign, thin, Reconciler};
pub use session::{DebounceToken, Debouncer, PhotoState, Session, SessionState, DEFAULT_DEBOUNCE};

/// Configuration for the full-stack client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL.
    pub api_url: String,
    /// Photo API root.
    pub photo_url: String,
    /// Position polling.
    pub poller: PollerConfig,
    /// Quiet period before a trail-length change refetches history.
    pub debounce: Duration,
    /// Trail length used for the first selection.
    pub trail_length: TrailLength,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            photo_url: PLANESPOTTERS_URL.to_string(),
            poller: PollerConfig::default(),
            debounce: DEFAULT_DEBOUNCE,
            trail_length: TrailLength::default(),
        }
    }
}

/// What changed during one [`Client::poll_updates`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Updates {
    /// A new report collection arrived and the render set was rebuilt.
    pub reports: bool,
    /// Selection, photo or trail changed.
    pub session: bool,
    /// The latest poll failed with this message.
    pub poll_error: Option<String>,
}

impl Updates {
    #[must_use]
    pub fn any(&self) -> bool {
        self.reports || self.session || self.poll_error.is_some()
    }
}

/// Full-stack client that wires the background tasks to the render pipeline.
///
/// Owned by the UI thread. Background tasks only talk to it through channels,
/// drained by [`poll_updates`](Client::poll_updates), so nothing here is locked.
#[derive(Debug)]
pub struct Client {
    poller: Poller,
    fetcher: FetchWorker,
    timer_rx: mpsc::UnboundedReceiver<DebounceToken>,
    reconciler: Reconciler,
    session: Session,
    last_poll: Option<DateTime<Utc>>,
    last_poll_error: Option<String>,
}

impl Client {
    /// Spawn the poller and fetch worker on the current tokio runtime.
    ///
    /// Must be called from within a runtime context.
    #[must_use]
    pub fn spawn(config: ClientConfig) -> Self {
        let api = ApiClient::new(config.api_url);
        let photos = PhotoService::with_base_url(config.photo_url, api.http().clone());
        info!("AirTrackr client using backend {}", api.base_url());

        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::new(config.debounce, Handle::current(), timer_tx);

        Self {
            poller: Poller::spawn(api.clone(), config.poller),
            fetcher: FetchWorker::spawn(api, photos, request_rx),
            timer_rx,
            reconciler: Reconciler::new(),
            session: Session::new(request_tx, debouncer, config.trail_length),
            last_poll: None,
            last_poll_error: None,
        }
    }

    /// Drain every pending background event without blocking.
    ///
    /// Poll results are applied first, then fired debounce timers, then fetch
    /// outcomes.
    pub fn poll_updates(&mut self) -> Updates {
        let mut updates = Updates::default();

        while let Some(event) = self.poller.try_recv() {
            match event {
                PollEvent::Reports(reports) => {
                    updates.session |= self.session.refresh_selection(&reports);
                    self.reconciler.set_reports(reports);
                    self.last_poll = Some(Utc::now());
                    self.last_poll_error = None;
                    updates.reports = true;
                    updates.poll_error = None;
                }
                PollEvent::Failed(message) => {
                    self.last_poll_error = Some(message.clone());
                    updates.poll_error = Some(message);
                }
            }
        }

        while let Ok(token) = self.timer_rx.try_recv() {
            updates.session |= self.session.on_debounce_elapsed(token);
        }

        while let Some(outcome) = self.fetcher.try_recv() {
            updates.session |= self.session.apply(outcome);
        }

        updates
    }

    /// Settled viewport bounds from the map widget.
    pub fn set_bounds(&mut self, bounds: Option<ViewportBounds>) {
        self.reconciler.set_bounds(bounds);
    }

    /// Select a clicked aircraft. Returns `false` if it was already selected.
    pub fn select_by_click(&mut self, report: &AircraftReport) -> bool {
        let changed = self.session.select_by_click(report);
        self.sync_selection();
        changed
    }

    pub fn clear_selection(&mut self) {
        self.session.clear_selection();
        self.sync_selection();
    }

    /// Search the full collection by icao or callsign and select the match.
    pub fn search(&mut self, term: &str) -> Result<AircraftReport, SearchError> {
        let found = self.session.search(term, self.reconciler.reports())?;
        self.sync_selection();
        Ok(found)
    }

    pub fn set_trail_length(&mut self, trail_length: TrailLength) {
        self.session.set_trail_length(trail_length);
    }

    #[must_use]
    pub fn render_set(&self) -> Option<&[AircraftReport]> {
        self.reconciler.render_set()
    }

    /// Every aircraft from the last successful poll.
    #[must_use]
    pub fn reports(&self) -> &[AircraftReport] {
        self.reconciler.reports()
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Time the last report collection arrived.
    #[must_use]
    pub fn last_poll(&self) -> Option<DateTime<Utc>> {
        self.last_poll
    }

    /// Error from the most recent poll, cleared by the next success.
    #[must_use]
    pub fn last_poll_error(&self) -> Option<&str> {
        self.last_poll_error.as_deref()
    }

    /// Stop the background tasks.
    pub fn shutdown(&self) {
        self.poller.shutdown();
        self.fetcher.shutdown();
    }

    fn sync_selection(&mut self) {
        let icao = self.session.selected_icao().map(str::to_string);
        self.reconciler.set_selection(icao);
    }
}
