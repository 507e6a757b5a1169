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

//! Selection and history session.
//!
//! Tracks which aircraft is selected, its photo and its history trail. Every
//! selection change issues exactly one photo request and one history request.
//! Trail-length changes are debounced so a burst of stepper clicks ends in a
//! single history request.
//!
//! Requests are tagged with a per-kind generation. Outcomes from anything but
//! the latest request of their kind are dropped, so a slow answer for an
//! aircraft the user has already moved away from never overwrites fresh state.

mod debounce;

pub use debounce::{DebounceToken, Debouncer, DEFAULT_DEBOUNCE};

use log::{debug, info, warn};
use tokio::sync::mpsc;

use crate::error::{SearchError, SEARCH_MAX_LEN, SEARCH_MIN_LEN};
use crate::fetch::{FetchOutcome, FetchRequest};
use crate::protocol::{AircraftReport, HistoryTrail, Photo, PhotoLookup, TrailLength};
use crate::render::find_by_icao_or_callsign;

/// Photo panel state for the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PhotoState {
    /// Nothing selected.
    #[default]
    None,
    Loading,
    Available(Photo),
    /// The API answered but has no photo for this aircraft.
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Selected,
    /// A trail-length change is waiting for the debounce window to pass.
    PendingHistoryRefresh,
}

/// Selection session owned by the UI thread.
#[derive(Debug)]
pub struct Session {
    selection: Option<AircraftReport>,
    trail: Option<HistoryTrail>,
    photo: PhotoState,
    trail_length: TrailLength,
    requests: mpsc::UnboundedSender<FetchRequest>,
    debouncer: Debouncer,
    photo_generation: u64,
    history_generation: u64,
}

impl Session {
    #[must_use]
    pub fn new(
        requests: mpsc::UnboundedSender<FetchRequest>,
        debouncer: Debouncer,
        trail_length: TrailLength,
    ) -> Self {
        Self {
            selection: None,
            trail: None,
            photo: PhotoState::None,
            trail_length,
            requests,
            debouncer,
            photo_generation: 0,
            history_generation: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.selection.is_none() {
            SessionState::Idle
        } else if self.debouncer.is_pending() {
            SessionState::PendingHistoryRefresh
        } else {
            SessionState::Selected
        }
    }

    #[must_use]
    pub fn selection(&self) -> Option<&AircraftReport> {
        self.selection.as_ref()
    }

    #[must_use]
    pub fn selected_icao(&self) -> Option<&str> {
        self.selection.as_ref().map(|r| r.icao.as_str())
    }

    #[must_use]
    pub fn trail(&self) -> Option<&HistoryTrail> {
        self.trail.as_ref()
    }

    #[must_use]
    pub fn photo(&self) -> &PhotoState {
        &self.photo
    }

    #[must_use]
    pub fn trail_length(&self) -> TrailLength {
        self.trail_length
    }

    /// Select `report`. Returns `false` if it was already selected.
    pub fn select_by_click(&mut self, report: &AircraftReport) -> bool {
        if self.selected_icao() == Some(report.icao.as_str()) {
            return false;
        }

        info!("Selected {} ({})", report.icao, report.callsign);
        self.debouncer.cancel();
        self.selection = Some(report.clone());
        self.trail = None;
        self.photo = PhotoState::Loading;

        self.photo_generation += 1;
        self.send(FetchRequest::Photo {
            icao: report.icao.clone(),
            generation: self.photo_generation,
        });
        self.request_history();
        true
    }

    /// Drop the selection together with its trail and photo.
    pub fn clear_selection(&mut self) {
        if let Some(previous) = self.selection.take() {
            debug!("Cleared selection of {}", previous.icao);
        }
        self.debouncer.cancel();
        self.trail = None;
        self.photo = PhotoState::None;

        // Anything still in flight belongs to the old selection
        self.photo_generation += 1;
        self.history_generation += 1;
    }

    /// Select the first report whose icao or callsign equals the trimmed `term`.
    ///
    /// Nothing changes when the term is rejected or matches no aircraft.
    pub fn search(&mut self, term: &str, reports: &[AircraftReport]) -> Result<AircraftReport, SearchError> {
        let term = term.trim();
        let len = term.chars().count();
        if !(SEARCH_MIN_LEN..=SEARCH_MAX_LEN).contains(&len) {
            return Err(SearchError::validation(len));
        }

        let found = find_by_icao_or_callsign(term, Some(reports))
            .cloned()
            .ok_or_else(|| SearchError::NotFound(term.to_string()))?;

        self.select_by_click(&found);
        Ok(found)
    }

    /// Store a new trail length and, with a selection active, restart the debounce.
    pub fn set_trail_length(&mut self, trail_length: TrailLength) {
        self.trail_length = trail_length;
        if self.selection.is_some() {
            debug!(
                "Trail length {} pending for {:?}",
                trail_length,
                self.debouncer.window()
            );
            self.debouncer.restart();
        }
    }

    /// Handle a fired debounce timer. Returns `true` if a history fetch was issued.
    pub fn on_debounce_elapsed(&mut self, token: DebounceToken) -> bool {
        if !self.debouncer.accept(token) || self.selection.is_none() {
            return false;
        }
        self.request_history();
        true
    }

    /// Swap in the fresh record for the selected icao from a new poll.
    ///
    /// If the aircraft is missing from `reports` the last known record is kept.
    pub fn refresh_selection(&mut self, reports: &[AircraftReport]) -> bool {
        let Some(selected) = self.selection.as_mut() else {
            return false;
        };
        match reports.iter().find(|r| r.icao == selected.icao) {
            Some(fresh) => {
                if *selected != *fresh {
                    *selected = fresh.clone();
                }
                true
            }
            None => {
                debug!("Selected aircraft {} missing from latest poll", selected.icao);
                false
            }
        }
    }

    /// Apply a fetch outcome. Returns `false` for outcomes that were dropped.
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        match outcome {
            FetchOutcome::Photo {
                icao,
                generation,
                result,
            } => {
                if generation != self.photo_generation || self.selected_icao() != Some(icao.as_str()) {
                    debug!("Dropping stale photo for {} (generation {})", icao, generation);
                    return false;
                }
                match result {
                    Ok(PhotoLookup::Found(photo)) => self.photo = PhotoState::Available(photo),
                    Ok(PhotoLookup::Unavailable) => self.photo = PhotoState::Unavailable,
                    Err(e) => warn!("Photo lookup for {} failed: {}", icao, e),
                }
                true
            }
            FetchOutcome::History {
                icao,
                generation,
                result,
            } => {
                if generation != self.history_generation || self.selected_icao() != Some(icao.as_str()) {
                    debug!("Dropping stale history for {} (generation {})", icao, generation);
                    return false;
                }
                match result {
                    Ok(trail) => {
                        debug!("History for {}: {} points", icao, trail.len());
                        self.trail = Some(trail);
                    }
                    Err(e) => warn!("History lookup for {} failed: {}", icao, e),
                }
                true
            }
        }
    }

    fn request_history(&mut self) {
        let Some(icao) = self.selected_icao().map(str::to_string) else {
            return;
        };
        self.history_generation += 1;
        self.send(FetchRequest::History {
            icao,
            trail: self.trail_length,
            generation: self.history_generation,
        });
    }

    fn send(&self, request: FetchRequest) {
        if self.requests.send(request).is_err() {
            warn!("Fetch worker is gone, request dropped");
        }
    }
}
