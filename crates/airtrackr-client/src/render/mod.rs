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

//! Render-set reconciliation.
//!
//! Combines the latest report collection, the settled viewport bounds and the
//! current selection into the list of aircraft the map should draw. The set is
//! rebuilt from scratch whenever any input changes:
//!
//! 1. no bounds or no reports: nothing to draw
//! 2. keep reports inside the bounds
//! 3. look the selection up among them
//! 4. thin the in-bounds list
//! 5. put the selection back if thinning dropped it
//!
//! A selected aircraft inside the viewport is therefore always drawn, at the
//! cost of at most one marker over the thinning ceiling.

pub mod resolver;
pub mod thinner;

pub use resolver::find_by_icao_or_callsign;
pub use thinner::{keep_probability, thin, thin_with, THINNING_THRESHOLD};

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geo::{in_bounds, ViewportBounds};
use crate::protocol::AircraftReport;

/// Reports inside `bounds`, in input order.
#[must_use]
pub fn candidates<'a>(reports: &'a [AircraftReport], bounds: &ViewportBounds) -> Vec<&'a AircraftReport> {
    reports
        .iter()
        .filter(|r| in_bounds(Some(&r.position), Some(bounds)))
        .collect()
}

/// Compute a render set from explicit inputs.
pub fn reconcile<R>(
    reports: Option<&[AircraftReport]>,
    bounds: Option<&ViewportBounds>,
    selection: Option<&str>,
    rng: &mut R,
) -> Option<Vec<AircraftReport>>
where
    R: Rng + ?Sized,
{
    reconcile_counted(reports, bounds, selection, rng).map(|(set, _)| set)
}

fn reconcile_counted<R>(
    reports: Option<&[AircraftReport]>,
    bounds: Option<&ViewportBounds>,
    selection: Option<&str>,
    rng: &mut R,
) -> Option<(Vec<AircraftReport>, usize)>
where
    R: Rng + ?Sized,
{
    let (reports, bounds) = (reports?, bounds?);

    let in_view = candidates(reports, bounds);
    let candidate_count = in_view.len();

    // The key is normally an icao; an exact icao hit wins over a callsign that
    // happens to spell the same string.
    let preserved = selection
        .and_then(|key| {
            in_view
                .iter()
                .find(|r| r.icao == key)
                .or_else(|| find_by_icao_or_callsign(key, Some(in_view.as_slice())))
        })
        .copied();

    let mut thinned = thin_with(in_view, rng);
    if let Some(selected) = preserved {
        if !thinned.iter().any(|r| r.icao == selected.icao) {
            thinned.push(selected);
        }
    }

    Some((thinned.into_iter().cloned().collect(), candidate_count))
}

/// Stateful holder of the three render inputs and the derived render set.
///
/// Every setter recomputes synchronously, so [`Reconciler::render_set`] always
/// reflects the most recent reports, bounds and selection together.
#[derive(Debug)]
pub struct Reconciler<R = StdRng> {
    reports: Option<Vec<AircraftReport>>,
    bounds: Option<ViewportBounds>,
    selection: Option<String>,
    render_set: Option<Vec<AircraftReport>>,
    candidate_count: usize,
    recomputes: u64,
    rng: R,
}

impl Reconciler<StdRng> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl Default for Reconciler<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Reconciler<R> {
    /// Create a reconciler that thins with the given RNG.
    pub fn with_rng(rng: R) -> Self {
        Self {
            reports: None,
            bounds: None,
            selection: None,
            render_set: None,
            candidate_count: 0,
            recomputes: 0,
            rng,
        }
    }

    /// Replace the whole report collection.
    pub fn set_reports(&mut self, reports: Vec<AircraftReport>) -> Option<&[AircraftReport]> {
        self.reports = Some(reports);
        self.recompute();
        self.render_set()
    }

    /// Replace the viewport bounds. Unchanged bounds do not trigger a recompute.
    pub fn set_bounds(&mut self, bounds: Option<ViewportBounds>) -> Option<&[AircraftReport]> {
        if self.bounds != bounds {
            self.bounds = bounds;
            self.recompute();
        }
        self.render_set()
    }

    /// Replace the selected icao. Unchanged selection does not trigger a recompute.
    pub fn set_selection(&mut self, icao: Option<String>) -> Option<&[AircraftReport]> {
        if self.selection != icao {
            self.selection = icao;
            self.recompute();
        }
        self.render_set()
    }

    /// Rebuild the render set from the stored inputs.
    pub fn recompute(&mut self) {
        let result = reconcile_counted(
            self.reports.as_deref(),
            self.bounds.as_ref(),
            self.selection.as_deref(),
            &mut self.rng,
        );
        self.recomputes += 1;

        match result {
            Some((set, candidate_count)) => {
                debug!(
                    "Render set: {} of {} in view ({} reports total)",
                    set.len(),
                    candidate_count,
                    self.reports.as_ref().map_or(0, Vec::len)
                );
                self.candidate_count = candidate_count;
                self.render_set = Some(set);
            }
            None => {
                self.candidate_count = 0;
                self.render_set = None;
            }
        }
    }

    /// Aircraft to draw, or `None` until both reports and bounds are known.
    #[must_use]
    pub fn render_set(&self) -> Option<&[AircraftReport]> {
        self.render_set.as_deref()
    }

    /// The full report collection from the last poll (empty before the first).
    #[must_use]
    pub fn reports(&self) -> &[AircraftReport] {
        self.reports.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn has_reports(&self) -> bool {
        self.reports.is_some()
    }

    #[must_use]
    pub fn bounds(&self) -> Option<&ViewportBounds> {
        self.bounds.as_ref()
    }

    #[must_use]
    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    /// Number of reports inside the bounds before thinning.
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.candidate_count
    }

    #[must_use]
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }
}
