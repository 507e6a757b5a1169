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

//! Data contracts for the AirTrackr backend and the planespotters photo API.
//!
//! The backend serves GeoJSON feature collections: points for current
//! positions and line strings for history. Both use GeoJSON `[lon, lat]`
//! ordering on the wire. Decoding lives in the submodules; this module holds
//! the in-memory types the rest of the crate works with.

mod geojson;
mod planespotters;

pub use geojson::{decode_current, decode_history};
pub use planespotters::decode_photos;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::geo::GeoPoint;

/// One aircraft position report from the current-positions feed.
///
/// The whole collection is replaced on every poll; identity across polls is
/// the `icao` field.
#[derive(Debug, Clone, PartialEq)]
pub struct AircraftReport {
    /// ICAO 24-bit address (hex string).
    pub icao: String,
    /// Flight callsign, may be empty.
    pub callsign: String,
    pub position: GeoPoint,
    /// Altitude in feet.
    pub altitude: i32,
    /// Ground speed in knots.
    pub speed: i32,
    /// Vertical rate in feet per minute.
    pub vertical_speed: i32,
    /// Track angle in degrees (0-360, north = 0).
    pub track: i32,
    /// Report time exactly as sent by the backend.
    pub timestamp: String,
}

impl AircraftReport {
    /// Parse the report timestamp as RFC 3339.
    #[must_use]
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Seconds between the report timestamp and `now`.
    #[must_use]
    pub fn age_seconds(&self, now: DateTime<Utc>) -> Option<i64> {
        self.timestamp_utc().map(|t| (now - t).num_seconds())
    }
}

/// Historical positions for one aircraft, drawn as a single polyline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryTrail {
    pub icao: String,
    pub points: Vec<GeoPoint>,
}

impl HistoryTrail {
    #[must_use]
    pub fn empty(icao: impl Into<String>) -> Self {
        Self {
            icao: icao.into(),
            points: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// How much history to request for the selected aircraft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailLength {
    /// Everything the backend has stored.
    #[default]
    All,
    /// The last `n` hours.
    Hours(u32),
}

impl TrailLength {
    /// Query string suffix for the history endpoint.
    #[must_use]
    pub fn query(&self) -> Option<String> {
        match self {
            Self::All => None,
            Self::Hours(hours) => Some(format!("?hour={hours}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrailLengthError {
    #[error("trail length must be \"all\" or a whole number of hours, got '{0}'")]
    Invalid(String),

    #[error("trail length must be at least one hour")]
    Zero,
}

impl FromStr for TrailLength {
    type Err = TrailLengthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        match s.parse::<u32>() {
            Ok(0) => Err(TrailLengthError::Zero),
            Ok(hours) => Ok(Self::Hours(hours)),
            Err(_) => Err(TrailLengthError::Invalid(s.to_string())),
        }
    }
}

impl fmt::Display for TrailLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Hours(hours) => write!(f, "{hours}"),
        }
    }
}

/// A thumbnail rendition of an aircraft photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub src: String,
    pub width: u32,
    pub height: u32,
}

/// Aircraft photo metadata from planespotters.net.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub id: String,
    pub thumbnail: Thumbnail,
    pub thumbnail_large: Thumbnail,
    /// Photo page, used for the photographer credit link.
    pub link: String,
    pub photographer: String,
}

/// Result of a photo lookup that reached the API.
///
/// An error payload or an empty photo list is not a failure, just a missing
/// image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoLookup {
    Found(Photo),
    Unavailable,
}

impl PhotoLookup {
    #[must_use]
    pub fn photo(&self) -> Option<&Photo> {
        match self {
            Self::Found(photo) => Some(photo),
            Self::Unavailable => None,
        }
    }
}
