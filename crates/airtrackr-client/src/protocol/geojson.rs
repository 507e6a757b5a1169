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

//! GeoJSON decoding for the current-positions and history endpoints.
//!
//! Current positions:
//! ```text
//! { "type": "FeatureCollection",
//!   "features": [ { "properties": { "icao", "callsign", "altitude", "speed",
//!                                   "track", "vspeed", "timestamp" },
//!                   "geometry": { "type": "Point", "coordinates": [lon, lat] } } ] }
//! ```
//!
//! The backend writes `"features": null` when it has nothing to report.

use log::warn;
use serde::{Deserialize, Deserializer};

use super::{AircraftReport, HistoryTrail};
use crate::geo::GeoPoint;

#[derive(Debug, Deserialize)]
struct FeatureCollection<F> {
    features: Option<Vec<F>>,
}

impl<F> FeatureCollection<F> {
    fn into_features(self) -> Vec<F> {
        self.features.unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct Geometry<C> {
    coordinates: C,
}

#[derive(Debug, Deserialize)]
struct PointFeature {
    properties: CurrentProperties,
    geometry: Option<Geometry<Vec<f64>>>,
}

#[derive(Debug, Deserialize)]
struct CurrentProperties {
    icao: String,
    #[serde(default)]
    callsign: String,
    #[serde(default, deserialize_with = "lenient_i32")]
    altitude: i32,
    #[serde(default, deserialize_with = "lenient_i32")]
    speed: i32,
    #[serde(default, deserialize_with = "lenient_i32")]
    track: i32,
    #[serde(default, rename = "vspeed", deserialize_with = "lenient_i32")]
    vertical_speed: i32,
    #[serde(default)]
    timestamp: String,
}

#[derive(Debug, Deserialize)]
struct LineFeature {
    geometry: Option<Geometry<Vec<Vec<f64>>>>,
}

/// Telemetry is integral on the backend, but accept any number (or null).
#[allow(clippy::cast_possible_truncation, reason = "telemetry values are far inside i32 range")]
fn lenient_i32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.map_or(0, |v| v.round() as i32))
}

/// Decode a current-positions response body.
///
/// Features without a usable point geometry are skipped.
pub fn decode_current(body: &[u8]) -> Result<Vec<AircraftReport>, serde_json::Error> {
    let collection: FeatureCollection<PointFeature> = serde_json::from_slice(body)?;

    let reports = collection
        .into_features()
        .into_iter()
        .filter_map(|feature| {
            let position = feature
                .geometry
                .as_ref()
                .and_then(|g| GeoPoint::from_lon_lat(&g.coordinates));
            let Some(position) = position else {
                warn!("Skipping {} with no usable position", feature.properties.icao);
                return None;
            };

            let p = feature.properties;
            Some(AircraftReport {
                icao: p.icao,
                callsign: p.callsign.trim().to_string(),
                position,
                altitude: p.altitude,
                speed: p.speed,
                vertical_speed: p.vertical_speed,
                track: p.track,
                timestamp: p.timestamp,
            })
        })
        .collect();

    Ok(reports)
}

/// Decode a history response body into one polyline.
///
/// Line strings are concatenated in response order.
pub fn decode_history(icao: &str, body: &[u8]) -> Result<HistoryTrail, serde_json::Error> {
    let collection: FeatureCollection<LineFeature> = serde_json::from_slice(body)?;

    let points = collection
        .into_features()
        .into_iter()
        .filter_map(|feature| feature.geometry)
        .flat_map(|geometry| geometry.coordinates)
        .filter_map(|position| GeoPoint::from_lon_lat(&position))
        .collect();

    Ok(HistoryTrail {
        icao: icao.to_string(),
        points,
    })
}
