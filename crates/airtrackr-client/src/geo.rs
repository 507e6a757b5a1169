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

//! Geographic primitives and viewport membership.
//!
//! Positions are stored with named `lat`/`lon` fields. Wire formats that use
//! positional `[lon, lat]` pairs are converted once, at decode time, so nothing
//! past the protocol layer has to remember the axis order.

use serde::{Deserialize, Serialize};

/// A point in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build a point from a GeoJSON `[lon, lat, ...]` position.
    ///
    /// Returns `None` when fewer than two ordinates are present.
    #[must_use]
    pub fn from_lon_lat(position: &[f64]) -> Option<Self> {
        match position {
            [lon, lat, ..] => Some(Self::new(*lat, *lon)),
            _ => None,
        }
    }
}

/// Rectangular map extent, as reported by the map widget once a pan or zoom settles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportBounds {
    pub north_east: GeoPoint,
    pub south_west: GeoPoint,
}

impl ViewportBounds {
    #[must_use]
    pub const fn new(north_east: GeoPoint, south_west: GeoPoint) -> Self {
        Self {
            north_east,
            south_west,
        }
    }

    /// Build bounds from any two opposite corners.
    #[must_use]
    pub fn from_corners(a: GeoPoint, b: GeoPoint) -> Self {
        Self {
            north_east: GeoPoint::new(a.lat.max(b.lat), a.lon.max(b.lon)),
            south_west: GeoPoint::new(a.lat.min(b.lat), a.lon.min(b.lon)),
        }
    }

    /// Closed-interval containment on both axes.
    #[must_use]
    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
            && (self.south_west.lon..=self.north_east.lon).contains(&point.lon)
    }

    #[must_use]
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.north_east.lat + self.south_west.lat) / 2.0,
            (self.north_east.lon + self.south_west.lon) / 2.0,
        )
    }
}

/// Whether `point` lies inside `bounds`, edges included.
///
/// Absent input on either side is never inside.
#[must_use]
pub fn in_bounds(point: Option<&GeoPoint>, bounds: Option<&ViewportBounds>) -> bool {
    match (point, bounds) {
        (Some(point), Some(bounds)) => bounds.contains(point),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scandinavia() -> ViewportBounds {
        ViewportBounds::new(GeoPoint::new(62.0, 20.0), GeoPoint::new(55.0, 5.0))
    }

    #[test]
    fn test_point_inside() {
        let bounds = scandinavia();
        assert!(in_bounds(Some(&GeoPoint::new(57.82393, 16.3162)), Some(&bounds)));
    }

    #[test]
    fn test_absent_inputs() {
        let bounds = scandinavia();
        let point = GeoPoint::new(57.8, 16.3);
        assert!(!in_bounds(None, Some(&bounds)));
        assert!(!in_bounds(Some(&point), None));
        assert!(!in_bounds(None, None));
    }

    #[test]
    fn test_edges_are_inclusive() {
        let bounds = scandinavia();
        assert!(in_bounds(Some(&GeoPoint::new(62.0, 20.0)), Some(&bounds)));
        assert!(in_bounds(Some(&GeoPoint::new(55.0, 5.0)), Some(&bounds)));
        assert!(in_bounds(Some(&GeoPoint::new(55.0, 20.0)), Some(&bounds)));
    }

    #[test]
    fn test_outside_on_each_axis() {
        let bounds = scandinavia();
        // Too far north, then too far south
        assert!(!in_bounds(Some(&GeoPoint::new(65.0, 16.3)), Some(&bounds)));
        assert!(!in_bounds(Some(&GeoPoint::new(50.0, 16.3)), Some(&bounds)));
        // Too far west, then too far east
        assert!(!in_bounds(Some(&GeoPoint::new(57.8, -10.0)), Some(&bounds)));
        assert!(!in_bounds(Some(&GeoPoint::new(57.8, 25.0)), Some(&bounds)));
    }

    #[test]
    fn test_nan_is_never_inside() {
        let bounds = scandinavia();
        assert!(!in_bounds(Some(&GeoPoint::new(f64::NAN, 10.0)), Some(&bounds)));
    }

    #[test]
    fn test_from_corners_normalizes() {
        let bounds = ViewportBounds::from_corners(GeoPoint::new(55.0, 20.0), GeoPoint::new(62.0, 5.0));
        assert_eq!(bounds, scandinavia());
        assert_eq!(bounds.center(), GeoPoint::new(58.5, 12.5));
    }

    #[test]
    fn test_from_lon_lat() {
        assert_eq!(
            GeoPoint::from_lon_lat(&[16.3162, 57.82393]),
            Some(GeoPoint::new(57.82393, 16.3162))
        );
        assert_eq!(GeoPoint::from_lon_lat(&[16.3]), None);
    }
}
