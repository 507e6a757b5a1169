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

use std::borrow::Borrow;

use crate::protocol::AircraftReport;

/// Find the first report whose icao or callsign equals `key` exactly.
///
/// Works on owned reports or on references, so the reconciler can search its
/// borrowed candidate list without cloning.
#[must_use]
pub fn find_by_icao_or_callsign<'a, R>(key: &str, list: Option<&'a [R]>) -> Option<&'a R>
where
    R: Borrow<AircraftReport>,
{
    list?.iter().find(|r| {
        let report = <R as Borrow<AircraftReport>>::borrow(r);
        report.icao == key || report.callsign == key
    })
}
