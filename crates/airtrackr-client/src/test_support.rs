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

//! Shared fixtures and a loopback HTTP stub for unit tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::geo::{GeoPoint, ViewportBounds};
use crate::protocol::AircraftReport;

#[allow(clippy::too_many_arguments, reason = "flat fixture rows")]
fn report(
    icao: &str,
    callsign: &str,
    lat: f64,
    lon: f64,
    altitude: i32,
    speed: i32,
    track: i32,
    vertical_speed: i32,
    timestamp: &str,
) -> AircraftReport {
    AircraftReport {
        icao: icao.to_string(),
        callsign: callsign.to_string(),
        position: GeoPoint::new(lat, lon),
        altitude,
        speed,
        vertical_speed,
        track,
        timestamp: timestamp.to_string(),
    }
}

/// Four aircraft spread over three continents.
pub(crate) fn fixture() -> Vec<AircraftReport> {
    vec![
        report("8BA5", "OPM007", 40.785812, -74.27357, 6175, 231, 256, 256, "2024-03-15T12:49:19Z"),
        report("8DF8", "SFR345", -29.51123, 31.118986, 6100, 239, 324, 2496, "2024-03-15T12:49:18Z"),
        report("45AC32", "SAS4632", 54.06299, 10.196411, 33975, 509, 6, 0, "2024-03-15T12:49:18Z"),
        report("45AC37", "SAS1812", 57.82393, 16.3162, 37000, 494, 39, 0, "2024-03-15T12:49:19Z"),
    ]
}

/// A view over southern Sweden holding only SAS1812 from [`fixture`].
pub(crate) fn fixture_bounds_around_sas1812() -> ViewportBounds {
    ViewportBounds::new(GeoPoint::new(60.0, 20.0), GeoPoint::new(56.0, 12.0))
}

/// `n` distinct aircraft, all strictly inside `bounds`.
pub(crate) fn synthetic(n: usize, bounds: &ViewportBounds) -> Vec<AircraftReport> {
    let height = bounds.north_east.lat - bounds.south_west.lat;
    let width = bounds.north_east.lon - bounds.south_west.lon;

    (0..n)
        .map(|i| {
            let row = f64::from(u32::try_from(i % 97).unwrap_or(0));
            let col = f64::from(u32::try_from(i % 89).unwrap_or(0));
            report(
                &format!("{i:06X}"),
                &format!("SYN{i}"),
                bounds.south_west.lat + height * (row + 0.5) / 97.0,
                bounds.south_west.lon + width * (col + 0.5) / 89.0,
                30000,
                450,
                90,
                0,
                "2024-03-15T12:49:19Z",
            )
        })
        .collect()
}

/// Minimal HTTP/1.1 server answering canned responses keyed by request target.
///
/// Unknown targets get a 404. Every response closes the connection.
pub(crate) struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl StubServer {
    pub(crate) async fn start(routes: Vec<(&str, u16, &str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes: Arc<HashMap<String, (u16, String)>> = Arc::new(
            routes
                .into_iter()
                .map(|(path, status, body)| (path.to_string(), (status, body.to_string())))
                .collect(),
        );
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&requests);
        let task = tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let routes = Arc::clone(&routes);
                let seen = Arc::clone(&seen);
                tokio::spawn(async move {
                    let (read, mut write) = stream.split();
                    let mut lines = BufReader::new(read).lines();

                    let Ok(Some(request_line)) = lines.next_line().await else {
                        return;
                    };
                    while let Ok(Some(header)) = lines.next_line().await {
                        if header.is_empty() {
                            break;
                        }
                    }

                    let target = request_line.split_whitespace().nth(1).unwrap_or("/").to_string();
                    seen.lock().unwrap().push(target.clone());

                    let (status, body) = routes
                        .get(&target)
                        .cloned()
                        .unwrap_or((404, "not found".to_string()));
                    let response = if status == 204 {
                        "HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n".to_string()
                    } else {
                        let reason = if status < 400 { "OK" } else { "Error" };
                        format!(
                            "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                            body.len()
                        )
                    };
                    let _ = write.write_all(response.as_bytes()).await;
                    let _ = write.shutdown().await;
                });
            }
        });

        Self { addr, requests, task }
    }

    pub(crate) fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Request targets received so far, in arrival order.
    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
