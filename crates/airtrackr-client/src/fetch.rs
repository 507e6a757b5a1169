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

//! Background execution of photo and history requests.
//!
//! The session only emits [`FetchRequest`]s; this worker runs each one in its
//! own task and hands back a [`FetchOutcome`] carrying the same generation, so
//! the session can drop answers that arrive after a newer request.

use log::{debug, info};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::NetworkError;
use crate::http::{ApiClient, PhotoService};
use crate::protocol::{HistoryTrail, PhotoLookup, TrailLength};

/// Work issued by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Photo {
        icao: String,
        generation: u64,
    },
    History {
        icao: String,
        trail: TrailLength,
        generation: u64,
    },
}

impl FetchRequest {
    #[must_use]
    pub fn icao(&self) -> &str {
        match self {
            Self::Photo { icao, .. } | Self::History { icao, .. } => icao,
        }
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        match self {
            Self::Photo { generation, .. } | Self::History { generation, .. } => *generation,
        }
    }
}

/// Result of a [`FetchRequest`].
#[derive(Debug)]
pub enum FetchOutcome {
    Photo {
        icao: String,
        generation: u64,
        result: Result<PhotoLookup, NetworkError>,
    },
    History {
        icao: String,
        generation: u64,
        result: Result<HistoryTrail, NetworkError>,
    },
}

/// Run one request to completion.
pub async fn execute(api: &ApiClient, photos: &PhotoService, request: FetchRequest) -> FetchOutcome {
    match request {
        FetchRequest::Photo { icao, generation } => {
            let result = photos.lookup(&icao).await;
            FetchOutcome::Photo {
                icao,
                generation,
                result,
            }
        }
        FetchRequest::History {
            icao,
            trail,
            generation,
        } => {
            let result = api.fetch_history(&icao, trail).await;
            FetchOutcome::History {
                icao,
                generation,
                result,
            }
        }
    }
}

/// Handle to the background fetch worker.
///
/// Dropping the handle stops accepting new requests; requests already running
/// finish and their outcomes are discarded.
#[derive(Debug)]
pub struct FetchWorker {
    outcome_rx: mpsc::UnboundedReceiver<FetchOutcome>,
    cancel_token: CancellationToken,
}

impl FetchWorker {
    #[must_use]
    pub fn spawn(
        api: ApiClient,
        photos: PhotoService,
        mut requests: mpsc::UnboundedReceiver<FetchRequest>,
    ) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let cancel_token = CancellationToken::new();
        let task_cancel = cancel_token.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    request = requests.recv() => {
                        let Some(request) = request else {
                            debug!("Fetch request channel closed");
                            break;
                        };
                        debug!("Fetching {:?}", request);

                        let (api, photos, outcome_tx) = (api.clone(), photos.clone(), outcome_tx.clone());
                        tokio::spawn(async move {
                            let outcome = execute(&api, &photos, request).await;
                            let _ = outcome_tx.send(outcome);
                        });
                    }

                    () = task_cancel.cancelled() => {
                        info!("Fetch worker cancelled");
                        break;
                    }
                }
            }
        });

        Self {
            outcome_rx,
            cancel_token,
        }
    }

    /// Next finished outcome, without waiting.
    pub fn try_recv(&mut self) -> Option<FetchOutcome> {
        self.outcome_rx.try_recv().ok()
    }

    /// Wait for the next finished outcome.
    pub async fn recv(&mut self) -> Option<FetchOutcome> {
        self.outcome_rx.recv().await
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

impl Drop for FetchWorker {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
