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

//! Error types surfaced by the client.
//!
//! Network failures are never fatal: callers log them and keep showing what
//! they had. Search failures are meant for the user and carry display text.

use thiserror::Error;

/// Shortest accepted search term, in characters.
pub const SEARCH_MIN_LEN: usize = 3;
/// Longest accepted search term, in characters.
pub const SEARCH_MAX_LEN: usize = 15;

/// A request that did not produce usable data.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl NetworkError {
    /// URL of the failed request.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Request { url, .. } | Self::Status { url, .. } | Self::Decode { url, .. } => url,
        }
    }
}

/// Why a search did not select anything.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("Search term must be between {min} and {max} characters")]
    Validation { len: usize, min: usize, max: usize },

    #[error("No aircraft found matching \"{0}\"")]
    NotFound(String),
}

impl SearchError {
    pub(crate) fn validation(len: usize) -> Self {
        Self::Validation {
            len,
            min: SEARCH_MIN_LEN,
            max: SEARCH_MAX_LEN,
        }
    }
}
