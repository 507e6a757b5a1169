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

//! Single-slot trailing debounce timer.

use std::time::Duration;

use log::debug;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Default quiet period before a trail-length change is applied.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1200);

/// Identifies one arming of the timer. Only the latest one is honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceToken(u64);

/// Owns at most one pending timer task.
///
/// Each [`restart`](Debouncer::restart) aborts the previous task and arms a new
/// one; when a task survives its full window it sends its token on the channel.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    runtime: Handle,
    fired: mpsc::UnboundedSender<DebounceToken>,
    task: Option<JoinHandle<()>>,
    latest: u64,
}

impl Debouncer {
    #[must_use]
    pub fn new(window: Duration, runtime: Handle, fired: mpsc::UnboundedSender<DebounceToken>) -> Self {
        Self {
            window,
            runtime,
            fired,
            task: None,
            latest: 0,
        }
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Cancel any pending timer and start a fresh one.
    pub fn restart(&mut self) -> DebounceToken {
        self.abort();
        self.latest += 1;
        let token = DebounceToken(self.latest);

        let window = self.window;
        let fired = self.fired.clone();
        self.task = Some(self.runtime.spawn(async move {
            sleep(window).await;
            // Receiver gone means the session is shutting down
            let _ = fired.send(token);
        }));
        token
    }

    /// Cancel the pending timer. Tokens already in flight become stale.
    pub fn cancel(&mut self) {
        if self.task.is_some() {
            debug!("Debounce timer cancelled");
        }
        self.abort();
        self.latest += 1;
    }

    /// Consume a fired token. Returns `true` only for the latest arming.
    pub fn accept(&mut self, token: DebounceToken) -> bool {
        if self.task.is_none() || token.0 != self.latest {
            return false;
        }
        self.task = None;
        true
    }

    /// Whether a timer is armed and has not been accepted yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.task.is_some()
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.abort();
    }
}
