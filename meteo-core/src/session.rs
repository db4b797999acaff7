//! Latest-request-wins loading of forecasts.
//!
//! Each [`ForecastSession::load`] gets a fresh request id. Its result is only
//! committed if no newer load started in the meantime, so a slow response for
//! an old coordinate can never overwrite the one the caller asked for last.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, instrument};

use crate::{
    error::FetchError,
    fetch::{Fetcher, fetch_snapshot},
    model::{Coordinate, WeatherSnapshot},
};

/// What observers of a session see.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Id of the latest load; 0 before the first one.
    pub request: u64,
    pub coordinate: Option<Coordinate>,
    pub loading: bool,
    pub snapshot: Option<Arc<WeatherSnapshot>>,
    pub error: Option<Arc<FetchError>>,
}

#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Applied(Arc<WeatherSnapshot>),
    Failed(Arc<FetchError>),
    /// A newer load started before this one finished; its result was dropped.
    Superseded,
}

#[derive(Debug)]
pub struct ForecastSession<F> {
    fetcher: F,
    state: watch::Sender<SessionState>,
}

impl<F: Fetcher> ForecastSession<F> {
    pub fn new(fetcher: F) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { fetcher, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Fetch and normalize the forecast for `coordinate`, making it the latest request.
    ///
    /// Dropping the returned future before it completes abandons the request;
    /// if it was still the latest one, `loading` is cleared.
    #[instrument(skip(self), level = "info")]
    pub async fn load(&self, coordinate: Coordinate) -> LoadOutcome {
        let mut id = 0;
        self.state.send_modify(|s| {
            s.request += 1;
            id = s.request;
            s.coordinate = Some(coordinate);
            s.loading = true;
        });
        let mut pending = PendingLoad { state: &self.state, id, done: false };

        let result = fetch_snapshot(&self.fetcher, coordinate).await;
        pending.done = true;

        let outcome = match result {
            Ok(snapshot) => LoadOutcome::Applied(Arc::new(snapshot)),
            Err(err) => LoadOutcome::Failed(Arc::new(err)),
        };

        let committed = self.state.send_if_modified(|s| {
            if s.request != id {
                return false;
            }
            s.loading = false;
            match &outcome {
                LoadOutcome::Applied(snapshot) => {
                    s.snapshot = Some(Arc::clone(snapshot));
                    s.error = None;
                }
                LoadOutcome::Failed(err) => {
                    s.snapshot = None;
                    s.error = Some(Arc::clone(err));
                }
                LoadOutcome::Superseded => {}
            }
            true
        });

        if committed {
            info!(request = id, "forecast committed");
            outcome
        } else {
            debug!(request = id, "forecast superseded by a newer request, discarding");
            LoadOutcome::Superseded
        }
    }
}

/// Clears `loading` when a load is dropped mid-flight while still the latest request.
struct PendingLoad<'a> {
    state: &'a watch::Sender<SessionState>,
    id: u64,
    done: bool,
}

impl Drop for PendingLoad<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        let id = self.id;
        let cleared = self.state.send_if_modified(|s| {
            if s.request != id || !s.loading {
                return false;
            }
            s.loading = false;
            true
        });
        if cleared {
            debug!(request = id, "latest forecast request abandoned");
        }
    }
}
