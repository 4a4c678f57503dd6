//! Gates viewport changes into at most one query per idle window.

use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, trace};

use canopy_common::{BoundingBox, CanopyConfig, DebounceTimer, ViewportState};
use projection::viewport_bounds;

/// What the debouncer asks the fetch side to do.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryEvent {
    /// Query features inside `bounds`, computed from `viewport` at timer expiry.
    Issue {
        bounds: BoundingBox,
        viewport: ViewportState,
    },
    /// Zoomed out past the threshold: show nothing and do not query.
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    Pending,
}

/// Debounces viewport changes and resizes.
///
/// Each change at or above the zoom threshold restarts the timer. When it
/// finally expires the bounds are taken from the latest viewport, not the
/// one that started the timer. A change below the threshold cancels the
/// timer and emits [`QueryEvent::Empty`] immediately.
///
/// Must be used from within a tokio runtime.
pub struct QueryDebouncer {
    zoom_threshold: f64,
    delay: Duration,
    latest: watch::Sender<ViewportState>,
    timer: DebounceTimer,
    events: mpsc::UnboundedSender<QueryEvent>,
}

impl QueryDebouncer {
    pub fn new(
        initial: ViewportState,
        zoom_threshold: f64,
        delay: Duration,
        events: mpsc::UnboundedSender<QueryEvent>,
    ) -> Self {
        let (latest, _) = watch::channel(initial);
        Self {
            zoom_threshold,
            delay,
            latest,
            timer: DebounceTimer::new(),
            events,
        }
    }

    pub fn from_config(
        initial: ViewportState,
        config: &CanopyConfig,
        events: mpsc::UnboundedSender<QueryEvent>,
    ) -> Self {
        Self::new(initial, config.zoom_threshold, config.viewport_debounce(), events)
    }

    /// Most recent viewport seen.
    pub fn latest(&self) -> ViewportState {
        *self.latest.borrow()
    }

    pub fn state(&self) -> DebounceState {
        if self.timer.is_pending() {
            DebounceState::Pending
        } else {
            DebounceState::Idle
        }
    }

    /// Record a viewport change.
    pub fn update(&mut self, viewport: ViewportState) {
        self.latest.send_replace(viewport);

        if viewport.zoom < self.zoom_threshold {
            if self.timer.cancel() {
                debug!(zoom = viewport.zoom, "Cancelled pending query below zoom threshold");
            }
            let _ = self.events.send(QueryEvent::Empty);
            return;
        }

        trace!(zoom = viewport.zoom, lon = viewport.longitude, lat = viewport.latitude, "Viewport changed, restarting debounce");

        let latest = self.latest.subscribe();
        let events = self.events.clone();
        self.timer.schedule(self.delay, async move {
            let viewport = *latest.borrow();
            let bounds = viewport_bounds(&viewport);
            let _ = events.send(QueryEvent::Issue { bounds, viewport });
        });
    }

    /// Record a window resize. Takes part in the same debounce as viewport changes.
    pub fn resize(&mut self, pixel_width: f64, pixel_height: f64) {
        let viewport = self.latest().with_size(pixel_width, pixel_height);
        self.update(viewport);
    }

    /// Drop any pending query without emitting anything.
    pub fn cancel(&mut self) -> bool {
        self.timer.cancel()
    }
}
