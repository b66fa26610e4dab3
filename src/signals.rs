//! Environment signals: theme transitions and viewport resizes.
//!
//! Signals ride on tokio watch channels. A source owns the sending half
//! and always stores the latest value; bursts coalesce in the channel so
//! subscribers only ever observe the newest state. Reactors wrap the
//! receiving half and wake only on the events the dashboard reacts to.

use tokio::sync::watch;
use tracing::debug;

use crate::chart::SurfaceSize;
use crate::theme::ThemeMode;

/// Owning side of an environment signal.
pub struct SignalSource<T> {
    tx: watch::Sender<T>,
}

impl<T: Clone> SignalSource<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Publishes a new value, waking subscribers even if it equals the
    /// previous one.
    pub fn publish(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// The most recently published value.
    pub fn current(&self) -> T {
        self.tx.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

/// Watches the theme signal and yields only genuine light/dark transitions.
///
/// Redundant notifications (the current mode published again) are
/// swallowed. Detaching is idempotent; a detached reactor never yields
/// again.
pub struct ThemeReactor {
    rx: Option<watch::Receiver<ThemeMode>>,
    last_seen: ThemeMode,
}

impl ThemeReactor {
    pub fn attach(source: &SignalSource<ThemeMode>) -> Self {
        let rx = source.subscribe();
        let last_seen = *rx.borrow();
        Self {
            rx: Some(rx),
            last_seen,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.rx.is_some()
    }

    /// Resolves with the next mode that differs from the last seen one.
    ///
    /// Returns `None` once the source is dropped or the reactor detached.
    pub async fn next_transition(&mut self) -> Option<ThemeMode> {
        loop {
            let rx = self.rx.as_mut()?;
            if rx.changed().await.is_err() {
                self.rx = None;
                return None;
            }
            let mode = *rx.borrow_and_update();
            if mode != self.last_seen {
                self.last_seen = mode;
                return Some(mode);
            }
            debug!(mode = mode.as_str(), "Ignoring redundant theme notification");
        }
    }

    /// Detaches from the signal. Safe to call more than once.
    pub fn detach(&mut self) {
        if self.rx.take().is_some() {
            debug!("Theme reactor detached");
        }
    }
}

/// Watches the viewport signal and yields every resize event.
///
/// Exactly one subscription is held at a time: attaching again replaces
/// the previous subscription instead of stacking a second one.
pub struct ViewportReactor {
    rx: Option<watch::Receiver<SurfaceSize>>,
}

impl ViewportReactor {
    pub fn attach(source: &SignalSource<SurfaceSize>) -> Self {
        Self {
            rx: Some(source.subscribe()),
        }
    }

    /// Replaces the current subscription with one on `source`.
    pub fn reattach(&mut self, source: &SignalSource<SurfaceSize>) {
        self.rx = Some(source.subscribe());
    }

    pub fn is_attached(&self) -> bool {
        self.rx.is_some()
    }

    /// Resolves with the size carried by the next resize event.
    ///
    /// Returns `None` once the source is dropped or the reactor detached.
    pub async fn next_resize(&mut self) -> Option<SurfaceSize> {
        let rx = self.rx.as_mut()?;
        if rx.changed().await.is_err() {
            self.rx = None;
            return None;
        }
        Some(*rx.borrow_and_update())
    }

    /// Detaches from the signal. Safe to call more than once.
    pub fn detach(&mut self) {
        if self.rx.take().is_some() {
            debug!("Viewport reactor detached");
        }
    }
}
