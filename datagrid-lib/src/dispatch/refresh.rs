//! Refresh signalling to the data source collaborator.

use tokio::sync::watch;

/// Asks the data source to refetch the raw dataset.
///
/// Sent after every successful action and never after a failed or declined
/// one. The engine does not edit rows itself.
pub trait RefreshSignal: Send + Sync {
    fn request_refresh(&self);
}

impl<F> RefreshSignal for F
where
    F: Fn() + Send + Sync,
{
    fn request_refresh(&self) {
        self()
    }
}

/// Refresh signal backed by a `tokio::sync::watch` generation counter.
///
/// Each request bumps the generation; every [`RefreshWatcher`] sees that a
/// refresh is pending until it acknowledges it. Requests made while one is
/// pending coalesce.
#[derive(Debug, Clone)]
pub struct RefreshChannel {
    tx: watch::Sender<u64>,
}

impl RefreshChannel {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self { tx }
    }

    /// Creates a watcher that has seen every request made so far.
    pub fn watcher(&self) -> RefreshWatcher {
        RefreshWatcher {
            rx: self.tx.subscribe(),
        }
    }

    /// Number of refreshes requested since creation.
    pub fn generation(&self) -> u64 {
        *self.tx.borrow()
    }
}

impl Default for RefreshChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshSignal for RefreshChannel {
    fn request_refresh(&self) {
        self.tx.send_modify(|generation| *generation += 1);
        log::debug!("refresh requested (generation {})", self.generation());
    }
}

/// Receiving side of a [`RefreshChannel`].
#[derive(Debug, Clone)]
pub struct RefreshWatcher {
    rx: watch::Receiver<u64>,
}

impl RefreshWatcher {
    /// Returns `true` if a refresh was requested since the last call,
    /// and acknowledges it.
    pub fn take_request(&mut self) -> bool {
        match self.rx.has_changed() {
            Ok(true) => {
                self.rx.borrow_and_update();
                true
            }
            _ => false,
        }
    }

    /// Returns `true` if a refresh is pending, without acknowledging it.
    pub fn is_pending(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Waits for the next request and acknowledges it.
    ///
    /// Returns `false` once the channel is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}
