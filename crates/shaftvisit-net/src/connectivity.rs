//! Network reachability reporting.
//!
//! The platform shell owns the actual reachability signal (radio state,
//! captive portals, airplane mode) and feeds it into a
//! [`SharedConnectivity`]; the client components only consume the
//! [`Connectivity`] trait, either as a one-shot probe at the moment of
//! submission or as an ongoing subscription.

use async_trait::async_trait;
use tokio::sync::watch;

/// Snapshot of network reachability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkState {
    pub is_connected: bool,
}

impl NetworkState {
    pub fn connected() -> Self {
        Self { is_connected: true }
    }

    pub fn disconnected() -> Self {
        Self {
            is_connected: false,
        }
    }
}

/// Reachability as consumed by the client components.
#[async_trait]
pub trait Connectivity: Send + Sync {
    /// Current reachability, checked at the moment of the call.
    async fn fetch_now(&self) -> NetworkState;

    /// Ongoing subscription.  Dropping the receiver unsubscribes.
    fn subscribe(&self) -> watch::Receiver<NetworkState>;
}

/// Watch-channel-backed [`Connectivity`] the platform layer feeds via
/// [`SharedConnectivity::set_connected`].
pub struct SharedConnectivity {
    tx: watch::Sender<NetworkState>,
}

impl SharedConnectivity {
    pub fn new(is_connected: bool) -> Self {
        let (tx, _rx) = watch::channel(NetworkState { is_connected });
        Self { tx }
    }

    /// Push a reachability change; subscribers are notified.
    pub fn set_connected(&self, is_connected: bool) {
        let state = NetworkState { is_connected };
        if self.tx.send_replace(state) != state {
            tracing::info!(is_connected, "network reachability changed");
        }
    }
}

impl Default for SharedConnectivity {
    fn default() -> Self {
        // Assume reachable until the platform reports otherwise, matching
        // how the form screens start out.
        Self::new(true)
    }
}

#[async_trait]
impl Connectivity for SharedConnectivity {
    async fn fetch_now(&self) -> NetworkState {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<NetworkState> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_now_tracks_pushed_state() {
        let conn = SharedConnectivity::new(true);
        assert!(conn.fetch_now().await.is_connected);

        conn.set_connected(false);
        assert!(!conn.fetch_now().await.is_connected);
    }

    #[tokio::test]
    async fn subscription_sees_changes() {
        let conn = SharedConnectivity::new(true);
        let mut rx = conn.subscribe();

        conn.set_connected(false);
        rx.changed().await.unwrap();
        assert!(!rx.borrow().is_connected);
    }
}
