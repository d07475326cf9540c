use heapless::String;

use crate::config::{
    RECONNECT_BACKOFF_BASE_MS, RECONNECT_BACKOFF_MAX_MS, RECONNECT_MAX_ATTEMPTS,
};
use crate::error::Error;
use crate::link::protocol::{SHUTTER_PRESS, SHUTTER_RELEASE};
use crate::link::{ConnectionState, LinkEvent, LinkInbox, Shutter, ShutterTransport};
use crate::storage::{PeerIdentity, PeerStore};

/// Connection manager for the one bonded camera.
///
/// All state changes happen inside its own methods, called from the
/// main loop.  Link loss observed by the transport arrives through the
/// `LinkInbox` and is applied on the next `poll`.
pub struct ShutterLink<'a, T, S> {
    transport: T,
    store: S,
    inbox: &'a LinkInbox,
    state: ConnectionState,
    peer: Option<PeerIdentity>,
    /// Failed reconnect attempts since the link was last up.
    attempts: u8,
    /// Earliest clock reading at which the next reconnect may run.
    next_attempt_at: u64,
}

impl<'a, T, S> ShutterLink<'a, T, S>
where
    T: ShutterTransport,
    S: PeerStore,
{
    pub fn new(transport: T, store: S, inbox: &'a LinkInbox) -> Self {
        Self {
            transport,
            store,
            inbox,
            state: ConnectionState::Idle,
            peer: None,
            attempts: 0,
            next_attempt_at: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Load the bonded peer and, if there is one, start reconnecting.
    ///
    /// The first reconnect attempt runs before this returns.
    pub async fn initialize(&mut self, now_ms: u64) {
        self.peer = match self.store.load().await {
            Ok(peer) => peer,
            Err(_) => {
                error!("Peer record unreadable - starting unpaired");
                None
            }
        };

        match &self.peer {
            Some(peer) => {
                info!("Bonded camera on record: {}", peer.address.to_display_string().as_str());
                self.begin_reconnect(now_ms);
                self.poll(now_ms).await;
            }
            None => {
                info!("No bonded camera on record");
                self.set_state(ConnectionState::Idle);
            }
        }
    }

    /// Pair with a camera that is in remote-pairing mode.
    ///
    /// Scanning and bonding share one budget of `timeout_secs`.  Safe to
    /// call again after any failure: the stored identity is only replaced
    /// after a complete bonding exchange.
    pub async fn pair(&mut self, timeout_secs: u32) -> Result<(), Error> {
        if self.state == ConnectionState::Connected {
            debug!("pair: already connected");
            return Ok(());
        }

        let budget_ms = u64::from(timeout_secs) * 1_000;

        self.set_state(ConnectionState::Scanning);
        let sighting = match self.transport.scan(budget_ms).await {
            Ok(sighting) => sighting,
            Err(e) => return Err(self.pairing_failed(e.into_pairing_error()).await),
        };
        let address = sighting.address;
        info!("Camera found: {}", address.to_display_string().as_str());

        let remaining_ms = budget_ms.saturating_sub(sighting.elapsed_ms);
        if remaining_ms == 0 {
            return Err(self.pairing_failed(Error::PairingTimeout).await);
        }

        self.set_state(ConnectionState::Pairing);
        let identity = match self.transport.bond(&address, remaining_ms).await {
            Ok(identity) => identity,
            Err(e) => return Err(self.pairing_failed(e.into_pairing_error()).await),
        };

        if self.store.save(&identity).await.is_err() {
            error!("Could not persist bonded camera");
            return Err(self.pairing_failed(Error::Storage).await);
        }

        self.peer = Some(identity);
        self.attempts = 0;
        // A loss reported before this link came up is stale.
        self.inbox.reset();
        self.set_state(ConnectionState::Connected);
        info!("Paired with {}", identity.address.to_display_string().as_str());
        Ok(())
    }

    /// Unwind a failed pairing.  A camera already on record goes back to
    /// being reconnected; otherwise the link is idle.
    async fn pairing_failed(&mut self, err: Error) -> Error {
        warn!("Pairing failed: {}", err);
        self.transport.disconnect().await;
        if self.peer.is_some() {
            self.attempts = 0;
            self.next_attempt_at = 0;
            self.set_state(ConnectionState::Reconnecting);
        } else {
            self.set_state(ConnectionState::Idle);
        }
        err
    }

    /// Fire the shutter once.
    ///
    /// Never reconnects on its own; a link drop during the write moves
    /// the link to `Reconnecting` and is reported as `Disconnected`.  Any
    /// other write failure is followed by one more release write so the
    /// camera is not left with the button held.
    pub async fn trigger(&mut self) -> Result<(), Error> {
        if self.state != ConnectionState::Connected {
            return Err(Error::NotConnected);
        }

        let result = match self.transport.write_shutter(SHUTTER_PRESS).await {
            Ok(()) => self.transport.write_shutter(SHUTTER_RELEASE).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                debug!("Shutter fired");
                Ok(())
            }
            Err(e) => {
                let err = e.into_trigger_error();
                warn!("Shutter write failed: {}", err);
                if err == Error::Disconnected {
                    // Reconnect is scheduled for the next poll, never here.
                    self.attempts = 0;
                    self.next_attempt_at = 0;
                    self.set_state(ConnectionState::Reconnecting);
                } else {
                    let _ = self.transport.write_shutter(SHUTTER_RELEASE).await;
                }
                Err(err)
            }
        }
    }

    /// Human-readable address of the bonded camera, empty if unpaired.
    pub fn paired_address(&self) -> String<17> {
        self.peer
            .map(|peer| peer.address.to_display_string())
            .unwrap_or_default()
    }

    /// Per-tick housekeeping: apply transport events and run at most
    /// one due reconnect attempt.
    pub async fn poll(&mut self, now_ms: u64) {
        if let Some(LinkEvent::LinkLost) = self.inbox.try_take() {
            if self.state == ConnectionState::Connected {
                warn!("Link lost: {}", Error::LinkLost);
                self.begin_reconnect(now_ms);
            }
        }

        if self.state != ConnectionState::Reconnecting || now_ms < self.next_attempt_at {
            return;
        }
        let Some(peer) = self.peer else {
            self.set_state(ConnectionState::Idle);
            return;
        };

        match self.transport.connect(&peer).await {
            Ok(()) => {
                info!("Reconnected after {} failed attempts", self.attempts);
                self.attempts = 0;
                // A loss reported before this link came up is stale.
                self.inbox.reset();
                self.set_state(ConnectionState::Connected);
            }
            Err(e) => {
                self.attempts = self.attempts.saturating_add(1);
                if self.attempts >= RECONNECT_MAX_ATTEMPTS {
                    error!("Reconnect budget exhausted ({})", e);
                    self.set_state(ConnectionState::Failed);
                } else {
                    let wait = backoff_ms(self.attempts);
                    warn!("Reconnect attempt {} failed ({}), retry in {} ms", self.attempts, e, wait);
                    self.next_attempt_at = now_ms.saturating_add(wait);
                }
            }
        }
    }

    /// Leave `Failed` and start over with a fresh retry budget.
    pub async fn reset(&mut self, now_ms: u64) {
        self.transport.disconnect().await;
        self.inbox.reset();
        if self.peer.is_some() {
            self.begin_reconnect(now_ms);
        } else {
            self.set_state(ConnectionState::Idle);
        }
    }

    /// Drop the link and erase the bonded peer.
    pub async fn forget(&mut self) -> Result<(), Error> {
        self.transport.disconnect().await;
        self.inbox.reset();
        self.set_state(ConnectionState::Idle);
        self.store.clear().await.map_err(|_| Error::Storage)?;
        self.peer = None;
        info!("Bonded camera forgotten");
        Ok(())
    }

    fn begin_reconnect(&mut self, now_ms: u64) {
        self.attempts = 0;
        self.next_attempt_at = now_ms;
        self.set_state(ConnectionState::Reconnecting);
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            debug!("Link: {} -> {}", self.state, state);
            self.state = state;
        }
    }
}

impl<'a, T, S> Shutter for ShutterLink<'a, T, S>
where
    T: ShutterTransport,
    S: PeerStore,
{
    async fn trigger(&mut self) -> Result<(), Error> {
        ShutterLink::trigger(self).await
    }
}

/// Wait after the `failures`-th failed reconnect attempt.
pub(crate) fn backoff_ms(failures: u8) -> u64 {
    let shift = u32::from(failures.saturating_sub(1)).min(16);
    (RECONNECT_BACKOFF_BASE_MS << shift).min(RECONNECT_BACKOFF_MAX_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_then_caps() {
        assert_eq!(backoff_ms(1), 500);
        assert_eq!(backoff_ms(2), 1_000);
        assert_eq!(backoff_ms(3), 2_000);
        assert_eq!(backoff_ms(4), 4_000);
        assert_eq!(backoff_ms(5), 8_000);
        assert_eq!(backoff_ms(6), 8_000);
        assert_eq!(backoff_ms(u8::MAX), 8_000);
    }
}
