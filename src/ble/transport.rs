//! `ShutterTransport` over the SoftDevice central role.
//!
//! Holds at most one connection.  Every operation is bounded in time:
//! scans and connects through the SoftDevice scan timeout, bonding and
//! GATT writes through `embassy_time::with_timeout`.

use embassy_time::{with_timeout, Duration, Instant, Timer};
use nrf_softdevice::ble::gatt_client::{self, WriteError};
use nrf_softdevice::ble::{central, Address, Connection, SecurityMode};
use nrf_softdevice::{raw, Softdevice};

use crate::ble::bonder::Bonder;
use crate::ble::link_watch::WatchSlot;
use crate::ble::{to_peer_address, to_sd_address};
use crate::config;
use crate::error::TransportError;
use crate::link::adv_parser::{contains_shutter_service_uuid, extract_device_name};
use crate::link::protocol::{pairing_payload, PAIRING_PAYLOAD_MAX};
use crate::link::{ShutterTransport, Sighting};
use crate::storage::{PeerAddress, PeerIdentity};

/// GATT client for the camera's remote-control service.
#[nrf_softdevice::gatt_client(uuid = "00050000-0000-1000-0000-d8492fffa821")]
pub struct CameraRemoteClient {
    /// Takes the opcode-prefixed remote name once per bond.
    #[characteristic(uuid = "00050002-0000-1000-0000-d8492fffa821", write)]
    pub pairing: heapless::Vec<u8, PAIRING_PAYLOAD_MAX>,

    /// Button state byte; press then release fires one shot.
    #[characteristic(uuid = "00050003-0000-1000-0000-d8492fffa821", write)]
    pub shutter: u8,
}

pub struct SoftdeviceTransport {
    sd: &'static Softdevice,
    bonder: &'static Bonder,
    watch: &'static WatchSlot,
    conn: Option<Connection>,
    client: Option<CameraRemoteClient>,
}

impl SoftdeviceTransport {
    pub fn new(sd: &'static Softdevice, bonder: &'static Bonder, watch: &'static WatchSlot) -> Self {
        Self {
            sd,
            bonder,
            watch,
            conn: None,
            client: None,
        }
    }

    async fn open(&self, address: &Address, timeout_secs: u64) -> Result<Connection, TransportError> {
        let whitelist = [address];
        let conn_cfg = central::ConnectConfig {
            scan_config: central::ScanConfig {
                whitelist: Some(&whitelist),
                timeout: scan_timeout(timeout_secs * 1_000),
                ..Default::default()
            },
            conn_params: raw::ble_gap_conn_params_t {
                min_conn_interval: config::BLE_CONN_INTERVAL_MIN,
                max_conn_interval: config::BLE_CONN_INTERVAL_MAX,
                slave_latency: config::BLE_SLAVE_LATENCY,
                conn_sup_timeout: config::BLE_SUP_TIMEOUT,
            },
            ..Default::default()
        };

        central::connect_with_security(self.sd, &conn_cfg, self.bonder)
            .await
            .map_err(|_| TransportError::ConnectFailed)
    }

    fn adopt(&mut self, conn: Connection, client: CameraRemoteClient) {
        self.watch.signal(conn.clone());
        self.conn = Some(conn);
        self.client = Some(client);
    }

    async fn pair_link(&mut self, address: &PeerAddress) -> Result<PeerIdentity, TransportError> {
        let conn = self
            .open(&to_sd_address(address), config::BLE_CONNECT_TIMEOUT_SECS)
            .await?;

        if conn.request_pairing().is_err() || !wait_for_secure_link(&conn).await {
            warn!("Camera refused to bond");
            let _ = conn.disconnect();
            return Err(TransportError::Rejected);
        }

        let client: CameraRemoteClient = match gatt_client::discover(&conn).await {
            Ok(client) => client,
            Err(_) => {
                warn!("Remote service not found on camera");
                let _ = conn.disconnect();
                return Err(TransportError::DiscoveryFailed);
            }
        };

        let mut buf = [0u8; PAIRING_PAYLOAD_MAX];
        let len = pairing_payload(config::REMOTE_NAME, &mut buf);
        let payload = heapless::Vec::from_slice(&buf[..len]).map_err(|_| TransportError::Rejected)?;
        if let Err(e) = client.pairing_write(&payload).await {
            let _ = conn.disconnect();
            return Err(map_write_error(e));
        }

        let identity = match self.bonder.bond() {
            Some((identity_address, keys)) => PeerIdentity::new(identity_address, Some(keys)),
            None => PeerIdentity::new(*address, None),
        };
        self.adopt(conn, client);
        Ok(identity)
    }
}

impl ShutterTransport for SoftdeviceTransport {
    async fn scan(&mut self, timeout_ms: u64) -> Result<Sighting, TransportError> {
        info!("Scanning for camera ({} ms window)", timeout_ms);
        let started = Instant::now();

        let scan_cfg = central::ScanConfig {
            active: true,
            timeout: scan_timeout(timeout_ms),
            ..Default::default()
        };

        let found = central::scan(self.sd, &scan_cfg, |params| {
            let data =
                unsafe { core::slice::from_raw_parts(params.data.p_data, params.data.len as usize) };
            if !contains_shutter_service_uuid(data) {
                return None;
            }
            debug!(
                "Camera advertising: {} (RSSI {})",
                extract_device_name(data).as_str(),
                params.rssi
            );
            Some(Address::from_raw(params.peer_addr))
        })
        .await;

        match found {
            Ok(address) => Ok(Sighting {
                address: to_peer_address(&address),
                elapsed_ms: started.elapsed().as_millis(),
            }),
            Err(_) => Err(TransportError::Timeout),
        }
    }

    async fn bond(
        &mut self,
        address: &PeerAddress,
        timeout_ms: u64,
    ) -> Result<PeerIdentity, TransportError> {
        self.disconnect().await;
        self.bonder.forget();

        match with_timeout(Duration::from_millis(timeout_ms), self.pair_link(address)).await {
            Ok(result) => result,
            Err(_) => {
                self.disconnect().await;
                Err(TransportError::Timeout)
            }
        }
    }

    async fn connect(&mut self, peer: &PeerIdentity) -> Result<(), TransportError> {
        self.disconnect().await;
        self.bonder.restore(peer);

        let conn = self
            .open(&to_sd_address(&peer.address), config::BLE_CONNECT_TIMEOUT_SECS)
            .await?;

        if conn.encrypt().is_err() || !wait_for_secure_link(&conn).await {
            warn!("Could not re-encrypt link to camera");
            let _ = conn.disconnect();
            return Err(TransportError::Rejected);
        }

        let client: CameraRemoteClient = gatt_client::discover(&conn).await.map_err(|_| {
            let _ = conn.disconnect();
            TransportError::DiscoveryFailed
        })?;

        self.adopt(conn, client);
        Ok(())
    }

    async fn write_shutter(&mut self, value: u8) -> Result<(), TransportError> {
        let Some(client) = &self.client else {
            return Err(TransportError::LinkDropped);
        };

        let timeout = Duration::from_millis(config::BLE_WRITE_TIMEOUT_MS);
        match with_timeout(timeout, client.shutter_write(&value)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(map_write_error(e)),
            Err(_) => Err(TransportError::Timeout),
        }
    }

    async fn disconnect(&mut self) {
        self.client = None;
        if let Some(conn) = self.conn.take() {
            let _ = conn.disconnect();
        }
    }
}

fn map_write_error(e: WriteError) -> TransportError {
    match e {
        WriteError::Disconnected => TransportError::LinkDropped,
        _ => TransportError::WriteFailed,
    }
}

/// SoftDevice scan timeouts are in 10 ms units; zero means forever.
fn scan_timeout(timeout_ms: u64) -> u16 {
    (timeout_ms / 10).clamp(1, u64::from(u16::MAX)) as u16
}

async fn wait_for_secure_link(conn: &Connection) -> bool {
    for _ in 0..25 {
        match conn.security_mode() {
            SecurityMode::NoAccess | SecurityMode::Open => {
                Timer::after(Duration::from_millis(200)).await
            }
            _ => return true,
        }
    }
    false
}
