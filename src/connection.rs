//! The station connection state machine. All state lives behind one mutex
//! because scan completions, link events and user commands arrive from
//! independent contexts; events go out only after the lock is released.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::config::WifiConfig;
use crate::error::{WifiError, WifiResult};
use crate::notify::{EventHandler, EventNotifier};
use crate::scan::{ScanId, ScanResultSet, ScanResultStore};
use crate::select::select_for_config;
use crate::supplicant::SupplicantHooks;
use crate::types::{ApRecord, Bssid, ReasonCode, Ssid, WifiEvent};

/// Lifecycle state of the station, owned exclusively by [`WifiController`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Uninitialized,
    Started,
    Scanning,
    Connecting,
    Connected,
    Disconnected { reason: ReasonCode },
    ConnectFailed { reason: ReasonCode },
}

impl ConnectionState {
    pub fn name(&self) -> &'static str {
        match self {
            ConnectionState::Uninitialized => "uninitialized",
            ConnectionState::Started => "started",
            ConnectionState::Scanning => "scanning",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected { .. } => "disconnected",
            ConnectionState::ConnectFailed { .. } => "connect-failed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug)]
struct Inner {
    state: ConnectionState,
    config: Option<WifiConfig>,
    store: ScanResultStore,
    /// AP currently being connected to or associated with
    peer: Option<(Ssid, Bssid)>,
    last_reason: Option<ReasonCode>,
}

/// Drives the STA lifecycle: init, scan, candidate selection, connect,
/// link events, stop. The radio layer reports in through the `scan_*` and
/// `link_*` operations; every emitting transition reaches the registered
/// event handler.
#[derive(Debug)]
pub struct WifiController {
    inner: Mutex<Inner>,
    notifier: EventNotifier,
    hooks: SupplicantHooks,
}

impl Default for WifiController {
    fn default() -> Self {
        Self::new()
    }
}

impl WifiController {
    pub fn new() -> Self {
        Self::with_hooks(SupplicantHooks::new())
    }

    /// Build a controller wired to the legacy supplicant patch layer
    pub fn with_hooks(hooks: SupplicantHooks) -> Self {
        WifiController {
            inner: Mutex::new(Inner {
                state: ConnectionState::Uninitialized,
                config: None,
                store: ScanResultStore::new(),
                peer: None,
                last_reason: None,
            }),
            notifier: EventNotifier::new(),
            hooks,
        }
    }

    /// Install the outward event handler; a later call replaces the earlier one
    pub fn register_handler(&self, handler: Arc<dyn EventHandler>) {
        self.notifier.register(handler);
    }

    /// Validate a configuration and bring the station up
    pub fn init(&self, config: WifiConfig) -> WifiResult<()> {
        config.validate()?;
        {
            let mut inner = self.lock();
            if inner.state != ConnectionState::Uninitialized {
                return Err(WifiError::invalid_state("init", inner.state.name()));
            }
            debug!(mode = ?config.mode(), ssid = %config.ssid(), "station starting");
            inner.config = Some(config);
            inner.state = ConnectionState::Started;
        }
        self.emit(WifiEvent::StaStart);
        Ok(())
    }

    /// Open a scan session. The returned id must accompany the completion.
    pub fn start_scan(&self) -> WifiResult<ScanId> {
        let mut inner = self.lock();
        match inner.state {
            ConnectionState::Scanning => Err(WifiError::AlreadyScanning),
            ConnectionState::Started => {
                let id = inner.store.begin_scan()?;
                inner.state = ConnectionState::Scanning;
                debug!(?id, "scan started");
                Ok(id)
            }
            state => Err(WifiError::invalid_state("start_scan", state.name())),
        }
    }

    /// Feed one discovered AP into the open scan session
    pub fn ingest_scan_record(&self, record: ApRecord) -> WifiResult<()> {
        if !(1..=14).contains(&record.channel) && record.channel < 36 {
            return Err(WifiError::invalid_parameter(format!(
                "channel {} is not a valid 2.4/5 GHz channel",
                record.channel
            )));
        }
        let mut inner = self.lock();
        if inner.state != ConnectionState::Scanning {
            return Err(WifiError::invalid_state(
                "ingest_scan_record",
                inner.state.name(),
            ));
        }
        inner.store.ingest(record)
    }

    /// Radio signalled the end of a scan. A completion whose id does not
    /// match the open session is dropped, not applied. On a matching
    /// completion the snapshot is finalized and the selection policy runs,
    /// returning the chosen connect candidate, if any.
    pub fn scan_complete(&self, id: ScanId) -> WifiResult<Option<ApRecord>> {
        let (count, candidate) = {
            let mut inner = self.lock();
            if inner.state == ConnectionState::Uninitialized {
                return Err(WifiError::invalid_state("scan_complete", "uninitialized"));
            }
            if inner.state != ConnectionState::Scanning
                || inner.store.scan_in_progress() != Some(id)
            {
                warn!(?id, state = %inner.state, "stale scan completion dropped");
                return Ok(None);
            }
            let snapshot = inner.store.complete_scan()?;
            inner.state = ConnectionState::Started;
            let candidate = inner
                .config
                .as_ref()
                .and_then(WifiConfig::as_sta)
                .and_then(|sta| select_for_config(&snapshot, sta))
                .cloned();
            (snapshot.len(), candidate)
        };
        self.hooks.show_scan_results();
        self.emit(WifiEvent::ScanComplete { count });
        Ok(candidate)
    }

    /// Begin connecting to a selected candidate
    pub fn connect(&self, candidate: &ApRecord) -> WifiResult<()> {
        let mut inner = self.lock();
        if inner.state != ConnectionState::Started {
            return Err(WifiError::invalid_state("connect", inner.state.name()));
        }
        if inner.config.as_ref().and_then(WifiConfig::as_sta).is_none() {
            return Err(WifiError::invalid_state("connect", "soft-ap mode"));
        }
        debug!(ssid = %candidate.ssid, bssid = %candidate.bssid, rssi = candidate.rssi, "connecting");
        inner.peer = Some((candidate.ssid, candidate.bssid));
        inner.state = ConnectionState::Connecting;
        Ok(())
    }

    /// Connect through the legacy supplicant's saved parameters for the AP at
    /// `index` in the latest snapshot. Returns the hook's success indicator.
    pub fn fast_connect(&self, index: u8) -> WifiResult<bool> {
        let mut inner = self.lock();
        if inner.state != ConnectionState::Started {
            return Err(WifiError::invalid_state("fast_connect", inner.state.name()));
        }
        let Some(config) = inner.config.as_ref() else {
            return Err(WifiError::invalid_state("fast_connect", "no configuration"));
        };
        let mode = config.mode();
        let Some(snapshot) = inner.store.latest() else {
            return Err(WifiError::invalid_state("fast_connect", "no scan snapshot"));
        };
        let Some(record) = snapshot.get(index as usize) else {
            return Err(WifiError::invalid_parameter(format!(
                "scan index {index} out of range ({} records)",
                snapshot.len()
            )));
        };
        // Hooks must not call back into the controller
        match self.hooks.fast_connect(mode.code(), index) {
            None => {
                warn!("fast_connect requested but no supplicant hook installed");
                Ok(false)
            }
            Some(false) => Ok(false),
            Some(true) => {
                inner.peer = Some((record.ssid, record.bssid));
                inner.state = ConnectionState::Connecting;
                Ok(true)
            }
        }
    }

    /// Link layer came up: the association completed
    pub fn link_up(&self) -> WifiResult<()> {
        let (ssid, bssid) = {
            let mut inner = self.lock();
            if inner.state != ConnectionState::Connecting {
                return Err(WifiError::invalid_state("link_up", inner.state.name()));
            }
            let Some(peer) = inner.peer else {
                return Err(WifiError::invalid_state("link_up", "no peer"));
            };
            inner.state = ConnectionState::Connected;
            inner.last_reason = None;
            peer
        };
        self.emit(WifiEvent::StaConnected { ssid, bssid });
        Ok(())
    }

    /// Link layer reported a failed connection attempt. The failure is
    /// published while the state is observable, then the station returns to
    /// `Started` so the caller can apply its own retry policy.
    pub fn link_fail(&self, reason: ReasonCode) -> WifiResult<()> {
        {
            let mut inner = self.lock();
            if inner.state != ConnectionState::Connecting {
                return Err(WifiError::invalid_state("link_fail", inner.state.name()));
            }
            inner.state = ConnectionState::ConnectFailed { reason };
            inner.last_reason = Some(reason);
            inner.peer = None;
        }
        self.emit(WifiEvent::StaConnectionFailed { reason });
        let mut inner = self.lock();
        // stop() may have torn the station down while the handler ran
        if inner.state == (ConnectionState::ConnectFailed { reason }) {
            inner.state = ConnectionState::Started;
            debug!(%reason, "connect failed, station ready for retry");
        }
        Ok(())
    }

    /// DHCP (or static setup) finished; informational, the state stays connected
    pub fn got_ip(&self) -> WifiResult<()> {
        {
            let inner = self.lock();
            if inner.state != ConnectionState::Connected {
                return Err(WifiError::invalid_state("got_ip", inner.state.name()));
            }
        }
        self.emit(WifiEvent::StaGotIp);
        Ok(())
    }

    /// Link layer dropped an established connection
    pub fn link_down(&self, reason: ReasonCode) -> WifiResult<()> {
        {
            let mut inner = self.lock();
            if inner.state != ConnectionState::Connected {
                return Err(WifiError::invalid_state("link_down", inner.state.name()));
            }
            inner.state = ConnectionState::Disconnected { reason };
            inner.last_reason = Some(reason);
            inner.peer = None;
        }
        self.emit(WifiEvent::StaDisconnected { reason });
        let mut inner = self.lock();
        if inner.state == (ConnectionState::Disconnected { reason }) {
            inner.state = ConnectionState::Started;
            debug!(%reason, "disconnected, station ready for retry");
        }
        Ok(())
    }

    /// Tear the station down from any state, discarding pending scans and
    /// connection attempts
    pub fn stop(&self) -> WifiResult<()> {
        {
            let mut inner = self.lock();
            if inner.state == ConnectionState::Uninitialized {
                return Ok(());
            }
            debug!(state = %inner.state, "station stopping");
            inner.store.reset();
            inner.config = None;
            inner.peer = None;
            inner.last_reason = None;
            inner.state = ConnectionState::Uninitialized;
        }
        self.hooks.clear_scan_results();
        self.emit(WifiEvent::StaStop);
        Ok(())
    }

    pub fn current_state(&self) -> ConnectionState {
        self.lock().state
    }

    /// Read-only view of the active configuration
    pub fn config(&self) -> Option<WifiConfig> {
        self.lock().config.clone()
    }

    /// Most recent finalized scan snapshot
    pub fn latest_scan(&self) -> Option<Arc<ScanResultSet>> {
        self.lock().store.latest()
    }

    /// AP the station is connected to (or connecting towards)
    pub fn peer(&self) -> Option<(Ssid, Bssid)> {
        self.lock().peer
    }

    /// Reason attached to the most recent failure or disconnect
    pub fn last_reason(&self) -> Option<ReasonCode> {
        self.lock().last_reason
    }

    fn emit(&self, event: WifiEvent) {
        debug!(code = event.code(), ?event, "emitting event");
        self.notifier.notify(&event);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
