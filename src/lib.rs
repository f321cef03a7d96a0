//! Station/AP WiFi control plane
//!
//! This crate provides the connection-management core that sits between a
//! radio/link layer below and an application above: a mutex-serialized
//! station state machine, a bounded scan-result cache with BSSID dedup,
//! connect-candidate selection (fast or all-channel), and synchronous event
//! notification to a single registered handler. Radio control itself lives
//! in an external collaborator that reports in through the controller's
//! scan and link operations.

mod config;
mod connection;
mod error;
mod notify;
mod scan;
mod select;
mod security;
mod supplicant;
mod types;

// Re-export public API
pub use config::{
    ApConfig, FastScanThreshold, MAX_AP_CHANNEL, MAX_AP_STATIONS, MAX_BEACON_INTERVAL_MS,
    MAX_PASSPHRASE_LEN, MAX_SCAN_RECORDS, MAX_SSID_LEN, MIN_AP_CHANNEL, MIN_BEACON_INTERVAL_MS,
    MIN_PASSPHRASE_LEN, RAW_PMK_LEN, StaConfig, WifiConfig, WifiMode,
};
pub use connection::{ConnectionState, WifiController};
pub use error::{WifiError, WifiResult};
pub use notify::{EventHandler, EventNotifier, HandlerError};
pub use scan::{ScanId, ScanResultSet, ScanResultStore};
pub use security::{SecIpSeverity, SecIpStatus};
pub use select::{ConnectTarget, select_candidate, select_for_config};
pub use supplicant::SupplicantHooks;
pub use types::{
    ApRecord, AuthMode, Bssid, CipherType, ReasonCode, ScanMethod, SortMethod, Ssid, WifiEvent,
};
