//! Mode configuration: the STA/AP variants, field validation, and the
//! centralized capacity constants the rest of the control plane shares.

use secrecy::{ExposeSecret, SecretString};

use crate::error::{WifiError, WifiResult};
use crate::types::{ApRecord, AuthMode, Bssid, CipherType, ScanMethod, SortMethod, Ssid};

// Field bounds
pub const MAX_SSID_LEN: usize = 32;
pub const MIN_PASSPHRASE_LEN: usize = 8;
pub const MAX_PASSPHRASE_LEN: usize = 63;
/// A password of exactly this many bytes is treated as a raw PMK
pub const RAW_PMK_LEN: usize = 64;

// Scan store capacity
pub const MAX_SCAN_RECORDS: usize = 16;

// Soft-AP bounds
pub const MIN_AP_CHANNEL: u8 = 1;
pub const MAX_AP_CHANNEL: u8 = 14;
pub const MIN_BEACON_INTERVAL_MS: u16 = 100;
pub const MAX_BEACON_INTERVAL_MS: u16 = 60_000;
pub const MAX_AP_STATIONS: u8 = 4;

/// Operating role of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiMode {
    Sta,
    Ap,
}

impl WifiMode {
    /// Numeric mode identifier used by the legacy supplicant hooks
    pub fn code(self) -> u8 {
        match self {
            WifiMode::Sta => 1,
            WifiMode::Ap => 2,
        }
    }
}

/// Acceptance floor applied to candidates during a fast scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FastScanThreshold {
    /// The minimum RSSI to accept, in dBm
    pub min_rssi: i8,
    /// The weakest auth mode to accept
    pub min_auth_mode: AuthMode,
}

impl Default for FastScanThreshold {
    fn default() -> Self {
        FastScanThreshold {
            min_rssi: i8::MIN,
            min_auth_mode: AuthMode::Open,
        }
    }
}

impl FastScanThreshold {
    pub fn accepts(&self, record: &ApRecord) -> bool {
        record.rssi >= self.min_rssi && record.auth_mode >= self.min_auth_mode
    }
}

/// Station-mode configuration: the target network and selection policy
#[derive(Debug, Clone)]
pub struct StaConfig {
    pub ssid: Ssid,
    /// Lock onto one specific AP instead of any AP broadcasting the SSID
    pub bssid: Option<Bssid>,
    /// Empty for open networks, 8-63 bytes for a passphrase, 64 for a raw PMK
    pub password: SecretString,
    pub scan_method: ScanMethod,
    pub sort_method: SortMethod,
    pub threshold: FastScanThreshold,
}

impl StaConfig {
    pub fn new(ssid: Ssid, password: SecretString) -> Self {
        StaConfig {
            ssid,
            bssid: None,
            password,
            scan_method: ScanMethod::default(),
            sort_method: SortMethod::default(),
            threshold: FastScanThreshold::default(),
        }
    }

    /// True when the stored password is a pre-derived PMK rather than a passphrase
    pub fn password_is_pmk(&self) -> bool {
        self.password.expose_secret().len() == RAW_PMK_LEN
    }

    pub fn validate(&self) -> WifiResult<()> {
        validate_password_len(self.password.expose_secret().len())
    }
}

/// Soft-AP mode configuration
#[derive(Debug, Clone)]
pub struct ApConfig {
    pub ssid: Ssid,
    pub password: SecretString,
    pub auth_mode: AuthMode,
    pub cipher: CipherType,
    pub channel: u8,
    /// Suppress SSID broadcast in beacons
    pub ssid_hidden: bool,
    pub max_connections: u8,
    pub beacon_interval: u16,
}

impl ApConfig {
    pub fn new(ssid: Ssid, password: SecretString, auth_mode: AuthMode) -> Self {
        ApConfig {
            ssid,
            password,
            auth_mode,
            cipher: CipherType::Ccmp,
            channel: 1,
            ssid_hidden: false,
            max_connections: MAX_AP_STATIONS,
            beacon_interval: MIN_BEACON_INTERVAL_MS,
        }
    }

    pub fn validate(&self) -> WifiResult<()> {
        let password_len = self.password.expose_secret().len();
        validate_password_len(password_len)?;
        if self.auth_mode == AuthMode::Open && password_len != 0 {
            return Err(WifiError::invalid_parameter(
                "open AP must not carry a password",
            ));
        }
        if self.auth_mode != AuthMode::Open && password_len == 0 {
            return Err(WifiError::invalid_parameter(format!(
                "{} AP requires a password",
                self.auth_mode
            )));
        }
        if !(MIN_AP_CHANNEL..=MAX_AP_CHANNEL).contains(&self.channel) {
            return Err(WifiError::invalid_parameter(format!(
                "AP channel {} outside {MIN_AP_CHANNEL}..={MAX_AP_CHANNEL}",
                self.channel
            )));
        }
        if self.max_connections == 0 || self.max_connections > MAX_AP_STATIONS {
            return Err(WifiError::invalid_parameter(format!(
                "max_connections {} outside 1..={MAX_AP_STATIONS}",
                self.max_connections
            )));
        }
        if !(MIN_BEACON_INTERVAL_MS..=MAX_BEACON_INTERVAL_MS).contains(&self.beacon_interval) {
            return Err(WifiError::invalid_parameter(format!(
                "beacon interval {} ms outside {MIN_BEACON_INTERVAL_MS}..={MAX_BEACON_INTERVAL_MS}",
                self.beacon_interval
            )));
        }
        Ok(())
    }
}

/// Active configuration, exactly one mode at a time
#[derive(Debug, Clone)]
pub enum WifiConfig {
    Sta(StaConfig),
    Ap(ApConfig),
}

impl WifiConfig {
    pub fn mode(&self) -> WifiMode {
        match self {
            WifiConfig::Sta(_) => WifiMode::Sta,
            WifiConfig::Ap(_) => WifiMode::Ap,
        }
    }

    pub fn ssid(&self) -> &Ssid {
        match self {
            WifiConfig::Sta(sta) => &sta.ssid,
            WifiConfig::Ap(ap) => &ap.ssid,
        }
    }

    pub fn as_sta(&self) -> Option<&StaConfig> {
        match self {
            WifiConfig::Sta(sta) => Some(sta),
            WifiConfig::Ap(_) => None,
        }
    }

    pub fn as_ap(&self) -> Option<&ApConfig> {
        match self {
            WifiConfig::Ap(ap) => Some(ap),
            WifiConfig::Sta(_) => None,
        }
    }

    pub fn validate(&self) -> WifiResult<()> {
        match self {
            WifiConfig::Sta(sta) => sta.validate(),
            WifiConfig::Ap(ap) => ap.validate(),
        }
    }
}

fn validate_password_len(len: usize) -> WifiResult<()> {
    if len == 0 || len == RAW_PMK_LEN || (MIN_PASSPHRASE_LEN..=MAX_PASSPHRASE_LEN).contains(&len) {
        Ok(())
    } else {
        Err(WifiError::invalid_parameter(format!(
            "password is {len} bytes; expected 0, \
             {MIN_PASSPHRASE_LEN}-{MAX_PASSPHRASE_LEN}, or {RAW_PMK_LEN} (raw PMK)"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WifiError;

    fn sta(password: &str) -> StaConfig {
        StaConfig::new("lab-net-24".parse().unwrap(), SecretString::from(password))
    }

    #[test]
    fn sta_password_lengths() {
        assert!(sta("").validate().is_ok());
        assert!(sta("12345678").validate().is_ok());
        assert!(sta(&"a".repeat(63)).validate().is_ok());

        // 64 bytes is accepted and reinterpreted as a raw PMK
        let pmk = sta(&"f".repeat(64));
        assert!(pmk.validate().is_ok());
        assert!(pmk.password_is_pmk());

        assert!(matches!(
            sta("12345").validate(),
            Err(WifiError::InvalidParameter { .. })
        ));
        assert!(sta(&"a".repeat(65)).validate().is_err());
    }

    #[test]
    fn threshold_applies_both_floors() {
        let threshold = FastScanThreshold {
            min_rssi: -70,
            min_auth_mode: AuthMode::Wpa2Psk,
        };
        let mut record = ApRecord {
            ssid: "lab-net-24".parse().unwrap(),
            bssid: Bssid([2, 0, 0, 0, 0, 1]),
            channel: 6,
            auth_mode: AuthMode::Wpa2Psk,
            pairwise_cipher: CipherType::Ccmp,
            group_cipher: CipherType::Ccmp,
            rssi: -60,
            beacon_interval: 100,
            capability_info: 0x431,
        };
        assert!(threshold.accepts(&record));

        record.rssi = -71;
        assert!(!threshold.accepts(&record));

        record.rssi = -60;
        record.auth_mode = AuthMode::WpaPsk;
        assert!(!threshold.accepts(&record));
    }

    #[test]
    fn ap_config_field_bounds() {
        let base = ApConfig::new(
            "floor2-ap".parse().unwrap(),
            SecretString::from("hunter2hunter2"),
            AuthMode::Wpa2Psk,
        );
        assert!(base.validate().is_ok());

        let mut bad = base.clone();
        bad.channel = 15;
        assert!(bad.validate().is_err());

        let mut bad = base.clone();
        bad.beacon_interval = 99;
        assert!(bad.validate().is_err());

        let mut bad = base.clone();
        bad.max_connections = 5;
        assert!(bad.validate().is_err());

        let mut bad = base.clone();
        bad.password = SecretString::from("");
        assert!(bad.validate().is_err());

        let mut open = base;
        open.auth_mode = AuthMode::Open;
        assert!(open.validate().is_err());
        open.password = SecretString::from("");
        assert!(open.validate().is_ok());
    }

    #[test]
    fn config_exposes_only_active_variant() {
        let config = WifiConfig::Sta(sta("correct horse"));
        assert_eq!(config.mode(), WifiMode::Sta);
        assert!(config.as_sta().is_some());
        assert!(config.as_ap().is_none());
        assert_eq!(config.ssid().to_string(), "lab-net-24");
    }
}
