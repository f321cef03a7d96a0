//! Connect-candidate selection over a finalized scan snapshot.

use crate::config::{FastScanThreshold, StaConfig};
use crate::scan::ScanResultSet;
use crate::types::{ApRecord, Bssid, ScanMethod, SortMethod, Ssid};

/// Identity the station is trying to reach: any AP with the SSID, or one
/// exact BSSID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectTarget {
    Ssid(Ssid),
    Bssid(Bssid),
}

impl ConnectTarget {
    /// A BSSID lock in the config takes precedence over the SSID
    pub fn from_sta(config: &StaConfig) -> Self {
        match config.bssid {
            Some(bssid) => ConnectTarget::Bssid(bssid),
            None => ConnectTarget::Ssid(config.ssid),
        }
    }

    pub fn matches(&self, record: &ApRecord) -> bool {
        match self {
            ConnectTarget::Ssid(ssid) => record.ssid == *ssid,
            ConnectTarget::Bssid(bssid) => record.bssid == *bssid,
        }
    }
}

/// Pick the connect candidate from a snapshot, or `None` when no AP matches
/// the target identity and clears the threshold.
pub fn select_candidate<'a>(
    candidates: &'a ScanResultSet,
    target: &ConnectTarget,
    method: ScanMethod,
    sort: SortMethod,
    threshold: &FastScanThreshold,
) -> Option<&'a ApRecord> {
    let mut acceptable = candidates
        .records()
        .iter()
        .filter(|r| target.matches(r) && threshold.accepts(r));

    match method {
        // Fast scan ends at the first acceptable sighting
        ScanMethod::Fast => acceptable.next(),
        ScanMethod::AllChannel => acceptable.fold(None, |best: Option<&ApRecord>, r| match best {
            Some(b) if !ranks_higher(r, b, sort) => Some(b),
            _ => Some(r),
        }),
    }
}

/// Selection driven directly by a station config
pub fn select_for_config<'a>(
    candidates: &'a ScanResultSet,
    config: &StaConfig,
) -> Option<&'a ApRecord> {
    select_candidate(
        candidates,
        &ConnectTarget::from_sta(config),
        config.scan_method,
        config.sort_method,
        &config.threshold,
    )
}

// Strictly-greater comparison so that earlier sightings win ties
fn ranks_higher(a: &ApRecord, b: &ApRecord, sort: SortMethod) -> bool {
    match sort {
        SortMethod::BySignal => a.rssi > b.rssi,
        SortMethod::BySecurity => (a.auth_mode, a.rssi) > (b.auth_mode, b.rssi),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WifiResult;
    use crate::scan::ScanResultStore;
    use crate::types::{AuthMode, CipherType};

    fn record(ssid: &str, tag: u8, rssi: i8, auth_mode: AuthMode) -> ApRecord {
        ApRecord {
            ssid: ssid.parse().unwrap(),
            bssid: Bssid([0x0c, 0x80, 0, 0, 0, tag]),
            channel: 11,
            auth_mode,
            pairwise_cipher: CipherType::Ccmp,
            group_cipher: CipherType::Ccmp,
            rssi,
            beacon_interval: 100,
            capability_info: 0x431,
        }
    }

    fn snapshot(records: Vec<ApRecord>) -> WifiResult<std::sync::Arc<ScanResultSet>> {
        let mut store = ScanResultStore::new();
        store.begin_scan()?;
        for r in records {
            store.ingest(r)?;
        }
        store.complete_scan()
    }

    #[test]
    fn fast_scan_rejects_everything_below_rssi_floor() {
        let set = snapshot(vec![
            record("office", 1, -75, AuthMode::Wpa2Psk),
            record("office", 2, -82, AuthMode::Wpa2Enterprise),
        ])
        .unwrap();
        let threshold = FastScanThreshold {
            min_rssi: -70,
            min_auth_mode: AuthMode::Wpa2Psk,
        };
        let target = ConnectTarget::Ssid("office".parse().unwrap());
        assert!(
            select_candidate(
                &set,
                &target,
                ScanMethod::Fast,
                SortMethod::BySignal,
                &threshold
            )
            .is_none()
        );
    }

    #[test]
    fn fast_scan_stops_at_first_acceptable_match() {
        let set = snapshot(vec![
            record("guest", 1, -40, AuthMode::Open),
            record("office", 2, -66, AuthMode::Wpa2Psk),
            record("office", 3, -48, AuthMode::Wpa2Psk),
        ])
        .unwrap();
        let target = ConnectTarget::Ssid("office".parse().unwrap());
        let chosen = select_candidate(
            &set,
            &target,
            ScanMethod::Fast,
            SortMethod::BySignal,
            &FastScanThreshold::default(),
        )
        .unwrap();
        // First sighting wins even though a stronger one follows
        assert_eq!(chosen.bssid, Bssid([0x0c, 0x80, 0, 0, 0, 2]));
    }

    #[test]
    fn all_channel_by_signal_takes_the_strongest() {
        let set = snapshot(vec![
            record("office", 1, -66, AuthMode::Wpa2Psk),
            record("office", 2, -48, AuthMode::WpaPsk),
            record("office", 3, -59, AuthMode::Wpa2Psk),
        ])
        .unwrap();
        let target = ConnectTarget::Ssid("office".parse().unwrap());
        let chosen = select_candidate(
            &set,
            &target,
            ScanMethod::AllChannel,
            SortMethod::BySignal,
            &FastScanThreshold::default(),
        )
        .unwrap();
        assert_eq!(chosen.rssi, -48);
    }

    #[test]
    fn all_channel_by_security_breaks_ties_on_signal() {
        let set = snapshot(vec![
            record("office", 1, -48, AuthMode::WpaPsk),
            record("office", 2, -70, AuthMode::Wpa2Psk),
            record("office", 3, -55, AuthMode::Wpa2Psk),
        ])
        .unwrap();
        let target = ConnectTarget::Ssid("office".parse().unwrap());
        let chosen = select_candidate(
            &set,
            &target,
            ScanMethod::AllChannel,
            SortMethod::BySecurity,
            &FastScanThreshold::default(),
        )
        .unwrap();
        assert_eq!(chosen.bssid, Bssid([0x0c, 0x80, 0, 0, 0, 3]));
    }

    #[test]
    fn bssid_lock_ignores_other_aps_with_same_ssid() {
        let set = snapshot(vec![
            record("office", 1, -40, AuthMode::Wpa2Psk),
            record("office", 2, -80, AuthMode::Wpa2Psk),
        ])
        .unwrap();
        let target = ConnectTarget::Bssid(Bssid([0x0c, 0x80, 0, 0, 0, 2]));
        let chosen = select_candidate(
            &set,
            &target,
            ScanMethod::AllChannel,
            SortMethod::BySignal,
            &FastScanThreshold::default(),
        )
        .unwrap();
        assert_eq!(chosen.rssi, -80);
    }

    #[test]
    fn config_with_bssid_lock_builds_bssid_target() {
        use secrecy::SecretString;
        let mut config = StaConfig::new("office".parse().unwrap(), SecretString::from("pw-is-long"));
        assert!(matches!(
            ConnectTarget::from_sta(&config),
            ConnectTarget::Ssid(_)
        ));
        config.bssid = Some(Bssid([1, 2, 3, 4, 5, 6]));
        assert!(matches!(
            ConnectTarget::from_sta(&config),
            ConnectTarget::Bssid(_)
        ));
    }
}
