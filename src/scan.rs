//! Bounded cache of scan results: one mutable working set per scan session,
//! finalized into immutable snapshots.

use std::sync::Arc;

use tracing::debug;

use crate::config::MAX_SCAN_RECORDS;
use crate::error::{WifiError, WifiResult};
use crate::types::{ApRecord, Bssid};

/// Identifies one scan session; completions carrying a non-current id are stale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanId(u32);

#[derive(Debug)]
struct ScanSession {
    id: ScanId,
    records: Vec<ApRecord>,
}

/// Holds the in-progress working set and the last finalized snapshot
#[derive(Debug, Default)]
pub struct ScanResultStore {
    session: Option<ScanSession>,
    snapshot: Option<Arc<ScanResultSet>>,
    next_id: u32,
}

impl ScanResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new scan session with an empty working set
    pub fn begin_scan(&mut self) -> WifiResult<ScanId> {
        if self.session.is_some() {
            return Err(WifiError::AlreadyScanning);
        }
        let id = ScanId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.session = Some(ScanSession {
            id,
            records: Vec::new(),
        });
        Ok(id)
    }

    /// Id of the open session, if any
    pub fn scan_in_progress(&self) -> Option<ScanId> {
        self.session.as_ref().map(|s| s.id)
    }

    /// Insert a record, replacing any earlier sighting of the same BSSID.
    /// Valid only between `begin_scan` and `complete_scan`.
    pub fn ingest(&mut self, record: ApRecord) -> WifiResult<()> {
        let Some(session) = self.session.as_mut() else {
            return Err(WifiError::invalid_state("ingest", "no scan in progress"));
        };
        if let Some(slot) = session
            .records
            .iter_mut()
            .find(|r| r.bssid == record.bssid)
        {
            // Same AP seen again: full replacement, keeping its slot order
            *slot = record;
            return Ok(());
        }
        if session.records.len() >= MAX_SCAN_RECORDS {
            return Err(WifiError::CapacityExceeded {
                capacity: MAX_SCAN_RECORDS,
            });
        }
        session.records.push(record);
        Ok(())
    }

    /// Finalize the open session into an immutable snapshot
    pub fn complete_scan(&mut self) -> WifiResult<Arc<ScanResultSet>> {
        let Some(session) = self.session.take() else {
            return Err(WifiError::invalid_state(
                "complete_scan",
                "no scan in progress",
            ));
        };
        debug!(scan = session.id.0, count = session.records.len(), "scan finalized");
        let snapshot = Arc::new(ScanResultSet {
            records: session.records,
        });
        self.snapshot = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Throw away an unfinished session, keeping the last snapshot
    pub fn abort_scan(&mut self) {
        if let Some(session) = self.session.take() {
            debug!(scan = session.id.0, "scan aborted");
        }
    }

    /// Drop both the working set and the snapshot, as on mode teardown
    pub fn reset(&mut self) {
        self.session = None;
        self.snapshot = None;
    }

    /// Most recent finalized snapshot
    pub fn latest(&self) -> Option<Arc<ScanResultSet>> {
        self.snapshot.clone()
    }
}

/// Immutable, insertion-ordered set of discovered APs with no duplicate BSSIDs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanResultSet {
    records: Vec<ApRecord>,
}

impl ScanResultSet {
    pub fn records(&self) -> &[ApRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ApRecord> {
        self.records.get(index)
    }

    /// Slot index of a BSSID, usable with the legacy fast-connect hook
    pub fn position_of(&self, bssid: &Bssid) -> Option<usize> {
        self.records.iter().position(|r| r.bssid == *bssid)
    }

    /// Record with the best signal
    pub fn strongest(&self) -> Option<&ApRecord> {
        self.records.iter().max_by_key(|r| r.rssi)
    }

    /// Records ordered by signal strength, strongest first
    pub fn by_signal(&self) -> Vec<&ApRecord> {
        let mut out: Vec<&ApRecord> = self.records.iter().collect();
        out.sort_by(|a, b| b.rssi.cmp(&a.rssi));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AuthMode, CipherType, Ssid};

    fn record(tag: u8, rssi: i8) -> ApRecord {
        ApRecord {
            ssid: Ssid::new(format!("net-{tag}").as_bytes()).unwrap(),
            bssid: Bssid([0xde, 0xad, 0, 0, 0, tag]),
            channel: 1 + (tag % 11),
            auth_mode: AuthMode::Wpa2Psk,
            pairwise_cipher: CipherType::Ccmp,
            group_cipher: CipherType::Ccmp,
            rssi,
            beacon_interval: 100,
            capability_info: 0x431,
        }
    }

    #[test]
    fn ingest_requires_open_session() {
        let mut store = ScanResultStore::new();
        assert!(matches!(
            store.ingest(record(1, -50)),
            Err(WifiError::InvalidState { .. })
        ));
    }

    #[test]
    fn begin_twice_is_already_scanning() {
        let mut store = ScanResultStore::new();
        store.begin_scan().unwrap();
        assert_eq!(store.begin_scan(), Err(WifiError::AlreadyScanning));
    }

    #[test]
    fn same_bssid_is_replaced_not_duplicated() {
        let mut store = ScanResultStore::new();
        store.begin_scan().unwrap();
        store.ingest(record(7, -80)).unwrap();
        store.ingest(record(8, -60)).unwrap();
        // Same AP, fresher reading
        store.ingest(record(7, -52)).unwrap();

        let set = store.complete_scan().unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0).unwrap().rssi, -52);
        assert_eq!(set.position_of(&Bssid([0xde, 0xad, 0, 0, 0, 7])), Some(0));
    }

    #[test]
    fn seventeenth_bssid_is_rejected_and_store_untouched() {
        let mut store = ScanResultStore::new();
        store.begin_scan().unwrap();
        for tag in 0..16 {
            store.ingest(record(tag, -70)).unwrap();
        }
        let err = store.ingest(record(16, -30)).unwrap_err();
        assert_eq!(err, WifiError::CapacityExceeded { capacity: 16 });

        // A known BSSID still replaces cleanly at capacity
        store.ingest(record(3, -31)).unwrap();

        let set = store.complete_scan().unwrap();
        assert_eq!(set.len(), 16);
        assert_eq!(set.get(3).unwrap().rssi, -31);
        assert!(set.position_of(&Bssid([0xde, 0xad, 0, 0, 0, 16])).is_none());
    }

    #[test]
    fn snapshot_survives_the_next_session() {
        let mut store = ScanResultStore::new();
        store.begin_scan().unwrap();
        store.ingest(record(1, -44)).unwrap();
        let first = store.complete_scan().unwrap();

        store.begin_scan().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(store.latest().unwrap().len(), 1);

        store.ingest(record(2, -61)).unwrap();
        store.ingest(record(3, -58)).unwrap();
        let second = store.complete_scan().unwrap();
        assert_eq!(second.len(), 2);
        // The earlier holder's snapshot is unaffected
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn scan_ids_are_distinct_across_sessions() {
        let mut store = ScanResultStore::new();
        let first = store.begin_scan().unwrap();
        store.abort_scan();
        let second = store.begin_scan().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn signal_queries() {
        let mut store = ScanResultStore::new();
        store.begin_scan().unwrap();
        store.ingest(record(1, -70)).unwrap();
        store.ingest(record(2, -40)).unwrap();
        store.ingest(record(3, -55)).unwrap();
        let set = store.complete_scan().unwrap();

        assert_eq!(set.strongest().unwrap().rssi, -40);
        let ordered: Vec<i8> = set.by_signal().iter().map(|r| r.rssi).collect();
        assert_eq!(ordered, vec![-40, -55, -70]);
        // Insertion order is preserved in the set itself
        assert_eq!(set.get(0).unwrap().rssi, -70);
    }
}
