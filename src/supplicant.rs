//! Hook slots into the legacy supplicant patch layer. The control plane
//! invokes these, it never implements them; ownership stays with whoever
//! wires them up at configuration time.

use std::fmt;

type ShowScanResultsFn = dyn Fn() + Send + Sync;
type ClearScanResultsFn = dyn Fn() + Send + Sync;
type FastConnectFn = dyn Fn(u8, u8) -> bool + Send + Sync;

/// Optional callbacks into the legacy supplicant patch layer
#[derive(Default)]
pub struct SupplicantHooks {
    show_scan_results: Option<Box<ShowScanResultsFn>>,
    clear_scan_results: Option<Box<ClearScanResultsFn>>,
    fast_connect: Option<Box<FastConnectFn>>,
}

impl SupplicantHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dump the current scan results through the supplicant's own printer
    pub fn with_show_scan_results(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.show_scan_results = Some(Box::new(f));
        self
    }

    /// Drop the supplicant's copy of the scan results
    pub fn with_clear_scan_results(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.clear_scan_results = Some(Box::new(f));
        self
    }

    /// Connect via the supplicant's saved parameters for a stored AP;
    /// receives `(mode, index-into-store)` and reports success
    pub fn with_fast_connect(mut self, f: impl Fn(u8, u8) -> bool + Send + Sync + 'static) -> Self {
        self.fast_connect = Some(Box::new(f));
        self
    }

    pub(crate) fn show_scan_results(&self) {
        if let Some(f) = &self.show_scan_results {
            f();
        }
    }

    pub(crate) fn clear_scan_results(&self) {
        if let Some(f) = &self.clear_scan_results {
            f();
        }
    }

    /// `None` when no fast-connect hook is installed
    pub(crate) fn fast_connect(&self, mode: u8, index: u8) -> Option<bool> {
        self.fast_connect.as_ref().map(|f| f(mode, index))
    }
}

impl fmt::Debug for SupplicantHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupplicantHooks")
            .field("show_scan_results", &self.show_scan_results.is_some())
            .field("clear_scan_results", &self.clear_scan_results.is_some())
            .field("fast_connect", &self.fast_connect.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU8, Ordering};

    #[test]
    fn unset_slots_are_inert() {
        let hooks = SupplicantHooks::new();
        hooks.show_scan_results();
        hooks.clear_scan_results();
        assert_eq!(hooks.fast_connect(1, 0), None);
    }

    #[test]
    fn fast_connect_passes_mode_and_index() {
        let seen = Arc::new(AtomicU8::new(0));
        let seen_in_hook = Arc::clone(&seen);
        let hooks = SupplicantHooks::new().with_fast_connect(move |mode, index| {
            seen_in_hook.store(mode * 16 + index, Ordering::SeqCst);
            true
        });
        assert_eq!(hooks.fast_connect(1, 3), Some(true));
        assert_eq!(seen.load(Ordering::SeqCst), 0x13);
    }
}
