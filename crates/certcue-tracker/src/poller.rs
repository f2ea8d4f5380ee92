// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Confirmation poller — per-tab timers asking the cue device whether it has
// stopped signaling.
//
// Per-tab state machine: INACTIVE → ARMED → CONFIRMED (terminal), with
// ARMED → INACTIVE via explicit disarm (tab switched away, tab closed, or a
// new navigation restarting the episode).  Confirmation is the only path
// that sets `stopped = true` on a record.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use certcue_core::types::TabId;
use certcue_device::SignalDevice;

use crate::store::TabStore;

/// Owns the armed timers, keyed by tab id.
///
/// Timers are tokio tasks; disarming is an abort, which is safe at any
/// point because a tick only ever performs a single read-check-write
/// against the store and the device query is idempotent.
pub struct ConfirmationPoller<D> {
    device: D,
    store: Arc<Mutex<TabStore>>,
    interval: Duration,
    timers: HashMap<TabId, JoinHandle<()>>,
}

impl<D> ConfirmationPoller<D> {
    pub fn new(device: D, store: Arc<Mutex<TabStore>>, interval: Duration) -> Self {
        Self {
            device,
            store,
            interval,
            timers: HashMap::new(),
        }
    }

    /// Cancel the timer for a tab.  Idempotent — safe to call for a tab
    /// that was never armed or whose timer already confirmed and finished.
    pub fn disarm(&mut self, tab: TabId) {
        if let Some(handle) = self.timers.remove(&tab) {
            handle.abort();
            debug!(tab = %tab, "confirmation timer disarmed");
        }
    }

    /// Cancel every armed timer.
    pub fn disarm_all(&mut self) {
        for (tab, handle) in self.timers.drain() {
            handle.abort();
            debug!(tab = %tab, "confirmation timer disarmed");
        }
    }

    /// Whether a live timer exists for this tab.  A timer that has already
    /// confirmed (and terminated itself) no longer counts as armed.
    pub fn is_armed(&self, tab: TabId) -> bool {
        self.timers.get(&tab).is_some_and(|h| !h.is_finished())
    }
}

impl<D> ConfirmationPoller<D>
where
    D: SignalDevice + Clone + Send + Sync + 'static,
{
    /// Arm the timer for a tab, replacing any existing one.
    ///
    /// The spawned task polls the device every `interval`.  A truthy
    /// confirmation writes `stopped = true` into the tab's record and ends
    /// the task; a query failure is treated as "not yet confirmed".
    pub fn arm(&mut self, tab: TabId) {
        self.disarm(tab);

        let device = self.device.clone();
        let store = Arc::clone(&self.store);
        let period = self.interval;

        debug!(tab = %tab, period_ms = period.as_millis(), "arming confirmation timer");

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick completes immediately; consume it so
            // the first device query happens one full period after arming.
            ticker.tick().await;

            loop {
                ticker.tick().await;

                match device.stopped().await {
                    Ok(true) => {
                        confirm(&store, tab);
                        break;
                    }
                    Ok(false) => {
                        debug!(tab = %tab, "device still signaling");
                    }
                    Err(error) => {
                        warn!(tab = %tab, %error, "confirmation poll failed; will retry");
                    }
                }
            }
        });

        self.timers.insert(tab, handle);
    }
}

impl<D> Drop for ConfirmationPoller<D> {
    fn drop(&mut self) {
        self.disarm_all();
    }
}

/// Write `stopped = true` into the tab's record.
///
/// A tab removed while the tick was in flight reads back as absent; that is
/// the normal removal race and the update is skipped silently.
fn confirm(store: &Mutex<TabStore>, tab: TabId) {
    let Ok(guard) = store.lock() else {
        error!(tab = %tab, "store lock poisoned; dropping confirmation");
        return;
    };

    match guard.get(tab) {
        Ok(Some(mut record)) => {
            record.stopped = true;
            match guard.put(tab, Some(&record)) {
                Ok(()) => info!(tab = %tab, "device confirmed stopped"),
                Err(error) => error!(tab = %tab, %error, "failed to record confirmation"),
            }
        }
        Ok(None) => {
            debug!(tab = %tab, "tab gone before confirmation; skipping update");
        }
        Err(error) => {
            warn!(tab = %tab, %error, "could not read record for confirmation");
        }
    }
}
