// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tab lifecycle controller — orchestrates the store, the device, and the
// confirmation poller in response to host events.
//
// Every handler re-derives its decision from a fresh store read; nothing is
// cached across an await point.  Failures are contained per handler: a
// device outage or a failed TLS lookup abandons that one invocation and the
// next navigation, tab switch, or poller tick recovers naturally.

use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use certcue_core::config::TrackerConfig;
use certcue_core::error::Result;
use certcue_core::types::{CertState, SecurityRecord, TabId};
use certcue_device::SignalDevice;

use crate::poller::ConfirmationPoller;
use crate::store::TabStore;

/// Host events the tracker reacts to.
///
/// The event set is fixed and closed, so handlers are matched explicitly
/// rather than registered dynamically.  `HeadersReceived` is expected to be
/// pre-filtered by the host to main-frame navigations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabEvent {
    /// A tab was opened.  `None` is a pseudo-tab without an id (devtools
    /// panels and the like) and is ignored.
    Created { tab_id: Option<TabId> },
    /// Focus switched between tabs.  `previous` is `None` for the first
    /// activation in a window.
    Activated {
        previous: Option<TabId>,
        current: TabId,
    },
    /// A tab was closed.
    Removed { tab_id: TabId },
    /// Response headers arrived for a main-frame navigation.
    HeadersReceived {
        tab_id: TabId,
        url: String,
        request_id: String,
    },
}

/// The host's TLS introspection seam: given the request id of a main-frame
/// navigation, return the TLS state label for that load.
pub trait TlsInspector {
    fn security_state(&self, request_id: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Orchestrates per-tab security state against the cue device.
///
/// Owns the record store, the device handle, and the confirmation poller.
/// Drive it either through the individual `on_*` handlers or by feeding a
/// channel of [`TabEvent`]s to [`TabTracker::run`].
pub struct TabTracker<D, I> {
    store: Arc<Mutex<TabStore>>,
    device: D,
    inspector: I,
    poller: ConfirmationPoller<D>,
}

impl<D, I> TabTracker<D, I>
where
    D: SignalDevice + Clone + Send + Sync + 'static,
    I: TlsInspector,
{
    pub fn new(store: TabStore, device: D, inspector: I, config: &TrackerConfig) -> Self {
        let store = Arc::new(Mutex::new(store));
        let poller =
            ConfirmationPoller::new(device.clone(), Arc::clone(&store), config.poll_interval());

        Self {
            store,
            device,
            inspector,
            poller,
        }
    }

    /// Drain host events until the channel closes.
    ///
    /// Handler failures are logged and contained — no event can abort the
    /// loop or affect the handling of later events.
    pub async fn run(&mut self, mut events: mpsc::Receiver<TabEvent>) {
        while let Some(event) = events.recv().await {
            if let Err(error) = self.handle(event).await {
                warn!(%error, "event handler failed; continuing");
            }
        }
        info!("event channel closed; tracker stopping");
    }

    /// Dispatch a single host event.
    pub async fn handle(&mut self, event: TabEvent) -> Result<()> {
        match event {
            TabEvent::Created { tab_id } => self.on_tab_created(tab_id).await,
            TabEvent::Activated { previous, current } => {
                self.on_tab_activated(previous, current).await
            }
            TabEvent::Removed { tab_id } => self.on_tab_removed(tab_id).await,
            TabEvent::HeadersReceived {
                tab_id,
                url,
                request_id,
            } => self.on_headers_received(tab_id, url, request_id).await,
        }
    }

    /// A tab was opened: start tracking it with an empty entry.
    /// Pseudo-tabs without an id host no content and are ignored.
    pub async fn on_tab_created(&mut self, tab_id: Option<TabId>) -> Result<()> {
        let Some(tab) = tab_id else {
            debug!("ignoring pseudo-tab without id");
            return Ok(());
        };

        self.store
            .lock()
            .expect("store lock poisoned")
            .put(tab, None)
    }

    /// Focus switched: stop polling for the tab we left, then re-derive the
    /// device state from the newly focused tab's record.
    ///
    /// Only `insecure && !stopped` keeps the cue on; a secure, stopped,
    /// unobserved, or unknown tab all assert signal-off, so leaving an
    /// insecure tab always silences the device.
    pub async fn on_tab_activated(&mut self, previous: Option<TabId>, current: TabId) -> Result<()> {
        if let Some(prev) = previous {
            self.poller.disarm(prev);
        }

        let record = self
            .store
            .lock()
            .expect("store lock poisoned")
            .get(current)?;

        let wants_signal = record.as_ref().is_some_and(SecurityRecord::wants_signal);
        debug!(tab = %current, wants_signal, "tab activated");

        self.send_signal(wants_signal).await;
        if wants_signal {
            self.poller.arm(current);
        }

        Ok(())
    }

    /// A tab closed: disarm its timer and forget its record.  Idempotent.
    pub async fn on_tab_removed(&mut self, tab: TabId) -> Result<()> {
        self.poller.disarm(tab);
        info!(tab = %tab, "removing tab");
        self.store
            .lock()
            .expect("store lock poisoned")
            .remove(tab)
    }

    /// Main-frame navigation: classify the load, overwrite the tab's record
    /// wholesale (which restarts the signaling episode), assert the device
    /// state, and arm the poller if the page is insecure.
    ///
    /// This handler sits in a blocking position relative to page load, so
    /// the device send is best-effort and must never stall navigation on a
    /// dead device.
    pub async fn on_headers_received(
        &mut self,
        tab: TabId,
        url: String,
        request_id: String,
    ) -> Result<()> {
        let label = self.inspector.security_state(&request_id).await?;
        let state = CertState::from_label(&label);
        let insecure = state.is_insecure();

        let record = SecurityRecord::new(url, insecure, request_id);
        self.store
            .lock()
            .expect("store lock poisoned")
            .put(tab, Some(&record))?;

        info!(tab = %tab, ?state, insecure, url = %record.url, "navigation classified");

        self.send_signal(insecure).await;
        if insecure {
            self.poller.arm(tab);
        }

        Ok(())
    }

    /// Read back a tab's record (fresh from the store).
    pub fn record(&self, tab: TabId) -> Result<Option<SecurityRecord>> {
        self.store.lock().expect("store lock poisoned").get(tab)
    }

    /// Whether a confirmation timer is currently live for this tab.
    pub fn is_polling(&self, tab: TabId) -> bool {
        self.poller.is_armed(tab)
    }

    /// Assert the device state, best effort.  The device is a convenience,
    /// not a dependency: an unreachable device must not fail the handler,
    /// and the signal is re-asserted by the next tab event anyway.
    async fn send_signal(&self, on: bool) {
        if let Err(error) = self.device.set_signal(on).await {
            warn!(%error, on, "cue device unreachable; signal not asserted");
        }
    }
}
