// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test doubles for the device and the host TLS introspection seams.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use certcue_core::error::{CertcueError, Result};
use certcue_device::SignalDevice;

use crate::controller::TlsInspector;

/// In-memory cue device recording every `set_signal` call and serving
/// scripted `stopped` responses.
///
/// An exhausted response queue answers `Ok(false)` — a device that is still
/// signaling — so pollers keep ticking unless a test says otherwise.
#[derive(Clone, Default)]
pub(crate) struct MockDevice {
    signals: Arc<Mutex<Vec<bool>>>,
    stopped_responses: Arc<Mutex<VecDeque<std::result::Result<bool, &'static str>>>>,
    stopped_queries: Arc<Mutex<u32>>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next `stopped` response.
    pub fn push_stopped(&self, response: std::result::Result<bool, &'static str>) {
        self.stopped_responses
            .lock()
            .unwrap()
            .push_back(response);
    }

    /// Every signal level asserted so far, in order.
    pub fn signals(&self) -> Vec<bool> {
        self.signals.lock().unwrap().clone()
    }

    /// How many times the device was asked for confirmation.
    pub fn stopped_queries(&self) -> u32 {
        *self.stopped_queries.lock().unwrap()
    }
}

impl SignalDevice for MockDevice {
    async fn set_signal(&self, on: bool) -> Result<()> {
        self.signals.lock().unwrap().push(on);
        Ok(())
    }

    async fn stopped(&self) -> Result<bool> {
        *self.stopped_queries.lock().unwrap() += 1;
        match self.stopped_responses.lock().unwrap().pop_front() {
            Some(Ok(stopped)) => Ok(stopped),
            Some(Err(message)) => Err(CertcueError::Device(message.into())),
            None => Ok(false),
        }
    }
}

/// TLS introspection double mapping request ids to state labels.
///
/// An unknown request id fails the lookup, which doubles as the
/// transient-failure path in controller tests.
#[derive(Clone, Default)]
pub(crate) struct MockInspector {
    labels: Arc<Mutex<HashMap<String, String>>>,
}

impl MockInspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_label(&self, request_id: &str, label: &str) {
        self.labels
            .lock()
            .unwrap()
            .insert(request_id.into(), label.into());
    }
}

impl TlsInspector for MockInspector {
    async fn security_state(&self, request_id: &str) -> Result<String> {
        self.labels
            .lock()
            .unwrap()
            .get(request_id)
            .cloned()
            .ok_or_else(|| CertcueError::TlsLookup(format!("unknown request id {request_id}")))
    }
}
