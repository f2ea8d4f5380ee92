// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Certcue Tracker — the tab security-state machine and its synchronization
// with the external cue device.  This crate bridges between the core domain
// types in `certcue-core` and the device client in `certcue-device`:
// a keyed store of per-tab records, a per-tab confirmation poller, and the
// controller that orchestrates both from host tab/navigation events.

pub mod controller;
pub mod poller;
pub mod store;

pub use controller::{TabEvent, TabTracker, TlsInspector};
pub use poller::ConfirmationPoller;
pub use store::TabStore;

#[cfg(test)]
pub(crate) mod testing;
