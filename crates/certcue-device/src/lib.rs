// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Certcue Device — HTTP client for the external non-visual cue device.
// The device is a single shared physical resource on the local network with
// two verbs: assert a signal level, and report whether it has stopped
// signaling.

pub mod client;

pub use client::{DeviceClient, SignalDevice, SignalLevel};
