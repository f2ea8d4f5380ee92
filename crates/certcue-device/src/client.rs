// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Async HTTP client for the cue device.
//
// Wire protocol (device firmware contract):
//   PUT /H        — assert "insecure / signal on"
//   PUT /L        — assert "secure / signal off"
//   GET /stopped  — JSON boolean: has the device self-reported stopped?
//
// The client performs no retries. Signal state is re-asserted naturally by
// subsequent tab events, and confirmation is re-queried by the poller.

use std::future::Future;
use std::time::Duration;

use reqwest::Url;
use tracing::{debug, instrument};

use certcue_core::error::{CertcueError, Result};

/// Desired signal level on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalLevel {
    /// Signal on — page is insecure.
    High,
    /// Signal off — page is secure.
    Low,
}

impl SignalLevel {
    /// The path segment the device firmware expects.
    pub fn path(&self) -> &'static str {
        match self {
            Self::High => "H",
            Self::Low => "L",
        }
    }
}

impl From<bool> for SignalLevel {
    fn from(on: bool) -> Self {
        if on { Self::High } else { Self::Low }
    }
}

/// The seam between the tracker and the physical device.
///
/// Implemented by [`DeviceClient`] for the real device and by test doubles
/// in the tracker's tests. Futures are `Send` so implementations can be
/// driven from spawned poller tasks.
pub trait SignalDevice {
    /// Assert the desired signal state. Last writer wins.
    fn set_signal(&self, on: bool) -> impl Future<Output = Result<()>> + Send;

    /// Ask the device whether it has stopped signaling.
    fn stopped(&self) -> impl Future<Output = Result<bool>> + Send;
}

/// Reqwest-backed client bound to a single device base URL.
///
/// Cheap to clone — `reqwest::Client` is reference-counted internally.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    base: Url,
    http: reqwest::Client,
}

impl DeviceClient {
    /// Create a client for the device at `base_url`.
    ///
    /// The URL is validated here so that a misconfigured endpoint surfaces
    /// at startup rather than on the first navigation.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| CertcueError::Device(format!("invalid device URL '{base_url}': {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CertcueError::Device(format!("build HTTP client: {e}")))?;

        Ok(Self { base, http })
    }

    /// The device base URL this client targets.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segment: &str) -> Result<Url> {
        self.base
            .join(segment)
            .map_err(|e| CertcueError::Device(format!("join '{segment}': {e}")))
    }
}

impl SignalDevice for DeviceClient {
    #[instrument(skip(self), fields(device = %self.base))]
    async fn set_signal(&self, on: bool) -> Result<()> {
        let level = SignalLevel::from(on);
        let url = self.endpoint(level.path())?;

        debug!(level = level.path(), "asserting signal level");
        self.http
            .put(url)
            .send()
            .await
            .map_err(|e| CertcueError::Device(format!("PUT /{}: {e}", level.path())))?
            .error_for_status()
            .map_err(|e| CertcueError::Device(format!("PUT /{}: {e}", level.path())))?;

        Ok(())
    }

    #[instrument(skip(self), fields(device = %self.base))]
    async fn stopped(&self) -> Result<bool> {
        let url = self.endpoint("stopped")?;

        let stopped = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| CertcueError::Device(format!("GET /stopped: {e}")))?
            .error_for_status()
            .map_err(|e| CertcueError::Device(format!("GET /stopped: {e}")))?
            .json::<bool>()
            .await
            .map_err(|e| CertcueError::Device(format!("GET /stopped body: {e}")))?;

        debug!(stopped, "device confirmation response");
        Ok(stopped)
    }
}
