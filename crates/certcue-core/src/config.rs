// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tracker configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the tracker and its device connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Base URL of the cue device's HTTP endpoint.
    pub device_url: String,
    /// Timeout for a single device request, in seconds.
    pub request_timeout_secs: u64,
    /// Interval between confirmation polls, in seconds.
    pub poll_interval_secs: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            device_url: "http://localhost:3000".into(),
            request_timeout_secs: 5,
            // 0.2 minutes — the fastest period the original host scheduler
            // allowed.
            poll_interval_secs: 12,
        }
    }
}

impl TrackerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_device_contract() {
        let config = TrackerConfig::default();
        assert_eq!(config.device_url, "http://localhost:3000");
        assert_eq!(config.poll_interval(), Duration::from_secs(12));
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = TrackerConfig::default();
        let json = serde_json::to_string(&config).expect("serialize");
        let back: TrackerConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.device_url, config.device_url);
        assert_eq!(back.poll_interval_secs, config.poll_interval_secs);
    }
}
