// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Certcue tab security tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a browser tab, as assigned by the host.
///
/// Pseudo-tabs without an id (devtools panels and the like) are modelled as
/// `Option<TabId>` at the event boundary rather than with a sentinel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TabId(pub u32);

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// TLS state of a loaded page, as reported by the host's introspection API.
///
/// The label set is open-ended on the host side; anything we do not
/// recognise maps to [`CertState::Other`] and is treated as secure, so an
/// unknown future label can never produce a spurious cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CertState {
    /// Certificate and cipher are acceptable.
    Secure,
    /// Cipher is not strong enough.
    Weak,
    /// Certificate is explicitly insecure.
    Insecure,
    /// TLS handshake failed outright (the host blocks these loads itself).
    Broken,
    /// Unrecognised label.
    Other,
}

impl CertState {
    /// Parse a host-supplied state label. Never fails.
    pub fn from_label(label: &str) -> Self {
        match label {
            "secure" => Self::Secure,
            "weak" => Self::Weak,
            "insecure" => Self::Insecure,
            "broken" => Self::Broken,
            _ => Self::Other,
        }
    }

    /// Whether this state warrants the cue.
    ///
    /// Exactly `weak` and `insecure` count; every other label degrades to
    /// secure. Under-signaling is preferred over false positives.
    pub fn is_insecure(&self) -> bool {
        matches!(self, Self::Weak | Self::Insecure)
    }
}

/// Per-tab security record — the unit stored in the tab record store.
///
/// Overwritten wholesale on every main-frame navigation, which is what
/// resets `stopped` and starts a new signaling episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityRecord {
    /// Last observed main-document URL.
    pub url: String,
    /// True if the page's certificate failed classification.
    pub insecure: bool,
    /// True once the device has confirmed it is no longer signaling.
    /// Monotonic within one episode; only the confirmation poller sets it.
    pub stopped: bool,
    /// Network request that produced this record, for correlating with the
    /// host's TLS introspection.
    pub request_id: String,
    /// When the navigation was observed.
    pub observed_at: DateTime<Utc>,
}

impl SecurityRecord {
    /// Build a fresh record for a navigation.
    ///
    /// A secure page starts with `stopped = true` (there is nothing to
    /// stop); an insecure page starts a new episode with `stopped = false`.
    pub fn new(url: impl Into<String>, insecure: bool, request_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            insecure,
            stopped: !insecure,
            request_id: request_id.into(),
            observed_at: Utc::now(),
        }
    }

    /// Whether the cue device should currently be signaling for this tab.
    pub fn wants_signal(&self) -> bool {
        self.insecure && !self.stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weak_and_insecure_labels_classify_insecure() {
        assert!(CertState::from_label("weak").is_insecure());
        assert!(CertState::from_label("insecure").is_insecure());
    }

    #[test]
    fn all_other_labels_classify_secure() {
        for label in ["secure", "broken", "", "WEAK", "Insecure", "tls1.3", "future-state"] {
            assert!(
                !CertState::from_label(label).is_insecure(),
                "label {label:?} must classify as secure"
            );
        }
    }

    #[test]
    fn insecure_record_starts_unstopped() {
        let record = SecurityRecord::new("https://weak.example", true, "req-1");
        assert!(record.insecure);
        assert!(!record.stopped);
        assert!(record.wants_signal());
    }

    #[test]
    fn secure_record_starts_stopped() {
        let record = SecurityRecord::new("https://ok.example", false, "req-2");
        assert!(!record.insecure);
        assert!(record.stopped);
        assert!(!record.wants_signal());
    }

    #[test]
    fn record_round_trips_through_json() {
        let record = SecurityRecord::new("https://weak.example", true, "req-3");
        let json = serde_json::to_string(&record).expect("serialize");
        let back: SecurityRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, record);
    }

    #[test]
    fn tab_id_displays_as_number() {
        assert_eq!(TabId(42).to_string(), "42");
    }
}
