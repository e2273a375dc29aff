//! Install referral capture
//!
//! The host platform delivers a one-time install broadcast whose payload may
//! carry a marketing referral. The fragment is stored verbatim (parameter
//! name included) so the next reporting cycle can append it to the connect
//! call. Capture runs on the platform's own execution context, fully
//! decoupled from the reporter; if a report is built before the broadcast
//! lands, that report goes out without the fragment and the next activation
//! picks it up.

use std::sync::Arc;

use crate::store::{SettingsStore, KEY_INSTALL_REFERRAL};

const REFERRAL_MARKER: &str = "referrer=";

/// Trailing characters the broadcast payload appends after the referral
/// value. The offset is part of the payload format; do not adjust it without
/// verifying the format changed.
const TRAILING_ARTIFACT_LEN: usize = 4;

/// Captures the install referral into the shared settings store
pub struct ReferralTracker {
    store: Arc<SettingsStore>,
}

impl ReferralTracker {
    pub fn new(store: Arc<SettingsStore>) -> Self {
        Self { store }
    }

    /// Handle a raw install broadcast payload
    ///
    /// Extracts the substring from the `referrer=` marker through four
    /// characters before the payload end and persists it. A payload without
    /// the marker writes nothing; repeated deliveries overwrite (last write
    /// wins).
    pub fn on_install_referral(&self, raw_payload: &str) {
        let Some(start) = raw_payload.find(REFERRAL_MARKER) else {
            tracing::info!("no referral in install broadcast");
            return;
        };

        // The marker is nine characters, so the trim point always lands past
        // its start once the marker was found.
        let end = raw_payload.len() - TRAILING_ARTIFACT_LEN;

        let Some(fragment) = raw_payload.get(start..end) else {
            tracing::warn!("referral trim fell inside a multi-byte character");
            return;
        };

        match self.store.put_string(KEY_INSTALL_REFERRAL, fragment) {
            Ok(()) => tracing::info!(referral = %fragment, "cached install referral"),
            Err(e) => tracing::warn!(error = %e, "failed to persist install referral"),
        }
    }
}
