//! Device identity resolution
//!
//! Derives the stable device identifier reported as `udid`. Precedence:
//! a configured override, then the platform's hardware identifier, then —
//! when the hardware id is the all-zero emulator sentinel — a generated id
//! persisted so it stays stable across restarts. Resolution never fails;
//! every degraded path ends in an empty or generated identifier.

use crate::store::{SettingsStore, KEY_EMULATOR_DEVICE_ID};
use rand::Rng;

/// Alphabet for generated emulator device ids
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvw";

/// Length of a generated emulator device id
const GENERATED_ID_LEN: usize = 32;

/// Resolved device identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// The identifier reported as `udid`; may be empty when no hardware id
    /// is available and no override is configured
    pub device_id: String,
    /// True when the id came from the emulator fallback generator (freshly
    /// generated or reloaded from the store)
    pub emulator_generated: bool,
}

/// Resolve the device identity for this activation
///
/// A non-empty `manifest_override` wins verbatim. A missing or empty
/// `hardware_id` yields an empty identifier. A hardware id that parses as
/// the integer zero is the emulator sentinel and is replaced with a
/// persisted generated id; anything else is used lowercased.
pub fn resolve(
    manifest_override: Option<&str>,
    hardware_id: Option<&str>,
    store: &SettingsStore,
) -> DeviceIdentity {
    if let Some(id) = manifest_override.filter(|s| !s.is_empty()) {
        tracing::info!(device_id = %id, "using configured device id");
        return DeviceIdentity {
            device_id: id.to_string(),
            emulator_generated: false,
        };
    }

    let hardware = match hardware_id.filter(|s| !s.is_empty()) {
        Some(h) => h.to_lowercase(),
        None => {
            tracing::warn!("device id is null or empty");
            return DeviceIdentity {
                device_id: String::new(),
                emulator_generated: false,
            };
        }
    };

    match hardware.parse::<i64>() {
        Ok(0) => DeviceIdentity {
            device_id: emulator_device_id(store),
            emulator_generated: true,
        },
        // Nonzero numeric and non-numeric ids are genuine hardware ids
        _ => DeviceIdentity {
            device_id: hardware,
            emulator_generated: false,
        },
    }
}

/// Reuse the persisted emulator id, or generate and persist a new one
fn emulator_device_id(store: &SettingsStore) -> String {
    match store.get_string(KEY_EMULATOR_DEVICE_ID) {
        Ok(Some(id)) if !id.is_empty() => {
            tracing::info!(device_id = %id, "reusing stored emulator device id");
            return id;
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "failed to read stored emulator device id"),
    }

    let id = generate_id();
    tracing::info!(device_id = %id, "generated emulator device id");

    if let Err(e) = store.put_string(KEY_EMULATOR_DEVICE_ID, &id) {
        // The id still serves this activation; it just won't survive a restart
        tracing::warn!(error = %e, "failed to persist emulator device id");
    }

    id
}

fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..GENERATED_ID_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}
