//! # tapconnect
//!
//! Install-attribution reporting client, embedded in a host application.
//!
//! On activation the client resolves a stable per-install device identifier
//! (with a persisted fallback for emulator environments), assembles a
//! fixed-order report of device and application facts, and notifies the
//! attribution service with a single asynchronous GET. The server's XML
//! acknowledgement is reduced to one boolean outcome, observable through
//! logs. A companion [`ReferralTracker`] captures the one-time
//! install-referral broadcast so the next report can carry it.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tapconnect::{ConnectConfig, Connector, DeviceFacts, SettingsStore};
//!
//! # fn gather_device_facts() -> DeviceFacts { DeviceFacts::default() }
//! let config = ConnectConfig::load().expect("failed to load config");
//! let store = SettingsStore::open(&ConnectConfig::store_path()).expect("failed to open store");
//!
//! let connector = Connector::init(&config, &gather_device_facts(), &store)
//!     .expect("invalid host configuration");
//! let _ = connector.activate(); // fire and forget; outcome goes to the logs
//! ```

// Re-export commonly used items at the crate root
pub use config::ConnectConfig;
pub use connect::{Connector, ReportHandle};
pub use device::DeviceIdentity;
pub use error::{Error, Result, TransportErrorKind};
pub use referral::ReferralTracker;
pub use request::{DeviceFacts, ReportRequest};
pub use store::SettingsStore;

// Public modules
pub mod config;
pub mod connect;
pub mod device;
pub mod error;
pub mod logging;
pub mod referral;
pub mod request;
pub mod response;
pub mod store;
