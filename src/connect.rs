//! Attribution report lifecycle and network call
//!
//! The [`Connector`] is constructed once per activation by the host's
//! composition root. Construction validates the host configuration, resolves
//! the device identity, and assembles the report synchronously; [`activate`]
//! then fires exactly one GET at the attribution service on a spawned task.
//! The triggering control flow never blocks on the network and receives no
//! result — the outcome surfaces through logs, plus an optional
//! [`ReportHandle`] for callers that want the completion signal.
//!
//! Dropping the connector is the release step. It does not cancel an
//! in-flight call; a stale cycle may still complete and log after release.
//!
//! Known race, by design: referral capture shares the settings store with
//! this module but runs on the platform's own execution context. A report
//! built before the broadcast lands goes out without the referral fragment;
//! the next activation picks it up.
//!
//! [`activate`]: Connector::activate

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::oneshot;

use crate::config::ConnectConfig;
use crate::device;
use crate::error::{Error, Result, TransportErrorKind};
use crate::request::{DeviceFacts, ReportRequest, CONNECT_PATH, LIBRARY_VERSION, PLATFORM_TAG};
use crate::response;
use crate::store::{SettingsStore, KEY_INSTALL_REFERRAL};

/// Connect timeout for the attribution call
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(15_000);

/// Read (total request) timeout for the attribution call
pub const READ_TIMEOUT: Duration = Duration::from_millis(30_000);

/// One attribution reporting cycle
///
/// At most one network call is made per instance; a fresh instance starts an
/// independent cycle.
pub struct Connector {
    http_client: reqwest::Client,
    url: String,
    activated: AtomicBool,
}

/// Completion signal for a scheduled report
///
/// The cycle runs and logs its outcome whether or not the handle is awaited;
/// production callers normally drop it.
pub struct ReportHandle {
    rx: oneshot::Receiver<bool>,
}

impl ReportHandle {
    /// Wait for the outcome of the reporting cycle
    pub async fn outcome(self) -> bool {
        self.rx.await.unwrap_or(false)
    }
}

impl Connector {
    /// Build a reporting cycle from host configuration and platform facts
    ///
    /// Fails only on configuration errors (missing app id or client package,
    /// per [`ConnectConfig::validate`]); every identity or store problem
    /// degrades with a log line instead.
    pub fn init(
        config: &ConnectConfig,
        facts: &DeviceFacts,
        store: &SettingsStore,
    ) -> Result<Self> {
        config.validate()?;

        let identity = device::resolve(
            config.device_id.as_deref(),
            facts.hardware_id.as_deref(),
            store,
        );

        let referral = match store.get_string(KEY_INSTALL_REFERRAL) {
            Ok(referral) => referral,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored referral");
                None
            }
        };

        let request = ReportRequest::build(&identity, &config.app_id, facts, referral.as_deref());

        tracing::info!(
            app_id = %config.app_id,
            client_package = %config.client_package,
            device_id = %identity.device_id,
            device_name = %facts.device_name,
            device_type = PLATFORM_TAG,
            os_version = %facts.os_version,
            country_code = %facts.country_code,
            language = %facts.language_code,
            app_version = %facts.app_version,
            library_version = LIBRARY_VERSION,
            referral = referral.as_deref().unwrap_or(""),
            "metadata loaded"
        );
        tracing::info!(params = %request.query(), "URL parameters assembled");

        let url = build_url(&config.service_url, request.query());

        let http_client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(READ_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            url,
            activated: AtomicBool::new(false),
        })
    }

    /// Schedule the attribution report
    ///
    /// The first call per instance spawns the network task and returns its
    /// completion handle; every later call returns `None` and spawns nothing.
    pub fn activate(&self) -> Option<ReportHandle> {
        if self.activated.swap(true, Ordering::SeqCst) {
            return None;
        }

        let (tx, rx) = oneshot::channel();
        let client = self.http_client.clone();
        let url = self.url.clone();

        tokio::spawn(async move {
            let outcome = match report(&client, &url).await {
                Ok(()) => {
                    tracing::info!("successfully connected to the attribution service");
                    true
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to connect to the attribution service");
                    false
                }
            };
            // Receiver may have been dropped; the outcome is already logged
            let _ = tx.send(outcome);
        });

        Some(ReportHandle { rx })
    }
}

/// Final URL for the connect call; spaces become `%20`, nothing else is
/// encoded (the service expects the parameters otherwise verbatim)
fn build_url(service_url: &str, query: &str) -> String {
    format!("{}{}{}", service_url, CONNECT_PATH, query).replace(' ', "%20")
}

async fn report(client: &reqwest::Client, url: &str) -> Result<()> {
    tracing::info!(url = %url, "sending attribution report");

    let response = client.get(url).send().await.map_err(classify)?;
    let body = response.bytes().await.map_err(classify)?;

    response::evaluate(&body)
}

/// Map a transport failure to its diagnostic kind
fn classify(e: reqwest::Error) -> Error {
    let kind = if e.is_timeout() {
        TransportErrorKind::Timeout
    } else if e.is_connect() {
        TransportErrorKind::Connect
    } else if e.is_builder() {
        TransportErrorKind::InvalidUrl
    } else {
        TransportErrorKind::Io
    };
    Error::Transport {
        kind,
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoggingConfig;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server_uri: &str) -> ConnectConfig {
        ConnectConfig {
            app_id: "42".to_string(),
            client_package: "com.example".to_string(),
            device_id: None,
            service_url: format!("{}/", server_uri),
            logging: LoggingConfig::default(),
        }
    }

    fn test_facts() -> DeviceFacts {
        DeviceFacts {
            hardware_id: Some("0".to_string()),
            device_name: "Pixel 4a".to_string(),
            os_version: "11".to_string(),
            country_code: "US".to_string(),
            language_code: "en".to_string(),
            app_version: "1.2.3".to_string(),
        }
    }

    #[test]
    fn test_build_url_encodes_spaces_only() {
        let url = build_url("http://ws.tapjoyads.com/", "udid=a&device_name=Galaxy S III");
        assert_eq!(
            url,
            "http://ws.tapjoyads.com/connect?udid=a&device_name=Galaxy%20S%20III"
        );
    }

    #[test]
    fn test_init_rejects_missing_app_id() {
        let store = SettingsStore::open_in_memory().unwrap();
        let config = ConnectConfig {
            app_id: String::new(),
            ..test_config("http://localhost")
        };
        assert!(matches!(
            Connector::init(&config, &test_facts(), &store),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_cycle_acknowledged_end_to_end() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/connect"))
            .and(query_param("app_id", "42"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<Success>true</Success>"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = SettingsStore::open_in_memory().unwrap();
        let connector =
            Connector::init(&test_config(&server.uri()), &test_facts(), &store).unwrap();

        let handle = connector.activate().expect("first activation");
        assert!(handle.outcome().await);

        // Emulator sentinel hardware id resolved to a generated udid
        let udid = store
            .get_string(crate::store::KEY_EMULATOR_DEVICE_ID)
            .unwrap()
            .expect("generated id persisted");
        assert_eq!(udid.len(), 32);

        let sent = &server.received_requests().await.unwrap()[0];
        let query = sent.url.query().unwrap().to_string();
        assert!(query.starts_with(&format!("udid={}&device_name=", udid)));
        assert!(query.contains("library_version=7.0.1"));
    }

    #[tokio::test]
    async fn test_single_cycle_per_instance() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/connect"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<Success>true</Success>"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = SettingsStore::open_in_memory().unwrap();
        let connector =
            Connector::init(&test_config(&server.uri()), &test_facts(), &store).unwrap();

        let handle = connector.activate().expect("first activation");
        assert!(connector.activate().is_none());
        assert!(connector.activate().is_none());
        assert!(handle.outcome().await);
    }

    #[tokio::test]
    async fn test_release_then_init_starts_fresh_cycle() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/connect"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<Success>true</Success>"),
            )
            .expect(2)
            .mount(&server)
            .await;

        let store = SettingsStore::open_in_memory().unwrap();
        let config = test_config(&server.uri());

        let first = Connector::init(&config, &test_facts(), &store).unwrap();
        assert!(first.activate().unwrap().outcome().await);
        drop(first);

        let second = Connector::init(&config, &test_facts(), &store).unwrap();
        assert!(second.activate().unwrap().outcome().await);
    }

    #[tokio::test]
    async fn test_negative_ack_is_false() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/connect"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<Success>false</Success>"),
            )
            .mount(&server)
            .await;

        let store = SettingsStore::open_in_memory().unwrap();
        let connector =
            Connector::init(&test_config(&server.uri()), &test_facts(), &store).unwrap();
        assert!(!connector.activate().unwrap().outcome().await);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_false() {
        // Reserved port 9 (discard) with nothing listening
        let config = test_config("http://127.0.0.1:9");
        let store = SettingsStore::open_in_memory().unwrap();
        let connector = Connector::init(&config, &test_facts(), &store).unwrap();
        assert!(!connector.activate().unwrap().outcome().await);
    }

    #[tokio::test]
    async fn test_stored_referral_rides_along() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/connect"))
            .and(query_param("referrer", "com.example.campaign"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<Success>true</Success>"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = SettingsStore::open_in_memory().unwrap();
        store
            .put_string(KEY_INSTALL_REFERRAL, "referrer=com.example.campaign")
            .unwrap();

        let connector =
            Connector::init(&test_config(&server.uri()), &test_facts(), &store).unwrap();
        assert!(connector.activate().unwrap().outcome().await);
    }
}
