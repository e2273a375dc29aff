//! Report request assembly and wire constants
//!
//! The attribution service expects a fixed-order query string of nine
//! `name=value` fields. Every field is always present, even when its value
//! is empty; a previously captured referral fragment is appended verbatim.
//! No escaping happens here — the transport step replaces spaces with `%20`
//! just before the request is issued, and nothing else is encoded.

use crate::device::DeviceIdentity;

/// Attribution service base URL
pub const SERVICE_URL: &str = "http://ws.tapjoyads.com/";

/// Path of the connect (attribution report) endpoint
pub const CONNECT_PATH: &str = "connect?";

/// Version string reported as `library_version`
pub const LIBRARY_VERSION: &str = "7.0.1";

/// Platform tag reported as `device_type`
pub const PLATFORM_TAG: &str = "android";

// Query parameter names, in wire order.
const PARAM_DEVICE_ID: &str = "udid";
const PARAM_DEVICE_NAME: &str = "device_name";
const PARAM_DEVICE_TYPE: &str = "device_type";
const PARAM_OS_VERSION: &str = "os_version";
const PARAM_COUNTRY_CODE: &str = "country_code";
const PARAM_LANGUAGE: &str = "language";
const PARAM_APP_ID: &str = "app_id";
const PARAM_APP_VERSION: &str = "app_version";
const PARAM_LIBRARY_VERSION: &str = "library_version";

/// Best-effort device and application facts gathered by the host
///
/// Empty values are tolerated everywhere; none of these abort a report.
#[derive(Debug, Clone, Default)]
pub struct DeviceFacts {
    /// Hardware device identifier, if the platform exposes one
    pub hardware_id: Option<String>,
    /// Device model name
    pub device_name: String,
    /// OS version string
    pub os_version: String,
    /// ISO country code
    pub country_code: String,
    /// ISO language code
    pub language_code: String,
    /// Host application version
    pub app_version: String,
}

/// Assembled attribution report, built once per activation
#[derive(Debug, Clone)]
pub struct ReportRequest {
    query: String,
}

impl ReportRequest {
    /// Assemble the ordered parameter string plus any referral fragment
    pub fn build(
        identity: &DeviceIdentity,
        app_id: &str,
        facts: &DeviceFacts,
        referral: Option<&str>,
    ) -> Self {
        let fields: [(&str, &str); 9] = [
            (PARAM_DEVICE_ID, &identity.device_id),
            (PARAM_DEVICE_NAME, &facts.device_name),
            (PARAM_DEVICE_TYPE, PLATFORM_TAG),
            (PARAM_OS_VERSION, &facts.os_version),
            (PARAM_COUNTRY_CODE, &facts.country_code),
            (PARAM_LANGUAGE, &facts.language_code),
            (PARAM_APP_ID, app_id),
            (PARAM_APP_VERSION, &facts.app_version),
            (PARAM_LIBRARY_VERSION, LIBRARY_VERSION),
        ];

        let mut query = fields
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("&");

        // referral carries its own parameter name, e.g. "referrer=com.example.tapX"
        if let Some(referral) = referral.filter(|r| !r.is_empty()) {
            query.push('&');
            query.push_str(referral);
        }

        Self { query }
    }

    /// The `&`-joined parameter string
    pub fn query(&self) -> &str {
        &self.query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(id: &str) -> DeviceIdentity {
        DeviceIdentity {
            device_id: id.to_string(),
            emulator_generated: false,
        }
    }

    fn facts() -> DeviceFacts {
        DeviceFacts {
            hardware_id: None,
            device_name: "Pixel 4a".to_string(),
            os_version: "11".to_string(),
            country_code: "US".to_string(),
            language_code: "en".to_string(),
            app_version: "1.2.3".to_string(),
        }
    }

    #[test]
    fn test_field_order_is_fixed() {
        let request = ReportRequest::build(&identity("abc123"), "42", &facts(), None);
        assert_eq!(
            request.query(),
            "udid=abc123&device_name=Pixel 4a&device_type=android&os_version=11\
             &country_code=US&language=en&app_id=42&app_version=1.2.3&library_version=7.0.1"
        );
    }

    #[test]
    fn test_empty_values_keep_their_fields() {
        let request =
            ReportRequest::build(&identity(""), "42", &DeviceFacts::default(), None);
        assert_eq!(
            request.query(),
            "udid=&device_name=&device_type=android&os_version=\
             &country_code=&language=&app_id=42&app_version=&library_version=7.0.1"
        );
        assert_eq!(request.query().matches('&').count(), 8);
    }

    #[test]
    fn test_referral_appended_verbatim() {
        let request = ReportRequest::build(
            &identity("abc123"),
            "42",
            &facts(),
            Some("referrer=com.example.campaign"),
        );
        assert!(request
            .query()
            .ends_with("library_version=7.0.1&referrer=com.example.campaign"));
    }

    #[test]
    fn test_empty_referral_not_appended() {
        let request = ReportRequest::build(&identity("abc123"), "42", &facts(), Some(""));
        assert!(request.query().ends_with("library_version=7.0.1"));
    }
}
