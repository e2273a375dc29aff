//! Acknowledgement parsing
//!
//! The attribution service answers with a small XML document; the report
//! counts as acknowledged only when the `Success` element's trimmed text
//! content is the literal string `"true"`. Everything else — malformed
//! documents, a missing element, any other content — fails closed.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Error, Result};

const SUCCESS_TAG: &[u8] = b"Success";

/// Parse the server acknowledgement into the reporting verdict
pub fn parse(body: &[u8]) -> bool {
    evaluate(body).is_ok()
}

/// Tagged form of [`parse`], distinguishing malformed documents from
/// negative acknowledgements for logging and tests
pub fn evaluate(body: &[u8]) -> Result<()> {
    match success_value(body)? {
        Some(value) if value == "true" => Ok(()),
        _ => Err(Error::NegativeAck),
    }
}

/// Trimmed text content of the first `Success` element, if any
///
/// Only direct text and CDATA children are concatenated, in document order;
/// nested elements are skipped. An empty-after-trim value counts as absent.
fn success_value(body: &[u8]) -> Result<Option<String>> {
    let mut reader = Reader::from_reader(body);
    let mut buf = Vec::new();

    let mut capturing = false;
    let mut depth = 0usize;
    let mut value = String::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| Error::Response(format!("invalid xml: {}", e)))?;

        match event {
            Event::Start(ref e) if !capturing && e.name().as_ref() == SUCCESS_TAG => {
                capturing = true;
            }
            Event::Start(_) if capturing => depth += 1,
            Event::End(ref e) if capturing => {
                if depth > 0 {
                    depth -= 1;
                } else if e.name().as_ref() == SUCCESS_TAG {
                    break;
                }
            }
            Event::Text(ref t) if capturing && depth == 0 => {
                let text = t
                    .unescape()
                    .map_err(|e| Error::Response(format!("invalid xml text: {}", e)))?;
                value.push_str(&text);
            }
            Event::CData(ref t) if capturing && depth == 0 => {
                value.push_str(&String::from_utf8_lossy(t));
            }
            Event::Eof if capturing => {
                return Err(Error::Response("unexpected end of document".to_string()));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }

        buf.clear();
    }

    let trimmed = value.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}
