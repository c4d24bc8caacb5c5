//! Conversion event payloads, outcomes and status texts

use std::path::PathBuf;
use thiserror::Error;

pub const STATUS_DONE: &str = "Pronto! O download deve ter iniciado.";
pub const STATUS_CONVERSION_ERROR: &str = "Erro na conversão.";
pub const STATUS_NETWORK_ERROR: &str = "Erro de rede.";
pub const STATUS_UNEXPECTED: &str = "Falha inesperada.";
pub const STATUS_BUSY: &str = "Conversão em andamento.";

/// Upload progress payload, emitted for every chunk of attachment data sent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvertProgress {
    pub sent_bytes: u64,
    pub total_bytes: u64,
    pub percent: f64, // 0..=100, one decimal place
}

impl ConvertProgress {
    /// `None` when the total is not computable (nothing with a known length to send)
    pub fn new(sent_bytes: u64, total_bytes: u64) -> Option<Self> {
        if total_bytes == 0 {
            return None;
        }
        let raw = (sent_bytes as f64 / total_bytes as f64) * 100.0;
        let percent = ((raw.clamp(0.0, 100.0)) * 10.0).round() / 10.0;
        Some(Self {
            sent_bytes,
            total_bytes,
            percent,
        })
    }

    pub fn label(&self) -> String {
        format!("{:.1}%", self.percent)
    }
}

/// A converted book written to disk
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedFile {
    pub file_name: String,
    pub path: PathBuf,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    /// The service answered with anything other than 200
    #[error("conversion failed with status {status}")]
    Server { status: u16, detail: Option<String> },
    /// The request or its response did not make it across
    #[error("network error: {0}")]
    Network(String),
    /// Local failure while preparing the request or saving the result
    #[error("unexpected failure: {0}")]
    Unexpected(String),
    /// Another submission on the same handler has not settled yet
    #[error("a conversion is already in progress")]
    Busy,
}

impl ConvertError {
    /// Status text shown to the user for this outcome
    pub fn user_message(&self) -> String {
        match self {
            ConvertError::Server {
                detail: Some(detail),
                ..
            } => detail.clone(),
            ConvertError::Server { detail: None, .. } => STATUS_CONVERSION_ERROR.to_string(),
            ConvertError::Network(_) => STATUS_NETWORK_ERROR.to_string(),
            ConvertError::Unexpected(_) => STATUS_UNEXPECTED.to_string(),
            ConvertError::Busy => STATUS_BUSY.to_string(),
        }
    }
}

/// Pull a displayable `detail` out of an error response body.
///
/// Strings, non-zero numbers and `true` are shown as text; FastAPI validation
/// errors arrive as a list of objects and are joined by their `msg`. Empty,
/// zero, `false` and `null` values count as absent.
pub fn detail_from_body(body: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(body);
    let parsed: serde_json::Value = serde_json::from_str(&text).ok()?;
    match parsed.get("detail")? {
        serde_json::Value::String(detail) if !detail.is_empty() => Some(detail.clone()),
        serde_json::Value::Number(number) if number.as_f64() != Some(0.0) => {
            Some(number.to_string())
        }
        serde_json::Value::Bool(true) => Some("true".to_string()),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|msg| msg.as_str()))
                .filter(|msg| !msg.is_empty())
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_rounded_to_one_decimal() {
        let progress = ConvertProgress::new(1, 3).unwrap();
        assert_eq!(progress.percent, 33.3);
        assert_eq!(progress.label(), "33.3%");
        assert_eq!(ConvertProgress::new(3, 3).unwrap().label(), "100.0%");
    }

    #[test]
    fn progress_needs_a_known_total() {
        assert!(ConvertProgress::new(10, 0).is_none());
    }

    #[test]
    fn progress_never_leaves_bounds() {
        assert_eq!(ConvertProgress::new(12, 10).unwrap().percent, 100.0);
        assert_eq!(ConvertProgress::new(0, 10).unwrap().percent, 0.0);
    }

    #[test]
    fn detail_string_is_used() {
        assert_eq!(
            detail_from_body(br#"{"detail": "bad file"}"#),
            Some("bad file".to_string())
        );
    }

    #[test]
    fn detail_list_joins_messages() {
        let body = br#"{"detail":[{"loc":["body","file"],"msg":"field required"},{"msg":"value is not a valid integer"}]}"#;
        assert_eq!(
            detail_from_body(body),
            Some("field required; value is not a valid integer".to_string())
        );
    }

    #[test]
    fn scalar_details_are_shown_as_text() {
        assert_eq!(detail_from_body(br#"{"detail": 42}"#), Some("42".to_string()));
        assert_eq!(detail_from_body(br#"{"detail": 2.5}"#), Some("2.5".to_string()));
        assert_eq!(detail_from_body(br#"{"detail": true}"#), Some("true".to_string()));
    }

    #[test]
    fn unusable_bodies_have_no_detail() {
        assert_eq!(detail_from_body(b"Internal Server Error"), None);
        assert_eq!(detail_from_body(br#"{"error": "x"}"#), None);
        assert_eq!(detail_from_body(br#"{"detail": ""}"#), None);
        assert_eq!(detail_from_body(br#"{"detail": 0}"#), None);
        assert_eq!(detail_from_body(br#"{"detail": false}"#), None);
        assert_eq!(detail_from_body(br#"{"detail": null}"#), None);
        assert_eq!(detail_from_body(br#"[1, 2]"#), None);
        assert_eq!(detail_from_body(&[0xff, 0xfe]), None);
    }

    #[test]
    fn user_messages_follow_the_outcome() {
        let server = ConvertError::Server {
            status: 400,
            detail: Some("Envie um arquivo .pdf".to_string()),
        };
        assert_eq!(server.user_message(), "Envie um arquivo .pdf");
        let generic = ConvertError::Server {
            status: 500,
            detail: None,
        };
        assert_eq!(generic.user_message(), STATUS_CONVERSION_ERROR);
        assert_eq!(
            ConvertError::Network("refused".to_string()).user_message(),
            STATUS_NETWORK_ERROR
        );
        assert_eq!(
            ConvertError::Unexpected("bad profile".to_string()).user_message(),
            STATUS_UNEXPECTED
        );
    }
}
