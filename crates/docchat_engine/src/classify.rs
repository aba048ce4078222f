use serde::Deserialize;
use serde_json::Value;

use crate::FailureKind;

const NO_DOCUMENT_CODE: &str = "NO_DOCUMENT";
const INTERNAL_ERROR_CODE: &str = "INTERNAL_ERROR";

/// Phrases a service uses when it has nothing ingested yet.
const NO_DOCUMENT_HINTS: &[&str] = &[
    "upload a file first",
    "upload a pdf first",
    "vectorstore not created",
    "no document",
];

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default, alias = "reason")]
    code: Option<String>,
    #[serde(default)]
    detail: Option<Value>,
}

/// Classify a non-2xx `/query` response.
///
/// An explicit `code`/`reason` discriminator wins. Without one, any 4xx is
/// taken as "no document", and so is a 5xx whose `detail` says so.
pub fn classify_query_failure(status: u16, body: &[u8]) -> FailureKind {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();

    match parsed.code.as_deref().map(str::trim) {
        Some(code) if code.eq_ignore_ascii_case(NO_DOCUMENT_CODE) => {
            return FailureKind::NoDocument;
        }
        Some(code) if code.eq_ignore_ascii_case(INTERNAL_ERROR_CODE) => {
            return FailureKind::HttpStatus(status);
        }
        _ => {}
    }

    if (400..500).contains(&status) {
        return FailureKind::NoDocument;
    }

    let detail = match parsed.detail {
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
        None => String::from_utf8_lossy(body).into_owned(),
    }
    .to_ascii_lowercase();

    if NO_DOCUMENT_HINTS.iter().any(|hint| detail.contains(hint)) {
        FailureKind::NoDocument
    } else {
        FailureKind::HttpStatus(status)
    }
}
