#![allow(dead_code)]

//! PDF codec — decode, re-encode, and validate the binary resume payload.
//!
//! Parsing goes through lopdf, which walks the trailer and cross-reference
//! table; anything it rejects is reported as `MalformedDocument` before a
//! single agent is dispatched.

use anyhow::anyhow;
use bytes::Bytes;

use crate::errors::AppError;

/// Media type sent alongside the document bytes on the capability egress.
pub const MEDIA_TYPE: &str = "application/pdf";

/// An immutable, validated PDF payload.
///
/// Cloning is cheap (`Bytes` is reference-counted), so every agent task gets
/// its own logical copy of the document without duplicating the payload.
#[derive(Debug, Clone)]
pub struct Document {
    bytes: Bytes,
    page_count: usize,
}

impl Document {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }
}

/// Parses a raw payload into a validated [`Document`].
/// Zero-page documents are rejected: there is nothing for an agent to review.
pub fn decode(raw: &[u8]) -> Result<Document, AppError> {
    let parsed = lopdf::Document::load_mem(raw)
        .map_err(|e| AppError::MalformedDocument(format!("not a well-formed PDF: {e}")))?;

    let page_count = parsed.get_pages().len();
    if page_count == 0 {
        return Err(AppError::MalformedDocument(
            "PDF contains no pages".to_string(),
        ));
    }

    Ok(Document {
        bytes: Bytes::copy_from_slice(raw),
        page_count,
    })
}

/// Re-serializes a document for egress.
///
/// Output is structurally valid but not guaranteed byte-identical to the
/// ingress payload (lopdf rewrites the xref table on save).
pub fn encode(document: &Document) -> Result<Vec<u8>, AppError> {
    let mut parsed = lopdf::Document::load_mem(document.as_bytes())
        .map_err(|e| AppError::Internal(anyhow!("held document failed to re-parse: {e}")))?;

    let mut out = Vec::new();
    parsed
        .save_to(&mut out)
        .map_err(|e| AppError::Internal(anyhow!("failed to re-serialize PDF: {e}")))?;

    Ok(out)
}

/// Returns true iff `raw` would decode successfully.
pub fn validate(raw: &[u8]) -> bool {
    decode(raw).is_ok()
}


#[cfg(test)]
mod tests {
    use super::testing::sample_pdf;
    use super::*;

    #[test]
    fn test_decode_single_page() {
        let doc = decode(&sample_pdf(1)).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert!(!doc.is_empty());
    }

    #[test]
    fn test_decode_counts_all_pages() {
        let doc = decode(&sample_pdf(3)).unwrap();
        assert_eq!(doc.page_count(), 3);
    }

    #[test]
    fn test_encode_output_revalidates() {
        let doc = decode(&sample_pdf(2)).unwrap();
        let encoded = encode(&doc).unwrap();
        assert!(validate(&encoded));
        assert_eq!(decode(&encoded).unwrap().page_count(), 2);
    }

    #[test]
    fn test_garbage_input_is_malformed() {
        let err = decode(b"this is definitely not a pdf").unwrap_err();
        assert!(matches!(err, AppError::MalformedDocument(_)));
    }

    #[test]
    fn test_empty_input_is_malformed() {
        assert!(matches!(
            decode(&[]).unwrap_err(),
            AppError::MalformedDocument(_)
        ));
    }

    #[test]
    fn test_truncated_input_is_malformed() {
        let bytes = sample_pdf(1);
        let truncated = &bytes[..bytes.len() / 2];
        assert!(!validate(truncated));
    }

    #[test]
    fn test_zero_page_document_rejected() {
        let err = decode(&sample_pdf(0)).unwrap_err();
        assert!(matches!(err, AppError::MalformedDocument(_)));
    }

    #[test]
    fn test_clone_shares_payload() {
        let doc = decode(&sample_pdf(1)).unwrap();
        let copy = doc.clone();
        assert_eq!(doc.as_bytes(), copy.as_bytes());
        assert_eq!(doc.page_count(), copy.page_count());
    }
}
