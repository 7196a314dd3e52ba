use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

use crate::preview::prepare_preview_content;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding_label: String,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to read {path}: {message}")]
    ReadFailure { path: String, message: String },
}

/// Decode raw bytes into UTF-8 using: BOM -> strict UTF-8 -> chardetng fallback.
///
/// Never fails: malformed sequences become U+FFFD, as a browser's text reader does.
pub fn decode_text(bytes: &[u8]) -> DecodedText {
    // 1) BOM aware decode using encoding_rs helper
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    // 2) Plain UTF-8 covers nearly every CSV and text export
    if std::str::from_utf8(bytes).is_ok() {
        return decode_with(bytes, UTF_8);
    }

    // 3) chardetng detection for legacy single-byte exports
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let enc = detector.guess(None, true);
    decode_with(bytes, enc)
}

/// Reads a picked file and turns it into preview text capped at `max_bytes`.
pub async fn read_preview(path: &Path, max_bytes: usize) -> Result<DecodedText, DecodeError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| DecodeError::ReadFailure {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
    let decoded = decode_text(&bytes);
    Ok(DecodedText {
        text: prepare_preview_content(&decoded.text, max_bytes),
        encoding_label: decoded.encoding_label,
    })
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> DecodedText {
    let (text, _, _) = enc.decode(bytes);
    DecodedText {
        text: text.into_owned(),
        encoding_label: enc.name().to_string(),
    }
}
