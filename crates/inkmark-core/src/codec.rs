//! Encode/decode of editor annotation state stored in the PDF catalog.
//!
//! The persisted form is a single catalog entry whose value is a PDF hex
//! string wrapping UTF-8 JSON. Hex strings are binary-safe: a PDF writer
//! cannot reinterpret them the way it can a literal text string, which is
//! how earlier releases of this tool corrupted non-ASCII annotations.
//!
//! Decoding must still read documents written by those earlier releases, so
//! the catalog value is classified into an exhaustive sum type and each
//! historical shape gets its own recovery path. Anything unrecoverable
//! degrades to "no annotations" rather than erroring: the sidecar is
//! advisory relative to the underlying PDF, and resurrecting malformed
//! state is worse than a clean empty session.

use lopdf::{Object, StringFormat};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use inkmark_types::{RedactionArea, TextObject};

use crate::error::EditorError;

/// Catalog key under which the editor state is stored.
pub const CUSTOM_DATA_KEY: &str = "com.inkmark.pdfeditor.customdata";

/// The persisted subset of the editing session. Field names are the wire
/// format; `pageOrder` is deliberately not part of it (view order is
/// session-only).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomData {
    pub text_objects: Vec<TextObject>,
    pub redaction_areas: Vec<RedactionArea>,
}

impl CustomData {
    pub fn is_empty(&self) -> bool {
        self.text_objects.is_empty() && self.redaction_areas.is_empty()
    }
}

/// Classification of whatever occupies the custom-data catalog key.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogValue {
    /// Hex-format string: the current on-disk form. Bytes are the decoded
    /// payload (UTF-8 JSON).
    Hex(Vec<u8>),
    /// Literal-format string written by an older release; raw bytes with
    /// unknown text encoding.
    LegacyString(Vec<u8>),
    /// No entry under the key.
    Absent,
    /// Some other object type entirely.
    Unknown,
}

impl CatalogValue {
    /// Classify the raw catalog entry, if any.
    pub fn classify(entry: Option<&Object>) -> Self {
        match entry {
            None => CatalogValue::Absent,
            Some(Object::String(bytes, StringFormat::Hexadecimal)) => {
                CatalogValue::Hex(bytes.clone())
            }
            Some(Object::String(bytes, StringFormat::Literal)) => {
                CatalogValue::LegacyString(bytes.clone())
            }
            Some(_) => CatalogValue::Unknown,
        }
    }
}

/// Serialize annotation state into the catalog value for an editable save.
pub fn encode(data: &CustomData) -> Result<Object, EditorError> {
    let json = serde_json::to_string(data).map_err(|e| EditorError::Encode(e.to_string()))?;
    debug!(bytes = json.len(), "encoded custom data as UTF-8 JSON");
    Ok(Object::String(
        json.into_bytes(),
        StringFormat::Hexadecimal,
    ))
}

/// Decode a classified catalog value back into annotation state.
///
/// Returns `None` for absent, unrecognized, or corrupt values — never an
/// error. Acceptance is all-or-nothing: the JSON must be an object carrying
/// both `textObjects` and `redactionAreas` as arrays.
pub fn decode(value: CatalogValue) -> Option<CustomData> {
    let json = match value {
        CatalogValue::Absent => {
            debug!("no custom data entry in catalog");
            return None;
        }
        CatalogValue::Hex(bytes) => match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "hex-string custom data is not valid UTF-8");
                return None;
            }
        },
        CatalogValue::LegacyString(raw) => match decode_legacy_string(&raw) {
            Some(s) => s,
            None => {
                warn!(
                    len = raw.len(),
                    "legacy string custom data is unrecoverable; ignoring"
                );
                return None;
            }
        },
        CatalogValue::Unknown => {
            debug!("custom data entry is not a string object; ignoring");
            return None;
        }
    };

    match serde_json::from_str::<CustomData>(&json) {
        Ok(data) => {
            debug!(
                text_objects = data.text_objects.len(),
                redaction_areas = data.redaction_areas.len(),
                "decoded custom data from catalog"
            );
            Some(data)
        }
        Err(e) => {
            warn!(error = %e, "custom data JSON failed to parse or validate");
            None
        }
    }
}

/// Manual hex-digit pairing: two characters per byte, radix 16. ASCII
/// whitespace between digits is tolerated and an odd trailing digit is
/// padded with zero, both as the PDF spec allows for hex strings. Returns
/// `None` on any non-hex character or an empty payload.
pub fn hex_digits_to_bytes(digits: &str) -> Option<Vec<u8>> {
    let mut nibbles = Vec::with_capacity(digits.len());
    for c in digits.chars() {
        if c.is_ascii_whitespace() {
            continue;
        }
        nibbles.push(c.to_digit(16)? as u8);
    }
    if nibbles.is_empty() {
        return None;
    }
    if nibbles.len() % 2 == 1 {
        nibbles.push(0);
    }
    Some(nibbles.chunks(2).map(|pair| (pair[0] << 4) | pair[1]).collect())
}

/// Best-effort lossless recovery of a legacy literal-string payload.
///
/// Tried in order: the whole payload as hex digits (an early release wrote
/// the hex form inside a literal string), UTF-16BE with BOM (what a generic
/// PDF writer produces for non-ASCII text strings), then strict UTF-8.
/// Anything else is unrecoverable; the old "decode it as a string anyway"
/// fallback produced mojibake for non-ASCII content and was removed.
fn decode_legacy_string(raw: &[u8]) -> Option<String> {
    if raw.is_empty() {
        return None;
    }

    if raw.iter().all(|b| b.is_ascii()) {
        let text = std::str::from_utf8(raw).ok()?;
        if text.chars().all(|c| c.is_ascii_hexdigit() || c.is_ascii_whitespace()) {
            if let Some(bytes) = hex_digits_to_bytes(text) {
                if let Ok(s) = String::from_utf8(bytes) {
                    debug!("recovered legacy custom data from hex-in-literal form");
                    return Some(s);
                }
            }
        }
    }

    if let Some(body) = raw.strip_prefix(&[0xFE, 0xFF]) {
        if body.len() % 2 != 0 {
            return None;
        }
        let units: Vec<u16> = body
            .chunks(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        let s = String::from_utf16(&units).ok()?;
        debug!("recovered legacy custom data from UTF-16BE form");
        return Some(s);
    }

    match std::str::from_utf8(raw) {
        Ok(s) => {
            debug!("recovered legacy custom data from raw UTF-8 bytes");
            Some(s.to_string())
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkmark_types::{Direction, PdfRect};
    use pretty_assertions::assert_eq;

    fn sample_data() -> CustomData {
        let mut text = TextObject::new(
            1,
            PdfRect {
                x: 10.0,
                y: 20.0,
                width: 120.0,
                height: 24.0,
            },
        );
        text.set_text("בדיקה");
        CustomData {
            text_objects: vec![text],
            redaction_areas: vec![RedactionArea::new(
                2,
                PdfRect {
                    x: 50.0,
                    y: 60.0,
                    width: 70.0,
                    height: 80.0,
                },
            )],
        }
    }

    #[test]
    fn roundtrip_through_hex_value() {
        let data = sample_data();
        let obj = encode(&data).unwrap();
        let value = CatalogValue::classify(Some(&obj));
        let decoded = decode(value).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn hebrew_text_survives_roundtrip_exactly() {
        let data = sample_data();
        let obj = encode(&data).unwrap();
        let decoded = decode(CatalogValue::classify(Some(&obj))).unwrap();
        assert_eq!(decoded.text_objects[0].text, "בדיקה");
        assert_eq!(decoded.text_objects[0].direction, Direction::Rtl);
    }

    #[test]
    fn encode_produces_hex_format_string() {
        let obj = encode(&sample_data()).unwrap();
        match obj {
            Object::String(_, StringFormat::Hexadecimal) => {}
            other => panic!("expected hex string, got {:?}", other),
        }
    }

    #[test]
    fn absent_value_decodes_to_none() {
        assert_eq!(CatalogValue::classify(None), CatalogValue::Absent);
        assert!(decode(CatalogValue::Absent).is_none());
    }

    #[test]
    fn unknown_object_type_decodes_to_none() {
        let value = CatalogValue::classify(Some(&Object::Integer(42)));
        assert_eq!(value, CatalogValue::Unknown);
        assert!(decode(value).is_none());
    }

    #[test]
    fn garbage_hex_bytes_decode_to_none() {
        let value = CatalogValue::Hex(vec![0xFF, 0xFE, 0x00, 0x01]);
        assert!(decode(value).is_none());
    }

    #[test]
    fn non_json_payload_decodes_to_none() {
        let value = CatalogValue::Hex(b"this is not json".to_vec());
        assert!(decode(value).is_none());
    }

    #[test]
    fn missing_redaction_areas_key_is_rejected() {
        let value = CatalogValue::Hex(br#"{"textObjects":[]}"#.to_vec());
        assert!(decode(value).is_none());
    }

    #[test]
    fn missing_text_objects_key_is_rejected() {
        let value = CatalogValue::Hex(br#"{"redactionAreas":[]}"#.to_vec());
        assert!(decode(value).is_none());
    }

    #[test]
    fn non_array_fields_are_rejected() {
        let value =
            CatalogValue::Hex(br#"{"textObjects":{},"redactionAreas":[]}"#.to_vec());
        assert!(decode(value).is_none());
    }

    #[test]
    fn empty_arrays_are_accepted() {
        let value =
            CatalogValue::Hex(br#"{"textObjects":[],"redactionAreas":[]}"#.to_vec());
        let data = decode(value).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn legacy_utf8_literal_is_recovered() {
        let data = sample_data();
        let json = serde_json::to_string(&data).unwrap();
        let value = CatalogValue::LegacyString(json.into_bytes());
        let decoded = decode(value).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn legacy_hex_in_literal_is_recovered() {
        let data = sample_data();
        let json = serde_json::to_string(&data).unwrap();
        let hex: String = json.bytes().map(|b| format!("{:02x}", b)).collect();
        let value = CatalogValue::LegacyString(hex.into_bytes());
        let decoded = decode(value).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn legacy_utf16be_literal_is_recovered() {
        let data = sample_data();
        let json = serde_json::to_string(&data).unwrap();
        let mut raw = vec![0xFE, 0xFF];
        for unit in json.encode_utf16() {
            raw.extend_from_slice(&unit.to_be_bytes());
        }
        let decoded = decode(CatalogValue::LegacyString(raw)).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn unrecoverable_legacy_string_decodes_to_none() {
        // Invalid UTF-8, no BOM, not hex digits: must be None, not a lossy
        // as-string interpretation.
        let raw = vec![0x7B, 0xE0, 0x22, 0xFF, 0x80];
        assert!(decode(CatalogValue::LegacyString(raw)).is_none());
    }

    #[test]
    fn truncated_utf16_literal_decodes_to_none() {
        let raw = vec![0xFE, 0xFF, 0x00];
        assert!(decode(CatalogValue::LegacyString(raw)).is_none());
    }

    #[test]
    fn hex_digit_pairing_basics() {
        assert_eq!(hex_digits_to_bytes("48656c6c6f").unwrap(), b"Hello");
        assert_eq!(hex_digits_to_bytes("48 65 6C\n6c 6f").unwrap(), b"Hello");
    }

    #[test]
    fn hex_digit_pairing_pads_odd_length() {
        // PDF spec: a missing final digit is taken as zero.
        assert_eq!(hex_digits_to_bytes("901fa").unwrap(), vec![0x90, 0x1f, 0xa0]);
    }

    #[test]
    fn hex_digit_pairing_rejects_garbage() {
        assert!(hex_digits_to_bytes("").is_none());
        assert!(hex_digits_to_bytes("xyz").is_none());
        assert!(hex_digits_to_bytes("12g4").is_none());
    }

    #[test]
    fn resave_of_decoded_data_is_identical() {
        let data = sample_data();
        let first = encode(&data).unwrap();
        let decoded = decode(CatalogValue::classify(Some(&first))).unwrap();
        let second = encode(&decoded).unwrap();
        assert_eq!(first, second);
    }
}
