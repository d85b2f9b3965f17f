//! Discovery response parsing.
//!
//! The envelope carries the ad payload as a JSON *string*
//! (`batchrsp.items[0].item`), which is itself parsed as a second document.

use serde::Deserialize;

use crate::descriptor::ImageDescriptor;
use crate::error::ParseError;

#[derive(Debug, Deserialize)]
struct Envelope {
    batchrsp: BatchResponse,
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    #[serde(default)]
    items: Vec<BatchItem>,
}

#[derive(Debug, Deserialize)]
struct BatchItem {
    item: String,
}

#[derive(Debug, Deserialize)]
struct ItemPayload {
    ad: Ad,
}

#[derive(Debug, Deserialize)]
struct Ad {
    image_fullscreen_001_landscape: ImageRef,
    #[serde(default)]
    title_text: Option<TextRef>,
}

#[derive(Debug, Deserialize)]
struct ImageRef {
    u: String,
}

#[derive(Debug, Deserialize)]
struct TextRef {
    #[serde(default)]
    tx: Option<String>,
}

/// Parse a discovery response body into the descriptor of its first item.
pub(crate) fn parse_discovery(body: &[u8]) -> Result<ImageDescriptor, ParseError> {
    let envelope: Envelope = serde_json::from_slice(body).map_err(ParseError::Envelope)?;
    let first = envelope
        .batchrsp
        .items
        .into_iter()
        .next()
        .ok_or(ParseError::NoItems)?;
    let payload: ItemPayload = serde_json::from_str(&first.item).map_err(ParseError::Payload)?;

    let title = payload.ad.title_text.and_then(|t| t.tx);
    ImageDescriptor::from_parts(&payload.ad.image_fullscreen_001_landscape.u, title.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(item: &str) -> String {
        serde_json::json!({ "batchrsp": { "ver": "1.0", "items": [ { "item": item } ] } }).to_string()
    }

    #[test]
    fn parses_double_encoded_item() {
        let item = r#"{"ad":{"image_fullscreen_001_landscape":{"u":"https://img.example/th/abc123?ver=1"},"title_text":{"tx":"Sunrise over the fjord"}}}"#;
        let d = parse_discovery(envelope(item).as_bytes()).unwrap();
        assert_eq!(d.id(), "abc123");
        assert_eq!(d.url(), "https://img.example/th/abc123?ver=1");
        assert_eq!(d.title(), "Sunrise over the fjord");
    }

    #[test]
    fn missing_title_uses_id() {
        let item = r#"{"ad":{"image_fullscreen_001_landscape":{"u":"https://img.example/th/abc123"}}}"#;
        let d = parse_discovery(envelope(item).as_bytes()).unwrap();
        assert_eq!(d.title(), "abc123");
    }

    #[test]
    fn empty_items_is_parse_error() {
        let err = parse_discovery(br#"{"batchrsp":{"items":[]}}"#).unwrap_err();
        assert!(matches!(err, ParseError::NoItems));
    }

    #[test]
    fn non_json_body_is_parse_error() {
        let err = parse_discovery(b"<html>503</html>").unwrap_err();
        assert!(matches!(err, ParseError::Envelope(_)));
    }

    #[test]
    fn item_missing_image_is_parse_error() {
        let err = parse_discovery(envelope(r#"{"ad":{}}"#).as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::Payload(_)));
    }

    #[test]
    fn item_not_json_is_parse_error() {
        let err = parse_discovery(envelope("not json").as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::Payload(_)));
    }
}
