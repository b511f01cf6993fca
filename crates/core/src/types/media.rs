//! Inline binary payloads carried as data URIs.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Inline media attached to a prompt (e.g. a crop photo).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaPart {
    /// MIME type, e.g. `image/jpeg`.
    pub mime_type: String,
    /// Base64 payload without the data URI prefix.
    pub data: String,
}

impl MediaPart {
    /// Parse `data:<mimetype>;base64,<encoded_data>`.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| Error::validation("photoDataUri", "must start with 'data:'"))?;
        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| Error::validation("photoDataUri", "missing ',' separator"))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| Error::validation("photoDataUri", "must be base64 encoded"))?;

        if mime_type.is_empty() || !mime_type.contains('/') {
            return Err(Error::validation("photoDataUri", "must include a MIME type"));
        }
        if data.is_empty() {
            return Err(Error::validation("photoDataUri", "payload is empty"));
        }
        base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| Error::validation("photoDataUri", format!("invalid base64: {}", e)))?;

        Ok(Self {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }

    /// Build a part from raw bytes.
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_uri() {
        let part = MediaPart::from_data_uri("data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(part.mime_type, "image/png");
        assert_eq!(part.data, "iVBORw0KGgo=");
        assert!(part.is_image());
    }

    #[test]
    fn test_rejects_malformed_uris() {
        assert!(MediaPart::from_data_uri("image/png;base64,AAAA").is_err());
        assert!(MediaPart::from_data_uri("data:image/png,AAAA").is_err());
        assert!(MediaPart::from_data_uri("data:;base64,AAAA").is_err());
        assert!(MediaPart::from_data_uri("data:image/png;base64,").is_err());
        assert!(MediaPart::from_data_uri("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn test_from_bytes() {
        let part = MediaPart::from_bytes("image/jpeg", &[0xFF, 0xD8, 0xFF]);
        assert_eq!(part.data, "/9j/");
    }
}
