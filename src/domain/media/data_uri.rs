//! Data URI value object for inline media payloads.
//!
//! All images and audio exchanged with the model travel as
//! `data:<mime>;base64,<data>` strings.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Standard alphabet, tolerant of missing padding and trailing bits.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Strict encoder used when building data URIs from bytes.
const STRICT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, GeneralPurposeConfig::new());

/// Errors from parsing a data URI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataUriError {
    #[error("data URI must start with 'data:'")]
    MissingScheme,

    #[error("data URI must be base64 encoded")]
    NotBase64,

    #[error("data URI has no MIME type")]
    MissingMimeType,

    #[error("data URI has no payload")]
    EmptyPayload,

    #[error("data URI payload is not valid base64: {0}")]
    InvalidPayload(String),
}

/// A validated `data:<mime>;base64,<data>` string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataUri {
    raw: String,
    mime_len: usize,
}

impl DataUri {
    const SCHEME: &'static str = "data:";
    const MARKER: &'static str = ";base64";

    /// Parses and validates a data URI.
    ///
    /// # Errors
    ///
    /// Returns `DataUriError` if the scheme, MIME type, base64 marker or
    /// payload is missing or malformed.
    pub fn parse(input: &str) -> Result<Self, DataUriError> {
        let rest = input
            .strip_prefix(Self::SCHEME)
            .ok_or(DataUriError::MissingScheme)?;
        let (header, payload) = rest.split_once(',').ok_or(DataUriError::NotBase64)?;
        let mime = header
            .strip_suffix(Self::MARKER)
            .ok_or(DataUriError::NotBase64)?;

        if mime.trim().is_empty() {
            return Err(DataUriError::MissingMimeType);
        }
        if payload.is_empty() {
            return Err(DataUriError::EmptyPayload);
        }
        LENIENT
            .decode(payload)
            .map_err(|e| DataUriError::InvalidPayload(e.to_string()))?;

        Ok(Self {
            raw: input.to_string(),
            mime_len: mime.len(),
        })
    }

    /// Encodes raw bytes into a data URI with the given MIME type.
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        Self {
            raw: format!("{}{}{},{}", Self::SCHEME, mime, Self::MARKER, STRICT.encode(bytes)),
            mime_len: mime.len(),
        }
    }

    /// Returns the MIME type (e.g. `image/png`).
    pub fn mime_type(&self) -> &str {
        &self.raw[Self::SCHEME.len()..Self::SCHEME.len() + self.mime_len]
    }

    /// Returns true if the payload is an image.
    pub fn is_image(&self) -> bool {
        self.mime_type().starts_with("image/")
    }

    /// Returns the base64 payload.
    pub fn payload(&self) -> &str {
        let start = Self::SCHEME.len() + self.mime_len + Self::MARKER.len() + 1;
        &self.raw[start..]
    }

    /// Decodes the payload bytes.
    pub fn decode(&self) -> Result<Vec<u8>, DataUriError> {
        LENIENT
            .decode(self.payload())
            .map_err(|e| DataUriError::InvalidPayload(e.to_string()))
    }

    /// Returns the full data URI string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn into_string(self) -> String {
        self.raw
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl FromStr for DataUri {
    type Err = DataUriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_unpadded_image_payload() {
        let uri = DataUri::parse("data:image/png;base64,AAA").unwrap();
        assert_eq!(uri.mime_type(), "image/png");
        assert_eq!(uri.payload(), "AAA");
        assert!(uri.is_image());
    }

    #[test]
    fn rejects_missing_scheme() {
        assert_eq!(
            DataUri::parse("https://example.com/cat.png"),
            Err(DataUriError::MissingScheme)
        );
    }

    #[test]
    fn rejects_non_base64_data_uri() {
        assert_eq!(
            DataUri::parse("data:text/plain,hello"),
            Err(DataUriError::NotBase64)
        );
    }

    #[test]
    fn rejects_missing_mime_and_payload() {
        assert_eq!(
            DataUri::parse("data:;base64,AAAA"),
            Err(DataUriError::MissingMimeType)
        );
        assert_eq!(
            DataUri::parse("data:image/png;base64,"),
            Err(DataUriError::EmptyPayload)
        );
    }

    #[test]
    fn rejects_invalid_payload_characters() {
        let err = DataUri::parse("data:image/png;base64,not*base64!").unwrap_err();
        assert!(matches!(err, DataUriError::InvalidPayload(_)));
    }

    #[test]
    fn from_bytes_encodes_payload() {
        let uri = DataUri::from_bytes("audio/wav", b"RIFF");
        assert_eq!(uri.as_str(), "data:audio/wav;base64,UklGRg==");
        assert_eq!(uri.decode().unwrap(), b"RIFF".to_vec());
        assert!(!uri.is_image());
    }
}
