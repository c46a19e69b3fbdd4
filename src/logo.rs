//! Logo loading: local image files become embeddable data URIs

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;
use tracing::debug;

use crate::error::{Error, Result};

/// MIME type used when the file extension says nothing useful
pub const FALLBACK_MIME: &str = "application/octet-stream";

/// A `data:<mime>;base64,<payload>` reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri(String);

impl DataUri {
    pub fn encode(mime: &str, bytes: &[u8]) -> Self {
        DataUri(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
    }

    /// Wrap an existing URI string after checking its shape
    pub fn parse(uri: &str) -> Result<Self> {
        let uri = DataUri(uri.to_string());
        uri.header()?;
        Ok(uri)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Declared MIME type
    pub fn mime(&self) -> Result<&str> {
        let header = self.header()?;
        Ok(header.split(';').next().unwrap_or_default())
    }

    /// Decode the payload back into raw bytes
    pub fn decode(&self) -> Result<Vec<u8>> {
        let header = self.header()?;
        let payload = &self.0[header.len() + "data:".len() + 1..];
        if header.ends_with(";base64") {
            STANDARD
                .decode(payload.trim())
                .map_err(|e| Error::InvalidDataUri(format!("base64 payload: {}", e)))
        } else {
            Ok(payload.as_bytes().to_vec())
        }
    }

    fn header(&self) -> Result<&str> {
        let rest = self
            .0
            .strip_prefix("data:")
            .ok_or_else(|| Error::InvalidDataUri("missing data: prefix".to_string()))?;
        let (header, _) = rest
            .split_once(',')
            .ok_or_else(|| Error::InvalidDataUri("missing payload separator".to_string()))?;
        Ok(header)
    }
}

/// Guess a MIME type from the file extension, as a file picker would
pub fn mime_for_path(path: &Path) -> &'static str {
    let is_svg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
    if is_svg {
        return "image/svg+xml";
    }
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type())
        .unwrap_or(FALLBACK_MIME)
}

/// Read a user-chosen file into a data URI
///
/// Content is not validated; a non-image file still loads and simply fails to
/// draw later.
pub async fn load_logo(path: &Path) -> Result<DataUri> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let bytes = tokio::fs::read(path).await?;
    let mime = mime_for_path(path);
    debug!(path = %path.display(), mime, bytes = bytes.len(), "loaded logo");

    Ok(DataUri::encode(mime, &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_data_uri_round_trip() {
        let uri = DataUri::encode("image/png", &[0x89, b'P', b'N', b'G']);
        assert!(uri.as_str().starts_with("data:image/png;base64,"));
        assert_eq!(uri.mime().unwrap(), "image/png");
        assert_eq!(uri.decode().unwrap(), vec![0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_parse_rejects_non_data_uri() {
        assert!(matches!(
            DataUri::parse("https://example.com/logo.png"),
            Err(Error::InvalidDataUri(_))
        ));
        assert!(matches!(DataUri::parse("data:image/png"), Err(Error::InvalidDataUri(_))));
    }

    #[test]
    fn test_plain_payload_decodes_as_text() {
        let uri = DataUri::parse("data:image/svg+xml,<svg/>").unwrap();
        assert_eq!(uri.decode().unwrap(), b"<svg/>".to_vec());
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("logo.PNG")), "image/png");
        assert_eq!(mime_for_path(Path::new("logo.jpg")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("logo.svg")), "image/svg+xml");
        assert_eq!(mime_for_path(Path::new("notes.txt")), FALLBACK_MIME);
    }

    #[tokio::test]
    async fn test_load_logo_accepts_any_file() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"not an image").unwrap();

        let uri = load_logo(file.path()).await.unwrap();
        assert_eq!(uri.mime().unwrap(), FALLBACK_MIME);
        assert_eq!(uri.decode().unwrap(), b"not an image".to_vec());
    }

    #[tokio::test]
    async fn test_load_logo_missing_file() {
        let result = load_logo(Path::new("does-not-exist.png")).await;
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }
}
