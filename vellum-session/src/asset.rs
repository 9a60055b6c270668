//! Ingestion of pasted or uploaded image assets.
//!
//! The host hands the session raw bytes plus a MIME type; the session encodes
//! them as a data URL, stores the result as a blob record, and references it
//! from the document text. Decode failures surface to the caller and never
//! touch the text buffer.

use base64::Engine;

/// A raw asset captured from a paste or upload event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PastedAsset {
    /// MIME type reported by the host (e.g. `image/png`).
    pub mime: String,
    /// Raw payload bytes.
    pub bytes: Vec<u8>,
}

impl PastedAsset {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }
}

/// Asset ingestion errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// The payload was empty.
    EmptyPayload,
    /// The MIME type is not an image type.
    UnsupportedType(String),
}

impl std::fmt::Display for AssetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetError::EmptyPayload => write!(f, "Asset payload is empty"),
            AssetError::UnsupportedType(mime) => {
                write!(f, "Unsupported asset type: {mime}")
            }
        }
    }
}

impl std::error::Error for AssetError {}

/// Encode an asset as a `data:{mime};base64,{payload}` URL.
pub fn encode_data_url(asset: &PastedAsset) -> Result<String, AssetError> {
    if asset.bytes.is_empty() {
        return Err(AssetError::EmptyPayload);
    }
    if !asset.mime.starts_with("image/") {
        return Err(AssetError::UnsupportedType(asset.mime.clone()));
    }

    let payload = base64::engine::general_purpose::STANDARD.encode(&asset.bytes);
    Ok(format!("data:{};base64,{payload}", asset.mime))
}
