//! Asset Loader
//!
//! Reads the template and the two certificate images. Images become base64
//! data URIs so every rendered document is self-contained.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, SantaError};
use crate::templates::Template;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Svg,
}

impl ImageFormat {
    /// Format declared by the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        [Self::Png, Self::Jpeg, Self::Gif, Self::Webp, Self::Svg]
            .into_iter()
            .find(|f| f.mime() == mime)
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
            Self::Svg => "image/svg+xml",
        }
    }
}

/// Image bytes as base64 text, tagged with their content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAsset {
    format: ImageFormat,
    payload: String,
}

impl EncodedAsset {
    pub fn encode(format: ImageFormat, bytes: &[u8]) -> Self {
        Self {
            format,
            payload: STANDARD.encode(bytes),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let format = ImageFormat::from_path(path).ok_or_else(|| SantaError::UnsupportedImage {
            path: path.to_path_buf(),
        })?;
        let bytes = fs::read(path).map_err(|e| SantaError::io(path, e))?;
        debug!(path = %path.display(), mime = format.mime(), bytes = bytes.len(), "encoded image");
        Ok(Self::encode(format, &bytes))
    }

    /// Parse `data:<mime>;base64,<payload>`.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| SantaError::DataUri("missing 'data:' prefix".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| SantaError::DataUri("missing ',' separator".into()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| SantaError::DataUri("only base64 data URIs are supported".into()))?;
        let format = ImageFormat::from_mime(mime)
            .ok_or_else(|| SantaError::DataUri(format!("unsupported content type '{mime}'")))?;
        // validation only; `decode` produces the bytes on demand
        STANDARD
            .decode(payload)
            .map_err(|e| SantaError::DataUri(e.to_string()))?;

        Ok(Self {
            format,
            payload: payload.to_string(),
        })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.format.mime(), self.payload)
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(&self.payload)
            .map_err(|e| SantaError::DataUri(e.to_string()))
    }
}

/// Everything the renderer needs, loaded once per run.
#[derive(Debug, Clone)]
pub struct CertificateAssets {
    pub template: Template,
    pub tree: EncodedAsset,
    pub seal: EncodedAsset,
}

impl CertificateAssets {
    pub fn load(template: &Path, tree: &Path, seal: &Path) -> Result<Self> {
        let text = fs::read_to_string(template).map_err(|e| SantaError::io(template, e))?;
        debug!(path = %template.display(), bytes = text.len(), "loaded template");
        let template = Template::parse(&text)?;

        Ok(Self {
            template,
            tree: EncodedAsset::load(tree)?,
            seal: EncodedAsset::load(seal)?,
        })
    }
}
