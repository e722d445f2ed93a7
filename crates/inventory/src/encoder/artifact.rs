//! Rendered scan artifact: image bytes ready for inline display or download.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use depot_core::DomainResult;

/// Image bytes of a rendered identifier.
///
/// Serialized as a base64 string so records stay JSON-friendly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanArtifact(#[serde(with = "base64_bytes")] Vec<u8>);

impl ScanArtifact {
    /// MIME type of every artifact this crate renders.
    pub const MEDIA_TYPE: &'static str = "image/svg+xml";

    /// File extension matching [`Self::MEDIA_TYPE`].
    pub const FILE_EXTENSION: &'static str = "svg";

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    /// `data:` URI suitable for an `<img src=...>` attribute.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", Self::MEDIA_TYPE, self.to_base64())
    }

    /// Read the identifier payload back out of the artifact.
    pub fn decode(&self) -> DomainResult<String> {
        super::decode_artifact(&self.0)
    }
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
