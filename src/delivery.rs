use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::ser::{Serialize, SerializeStruct, Serializer};

pub const DEFAULT_FILENAME: &str = "Incident_Report.pdf";
const MIME_TYPE: &str = "application/octet-stream";

/// A rendered document as base64 text, ready to embed as a download link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPayload {
    pub filename: String,
    pub mime_type: String,
    pub base64: String,
}

impl DownloadPayload {
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }
}

impl Serialize for DownloadPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DownloadPayload", 4)?;
        state.serialize_field("filename", &self.filename)?;
        state.serialize_field("mime_type", &self.mime_type)?;
        state.serialize_field("base64", &self.base64)?;
        state.serialize_field("data_uri", &self.data_uri())?;
        state.end()
    }
}

pub fn encode(bytes: &[u8], filename: &str) -> DownloadPayload {
    DownloadPayload {
        filename: filename.to_string(),
        mime_type: MIME_TYPE.to_string(),
        base64: BASE64.encode(bytes),
    }
}
