use thiserror::Error;

use crate::attributes::domain::raw::DetectResponse;

#[derive(Error, Debug)]
pub enum AttributeError {
    #[error("attribute proxy request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("attribute proxy returned HTTP {status}")]
    Http { status: u16 },
}

/// Client for the remote face-attribute service, reached through the
/// local credential-injecting proxy rather than the upstream API directly.
pub trait AttributeClient: Send + Sync {
    /// Uploads a JPEG face crop and returns the detected faces with their
    /// attribute groups.
    fn detect_face(&self, jpeg: &[u8]) -> Result<DetectResponse, AttributeError>;

    /// Re-analyzes a face by the token of a previous detection, without
    /// re-uploading the image.
    fn analyze_face(&self, face_token: &str) -> Result<DetectResponse, AttributeError>;

    /// Health probe against the proxy. `false` means unreachable or
    /// unhealthy; callers treat this as advisory, not fatal.
    fn status(&self) -> bool;
}
