use reqwest::blocking::multipart::{Form, Part};
use thiserror::Error;

use crate::config::ProxyConfig;

/// Attribute groups requested from the upstream API on every call.
pub const RETURN_ATTRIBUTES: &str = "gender,age,smiling,emotion,ethnicity,beauty,skinstatus";

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
}

/// Forwards reshaped requests to the commercial face-analysis API with the
/// credentials and attribute list injected server-side, so they never
/// reach the client.
pub struct UpstreamClient {
    http: reqwest::blocking::Client,
    config: ProxyConfig,
}

impl UpstreamClient {
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            config,
        }
    }

    /// Uploads image bytes to the upstream detect endpoint and returns the
    /// raw JSON body, relayed verbatim to the caller.
    pub fn detect(&self, image: Vec<u8>, mime: &str) -> Result<String, UpstreamError> {
        let part = Part::bytes(image).file_name("image.jpg").mime_str(mime)?;
        let form = self
            .credential_form()
            .text("return_landmark", "1")
            .text("return_attributes", RETURN_ATTRIBUTES)
            .part("image_file", part);

        self.send(&self.config.detect_url, form)
    }

    /// Re-analyzes a previously detected face by token.
    pub fn analyze(&self, face_token: &str) -> Result<String, UpstreamError> {
        let form = self
            .credential_form()
            .text("face_token", face_token.to_string())
            .text("return_attributes", RETURN_ATTRIBUTES);

        self.send(&self.config.analyze_url, form)
    }

    fn credential_form(&self) -> Form {
        Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("api_secret", self.config.api_secret.clone())
    }

    fn send(&self, url: &str, form: Form) -> Result<String, UpstreamError> {
        let response = self.http.post(url).multipart(form).send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(UpstreamError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}
