use reqwest::blocking::multipart::{Form, Part};

use crate::attributes::domain::attribute_client::{AttributeClient, AttributeError};
use crate::attributes::domain::raw::DetectResponse;

/// Blocking HTTP client for the local attribute proxy.
///
/// The proxy owns the upstream credentials; this client only ever talks to
/// `{base_url}/detect`, `{base_url}/analyze` and `{base_url}/status`.
pub struct HttpAttributeClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl HttpAttributeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::blocking::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl AttributeClient for HttpAttributeClient {
    fn detect_face(&self, jpeg: &[u8]) -> Result<DetectResponse, AttributeError> {
        let part = Part::bytes(jpeg.to_vec())
            .file_name("image.jpg")
            .mime_str("image/jpeg")?;
        let form = Form::new().part("image", part);

        let response = self
            .http
            .post(format!("{}/detect", self.base_url))
            .multipart(form)
            .send()?;

        if !response.status().is_success() {
            return Err(AttributeError::Http {
                status: response.status().as_u16(),
            });
        }

        Ok(response.json()?)
    }

    fn analyze_face(&self, face_token: &str) -> Result<DetectResponse, AttributeError> {
        let response = self
            .http
            .post(format!("{}/analyze", self.base_url))
            .json(&serde_json::json!({ "face_token": face_token }))
            .send()?;

        if !response.status().is_success() {
            return Err(AttributeError::Http {
                status: response.status().as_u16(),
            });
        }

        Ok(response.json()?)
    }

    fn status(&self) -> bool {
        self.http
            .get(format!("{}/status", self.base_url))
            .send()
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}
