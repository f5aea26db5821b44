use std::env;

pub const DEFAULT_PORT: u16 = 3000;

const DETECT_URL: &str = "https://api-us.faceplusplus.com/facepp/v3/detect";
const ANALYZE_URL: &str = "https://api-us.faceplusplus.com/facepp/v3/face/analyze";

/// Proxy configuration: upstream credentials from the environment, listen
/// port from the CLI or `PORT`. The placeholder credential defaults keep
/// the server bootable for local development; upstream calls will simply
/// be rejected until real keys are provided.
#[derive(Clone, Debug)]
pub struct ProxyConfig {
    pub api_key: String,
    pub api_secret: String,
    pub port: u16,
    pub detect_url: String,
    pub analyze_url: String,
}

impl ProxyConfig {
    pub fn from_env(port_override: Option<u16>) -> Self {
        let port = port_override
            .or_else(|| env::var("PORT").ok().and_then(|p| p.parse().ok()))
            .unwrap_or(DEFAULT_PORT);

        Self {
            api_key: env::var("FACE_API_KEY").unwrap_or_else(|_| "your_api_key_here".to_string()),
            api_secret: env::var("FACE_API_SECRET")
                .unwrap_or_else(|_| "your_api_secret_here".to_string()),
            port,
            detect_url: DETECT_URL.to_string(),
            analyze_url: ANALYZE_URL.to_string(),
        }
    }
}
