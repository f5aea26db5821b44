use std::io::Read;
use std::process;
use std::sync::Arc;
use std::thread;

use clap::Parser;
use serde::Deserialize;
use tiny_http::{Request, Server};

use crate::config::ProxyConfig;
use crate::routes::{error_body, json_response, Route};
use crate::upstream::UpstreamClient;

mod config;
mod routes;
mod upstream;

/// Credential-injecting proxy for the upstream face-attribute API.
#[derive(Parser)]
#[command(name = "facelens-proxy")]
struct Cli {
    /// Listen port (overrides the PORT environment variable).
    #[arg(long)]
    port: Option<u16>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = ProxyConfig::from_env(cli.port);
    let port = config.port;
    let upstream = Arc::new(UpstreamClient::new(config));

    let server =
        Server::http(("0.0.0.0", port)).map_err(|e| format!("failed to bind port {port}: {e}"))?;
    log::info!("Server running on port {port}");

    serve(server, upstream);
    Ok(())
}

/// Accept loop: one worker thread per request, matching the upstream
/// latency profile (requests spend nearly all their time waiting on the
/// remote API).
fn serve(server: Server, upstream: Arc<UpstreamClient>) {
    for request in server.incoming_requests() {
        let upstream = upstream.clone();
        thread::spawn(move || handle(request, &upstream));
    }
}

fn handle(mut request: Request, upstream: &UpstreamClient) {
    let method = request.method().clone();
    let url = request.url().to_string();

    let response = match routes::route(&method, &url) {
        Route::Status => json_response(
            200,
            serde_json::json!({ "status": "ok", "message": "Server is running" }).to_string(),
        ),
        Route::Detect => match handle_detect(&mut request, upstream) {
            Ok(body) => json_response(200, body),
            Err(e) => {
                log::error!("detect failed: {e}");
                json_response(500, error_body("Failed to process image"))
            }
        },
        Route::Analyze => match handle_analyze(&mut request, upstream) {
            Ok(body) => json_response(200, body),
            Err(e) => {
                log::error!("analyze failed: {e}");
                json_response(500, error_body("Failed to analyze face"))
            }
        },
        Route::NotFound => json_response(404, error_body("Not found")),
    };

    if let Err(e) = request.respond(response) {
        log::warn!("failed to send response: {e}");
    }
}

/// Reads the `image` part from the inbound multipart body and forwards it
/// upstream with credentials injected.
fn handle_detect(
    request: &mut Request,
    upstream: &UpstreamClient,
) -> Result<String, Box<dyn std::error::Error>> {
    let content_type = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_string())
        .ok_or("missing Content-Type header")?;
    let boundary =
        routes::boundary_from_content_type(&content_type).ok_or("missing multipart boundary")?;

    let mut form = multipart::server::Multipart::with_body(request.as_reader(), boundary);
    let mut image: Option<(Vec<u8>, String)> = None;
    while let Some(mut field) = form.read_entry()? {
        if &*field.headers.name == "image" {
            let mut data = Vec::new();
            field.data.read_to_end(&mut data)?;
            let mime = field
                .headers
                .content_type
                .map(|m| m.to_string())
                .unwrap_or_else(|| "image/jpeg".to_string());
            image = Some((data, mime));
            break;
        }
    }

    let (data, mime) = image.ok_or("missing 'image' field")?;
    Ok(upstream.detect(data, &mime)?)
}

#[derive(Deserialize)]
struct AnalyzeBody {
    face_token: String,
}

fn handle_analyze(
    request: &mut Request,
    upstream: &UpstreamClient,
) -> Result<String, Box<dyn std::error::Error>> {
    let mut body = String::new();
    request.as_reader().read_to_string(&mut body)?;
    let parsed: AnalyzeBody = serde_json::from_str(&body)?;
    Ok(upstream.analyze(&parsed.face_token)?)
}
