use tiny_http::{Header, Method, Response};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Detect,
    Analyze,
    Status,
    NotFound,
}

/// Maps method + URL to a route. Query strings are ignored.
pub fn route(method: &Method, url: &str) -> Route {
    let path = url.split('?').next().unwrap_or(url);
    match (method, path) {
        (Method::Post, "/api/detect") => Route::Detect,
        (Method::Post, "/api/analyze") => Route::Analyze,
        (Method::Get, "/api/status") => Route::Status,
        _ => Route::NotFound,
    }
}

/// Extracts the boundary parameter from a multipart Content-Type value.
pub fn boundary_from_content_type(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .find_map(|part| part.trim().strip_prefix("boundary="))
        .map(|b| b.trim_matches('"').to_string())
        .filter(|b| !b.is_empty())
}

pub fn json_response(status: u16, body: String) -> Response<std::io::Cursor<Vec<u8>>> {
    let mut response = Response::from_string(body).with_status_code(status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        response.add_header(header);
    }
    response
}

pub fn error_body(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}
