//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, path
//! translation and access logging.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http::body::ResponseBody;
use crate::http::{self, TranslatedPath};
use crate::logger::{self, AccessLogEntry};
use hyper::body::Body;
use hyper::header::{HeaderValue, SERVER};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, Uri, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub target: &'a TranslatedPath,
    pub uri: &'a Uri,
    pub is_head: bool,
    pub if_modified_since: Option<String>,
}

/// Main entry point for HTTP request handling
///
/// The request body is never read; only `GET` and `HEAD` are served.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();

    let mut response = dispatch(&parts, &state).await;
    if let Ok(server_name) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server_name);
    }

    if state.config.logging.access_log {
        let entry = access_entry(&parts, peer_addr, &response, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn dispatch(parts: &Parts, state: &AppState) -> Response<ResponseBody> {
    let is_head = parts.method == Method::HEAD;
    if parts.method != Method::GET && !is_head {
        return http::build_501_response(parts.method.as_str());
    }

    let target = http::translate_path(&state.root, parts.uri.path());

    // If-None-Match takes precedence, and this server never issues ETags
    let if_modified_since = if parts.headers.contains_key("if-none-match") {
        None
    } else {
        parts
            .headers
            .get("if-modified-since")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let ctx = RequestContext {
        target: &target,
        uri: &parts.uri,
        is_head,
        if_modified_since,
    };

    static_files::serve_path(&ctx, &state.config.files.index_files).await
}

fn access_entry(
    parts: &Parts,
    peer_addr: SocketAddr,
    response: &Response<ResponseBody>,
    started: Instant,
) -> AccessLogEntry {
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        parts.method.to_string(),
        parts.uri.path().to_string(),
    );
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = version_label(parts.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs;

    fn state_for(root: &std::path::Path) -> Arc<AppState> {
        let mut cfg = Config::with_root("127.0.0.1", 0, root.to_str().unwrap()).unwrap();
        cfg.logging.access_log = false;
        Arc::new(AppState::new(&cfg))
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let dir = tempfile::tempdir().unwrap();
        let req = Request::post("/index.html").body(()).unwrap();
        let resp = handle_request(req, state_for(dir.path()), peer()).await.unwrap();
        assert_eq!(resp.status(), 501);
    }

    #[tokio::test]
    async fn test_get_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.js"), "let x = 1;").unwrap();

        let req = Request::get("/app.js").body(()).unwrap();
        let resp = handle_request(req, state_for(dir.path()), peer()).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], "text/javascript; charset=utf-8");
        assert_eq!(resp.headers()["content-length"], "10");
        assert!(resp.headers().contains_key("last-modified"));
        assert!(resp.headers()["server"].to_str().unwrap().starts_with("devserve/"));
    }

    #[tokio::test]
    async fn test_if_none_match_disables_if_modified_since() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();

        let req = Request::get("/a.txt")
            .header("if-modified-since", "Fri, 31 Dec 9999 23:59:59 GMT")
            .header("if-none-match", "\"abc\"")
            .body(())
            .unwrap();
        let resp = handle_request(req, state_for(dir.path()), peer()).await.unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[test]
    fn test_version_label() {
        assert_eq!(version_label(Version::HTTP_10), "1.0");
        assert_eq!(version_label(Version::HTTP_11), "1.1");
    }
}
