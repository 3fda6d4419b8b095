//! Static file serving module
//!
//! Resolves a translated path to a file, an index file or a directory
//! listing, and maps filesystem errors onto status codes.

use crate::handler::listing;
use crate::handler::router::RequestContext;
use crate::http::body::{self, FileBody, ResponseBody};
use crate::http::{self, date, mime};
use crate::logger;
use http_body_util::BodyExt;
use hyper::Response;
use std::io;
use std::path::Path;
use tokio::fs::{self, File};

/// Serve whatever the request path names under the root
pub async fn serve_path(ctx: &RequestContext<'_>, index_files: &[String]) -> Response<ResponseBody> {
    let path = ctx.target.fs_path.as_path();
    let metadata = match fs::metadata(path).await {
        Ok(m) => m,
        Err(e) => return io_error_response(&e, path, ctx.is_head),
    };

    if metadata.is_dir() {
        if !ctx.target.trailing_slash {
            return http::build_301_response(&with_trailing_slash(ctx));
        }
        if let Some(index) = find_index_file(path, index_files).await {
            return serve_file(ctx, &index).await;
        }
        return listing::serve_listing(ctx).await;
    }

    // A file never has children
    if ctx.target.trailing_slash {
        return http::build_404_response(ctx.is_head);
    }

    serve_file(ctx, path).await
}

/// Serve a single regular file, honoring `If-Modified-Since`
///
/// The body streams from the open file; Content-Length is the size at open.
pub async fn serve_file(ctx: &RequestContext<'_>, path: &Path) -> Response<ResponseBody> {
    let file = match File::open(path).await {
        Ok(f) => f,
        Err(e) => return io_error_response(&e, path, ctx.is_head),
    };

    let metadata = match file.metadata().await {
        Ok(m) => m,
        Err(e) => return io_error_response(&e, path, ctx.is_head),
    };
    let modified = metadata.modified().ok();
    let last_modified = modified.map(date::format_http_date);

    if let (Some(mtime), Some(since)) = (modified, ctx.if_modified_since.as_deref()) {
        if !date::is_modified_since(mtime, since) {
            return http::build_304_response(last_modified.as_deref());
        }
    }

    let len = metadata.len();
    let body = if ctx.is_head {
        body::empty()
    } else {
        FileBody::new(file, len).boxed_unsync()
    };

    http::build_file_response(body, len, mime::content_type_for(path), last_modified.as_deref())
}

/// First configured index file that exists as a regular file in `dir`
async fn find_index_file(dir: &Path, index_files: &[String]) -> Option<std::path::PathBuf> {
    for name in index_files {
        let candidate = dir.join(name);
        if fs::metadata(&candidate).await.is_ok_and(|m| m.is_file()) {
            return Some(candidate);
        }
    }
    None
}

/// Request URL with `/` appended to the path, query preserved
fn with_trailing_slash(ctx: &RequestContext<'_>) -> String {
    match ctx.uri.query() {
        Some(query) => format!("{}/?{query}", ctx.uri.path()),
        None => format!("{}/", ctx.uri.path()),
    }
}

/// Map a filesystem error onto 403 or 404
pub fn io_error_response(err: &io::Error, path: &Path, is_head: bool) -> Response<ResponseBody> {
    match err.kind() {
        io::ErrorKind::PermissionDenied => http::build_403_response(is_head),
        io::ErrorKind::NotFound => http::build_404_response(is_head),
        _ => {
            logger::log_error(&format!("Failed to read '{}': {err}", path.display()));
            http::build_404_response(is_head)
        }
    }
}
