//! Directory listing module

use crate::handler::router::RequestContext;
use crate::handler::static_files::io_error_response;
use crate::http::{self, path::percent_encode, response::escape_html, ResponseBody};
use hyper::Response;
use std::fmt::Write;
use tokio::fs;

/// One row of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    /// Directory, or a symlink resolving to one
    pub is_dir: bool,
    pub is_symlink: bool,
}

impl ListingEntry {
    /// Text shown for the entry: `dir/`, `link@` or the plain name
    pub fn display_name(&self) -> String {
        if self.is_symlink {
            format!("{}@", self.name)
        } else if self.is_dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }

    /// Relative link target, percent-encoded
    pub fn href(&self) -> String {
        if self.is_dir {
            percent_encode(&format!("{}/", self.name))
        } else {
            percent_encode(&self.name)
        }
    }
}

/// Serve an HTML listing of the directory named by the request
pub async fn serve_listing(ctx: &RequestContext<'_>) -> Response<ResponseBody> {
    let dir = ctx.target.fs_path.as_path();
    let mut reader = match fs::read_dir(dir).await {
        Ok(r) => r,
        Err(e) => return io_error_response(&e, dir, ctx.is_head),
    };

    let mut entries = Vec::new();
    loop {
        match reader.next_entry().await {
            Ok(Some(entry)) => {
                let is_symlink = entry.file_type().await.is_ok_and(|t| t.is_symlink());
                // Follows symlinks
                let is_dir = fs::metadata(entry.path()).await.is_ok_and(|m| m.is_dir());
                entries.push(ListingEntry {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    is_dir,
                    is_symlink,
                });
            }
            Ok(None) => break,
            Err(e) => return io_error_response(&e, dir, ctx.is_head),
        }
    }

    sort_entries(&mut entries);
    http::build_html_response(render_listing(&ctx.target.display, &entries), ctx.is_head)
}

/// Case-insensitive name order
pub fn sort_entries(entries: &mut [ListingEntry]) {
    entries.sort_by_cached_key(|e| e.name.to_lowercase());
}

/// Render the listing page for `display_path` (the decoded request path)
pub fn render_listing(display_path: &str, entries: &[ListingEntry]) -> String {
    let title = format!("Directory listing for {}", escape_html(display_path));

    let mut html = String::new();
    html.push_str("<!DOCTYPE HTML>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{title}</title>");
    html.push_str("</head>\n<body>\n");
    let _ = writeln!(html, "<h1>{title}</h1>");
    html.push_str("<hr>\n<ul>\n");
    for entry in entries {
        let _ = writeln!(
            html,
            "<li><a href=\"{}\">{}</a></li>",
            escape_html(&entry.href()),
            escape_html(&entry.display_name()),
        );
    }
    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    html
}
