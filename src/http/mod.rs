//! HTTP protocol layer module
//!
//! Protocol helpers shared by the request handler: content types, path
//! translation, HTTP-dates, response builders, request-head checks and the
//! development headers.

pub mod body;
pub mod date;
pub mod headers;
pub mod mime;
pub mod path;
pub mod request_head;
pub mod response;

// Re-export commonly used items
pub use body::ResponseBody;
pub use headers::{apply_dev_headers, DEV_HEADERS};
pub use path::{translate_path, TranslatedPath};
pub use response::{
    build_301_response, build_304_response, build_403_response, build_404_response,
    build_501_response, build_error_response, build_file_response, build_html_response,
};
