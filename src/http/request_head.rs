//! Request head checks
//!
//! Validates a buffered HTTP/1 request line and header block before the
//! bytes reach hyper, so a malformed request can be answered with the same
//! error page and headers as any other response.

use hyper::{StatusCode, Uri};

/// Largest request head accepted, in bytes
pub const MAX_HEAD_BYTES: usize = 64 * 1024;

/// Largest number of header lines accepted
pub const MAX_HEADERS: usize = 100;

/// Why a request head was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadError {
    BadRequest(String),
    VersionNotSupported(String),
    TooLarge(&'static str),
}

impl HeadError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::VersionNotSupported(_) => StatusCode::HTTP_VERSION_NOT_SUPPORTED,
            Self::TooLarge(_) => StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(msg) | Self::VersionNotSupported(msg) => msg.as_str(),
            Self::TooLarge(msg) => msg,
        }
    }
}

/// Offset just past the blank line ending the head, if it has arrived
///
/// Blank lines before the request line are skipped. Lines may end in LF or
/// CRLF.
pub fn find_head_end(buf: &[u8]) -> Option<usize> {
    let mut seen_request_line = false;
    let mut offset = 0;
    for line in buf.split_inclusive(|&b| b == b'\n') {
        offset += line.len();
        if !line.ends_with(b"\n") {
            return None;
        }
        if trim_eol(line).is_empty() {
            if seen_request_line {
                return Some(offset);
            }
        } else {
            seen_request_line = true;
        }
    }
    None
}

/// Check every complete line of a (possibly partial) request head
///
/// A trailing line without its LF is left for the next read.
pub fn check_request_head(buf: &[u8]) -> Result<(), HeadError> {
    let mut lines = buf
        .split_inclusive(|&b| b == b'\n')
        .filter(|line| line.ends_with(b"\n"))
        .map(trim_eol)
        .skip_while(|line| line.is_empty());

    let Some(request_line) = lines.next() else {
        return Ok(());
    };
    let is_http_10 = check_request_line(request_line)?;

    let mut count = 0;
    let mut content_length: Option<u64> = None;
    for line in lines.take_while(|line| !line.is_empty()) {
        count += 1;
        if count > MAX_HEADERS {
            return Err(HeadError::TooLarge("Too many headers"));
        }
        let (name, value) = check_header_line(line)?;
        if name.eq_ignore_ascii_case(b"content-length") {
            let len = parse_content_length(value)?;
            if content_length.is_some_and(|prev| prev != len) {
                return Err(HeadError::BadRequest("Conflicting Content-Length".to_string()));
            }
            content_length = Some(len);
        } else if name.eq_ignore_ascii_case(b"transfer-encoding") {
            check_transfer_encoding(value, is_http_10)?;
        }
    }
    Ok(())
}

/// Returns whether the request is HTTP/1.0
fn check_request_line(line: &[u8]) -> Result<bool, HeadError> {
    let text = String::from_utf8_lossy(line);
    let bad_syntax = || HeadError::BadRequest(format!("Bad request syntax ('{text}')"));

    let parts: Vec<&[u8]> = line.split(|&b| b == b' ').collect();
    let [method, target, version] = parts.as_slice() else {
        return Err(bad_syntax());
    };
    if method.is_empty() || !method.iter().copied().all(is_tchar) {
        return Err(bad_syntax());
    }
    if target.is_empty() || target.iter().any(u8::is_ascii_control) {
        return Err(bad_syntax());
    }
    if Uri::try_from(*target).is_err() {
        return Err(bad_syntax());
    }

    match *version {
        b"HTTP/1.1" => Ok(false),
        b"HTTP/1.0" => Ok(true),
        v => {
            let version_text = String::from_utf8_lossy(v);
            match v.strip_prefix(b"HTTP/") {
                Some([b'2'..=b'9', b'.', minor]) if minor.is_ascii_digit() => Err(
                    HeadError::VersionNotSupported(format!("Invalid HTTP version ({version_text})")),
                ),
                _ => Err(HeadError::BadRequest(format!(
                    "Bad request version ('{version_text}')"
                ))),
            }
        }
    }
}

fn check_header_line(line: &[u8]) -> Result<(&[u8], &[u8]), HeadError> {
    let bad_header = || {
        HeadError::BadRequest(format!(
            "Bad header line ('{}')",
            String::from_utf8_lossy(line)
        ))
    };

    let colon = line.iter().position(|&b| b == b':').ok_or_else(bad_header)?;
    let (name, rest) = line.split_at(colon);
    let value = &rest[1..];
    if name.is_empty() || !name.iter().copied().all(is_tchar) {
        return Err(bad_header());
    }
    if !value.iter().all(|&b| b == b'\t' || (b >= 0x20 && b != 0x7f)) {
        return Err(bad_header());
    }
    Ok((name, value.trim_ascii()))
}

fn parse_content_length(value: &[u8]) -> Result<u64, HeadError> {
    std::str::from_utf8(value)
        .ok()
        .filter(|v| !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| HeadError::BadRequest("Invalid Content-Length".to_string()))
}

fn check_transfer_encoding(value: &[u8], is_http_10: bool) -> Result<(), HeadError> {
    if is_http_10 {
        return Err(HeadError::BadRequest(
            "Transfer-Encoding is not allowed in HTTP/1.0".to_string(),
        ));
    }
    let last = value
        .rsplit(|&b| b == b',')
        .next()
        .map(<[u8]>::trim_ascii)
        .unwrap_or_default();
    if last.eq_ignore_ascii_case(b"chunked") {
        Ok(())
    } else {
        Err(HeadError::BadRequest("Invalid Transfer-Encoding".to_string()))
    }
}

fn trim_eol(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// RFC 9110 token character
const fn is_tchar(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_'
                | b'`' | b'|' | b'~'
        )
}
