//! Request path translation module
//!
//! Percent-decoding/encoding and mapping of URL paths onto the served root.
//! Translation drops `.` and `..` segments, so a translated path never
//! leaves the root it is joined onto.

use std::path::{Path, PathBuf};

/// Decode `%XX` escapes
///
/// Malformed escapes are kept literally and invalid UTF-8 is replaced,
/// so decoding never fails.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                decoded.push((hi << 4) | lo);
                i += 3;
                continue;
            }
        }
        decoded.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&decoded).into_owned()
}

/// Percent-encode everything outside the unreserved set, keeping `/`
pub fn percent_encode(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len());
    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~' | b'/') {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

const fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// A request path resolved against the served root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedPath {
    /// Filesystem location under the root
    pub fs_path: PathBuf,
    /// Decoded URL path, used for display in listings
    pub display: String,
    /// Whether the URL path ended with `/`
    pub trailing_slash: bool,
}

/// Map a raw URI path (no query) onto `root`
pub fn translate_path(root: &Path, uri_path: &str) -> TranslatedPath {
    let display = percent_decode(uri_path);
    let trailing_slash = display.ends_with('/');

    let mut fs_path = root.to_path_buf();
    for segment in display.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
            continue;
        }
        fs_path.push(segment);
    }

    TranslatedPath {
        fs_path,
        display,
        trailing_slash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("/a%20b.txt"), "/a b.txt");
        assert_eq!(percent_decode("/%E4%BD%A0"), "/你");
        assert_eq!(percent_decode("/plain"), "/plain");
    }

    #[test]
    fn test_percent_decode_malformed() {
        assert_eq!(percent_decode("/100%"), "/100%");
        assert_eq!(percent_decode("/%zz"), "/%zz");
        assert_eq!(percent_decode("/%4"), "/%4");
        assert_eq!(percent_decode("/%ff"), "/\u{fffd}");
    }

    #[test]
    fn test_percent_encode() {
        assert_eq!(percent_encode("a b.txt"), "a%20b.txt");
        assert_eq!(percent_encode("dir/"), "dir/");
        assert_eq!(percent_encode("x&y#z"), "x%26y%23z");
    }

    #[test]
    fn test_translate_simple() {
        let t = translate_path(Path::new("/srv"), "/css/site.css");
        assert_eq!(t.fs_path, PathBuf::from("/srv/css/site.css"));
        assert_eq!(t.display, "/css/site.css");
        assert!(!t.trailing_slash);
    }

    #[test]
    fn test_translate_root_and_trailing_slash() {
        let t = translate_path(Path::new("/srv"), "/");
        assert_eq!(t.fs_path, PathBuf::from("/srv"));
        assert!(t.trailing_slash);

        let t = translate_path(Path::new("/srv"), "/docs/");
        assert_eq!(t.fs_path, PathBuf::from("/srv/docs"));
        assert!(t.trailing_slash);
    }

    #[test]
    fn test_translate_blocks_traversal() {
        let t = translate_path(Path::new("/srv"), "/../../etc/passwd");
        assert_eq!(t.fs_path, PathBuf::from("/srv/etc/passwd"));

        let t = translate_path(Path::new("/srv"), "/a/%2e%2e/%2E%2E/secret");
        assert_eq!(t.fs_path, PathBuf::from("/srv/a/secret"));

        let t = translate_path(Path::new("/srv"), "/..%5c..%5cwin.ini");
        assert_eq!(t.fs_path, PathBuf::from("/srv"));
    }

    #[test]
    fn test_translate_decodes_segments() {
        let t = translate_path(Path::new("/srv"), "/my%20file.txt");
        assert_eq!(t.fs_path, PathBuf::from("/srv/my file.txt"));
        assert_eq!(t.display, "/my file.txt");
    }
}
