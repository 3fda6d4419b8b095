// Request head preflight
// Reads and checks the request head before hyper parses it

use http_body_util::BodyExt;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONNECTION, DATE, SERVER};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::SystemTime;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};

use crate::http::date::format_http_date;
use crate::http::request_head::{check_request_head, find_head_end, HeadError, MAX_HEAD_BYTES};
use crate::http::{self, apply_dev_headers};

const READ_CHUNK: usize = 4096;

/// Outcome of reading a request head
#[derive(Debug, PartialEq, Eq)]
pub enum Preflight {
    /// Peer closed before sending a full request
    Closed,
    /// A well-formed head, plus whatever followed it in the same reads
    Accepted(Bytes),
    Rejected(HeadError),
}

/// Read until the request head is complete or shown to be malformed
///
/// Lines are checked as they arrive, so a bad request line is answered
/// without waiting for the rest of the head.
pub async fn read_request_head<R: AsyncRead + Unpin>(reader: &mut R) -> io::Result<Preflight> {
    let mut buf = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            if buf.iter().all(u8::is_ascii_whitespace) {
                return Ok(Preflight::Closed);
            }
            // Half-closed mid-line: the last line is all there will be
            buf.push(b'\n');
            return Ok(match check_request_head(&buf) {
                Err(err) => Preflight::Rejected(err),
                Ok(()) => Preflight::Closed,
            });
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Err(err) = check_request_head(&buf) {
            return Ok(Preflight::Rejected(err));
        }
        if find_head_end(&buf).is_some() {
            return Ok(Preflight::Accepted(Bytes::from(buf)));
        }
        if buf.len() > MAX_HEAD_BYTES {
            return Ok(Preflight::Rejected(HeadError::TooLarge("Request header too large")));
        }
    }
}

/// Write the error page for a rejected head and close the write side
///
/// The response carries the same headers as one produced by the request
/// handler behind `DevHeaders`.
pub async fn write_rejection<W: AsyncWrite + Unpin>(
    writer: &mut W,
    err: &HeadError,
    server_name: &str,
) -> io::Result<()> {
    let mut response = http::build_error_response(err.status(), err.message(), false);
    let headers = response.headers_mut();
    apply_dev_headers(headers);
    if let Ok(value) = HeaderValue::from_str(server_name) {
        headers.insert(SERVER, value);
    }
    if let Ok(value) = HeaderValue::from_str(&format_http_date(SystemTime::now())) {
        headers.insert(DATE, value);
    }
    headers.insert(CONNECTION, HeaderValue::from_static("close"));

    let (parts, body) = response.into_parts();
    let body = body.collect().await?.to_bytes();

    let mut out = Vec::with_capacity(512 + body.len());
    out.extend_from_slice(
        format!(
            "HTTP/1.1 {} {}\r\n",
            parts.status.as_u16(),
            parts.status.canonical_reason().unwrap_or("")
        )
        .as_bytes(),
    );
    for (name, value) in &parts.headers {
        out.extend_from_slice(name.as_str().as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(value.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(&body);

    writer.write_all(&out).await?;
    writer.shutdown().await
}

/// Stream that replays already-read bytes before reading from `inner`
///
/// Writes go straight to `inner`.
pub struct Rewind<T> {
    prefix: Option<Bytes>,
    inner: T,
}

impl<T> Rewind<T> {
    pub fn new(prefix: Bytes, inner: T) -> Self {
        Self {
            prefix: (!prefix.is_empty()).then_some(prefix),
            inner,
        }
    }
}

impl<T: AsyncRead + Unpin> AsyncRead for Rewind<T> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if let Some(mut prefix) = self.prefix.take() {
            if buf.remaining() == 0 {
                self.prefix = Some(prefix);
                return Poll::Ready(Ok(()));
            }
            let n = prefix.len().min(buf.remaining());
            buf.put_slice(&prefix.split_to(n));
            if !prefix.is_empty() {
                self.prefix = Some(prefix);
            }
            return Poll::Ready(Ok(()));
        }
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl<T: AsyncWrite + Unpin> AsyncWrite for Rewind<T> {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_write_vectored(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write_vectored(cx, bufs)
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::StatusCode;

    #[tokio::test]
    async fn test_accepts_complete_head_with_trailing_bytes() {
        let mut input: &[u8] = b"GET / HTTP/1.1\r\nHost: a\r\n\r\nextra";
        let result = read_request_head(&mut input).await.unwrap();
        assert_eq!(
            result,
            Preflight::Accepted(Bytes::from_static(b"GET / HTTP/1.1\r\nHost: a\r\n\r\nextra"))
        );
    }

    #[tokio::test]
    async fn test_rejects_garbage() {
        let mut input: &[u8] = b"GARBAGE\r\n\r\n";
        let Preflight::Rejected(err) = read_request_head(&mut input).await.unwrap() else {
            panic!("garbage accepted");
        };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_eof_handling() {
        let mut empty: &[u8] = b"";
        assert_eq!(read_request_head(&mut empty).await.unwrap(), Preflight::Closed);

        let mut partial: &[u8] = b"GET / HTTP/1.1\r\nHost: a\r\n";
        assert_eq!(read_request_head(&mut partial).await.unwrap(), Preflight::Closed);

        let mut unterminated: &[u8] = b"NONSENSE";
        assert!(matches!(
            read_request_head(&mut unterminated).await.unwrap(),
            Preflight::Rejected(HeadError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_oversized_head() {
        let mut head = b"GET / HTTP/1.1\r\nX-Long: ".to_vec();
        head.resize(MAX_HEAD_BYTES + 10, b'a');
        let mut input: &[u8] = &head;
        assert_eq!(
            read_request_head(&mut input).await.unwrap(),
            Preflight::Rejected(HeadError::TooLarge("Request header too large"))
        );
    }

    #[tokio::test]
    async fn test_write_rejection() {
        let mut out = Vec::new();
        let err = HeadError::BadRequest("Bad request syntax ('GARBAGE')".to_string());
        write_rejection(&mut out, &err, "devserve/test").await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(text.contains("access-control-allow-origin: *\r\n"));
        assert!(text.contains("cache-control: no-cache, no-store, must-revalidate\r\n"));
        assert!(text.contains("pragma: no-cache\r\n"));
        assert!(text.contains("expires: 0\r\n"));
        assert!(text.contains("server: devserve/test\r\n"));
        assert!(text.contains("connection: close\r\n"));
        assert!(text.ends_with("</html>\n"));
        assert!(text.contains("Bad request syntax (&#x27;GARBAGE&#x27;)"));
    }

    #[tokio::test]
    async fn test_rewind_replays_prefix() {
        let inner: &[u8] = b" world";
        let mut rewind = Rewind::new(Bytes::from_static(b"hello"), inner);

        let mut small = [0u8; 3];
        rewind.read_exact(&mut small).await.unwrap();
        assert_eq!(&small, b"hel");

        let mut rest = String::new();
        rewind.read_to_string(&mut rest).await.unwrap();
        assert_eq!(rest, "lo world");
    }
}
