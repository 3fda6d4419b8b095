//! Response middleware
//!
//! `DevHeaders` wraps any service and adds the development header set to
//! each response it produces, after the inner service has finished.

use crate::http::apply_dev_headers;
use hyper::service::Service;
use hyper::Response;
use std::future::Future;
use std::pin::Pin;

/// Service decorator that stamps the development headers on every response
#[derive(Debug, Clone)]
pub struct DevHeaders<S> {
    inner: S,
}

impl<S> DevHeaders<S> {
    pub const fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S, Req, B> Service<Req> for DevHeaders<S>
where
    S: Service<Req, Response = Response<B>>,
    S::Future: Send + 'static,
    S::Error: 'static,
    B: 'static,
{
    type Response = Response<B>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response<B>, S::Error>> + Send>>;

    fn call(&self, req: Req) -> Self::Future {
        let fut = self.inner.call(req);
        Box::pin(async move {
            let mut response = fut.await?;
            apply_dev_headers(response.headers_mut());
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use hyper::body::Bytes;
    use hyper::service::service_fn;
    use hyper::{Request, StatusCode};
    use std::convert::Infallible;

    #[tokio::test]
    async fn test_headers_added_to_error_responses() {
        let inner = service_fn(|_req: Request<Full<Bytes>>| async {
            let resp = Response::builder()
                .status(StatusCode::NOT_FOUND)
                .header("Cache-Control", "public, max-age=60")
                .body(Full::new(Bytes::new()))
                .unwrap();
            Ok::<_, Infallible>(resp)
        });

        let svc = DevHeaders::new(inner);
        let resp = svc.call(Request::new(Full::new(Bytes::new()))).await.unwrap();

        assert_eq!(resp.status(), 404);
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
        assert_eq!(resp.headers()["pragma"], "no-cache");
        assert_eq!(resp.headers()["expires"], "0");
        assert_eq!(resp.headers().get_all("cache-control").iter().count(), 1);
        assert_eq!(
            resp.headers()["cache-control"],
            "no-cache, no-store, must-revalidate"
        );
    }
}
