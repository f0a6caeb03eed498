use crate::error::HttpError;
use http::{HeaderValue, Request};
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Sets a default User-Agent on requests that do not carry one
#[derive(Clone, Debug)]
pub struct UserAgentLayer {
    value: HeaderValue,
}

impl UserAgentLayer {
    /// # Errors
    /// Returns `HttpError::InvalidHeaderValue` if `user_agent` is not a valid header value
    pub fn try_new(user_agent: impl AsRef<str>) -> Result<Self, HttpError> {
        let value = HeaderValue::from_str(user_agent.as_ref())?;
        Ok(Self { value })
    }
}

impl<S> Layer<S> for UserAgentLayer {
    type Service = UserAgentService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        UserAgentService {
            inner,
            value: self.value.clone(),
        }
    }
}

/// Service produced by [`UserAgentLayer`]
#[derive(Clone, Debug)]
pub struct UserAgentService<S> {
    inner: S,
    value: HeaderValue,
}

impl<S, B> Service<Request<B>> for UserAgentService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        req.headers_mut()
            .entry(http::header::USER_AGENT)
            .or_insert_with(|| self.value.clone());
        self.inner.call(req)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use http::Response;
    use std::convert::Infallible;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    /// Records the User-Agent of every request it sees.
    #[derive(Clone, Default)]
    struct Recorder {
        seen: Arc<Mutex<Vec<Option<HeaderValue>>>>,
    }

    impl Service<Request<()>> for Recorder {
        type Response = Response<()>;
        type Error = Infallible;
        type Future = std::future::Ready<Result<Self::Response, Self::Error>>;

        fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: Request<()>) -> Self::Future {
            self.seen
                .lock()
                .unwrap()
                .push(req.headers().get(http::header::USER_AGENT).cloned());
            std::future::ready(Ok(Response::new(())))
        }
    }

    #[tokio::test]
    async fn test_default_user_agent_is_set() {
        let recorder = Recorder::default();
        let seen = recorder.seen.clone();
        let service = UserAgentLayer::try_new("gdm/1.0").unwrap().layer(recorder);

        let req = Request::get("http://localhost:7474/db/manage/")
            .body(())
            .unwrap();
        service.oneshot(req).await.unwrap();

        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[Some(HeaderValue::from_static("gdm/1.0"))]
        );
    }

    #[tokio::test]
    async fn test_explicit_user_agent_wins() {
        let recorder = Recorder::default();
        let seen = recorder.seen.clone();
        let service = UserAgentLayer::try_new("gdm/1.0").unwrap().layer(recorder);

        let req = Request::get("http://localhost:7474/db/manage/")
            .header(http::header::USER_AGENT, "webadmin/2.0")
            .body(())
            .unwrap();
        service.oneshot(req).await.unwrap();

        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[Some(HeaderValue::from_static("webadmin/2.0"))]
        );
    }

    #[test]
    fn test_invalid_user_agent_rejected() {
        let result = UserAgentLayer::try_new("bad\x00agent");
        assert!(matches!(result, Err(HttpError::InvalidHeaderValue(_))));
    }
}
