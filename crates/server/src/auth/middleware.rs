use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::extract::{FromRequestParts, RawPathParams};
use axum::http::Request;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use byosnap_core::{AuthorizationPolicy, Decision, authorize};
use tower::{Layer, Service};
use tracing::{debug, info};

use super::trust_context;
use crate::error::ServerError;

/// Tower layer that evaluates an [`AuthorizationPolicy`] before the handler.
///
/// Allowed requests carry their [`TrustContext`](byosnap_core::TrustContext)
/// in the request extensions.
#[derive(Clone)]
pub struct GateLayer {
    endpoint: &'static str,
    policy: Arc<AuthorizationPolicy>,
}

impl GateLayer {
    pub fn new(endpoint: &'static str, policy: Arc<AuthorizationPolicy>) -> Self {
        Self { endpoint, policy }
    }
}

impl<S> Layer<S> for GateLayer {
    type Service = GateMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GateMiddleware {
            inner,
            endpoint: self.endpoint,
            policy: Arc::clone(&self.policy),
        }
    }
}

/// Tower service that authorizes requests against a fixed policy.
#[derive(Clone)]
pub struct GateMiddleware<S> {
    inner: S,
    endpoint: &'static str,
    policy: Arc<AuthorizationPolicy>,
}

impl<S> Service<Request<Body>> for GateMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let policy = Arc::clone(&self.policy);
        let endpoint = self.endpoint;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let (mut parts, body) = req.into_parts();

            // A bound parameter that cannot be read resolves to an empty
            // target, which no user owns.
            let resource = match policy.resource_param() {
                Some(name) => Some(path_param(&mut parts, name).await.unwrap_or_default()),
                None => None,
            };
            let ctx = trust_context(&parts.headers, resource.as_deref());

            match authorize(&ctx, &policy) {
                Decision::Allow(level) => {
                    debug!(
                        endpoint,
                        level = %level,
                        caller = ctx.caller_user_id(),
                        "request authorized"
                    );
                    parts.extensions.insert(ctx);
                    inner.call(Request::from_parts(parts, body)).await
                }
                Decision::Deny(status) => {
                    info!(
                        endpoint,
                        origin = ?ctx.gateway_origin(),
                        auth_type = %ctx.auth_type(),
                        caller = ctx.caller_user_id(),
                        target = ctx.target_resource_user_id(),
                        status = status.status_code(),
                        "request denied"
                    );
                    Ok(ServerError::denied(status).into_response())
                }
            }
        })
    }
}

async fn path_param(parts: &mut Parts, name: &str) -> Option<String> {
    let params = RawPathParams::from_request_parts(parts, &()).await.ok()?;
    params
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_owned())
}
