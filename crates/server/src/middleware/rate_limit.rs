//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Only the authentication endpoints are limited: sign-up and sign-in get
//! roughly ten requests per minute per client IP. Rejections use the same
//! JSON error body as every other failure.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{HeaderValue, Request, header};
use axum::response::{IntoResponse, Response};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use crate::error::AppError;

/// Client address for rate limiting.
///
/// Keys on the TCP peer. With `trust_proxy` set, the first
/// `X-Forwarded-For` hop and then `X-Real-IP` take precedence; those headers
/// are client-controlled unless a proxy in front overwrites them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientIpKeyExtractor {
    pub trust_proxy: bool,
}

fn header_ip<T>(req: &Request<T>, name: &str) -> Option<IpAddr> {
    let value = req.headers().get(name)?.to_str().ok()?;
    value.split(',').next()?.trim().parse().ok()
}

fn peer_ip<T>(req: &Request<T>) -> Option<IpAddr> {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let forwarded = if self.trust_proxy {
            header_ip(req, "x-forwarded-for").or_else(|| header_ip(req, "x-real-ip"))
        } else {
            None
        };

        forwarded
            .or_else(|| peer_ip(req))
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Render a limiter rejection as an [`AppError`] response.
fn rejection(err: GovernorError) -> Response {
    match err {
        GovernorError::TooManyRequests { wait_time, .. } => {
            tracing::info!(wait_secs = wait_time, "auth request rate limited");
            let mut response = AppError::RateLimited.into_response();
            if let Ok(value) = HeaderValue::from_str(&wait_time.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }
        GovernorError::UnableToExtractKey => {
            AppError::Internal("rate limiter could not determine the client address".to_owned())
                .into_response()
        }
        other => AppError::Internal(format!("rate limiter: {other}")).into_response(),
    }
}

/// Limiter for sign-up and sign-in: a token every 6 seconds, bursts of 5.
#[must_use]
#[allow(clippy::expect_used)]
pub fn auth_rate_limiter(trust_proxy: bool) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor { trust_proxy })
        .per_second(6)
        .burst_size(5)
        .finish()
        .expect("non-zero period and burst");
    GovernorLayer::new(Arc::new(config)).error_handler(rejection)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    fn request(headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri("/auth/sign-in");
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        builder.body(()).unwrap()
    }

    const PROXY: ClientIpKeyExtractor = ClientIpKeyExtractor { trust_proxy: true };
    const DIRECT: ClientIpKeyExtractor = ClientIpKeyExtractor { trust_proxy: false };

    fn from_peer(headers: &[(&str, &str)], peer: &str) -> Request<()> {
        let mut req = request(headers);
        req.extensions_mut()
            .insert(ConnectInfo(peer.parse::<SocketAddr>().unwrap()));
        req
    }

    #[test]
    fn test_forwarded_for_takes_first_address() {
        let req = request(&[("x-forwarded-for", "203.0.113.7, 10.0.0.1")]);
        let ip = PROXY.extract(&req).unwrap();
        assert_eq!(ip, "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_real_ip_fallback() {
        let req = request(&[("x-real-ip", "198.51.100.2")]);
        let ip = PROXY.extract(&req).unwrap();
        assert_eq!(ip, "198.51.100.2".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_connect_info_fallback() {
        let req = from_peer(&[], "192.0.2.9:5000");
        let ip = PROXY.extract(&req).unwrap();
        assert_eq!(ip, "192.0.2.9".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_garbage_header_falls_through() {
        let req = request(&[("x-forwarded-for", "unknown"), ("x-real-ip", "198.51.100.4")]);
        let ip = PROXY.extract(&req).unwrap();
        assert_eq!(ip, "198.51.100.4".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_spoofed_headers_ignored_without_proxy() {
        let peer = "192.0.2.9".parse::<IpAddr>().unwrap();
        for i in 0..20 {
            let forged = format!("198.51.100.{i}");
            let req = from_peer(
                &[("x-forwarded-for", forged.as_str()), ("x-real-ip", forged.as_str())],
                "192.0.2.9:5000",
            );
            assert_eq!(DIRECT.extract(&req).unwrap(), peer);
        }
    }

    #[test]
    fn test_default_keys_on_peer() {
        assert!(!ClientIpKeyExtractor::default().trust_proxy);
    }

    #[test]
    fn test_no_source_is_an_error() {
        assert!(DIRECT.extract(&request(&[])).is_err());
        assert!(PROXY.extract(&request(&[])).is_err());
    }
}
