//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Only the mutating public routes (order placement, booking, coupon checks
//! and quotes) are limited; catalog reads stay unthrottled.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Single-address headers tried after `X-Forwarded-For`.
const FALLBACK_IP_HEADERS: [&str; 2] = ["x-real-ip", "fly-client-ip"];

/// Key extractor for clients behind Cloudflare or another reverse proxy.
///
/// Checks `CF-Connecting-IP`, then the first hop of `X-Forwarded-For`, then
/// `X-Real-IP` and `Fly-Client-IP`, and finally the peer address.
#[derive(Clone, Copy)]
pub struct ProxyIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ProxyIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        client_ip(req.headers())
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

fn header_ip(headers: &axum::http::HeaderMap, name: &str) -> Option<IpAddr> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

/// Best guess at the real client address from proxy headers.
#[must_use]
pub fn client_ip(headers: &axum::http::HeaderMap) -> Option<IpAddr> {
    if let Some(ip) = header_ip(headers, "cf-connecting-ip") {
        return Some(ip);
    }

    if let Some(ip) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
    {
        return Some(ip);
    }

    FALLBACK_IP_HEADERS
        .iter()
        .find_map(|name| header_ip(headers, name))
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ProxyIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Rate limiter for mutating public endpoints: ~60 requests per minute per
/// IP with a burst of 20.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(1)` and `burst_size(20)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn public_write_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ProxyIpKeyExtractor)
        .per_second(1)
        .burst_size(20)
        .finish()
        .expect("rate limiter config with per_second(1) and burst_size(20) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue};

    use super::*;

    #[test]
    fn test_client_ip_prefers_cloudflare() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 10.0.0.2"));
        headers.insert("cf-connecting-ip", HeaderValue::from_static("203.0.113.7"));
        assert_eq!(client_ip(&headers), Some("203.0.113.7".parse().unwrap()));
    }

    #[test]
    fn test_client_ip_falls_back_through_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" 198.51.100.4 , 10.0.0.2"));
        assert_eq!(client_ip(&headers), Some("198.51.100.4".parse().unwrap()));

        let mut headers = HeaderMap::new();
        headers.insert("fly-client-ip", HeaderValue::from_static("2001:db8::1"));
        assert_eq!(client_ip(&headers), Some("2001:db8::1".parse().unwrap()));

        assert_eq!(client_ip(&HeaderMap::new()), None);
    }

    #[test]
    fn test_extractor_falls_back_to_peer_address() {
        use tower_governor::key_extractor::KeyExtractor;

        let mut request = Request::builder().body(()).unwrap();
        assert!(ProxyIpKeyExtractor.extract(&request).is_err());

        let peer: SocketAddr = "192.0.2.10:51000".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));
        assert_eq!(
            ProxyIpKeyExtractor.extract(&request).unwrap(),
            "192.0.2.10".parse::<IpAddr>().unwrap()
        );
    }
}
