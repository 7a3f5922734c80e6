//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Only the admin login endpoint is limited: it is the one place a password is
//! checked locally.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

// =============================================================================
// Client IP Key Extractor
// =============================================================================

fn header_ip<T>(req: &Request<T>, name: &str) -> Option<IpAddr> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

/// Key extractor that prefers proxy headers (`CF-Connecting-IP`,
/// `X-Forwarded-For`, `X-Real-IP`) and falls back to the peer address.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        ["cf-connecting-ip", "x-forwarded-for", "x-real-ip"]
            .into_iter()
            .find_map(|name| header_ip(req, name))
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for the admin login: ~10 requests per minute per IP.
///
/// Configuration: 1 request every 6 seconds (replenish), burst of 5.
/// Returns `None` only if governor rejects the configuration.
#[must_use]
pub fn auth_rate_limiter() -> Option<RateLimiterLayer> {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(6) // Replenish 1 token every 6 seconds (~10/minute)
        .burst_size(5)
        .finish()?;
    Some(GovernorLayer::new(Arc::new(config)))
}
