//! HTTP utility functions for extracting request information.

use actix_web::HttpRequest;

use crate::{config::AllowList, error::GuardError, utils::ip::canonical_ipv4};

/// Proxy headers consulted, in order of preference
const PROXY_HEADERS: [&str; 3] = ["Client-IP", "X-Forwarded-For", "X-Real-IP"];

/// Resolves the canonical IPv4 address of the client behind a request.
///
/// Forwarding headers are only honored when the connection comes from one of
/// `trusted_proxies`; any other peer is identified by its own address.
#[derive(Debug, Clone, Default)]
pub struct ClientIpResolver {
    trusted_proxies: AllowList,
}

impl ClientIpResolver {
    pub fn new(trusted_proxies: AllowList) -> Self {
        Self { trusted_proxies }
    }

    /// Extract the client IP from the peer address, or from the proxy headers
    /// when the peer is a trusted proxy.
    ///
    /// Header values that do not canonicalize to an IPv4 address are skipped.
    pub fn resolve(&self, req: &HttpRequest) -> Result<String, GuardError> {
        let peer = req
            .peer_addr()
            .and_then(|addr| canonical_ipv4(&addr.ip().to_string()));

        if let Some(proxy) = peer.as_deref().filter(|ip| self.trusted_proxies.contains(ip)) {
            for header_name in PROXY_HEADERS {
                let Some(value) = req.headers().get(header_name) else {
                    continue;
                };
                let Ok(value) = value.to_str() else {
                    continue;
                };
                // X-Forwarded-For can contain multiple IPs, the first is the client
                let first = value.split(',').next().unwrap_or(value);
                if let Some(ip) = canonical_ipv4(first) {
                    tracing::debug!(
                        proxy,
                        client = %ip,
                        header = header_name,
                        "Client IP taken from proxy header"
                    );
                    return Ok(ip);
                }
            }
        }

        peer.ok_or(GuardError::UnresolvableIp)
    }

    /// Like [`resolve`](Self::resolve), but returns an empty string when the
    /// client cannot be identified.
    pub fn resolve_or_empty(&self, req: &HttpRequest) -> String {
        self.resolve(req).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Client IP unavailable, guard tracking skipped");
            String::new()
        })
    }
}

/// Extract user agent from request headers
pub fn extract_user_agent(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("User-Agent")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
}
