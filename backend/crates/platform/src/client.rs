//! Client identification utilities
//!
//! Resolves the client identifier used as the key for per-client
//! failed-authentication throttling.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Fallback identifier when no IP can be determined
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Extract client IP address from headers
///
/// Checks `X-Forwarded-For` first (reverse proxy setups, first entry in
/// the list), then `X-Real-IP`, then falls back to the direct
/// connection IP.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first_ip) = xff.split(',').next() {
            if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                return Some(ip);
            }
        }
    }

    if let Some(xri) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        if let Ok(ip) = xri.trim().parse::<IpAddr>() {
            return Some(ip);
        }
    }

    direct_ip
}

/// Resolve the throttle key for a request: the client IP as a string,
/// or [`UNKNOWN_CLIENT`] when none is determinable.
pub fn client_id(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> String {
    extract_client_ip(headers, direct_ip)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
