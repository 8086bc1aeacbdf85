//! Client identification utilities
//!
//! Resolves the network origin of a request. Registration uses it as the key
//! for the per-origin account quota, so forwarding headers are only believed
//! when the socket peer is a configured reverse proxy.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Extract client IP address
///
/// `X-Forwarded-For` is read only when `peer` is one of `trusted_proxies`.
/// The chain is then walked from the right, skipping trusted hops, and the
/// first untrusted address is the client. Entries left of it were written by
/// the client and are ignored.
///
/// ## Arguments
/// * `headers` - HTTP request headers
/// * `peer` - Socket address of the connection
/// * `trusted_proxies` - Proxies allowed to report the client address
pub fn extract_client_ip(headers: &HeaderMap, peer: IpAddr, trusted_proxies: &[IpAddr]) -> IpAddr {
    let is_trusted = |ip: IpAddr| trusted_proxies.contains(&ip.to_canonical());

    if !is_trusted(peer) {
        return peer;
    }

    let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) else {
        return peer;
    };

    let mut client = peer;
    for hop in xff.rsplit(',') {
        let Ok(ip) = hop.trim().parse::<IpAddr>() else {
            break;
        };
        client = ip;
        if !is_trusted(ip) {
            break;
        }
    }
    client
}

/// Storage form of an origin address
///
/// IPv4-mapped IPv6 addresses are folded to their IPv4 form so the same client
/// is counted once whichever socket family accepted it.
pub fn origin_key(ip: IpAddr) -> String {
    ip.to_canonical().to_string()
}
