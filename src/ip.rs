//! Client origin extraction for duplicate suppression and throttling.

use actix_web::HttpRequest;
use std::net::IpAddr;

/// Origin recorded when nothing usable is found on the request.
pub const UNKNOWN_ORIGIN: &str = "unknown";

/// Extract the real client IP address from an HTTP request.
///
/// Checks headers in order of preference:
/// 1. X-Forwarded-For (first IP in the list)
/// 2. X-Real-IP
/// 3. Remote peer address
pub fn extract_client_ip(req: &HttpRequest) -> Option<String> {
    if let Some(xff) = req.headers().get("x-forwarded-for") {
        if let Ok(xff_str) = xff.to_str() {
            // The first entry is the original client
            if let Some(first_ip) = xff_str.split(',').next() {
                if let Some(ip) = parse_ip(first_ip) {
                    return Some(ip);
                }
            }
        }
    }

    if let Some(xri) = req.headers().get("x-real-ip") {
        if let Ok(xri_str) = xri.to_str() {
            if let Some(ip) = parse_ip(xri_str) {
                return Some(ip);
            }
        }
    }

    req.peer_addr().map(|peer_addr| peer_addr.ip().to_string())
}

/// Client origin, falling back to [`UNKNOWN_ORIGIN`].
pub fn client_origin(req: &HttpRequest) -> String {
    extract_client_ip(req).unwrap_or_else(|| UNKNOWN_ORIGIN.to_string())
}

/// Parse and canonicalize an address so `::1` and `0:0:0:0:0:0:0:1` match.
fn parse_ip(raw: &str) -> Option<String> {
    raw.trim().parse::<IpAddr>().ok().map(|ip| ip.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let req = TestRequest::default()
            .insert_header(("x-forwarded-for", "203.0.113.7, 10.0.0.1"))
            .to_http_request();
        assert_eq!(extract_client_ip(&req), Some("203.0.113.7".to_string()));
    }

    #[test]
    fn test_invalid_forwarded_for_falls_back_to_real_ip() {
        let req = TestRequest::default()
            .insert_header(("x-forwarded-for", "garbage"))
            .insert_header(("x-real-ip", "198.51.100.2"))
            .to_http_request();
        assert_eq!(extract_client_ip(&req), Some("198.51.100.2".to_string()));
    }

    #[test]
    fn test_peer_addr_used_last() {
        let req = TestRequest::default()
            .peer_addr("192.0.2.9:4000".parse().unwrap())
            .to_http_request();
        assert_eq!(client_origin(&req), "192.0.2.9");
    }

    #[test]
    fn test_ipv6_canonicalized() {
        let req = TestRequest::default()
            .insert_header(("x-real-ip", "2001:0db8:0000:0000:0000:0000:0000:0001"))
            .to_http_request();
        assert_eq!(extract_client_ip(&req), Some("2001:db8::1".to_string()));
    }

    #[test]
    fn test_unknown_origin() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(client_origin(&req), UNKNOWN_ORIGIN);
    }
}
