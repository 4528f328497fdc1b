//! Client IP extraction from proxy headers.

use rocket::http::HeaderMap;

/// Address recorded when no forwarding header is present.
pub const FALLBACK_IP: &str = "127.0.0.1";

/// Headers consulted in priority order. `x-forwarded-for` may hold a
/// comma-separated chain; the first entry is the originating client.
const IP_HEADERS: [&str; 4] = [
    "x-forwarded-for",
    "x-real-ip",
    "cf-connecting-ip",
    "x-client-ip",
];

/// Returns the client IP address advertised by the request headers.
pub fn extract_ip_address(headers: &HeaderMap<'_>) -> String {
    IP_HEADERS
        .iter()
        .filter_map(|name| headers.get_one(name))
        .filter_map(|value| value.split(',').next())
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or(FALLBACK_IP)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::http::Header;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap<'static> {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.add(Header::new(*name, *value));
        }
        map
    }

    #[test]
    fn test_forwarded_for_first_entry_wins() {
        let map = headers(&[
            ("X-Forwarded-For", "198.51.100.7, 10.0.0.1, 10.0.0.2"),
            ("X-Real-IP", "10.0.0.9"),
            ("CF-Connecting-IP", "10.0.0.8"),
            ("X-Client-IP", "10.0.0.7"),
        ]);
        assert_eq!(extract_ip_address(&map), "198.51.100.7");
    }

    #[test]
    fn test_header_precedence() {
        let map = headers(&[
            ("X-Client-IP", "10.0.0.7"),
            ("CF-Connecting-IP", "10.0.0.8"),
            ("X-Real-IP", "10.0.0.9"),
        ]);
        assert_eq!(extract_ip_address(&map), "10.0.0.9");

        let map = headers(&[("X-Client-IP", "10.0.0.7"), ("CF-Connecting-IP", "10.0.0.8")]);
        assert_eq!(extract_ip_address(&map), "10.0.0.8");

        let map = headers(&[("X-Client-IP", "10.0.0.7")]);
        assert_eq!(extract_ip_address(&map), "10.0.0.7");
    }

    #[test]
    fn test_fallback_when_no_headers() {
        assert_eq!(extract_ip_address(&HeaderMap::new()), FALLBACK_IP);
    }

    #[test]
    fn test_blank_forwarded_for_falls_through() {
        let map = headers(&[("X-Forwarded-For", " "), ("X-Real-IP", "10.0.0.9")]);
        assert_eq!(extract_ip_address(&map), "10.0.0.9");
    }
}
