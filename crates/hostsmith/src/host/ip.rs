use std::net::IpAddr;

/// Returns true if `token` is a complete IPv4 or IPv6 literal.
///
/// Nothing may surround the address: white space, zone ids (`%eth0`) and
/// prefix lengths (`/24`) all make it invalid.
pub fn is_ip_address(token: &str) -> bool {
    token.parse::<IpAddr>().is_ok()
}
