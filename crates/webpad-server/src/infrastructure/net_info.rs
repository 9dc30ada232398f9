//! Local network address discovery for the startup banner.
//!
//! Players join by opening the host's LAN address in a phone browser, so the
//! binary prints that address at startup.  The LAN IP is found by "connecting"
//! a UDP socket to a public address: no packet is sent, but the OS picks the
//! outbound interface and binds the socket to its address.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use tracing::debug;

/// Any routable address works; nothing is ever sent to it.
const PROBE_TARGET: &str = "8.8.8.8:80";

/// Returns the host's LAN IP, or `127.0.0.1` if it cannot be determined
/// (e.g., no network interface is up).
pub fn local_ip() -> IpAddr {
    match probe_outbound_ip() {
        Ok(ip) if !ip.is_unspecified() => ip,
        Ok(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
        Err(e) => {
            debug!("LAN address discovery failed: {e}; falling back to loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

fn probe_outbound_ip() -> std::io::Result<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    socket.connect(PROBE_TARGET)?;
    Ok(socket.local_addr()?.ip())
}

/// The URLs players can open, local first.
pub fn banner_urls(lan_ip: IpAddr, port: u16) -> Vec<String> {
    let mut urls = vec![format!("http://localhost:{port}")];
    if !lan_ip.is_loopback() {
        urls.push(format!("http://{lan_ip}:{port}"));
    }
    urls
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_ip_is_never_unspecified() {
        assert!(!local_ip().is_unspecified());
    }

    #[test]
    fn test_banner_urls_include_lan_address() {
        let ip: IpAddr = "192.168.1.20".parse().unwrap();
        assert_eq!(
            banner_urls(ip, 5000),
            vec!["http://localhost:5000", "http://192.168.1.20:5000"]
        );
    }

    #[test]
    fn test_banner_urls_skip_duplicate_loopback() {
        let urls = banner_urls(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080);
        assert_eq!(urls, vec!["http://localhost:8080"]);
    }
}
