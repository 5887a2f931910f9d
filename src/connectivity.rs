use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use reqwest::Url;

/// Host and port the feed lives on, taken from the configured base URL.
pub fn probe_target(api_base: &str) -> Option<(String, u16)> {
    let url = Url::parse(api_base).ok()?;
    let host = url.host_str()?.to_string();
    let port = url.port_or_known_default()?;
    Some((host, port))
}

/// One-shot reachability check run before every refresh: resolve the feed
/// host and open a TCP connection to it. Resolution and each connect are
/// bounded by `timeout`.
pub fn is_online(api_base: &str, timeout: Duration) -> bool {
    let Some((host, port)) = probe_target(api_base) else {
        return false;
    };
    resolve(host, port, timeout)
        .iter()
        .any(|addr| TcpStream::connect_timeout(addr, timeout).is_ok())
}

/// The system resolver has no timeout of its own, so it runs on a helper
/// thread. A lookup that outlives `timeout` is abandoned and counts as offline.
fn resolve(host: String, port: u16, timeout: Duration) -> Vec<SocketAddr> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let addrs = (host.as_str(), port)
            .to_socket_addrs()
            .map(|addrs| addrs.collect::<Vec<_>>());
        let _ = tx.send(addrs);
    });
    match rx.recv_timeout(timeout) {
        Ok(Ok(addrs)) => addrs,
        _ => Vec::new(),
    }
}
