//! Discovery of the caller's public address, used to scope ingress rules
use crate::error::GenerateError;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

/// An IP network in CIDR notation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cidr {
    network: IpAddr,
    prefix: u8,
}

impl Cidr {
    /// The smallest network containing exactly one address
    pub fn host(address: IpAddr) -> Self {
        Cidr {
            network: address,
            prefix: max_prefix(&address),
        }
    }

    /// Network of the given prefix length containing `address`, host bits cleared
    pub fn new(address: IpAddr, prefix: u8) -> Result<Self, GenerateError> {
        if prefix > max_prefix(&address) {
            return Err(GenerateError::InvalidConfig(format!(
                "prefix /{prefix} is too long for {address}"
            )));
        }

        let network = match address {
            IpAddr::V4(v4) => {
                let mask = u32::MAX.checked_shl(32 - prefix as u32).unwrap_or(0);
                IpAddr::from((u32::from(v4) & mask).to_be_bytes())
            }

            IpAddr::V6(v6) => {
                let mask = u128::MAX.checked_shl(128 - prefix as u32).unwrap_or(0);
                IpAddr::from((u128::from(v6) & mask).to_be_bytes())
            }
        };

        Ok(Cidr { network, prefix })
    }

    pub fn is_single_address(&self) -> bool {
        self.prefix == max_prefix(&self.network)
    }
}

fn max_prefix(address: &IpAddr) -> u8 {
    match address {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}

/// Accepts a bare address (a single-host network) or `address/prefix`
impl FromStr for Cidr {
    type Err = GenerateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || GenerateError::InvalidConfig(format!("{value:?} is not a valid CIDR"));

        match value.trim().split_once('/') {
            None => Ok(Cidr::host(value.trim().parse().map_err(|_| invalid())?)),

            Some((address, prefix)) => Cidr::new(
                address.parse().map_err(|_| invalid())?,
                prefix.parse().map_err(|_| invalid())?,
            ),
        }
    }
}

/// Source of the network range ingress rules are scoped to
pub trait SourceRange {
    fn resolve(&self) -> Result<Cidr, GenerateError>;
}

/// A range given up front, no lookup needed
impl SourceRange for Cidr {
    fn resolve(&self) -> Result<Cidr, GenerateError> {
        Ok(*self)
    }
}

/// Asks an external service (e.g. ipify) for the caller's public address
///
/// A single blocking request, failures are not retried.
pub struct HttpLookup {
    url: String,
    timeout: Duration,
}

impl HttpLookup {
    pub fn new(url: &str, timeout: Duration) -> Self {
        HttpLookup {
            url: url.to_string(),
            timeout,
        }
    }

    fn unavailable(&self, reason: impl fmt::Display) -> GenerateError {
        GenerateError::NetworkUnavailable {
            url: self.url.clone(),
            reason: reason.to_string(),
        }
    }
}

impl SourceRange for HttpLookup {
    fn resolve(&self) -> Result<Cidr, GenerateError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| self.unavailable(e))?;

        let body = client
            .get(&self.url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(|e| self.unavailable(e))?;

        let address: IpAddr = body
            .trim()
            .parse()
            .map_err(|_| self.unavailable(format!("not an IP address: {:?}", body.trim())))?;

        log::debug!("Detected public address {address}");
        Ok(Cidr::host(address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    /// Serve a single HTTP response with the given body on a random local port
    fn serve_once(body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();

        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0u8; 1024];
            let _ = stream.read(&mut request);

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );

            stream.write_all(response.as_bytes()).unwrap();
        });

        format!("http://{address}/")
    }

    /// URL on a local port nothing listens on
    fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{address}/")
    }

    #[test]
    fn test_http_lookup_times_out_on_silent_service() {
        // Bound but never accepting, the connection is queued and no response ever comes
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());

        let started = std::time::Instant::now();
        let result = HttpLookup::new(&url, Duration::from_secs(1)).resolve();

        assert!(matches!(
            result,
            Err(GenerateError::NetworkUnavailable { .. })
        ));
        assert!(started.elapsed() < Duration::from_secs(10));
        drop(listener);
    }

    #[test]
    fn test_host_range_contains_exactly_one_address() {
        let v4 = Cidr::host("203.0.113.7".parse().unwrap());
        assert_eq!(v4.to_string(), "203.0.113.7/32");
        assert!(v4.is_single_address());

        let v6 = Cidr::host("2001:db8::1".parse().unwrap());
        assert_eq!(v6.to_string(), "2001:db8::1/128");
        assert!(v6.is_single_address());
    }

    #[test]
    fn test_parse_clears_host_bits() {
        let cidr: Cidr = "10.1.2.3/8".parse().unwrap();
        assert_eq!(cidr.to_string(), "10.0.0.0/8");
        assert!(!cidr.is_single_address());

        let everything: Cidr = "10.1.2.3/0".parse().unwrap();
        assert_eq!(everything.to_string(), "0.0.0.0/0");

        let bare: Cidr = "198.51.100.20".parse().unwrap();
        assert_eq!(bare.to_string(), "198.51.100.20/32");
    }

    #[test]
    fn test_parse_rejects_invalid_ranges() {
        assert!("10.0.0.1/33".parse::<Cidr>().is_err());
        assert!("10.0.0/24".parse::<Cidr>().is_err());
        assert!("example.com".parse::<Cidr>().is_err());
        assert!("10.0.0.1/x".parse::<Cidr>().is_err());
    }

    #[test]
    fn test_http_lookup_returns_single_host_range() {
        let lookup = HttpLookup::new(&serve_once("203.0.113.7\n"), Duration::from_secs(5));
        assert_eq!(lookup.resolve().unwrap().to_string(), "203.0.113.7/32");
    }

    #[test]
    fn test_http_lookup_rejects_garbage_body() {
        let lookup = HttpLookup::new(&serve_once("<html>oops</html>"), Duration::from_secs(5));
        assert!(matches!(
            lookup.resolve(),
            Err(GenerateError::NetworkUnavailable { .. })
        ));
    }

    #[test]
    fn test_http_lookup_unreachable_service() {
        let lookup = HttpLookup::new(&closed_port_url(), Duration::from_secs(5));
        assert!(matches!(
            lookup.resolve(),
            Err(GenerateError::NetworkUnavailable { .. })
        ));
    }
}
