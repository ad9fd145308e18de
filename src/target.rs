use crate::error::{Error, Result};

use std::fmt;
use std::str::FromStr;


/// Destination requested through the tunnel. The host is forwarded to the
/// proxy verbatim and never resolved locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    host: String,
    port: u16,
}

impl Target {
    pub fn new<H: Into<String>>(host: H, port: u16) -> Result<Self> {
        let host = host.into();
        if host.len() > u8::MAX as usize {
            return Err(Error::HostTooLong(host.len()));
        }

        Ok(Self { host, port })
    }

    /// Splits `host:port` or `[v6-literal]:port`.
    pub fn parse(addr: &str) -> Result<Self> {
        let invalid = |why: &str| Error::InvalidTarget(format!("{}: {}", addr, why));

        let (host, port) = if let Some(rest) = addr.strip_prefix('[') {
            let end = rest.find(']').ok_or_else(|| invalid("missing ']'"))?;
            let port = rest[end + 1..]
                .strip_prefix(':')
                .ok_or_else(|| invalid("missing port"))?;
            (&rest[..end], port)
        } else {
            let (host, port) = addr.rsplit_once(':').ok_or_else(|| invalid("missing port"))?;
            if host.contains(':') {
                return Err(invalid("too many colons"));
            }
            (host, port)
        };

        if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("invalid port"));
        }
        let port = port.parse::<u16>().map_err(|_| invalid("port out of range"))?;

        Target::new(host, port)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Target::parse(s)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_host_port() {
        let t = Target::parse("example.com:80").unwrap();
        assert_eq!(t.host(), "example.com");
        assert_eq!(t.port(), 80);

        let t: Target = "10.0.0.1:65535".parse().unwrap();
        assert_eq!(t.host(), "10.0.0.1");
        assert_eq!(t.port(), 65535);
    }

    #[test]
    fn parse_bracketed_ipv6() {
        let t = Target::parse("[::1]:443").unwrap();
        assert_eq!(t.host(), "::1");
        assert_eq!(t.port(), 443);
        assert_eq!(t.to_string(), "[::1]:443");
    }

    #[test]
    fn parse_rejects_malformed() {
        for addr in ["example.com", "example.com:", "example.com:http", "example.com:65536", "::1:80", "[::1]80", "[::1"].iter() {
            assert!(matches!(Target::parse(addr), Err(Error::InvalidTarget(_))), "{}", addr);
        }
    }

    #[test]
    fn empty_host_is_allowed() {
        let t = Target::parse(":8080").unwrap();
        assert_eq!(t.host(), "");
        assert_eq!(t.port(), 8080);
    }

    #[test]
    fn host_must_fit_a_length_byte() {
        assert!(Target::new("a".repeat(255), 1).is_ok());
        assert!(matches!(Target::new("a".repeat(256), 1), Err(Error::HostTooLong(256))));
    }
}
