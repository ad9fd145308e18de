use crate::dialer::{Dialer, DialerOption};
use crate::error::{Error, Result};

use std::io;
use std::net::{SocketAddr, ToSocketAddrs};


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyAuth {
    None,
    Credentials { username: String, password: String },
    Isolation,
}

/// A SOCKS5 proxy endpoint. Every dial opens a new connection to it and
/// performs exactly one handshake on that connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proxy {
    pub addr: SocketAddr,
    pub auth: ProxyAuth,
}

impl Proxy {
    pub fn new<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let addr = addr.to_socket_addrs()?.next().ok_or_else(|| {
            io::Error::new(io::ErrorKind::AddrNotAvailable, "proxy address resolved to nothing")
        })?;

        Ok(Self { addr, auth: ProxyAuth::None })
    }

    pub fn with_auth<A, U, P>(addr: A, username: U, password: P) -> Result<Self>
    where
        A: ToSocketAddrs,
        U: Into<String>,
        P: Into<String>,
    {
        let mut proxy = Proxy::new(addr)?;
        proxy.auth = ProxyAuth::Credentials { username: username.into(), password: password.into() };
        Ok(proxy)
    }

    /// Fresh random credentials on every dial, see `DialerOption::TorIsolation`.
    pub fn with_isolation<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let mut proxy = Proxy::new(addr)?;
        proxy.auth = ProxyAuth::Isolation;
        Ok(proxy)
    }

    pub fn options(&self) -> Vec<DialerOption> {
        match &self.auth {
            ProxyAuth::None => Vec::new(),
            ProxyAuth::Credentials { username, .. } if username.is_empty() => Vec::new(),
            ProxyAuth::Credentials { username, password } => {
                vec![DialerOption::auth(username.as_str(), password.as_str())]
            },
            ProxyAuth::Isolation => vec![DialerOption::TorIsolation],
        }
    }

    /// Wraps an already connected stream to this proxy.
    pub fn dialer<S>(&self, stream: S) -> Result<Dialer<S>> {
        Dialer::new(stream, self.options())
    }

    /// Connects to the proxy and asks it for a tunnel to `addr` (`host:port`).
    pub fn dial(&self, addr: &str) -> Result<std::net::TcpStream> {
        let stream = std::net::TcpStream::connect(self.addr)?;
        let _ = stream.set_nodelay(true);
        debug!("connected to socks5 proxy {}", self.addr);

        self.dialer(stream)?.dial(addr)
    }

    pub async fn dial_async(&self, addr: &str) -> Result<tokio::net::TcpStream> {
        let stream = tokio::net::TcpStream::connect(self.addr).await?;
        let _ = stream.set_nodelay(true);
        debug!("connected to socks5 proxy {}", self.addr);

        self.dialer(stream)?.dial_async(addr).await
    }
}

impl std::str::FromStr for Proxy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Proxy::new(s)
    }
}
