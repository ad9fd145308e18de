use crate::codec::Credentials;
use crate::error::{Error, Result};
use crate::handshake::{self, Handshake};
use crate::target::Target;

use rand::rngs::OsRng;
use rand::RngCore;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;


/// A configuration step applied to a `Dialer` before any I/O happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialerOption {
    /// Offer username/password authentication. An empty username means none.
    Auth { username: String, password: String },
    /// Authenticate with a fresh random username/password pair so the
    /// proxy (e.g. Tor) puts this connection on its own circuit.
    TorIsolation,
}

impl DialerOption {
    pub fn auth<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        DialerOption::Auth { username: username.into(), password: password.into() }
    }

    fn apply(self, settings: &mut Settings) -> Result<()> {
        match self {
            DialerOption::Auth { username, password } => {
                if settings.isolated {
                    return Err(Error::ConfigurationConflict);
                }
                settings.credentials = if username.is_empty() {
                    None
                } else {
                    Some(Credentials::new(username, password)?)
                };
            },
            DialerOption::TorIsolation => {
                if settings.credentials.is_some() {
                    return Err(Error::ConfigurationConflict);
                }
                settings.credentials = Some(isolation_credentials()?);
                settings.isolated = true;
            },
        }

        Ok(())
    }
}

/// 16 random bytes: the first 8 hex-encoded as the username, the rest as the password.
pub fn isolation_credentials() -> Result<Credentials> {
    let mut b = [0u8; 16];
    OsRng.try_fill_bytes(&mut b).map_err(Error::Entropy)?;

    Credentials::new(hex::encode(&b[..8]), hex::encode(&b[8..]))
}

#[derive(Debug, Default)]
struct Settings {
    credentials: Option<Credentials>,
    isolated: bool,
}


/// One handshake attempt over an already connected stream to the proxy.
///
/// The stream is handed back on success; on failure it is closed before the
/// error is returned. A `Dialer` can be dialed once: later calls, from any
/// thread, fail with `Error::AlreadyUsed` without touching the stream.
#[derive(Debug)]
pub struct Dialer<S> {
    stream: Mutex<Option<S>>,
    credentials: Option<Credentials>,
    isolated: bool,
    used: AtomicBool,
}

impl<S> Dialer<S> {
    pub fn new<I>(stream: S, options: I) -> Result<Self>
    where
        I: IntoIterator<Item = DialerOption>,
    {
        let mut settings = Settings::default();
        for opt in options {
            opt.apply(&mut settings)?;
        }

        Ok(Self {
            stream: Mutex::new(Some(stream)),
            credentials: settings.credentials,
            isolated: settings.isolated,
            used: AtomicBool::new(false),
        })
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn is_isolated(&self) -> bool {
        self.isolated
    }

    pub fn is_used(&self) -> bool {
        self.used.load(Ordering::Acquire)
    }

    fn take_stream(&self) -> Result<S> {
        if self.used.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            return Err(Error::AlreadyUsed);
        }

        let mut slot = self.stream.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        slot.take().ok_or(Error::AlreadyUsed)
    }

    fn handshake(&self, target: Target) -> Handshake {
        Handshake::new(self.credentials.clone(), target)
    }
}

impl<S: Read + Write> Dialer<S> {
    /// Asks the proxy for a tunnel to `addr` (`host:port`) over a blocking stream.
    pub fn dial(&self, addr: &str) -> Result<S> {
        let stream = self.take_stream()?;
        let target = Target::parse(addr)?;
        self.connect(stream, target)
    }

    pub fn dial_target(&self, target: Target) -> Result<S> {
        let stream = self.take_stream()?;
        self.connect(stream, target)
    }

    fn connect(&self, mut stream: S, target: Target) -> Result<S> {
        let mut hs = self.handshake(target);
        match handshake::run(&mut hs, &mut stream) {
            Ok(()) => {
                debug!("socks5 tunnel to {} established", hs.target());
                Ok(stream)
            },
            Err(e) => {
                warn!("socks5 handshake to {} failed: {}", hs.target(), e);
                drop(stream);
                Err(e)
            },
        }
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> Dialer<S> {
    /// Same as `dial`, over a tokio stream.
    pub async fn dial_async(&self, addr: &str) -> Result<S> {
        let stream = self.take_stream()?;
        let target = Target::parse(addr)?;
        self.connect_async(stream, target).await
    }

    pub async fn dial_target_async(&self, target: Target) -> Result<S> {
        let stream = self.take_stream()?;
        self.connect_async(stream, target).await
    }

    async fn connect_async(&self, mut stream: S, target: Target) -> Result<S> {
        let mut hs = self.handshake(target);
        match handshake::run_async(&mut hs, &mut stream).await {
            Ok(()) => {
                debug!("socks5 tunnel to {} established", hs.target());
                Ok(stream)
            },
            Err(e) => {
                warn!("socks5 handshake to {} failed: {}", hs.target(), e);
                let _ = stream.shutdown().await;
                Err(e)
            },
        }
    }
}
