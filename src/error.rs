use crate::socks::*;

use std::fmt;
use std::io;


pub type Result<T> = std::result::Result<T, Error>;

/// Why the proxy refused a CONNECT request (RFC 1928 REP field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplyFailure {
    GeneralFailure,
    ConnectionNotAllowed,
    NetworkUnreachable,
    HostUnreachable,
    ConnectionRefused,
    TtlExpired,
    CommandNotSupported,
    AddressTypeNotSupported,
}

impl ReplyFailure {
    /// Maps a non-success REP byte to its reason. Unassigned codes yield `None`.
    pub fn from_status(status: u8) -> Option<Self> {
        match status {
            SOCKS_REP_GENERAL_SERVER_FAILURE            => Some(ReplyFailure::GeneralFailure),
            SOCKS_REP_CONNECTION_NOT_ALLOWED_BY_RULESET => Some(ReplyFailure::ConnectionNotAllowed),
            SOCKS_REP_NETWORK_UNREACHABLE               => Some(ReplyFailure::NetworkUnreachable),
            SOCKS_REP_HOST_UNREACHABLE                  => Some(ReplyFailure::HostUnreachable),
            SOCKS_REP_CONNECTION_REFUSED                => Some(ReplyFailure::ConnectionRefused),
            SOCKS_REP_TTL_EXPIRED                       => Some(ReplyFailure::TtlExpired),
            SOCKS_REP_COMMAND_NOT_SUPPORTED             => Some(ReplyFailure::CommandNotSupported),
            SOCKS_REP_ADDRESS_TYPE_NOT_SUPPORTED        => Some(ReplyFailure::AddressTypeNotSupported),
            _ => None,
        }
    }

    pub fn status(&self) -> u8 {
        match self {
            ReplyFailure::GeneralFailure          => SOCKS_REP_GENERAL_SERVER_FAILURE,
            ReplyFailure::ConnectionNotAllowed    => SOCKS_REP_CONNECTION_NOT_ALLOWED_BY_RULESET,
            ReplyFailure::NetworkUnreachable      => SOCKS_REP_NETWORK_UNREACHABLE,
            ReplyFailure::HostUnreachable         => SOCKS_REP_HOST_UNREACHABLE,
            ReplyFailure::ConnectionRefused       => SOCKS_REP_CONNECTION_REFUSED,
            ReplyFailure::TtlExpired              => SOCKS_REP_TTL_EXPIRED,
            ReplyFailure::CommandNotSupported     => SOCKS_REP_COMMAND_NOT_SUPPORTED,
            ReplyFailure::AddressTypeNotSupported => SOCKS_REP_ADDRESS_TYPE_NOT_SUPPORTED,
        }
    }

    fn io_kind(&self) -> io::ErrorKind {
        match self {
            ReplyFailure::ConnectionRefused    => io::ErrorKind::ConnectionRefused,
            ReplyFailure::ConnectionNotAllowed => io::ErrorKind::PermissionDenied,
            ReplyFailure::TtlExpired           => io::ErrorKind::TimedOut,
            _ => io::ErrorKind::Other,
        }
    }
}

impl fmt::Display for ReplyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReplyFailure::GeneralFailure          => "general failure",
            ReplyFailure::ConnectionNotAllowed    => "connection not allowed by ruleset",
            ReplyFailure::NetworkUnreachable      => "network unreachable",
            ReplyFailure::HostUnreachable         => "host unreachable",
            ReplyFailure::ConnectionRefused       => "connection refused by destination host",
            ReplyFailure::TtlExpired              => "TTL expired",
            ReplyFailure::CommandNotSupported     => "command not supported / protocol error",
            ReplyFailure::AddressTypeNotSupported => "address type not supported",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid proxy response")]
    InvalidResponse,

    #[error("no acceptable authentication method")]
    NoAcceptableAuthMethod,

    #[error("authentication failed")]
    AuthFailed,

    #[error("{0}")]
    ConnectRejected(ReplyFailure),

    #[error("connection already used")]
    AlreadyUsed,

    #[error("credentials already set")]
    ConfigurationConflict,

    #[error("host name too long ({0} bytes, max 255)")]
    HostTooLong(usize),

    #[error("username or password too long (max 255 bytes)")]
    CredentialTooLong,

    #[error("invalid target address: {0}")]
    InvalidTarget(String),

    #[error("failed to gather random bytes: {0}")]
    Entropy(rand::Error),

    #[error(transparent)]
    Transport(#[from] io::Error),
}

impl From<Error> for io::Error {
    fn from(e: Error) -> io::Error {
        let kind = match e {
            Error::Transport(inner) => return inner,
            Error::ConnectRejected(ref reason) => reason.io_kind(),
            Error::AuthFailed | Error::NoAcceptableAuthMethod => io::ErrorKind::PermissionDenied,
            Error::InvalidResponse => io::ErrorKind::InvalidData,
            Error::HostTooLong(_)
            | Error::CredentialTooLong
            | Error::InvalidTarget(_)
            | Error::ConfigurationConflict => io::ErrorKind::InvalidInput,
            Error::AlreadyUsed | Error::Entropy(_) => io::ErrorKind::Other,
        };
        io::Error::new(kind, e)
    }
}
