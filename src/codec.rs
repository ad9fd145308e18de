// Byte layouts for the client side of RFC 1928 / RFC 1929.
//
// Everything here is pure: frames are built into fresh buffers and replies
// are decoded from slices that already hold exactly the expected bytes.
use crate::error::{Error, Result, ReplyFailure};
use crate::socks::*;

use std::net::{Ipv4Addr, Ipv6Addr};


/// Username/password pair for RFC 1929 subnegotiation.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new<U: Into<String>, P: Into<String>>(username: U, password: P) -> Result<Self> {
        let username = username.into();
        let password = password.into();
        if username.len() > u8::MAX as usize || password.len() > u8::MAX as usize {
            return Err(Error::CredentialTooLong);
        }

        Ok(Self { username, password })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Authentication method picked by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    NoAuth,
    UsernamePassword,
}

/// Address type announced in a reply, with the width of the address field it selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrKind {
    /// 4 bytes.
    Ipv4,
    /// 16 bytes.
    Ipv6,
    /// One length byte, then that many bytes.
    Domain,
}

impl AddrKind {
    pub fn from_atyp(atyp: u8) -> Result<Self> {
        match atyp {
            SOCKS_ATYP_IPV4        => Ok(AddrKind::Ipv4),
            SOCKS_ATYP_IPV6        => Ok(AddrKind::Ipv6),
            SOCKS_ATYP_DOMAIN_NAME => Ok(AddrKind::Domain),
            _ => Err(Error::InvalidResponse),
        }
    }

    /// Width of the address field, `None` when it is length-prefixed.
    pub fn fixed_len(&self) -> Option<usize> {
        match self {
            AddrKind::Ipv4   => Some(4),
            AddrKind::Ipv6   => Some(16),
            AddrKind::Domain => None,
        }
    }
}

/// BND.ADDR / BND.PORT from a CONNECT reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundAddr {
    Ipv4(Ipv4Addr, u16),
    Ipv6(Ipv6Addr, u16),
    Domain(Vec<u8>, u16),
}


// +----+----------+----------+
// |VER | NMETHODS | METHODS  |
// +----+----------+----------+
// | 1  |    1     | 1 to 255 |
// +----+----------+----------+
pub fn encode_greeting(with_passwd_auth: bool) -> Vec<u8> {
    if with_passwd_auth {
        vec![SOCKS_V5, 2, SOCKS_METHOD_NO_AUTH, SOCKS_METHOD_PASSWD_AUTH]
    } else {
        vec![SOCKS_V5, 1, SOCKS_METHOD_NO_AUTH]
    }
}

// +----+--------+
// |VER | METHOD |
// +----+--------+
// | 1  |   1    |
// +----+--------+
pub fn decode_method_selection(pkt: &[u8]) -> Result<Method> {
    if pkt.len() != 2 || pkt[0] != SOCKS_V5 {
        return Err(Error::InvalidResponse);
    }

    match pkt[1] {
        SOCKS_METHOD_NO_AUTH     => Ok(Method::NoAuth),
        SOCKS_METHOD_PASSWD_AUTH => Ok(Method::UsernamePassword),
        SOCKS_METHOD_GSSAPI | SOCKS_METHOD_NO_ACCEPTABLE => Err(Error::NoAcceptableAuthMethod),
        _ => Err(Error::InvalidResponse),
    }
}

// +----+------+----------+------+----------+
// |VER | ULEN |  UNAME   | PLEN |  PASSWD  |
// +----+------+----------+------+----------+
// | 1  |  1   | 1 to 255 |  1   | 1 to 255 |
// +----+------+----------+------+----------+
pub fn encode_passwd_auth(credentials: &Credentials) -> Result<Vec<u8>> {
    let user = credentials.username.as_bytes();
    let pass = credentials.password.as_bytes();
    if user.len() > u8::MAX as usize || pass.len() > u8::MAX as usize {
        return Err(Error::CredentialTooLong);
    }

    let mut buf = Vec::with_capacity(3 + user.len() + pass.len());
    buf.push(SOCKS_PASSWD_AUTH_V1);
    buf.push(user.len() as u8);
    buf.extend_from_slice(user);
    buf.push(pass.len() as u8);
    buf.extend_from_slice(pass);

    Ok(buf)
}

// +----+--------+
// |VER | STATUS |
// +----+--------+
// | 1  |   1    |
// +----+--------+
pub fn decode_passwd_auth_reply(pkt: &[u8]) -> Result<()> {
    if pkt.len() != 2 || pkt[0] != SOCKS_PASSWD_AUTH_V1 {
        return Err(Error::InvalidResponse);
    }
    if pkt[1] != SOCKS_PASSWD_AUTH_SUCCEEDED {
        return Err(Error::AuthFailed);
    }

    Ok(())
}

// +----+-----+-------+------+----------+----------+
// |VER | CMD |  RSV  | ATYP | DST.ADDR | DST.PORT |
// +----+-----+-------+------+----------+----------+
// | 1  |  1  | X'00' |  1   | Variable |    2     |
// +----+-----+-------+------+----------+----------+
//
// DST.ADDR is always sent as a DOMAINNAME so the proxy does the resolving.
pub fn encode_connect_request(host: &str, port: u16) -> Result<Vec<u8>> {
    let name = host.as_bytes();
    if name.len() > u8::MAX as usize {
        return Err(Error::HostTooLong(name.len()));
    }

    let mut buf = Vec::with_capacity(7 + name.len());
    buf.push(SOCKS_V5);
    buf.push(SOCKS_CMD_CONNECT);
    buf.push(0x00);
    buf.push(SOCKS_ATYP_DOMAIN_NAME);
    buf.push(name.len() as u8);
    buf.extend_from_slice(name);
    buf.extend_from_slice(&port.to_be_bytes());

    Ok(buf)
}

// +----+-----+-------+------+----------+----------+
// |VER | REP |  RSV  | ATYP | BND.ADDR | BND.PORT |
// +----+-----+-------+------+----------+----------+
// | 1  |  1  | X'00' |  1   | Variable |    2     |
// +----+-----+-------+------+----------+----------+
//
// Decodes the first four bytes. The status is checked before ATYP, so a
// refusal carrying a garbage address type still reports the refusal.
pub fn decode_reply_header(pkt: &[u8]) -> Result<AddrKind> {
    if pkt.len() != 4 || pkt[0] != SOCKS_V5 {
        return Err(Error::InvalidResponse);
    }

    let status = pkt[1];
    if status != SOCKS_REP_SUCCEEDED {
        return match ReplyFailure::from_status(status) {
            Some(reason) => Err(Error::ConnectRejected(reason)),
            None => Err(Error::InvalidResponse),
        };
    }

    AddrKind::from_atyp(pkt[3])
}

/// Decodes BND.ADDR followed by BND.PORT. For `AddrKind::Domain` the
/// length byte has already been consumed and `pkt` holds name + port.
pub fn decode_bound_addr(kind: AddrKind, pkt: &[u8]) -> Result<BoundAddr> {
    if pkt.len() < 2 {
        return Err(Error::InvalidResponse);
    }
    let (addr, port) = pkt.split_at(pkt.len() - 2);
    let port = u16::from_be_bytes([port[0], port[1]]);

    match kind {
        AddrKind::Ipv4 => {
            let mut octets = [0u8; 4];
            if addr.len() != octets.len() {
                return Err(Error::InvalidResponse);
            }
            octets.copy_from_slice(addr);
            Ok(BoundAddr::Ipv4(Ipv4Addr::from(octets), port))
        },
        AddrKind::Ipv6 => {
            let mut octets = [0u8; 16];
            if addr.len() != octets.len() {
                return Err(Error::InvalidResponse);
            }
            octets.copy_from_slice(addr);
            Ok(BoundAddr::Ipv6(Ipv6Addr::from(octets), port))
        },
        AddrKind::Domain => Ok(BoundAddr::Domain(addr.to_vec(), port)),
    }
}
