#[macro_use]
extern crate log;
extern crate tokio;

// SOCKS Protocol Version 5
// https://tools.ietf.org/html/rfc1928
//
// Username/Password Authentication for SOCKS V5
// https://tools.ietf.org/html/rfc1929
//
// Client side only, CONNECT command only. The target host is always sent as
// a DOMAINNAME and resolved by the proxy.

pub mod socks;
pub mod error;
pub mod codec;
pub mod target;
pub mod handshake;
pub mod dialer;
pub mod proxy;

pub use codec::Credentials;
pub use dialer::{Dialer, DialerOption};
pub use error::{Error, ReplyFailure, Result};
pub use proxy::{Proxy, ProxyAuth};
pub use target::Target;
