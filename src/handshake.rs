// Client-side SOCKS5 negotiation.
//
// `Handshake` holds no stream. Each `step` consumes the bytes of the reply
// it asked for last time and says what to write next and exactly how many
// bytes to read back. `run` and `run_async` drive it over a blocking or a
// tokio stream; both write a frame only after the previous reply was read
// in full.
use crate::codec::{self, AddrKind, Credentials, Method};
use crate::error::{Error, Result};
use crate::target::Target;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use std::io::{Read, Write};
use std::mem;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Init,
    MethodNegotiation,
    UsernamePasswordAuth,
    /// CONNECT request written, waiting for VER REP RSV ATYP.
    ConnectReply,
    /// Reply carries a DOMAINNAME, waiting for its length byte.
    BoundAddrLen,
    /// Waiting for BND.ADDR + BND.PORT.
    BoundAddr(AddrKind),
    Established,
    Failed,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Next {
    /// Write `send` (if any), then read exactly `recv` bytes and feed them back.
    Exchange { send: Option<Vec<u8>>, recv: usize },
    Established,
}

#[derive(Debug)]
pub struct Handshake {
    state: State,
    credentials: Option<Credentials>,
    target: Target,
}

impl Handshake {
    pub fn new(credentials: Option<Credentials>, target: Target) -> Self {
        Self { state: State::Init, credentials, target }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Advances the machine. Any error leaves it in `State::Failed` for good.
    pub fn step(&mut self, input: &[u8]) -> Result<Next> {
        let prev = mem::replace(&mut self.state, State::Failed);
        let (state, next) = self.transition(prev, input)?;
        if state != prev {
            debug!("socks5 handshake to {}: {:?} -> {:?}", self.target, prev, state);
        }
        self.state = state;

        Ok(next)
    }

    fn transition(&self, state: State, input: &[u8]) -> Result<(State, Next)> {
        match state {
            State::Init => {
                let greeting = codec::encode_greeting(self.credentials.is_some());
                Ok((State::MethodNegotiation, exchange(greeting, 2)))
            },
            State::MethodNegotiation => match codec::decode_method_selection(input)? {
                Method::NoAuth => self.connect_request(),
                Method::UsernamePassword => {
                    // Selecting a method we never offered is a protocol violation.
                    let credentials = self.credentials.as_ref().ok_or(Error::InvalidResponse)?;
                    let pkt = codec::encode_passwd_auth(credentials)?;
                    Ok((State::UsernamePasswordAuth, exchange(pkt, 2)))
                },
            },
            State::UsernamePasswordAuth => {
                codec::decode_passwd_auth_reply(input)?;
                self.connect_request()
            },
            State::ConnectReply => {
                let kind = codec::decode_reply_header(input)?;
                match kind.fixed_len() {
                    Some(len) => Ok((State::BoundAddr(kind), receive(len + 2))),
                    None => Ok((State::BoundAddrLen, receive(1))),
                }
            },
            State::BoundAddrLen => {
                if input.len() != 1 {
                    return Err(Error::InvalidResponse);
                }
                Ok((State::BoundAddr(AddrKind::Domain), receive(input[0] as usize + 2)))
            },
            State::BoundAddr(kind) => {
                let bound = codec::decode_bound_addr(kind, input)?;
                trace!("socks5 proxy bound {:?} for {}", bound, self.target);
                Ok((State::Established, Next::Established))
            },
            State::Established => Ok((State::Established, Next::Established)),
            State::Failed => Err(Error::AlreadyUsed),
        }
    }

    fn connect_request(&self) -> Result<(State, Next)> {
        let pkt = codec::encode_connect_request(self.target.host(), self.target.port())?;
        Ok((State::ConnectReply, exchange(pkt, 4)))
    }
}

fn exchange(send: Vec<u8>, recv: usize) -> Next {
    Next::Exchange { send: Some(send), recv }
}

fn receive(recv: usize) -> Next {
    Next::Exchange { send: None, recv }
}


/// Drives `handshake` to completion over a blocking stream.
pub fn run<S: Read + Write>(handshake: &mut Handshake, stream: &mut S) -> Result<()> {
    let mut input = Vec::new();
    loop {
        match handshake.step(&input)? {
            Next::Established => return Ok(()),
            Next::Exchange { send, recv } => {
                if let Some(pkt) = send {
                    stream.write_all(&pkt)?;
                    stream.flush()?;
                }
                input.resize(recv, 0);
                stream.read_exact(&mut input)?;
            },
        }
    }
}

/// Drives `handshake` to completion over a tokio stream.
pub async fn run_async<S>(handshake: &mut Handshake, stream: &mut S) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut input = Vec::new();
    loop {
        match handshake.step(&input)? {
            Next::Established => return Ok(()),
            Next::Exchange { send, recv } => {
                if let Some(pkt) = send {
                    stream.write_all(&pkt).await?;
                    stream.flush().await?;
                }
                input.resize(recv, 0);
                stream.read_exact(&mut input).await?;
            },
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReplyFailure;

    use std::io::{self, Cursor};

    fn target() -> Target {
        Target::new("example.com", 80).unwrap()
    }

    fn expect_exchange(next: Next) -> (Option<Vec<u8>>, usize) {
        match next {
            Next::Exchange { send, recv } => (send, recv),
            Next::Established => panic!("unexpected Established"),
        }
    }

    #[test]
    fn no_auth_walk_through_states() {
        let mut hs = Handshake::new(None, target());
        assert_eq!(hs.state(), State::Init);

        let (send, recv) = expect_exchange(hs.step(&[]).unwrap());
        assert_eq!(send.unwrap(), [0x05, 0x01, 0x00]);
        assert_eq!(recv, 2);
        assert_eq!(hs.state(), State::MethodNegotiation);

        let (send, recv) = expect_exchange(hs.step(&[0x05, 0x00]).unwrap());
        assert_eq!(send.unwrap(), b"\x05\x01\x00\x03\x0bexample.com\x00\x50");
        assert_eq!(recv, 4);
        assert_eq!(hs.state(), State::ConnectReply);

        let (send, recv) = expect_exchange(hs.step(&[0x05, 0x00, 0x00, 0x01]).unwrap());
        assert_eq!(send, None);
        assert_eq!(recv, 6);
        assert_eq!(hs.state(), State::BoundAddr(AddrKind::Ipv4));

        assert_eq!(hs.step(&[127, 0, 0, 1, 0x1F, 0x90]).unwrap(), Next::Established);
        assert_eq!(hs.state(), State::Established);
    }

    #[test]
    fn passwd_auth_is_entered_when_selected() {
        let creds = Credentials::new("user", "pass").unwrap();
        let mut hs = Handshake::new(Some(creds), target());

        let (send, _) = expect_exchange(hs.step(&[]).unwrap());
        assert_eq!(send.unwrap(), [0x05, 0x02, 0x00, 0x02]);

        let (send, recv) = expect_exchange(hs.step(&[0x05, 0x02]).unwrap());
        assert_eq!(send.unwrap(), b"\x01\x04user\x04pass");
        assert_eq!(recv, 2);
        assert_eq!(hs.state(), State::UsernamePasswordAuth);

        let (send, _) = expect_exchange(hs.step(&[0x01, 0x00]).unwrap());
        assert_eq!(send.unwrap()[..4], [0x05, 0x01, 0x00, 0x03]);
        assert_eq!(hs.state(), State::ConnectReply);
    }

    #[test]
    fn unoffered_passwd_auth_is_invalid() {
        let mut hs = Handshake::new(None, target());
        hs.step(&[]).unwrap();
        assert!(matches!(hs.step(&[0x05, 0x02]), Err(Error::InvalidResponse)));
        assert_eq!(hs.state(), State::Failed);
    }

    #[test]
    fn domain_bound_addr_reads_length_first() {
        let mut hs = Handshake::new(None, target());
        hs.step(&[]).unwrap();
        hs.step(&[0x05, 0x00]).unwrap();

        let (_, recv) = expect_exchange(hs.step(&[0x05, 0x00, 0x00, 0x03]).unwrap());
        assert_eq!(recv, 1);
        assert_eq!(hs.state(), State::BoundAddrLen);

        let (_, recv) = expect_exchange(hs.step(&[3]).unwrap());
        assert_eq!(recv, 5);

        assert_eq!(hs.step(b"abc\x00\x50").unwrap(), Next::Established);
    }

    #[test]
    fn ipv6_bound_addr_width() {
        let mut hs = Handshake::new(None, target());
        hs.step(&[]).unwrap();
        hs.step(&[0x05, 0x00]).unwrap();

        let (_, recv) = expect_exchange(hs.step(&[0x05, 0x00, 0x00, 0x04]).unwrap());
        assert_eq!(recv, 18);
    }

    #[test]
    fn failed_machine_stays_failed() {
        let mut hs = Handshake::new(None, target());
        hs.step(&[]).unwrap();
        assert!(matches!(hs.step(&[0x05, 0xFF]), Err(Error::NoAcceptableAuthMethod)));
        assert!(matches!(hs.step(&[0x05, 0x00]), Err(Error::AlreadyUsed)));
    }

    // Scripted reply bytes on the read side, captured frames on the write side.
    struct Script {
        reply: Cursor<Vec<u8>>,
        written: Vec<u8>,
    }

    impl Read for Script {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            Read::read(&mut self.reply, buf)
        }
    }

    impl Write for Script {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn blocking_driver_consumes_whole_reply() {
        let mut stream = Script {
            reply: Cursor::new(b"\x05\x00\x05\x00\x00\x03\x05proxy\x04\x38".to_vec()),
            written: Vec::new(),
        };
        let mut hs = Handshake::new(None, target());
        run(&mut hs, &mut stream).unwrap();

        assert_eq!(stream.reply.position() as usize, stream.reply.get_ref().len());
        assert_eq!(stream.written[..3], [0x05, 0x01, 0x00]);
        assert_eq!(stream.written[3..], b"\x05\x01\x00\x03\x0bexample.com\x00\x50"[..]);
    }

    #[test]
    fn blocking_driver_short_read_is_transport_error() {
        let mut stream = Script {
            reply: Cursor::new(b"\x05\x00\x05\x00\x00\x01\x7f\x00".to_vec()),
            written: Vec::new(),
        };
        let mut hs = Handshake::new(None, target());
        match run(&mut hs, &mut stream) {
            Err(Error::Transport(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn blocking_driver_reports_refusal() {
        let mut stream = Script {
            reply: Cursor::new(b"\x05\x00\x05\x05\x00\x01".to_vec()),
            written: Vec::new(),
        };
        let mut hs = Handshake::new(None, target());
        assert!(matches!(
            run(&mut hs, &mut stream),
            Err(Error::ConnectRejected(ReplyFailure::ConnectionRefused))
        ));
    }

    #[tokio::test]
    async fn async_driver_over_duplex() {
        let (mut client, mut server) = tokio::io::duplex(512);

        let proxy = tokio::spawn(async move {
            let mut greeting = [0u8; 3];
            server.read_exact(&mut greeting).await.unwrap();
            assert_eq!(greeting, [0x05, 0x01, 0x00]);
            server.write_all(&[0x05, 0x00]).await.unwrap();

            let mut request = vec![0u8; 7 + "example.com".len()];
            server.read_exact(&mut request).await.unwrap();
            assert_eq!(&request[5..16], b"example.com");
            server.write_all(&[0x05, 0x00, 0x00, 0x01, 0, 0, 0, 0, 0, 0]).await.unwrap();
            server
        });

        let mut hs = Handshake::new(None, target());
        run_async(&mut hs, &mut client).await.unwrap();
        assert_eq!(hs.state(), State::Established);
        proxy.await.unwrap();
    }
}
