//! Sending a ClientHello and collecting the server's first flight.
//!
//! The transport only moves bytes; all interpretation goes through the
//! record and handshake parsers.

use crate::config::{BuiltClientHello, ClientHelloSpec};
use crate::extensions::ExtensionPolicy;
use crate::handshake::{decode_server_hello_with, parse_handshake, HandshakeType, ServerHello};
use crate::keyshare::EphemeralKeyShares;
use crate::random::OsRandom;
use crate::record::{parse_record, ContentType, Record, RecordIter, RECORD_HEADER_LEN};
use hforge_types::{CodecError, CodecResult};
use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default connect and I/O timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on bytes collected from the server: one maximal record.
pub const MAX_RESPONSE_LEN: usize = RECORD_HEADER_LEN + u16::MAX as usize;

const READ_CHUNK: usize = 8192;

/// Bytes written and bytes read during one hello exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub sent: Vec<u8>,
    pub received: Vec<u8>,
}

/// What the server's first record turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerResponse {
    ServerHello(ServerHello),
    Alert { level: u8, description: u8 },
    Other(Record),
}

impl Exchange {
    /// Every complete record in the response; a trailing partial record is ignored.
    pub fn records(&self) -> Vec<Record> {
        RecordIter::new(&self.received)
            .map_while(Result::ok)
            .collect()
    }

    /// Classify the first record of the response.
    pub fn server_response(&self, policy: ExtensionPolicy) -> CodecResult<ServerResponse> {
        let (record, _) = parse_record(&self.received)?;
        match record.content_type() {
            ContentType::Alert => match record.payload() {
                [level, description, ..] => Ok(ServerResponse::Alert {
                    level: *level,
                    description: *description,
                }),
                short => Err(CodecError::truncated("alert", 2, short.len())),
            },
            ContentType::Handshake => {
                let (msg, _) = parse_handshake(record.payload())?;
                if msg.msg_type() != HandshakeType::ServerHello {
                    return Ok(ServerResponse::Other(record));
                }
                Ok(ServerResponse::ServerHello(decode_server_hello_with(
                    msg.body(),
                    policy,
                )?))
            }
            _ => Ok(ServerResponse::Other(record)),
        }
    }
}

/// Resolve `host:port` and connect with `timeout` applied to connect, read and write.
pub fn connect(host: &str, port: u16, timeout: Duration) -> CodecResult<TcpStream> {
    let addr = (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| CodecError::malformed("connect", format!("cannot resolve '{host}'")))?;
    debug!(%addr, "connecting");
    let stream = TcpStream::connect_timeout(&addr, timeout)?;
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;
    Ok(stream)
}

/// Length of the first complete record in `buf`, if one is buffered.
fn first_record_len(buf: &[u8]) -> Option<usize> {
    if buf.len() < RECORD_HEADER_LEN {
        return None;
    }
    let len = RECORD_HEADER_LEN + u16::from_be_bytes([buf[3], buf[4]]) as usize;
    (buf.len() >= len).then_some(len)
}

/// Write `hello` and read until at least one full record has arrived.
///
/// EOF after a partial record returns what was received; EOF before any
/// byte is a `TruncatedInput`.
pub fn exchange_hello<S: Read + Write>(stream: &mut S, hello: &[u8]) -> CodecResult<Exchange> {
    stream.write_all(hello)?;
    stream.flush()?;

    let mut received = Vec::with_capacity(READ_CHUNK);
    let mut tmp = [0u8; READ_CHUNK];
    while first_record_len(&received).is_none() && received.len() < MAX_RESPONSE_LEN {
        let n = stream.read(&mut tmp)?;
        if n == 0 {
            break;
        }
        received.extend_from_slice(&tmp[..n]);
    }
    if received.is_empty() {
        return Err(CodecError::truncated("server response", RECORD_HEADER_LEN, 0));
    }
    debug!(sent = hello.len(), received = received.len(), "hello exchange complete");
    Ok(Exchange {
        sent: hello.to_vec(),
        received,
    })
}

/// Outcome of [`perform_handshake`].
#[derive(Debug, Clone)]
pub struct HandshakeAttempt {
    pub client_hello: BuiltClientHello,
    pub exchange: Exchange,
}

/// Build a ClientHello from `spec`, send it to `host:port` and collect the reply.
pub fn perform_handshake(
    spec: &ClientHelloSpec,
    host: &str,
    port: u16,
    timeout: Duration,
) -> CodecResult<HandshakeAttempt> {
    let mut rng = OsRandom;
    let mut keys = EphemeralKeyShares::new(OsRandom);
    let client_hello = spec.build_client_hello(&mut rng, &mut keys)?;
    let wire = client_hello.to_record_bytes()?;

    let mut stream = connect(host, port, timeout)?;
    info!(host, port, bytes = wire.len(), "sending ClientHello");
    let exchange = exchange_hello(&mut stream, &wire)?;
    if let Err(e) = stream.shutdown(std::net::Shutdown::Both) {
        warn!(error = %e, "shutdown failed");
    }
    Ok(HandshakeAttempt {
        client_hello,
        exchange,
    })
}

/// Async variants over tokio.
#[cfg(feature = "async")]
pub mod tokio_io {
    use super::*;
    use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

    fn timed_out(what: &str) -> CodecError {
        CodecError::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            format!("{what} timed out"),
        ))
    }

    pub async fn connect(
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> CodecResult<tokio::net::TcpStream> {
        tokio::time::timeout(timeout, tokio::net::TcpStream::connect((host, port)))
            .await
            .map_err(|_| timed_out("connect"))?
            .map_err(CodecError::from)
    }

    pub async fn exchange_hello<S: AsyncRead + AsyncWrite + Unpin>(
        stream: &mut S,
        hello: &[u8],
    ) -> CodecResult<Exchange> {
        stream.write_all(hello).await?;
        stream.flush().await?;

        let mut received = Vec::with_capacity(READ_CHUNK);
        let mut tmp = [0u8; READ_CHUNK];
        while first_record_len(&received).is_none() && received.len() < MAX_RESPONSE_LEN {
            let n = stream.read(&mut tmp).await?;
            if n == 0 {
                break;
            }
            received.extend_from_slice(&tmp[..n]);
        }
        if received.is_empty() {
            return Err(CodecError::truncated("server response", RECORD_HEADER_LEN, 0));
        }
        Ok(Exchange {
            sent: hello.to_vec(),
            received,
        })
    }

    pub async fn perform_handshake(
        spec: &ClientHelloSpec,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> CodecResult<HandshakeAttempt> {
        let mut rng = OsRandom;
        let mut keys = EphemeralKeyShares::new(OsRandom);
        let client_hello = spec.build_client_hello(&mut rng, &mut keys)?;
        let wire = client_hello.to_record_bytes()?;

        let mut stream = connect(host, port, timeout).await?;
        info!(host, port, bytes = wire.len(), "sending ClientHello");
        let exchange = tokio::time::timeout(timeout, exchange_hello(&mut stream, &wire))
            .await
            .map_err(|_| timed_out("hello exchange"))??;
        Ok(HandshakeAttempt {
            client_hello,
            exchange,
        })
    }
}
