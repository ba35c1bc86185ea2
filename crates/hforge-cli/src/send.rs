//! Send a crafted ClientHello to a live server (`send`).

use crate::dump;
use crate::hello_args::HelloArgs;
use hforge_tls::extensions::ExtensionPolicy;
use hforge_tls::params::{format_code, DEFAULT_PORT};
use hforge_tls::transport::{perform_handshake, ServerResponse};
use std::net::Ipv6Addr;
use std::time::Duration;
use tracing::{info, warn};

pub fn run(
    connect: Option<&str>,
    args: &HelloArgs,
    timeout: u64,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (params, mut spec) = args.spec()?;
    let (host, port) = match connect {
        Some(c) => parse_connect(c)?,
        None => params
            .target()
            .ok_or("no target: pass host[:port] or set server/serverName in --params")?,
    };
    if spec.server_name.is_none() && host.parse::<std::net::IpAddr>().is_err() {
        spec.server_name = Some(host.clone());
    }

    info!(%host, port, timeout, "connecting");
    let attempt = perform_handshake(&spec, &host, port, Duration::from_secs(timeout))
        .map_err(|e| format!("handshake with '{host}:{port}' failed: {e}"))?;
    let exchange = &attempt.exchange;
    info!(
        sent = exchange.sent.len(),
        received = exchange.received.len(),
        "exchange finished"
    );
    let response = exchange.server_response(ExtensionPolicy::Permissive);
    if let Err(e) = &response {
        warn!(error = %e, "server response did not decode");
    }

    if json {
        let parsed = match &response {
            Ok(ServerResponse::ServerHello(sh)) => serde_json::json!({
                "type": if sh.is_hello_retry_request() { "helloRetryRequest" } else { "serverHello" },
                "version": format_code(sh.selected_version().unwrap_or(sh.legacy_version).0),
                "cipherSuite": format_code(sh.cipher_suite.0),
                "random": hex::encode(sh.random),
                "extensions": sh.extensions.iter().map(|e| format_code(e.extension_type.0)).collect::<Vec<_>>(),
            }),
            Ok(ServerResponse::Alert { level, description }) => serde_json::json!({
                "type": "alert",
                "level": level,
                "description": description,
            }),
            Ok(ServerResponse::Other(record)) => serde_json::json!({
                "type": record.content_type().to_string(),
            }),
            Err(e) => serde_json::json!({ "error": e.to_string() }),
        };
        let out = serde_json::json!({
            "server": host,
            "port": port,
            "clientRandom": hex::encode(attempt.client_hello.hello.random),
            "sent": hex::encode(&exchange.sent),
            "received": hex::encode(&exchange.received),
            "response": parsed,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Sent {} bytes, received {} bytes", exchange.sent.len(), exchange.received.len());
    match response? {
        ServerResponse::ServerHello(sh) => dump::print_server_hello(&sh, ExtensionPolicy::Permissive),
        ServerResponse::Alert { level, description } => {
            println!("Alert: level={level} description={description}");
        }
        ServerResponse::Other(record) => {
            println!("First record: {} ({} bytes)", record.content_type(), record.length());
        }
    }
    Ok(())
}

/// Split `host[:port]`. IPv6 literals are accepted bare (`::1`) or
/// bracketed (`[::1]`, `[::1]:8443`).
fn parse_connect(connect: &str) -> Result<(String, u16), Box<dyn std::error::Error>> {
    if connect.parse::<Ipv6Addr>().is_ok() {
        return Ok((connect.to_string(), DEFAULT_PORT));
    }
    if let Some(bracketed) = connect.strip_prefix('[') {
        let (host, tail) = bracketed
            .split_once(']')
            .ok_or_else(|| format!("unterminated '[' in '{connect}'"))?;
        let port = match tail {
            "" => DEFAULT_PORT,
            _ => tail
                .strip_prefix(':')
                .and_then(|p| p.parse::<u16>().ok())
                .ok_or_else(|| format!("invalid port in '{connect}'"))?,
        };
        return Ok((host.to_string(), port));
    }
    if let Some(idx) = connect.rfind(':') {
        let host = &connect[..idx];
        let port = connect[idx + 1..]
            .parse::<u16>()
            .map_err(|_| format!("invalid port in '{connect}'"))?;
        Ok((host.to_string(), port))
    } else {
        Ok((connect.to_string(), DEFAULT_PORT))
    }
}
