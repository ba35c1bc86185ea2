//! Human-readable dumps of hello messages.

use hforge_tls::extensions::{Extension, ExtensionContext, ExtensionPolicy, TypedExtension};
use hforge_tls::handshake::{ClientHello, ServerHello};

pub fn print_client_hello(ch: &ClientHello, policy: ExtensionPolicy) {
    println!("ClientHello:");
    println!("  legacy_version: {}", ch.legacy_version);
    println!("  random: {}", hex::encode(ch.random));
    println!("  session_id: {}", hex::encode(&ch.legacy_session_id));
    println!("  cipher_suites:");
    for cs in &ch.cipher_suites {
        println!("    {cs} (0x{:04x})", cs.0);
    }
    println!(
        "  compression_methods: {}",
        hex::encode(&ch.legacy_compression_methods)
    );
    print_extensions(&ch.extensions, ExtensionContext::ClientHello, policy);
}

pub fn print_server_hello(sh: &ServerHello, policy: ExtensionPolicy) {
    if sh.is_hello_retry_request() {
        println!("HelloRetryRequest:");
    } else {
        println!("ServerHello:");
    }
    println!("  legacy_version: {}", sh.legacy_version);
    println!("  random: {}", hex::encode(sh.random));
    println!("  session_id: {}", hex::encode(&sh.legacy_session_id));
    println!("  cipher_suite: {} (0x{:04x})", sh.cipher_suite, sh.cipher_suite.0);
    println!("  compression_method: {}", sh.compression_method);
    let ctx = if sh.is_hello_retry_request() {
        ExtensionContext::HelloRetryRequest
    } else {
        ExtensionContext::ServerHello
    };
    print_extensions(&sh.extensions, ctx, policy);
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_extensions(exts: &[Extension], ctx: ExtensionContext, policy: ExtensionPolicy) {
    println!("  extensions ({}):", exts.len());
    for ext in exts {
        println!("    {} len={}", ext.extension_type, ext.data.len());
        match ext.decode(ctx, policy) {
            Ok(TypedExtension::ServerName(name)) if name.is_empty() => {}
            Ok(TypedExtension::ServerName(name)) => println!("      host_name: {name}"),
            Ok(TypedExtension::SupportedGroups(g)) => println!("      {}", join(&g)),
            Ok(TypedExtension::SignatureAlgorithms(s)) => println!("      {}", join(&s)),
            Ok(TypedExtension::SupportedVersions(v)) => println!("      {}", join(&v)),
            Ok(TypedExtension::PskKeyExchangeModes(m)) => println!("      {}", join(&m)),
            Ok(TypedExtension::KeyShare(entries)) => {
                for e in entries {
                    println!("      {}: {}", e.group, hex::encode(&e.key_exchange));
                }
            }
            Ok(TypedExtension::KeyShareSelectedGroup(g)) => println!("      selected: {g}"),
            Ok(TypedExtension::Opaque(_)) | Ok(TypedExtension::Unrecognized { .. }) => {
                if !ext.data.is_empty() {
                    println!("      {}", hex::encode(&ext.data));
                }
            }
            Err(e) => println!("      <malformed: {e}>"),
        }
    }
}
