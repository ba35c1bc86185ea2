//! List known protocol codes in `"0xHHHH"` form.

use hforge_tls::extensions::ExtensionType;
use hforge_tls::{CipherSuite, NamedGroup, ProtocolVersion, SignatureScheme};

pub fn run(filter: &str) -> Result<(), Box<dyn std::error::Error>> {
    match filter {
        "versions" => print_versions(),
        "ciphers" => print_ciphers(),
        "groups" => print_groups(),
        "sigalgs" => print_sigalgs(),
        "extensions" => print_extensions(),
        "all" => {
            print_versions();
            println!();
            print_ciphers();
            println!();
            print_groups();
            println!();
            print_sigalgs();
            println!();
            print_extensions();
        }
        _ => {
            eprintln!("Unknown filter: {filter}");
            eprintln!("Valid filters: all, versions, ciphers, groups, sigalgs, extensions");
            return Err("invalid filter".into());
        }
    }
    Ok(())
}

fn print_versions() {
    println!("Protocol versions:");
    for v in [
        ProtocolVersion::TLS10,
        ProtocolVersion::TLS11,
        ProtocolVersion::TLS12,
        ProtocolVersion::TLS13,
    ] {
        println!("  0x{:04x}  {v}", v.0);
    }
}

fn print_ciphers() {
    println!("Cipher suites:");
    for cs in [
        CipherSuite::TLS_AES_128_GCM_SHA256,
        CipherSuite::TLS_AES_256_GCM_SHA384,
        CipherSuite::TLS_CHACHA20_POLY1305_SHA256,
        CipherSuite::TLS_AES_128_CCM_SHA256,
        CipherSuite::TLS_AES_128_CCM_8_SHA256,
        CipherSuite::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
        CipherSuite::TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
        CipherSuite::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
        CipherSuite::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
    ] {
        println!("  0x{:04x}  {cs}", cs.0);
    }
}

fn print_groups() {
    println!("Named groups:");
    for g in [
        NamedGroup::SECP256R1,
        NamedGroup::SECP384R1,
        NamedGroup::SECP521R1,
        NamedGroup::X25519,
        NamedGroup::X448,
        NamedGroup::FFDHE2048,
        NamedGroup::FFDHE3072,
        NamedGroup::FFDHE4096,
        NamedGroup::X25519_MLKEM768,
    ] {
        match g.key_exchange_len() {
            Some(len) => println!("  0x{:04x}  {g} ({len}-byte key share)", g.0),
            None => println!("  0x{:04x}  {g}", g.0),
        }
    }
}

fn print_sigalgs() {
    println!("Signature schemes:");
    for s in [
        SignatureScheme::ECDSA_SECP256R1_SHA256,
        SignatureScheme::ECDSA_SECP384R1_SHA384,
        SignatureScheme::ECDSA_SECP521R1_SHA512,
        SignatureScheme::RSA_PSS_RSAE_SHA256,
        SignatureScheme::RSA_PSS_RSAE_SHA384,
        SignatureScheme::RSA_PSS_RSAE_SHA512,
        SignatureScheme::RSA_PKCS1_SHA256,
        SignatureScheme::RSA_PKCS1_SHA384,
        SignatureScheme::RSA_PKCS1_SHA512,
        SignatureScheme::ED25519,
        SignatureScheme::ED448,
    ] {
        println!("  0x{:04x}  {s}", s.0);
    }
}

fn print_extensions() {
    println!("Extension types:");
    for t in (0..=0xffffu32).map(|v| ExtensionType(v as u16)) {
        match t.name() {
            Some("GREASE") | None => {}
            Some(name) => println!("  0x{:04x}  {name}", t.0),
        }
    }
}
