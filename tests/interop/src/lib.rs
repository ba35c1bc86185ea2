//! Integration tests for helloforge.
//! Wire-level scenarios and loopback exchanges across crates.

#[cfg(test)]
mod tests {
    use hforge_tls::config::{ClientHelloSpec, KeySharePolicy};
    use hforge_tls::extensions::{
        build_key_share_sh, build_server_name, build_supported_groups,
        build_supported_versions_sh, find_extension, parse_key_share, parse_server_name,
        unmarshal_extension_block, Extension, ExtensionPolicy, ExtensionType, KeyShareEntry,
        TypedExtension,
    };
    use hforge_tls::handshake::{
        decode_client_hello, decode_server_hello, parse_handshake, HandshakeMessage,
        HandshakeType,
    };
    use hforge_tls::keyshare::EphemeralKeyShares;
    use hforge_tls::params::{parse_code, HelloParameters};
    use hforge_tls::random::{FixedRandom, OsRandom};
    use hforge_tls::record::{parse_record, ContentType, Record, RecordIter};
    use hforge_tls::transport::{exchange_hello, perform_handshake, ServerResponse};
    use hforge_types::{CipherSuite, CodecError, NamedGroup, ParamField, ProtocolVersion};
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;
    use std::time::Duration;

    fn hex(s: &str) -> Vec<u8> {
        hex::decode(s.replace(' ', "")).unwrap()
    }

    // -------------------------------------------------------
    // 1. SNI extension for example.com
    // -------------------------------------------------------
    #[test]
    fn test_server_name_wire_bytes() {
        let ext = build_server_name("example.com").unwrap();
        let mut expected = hex("0000 0010 000e 00 000b");
        expected.extend_from_slice(b"example.com");
        assert_eq!(ext.marshal(), expected);
        assert_eq!(parse_server_name(&ext.data).unwrap(), "example.com");
    }

    // -------------------------------------------------------
    // 2. Record parse leaves the tail
    // -------------------------------------------------------
    #[test]
    fn test_application_data_record() {
        let wire = hex("17 0303 0004 01020304 16");
        let (record, rest) = parse_record(&wire).unwrap();
        assert_eq!(record.content_type(), ContentType::ApplicationData);
        assert_eq!(record.version(), 0x0303);
        assert_eq!(record.length(), 4);
        assert_eq!(record.payload(), &[1, 2, 3, 4]);
        assert_eq!(rest, &[0x16]);
    }

    // -------------------------------------------------------
    // 3. "0xHHHH" parameter translation
    // -------------------------------------------------------
    #[test]
    fn test_code_translation() {
        assert_eq!(parse_code(ParamField::CipherSuite, "0x1301").unwrap(), 4865);
        for bad in ["0xzz01", "1301"] {
            match parse_code(ParamField::CipherSuite, bad) {
                Err(CodecError::InvalidParameter { field, value }) => {
                    assert_eq!(field, ParamField::CipherSuite);
                    assert_eq!(value, bad);
                }
                other => panic!("expected InvalidParameter for {bad}, got {other:?}"),
            }
        }
    }

    // -------------------------------------------------------
    // 4. Two-extension block
    // -------------------------------------------------------
    #[test]
    fn test_two_extension_block() {
        let sni = build_server_name("example.com").unwrap();
        let groups = build_supported_groups(&[NamedGroup::X25519]).unwrap();
        let mut block = sni.marshal();
        block.extend_from_slice(&groups.marshal());

        let exts = unmarshal_extension_block(&block).unwrap();
        assert_eq!(exts.len(), 2);
        assert_eq!(exts[0].extension_type, ExtensionType::SERVER_NAME);
        assert_eq!(exts[0].data, block[4..4 + sni.data.len()].to_vec());
        assert_eq!(exts[1].extension_type, ExtensionType::SUPPORTED_GROUPS);
        assert_eq!(exts[1].data, hex("0002 001d"));
        assert_eq!(
            exts.iter().map(|e| 4 + e.data.len()).sum::<usize>(),
            block.len()
        );
    }

    // -------------------------------------------------------
    // 5. JSON request -> wire -> decoded ClientHello
    // -------------------------------------------------------
    #[test]
    fn test_json_request_to_wire() {
        let json = serde_json::json!({
            "serverName": "www.example.com",
            "cipherSuites": ["0x1301", "0x1303"],
            "supportedGroups": ["0x001d", "0x0017"],
            "signatureAlgorithms": ["0x0403", "0x0804"],
            "tlsVersions": ["0x0304"],
            "keyShares": ["0x001d", "0x0017"],
            "clientRandom": "5a".repeat(32),
        });
        let params = HelloParameters::from_json(&json.to_string()).unwrap();
        let spec = ClientHelloSpec::from_parameters(&params).unwrap();
        let built = spec
            .build_client_hello(&mut OsRandom, &mut EphemeralKeyShares::new(OsRandom))
            .unwrap();
        let wire = built.to_record_bytes().unwrap();

        let (record, rest) = parse_record(&wire).unwrap();
        assert!(rest.is_empty());
        let (msg, _) = parse_handshake(record.payload()).unwrap();
        assert_eq!(msg.msg_type(), HandshakeType::ClientHello);
        let ch = decode_client_hello(msg.body()).unwrap();

        assert_eq!(ch.random, [0x5a; 32]);
        assert_eq!(
            ch.cipher_suites,
            vec![
                CipherSuite::TLS_AES_128_GCM_SHA256,
                CipherSuite::TLS_CHACHA20_POLY1305_SHA256
            ]
        );
        let ks = find_extension(&ch.extensions, ExtensionType::KEY_SHARE).unwrap();
        let entries = parse_key_share(&ks.data).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key_exchange.len(), 32);
        assert_eq!(entries[1].key_exchange.len(), 65);
        assert_eq!(entries[1].key_exchange[0], 0x04);
        assert_eq!(built.key_shares.len(), 2);
    }

    // -------------------------------------------------------
    // 6. Reuse policy shares one exchange value
    // -------------------------------------------------------
    #[test]
    fn test_reuse_policy_on_the_wire() {
        let spec = ClientHelloSpec::builder()
            .key_share_groups(&[NamedGroup::X25519, NamedGroup::X448])
            .key_share_policy(KeySharePolicy::ReuseFirst)
            .key_share_material(vec![0x33; 32])
            .build();
        let built = spec
            .build_client_hello(
                &mut FixedRandom::new(vec![1]),
                &mut EphemeralKeyShares::new(OsRandom),
            )
            .unwrap();
        let body = built.hello.marshal().unwrap();
        let ch = decode_client_hello(&body).unwrap();
        let ks = find_extension(&ch.extensions, ExtensionType::KEY_SHARE).unwrap();
        let entries = parse_key_share(&ks.data).unwrap();
        assert_eq!(
            entries,
            vec![
                KeyShareEntry::new(NamedGroup::X25519, vec![0x33; 32]),
                KeyShareEntry::new(NamedGroup::X448, vec![0x33; 32]),
            ]
        );
    }

    // -------------------------------------------------------
    // 7. Oversize construction is rejected before any output
    // -------------------------------------------------------
    #[test]
    fn test_oversize_rejection() {
        assert!(matches!(
            Record::new(ContentType::Handshake, vec![0u8; 16385]),
            Err(CodecError::PayloadTooLarge { len: 16385, .. })
        ));
        assert!(matches!(
            HandshakeMessage::new(HandshakeType::ClientHello, vec![0u8; 1 << 24]),
            Err(CodecError::BodyTooLarge { .. })
        ));
    }

    // -------------------------------------------------------
    // 8. Concatenated records from a capture
    // -------------------------------------------------------
    #[test]
    fn test_record_stream() {
        let mut wire = Record::new(ContentType::Handshake, vec![0x02, 0, 0, 0])
            .unwrap()
            .marshal();
        wire.extend_from_slice(&hex("14 0303 0001 01"));
        wire.extend_from_slice(&hex("17 0303 0010 00"));

        let mut iter = RecordIter::new(&wire);
        assert_eq!(
            iter.next().unwrap().unwrap().content_type(),
            ContentType::Handshake
        );
        assert_eq!(
            iter.next().unwrap().unwrap().content_type(),
            ContentType::ChangeCipherSpec
        );
        assert!(matches!(
            iter.next(),
            Some(Err(CodecError::TruncatedInput { .. }))
        ));
        assert!(iter.next().is_none());
    }

    // -------------------------------------------------------
    // 9. TCP loopback: X25519 agreement through hello exchange
    // -------------------------------------------------------

    /// Read one ClientHello, answer with a ServerHello carrying an X25519
    /// share; returns the server-side shared secret.
    fn serve_one_hello(listener: TcpListener) -> [u8; 32] {
        use x25519_dalek::{PublicKey, StaticSecret};

        let (mut stream, _) = listener.accept().unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let mut header = [0u8; 5];
        stream.read_exact(&mut header).unwrap();
        let mut payload = vec![0u8; u16::from_be_bytes([header[3], header[4]]) as usize];
        stream.read_exact(&mut payload).unwrap();

        let (msg, _) = parse_handshake(&payload).unwrap();
        let ch = decode_client_hello(msg.body()).unwrap();
        let sni = find_extension(&ch.extensions, ExtensionType::SERVER_NAME).unwrap();
        assert_eq!(parse_server_name(&sni.data).unwrap(), "loopback.test");
        let ks = find_extension(&ch.extensions, ExtensionType::KEY_SHARE).unwrap();
        let client_share = parse_key_share(&ks.data)
            .unwrap()
            .into_iter()
            .find(|e| e.group == NamedGroup::X25519)
            .unwrap();

        let secret = StaticSecret::from([0x24u8; 32]);
        let public = PublicKey::from(&secret);
        let client_pub: [u8; 32] = client_share.key_exchange.as_slice().try_into().unwrap();
        let shared = secret.diffie_hellman(&PublicKey::from(client_pub));

        let mut exts = build_supported_versions_sh(ProtocolVersion::TLS13).marshal();
        exts.extend_from_slice(
            &build_key_share_sh(&KeyShareEntry::new(
                NamedGroup::X25519,
                public.as_bytes().to_vec(),
            ))
            .unwrap()
            .marshal(),
        );
        let mut body = vec![0x03, 0x03];
        body.extend_from_slice(&[0x77; 32]);
        body.push(ch.legacy_session_id.len() as u8);
        body.extend_from_slice(&ch.legacy_session_id);
        body.extend_from_slice(&ch.cipher_suites[0].0.to_be_bytes());
        body.push(0);
        body.extend_from_slice(&(exts.len() as u16).to_be_bytes());
        body.extend_from_slice(&exts);

        let reply = HandshakeMessage::new(HandshakeType::ServerHello, body).unwrap();
        let record = Record::new(ContentType::Handshake, reply.marshal()).unwrap();
        stream.write_all(&record.marshal()).unwrap();
        *shared.as_bytes()
    }

    #[test]
    fn test_tcp_loopback_x25519_agreement() {
        use x25519_dalek::{PublicKey, StaticSecret};

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || serve_one_hello(listener));

        let spec = ClientHelloSpec::builder()
            .server_name("loopback.test")
            .session_id(&[0xab; 32])
            .build();
        let attempt =
            perform_handshake(&spec, "127.0.0.1", port, Duration::from_secs(5)).unwrap();
        let server_secret = server.join().unwrap();

        let sh = match attempt
            .exchange
            .server_response(ExtensionPolicy::Strict)
            .unwrap()
        {
            ServerResponse::ServerHello(sh) => sh,
            other => panic!("expected ServerHello, got {other:?}"),
        };
        assert_eq!(sh.legacy_session_id, vec![0xab; 32]);
        assert_eq!(sh.selected_version().unwrap(), ProtocolVersion::TLS13);

        let server_share = sh.key_share().unwrap().unwrap();
        let private: [u8; 32] = attempt.client_hello.key_shares[0]
            .private_key()
            .unwrap()
            .try_into()
            .unwrap();
        let server_pub: [u8; 32] = server_share.key_exchange.as_slice().try_into().unwrap();
        let client_secret =
            StaticSecret::from(private).diffie_hellman(&PublicKey::from(server_pub));
        assert_eq!(client_secret.as_bytes(), &server_secret);
    }

    // -------------------------------------------------------
    // 10. TCP loopback: server rejects with an alert
    // -------------------------------------------------------
    #[test]
    fn test_tcp_loopback_alert() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 5];
            stream.read_exact(&mut buf).unwrap();
            // handshake_failure
            stream.write_all(&hex("15 0303 0002 02 28")).unwrap();
        });

        let mut stream = TcpStream::connect_timeout(&addr, Duration::from_secs(5)).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let exchange = exchange_hello(&mut stream, &hex("16 0301 0000")).unwrap();
        server.join().unwrap();

        assert_eq!(
            exchange.server_response(ExtensionPolicy::Strict).unwrap(),
            ServerResponse::Alert {
                level: 2,
                description: 40
            }
        );
    }

    // -------------------------------------------------------
    // 11. Unknown extension types under both policies
    // -------------------------------------------------------
    #[test]
    fn test_server_hello_unknown_extension() {
        let mut body = vec![0x03, 0x03];
        body.extend_from_slice(&[0x01; 32]);
        body.extend_from_slice(&[0x00, 0x13, 0x02, 0x00]);
        let ext = Extension::new(ExtensionType(0x4469), vec![0x00]);
        let block = ext.marshal();
        body.extend_from_slice(&(block.len() as u16).to_be_bytes());
        body.extend_from_slice(&block);

        assert!(matches!(
            decode_server_hello(&body),
            Err(CodecError::UnknownExtensionType(0x4469))
        ));
        let sh =
            hforge_tls::handshake::decode_server_hello_with(&body, ExtensionPolicy::Permissive)
                .unwrap();
        assert_eq!(
            sh.typed_extensions(ExtensionPolicy::Permissive).unwrap(),
            vec![TypedExtension::Unrecognized {
                extension_type: 0x4469,
                data: vec![0x00]
            }]
        );
    }
}
