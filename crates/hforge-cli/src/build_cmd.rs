//! Assemble a ClientHello offline (`build`).

use crate::dump;
use crate::hello_args::HelloArgs;
use hforge_tls::extensions::ExtensionPolicy;
use hforge_tls::keyshare::EphemeralKeyShares;
use hforge_tls::random::OsRandom;

pub fn run(args: &HelloArgs, body_only: bool, text: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (_, spec) = args.spec()?;
    let built = spec.build_client_hello(&mut OsRandom, &mut EphemeralKeyShares::new(OsRandom))?;

    let bytes = if body_only {
        built.hello.marshal()?
    } else {
        built.to_record_bytes()?
    };
    println!("{}", hex::encode(&bytes));

    if text {
        dump::print_client_hello(&built.hello, ExtensionPolicy::Permissive);
        for ks in &built.key_shares {
            if let Some(private) = ks.private_key() {
                eprintln!("{} private key: {}", ks.group, hex::encode(private));
            }
        }
    }
    Ok(())
}
