#![no_main]
use hforge_tls::extensions::{ExtensionContext, ExtensionPolicy};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(exts) = hforge_tls::extensions::unmarshal_extension_block_with(
        data,
        ExtensionPolicy::Permissive,
    ) else {
        return;
    };
    for ext in &exts {
        for ctx in [
            ExtensionContext::ClientHello,
            ExtensionContext::ServerHello,
            ExtensionContext::HelloRetryRequest,
        ] {
            let _ = ext.decode(ctx, ExtensionPolicy::Permissive);
        }
    }
});
