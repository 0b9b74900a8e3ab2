//! Fuzz harness for upload response bodies.
//!
//! Whatever the service sends back, decoding must either fail cleanly or
//! yield a result with no empty URL fields.

#![no_main]

use apkdeploy_upload::parse_upload_response;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(body) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(result) = parse_upload_response(body) {
        for url in [&result.config_url, &result.public_url, &result.build_url]
            .into_iter()
            .flatten()
        {
            assert!(!url.is_empty());
        }
    }
});
