#![no_main]

use keystore_errors::KeyStoreError;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (i32, String, String)| {
    let (code, message, detail) = input;
    let err = KeyStoreError::new(code, message).with_metadata("detail", detail);
    let mut line = String::new();
    let _ = err.internal_log().write_to(&mut line);
    assert!(line.len() < 4096);
});
