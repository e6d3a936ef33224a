#![no_main]

use keystore_errors::{KeyStoreError, classify};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|code: i32| {
    let class = classify(code);
    let err = KeyStoreError::from_code(code);
    assert_eq!(err.numeric_error_code(), class.public_code());
    let _ = err.to_string();
});
