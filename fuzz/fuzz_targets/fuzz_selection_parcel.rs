#![no_main]

use keystore_errors::{DomainVerificationUserSelection, Parcelable};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(selection) = DomainVerificationUserSelection::from_parcel_bytes(data) {
        let bytes = selection.to_parcel_bytes().unwrap();
        let again = DomainVerificationUserSelection::from_parcel_bytes(&bytes);
        assert_eq!(again.ok(), Some(selection));
    }
});
