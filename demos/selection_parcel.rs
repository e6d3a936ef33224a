use keystore_errors::{DomainVerificationUserSelection, Parcelable, UserHandle};
use std::collections::BTreeMap;
use uuid::Uuid;

fn main() {
    let selection = DomainVerificationUserSelection::new(
        Uuid::from_u128(0x6f1e_3c7a_04b2_4d1f_9a3e_5c8b_7d21_0e44),
        "com.example.browser",
        UserHandle::of(0),
        true,
        BTreeMap::from([
            ("example.com".to_string(), true),
            ("m.example.com".to_string(), false),
        ]),
    );

    println!("--- Selection ---\n{selection}\n");

    let bytes = match selection.to_parcel_bytes() {
        Ok(bytes) => bytes,
        Err(e) => {
            println!("encode failed: {e}");
            return;
        }
    };
    println!("--- Parcel ({} bytes) ---", bytes.len());
    for chunk in bytes.chunks(16) {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
        println!("   {}", hex.join(" "));
    }

    match DomainVerificationUserSelection::from_parcel_bytes(&bytes) {
        Ok(decoded) => println!("\nround trip equal: {}", decoded == selection),
        Err(e) => println!("\ndecode failed: {e}"),
    }

    // A truncated parcel reports the field it stopped at.
    if let Err(e) = DomainVerificationUserSelection::from_parcel_bytes(&bytes[..bytes.len() - 4]) {
        println!("truncated parcel: {e}");
    }
}
