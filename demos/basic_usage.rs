use keystore_errors::{KeyStoreError, Result, codes::keymint, keystore_err};

fn sign_with_key(alias: &str, unlocked: bool) -> Result<Vec<u8>> {
    if !unlocked {
        return Err(
            keystore_err!(keymint::DEVICE_LOCKED, "signing with {} needs an unlocked device", alias)
                .with_metadata("alias", alias.to_string()),
        );
    }
    Ok(vec![0x30, 0x45])
}

fn report(err: &KeyStoreError) {
    // What an application is allowed to act on.
    println!("1. [PUBLIC] What the caller sees:");
    println!("   code:          {} ({})", err.numeric_error_code().as_i32(), err.numeric_error_code());
    println!("   transient:     {}", err.is_transient_failure());
    println!("   system error:  {}", err.is_system_error());
    println!("   needs auth:    {}", err.requires_user_authentication());

    println!("\n2. [DIAGNOSTIC] Display form:");
    println!("   {err}");

    println!("\n3. [INTERNAL LOG] What the platform logs:");
    err.with_internal_log(|log| {
        let mut line = String::new();
        if log.write_to(&mut line).is_ok() {
            println!("   {line}");
        }
    });
}

fn main() {
    println!("--- Basic Usage Example ---\n");

    match sign_with_key("wifi_cert", false) {
        Ok(sig) => println!("signed: {} bytes", sig.len()),
        Err(err) => report(&err),
    }

    println!("\n--- Unknown codes fall back by sign ---\n");
    for code in [42, -4242] {
        let err = KeyStoreError::from_code(code);
        println!("   {code:>6} -> {}", err.numeric_error_code());
    }
}
