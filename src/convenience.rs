//! Convenience macros for defining internal codes and building errors.
//!
//! # Rules
//!
//! 1. **Internal codes are defined once**, through [`define_internal_codes!`],
//!    with their origin checked at compile time.
//! 2. **Messages are either literals or sanitized.** [`keystore_err!`] accepts a
//!    literal message, or a literal format string whose arguments are passed
//!    through [`sanitize`] first.
//!
//! ```rust
//! # use keystore_errors::{keystore_err, codes::keymint};
//! let alias = "my_key";
//! let err = keystore_err!(keymint::KEY_EXPIRED, "key '{}' is no longer valid", alias);
//! assert!(err.to_string().starts_with("key 'my_key' is no longer valid"));
//! ```
//!
//! ```rust,compile_fail
//! # use keystore_errors::{keystore_err, codes::keymint};
//! let dynamic = String::from("built at runtime");
//! // Message must be a literal
//! let err = keystore_err!(keymint::KEY_EXPIRED, dynamic);
//! ```

use std::borrow::Cow;

/// Maximum length in bytes for a sanitized format argument.
pub const MAX_SANITIZED_LEN: usize = 256;

const SANITIZED_TRUNCATION: &str = "...[TRUNCATED]";
const SANITIZED_EMPTY: &str = "[INVALID_INPUT]";

/// Sanitize an untrusted value for inclusion in an error message.
///
/// - Control characters become `?`; ANSI escape sequences collapse to one `?`.
/// - Output is bounded to [`MAX_SANITIZED_LEN`] bytes plus the truncation marker,
///   cut on a character boundary.
/// - Input with no printable character becomes `[INVALID_INPUT]`.
///
/// Borrows when the input is already clean and short.
pub fn sanitize(input: &str) -> Cow<'_, str> {
    let clean = input.len() <= MAX_SANITIZED_LEN
        && !input.is_empty()
        && !input.chars().any(char::is_control);
    if clean {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len().min(MAX_SANITIZED_LEN));
    let mut printable = false;
    let mut truncated = false;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        let replacement = if c == '\u{1b}' {
            // Swallow the rest of the escape sequence.
            for tail in chars.by_ref() {
                if tail.is_ascii_alphabetic() {
                    break;
                }
            }
            '?'
        } else if c.is_control() {
            '?'
        } else {
            printable = true;
            c
        };

        if out.len() + replacement.len_utf8() > MAX_SANITIZED_LEN {
            truncated = true;
            break;
        }
        out.push(replacement);
    }

    if !printable {
        return Cow::Borrowed(SANITIZED_EMPTY);
    }
    if truncated {
        let mut cut = MAX_SANITIZED_LEN.saturating_sub(SANITIZED_TRUNCATION.len());
        while cut > 0 && !out.is_char_boundary(cut) {
            cut -= 1;
        }
        out.truncate(cut);
        out.push_str(SANITIZED_TRUNCATION);
    }
    Cow::Owned(out)
}

/// Define internal error codes for one origin.
///
/// Each entry becomes a `pub const NAME: i32`, validated against the origin's
/// sign rule in const context. A `NAMES` table mapping every value to its
/// symbolic name is generated alongside.
///
/// ```rust
/// # use keystore_errors::{define_internal_codes, codes::CodeOrigin};
/// define_internal_codes! {
///     CodeOrigin::KeyMint => {
///         VENDOR_BUSY = -10_001,
///         VENDOR_GONE = -10_002,
///     }
/// }
/// assert_eq!(NAMES, &[(-10_001, "VENDOR_BUSY"), (-10_002, "VENDOR_GONE")]);
/// ```
#[macro_export]
macro_rules! define_internal_codes {
    ($origin:expr => { $( $name:ident = $code:expr ),+ $(,)? }) => {
        $(
            pub const $name: i32 = $crate::codes::checked_code($origin, $code);
        )+

        /// Every code in this block paired with its symbolic name.
        pub const NAMES: &[(i32, &str)] = &[ $( ($name, stringify!($name)) ),+ ];
    };
}

/// Create a [`KeyStoreError`](crate::KeyStoreError) from an internal code.
///
/// # Forms
///
/// - `keystore_err!(code)`: no message
/// - `keystore_err!(code, "literal")`
/// - `keystore_err!(code, "format {}", arg, ...)`: every argument is
///   sanitized before formatting
///
/// ```rust
/// # use keystore_errors::{keystore_err, codes::keystore, PublicErrorCode};
/// let err = keystore_err!(keystore::KEY_NOT_FOUND, "alias lookup failed");
/// assert_eq!(err.numeric_error_code(), PublicErrorCode::KeyDoesNotExist);
/// ```
#[macro_export]
macro_rules! keystore_err {
    ($code:expr) => {
        $crate::KeyStoreError::from_code($code)
    };
    ($code:expr, $msg:literal) => {
        $crate::KeyStoreError::new($code, $msg)
    };
    ($code:expr, $fmt:literal $(, $arg:expr)+ $(,)?) => {
        $crate::KeyStoreError::new(
            $code,
            format!($fmt $(, $crate::convenience::sanitize(&($arg).to_string()))+),
        )
    };
}

// ============================================================================
// Tests
// ============================================================================
