//! Internal error code namespace.
//!
//! Internal codes arrive as plain `i32` values from the layers beneath the
//! public API. The sign of a code identifies where it came from:
//!
//! - **Keystore** (`code > 0`): response codes of the Keystore service
//! - **KeyMint** (`code <= 0`): error codes reported by the secure-hardware HAL
//!
//! Internal codes are never part of the public surface. Applications observe
//! only the [`PublicErrorCode`](crate::PublicErrorCode) they classify to. The
//! constants here exist so the classification table and diagnostics can refer
//! to codes by name.
//!
//! # Governance
//!
//! Every constant is defined through [`define_internal_codes!`](crate::define_internal_codes),
//! which checks at compile time that the value's sign matches its origin.
//! A KeyMint constant with a positive value fails the build.
//!
//! ```rust
//! use keystore_errors::codes::{self, CodeOrigin};
//!
//! assert_eq!(CodeOrigin::of(codes::keymint::DEVICE_LOCKED), CodeOrigin::KeyMint);
//! assert_eq!(CodeOrigin::of(codes::keystore::LOCKED), CodeOrigin::Keystore);
//! assert_eq!(codes::code_name(-72), Some("DEVICE_LOCKED"));
//! ```

use std::fmt;

// ============================================================================
// Code Origin
// ============================================================================

/// Layer that produced an internal error code.
///
/// Derived purely from the sign of the code; there is no third origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeOrigin {
    /// Keystore service response codes (strictly positive).
    Keystore,
    /// KeyMint HAL error codes (zero or negative).
    KeyMint,
}

impl CodeOrigin {
    /// Origin of `code`, by sign.
    #[inline]
    pub const fn of(code: i32) -> Self {
        if code > 0 { Self::Keystore } else { Self::KeyMint }
    }

    /// Whether `code` belongs to this origin.
    #[inline]
    pub const fn permits(self, code: i32) -> bool {
        match self {
            Self::Keystore => code > 0,
            Self::KeyMint => code <= 0,
        }
    }

    /// Short label used in diagnostics.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keystore => "KS",
            Self::KeyMint => "KM",
        }
    }
}

impl fmt::Display for CodeOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a code against its origin in const context.
///
/// # Panics
///
/// Panics (at compile time when used in a `const`) if the sign of `code`
/// does not match `origin`.
#[doc(hidden)]
pub const fn checked_code(origin: CodeOrigin, code: i32) -> i32 {
    assert!(origin.permits(code), "internal code sign does not match its origin");
    code
}

// ============================================================================
// KeyMint (secure hardware) codes
// ============================================================================

/// KeyMint HAL error codes.
///
/// Names follow the HAL's `ErrorCode` enumeration with the `KM_ERROR_` prefix
/// dropped.
#[allow(missing_docs)]
pub mod keymint {
    use super::CodeOrigin;

    crate::define_internal_codes! {
        CodeOrigin::KeyMint => {
            OK = 0,
            ROOT_OF_TRUST_ALREADY_SET = -1,
            UNSUPPORTED_PURPOSE = -2,
            INCOMPATIBLE_PURPOSE = -3,
            UNSUPPORTED_ALGORITHM = -4,
            INCOMPATIBLE_ALGORITHM = -5,
            UNSUPPORTED_KEY_SIZE = -6,
            UNSUPPORTED_BLOCK_MODE = -7,
            INCOMPATIBLE_BLOCK_MODE = -8,
            UNSUPPORTED_MAC_LENGTH = -9,
            UNSUPPORTED_PADDING_MODE = -10,
            INCOMPATIBLE_PADDING_MODE = -11,
            UNSUPPORTED_DIGEST = -12,
            INCOMPATIBLE_DIGEST = -13,
            INVALID_EXPIRATION_TIME = -14,
            INVALID_USER_ID = -15,
            INVALID_AUTHORIZATION_TIMEOUT = -16,
            UNSUPPORTED_KEY_FORMAT = -17,
            INCOMPATIBLE_KEY_FORMAT = -18,
            UNSUPPORTED_KEY_ENCRYPTION_ALGORITHM = -19,
            UNSUPPORTED_KEY_VERIFICATION_ALGORITHM = -20,
            INVALID_INPUT_LENGTH = -21,
            KEY_EXPORT_OPTIONS_INVALID = -22,
            DELEGATION_NOT_ALLOWED = -23,
            KEY_NOT_YET_VALID = -24,
            KEY_EXPIRED = -25,
            KEY_USER_NOT_AUTHENTICATED = -26,
            OUTPUT_PARAMETER_NULL = -27,
            INVALID_OPERATION_HANDLE = -28,
            INSUFFICIENT_BUFFER_SPACE = -29,
            VERIFICATION_FAILED = -30,
            TOO_MANY_OPERATIONS = -31,
            UNEXPECTED_NULL_POINTER = -32,
            INVALID_KEY_BLOB = -33,
            IMPORTED_KEY_NOT_ENCRYPTED = -34,
            IMPORTED_KEY_DECRYPTION_FAILED = -35,
            IMPORTED_KEY_NOT_SIGNED = -36,
            IMPORTED_KEY_VERIFICATION_FAILED = -37,
            INVALID_ARGUMENT = -38,
            UNSUPPORTED_TAG = -39,
            INVALID_TAG = -40,
            MEMORY_ALLOCATION_FAILED = -41,
            IMPORT_PARAMETER_MISMATCH = -44,
            SECURE_HW_ACCESS_DENIED = -45,
            OPERATION_CANCELLED = -46,
            CONCURRENT_ACCESS_CONFLICT = -47,
            SECURE_HW_BUSY = -48,
            SECURE_HW_COMMUNICATION_FAILED = -49,
            UNSUPPORTED_EC_FIELD = -50,
            MISSING_NONCE = -51,
            INVALID_NONCE = -52,
            MISSING_MAC_LENGTH = -53,
            KEY_RATE_LIMIT_EXCEEDED = -54,
            CALLER_NONCE_PROHIBITED = -55,
            KEY_MAX_OPS_EXCEEDED = -56,
            INVALID_MAC_LENGTH = -57,
            MISSING_MIN_MAC_LENGTH = -58,
            UNSUPPORTED_MIN_MAC_LENGTH = -59,
            UNSUPPORTED_KDF = -60,
            UNSUPPORTED_EC_CURVE = -61,
            KEY_REQUIRES_UPGRADE = -62,
            ATTESTATION_CHALLENGE_MISSING = -63,
            KEYMINT_NOT_CONFIGURED = -64,
            ATTESTATION_APPLICATION_ID_MISSING = -65,
            CANNOT_ATTEST_IDS = -66,
            ROLLBACK_RESISTANCE_UNAVAILABLE = -67,
            HARDWARE_TYPE_UNAVAILABLE = -68,
            PROOF_OF_PRESENCE_REQUIRED = -69,
            CONCURRENT_PROOF_OF_PRESENCE_REQUESTED = -70,
            NO_USER_CONFIRMATION = -71,
            DEVICE_LOCKED = -72,
            EARLY_BOOT_ENDED = -73,
            ATTESTATION_KEYS_NOT_PROVISIONED = -74,
            ATTESTATION_IDS_NOT_PROVISIONED = -75,
            INVALID_OPERATION = -76,
            STORAGE_KEY_UNSUPPORTED = -77,
            INCOMPATIBLE_MGF_DIGEST = -78,
            UNSUPPORTED_MGF_DIGEST = -79,
            MISSING_NOT_BEFORE = -80,
            MISSING_NOT_AFTER = -81,
            MISSING_ISSUER_SUBJECT = -82,
            INVALID_ISSUER_SUBJECT = -83,
            BOOT_LEVEL_EXCEEDED = -84,
            HARDWARE_NOT_YET_AVAILABLE = -85,
            UNIMPLEMENTED = -100,
            VERSION_MISMATCH = -101,
            UNKNOWN_ERROR = -1000,
        }
    }
}

// ============================================================================
// Keystore service codes
// ============================================================================

/// Keystore service response codes.
#[allow(missing_docs)]
pub mod keystore {
    use super::CodeOrigin;

    crate::define_internal_codes! {
        CodeOrigin::Keystore => {
            LOCKED = 2,
            UNINITIALIZED = 3,
            SYSTEM_ERROR = 4,
            PERMISSION_DENIED = 6,
            KEY_NOT_FOUND = 7,
            VALUE_CORRUPTED = 8,
            KEY_PERMANENTLY_INVALIDATED = 17,
            NO_SUCH_SECURITY_LEVEL = 18,
            KEYMINT_DOES_NOT_EXIST = 19,
            BACKEND_BUSY = 20,
            OPERATION_BUSY = 21,
            INVALID_ARGUMENT = 22,
            TOO_MUCH_DATA = 23,
            OUT_OF_KEYS = 24,
        }
    }
}

/// Symbolic name of a defined internal code, if any.
///
/// Used only for diagnostics. Returns `None` for values no constant names.
pub fn code_name(code: i32) -> Option<&'static str> {
    let table = match CodeOrigin::of(code) {
        CodeOrigin::Keystore => keystore::NAMES,
        CodeOrigin::KeyMint => keymint::NAMES,
    };
    table
        .iter()
        .find(|(value, _)| *value == code)
        .map(|(_, name)| *name)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_follows_sign() {
        assert_eq!(CodeOrigin::of(1), CodeOrigin::Keystore);
        assert_eq!(CodeOrigin::of(i32::MAX), CodeOrigin::Keystore);
        assert_eq!(CodeOrigin::of(0), CodeOrigin::KeyMint);
        assert_eq!(CodeOrigin::of(-1), CodeOrigin::KeyMint);
        assert_eq!(CodeOrigin::of(i32::MIN), CodeOrigin::KeyMint);
    }

    #[test]
    fn every_defined_code_matches_its_origin() {
        for (code, name) in keymint::NAMES {
            assert!(CodeOrigin::KeyMint.permits(*code), "{name} has wrong sign");
        }
        for (code, name) in keystore::NAMES {
            assert!(CodeOrigin::Keystore.permits(*code), "{name} has wrong sign");
        }
    }

    #[test]
    fn defined_codes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for (code, name) in keymint::NAMES.iter().chain(keystore::NAMES) {
            assert!(seen.insert(*code), "duplicate value for {name}");
        }
    }

    #[test]
    fn names_resolve() {
        assert_eq!(code_name(keymint::OK), Some("OK"));
        assert_eq!(code_name(keymint::UNKNOWN_ERROR), Some("UNKNOWN_ERROR"));
        assert_eq!(code_name(keystore::KEY_NOT_FOUND), Some("KEY_NOT_FOUND"));
        assert_eq!(code_name(-42), None);
        assert_eq!(code_name(9999), None);
    }

    #[test]
    fn checked_code_accepts_matching_sign() {
        const ACCEPTED: i32 = checked_code(CodeOrigin::KeyMint, -5);
        assert_eq!(ACCEPTED, -5);
    }

    #[test]
    #[should_panic(expected = "sign does not match")]
    fn checked_code_rejects_mismatched_sign() {
        let code = std::hint::black_box(5);
        checked_code(CodeOrigin::KeyMint, code);
    }

    #[test]
    fn origin_labels() {
        assert_eq!(CodeOrigin::Keystore.to_string(), "KS");
        assert_eq!(CodeOrigin::KeyMint.to_string(), "KM");
    }
}
