//! Frozen classification table for internal Keystore and KeyMint codes.
//!
//! # Taxonomy
//!
//! Most KeyMint codes fall into a handful of shared classifications:
//!
//! | Classification               | Facets                 | Public code             |
//! |------------------------------|------------------------|-------------------------|
//! | [`GENERAL_KEYMINT_ERROR`]    | none                   | `KeymintFailure`        |
//! | [`GENERAL_KEYSTORE_ERROR`]   | none                   | `KeystoreFailure`       |
//! | [`KEYMINT_UNIMPLEMENTED`]    | system                 | `Unimplemented`         |
//! | [`KEYMINT_RETRYABLE`]        | system, transient      | `KeymintFailure`        |
//! | [`KEYMINT_INCORRECT_USAGE`]  | none                   | `IncorrectUsage`        |
//! | [`KEYMINT_TEMPORAL_VALIDITY`]| none                   | `KeyNotTemporallyValid` |
//!
//! The remaining entries carry their own classification inline.
//!
//! # Fallback
//!
//! Codes with no entry are bucketed by sign: positive codes come from Keystore
//! and classify as [`GENERAL_KEYSTORE_ERROR`]; zero and negative codes come from
//! KeyMint and classify as [`GENERAL_KEYMINT_ERROR`]. [`classify`] is therefore
//! total over `i32`.
//!
//! # Concurrency
//!
//! The lookup index is built once on first use and never mutated, so lookups
//! from any number of threads take no lock.

use crate::codes::{keymint, keystore, CodeOrigin};
use crate::{ErrorClassification, Indicators, PublicErrorCode};
use std::collections::HashMap;
use std::sync::LazyLock;

// ============================================================================
// Shared classifications
// ============================================================================

/// Generic KeyMint failure; also the fallback for unmapped non-positive codes.
pub const GENERAL_KEYMINT_ERROR: ErrorClassification =
    ErrorClassification::new(Indicators::NONE, PublicErrorCode::KeymintFailure);

/// Generic Keystore failure; the fallback for unmapped positive codes.
pub const GENERAL_KEYSTORE_ERROR: ErrorClassification =
    ErrorClassification::new(Indicators::NONE, PublicErrorCode::KeystoreFailure);

/// Feature not implemented by the KeyMint in use.
pub const KEYMINT_UNIMPLEMENTED: ErrorClassification =
    ErrorClassification::new(Indicators::SYSTEM_ERROR, PublicErrorCode::Unimplemented);

/// Transient secure-hardware failure.
pub const KEYMINT_RETRYABLE: ErrorClassification = ErrorClassification::new(
    Indicators::SYSTEM_ERROR.union(Indicators::TRANSIENT),
    PublicErrorCode::KeymintFailure,
);

/// Request incompatible with the key's parameters.
pub const KEYMINT_INCORRECT_USAGE: ErrorClassification =
    ErrorClassification::new(Indicators::NONE, PublicErrorCode::IncorrectUsage);

/// Key expired or not yet valid.
pub const KEYMINT_TEMPORAL_VALIDITY: ErrorClassification =
    ErrorClassification::new(Indicators::NONE, PublicErrorCode::KeyNotTemporallyValid);

const USER_NOT_AUTHENTICATED: ErrorClassification = ErrorClassification::new(
    Indicators::REQUIRES_USER_AUTHENTICATION,
    PublicErrorCode::UserAuthenticationRequired,
);

const OPERATION_EXPIRED: ErrorClassification = ErrorClassification::new(
    Indicators::SYSTEM_ERROR.union(Indicators::TRANSIENT),
    PublicErrorCode::KeyOperationExpired,
);

const SYSTEM_KEYMINT_ERROR: ErrorClassification =
    ErrorClassification::new(Indicators::SYSTEM_ERROR, PublicErrorCode::KeymintFailure);

const DEVICE_LOCKED: ErrorClassification = ErrorClassification::new(
    Indicators::SYSTEM_ERROR.union(Indicators::REQUIRES_USER_AUTHENTICATION),
    PublicErrorCode::UserAuthenticationRequired,
);

// ============================================================================
// Table
// ============================================================================

/// Every explicitly classified internal code.
pub const ENTRIES: &[(i32, ErrorClassification)] = &[
    // KeyMint
    (keymint::OK, GENERAL_KEYMINT_ERROR),
    (keymint::ROOT_OF_TRUST_ALREADY_SET, GENERAL_KEYMINT_ERROR),
    (keymint::UNSUPPORTED_PURPOSE, KEYMINT_INCORRECT_USAGE),
    (keymint::INCOMPATIBLE_PURPOSE, KEYMINT_INCORRECT_USAGE),
    (keymint::UNSUPPORTED_ALGORITHM, KEYMINT_UNIMPLEMENTED),
    (keymint::INCOMPATIBLE_ALGORITHM, KEYMINT_INCORRECT_USAGE),
    (keymint::UNSUPPORTED_KEY_SIZE, KEYMINT_UNIMPLEMENTED),
    (keymint::UNSUPPORTED_BLOCK_MODE, KEYMINT_UNIMPLEMENTED),
    (keymint::INCOMPATIBLE_BLOCK_MODE, KEYMINT_INCORRECT_USAGE),
    (keymint::UNSUPPORTED_MAC_LENGTH, KEYMINT_UNIMPLEMENTED),
    (keymint::UNSUPPORTED_PADDING_MODE, KEYMINT_INCORRECT_USAGE),
    (keymint::INCOMPATIBLE_PADDING_MODE, KEYMINT_INCORRECT_USAGE),
    (keymint::UNSUPPORTED_DIGEST, KEYMINT_UNIMPLEMENTED),
    (keymint::INCOMPATIBLE_DIGEST, KEYMINT_INCORRECT_USAGE),
    (keymint::INVALID_EXPIRATION_TIME, KEYMINT_INCORRECT_USAGE),
    (keymint::INVALID_USER_ID, GENERAL_KEYMINT_ERROR),
    (keymint::INVALID_AUTHORIZATION_TIMEOUT, KEYMINT_INCORRECT_USAGE),
    (keymint::UNSUPPORTED_KEY_FORMAT, KEYMINT_INCORRECT_USAGE),
    (keymint::INCOMPATIBLE_KEY_FORMAT, KEYMINT_INCORRECT_USAGE),
    (keymint::UNSUPPORTED_KEY_ENCRYPTION_ALGORITHM, KEYMINT_UNIMPLEMENTED),
    (keymint::UNSUPPORTED_KEY_VERIFICATION_ALGORITHM, KEYMINT_UNIMPLEMENTED),
    (keymint::INVALID_INPUT_LENGTH, KEYMINT_INCORRECT_USAGE),
    (keymint::KEY_EXPORT_OPTIONS_INVALID, KEYMINT_INCORRECT_USAGE),
    (keymint::DELEGATION_NOT_ALLOWED, GENERAL_KEYMINT_ERROR),
    (keymint::KEY_NOT_YET_VALID, KEYMINT_TEMPORAL_VALIDITY),
    (keymint::KEY_EXPIRED, KEYMINT_TEMPORAL_VALIDITY),
    (keymint::KEY_USER_NOT_AUTHENTICATED, USER_NOT_AUTHENTICATED),
    (keymint::OUTPUT_PARAMETER_NULL, GENERAL_KEYMINT_ERROR),
    (keymint::INVALID_OPERATION_HANDLE, OPERATION_EXPIRED),
    (keymint::INSUFFICIENT_BUFFER_SPACE, GENERAL_KEYMINT_ERROR),
    (keymint::VERIFICATION_FAILED, GENERAL_KEYMINT_ERROR),
    (keymint::TOO_MANY_OPERATIONS, GENERAL_KEYMINT_ERROR),
    (keymint::UNEXPECTED_NULL_POINTER, GENERAL_KEYMINT_ERROR),
    (keymint::INVALID_KEY_BLOB, GENERAL_KEYMINT_ERROR),
    (keymint::IMPORTED_KEY_NOT_ENCRYPTED, KEYMINT_INCORRECT_USAGE),
    (keymint::IMPORTED_KEY_DECRYPTION_FAILED, KEYMINT_INCORRECT_USAGE),
    (keymint::IMPORTED_KEY_NOT_SIGNED, KEYMINT_INCORRECT_USAGE),
    (keymint::IMPORTED_KEY_VERIFICATION_FAILED, KEYMINT_INCORRECT_USAGE),
    (keymint::INVALID_ARGUMENT, GENERAL_KEYMINT_ERROR),
    (keymint::UNSUPPORTED_TAG, KEYMINT_UNIMPLEMENTED),
    (keymint::INVALID_TAG, KEYMINT_INCORRECT_USAGE),
    (keymint::MEMORY_ALLOCATION_FAILED, GENERAL_KEYMINT_ERROR),
    (keymint::IMPORT_PARAMETER_MISMATCH, GENERAL_KEYMINT_ERROR),
    (keymint::SECURE_HW_ACCESS_DENIED, GENERAL_KEYMINT_ERROR),
    (keymint::OPERATION_CANCELLED, GENERAL_KEYMINT_ERROR),
    (keymint::CONCURRENT_ACCESS_CONFLICT, GENERAL_KEYMINT_ERROR),
    (keymint::SECURE_HW_BUSY, KEYMINT_RETRYABLE),
    (keymint::SECURE_HW_COMMUNICATION_FAILED, KEYMINT_RETRYABLE),
    (keymint::UNSUPPORTED_EC_FIELD, KEYMINT_UNIMPLEMENTED),
    (keymint::MISSING_NONCE, KEYMINT_INCORRECT_USAGE),
    (keymint::INVALID_NONCE, KEYMINT_INCORRECT_USAGE),
    (keymint::MISSING_MAC_LENGTH, KEYMINT_INCORRECT_USAGE),
    (keymint::KEY_RATE_LIMIT_EXCEEDED, KEYMINT_RETRYABLE),
    (keymint::CALLER_NONCE_PROHIBITED, GENERAL_KEYMINT_ERROR),
    // Uses-per-boot limit; not retryable.
    (keymint::KEY_MAX_OPS_EXCEEDED, GENERAL_KEYMINT_ERROR),
    (keymint::INVALID_MAC_LENGTH, KEYMINT_INCORRECT_USAGE),
    (keymint::MISSING_MIN_MAC_LENGTH, KEYMINT_INCORRECT_USAGE),
    (keymint::UNSUPPORTED_MIN_MAC_LENGTH, KEYMINT_INCORRECT_USAGE),
    (keymint::UNSUPPORTED_KDF, KEYMINT_UNIMPLEMENTED),
    (keymint::UNSUPPORTED_EC_CURVE, KEYMINT_UNIMPLEMENTED),
    (keymint::ATTESTATION_CHALLENGE_MISSING, KEYMINT_INCORRECT_USAGE),
    (keymint::KEYMINT_NOT_CONFIGURED, SYSTEM_KEYMINT_ERROR),
    (keymint::ATTESTATION_APPLICATION_ID_MISSING, KEYMINT_RETRYABLE),
    (
        keymint::CANNOT_ATTEST_IDS,
        ErrorClassification::new(Indicators::SYSTEM_ERROR, PublicErrorCode::IdAttestationFailure),
    ),
    (keymint::ROLLBACK_RESISTANCE_UNAVAILABLE, KEYMINT_UNIMPLEMENTED),
    (keymint::HARDWARE_TYPE_UNAVAILABLE, KEYMINT_UNIMPLEMENTED),
    (keymint::DEVICE_LOCKED, DEVICE_LOCKED),
    (keymint::STORAGE_KEY_UNSUPPORTED, KEYMINT_UNIMPLEMENTED),
    (keymint::INCOMPATIBLE_MGF_DIGEST, KEYMINT_INCORRECT_USAGE),
    (keymint::UNSUPPORTED_MGF_DIGEST, KEYMINT_UNIMPLEMENTED),
    (keymint::MISSING_NOT_BEFORE, KEYMINT_INCORRECT_USAGE),
    (keymint::MISSING_NOT_AFTER, KEYMINT_INCORRECT_USAGE),
    // Handled inside Keystore; applications should not see it.
    (keymint::HARDWARE_NOT_YET_AVAILABLE, GENERAL_KEYMINT_ERROR),
    (keymint::UNIMPLEMENTED, KEYMINT_UNIMPLEMENTED),
    (keymint::UNKNOWN_ERROR, SYSTEM_KEYMINT_ERROR),
    (keymint::VERSION_MISMATCH, GENERAL_KEYMINT_ERROR),
    // Keystore
    (keystore::LOCKED, USER_NOT_AUTHENTICATED),
    (
        keystore::UNINITIALIZED,
        ErrorClassification::new(Indicators::SYSTEM_ERROR, PublicErrorCode::KeystoreUninitialized),
    ),
    (
        keystore::SYSTEM_ERROR,
        ErrorClassification::new(Indicators::SYSTEM_ERROR, PublicErrorCode::InternalSystemError),
    ),
    (
        keystore::PERMISSION_DENIED,
        ErrorClassification::new(Indicators::NONE, PublicErrorCode::PermissionDenied),
    ),
    (
        keystore::KEY_NOT_FOUND,
        ErrorClassification::new(Indicators::NONE, PublicErrorCode::KeyDoesNotExist),
    ),
    (
        keystore::VALUE_CORRUPTED,
        ErrorClassification::new(Indicators::NONE, PublicErrorCode::KeyCorrupted),
    ),
    (
        keystore::KEY_PERMANENTLY_INVALIDATED,
        ErrorClassification::new(Indicators::NONE, PublicErrorCode::KeyDoesNotExist),
    ),
];

static FAILURE_INFO: LazyLock<HashMap<i32, &'static ErrorClassification>> = LazyLock::new(|| {
    ENTRIES
        .iter()
        .map(|(code, classification)| (*code, classification))
        .collect()
});

/// Classify an internal code.
///
/// Never fails: unmapped codes fall back to the generic bucket for their sign.
///
/// ```rust
/// use keystore_errors::{classify, codes::keymint, PublicErrorCode};
///
/// let info = classify(keymint::SECURE_HW_BUSY);
/// assert_eq!(info.public_code(), PublicErrorCode::KeymintFailure);
/// assert!(info.is_transient());
///
/// assert_eq!(classify(123_456).public_code(), PublicErrorCode::KeystoreFailure);
/// assert_eq!(classify(-123_456).public_code(), PublicErrorCode::KeymintFailure);
/// ```
pub fn classify(internal_code: i32) -> &'static ErrorClassification {
    if let Some(info) = FAILURE_INFO.get(&internal_code) {
        return info;
    }
    match CodeOrigin::of(internal_code) {
        CodeOrigin::Keystore => &GENERAL_KEYSTORE_ERROR,
        CodeOrigin::KeyMint => &GENERAL_KEYMINT_ERROR,
    }
}

/// Whether `internal_code` has an explicit table entry.
pub fn has_failure_info(internal_code: i32) -> bool {
    FAILURE_INFO.contains_key(&internal_code)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn facets(code: i32) -> (PublicErrorCode, bool, bool, bool) {
        let c = classify(code);
        (
            c.public_code(),
            c.is_system_error(),
            c.is_transient(),
            c.requires_user_authentication(),
        )
    }

    #[test]
    fn table_has_no_duplicate_codes() {
        assert_eq!(FAILURE_INFO.len(), ENTRIES.len());
    }

    /// `(code, public code, system, transient, user auth)` for every code the
    /// platform maps, written out independently of `ENTRIES`.
    #[rustfmt::skip]
    const PUBLISHED: &[(i32, PublicErrorCode, bool, bool, bool)] = {
        use PublicErrorCode::*;
        &[
            (0, KeymintFailure, false, false, false),
            (-1, KeymintFailure, false, false, false),
            (-2, IncorrectUsage, false, false, false),
            (-3, IncorrectUsage, false, false, false),
            (-4, Unimplemented, true, false, false),
            (-5, IncorrectUsage, false, false, false),
            (-6, Unimplemented, true, false, false),
            (-7, Unimplemented, true, false, false),
            (-8, IncorrectUsage, false, false, false),
            (-9, Unimplemented, true, false, false),
            (-10, IncorrectUsage, false, false, false),
            (-11, IncorrectUsage, false, false, false),
            (-12, Unimplemented, true, false, false),
            (-13, IncorrectUsage, false, false, false),
            (-14, IncorrectUsage, false, false, false),
            (-15, KeymintFailure, false, false, false),
            (-16, IncorrectUsage, false, false, false),
            (-17, IncorrectUsage, false, false, false),
            (-18, IncorrectUsage, false, false, false),
            (-19, Unimplemented, true, false, false),
            (-20, Unimplemented, true, false, false),
            (-21, IncorrectUsage, false, false, false),
            (-22, IncorrectUsage, false, false, false),
            (-23, KeymintFailure, false, false, false),
            (-24, KeyNotTemporallyValid, false, false, false),
            (-25, KeyNotTemporallyValid, false, false, false),
            (-26, UserAuthenticationRequired, false, false, true),
            (-27, KeymintFailure, false, false, false),
            (-28, KeyOperationExpired, true, true, false),
            (-29, KeymintFailure, false, false, false),
            (-30, KeymintFailure, false, false, false),
            (-31, KeymintFailure, false, false, false),
            (-32, KeymintFailure, false, false, false),
            (-33, KeymintFailure, false, false, false),
            (-34, IncorrectUsage, false, false, false),
            (-35, IncorrectUsage, false, false, false),
            (-36, IncorrectUsage, false, false, false),
            (-37, IncorrectUsage, false, false, false),
            (-38, KeymintFailure, false, false, false),
            (-39, Unimplemented, true, false, false),
            (-40, IncorrectUsage, false, false, false),
            (-41, KeymintFailure, false, false, false),
            (-44, KeymintFailure, false, false, false),
            (-45, KeymintFailure, false, false, false),
            (-46, KeymintFailure, false, false, false),
            (-47, KeymintFailure, false, false, false),
            (-48, KeymintFailure, true, true, false),
            (-49, KeymintFailure, true, true, false),
            (-50, Unimplemented, true, false, false),
            (-51, IncorrectUsage, false, false, false),
            (-52, IncorrectUsage, false, false, false),
            (-53, IncorrectUsage, false, false, false),
            (-54, KeymintFailure, true, true, false),
            (-55, KeymintFailure, false, false, false),
            (-56, KeymintFailure, false, false, false),
            (-57, IncorrectUsage, false, false, false),
            (-58, IncorrectUsage, false, false, false),
            (-59, IncorrectUsage, false, false, false),
            (-60, Unimplemented, true, false, false),
            (-61, Unimplemented, true, false, false),
            (-63, IncorrectUsage, false, false, false),
            (-64, KeymintFailure, true, false, false),
            (-65, KeymintFailure, true, true, false),
            (-66, IdAttestationFailure, true, false, false),
            (-67, Unimplemented, true, false, false),
            (-68, Unimplemented, true, false, false),
            (-72, UserAuthenticationRequired, true, false, true),
            (-77, Unimplemented, true, false, false),
            (-78, IncorrectUsage, false, false, false),
            (-79, Unimplemented, true, false, false),
            (-80, IncorrectUsage, false, false, false),
            (-81, IncorrectUsage, false, false, false),
            (-85, KeymintFailure, false, false, false),
            (-100, Unimplemented, true, false, false),
            (-1000, KeymintFailure, true, false, false),
            (-101, KeymintFailure, false, false, false),
            (2, UserAuthenticationRequired, false, false, true),
            (3, KeystoreUninitialized, true, false, false),
            (4, InternalSystemError, true, false, false),
            (6, PermissionDenied, false, false, false),
            (7, KeyDoesNotExist, false, false, false),
            (8, KeyCorrupted, false, false, false),
            (17, KeyDoesNotExist, false, false, false),
        ]
    };

    #[test]
    fn every_published_code_classifies_exactly() {
        assert_eq!(PUBLISHED.len(), ENTRIES.len());
        for &(code, public, system, transient, auth) in PUBLISHED {
            assert!(has_failure_info(code), "code {code} has no entry");
            assert_eq!(facets(code), (public, system, transient, auth), "code {code}");
        }
    }

    #[test]
    fn keystore_entries() {
        use PublicErrorCode::*;
        assert_eq!(facets(keystore::LOCKED), (UserAuthenticationRequired, false, false, true));
        assert_eq!(facets(keystore::UNINITIALIZED), (KeystoreUninitialized, true, false, false));
        assert_eq!(facets(keystore::SYSTEM_ERROR), (InternalSystemError, true, false, false));
        assert_eq!(facets(keystore::PERMISSION_DENIED), (PermissionDenied, false, false, false));
        assert_eq!(facets(keystore::KEY_NOT_FOUND), (KeyDoesNotExist, false, false, false));
        assert_eq!(facets(keystore::VALUE_CORRUPTED), (KeyCorrupted, false, false, false));
        assert_eq!(
            facets(keystore::KEY_PERMANENTLY_INVALIDATED),
            (KeyDoesNotExist, false, false, false)
        );
    }

    #[test]
    fn keymint_special_entries() {
        use PublicErrorCode::*;
        assert_eq!(
            facets(keymint::KEY_USER_NOT_AUTHENTICATED),
            (UserAuthenticationRequired, false, false, true)
        );
        assert_eq!(
            facets(keymint::INVALID_OPERATION_HANDLE),
            (KeyOperationExpired, true, true, false)
        );
        assert_eq!(facets(keymint::KEYMINT_NOT_CONFIGURED), (KeymintFailure, true, false, false));
        assert_eq!(facets(keymint::CANNOT_ATTEST_IDS), (IdAttestationFailure, true, false, false));
        assert_eq!(
            facets(keymint::DEVICE_LOCKED),
            (UserAuthenticationRequired, true, false, true)
        );
        assert_eq!(facets(keymint::UNKNOWN_ERROR), (KeymintFailure, true, false, false));
        assert_eq!(facets(keymint::OK), (KeymintFailure, false, false, false));
    }

    #[test]
    fn keymint_shared_buckets() {
        use PublicErrorCode::*;
        for code in [
            keymint::SECURE_HW_BUSY,
            keymint::SECURE_HW_COMMUNICATION_FAILED,
            keymint::KEY_RATE_LIMIT_EXCEEDED,
            keymint::ATTESTATION_APPLICATION_ID_MISSING,
        ] {
            assert_eq!(facets(code), (KeymintFailure, true, true, false));
        }
        for code in [keymint::KEY_NOT_YET_VALID, keymint::KEY_EXPIRED] {
            assert_eq!(facets(code), (KeyNotTemporallyValid, false, false, false));
        }
        for code in [
            keymint::UNSUPPORTED_ALGORITHM,
            keymint::UNSUPPORTED_EC_CURVE,
            keymint::UNIMPLEMENTED,
        ] {
            assert_eq!(facets(code), (Unimplemented, true, false, false));
        }
        for code in [keymint::INCOMPATIBLE_DIGEST, keymint::MISSING_NONCE] {
            assert_eq!(facets(code), (IncorrectUsage, false, false, false));
        }
        assert_eq!(facets(keymint::KEY_MAX_OPS_EXCEEDED), (KeymintFailure, false, false, false));
    }

    #[test]
    fn unmapped_codes_fall_back_by_sign() {
        for code in [1, 5, 20, keystore::BACKEND_BUSY, i32::MAX] {
            assert!(!has_failure_info(code));
            assert_eq!(*classify(code), GENERAL_KEYSTORE_ERROR);
        }
        for code in [-42, keymint::KEY_REQUIRES_UPGRADE, -999, i32::MIN] {
            assert!(!has_failure_info(code));
            assert_eq!(*classify(code), GENERAL_KEYMINT_ERROR);
        }
    }

    #[test]
    fn fallback_buckets_have_no_facets() {
        assert!(GENERAL_KEYSTORE_ERROR.indicators().is_empty());
        assert!(GENERAL_KEYMINT_ERROR.indicators().is_empty());
    }
}
