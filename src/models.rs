//! Public error categories and the classification attached to each internal code.
//!
//! # Trust Boundary
//!
//! - [`PublicErrorCode`] is what applications see. Its numeric values are
//!   stable and form part of the public contract.
//! - [`Indicators`] are facets of a failure: whether it concerns the system
//!   rather than a key, whether retrying may succeed, and whether the user must
//!   authenticate first. Facets are independent bits, not exclusive states.
//! - [`ErrorClassification`] pairs the two. Classifications are immutable
//!   `const` values shared by reference from the frozen table in
//!   [`definitions`](crate::definitions).

use std::fmt;

// ============================================================================
// Public Error Code
// ============================================================================

/// Public error category reported to applications.
///
/// # Stability
///
/// Discriminants are the published numeric codes and must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(i32)]
pub enum PublicErrorCode {
    /// Errors the caller will not know about. Reserved for codes introduced
    /// after the caller's API level.
    Other = 1,
    /// The key cannot be used until the user authenticates.
    UserAuthenticationRequired = 2,
    /// Keystore not loaded, or an auth-bound key was requested without a lock
    /// screen knowledge factor configured.
    KeystoreUninitialized = 3,
    /// Internal system error. Check [`Indicators::TRANSIENT`] before retrying.
    InternalSystemError = 4,
    /// Parameters or operation reserved for system or privileged callers.
    PermissionDenied = 5,
    /// The key the operation refers to does not exist.
    KeyDoesNotExist = 6,
    /// The key is corrupted and cannot be recovered.
    KeyCorrupted = 7,
    /// Device identifiers could not be included in the attestation record.
    IdAttestationFailure = 8,
    /// The attestation challenge is too large.
    AttestationChallengeTooLarge = 9,
    /// General failure in the KeyMint layer.
    KeymintFailure = 10,
    /// General failure in the Keystore layer.
    KeystoreFailure = 11,
    /// The feature is not implemented by the underlying KeyMint.
    Unimplemented = 12,
    /// The request is incompatible with the parameters the key was made with.
    IncorrectUsage = 13,
    /// The key has expired or is not yet valid.
    KeyNotTemporallyValid = 14,
    /// The KeyMint operation behind the crypto object was evicted.
    KeyOperationExpired = 15,
}

impl PublicErrorCode {
    /// All categories in numeric order.
    pub const ALL: [Self; 15] = [
        Self::Other,
        Self::UserAuthenticationRequired,
        Self::KeystoreUninitialized,
        Self::InternalSystemError,
        Self::PermissionDenied,
        Self::KeyDoesNotExist,
        Self::KeyCorrupted,
        Self::IdAttestationFailure,
        Self::AttestationChallengeTooLarge,
        Self::KeymintFailure,
        Self::KeystoreFailure,
        Self::Unimplemented,
        Self::IncorrectUsage,
        Self::KeyNotTemporallyValid,
        Self::KeyOperationExpired,
    ];

    /// Published numeric value.
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Category for a published numeric value.
    #[inline]
    pub const fn from_i32(value: i32) -> Option<Self> {
        if value >= 1 && value <= Self::ALL.len() as i32 {
            Some(Self::ALL[(value - 1) as usize])
        } else {
            None
        }
    }

    /// Human-readable category name.
    #[inline]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Other => "other",
            Self::UserAuthenticationRequired => "user authentication required",
            Self::KeystoreUninitialized => "keystore uninitialized",
            Self::InternalSystemError => "internal system error",
            Self::PermissionDenied => "permission denied",
            Self::KeyDoesNotExist => "key does not exist",
            Self::KeyCorrupted => "key corrupted",
            Self::IdAttestationFailure => "ID attestation failure",
            Self::AttestationChallengeTooLarge => "attestation challenge too large",
            Self::KeymintFailure => "KeyMint failure",
            Self::KeystoreFailure => "Keystore failure",
            Self::Unimplemented => "unimplemented",
            Self::IncorrectUsage => "incorrect usage",
            Self::KeyNotTemporallyValid => "key not temporally valid",
            Self::KeyOperationExpired => "key operation expired",
        }
    }
}

impl fmt::Display for PublicErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ============================================================================
// Indicators
// ============================================================================

/// Facet bits attached to a classification.
///
/// Bit positions match the platform encoding; bit 0 is unused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Indicators(u8);

impl Indicators {
    /// No facets set.
    pub const NONE: Self = Self(0);
    /// Failure concerns the system or implementation, not a specific key.
    pub const SYSTEM_ERROR: Self = Self(1 << 1);
    /// Repeating the same operation later is likely to succeed.
    pub const TRANSIENT: Self = Self(1 << 2);
    /// Failure is resolved by the user authenticating (e.g. unlocking).
    pub const REQUIRES_USER_AUTHENTICATION: Self = Self(1 << 3);

    /// Raw bit value.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Union of two facet sets, usable in const context.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether every bit of `other` is set.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no facet is set.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for Indicators {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl fmt::Debug for Indicators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("Indicators(NONE)");
        }
        let names = [
            (Self::SYSTEM_ERROR, "SYSTEM_ERROR"),
            (Self::TRANSIENT, "TRANSIENT"),
            (Self::REQUIRES_USER_AUTHENTICATION, "REQUIRES_USER_AUTHENTICATION"),
        ];
        f.write_str("Indicators(")?;
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        f.write_str(")")
    }
}

// ============================================================================
// Error Classification
// ============================================================================

/// Public category plus facets for one internal code.
///
/// # Copy Semantics
///
/// Small and free of owned data; copying is cheaper than borrowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorClassification {
    indicators: Indicators,
    public_code: PublicErrorCode,
}

impl ErrorClassification {
    /// Build a classification.
    #[inline]
    pub const fn new(indicators: Indicators, public_code: PublicErrorCode) -> Self {
        Self {
            indicators,
            public_code,
        }
    }

    /// The public category, the only value exposed to external callers.
    #[inline]
    pub const fn public_code(&self) -> PublicErrorCode {
        self.public_code
    }

    /// Facet bits.
    #[inline]
    pub const fn indicators(&self) -> Indicators {
        self.indicators
    }

    /// Retrying the same operation later is likely to succeed.
    ///
    /// For system errors this relates to the device; otherwise to the key, so a
    /// permanent key failure usually means creating a new key.
    #[inline]
    pub const fn is_transient(&self) -> bool {
        self.indicators.contains(Indicators::TRANSIENT)
    }

    /// The failure concerns the Keystore/KeyMint implementation rather than a
    /// specific key.
    #[inline]
    pub const fn is_system_error(&self) -> bool {
        self.indicators.contains(Indicators::SYSTEM_ERROR)
    }

    /// The failure is resolved by user (re-)authentication.
    #[inline]
    pub const fn requires_user_authentication(&self) -> bool {
        self.indicators.contains(Indicators::REQUIRES_USER_AUTHENTICATION)
    }
}
