//! # Keystore Errors
//!
//! Classification of Keystore/KeyMint failures, plus two small pieces of
//! platform plumbing that sit next to it.
//!
//! ## Design Philosophy
//!
//! 1. **Internal codes stay internal.** Layers beneath the public API report
//!    signed integer codes. Applications see only a [`PublicErrorCode`] and
//!    three facets.
//! 2. **Classification is total.** Every `i32` classifies; codes without an
//!    explicit entry fall back by sign.
//! 3. **The table is frozen.** It is built once before first use and is
//!    read-only afterwards, so concurrent lookups need no lock.
//! 4. **Diagnostics are scoped.** The internal code and message are reachable
//!    through a borrowed [`InternalLog`] that cannot outlive the error, and are
//!    zeroized on drop.
//!
//! ## Quick Start
//!
//! ```rust
//! use keystore_errors::{KeyStoreError, PublicErrorCode, codes::keymint};
//!
//! let err = KeyStoreError::new(keymint::DEVICE_LOCKED, "operation needs an unlocked device");
//!
//! assert_eq!(err.numeric_error_code(), PublicErrorCode::UserAuthenticationRequired);
//! assert!(err.requires_user_authentication());
//! assert!(err.is_system_error());
//! assert!(!err.is_transient_failure());
//!
//! assert_eq!(
//!     err.to_string(),
//!     "operation needs an unlocked device (public error code: 2 internal Keystore code: -72)"
//! );
//! ```
//!
//! ## Other Modules
//!
//! - [`selection`]: per-user domain-verification link-handling state, with a
//!   Parcel-compatible codec from [`parcel`].
//! - [`storage`]: on-disk size of an installed app, queried once off the
//!   calling thread and formatted for display.
//!
//! ## Features
//!
//! - `trusted_debug`: `InternalLog::format_for_trusted_debug` (debug builds only)
//! - `tokio` / `async_std`: async storage-size helper on the runtime's
//!   blocking pool (tokio takes precedence if both are enabled)

#![warn(missing_docs)]
#![warn(clippy::all)]

use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;
use zeroize::Zeroize;

pub mod codes;
pub mod convenience;
pub mod definitions;
pub mod logging;
pub mod models;
pub mod parcel;
pub mod selection;
pub mod storage;

pub use definitions::{classify, has_failure_info};
pub use logging::*;
pub use models::*;
pub use parcel::{Parcel, ParcelError, ParcelReader, Parcelable};
pub use selection::{DomainVerificationUserSelection, UserHandle};
pub use storage::{StorageSizeSlot, StorageStats, StorageStatsSource};

/// Type alias for Results using our error type.
pub type Result<T> = std::result::Result<T, KeyStoreError>;

/// Failure at the Keystore / KeyMint layer while generating or using a key.
///
/// # Key Properties
///
/// - Carries the internal code, exposes only its classification
/// - Message and metadata are zeroized on drop
/// - `Debug` redacts the message and metadata
/// - `Display` is the diagnostic form: message plus both codes
#[must_use = "errors should be handled or logged"]
pub struct KeyStoreError {
    internal_code: i32,
    message: Option<Cow<'static, str>>,
    metadata: SmallVec<[(&'static str, ContextField); 4]>,
}

impl KeyStoreError {
    /// Create an error for an internal code with a message.
    #[inline]
    pub fn new(internal_code: i32, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            internal_code,
            message: Some(message.into()),
            metadata: SmallVec::new(),
        }
    }

    /// Create an error for an internal code with no message.
    #[inline]
    pub fn from_code(internal_code: i32) -> Self {
        Self {
            internal_code,
            message: None,
            metadata: SmallVec::new(),
        }
    }

    /// Attach a diagnostic key/value (alias, uid, security level, ...).
    ///
    /// Stored inline for up to four entries; only visible through
    /// [`internal_log`](Self::internal_log).
    #[inline]
    pub fn with_metadata(mut self, key: &'static str, value: impl Into<Cow<'static, str>>) -> Self {
        self.metadata.push((key, ContextField::from(value.into())));
        self
    }

    /// Internal code. Platform use only; never surfaced as public API.
    #[inline]
    pub(crate) const fn internal_code(&self) -> i32 {
        self.internal_code
    }

    /// Classification of the internal code.
    #[inline]
    pub fn classification(&self) -> &'static ErrorClassification {
        classify(self.internal_code)
    }

    /// The public error category.
    #[inline]
    pub fn numeric_error_code(&self) -> PublicErrorCode {
        self.classification().public_code()
    }

    /// Whether repeating the operation later is likely to succeed.
    ///
    /// If [`is_system_error`](Self::is_system_error) is true the transience
    /// relates to the device; otherwise to the key, and a permanent failure
    /// with an existing key likely requires a new key.
    #[inline]
    pub fn is_transient_failure(&self) -> bool {
        self.classification().is_transient()
    }

    /// Whether the operation failed because the user has to authenticate
    /// (e.g. by unlocking the device).
    #[inline]
    pub fn requires_user_authentication(&self) -> bool {
        self.classification().requires_user_authentication()
    }

    /// Whether the failure concerns the Keystore/KeyMint implementation rather
    /// than the key in use. System errors indicate a feature isn't working;
    /// key errors are likely to succeed with a new key.
    #[inline]
    pub fn is_system_error(&self) -> bool {
        self.classification().is_system_error()
    }

    /// Borrowed diagnostic record.
    ///
    /// ```rust
    /// # use keystore_errors::{KeyStoreError, codes::keystore};
    /// let err = KeyStoreError::new(keystore::VALUE_CORRUPTED, "blob checksum mismatch");
    /// let log = err.internal_log();
    /// assert_eq!(log.code_name(), Some("VALUE_CORRUPTED"));
    /// assert_eq!(log.message(), Some("blob checksum mismatch"));
    /// ```
    #[inline]
    pub fn internal_log(&self) -> InternalLog<'_> {
        InternalLog {
            internal_code: self.internal_code,
            classification: self.classification(),
            message: self.message.as_deref(),
            metadata: &self.metadata,
        }
    }

    /// Callback form of [`internal_log`](Self::internal_log); the record is
    /// dropped when `f` returns.
    #[inline]
    pub fn with_internal_log<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&InternalLog<'_>) -> R,
    {
        let log = self.internal_log();
        f(&log)
    }
}

impl From<i32> for KeyStoreError {
    fn from(internal_code: i32) -> Self {
        Self::from_code(internal_code)
    }
}

impl Drop for KeyStoreError {
    fn drop(&mut self) {
        if let Some(Cow::Owned(message)) = &mut self.message {
            message.zeroize();
        }
        for (_, value) in &mut self.metadata {
            value.zeroize();
        }
    }
}

impl fmt::Debug for KeyStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyStoreError")
            .field("public_code", &self.numeric_error_code())
            .field("indicators", &self.classification().indicators())
            .field("message", &self.message.as_ref().map(|_| "<REDACTED>"))
            .field("metadata_entries", &self.metadata.len())
            .finish()
    }
}

impl fmt::Display for KeyStoreError {
    /// Diagnostic form:
    /// `"<message> (public error code: N internal Keystore code: M)"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(message) = &self.message {
            write!(f, "{message} ")?;
        }
        write!(
            f,
            "(public error code: {} internal Keystore code: {})",
            self.numeric_error_code().as_i32(),
            self.internal_code()
        )
    }
}

impl std::error::Error for KeyStoreError {}
