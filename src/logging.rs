//! Structured diagnostic view of a [`KeyStoreError`](crate::KeyStoreError).
//!
//! The internal code is not part of the public API. It reaches operators in
//! two places only: the diagnostic `Display` string, and [`InternalLog`], a
//! borrowed view that cannot outlive the error it came from.
//!
//! ```rust
//! # use keystore_errors::{KeyStoreError, codes::keymint};
//! let err = KeyStoreError::new(keymint::DEVICE_LOCKED, "unlock required")
//!     .with_metadata("alias", "wifi_cert");
//! let mut line = String::new();
//! err.internal_log().write_to(&mut line).unwrap();
//! assert!(line.starts_with("[KM -72 DEVICE_LOCKED]"));
//! assert!(line.contains("alias='wifi_cert'"));
//! ```

use crate::codes::{self, CodeOrigin};
use crate::{ErrorClassification, Indicators};
use std::borrow::Cow;
use std::fmt;
use zeroize::Zeroize;

/// Maximum length of any single field in formatted output.
const MAX_FIELD_OUTPUT_LEN: usize = 1024;

const TRUNCATION_INDICATOR: &str = "...[TRUNCATED]";

/// Metadata value; owned text is zeroized on drop.
#[derive(Debug)]
pub struct ContextField {
    value: Cow<'static, str>,
}

impl ContextField {
    /// Borrow the value.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl From<&'static str> for ContextField {
    fn from(value: &'static str) -> Self {
        Self { value: Cow::Borrowed(value) }
    }
}

impl From<String> for ContextField {
    fn from(value: String) -> Self {
        Self { value: Cow::Owned(value) }
    }
}

impl From<Cow<'static, str>> for ContextField {
    fn from(value: Cow<'static, str>) -> Self {
        Self { value }
    }
}

impl Zeroize for ContextField {
    fn zeroize(&mut self) {
        if let Cow::Owned(s) = &mut self.value {
            s.zeroize();
        }
    }
}

impl Drop for ContextField {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Borrowed diagnostic record for one error.
///
/// Tied to the error's lifetime, so the message and metadata cannot be
/// retained after the error is dropped and zeroized.
///
/// The internal code is only ever rendered, not returned:
///
/// ```compile_fail
/// # use keystore_errors::{KeyStoreError, codes::keymint};
/// let err = KeyStoreError::from_code(keymint::DEVICE_LOCKED);
/// let code: i32 = err.internal_log().internal_code();
/// ```
#[derive(Debug)]
pub struct InternalLog<'a> {
    pub(crate) internal_code: i32,
    pub(crate) classification: &'static ErrorClassification,
    pub(crate) message: Option<&'a str>,
    pub(crate) metadata: &'a [(&'static str, ContextField)],
}

impl<'a> InternalLog<'a> {
    /// The internal Keystore/KeyMint code. Rendered by
    /// [`write_to`](Self::write_to); never handed out as a value.
    #[inline]
    pub(crate) const fn internal_code(&self) -> i32 {
        self.internal_code
    }

    /// Layer the internal code came from.
    #[inline]
    pub const fn origin(&self) -> CodeOrigin {
        CodeOrigin::of(self.internal_code)
    }

    /// Symbolic name of the internal code, when one is defined.
    #[inline]
    pub fn code_name(&self) -> Option<&'static str> {
        codes::code_name(self.internal_code)
    }

    /// Classification the internal code maps to.
    #[inline]
    pub const fn classification(&self) -> &'static ErrorClassification {
        self.classification
    }

    /// Free-text message, if the error carried one.
    #[inline]
    pub const fn message(&self) -> Option<&'a str> {
        self.message
    }

    /// Attached key/value pairs, in insertion order.
    #[inline]
    pub const fn metadata(&self) -> &'a [(&'static str, ContextField)] {
        self.metadata
    }

    /// Write a single-line record without intermediate allocation.
    ///
    /// Format:
    /// `[KM -72 DEVICE_LOCKED] public=2 flags=SYSTEM_ERROR|REQUIRES_USER_AUTHENTICATION message='...' key='value'`
    ///
    /// Free-text fields are truncated to a bounded length.
    pub fn write_to(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(f, "[{} {}", self.origin(), self.internal_code())?;
        if let Some(name) = self.code_name() {
            write!(f, " {name}")?;
        }
        write!(
            f,
            "] public={} flags=",
            self.classification.public_code().as_i32()
        )?;
        write_flags(f, self.classification.indicators())?;

        if let Some(message) = self.message {
            write!(f, " message='{}'", truncate_with_indicator(message))?;
        }
        for (key, value) in self.metadata {
            write!(f, " {}='{}'", key, truncate_with_indicator(value.as_str()))?;
        }
        Ok(())
    }

    /// Materialize the record as a `String` for trusted local debugging.
    ///
    /// Only available with the `trusted_debug` feature in debug builds.
    #[cfg(all(feature = "trusted_debug", debug_assertions))]
    pub fn format_for_trusted_debug(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_to(&mut out);
        out
    }
}

fn write_flags(f: &mut impl fmt::Write, indicators: Indicators) -> fmt::Result {
    if indicators.is_empty() {
        return f.write_str("none");
    }
    let mut sep = "";
    for (flag, name) in [
        (Indicators::SYSTEM_ERROR, "SYSTEM_ERROR"),
        (Indicators::TRANSIENT, "TRANSIENT"),
        (Indicators::REQUIRES_USER_AUTHENTICATION, "REQUIRES_USER_AUTHENTICATION"),
    ] {
        if indicators.contains(flag) {
            write!(f, "{sep}{name}")?;
            sep = "|";
        }
    }
    Ok(())
}

/// Bound a field for output, cutting on a character boundary.
fn truncate_with_indicator(s: &str) -> Cow<'_, str> {
    if s.len() <= MAX_FIELD_OUTPUT_LEN {
        return Cow::Borrowed(s);
    }
    let budget = MAX_FIELD_OUTPUT_LEN - TRUNCATION_INDICATOR.len();
    let cut = s
        .char_indices()
        .map(|(idx, c)| idx + c.len_utf8())
        .take_while(|end| *end <= budget)
        .last()
        .unwrap_or(0);
    if cut == 0 {
        return Cow::Borrowed(TRUNCATION_INDICATOR);
    }
    let mut out = String::with_capacity(cut + TRUNCATION_INDICATOR.len());
    out.push_str(&s[..cut]);
    out.push_str(TRUNCATION_INDICATOR);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::{keymint, keystore};
    use crate::KeyStoreError;

    fn render(err: &KeyStoreError) -> String {
        let mut out = String::new();
        err.internal_log().write_to(&mut out).unwrap();
        out
    }

    #[test]
    fn record_names_known_codes() {
        let err = KeyStoreError::new(keymint::DEVICE_LOCKED, "device is locked");
        assert_eq!(
            render(&err),
            "[KM -72 DEVICE_LOCKED] public=2 flags=SYSTEM_ERROR|REQUIRES_USER_AUTHENTICATION \
             message='device is locked'"
        );
    }

    #[test]
    fn record_for_unnamed_code_has_no_name() {
        let err = KeyStoreError::from_code(4242);
        assert_eq!(render(&err), "[KS 4242] public=11 flags=none");
    }

    #[test]
    fn record_includes_metadata_in_order() {
        let err = KeyStoreError::new(keystore::KEY_NOT_FOUND, "missing")
            .with_metadata("alias", "a1")
            .with_metadata("uid", String::from("10057"));
        let line = render(&err);
        let alias = line.find("alias='a1'").unwrap();
        let uid = line.find("uid='10057'").unwrap();
        assert!(alias < uid);
    }

    #[test]
    fn accessors_expose_diagnostics() {
        let err = KeyStoreError::new(keymint::SECURE_HW_BUSY, "busy");
        err.with_internal_log(|log| {
            assert_eq!(log.internal_code(), keymint::SECURE_HW_BUSY);
            assert_eq!(log.origin(), CodeOrigin::KeyMint);
            assert_eq!(log.code_name(), Some("SECURE_HW_BUSY"));
            assert!(log.classification().is_transient());
            assert_eq!(log.message(), Some("busy"));
            assert!(log.metadata().is_empty());
        });
    }

    #[test]
    fn truncate_short_is_borrowed() {
        assert!(matches!(truncate_with_indicator("short"), Cow::Borrowed("short")));
    }

    #[test]
    fn truncate_exactly_at_limit_is_untouched() {
        let s = "a".repeat(MAX_FIELD_OUTPUT_LEN);
        assert!(matches!(truncate_with_indicator(&s), Cow::Borrowed(_)));
    }

    #[test]
    fn truncate_multibyte_stays_valid() {
        let s = "🔑".repeat(MAX_FIELD_OUTPUT_LEN);
        let out = truncate_with_indicator(&s);
        assert!(out.len() <= MAX_FIELD_OUTPUT_LEN);
        assert!(out.ends_with(TRUNCATION_INDICATOR));
        assert!(out.trim_end_matches(TRUNCATION_INDICATOR).chars().all(|c| c == '🔑'));
    }

    #[test]
    fn context_field_zeroizes_owned_only() {
        let mut owned = ContextField::from(String::from("secret"));
        owned.zeroize();
        assert_eq!(owned.as_str(), "");

        let mut borrowed = ContextField::from("static");
        borrowed.zeroize();
        assert_eq!(borrowed.as_str(), "static");
    }
}
