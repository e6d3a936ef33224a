//! Per-user domain-verification selection state for one package.
//!
//! Covers every web HTTP(S) domain a package declares, whether or not it was
//! marked for auto verification.
//!
//! - Apps may open links for domains they verified against by default. The
//!   user can turn that off: [`is_link_handling_allowed`](DomainVerificationUserSelection::is_link_handling_allowed).
//! - Independently, the user can enable specific domains for the app:
//!   [`host_to_user_selection_map`](DomainVerificationUserSelection::host_to_user_selection_map).
//!
//! State is per user; reading another user's state is the caller's concern.
//!
//! # Parcel layout
//!
//! | Order | Field                    | Encoding                                   |
//! |-------|--------------------------|--------------------------------------------|
//! | 1     | flags                    | byte slot; `0x8` = link handling allowed   |
//! | 2     | identifier               | UTF-16 string, hyphenated UUID             |
//! | 3     | package name             | UTF-16 string                              |
//! | 4     | user                     | typed object: `1` then user id (`0` = null) |
//! | 5     | host → user selection    | `size`, then tagged string / tagged bool   |

use crate::parcel::{Parcel, ParcelError, ParcelReader, Parcelable};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

const FLAG_LINK_HANDLING_ALLOWED: u8 = 0x8;

// ============================================================================
// UserHandle
// ============================================================================

/// A device user, identified by its numeric user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserHandle(i32);

impl UserHandle {
    /// The system user.
    pub const SYSTEM: Self = Self(0);

    /// Handle for `user_id`.
    #[inline]
    pub const fn of(user_id: i32) -> Self {
        Self(user_id)
    }

    /// Numeric user id.
    #[inline]
    pub const fn identifier(self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserHandle{{{}}}", self.0)
    }
}

impl Parcelable for UserHandle {
    fn write_to_parcel(&self, dest: &mut Parcel) -> Result<(), ParcelError> {
        dest.write_i32(self.0);
        Ok(())
    }

    fn read_from_parcel(src: &mut ParcelReader<'_>) -> Result<Self, ParcelError> {
        src.read_i32("user").map(Self)
    }
}

// ============================================================================
// DomainVerificationUserSelection
// ============================================================================

/// Link-handling state chosen by one user for one package.
///
/// Immutable once built. Every field is mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainVerificationUserSelection {
    identifier: Uuid,
    package_name: String,
    user: UserHandle,
    link_handling_allowed: bool,
    host_to_user_selection: BTreeMap<String, bool>,
}

impl DomainVerificationUserSelection {
    /// Build a selection record.
    pub fn new(
        identifier: Uuid,
        package_name: impl Into<String>,
        user: UserHandle,
        link_handling_allowed: bool,
        host_to_user_selection: BTreeMap<String, bool>,
    ) -> Self {
        Self {
            identifier,
            package_name: package_name.into(),
            user,
            link_handling_allowed,
            host_to_user_selection,
        }
    }

    /// Identifier of the package's domain verification info.
    pub fn identifier(&self) -> Uuid {
        self.identifier
    }

    /// Package this state belongs to.
    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// User this state belongs to.
    pub fn user(&self) -> UserHandle {
        self.user
    }

    /// Whether the package may open links at all.
    pub fn is_link_handling_allowed(&self) -> bool {
        self.link_handling_allowed
    }

    /// Host to user-enabled state, as last set for this package and user.
    pub fn host_to_user_selection_map(&self) -> &BTreeMap<String, bool> {
        &self.host_to_user_selection
    }
}

impl fmt::Display for DomainVerificationUserSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DomainVerificationUserSelection {{ identifier = {}, packageName = {}, user = {}, \
             linkHandlingAllowed = {}, hostToUserSelectionMap = {{",
            self.identifier.hyphenated(),
            self.package_name,
            self.user,
            self.link_handling_allowed
        )?;
        for (idx, (host, enabled)) in self.host_to_user_selection.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{host}={enabled}")?;
        }
        f.write_str("} }")
    }
}

impl Parcelable for DomainVerificationUserSelection {
    fn write_to_parcel(&self, dest: &mut Parcel) -> Result<(), ParcelError> {
        let mut flags = 0u8;
        if self.link_handling_allowed {
            flags |= FLAG_LINK_HANDLING_ALLOWED;
        }
        dest.write_byte(flags);
        dest.write_string16(Some(&self.identifier.hyphenated().to_string()))?;
        dest.write_string16(Some(&self.package_name))?;
        // Typed object: non-null marker, then the object body.
        dest.write_i32(1);
        self.user.write_to_parcel(dest)?;
        dest.write_len(self.host_to_user_selection.len())?;
        for (host, enabled) in &self.host_to_user_selection {
            dest.write_string_value(host)?;
            dest.write_bool_value(*enabled);
        }
        Ok(())
    }

    fn read_from_parcel(src: &mut ParcelReader<'_>) -> Result<Self, ParcelError> {
        let flags = src.read_byte("flags")?;
        let link_handling_allowed = flags & FLAG_LINK_HANDLING_ALLOWED != 0;

        let identifier = src.read_required_string16("identifier")?;
        let identifier = Uuid::parse_str(&identifier)
            .map_err(|_| ParcelError::InvalidValue { field: "identifier" })?;

        let package_name = src.read_required_string16("packageName")?;

        if src.read_i32("user")? == 0 {
            return Err(ParcelError::NullField { field: "user" });
        }
        let user = UserHandle::read_from_parcel(src)?;

        let len = src.read_i32("hostToUserSelectionMap")?;
        // The platform reader turns a null map into an empty one. The map is
        // mandatory here, so null is refused instead.
        if len == -1 {
            return Err(ParcelError::NullField { field: "hostToUserSelectionMap" });
        }
        let entries = usize::try_from(len).map_err(|_| ParcelError::InvalidLength {
            field: "hostToUserSelectionMap",
            len,
        })?;
        // Each entry needs at least four slots; bound before iterating.
        if entries > src.remaining() / 16 {
            return Err(ParcelError::InvalidLength { field: "hostToUserSelectionMap", len });
        }
        let mut host_to_user_selection = BTreeMap::new();
        for _ in 0..entries {
            let host = src.read_string_value("host")?;
            let enabled = src.read_bool_value("enabled")?;
            host_to_user_selection.insert(host, enabled);
        }

        Ok(Self {
            identifier,
            package_name,
            user,
            link_handling_allowed,
            host_to_user_selection,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DomainVerificationUserSelection {
        let hosts = BTreeMap::from([
            ("example.com".to_string(), true),
            ("shop.example.com".to_string(), false),
        ]);
        DomainVerificationUserSelection::new(
            Uuid::from_u128(0x1234_5678_9abc_def0_1234_5678_9abc_def0),
            "com.example.app",
            UserHandle::of(10),
            true,
            hosts,
        )
    }

    #[test]
    fn round_trip() {
        let original = sample();
        let bytes = original.to_parcel_bytes().unwrap();
        let decoded = DomainVerificationUserSelection::from_parcel_bytes(&bytes).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn flags_slot_comes_first() {
        let bytes = sample().to_parcel_bytes().unwrap();
        assert_eq!(&bytes[..4], &[0x8, 0, 0, 0]);

        let disallowed = DomainVerificationUserSelection::new(
            Uuid::nil(),
            "p",
            UserHandle::SYSTEM,
            false,
            BTreeMap::new(),
        );
        assert_eq!(&disallowed.to_parcel_bytes().unwrap()[..4], &[0, 0, 0, 0]);
    }

    #[test]
    fn empty_map_round_trips() {
        let original = DomainVerificationUserSelection::new(
            Uuid::nil(),
            "com.example.empty",
            UserHandle::SYSTEM,
            false,
            BTreeMap::new(),
        );
        let decoded =
            DomainVerificationUserSelection::from_parcel_bytes(&original.to_parcel_bytes().unwrap()).unwrap();
        assert_eq!(decoded, original);
        assert!(decoded.host_to_user_selection_map().is_empty());
    }

    #[test]
    fn null_user_is_rejected() {
        let mut p = Parcel::new();
        p.write_byte(0);
        p.write_string16(Some(&Uuid::nil().to_string())).unwrap();
        p.write_string16(Some("pkg")).unwrap();
        p.write_i32(0);
        let err = DomainVerificationUserSelection::from_parcel_bytes(p.as_bytes()).unwrap_err();
        assert_eq!(err, ParcelError::NullField { field: "user" });
    }

    #[test]
    fn null_package_name_is_rejected() {
        let mut p = Parcel::new();
        p.write_byte(0);
        p.write_string16(Some(&Uuid::nil().to_string())).unwrap();
        p.write_string16(None).unwrap();
        let err = DomainVerificationUserSelection::from_parcel_bytes(p.as_bytes()).unwrap_err();
        assert_eq!(err, ParcelError::NullField { field: "packageName" });
    }

    #[test]
    fn malformed_identifier_is_rejected() {
        let mut p = Parcel::new();
        p.write_byte(0);
        p.write_string16(Some("not-a-uuid")).unwrap();
        let err = DomainVerificationUserSelection::from_parcel_bytes(p.as_bytes()).unwrap_err();
        assert_eq!(err, ParcelError::InvalidValue { field: "identifier" });
    }

    #[test]
    fn null_map_is_rejected() {
        let mut p = Parcel::new();
        p.write_byte(0x8);
        p.write_string16(Some(&Uuid::nil().to_string())).unwrap();
        p.write_string16(Some("pkg")).unwrap();
        p.write_i32(1);
        p.write_i32(0);
        p.write_i32(-1);
        let err = DomainVerificationUserSelection::from_parcel_bytes(p.as_bytes()).unwrap_err();
        assert_eq!(err, ParcelError::NullField { field: "hostToUserSelectionMap" });
    }

    #[test]
    fn negative_map_size_is_rejected() {
        let mut p = Parcel::new();
        p.write_byte(0);
        p.write_string16(Some(&Uuid::nil().to_string())).unwrap();
        p.write_string16(Some("pkg")).unwrap();
        p.write_i32(1);
        p.write_i32(0);
        p.write_i32(-5);
        let err = DomainVerificationUserSelection::from_parcel_bytes(p.as_bytes()).unwrap_err();
        assert_eq!(err, ParcelError::InvalidLength { field: "hostToUserSelectionMap", len: -5 });
    }

    #[test]
    fn inflated_map_size_is_rejected() {
        let mut p = Parcel::new();
        p.write_byte(0);
        p.write_string16(Some(&Uuid::nil().to_string())).unwrap();
        p.write_string16(Some("pkg")).unwrap();
        p.write_i32(1);
        p.write_i32(0);
        p.write_i32(1_000_000);
        let err = DomainVerificationUserSelection::from_parcel_bytes(p.as_bytes()).unwrap_err();
        assert_eq!(
            err,
            ParcelError::InvalidLength { field: "hostToUserSelectionMap", len: 1_000_000 }
        );
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = sample().to_parcel_bytes().unwrap();
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        assert!(matches!(
            DomainVerificationUserSelection::from_parcel_bytes(&bytes),
            Err(ParcelError::TrailingBytes { remaining: 4, .. })
        ));
    }

    #[test]
    fn display_lists_every_field() {
        let text = sample().to_string();
        assert!(text.starts_with("DomainVerificationUserSelection { identifier = 12345678-9abc-def0"));
        assert!(text.contains("packageName = com.example.app"));
        assert!(text.contains("user = UserHandle{10}"));
        assert!(text.contains("linkHandlingAllowed = true"));
        assert!(text.ends_with("hostToUserSelectionMap = {example.com=true, shop.example.com=false} }"));
    }

    #[test]
    fn describe_contents_is_zero() {
        assert_eq!(sample().describe_contents(), 0);
    }
}
