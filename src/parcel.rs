//! Minimal Parcel codec.
//!
//! Covers the primitives the records in this crate need, laid out the way the
//! platform Parcel lays them out:
//!
//! - little-endian, every value padded to a 4-byte boundary
//! - `byte` and `bool` values occupy a full 32-bit slot
//! - strings are UTF-16: `i32` length in code units (`-1` for null), the
//!   units, a zero terminator, then padding
//! - generic values (`writeValue`) are prefixed with an `i32` type tag
//!
//! The reader is a cursor over a borrowed slice. Declared lengths are checked
//! against the bytes that remain before anything is allocated.

use std::fmt;

/// Type tag written before a `String` value.
pub const VAL_STRING: i32 = 0;
/// Type tag written before a `Boolean` value.
pub const VAL_BOOLEAN: i32 = 9;

/// Records that can be written to and read back from a Parcel.
pub trait Parcelable: Sized {
    /// Append this record to `dest`.
    ///
    /// Fails only when a length does not fit the `i32` prefix.
    fn write_to_parcel(&self, dest: &mut Parcel) -> Result<(), ParcelError>;

    /// Read a record previously written by [`write_to_parcel`](Self::write_to_parcel).
    fn read_from_parcel(src: &mut ParcelReader<'_>) -> Result<Self, ParcelError>;

    /// Special-object flags; none of the records here carry file descriptors.
    fn describe_contents(&self) -> i32 {
        0
    }

    /// Encode into a standalone buffer.
    fn to_parcel_bytes(&self) -> Result<Vec<u8>, ParcelError> {
        let mut parcel = Parcel::new();
        self.write_to_parcel(&mut parcel)?;
        Ok(parcel.into_bytes())
    }

    /// Decode from a standalone buffer, rejecting trailing bytes.
    fn from_parcel_bytes(bytes: &[u8]) -> Result<Self, ParcelError> {
        let mut reader = ParcelReader::new(bytes);
        let value = Self::read_from_parcel(&mut reader)?;
        reader.finish()?;
        Ok(value)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Failure while decoding a Parcel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParcelError {
    /// Input ended before the field was complete.
    UnexpectedEnd {
        /// Field being read.
        field: &'static str,
    },
    /// A length prefix was negative (where null is not allowed) or exceeded
    /// the remaining input.
    InvalidLength {
        /// Field being read.
        field: &'static str,
        /// Declared length.
        len: i32,
    },
    /// A value could not be interpreted (bad tag, bad UTF-16, bad UUID text).
    InvalidValue {
        /// Field being read.
        field: &'static str,
    },
    /// A mandatory field was null.
    NullField {
        /// Field being read.
        field: &'static str,
    },
    /// A length was too large for the `i32` prefix on write.
    TooLarge {
        /// Length that was requested.
        len: usize,
    },
    /// Bytes remained after the record was fully read.
    TrailingBytes {
        /// Bytes consumed.
        consumed: usize,
        /// Bytes left over.
        remaining: usize,
    },
}

impl ParcelError {
    /// Field associated with the error, if any.
    pub fn field(&self) -> Option<&'static str> {
        match *self {
            Self::UnexpectedEnd { field }
            | Self::InvalidLength { field, .. }
            | Self::InvalidValue { field }
            | Self::NullField { field } => Some(field),
            Self::TooLarge { .. } | Self::TrailingBytes { .. } => None,
        }
    }
}

impl fmt::Display for ParcelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEnd { field } => write!(f, "parcel ended while reading {field}"),
            Self::InvalidLength { field, len } => {
                write!(f, "invalid length {len} for {field}")
            }
            Self::InvalidValue { field } => write!(f, "invalid value for {field}"),
            Self::NullField { field } => write!(f, "{field} must not be null"),
            Self::TooLarge { len } => write!(f, "length {len} exceeds the parcel length prefix"),
            Self::TrailingBytes { consumed, remaining } => write!(
                f,
                "{remaining} trailing bytes after {consumed} bytes of parcel data"
            ),
        }
    }
}

impl std::error::Error for ParcelError {}

// ============================================================================
// Writer
// ============================================================================

/// Growable Parcel buffer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Parcel {
    data: Vec<u8>,
}

impl Parcel {
    /// Empty parcel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume into the underlying bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Append a 32-bit integer.
    pub fn write_i32(&mut self, value: i32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    /// Append a byte, widened to a 32-bit slot.
    pub fn write_byte(&mut self, value: u8) {
        self.write_i32(i32::from(value));
    }

    /// Append a boolean as `0` or `1`.
    pub fn write_bool(&mut self, value: bool) {
        self.write_i32(i32::from(value));
    }

    /// Append a length or element count as an `i32`.
    pub fn write_len(&mut self, len: usize) -> Result<(), ParcelError> {
        let len = i32::try_from(len).map_err(|_| ParcelError::TooLarge { len })?;
        self.write_i32(len);
        Ok(())
    }

    /// Append a nullable UTF-16 string.
    pub fn write_string16(&mut self, value: Option<&str>) -> Result<(), ParcelError> {
        let Some(value) = value else {
            self.write_i32(-1);
            return Ok(());
        };
        let units: Vec<u16> = value.encode_utf16().collect();
        // Length is in code units and excludes the terminator.
        self.write_len(units.len())?;
        for unit in units.iter().copied().chain(std::iter::once(0)) {
            self.data.extend_from_slice(&unit.to_le_bytes());
        }
        self.pad();
        Ok(())
    }

    /// Append a `String` value with its type tag.
    pub fn write_string_value(&mut self, value: &str) -> Result<(), ParcelError> {
        self.write_i32(VAL_STRING);
        self.write_string16(Some(value))
    }

    /// Append a `Boolean` value with its type tag.
    pub fn write_bool_value(&mut self, value: bool) {
        self.write_i32(VAL_BOOLEAN);
        self.write_bool(value);
    }

    fn pad(&mut self) {
        let rem = self.data.len() % 4;
        if rem != 0 {
            self.data.resize(self.data.len() + (4 - rem), 0);
        }
    }
}

// ============================================================================
// Reader
// ============================================================================

/// Cursor over Parcel bytes.
#[derive(Debug, Clone, Copy)]
pub struct ParcelReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ParcelReader<'a> {
    /// Reader positioned at the start of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Current offset.
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.offset)
    }

    fn read_exact(&mut self, len: usize, field: &'static str) -> Result<&'a [u8], ParcelError> {
        if len > self.remaining() {
            return Err(ParcelError::UnexpectedEnd { field });
        }
        let start = self.offset;
        self.offset += len;
        Ok(&self.bytes[start..start + len])
    }

    /// Read a 32-bit integer.
    pub fn read_i32(&mut self, field: &'static str) -> Result<i32, ParcelError> {
        let raw = self.read_exact(4, field)?;
        Ok(i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    /// Read a byte stored in a 32-bit slot.
    pub fn read_byte(&mut self, field: &'static str) -> Result<u8, ParcelError> {
        // The platform truncates the slot to its low byte.
        Ok(self.read_i32(field)? as u8)
    }

    /// Read a boolean; any non-zero value is `true`.
    pub fn read_bool(&mut self, field: &'static str) -> Result<bool, ParcelError> {
        Ok(self.read_i32(field)? != 0)
    }

    /// Read a nullable UTF-16 string.
    pub fn read_string16(&mut self, field: &'static str) -> Result<Option<String>, ParcelError> {
        let len = self.read_i32(field)?;
        if len == -1 {
            return Ok(None);
        }
        let units = usize::try_from(len).map_err(|_| ParcelError::InvalidLength { field, len })?;
        // Units plus terminator, padded to 4.
        let byte_len = units
            .checked_add(1)
            .and_then(|n| n.checked_mul(2))
            .and_then(|n| n.checked_add(3))
            .map(|n| n & !3)
            .filter(|n| *n <= self.remaining())
            .ok_or(ParcelError::InvalidLength { field, len })?;
        let raw = self.read_exact(byte_len, field)?;

        let decoded: Vec<u16> = raw
            .chunks_exact(2)
            .take(units)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        let terminator = u16::from_le_bytes([raw[units * 2], raw[units * 2 + 1]]);
        if terminator != 0 {
            return Err(ParcelError::InvalidValue { field });
        }
        String::from_utf16(&decoded)
            .map(Some)
            .map_err(|_| ParcelError::InvalidValue { field })
    }

    /// Read a mandatory UTF-16 string.
    pub fn read_required_string16(&mut self, field: &'static str) -> Result<String, ParcelError> {
        self.read_string16(field)?
            .ok_or(ParcelError::NullField { field })
    }

    /// Read a tagged `String` value.
    pub fn read_string_value(&mut self, field: &'static str) -> Result<String, ParcelError> {
        self.expect_tag(VAL_STRING, field)?;
        self.read_required_string16(field)
    }

    /// Read a tagged `Boolean` value.
    pub fn read_bool_value(&mut self, field: &'static str) -> Result<bool, ParcelError> {
        self.expect_tag(VAL_BOOLEAN, field)?;
        self.read_bool(field)
    }

    fn expect_tag(&mut self, tag: i32, field: &'static str) -> Result<(), ParcelError> {
        if self.read_i32(field)? != tag {
            return Err(ParcelError::InvalidValue { field });
        }
        Ok(())
    }

    /// Confirm every byte was consumed.
    pub fn finish(self) -> Result<(), ParcelError> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(ParcelError::TrailingBytes {
                consumed: self.offset,
                remaining,
            }),
        }
    }
}
