//! ICC Profile Error Types

use std::fmt;

/// Taxonomy class of an [`IccError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed bytes, bad signatures, out-of-bounds offsets.
    Structural,
    /// A value does not fit its on-disk encoding.
    Representability,
    /// Storage could not be allocated.
    Resource,
    /// The tag set is not legal for the profile.
    Legality,
    /// Valid data this library cannot handle.
    Unsupported,
    /// The underlying file failed.
    Io,
}

/// Errors that can occur when reading, writing or evaluating ICC profiles
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum IccError {
    /// Data is too small
    TooSmall { expected: usize, actual: usize },
    /// Invalid profile signature (should be 'acsp')
    InvalidSignature(u32),
    /// Profile size in header doesn't fit the file
    SizeMismatch { header_size: u32, actual_size: u64 },
    /// Tag offset is out of bounds
    TagOutOfBounds {
        tag: u32,
        offset: u32,
        size: u32,
        profile_size: u32,
    },
    /// The type signature embedded in a tag is not the expected one
    TypeMismatch { expected: u32, found: u32 },
    /// A computed size saturated
    TooLarge(&'static str),
    /// Corrupted or invalid data
    CorruptedData(String),
    /// Invalid color space
    InvalidColorSpace(u32),
    /// Invalid profile class
    InvalidProfileClass(u32),
    /// Invalid rendering intent
    InvalidRenderingIntent(u32),
    /// A value can't be encoded in its target width
    NotRepresentable { field: &'static str, value: f64 },
    /// Storage for a table could not be reserved
    Allocation { bytes: usize },
    /// Required tag is missing
    MissingTag(u32),
    /// Tag with this signature already exists
    DuplicateTag(u32),
    /// Type not permitted for this tag signature
    IllegalTagType { tag: u32, type_sig: u32 },
    /// No tag with this signature
    TagNotFound(u32),
    /// Tag type not recognized and unknown types are not allowed
    UnknownTagType { tag: u32, type_sig: u32 },
    /// Matrix can't be inverted
    SingularMatrix,
    /// Unsupported profile version
    UnsupportedVersion { major: u8, minor: u8 },
    /// Unsupported feature
    Unsupported(String),
    /// Underlying file operation failed
    Io(String),
}

impl IccError {
    /// Taxonomy class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TooSmall { .. }
            | Self::InvalidSignature(_)
            | Self::SizeMismatch { .. }
            | Self::TagOutOfBounds { .. }
            | Self::TypeMismatch { .. }
            | Self::TooLarge(_)
            | Self::CorruptedData(_)
            | Self::InvalidColorSpace(_)
            | Self::InvalidProfileClass(_)
            | Self::InvalidRenderingIntent(_) => ErrorKind::Structural,
            Self::NotRepresentable { .. } => ErrorKind::Representability,
            Self::Allocation { .. } => ErrorKind::Resource,
            Self::MissingTag(_)
            | Self::DuplicateTag(_)
            | Self::IllegalTagType { .. }
            | Self::TagNotFound(_)
            | Self::UnknownTagType { .. } => ErrorKind::Legality,
            Self::SingularMatrix | Self::UnsupportedVersion { .. } | Self::Unsupported(_) => {
                ErrorKind::Unsupported
            }
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Stable numeric code, grouped by [`ErrorKind`] in hundreds.
    pub fn code(&self) -> u32 {
        match self {
            Self::TooSmall { .. } => 101,
            Self::InvalidSignature(_) => 102,
            Self::SizeMismatch { .. } => 103,
            Self::TagOutOfBounds { .. } => 104,
            Self::TypeMismatch { .. } => 105,
            Self::TooLarge(_) => 106,
            Self::CorruptedData(_) => 107,
            Self::InvalidColorSpace(_) => 108,
            Self::InvalidProfileClass(_) => 109,
            Self::InvalidRenderingIntent(_) => 110,
            Self::NotRepresentable { .. } => 201,
            Self::Allocation { .. } => 301,
            Self::MissingTag(_) => 401,
            Self::DuplicateTag(_) => 402,
            Self::IllegalTagType { .. } => 403,
            Self::TagNotFound(_) => 404,
            Self::UnknownTagType { .. } => 405,
            Self::SingularMatrix => 501,
            Self::UnsupportedVersion { .. } => 502,
            Self::Unsupported(_) => 503,
            Self::Io(_) => 601,
        }
    }
}

/// Render a signature as four characters when printable.
pub(crate) fn sig_str(sig: u32) -> String {
    let bytes = sig.to_be_bytes();
    if bytes.iter().all(|b| (0x20..0x7f).contains(b)) {
        bytes.iter().map(|&b| b as char).collect()
    } else {
        format!("0x{:08X}", sig)
    }
}

impl fmt::Display for IccError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooSmall { expected, actual } => {
                write!(f, "Data too small: expected {} bytes, got {}", expected, actual)
            }
            Self::InvalidSignature(sig) => {
                write!(
                    f,
                    "Invalid profile signature: 0x{:08X} (expected 'acsp')",
                    sig
                )
            }
            Self::SizeMismatch {
                header_size,
                actual_size,
            } => {
                write!(
                    f,
                    "Size mismatch: header says {} bytes, file holds {} bytes",
                    header_size, actual_size
                )
            }
            Self::TagOutOfBounds {
                tag,
                offset,
                size,
                profile_size,
            } => {
                write!(
                    f,
                    "Tag '{}' out of bounds: offset {} + size {} > profile size {}",
                    sig_str(*tag),
                    offset,
                    size,
                    profile_size
                )
            }
            Self::TypeMismatch { expected, found } => {
                write!(
                    f,
                    "Tag type mismatch: expected '{}', found '{}'",
                    sig_str(*expected),
                    sig_str(*found)
                )
            }
            Self::TooLarge(what) => write!(f, "Size of {} overflows", what),
            Self::CorruptedData(msg) => write!(f, "Corrupted data: {}", msg),
            Self::InvalidColorSpace(cs) => write!(f, "Invalid color space: 0x{:08X}", cs),
            Self::InvalidProfileClass(class) => {
                write!(f, "Invalid profile class: 0x{:08X}", class)
            }
            Self::InvalidRenderingIntent(intent) => {
                write!(f, "Invalid rendering intent: {}", intent)
            }
            Self::NotRepresentable { field, value } => {
                write!(f, "Value {} of {} is not representable", value, field)
            }
            Self::Allocation { bytes } => write!(f, "Failed to allocate {} bytes", bytes),
            Self::MissingTag(tag) => write!(f, "Required tag missing: '{}'", sig_str(*tag)),
            Self::DuplicateTag(tag) => write!(f, "Tag '{}' already exists", sig_str(*tag)),
            Self::IllegalTagType { tag, type_sig } => {
                write!(
                    f,
                    "Type '{}' is not permitted for tag '{}'",
                    sig_str(*type_sig),
                    sig_str(*tag)
                )
            }
            Self::TagNotFound(tag) => write!(f, "Tag '{}' not found", sig_str(*tag)),
            Self::UnknownTagType { tag, type_sig } => {
                write!(
                    f,
                    "Unknown type '{}' for tag '{}'",
                    sig_str(*type_sig),
                    sig_str(*tag)
                )
            }
            Self::SingularMatrix => write!(f, "Matrix is singular"),
            Self::UnsupportedVersion { major, minor } => {
                write!(f, "Unsupported profile version: {}.{}", major, minor)
            }
            Self::Unsupported(msg) => write!(f, "Unsupported feature: {}", msg),
            Self::Io(msg) => write!(f, "I/O failure: {}", msg),
        }
    }
}

impl std::error::Error for IccError {}

impl From<std::io::Error> for IccError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_grouped_by_kind() {
        let errors = [
            IccError::InvalidSignature(0),
            IccError::NotRepresentable {
                field: "s15Fixed16",
                value: 40000.0,
            },
            IccError::Allocation { bytes: 10 },
            IccError::DuplicateTag(0x64657363),
            IccError::Unsupported("x".into()),
            IccError::Io("eof".into()),
        ];
        for err in errors {
            let group = match err.kind() {
                ErrorKind::Structural => 1,
                ErrorKind::Representability => 2,
                ErrorKind::Resource => 3,
                ErrorKind::Legality => 4,
                ErrorKind::Unsupported => 5,
                ErrorKind::Io => 6,
            };
            assert_eq!(err.code() / 100, group, "{err}");
        }
    }

    #[test]
    fn test_display_uses_tag_chars() {
        let err = IccError::MissingTag(u32::from_be_bytes(*b"wtpt"));
        assert_eq!(err.to_string(), "Required tag missing: 'wtpt'");
    }
}
