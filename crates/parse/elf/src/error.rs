//! Error types for boot image decoding.

use std::io;

use thiserror::Error;

/// Structural problems with the ELF headers of a boot image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The file does not start with `\x7fELF`.
    #[error("No ELF header found")]
    InvalidMagic,
    /// Identification byte 4 is neither `ELFCLASS32` nor `ELFCLASS64`.
    #[error("Unknown ELF class {0}")]
    UnsupportedClass(u8),
    /// `e_ehsize` does not match the size of the class's file header.
    #[error("Header size not {expected} (found {found})")]
    HeaderSizeMismatch {
        /// Size of the file header for the detected class.
        expected: u16,
        /// Value of `e_ehsize`.
        found: u16,
    },
    /// `e_machine` is not `EM_ARM`.
    #[error("ELF machine is not ARM (found {0})")]
    UnsupportedMachine(u16),
    /// `e_version` is not 1.
    #[error("Unknown ELF version {0}")]
    UnsupportedVersion(u32),
    /// `e_phentsize` does not match the class's program header size.
    #[error("Program header size not {expected} (found {found})")]
    PhentSizeMismatch {
        /// Size of a program header for the detected class.
        expected: u16,
        /// Value of `e_phentsize`.
        found: u16,
    },
    /// `e_phnum` is outside `2..=4`.
    #[error("Unexpected number of elements: {0}")]
    UnexpectedSegmentCount(u16),
    /// `e_shentsize` does not match the class's section header size.
    #[error("Section header size not {expected} (found {found})")]
    ShentSizeMismatch {
        /// Size of a section header for the detected class.
        expected: u16,
        /// Value of `e_shentsize`.
        found: u16,
    },
    /// More than one section header is declared.
    #[error("More than one section header ({0})")]
    TooManySections(u16),
}

/// Errors returned by [`decode`](crate::decode).
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Seeking or reading the image failed, including short reads.
    #[error("I/O error while reading image: {0}")]
    Io(#[from] io::Error),
    /// The image is not a supported ARM ELF boot image.
    #[error(transparent)]
    Format(#[from] FormatError),
}

impl DecodeError {
    /// Returns `true` if the image was rejected for its contents rather than
    /// because reading it failed.
    #[must_use]
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }

    /// Returns the format error, if this is one.
    #[must_use]
    pub fn format_error(&self) -> Option<FormatError> {
        match self {
            Self::Format(e) => Some(*e),
            Self::Io(_) => None,
        }
    }
}
