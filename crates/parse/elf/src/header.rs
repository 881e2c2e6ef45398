//! ELF file header parsing.
//!
//! Boot images come in both ELF32 and ELF64 flavours. The class byte is read
//! once from the identification bytes, after which the whole file header is
//! decoded with the matching fixed layout into an [`ImageHeader`].

use crate::error::FormatError;

/// ELF magic bytes: `\x7fELF`.
pub const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

/// Size of the `e_ident` array.
pub const EI_NIDENT: usize = 16;

/// Index of the class byte in `e_ident`.
pub const EI_CLASS: usize = 4;

/// ELF class: 32-bit.
pub const ELFCLASS32: u8 = 1;

/// ELF class: 64-bit.
pub const ELFCLASS64: u8 = 2;

/// ELF machine: ARM.
pub const EM_ARM: u16 = 40;

/// The only defined ELF version.
pub const EV_CURRENT: u32 = 1;

/// Size of an ELF32 file header (52 bytes).
pub const ELF32_EHDR_SIZE: usize = 52;

/// Size of an ELF64 file header (64 bytes).
pub const ELF64_EHDR_SIZE: usize = 64;

/// Size of an ELF32 program header entry (32 bytes).
pub const ELF32_PHDR_SIZE: usize = 32;

/// Size of an ELF64 program header entry (56 bytes).
pub const ELF64_PHDR_SIZE: usize = 56;

/// Size of an ELF32 section header entry (40 bytes).
pub const ELF32_SHDR_SIZE: usize = 40;

/// Size of an ELF64 section header entry (64 bytes).
pub const ELF64_SHDR_SIZE: usize = 64;

/// Fewest program headers a boot image may carry (kernel + ramdisk).
pub const MIN_SEGMENTS: u16 = 2;

/// Most program headers a boot image may carry.
pub const MAX_SEGMENTS: u16 = 4;

/// Read a little-endian `u16` from `data` at byte offset `off`.
///
/// # Panics
///
/// Panics if `off + 2 > data.len()`. Callers must bounds-check first.
pub(crate) fn le_u16(data: &[u8], off: usize) -> u16 {
    u16::from_le_bytes([data[off], data[off + 1]])
}

/// Read a little-endian `u32` from `data` at byte offset `off`.
pub(crate) fn le_u32(data: &[u8], off: usize) -> u32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&data[off..off + 4]);
    u32::from_le_bytes(b)
}

/// Read a little-endian `u64` from `data` at byte offset `off`.
pub(crate) fn le_u64(data: &[u8], off: usize) -> u64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&data[off..off + 8]);
    u64::from_le_bytes(b)
}

/// Width of the ELF structures in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElfClass {
    /// `ELFCLASS32`.
    Elf32,
    /// `ELFCLASS64`.
    Elf64,
}

impl ElfClass {
    /// Check the magic bytes and read the class from the identification
    /// bytes at the start of a file.
    ///
    /// `ident` may be shorter than [`EI_NIDENT`] if the file is short.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidMagic`] if the magic is missing and
    /// [`FormatError::UnsupportedClass`] for any class byte other than
    /// `ELFCLASS32` or `ELFCLASS64`.
    pub fn identify(ident: &[u8]) -> Result<Self, FormatError> {
        if ident.len() < ELF_MAGIC.len() || ident[..ELF_MAGIC.len()] != ELF_MAGIC {
            return Err(FormatError::InvalidMagic);
        }
        match ident.get(EI_CLASS).copied() {
            Some(ELFCLASS32) => Ok(Self::Elf32),
            Some(ELFCLASS64) => Ok(Self::Elf64),
            other => Err(FormatError::UnsupportedClass(other.unwrap_or(0))),
        }
    }

    /// Size of the file header for this class.
    #[must_use]
    pub const fn header_size(self) -> usize {
        match self {
            Self::Elf32 => ELF32_EHDR_SIZE,
            Self::Elf64 => ELF64_EHDR_SIZE,
        }
    }

    /// Size of one program header entry for this class.
    #[must_use]
    pub const fn phdr_size(self) -> usize {
        match self {
            Self::Elf32 => ELF32_PHDR_SIZE,
            Self::Elf64 => ELF64_PHDR_SIZE,
        }
    }

    /// Size of one section header entry for this class.
    #[must_use]
    pub const fn shdr_size(self) -> usize {
        match self {
            Self::Elf32 => ELF32_SHDR_SIZE,
            Self::Elf64 => ELF64_SHDR_SIZE,
        }
    }
}

/// Parsed ELF32 file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(missing_docs, reason = "fields mirror the ELF specification")]
pub struct Elf32Header {
    pub e_type: u16,
    pub e_machine: u16,
    pub e_version: u32,
    pub e_entry: u32,
    pub e_phoff: u32,
    pub e_shoff: u32,
    pub e_flags: u32,
    pub e_ehsize: u16,
    pub e_phentsize: u16,
    pub e_phnum: u16,
    pub e_shentsize: u16,
    pub e_shnum: u16,
    pub e_shstrndx: u16,
}

impl Elf32Header {
    /// Parse an ELF32 file header.
    ///
    /// The caller must ensure `data.len() >= ELF32_EHDR_SIZE`.
    pub(crate) fn parse(data: &[u8]) -> Self {
        Self {
            e_type: le_u16(data, 16),
            e_machine: le_u16(data, 18),
            e_version: le_u32(data, 20),
            e_entry: le_u32(data, 24),
            e_phoff: le_u32(data, 28),
            e_shoff: le_u32(data, 32),
            e_flags: le_u32(data, 36),
            e_ehsize: le_u16(data, 40),
            e_phentsize: le_u16(data, 42),
            e_phnum: le_u16(data, 44),
            e_shentsize: le_u16(data, 46),
            e_shnum: le_u16(data, 48),
            e_shstrndx: le_u16(data, 50),
        }
    }
}

/// Parsed ELF64 file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(missing_docs, reason = "fields mirror the ELF specification")]
pub struct Elf64Header {
    pub e_type: u16,
    pub e_machine: u16,
    pub e_version: u32,
    pub e_entry: u64,
    pub e_phoff: u64,
    pub e_shoff: u64,
    pub e_flags: u32,
    pub e_ehsize: u16,
    pub e_phentsize: u16,
    pub e_phnum: u16,
    pub e_shentsize: u16,
    pub e_shnum: u16,
    pub e_shstrndx: u16,
}

impl Elf64Header {
    /// Parse an ELF64 file header.
    ///
    /// The caller must ensure `data.len() >= ELF64_EHDR_SIZE`.
    pub(crate) fn parse(data: &[u8]) -> Self {
        Self {
            e_type: le_u16(data, 16),
            e_machine: le_u16(data, 18),
            e_version: le_u32(data, 20),
            e_entry: le_u64(data, 24),
            e_phoff: le_u64(data, 32),
            e_shoff: le_u64(data, 40),
            e_flags: le_u32(data, 48),
            e_ehsize: le_u16(data, 52),
            e_phentsize: le_u16(data, 54),
            e_phnum: le_u16(data, 56),
            e_shentsize: le_u16(data, 58),
            e_shnum: le_u16(data, 60),
            e_shstrndx: le_u16(data, 62),
        }
    }
}

/// A boot image file header of either class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageHeader {
    /// 32-bit file header.
    Elf32(Elf32Header),
    /// 64-bit file header.
    Elf64(Elf64Header),
}

/// Read a field present in both header layouts, widening it as needed.
macro_rules! field {
    ($hdr:expr, $name:ident) => {
        match $hdr {
            ImageHeader::Elf32(h) => h.$name.into(),
            ImageHeader::Elf64(h) => h.$name.into(),
        }
    };
}

impl ImageHeader {
    /// Parse the file header of the given class from raw bytes.
    ///
    /// The caller must ensure `data.len() >= class.header_size()`.
    #[must_use]
    pub fn parse(class: ElfClass, data: &[u8]) -> Self {
        match class {
            ElfClass::Elf32 => Self::Elf32(Elf32Header::parse(data)),
            ElfClass::Elf64 => Self::Elf64(Elf64Header::parse(data)),
        }
    }

    /// Returns the class this header was parsed with.
    #[must_use]
    pub fn class(&self) -> ElfClass {
        match self {
            Self::Elf32(_) => ElfClass::Elf32,
            Self::Elf64(_) => ElfClass::Elf64,
        }
    }

    /// Entry point address. Boot images do not use it.
    #[must_use]
    pub fn entry(&self) -> u64 {
        field!(self, e_entry)
    }

    /// File offset of the program header table.
    #[must_use]
    pub fn phoff(&self) -> u64 {
        field!(self, e_phoff)
    }

    /// File offset of the section header table.
    #[must_use]
    pub fn shoff(&self) -> u64 {
        field!(self, e_shoff)
    }

    /// Declared size of the file header.
    #[must_use]
    pub fn ehsize(&self) -> u16 {
        field!(self, e_ehsize)
    }

    /// Target machine.
    #[must_use]
    pub fn machine(&self) -> u16 {
        field!(self, e_machine)
    }

    /// ELF version.
    #[must_use]
    pub fn version(&self) -> u32 {
        field!(self, e_version)
    }

    /// Declared size of one program header entry.
    #[must_use]
    pub fn phentsize(&self) -> u16 {
        field!(self, e_phentsize)
    }

    /// Number of program header entries.
    #[must_use]
    pub fn phnum(&self) -> u16 {
        field!(self, e_phnum)
    }

    /// Declared size of one section header entry.
    #[must_use]
    pub fn shentsize(&self) -> u16 {
        field!(self, e_shentsize)
    }

    /// Number of section header entries.
    #[must_use]
    pub fn shnum(&self) -> u16 {
        field!(self, e_shnum)
    }

    /// Check that this header describes a boot image this crate can unpack.
    ///
    /// Checks are applied in a fixed order and the first failure is
    /// reported: header size, machine, version, program header entry size,
    /// program header count, then (only when sections are present) section
    /// header entry size and section count.
    ///
    /// # Errors
    ///
    /// Returns the [`FormatError`] of the first check that fails.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "header sizes are small constants"
    )]
    pub fn validate(&self) -> Result<(), FormatError> {
        let class = self.class();

        let expected = class.header_size() as u16;
        if self.ehsize() != expected {
            return Err(FormatError::HeaderSizeMismatch {
                expected,
                found: self.ehsize(),
            });
        }

        if self.machine() != EM_ARM {
            return Err(FormatError::UnsupportedMachine(self.machine()));
        }

        if self.version() != EV_CURRENT {
            return Err(FormatError::UnsupportedVersion(self.version()));
        }

        let expected = class.phdr_size() as u16;
        if self.phentsize() != expected {
            return Err(FormatError::PhentSizeMismatch {
                expected,
                found: self.phentsize(),
            });
        }

        if !(MIN_SEGMENTS..=MAX_SEGMENTS).contains(&self.phnum()) {
            return Err(FormatError::UnexpectedSegmentCount(self.phnum()));
        }

        if self.shnum() != 0 {
            let expected = class.shdr_size() as u16;
            if self.shentsize() != expected {
                return Err(FormatError::ShentSizeMismatch {
                    expected,
                    found: self.shentsize(),
                });
            }
            if self.shnum() > 1 {
                return Err(FormatError::TooManySections(self.shnum()));
            }
        }

        Ok(())
    }
}
