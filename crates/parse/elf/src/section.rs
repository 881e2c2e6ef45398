//! Section header parsing.
//!
//! A boot image may carry a single section, located only through the
//! section header table, whose data starts with an 8-byte sub-header.

use crate::header::{ElfClass, le_u32, le_u64};

/// Bytes at the start of the appended section that precede its payload.
pub const APPENDED_SKIP: usize = 8;

/// Parsed ELF32 section header entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(missing_docs, reason = "fields mirror the ELF specification")]
pub struct Elf32SectionHeader {
    pub sh_name: u32,
    pub sh_type: u32,
    pub sh_flags: u32,
    pub sh_addr: u32,
    pub sh_offset: u32,
    pub sh_size: u32,
    pub sh_link: u32,
    pub sh_info: u32,
    pub sh_addralign: u32,
    pub sh_entsize: u32,
}

impl Elf32SectionHeader {
    /// Parse a section header from raw bytes.
    ///
    /// The caller must ensure `data.len() >= ELF32_SHDR_SIZE`.
    pub(crate) fn parse(data: &[u8]) -> Self {
        Self {
            sh_name: le_u32(data, 0),
            sh_type: le_u32(data, 4),
            sh_flags: le_u32(data, 8),
            sh_addr: le_u32(data, 12),
            sh_offset: le_u32(data, 16),
            sh_size: le_u32(data, 20),
            sh_link: le_u32(data, 24),
            sh_info: le_u32(data, 28),
            sh_addralign: le_u32(data, 32),
            sh_entsize: le_u32(data, 36),
        }
    }
}

/// Parsed ELF64 section header entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(missing_docs, reason = "fields mirror the ELF specification")]
pub struct Elf64SectionHeader {
    pub sh_name: u32,
    pub sh_type: u32,
    pub sh_flags: u64,
    pub sh_addr: u64,
    pub sh_offset: u64,
    pub sh_size: u64,
    pub sh_link: u32,
    pub sh_info: u32,
    pub sh_addralign: u64,
    pub sh_entsize: u64,
}

impl Elf64SectionHeader {
    /// Parse a section header from raw bytes.
    ///
    /// The caller must ensure `data.len() >= ELF64_SHDR_SIZE`.
    pub(crate) fn parse(data: &[u8]) -> Self {
        Self {
            sh_name: le_u32(data, 0),
            sh_type: le_u32(data, 4),
            sh_flags: le_u64(data, 8),
            sh_addr: le_u64(data, 16),
            sh_offset: le_u64(data, 24),
            sh_size: le_u64(data, 32),
            sh_link: le_u32(data, 40),
            sh_info: le_u32(data, 44),
            sh_addralign: le_u64(data, 48),
            sh_entsize: le_u64(data, 56),
        }
    }
}

/// Location of the appended section's data in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendedSection {
    /// Offset of the section data in the file.
    pub offset: u64,
    /// Declared size of the section data, sub-header included.
    pub size: u64,
}

impl AppendedSection {
    /// Parse a section header of the given class.
    ///
    /// The caller must ensure `data.len() >= class.shdr_size()`.
    #[must_use]
    pub fn parse(class: ElfClass, data: &[u8]) -> Self {
        match class {
            ElfClass::Elf32 => {
                let sh = Elf32SectionHeader::parse(data);
                Self {
                    offset: sh.sh_offset.into(),
                    size: sh.sh_size.into(),
                }
            }
            ElfClass::Elf64 => {
                let sh = Elf64SectionHeader::parse(data);
                Self {
                    offset: sh.sh_offset,
                    size: sh.sh_size,
                }
            }
        }
    }
}
