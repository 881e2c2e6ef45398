//! Program header parsing.
//!
//! Both layouts carry the same fields in a different order; they are
//! reduced to a width-independent [`ProgramSegment`] before any payload is
//! read.

use crate::header::{ElfClass, le_u32, le_u64};

/// Parsed ELF32 program header entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(missing_docs, reason = "fields mirror the ELF specification")]
pub struct Elf32ProgramHeader {
    pub p_type: u32,
    pub p_offset: u32,
    pub p_vaddr: u32,
    pub p_paddr: u32,
    pub p_filesz: u32,
    pub p_memsz: u32,
    pub p_flags: u32,
    pub p_align: u32,
}

impl Elf32ProgramHeader {
    /// Parse a program header entry from raw bytes.
    ///
    /// The caller must ensure `data.len() >= ELF32_PHDR_SIZE`.
    pub(crate) fn parse(data: &[u8]) -> Self {
        Self {
            p_type: le_u32(data, 0),
            p_offset: le_u32(data, 4),
            p_vaddr: le_u32(data, 8),
            p_paddr: le_u32(data, 12),
            p_filesz: le_u32(data, 16),
            p_memsz: le_u32(data, 20),
            p_flags: le_u32(data, 24),
            p_align: le_u32(data, 28),
        }
    }
}

/// Parsed ELF64 program header entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(missing_docs, reason = "fields mirror the ELF specification")]
pub struct Elf64ProgramHeader {
    pub p_type: u32,
    pub p_flags: u32,
    pub p_offset: u64,
    pub p_vaddr: u64,
    pub p_paddr: u64,
    pub p_filesz: u64,
    pub p_memsz: u64,
    pub p_align: u64,
}

impl Elf64ProgramHeader {
    /// Parse a program header entry from raw bytes.
    ///
    /// The caller must ensure `data.len() >= ELF64_PHDR_SIZE`.
    pub(crate) fn parse(data: &[u8]) -> Self {
        Self {
            p_type: le_u32(data, 0),
            p_flags: le_u32(data, 4),
            p_offset: le_u64(data, 8),
            p_vaddr: le_u64(data, 16),
            p_paddr: le_u64(data, 24),
            p_filesz: le_u64(data, 32),
            p_memsz: le_u64(data, 40),
            p_align: le_u64(data, 48),
        }
    }
}

/// Where a segment lives in the file and where it is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramSegment {
    /// Offset of the segment data in the file.
    pub offset: u64,
    /// Physical load address. ELF64 addresses are truncated to 32 bits.
    pub paddr: u32,
    /// Size of the segment data in the file.
    pub filesz: u64,
}

impl ProgramSegment {
    /// Parse one program header entry of the given class.
    ///
    /// The caller must ensure `data.len() >= class.phdr_size()`.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "boot metadata only records 32-bit load addresses"
    )]
    pub fn parse(class: ElfClass, data: &[u8]) -> Self {
        match class {
            ElfClass::Elf32 => {
                let ph = Elf32ProgramHeader::parse(data);
                Self {
                    offset: ph.p_offset.into(),
                    paddr: ph.p_paddr,
                    filesz: ph.p_filesz.into(),
                }
            }
            ElfClass::Elf64 => {
                let ph = Elf64ProgramHeader::parse(data);
                Self {
                    offset: ph.p_offset,
                    paddr: ph.p_paddr as u32,
                    filesz: ph.p_filesz,
                }
            }
        }
    }

    /// Parse `count` contiguous program header entries.
    ///
    /// Entries that do not fit in `table` are not returned.
    pub fn parse_table(
        class: ElfClass,
        table: &[u8],
        count: usize,
    ) -> impl Iterator<Item = Self> + '_ {
        table
            .chunks_exact(class.phdr_size())
            .take(count)
            .map(move |entry| Self::parse(class, entry))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::header::{ELF32_PHDR_SIZE, ELF64_PHDR_SIZE};

    /// `PT_LOAD`, the type every boot image segment uses.
    pub(crate) const PT_LOAD: u32 = 1;

    /// Encode a program header entry in the given class's layout.
    #[expect(clippy::cast_possible_truncation, reason = "test fixtures")]
    pub(crate) fn encode_phdr(class: ElfClass, offset: u64, paddr: u64, filesz: u64) -> Vec<u8> {
        match class {
            ElfClass::Elf32 => {
                let mut b = vec![0u8; ELF32_PHDR_SIZE];
                b[0..4].copy_from_slice(&PT_LOAD.to_le_bytes());
                b[4..8].copy_from_slice(&(offset as u32).to_le_bytes());
                b[8..12].copy_from_slice(&(paddr as u32).to_le_bytes());
                b[12..16].copy_from_slice(&(paddr as u32).to_le_bytes());
                b[16..20].copy_from_slice(&(filesz as u32).to_le_bytes());
                b[20..24].copy_from_slice(&(filesz as u32).to_le_bytes());
                // PF_R | PF_W | PF_X
                b[24..28].copy_from_slice(&7u32.to_le_bytes());
                b[28..32].copy_from_slice(&0x1000u32.to_le_bytes());
                b
            }
            ElfClass::Elf64 => {
                let mut b = vec![0u8; ELF64_PHDR_SIZE];
                b[0..4].copy_from_slice(&PT_LOAD.to_le_bytes());
                b[4..8].copy_from_slice(&7u32.to_le_bytes());
                b[8..16].copy_from_slice(&offset.to_le_bytes());
                b[16..24].copy_from_slice(&paddr.to_le_bytes());
                b[24..32].copy_from_slice(&paddr.to_le_bytes());
                b[32..40].copy_from_slice(&filesz.to_le_bytes());
                b[40..48].copy_from_slice(&filesz.to_le_bytes());
                b[48..56].copy_from_slice(&0x1000u64.to_le_bytes());
                b
            }
        }
    }

    #[test]
    fn parse_elf32_layout() {
        let raw = encode_phdr(ElfClass::Elf32, 0x1000, 0x0020_8000, 0x40);
        let ph = Elf32ProgramHeader::parse(&raw);
        assert_eq!(ph.p_type, PT_LOAD);
        assert_eq!(ph.p_offset, 0x1000);
        assert_eq!(ph.p_paddr, 0x0020_8000);
        assert_eq!(ph.p_filesz, 0x40);
        assert_eq!(ph.p_flags, 7);
        assert_eq!(ph.p_align, 0x1000);
    }

    #[test]
    fn parse_elf64_layout() {
        let raw = encode_phdr(ElfClass::Elf64, 0x1000, 0x0020_8000, 0x40);
        let ph = Elf64ProgramHeader::parse(&raw);
        assert_eq!(ph.p_flags, 7);
        assert_eq!(ph.p_offset, 0x1000);
        assert_eq!(ph.p_vaddr, 0x0020_8000);
        assert_eq!(ph.p_filesz, 0x40);
    }

    #[test]
    fn both_layouts_reduce_to_the_same_segment() {
        let a = ProgramSegment::parse(
            ElfClass::Elf32,
            &encode_phdr(ElfClass::Elf32, 0x2000, 0x0200_0000, 0x1234),
        );
        let b = ProgramSegment::parse(
            ElfClass::Elf64,
            &encode_phdr(ElfClass::Elf64, 0x2000, 0x0200_0000, 0x1234),
        );
        assert_eq!(a, b);
        assert_eq!(
            a,
            ProgramSegment {
                offset: 0x2000,
                paddr: 0x0200_0000,
                filesz: 0x1234,
            }
        );
    }

    #[test]
    fn wide_physical_address_is_truncated() {
        let raw = encode_phdr(ElfClass::Elf64, 0, 0x0000_0001_8000_8000, 0);
        assert_eq!(ProgramSegment::parse(ElfClass::Elf64, &raw).paddr, 0x8000_8000);
    }

    #[test]
    fn parse_table_honours_count() {
        let mut table = Vec::new();
        for i in 0..4u64 {
            table.extend(encode_phdr(ElfClass::Elf32, i * 0x100, i, 1));
        }
        let segs: Vec<_> = ProgramSegment::parse_table(ElfClass::Elf32, &table, 3).collect();
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[2].offset, 0x200);
    }
}
