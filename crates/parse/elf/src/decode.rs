//! Reading a boot image into owned segment buffers.
//!
//! [`decode`] validates the file header, then reads every program segment
//! and the optional appended section into a [`SegmentSet`]. Any failure
//! aborts the whole decode; there are no partial results.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::DecodeError;
use crate::header::{EI_NIDENT, ElfClass, ImageHeader};
use crate::section::{APPENDED_SKIP, AppendedSection};
use crate::segment::ProgramSegment;

/// Number of slots in a [`SegmentSet`].
pub const SLOT_COUNT: usize = 4;

/// Slot holding the appended section (or the fourth program segment).
pub const APPENDED_SLOT: usize = 3;

/// One decoded segment: the bytes read from the file and where they load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    data: Vec<u8>,
    start: usize,
    paddr: Option<u32>,
}

impl Segment {
    /// A program segment loaded at `paddr`.
    #[must_use]
    pub fn new(data: Vec<u8>, paddr: u32) -> Self {
        Self {
            data,
            start: 0,
            paddr: Some(paddr),
        }
    }

    /// The appended section. Its payload starts after the sub-header and it
    /// has no load address.
    #[must_use]
    pub fn appended(data: Vec<u8>) -> Self {
        Self {
            data,
            start: APPENDED_SKIP,
            paddr: None,
        }
    }

    /// Number of bytes the headers declared for this segment.
    #[must_use]
    pub fn declared_len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the headers declared no bytes for this segment.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The segment contents, without any sub-header.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.data[self.start.min(self.data.len())..]
    }

    /// Physical load address, if the segment came from a program header.
    #[must_use]
    pub fn paddr(&self) -> Option<u32> {
        self.paddr
    }
}

/// Up to four decoded segments, indexed by their position in the image.
///
/// Slot 0 is the kernel, 1 the ramdisk, 2 the tags, and 3 the appended
/// section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentSet {
    slots: [Option<Segment>; SLOT_COUNT],
}

impl SegmentSet {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `segment` in slot `index`, returning what was there before.
    ///
    /// # Panics
    ///
    /// Panics if `index >= SLOT_COUNT`.
    pub fn insert(&mut self, index: usize, segment: Segment) -> Option<Segment> {
        self.slots[index].replace(segment)
    }

    /// The segment in slot `index`, if populated.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Physical address of slot `index`, or 0 if it has none.
    #[must_use]
    pub fn paddr(&self, index: usize) -> u32 {
        self.get(index).and_then(Segment::paddr).unwrap_or(0)
    }

    /// Number of populated slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Returns `true` if no slot is populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Populated slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Segment)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|s| (i, s)))
    }

    /// Consume the set, yielding populated slots in index order.
    pub fn into_segments(self) -> impl Iterator<Item = (usize, Segment)> {
        self.slots
            .into_iter()
            .enumerate()
            .filter_map(|(i, s)| s.map(|s| (i, s)))
    }
}

/// The result of decoding a boot image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// The validated file header.
    pub header: ImageHeader,
    /// Segment payloads in slot order.
    pub segments: SegmentSet,
}

/// Seek to `offset` and read exactly `len` bytes.
///
/// The buffer grows with the data actually read, so a bogus size in a
/// header fails with `UnexpectedEof` instead of a huge allocation.
fn read_exact_at<R: Read + Seek>(reader: &mut R, offset: u64, len: u64) -> io::Result<Vec<u8>> {
    reader.seek(SeekFrom::Start(offset))?;
    let mut buf = Vec::new();
    let read = reader.by_ref().take(len).read_to_end(&mut buf)?;
    if (read as u64) < len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {len} bytes at offset {offset:#x}, found {read}"),
        ));
    }
    Ok(buf)
}

/// Decode a boot image from a seekable byte source.
///
/// # Errors
///
/// Returns [`DecodeError::Format`] if the headers are not those of a
/// supported ARM boot image and [`DecodeError::Io`] if seeking or reading
/// fails, including when the file ends before a declared structure does.
pub fn decode<R: Read + Seek>(mut reader: R) -> Result<DecodedImage, DecodeError> {
    // Short files are allowed here so a truncated magic reports as such.
    reader.seek(SeekFrom::Start(0))?;
    let mut ident = Vec::with_capacity(EI_NIDENT);
    reader
        .by_ref()
        .take(EI_NIDENT as u64)
        .read_to_end(&mut ident)?;
    let class = ElfClass::identify(&ident)?;

    let raw = read_exact_at(&mut reader, 0, class.header_size() as u64)?;
    let header = ImageHeader::parse(class, &raw);
    header.validate()?;

    let phnum = usize::from(header.phnum());
    let table = read_exact_at(
        &mut reader,
        header.phoff(),
        (phnum * class.phdr_size()) as u64,
    )?;

    let mut segments = SegmentSet::new();
    for (index, ph) in ProgramSegment::parse_table(class, &table, phnum).enumerate() {
        let data = read_exact_at(&mut reader, ph.offset, ph.filesz)?;
        segments.insert(index, Segment::new(data, ph.paddr));
    }

    if header.shnum() == 1 {
        let raw = read_exact_at(&mut reader, header.shoff(), class.shdr_size() as u64)?;
        let section = AppendedSection::parse(class, &raw);
        let data = read_exact_at(&mut reader, section.offset, section.size)?;
        segments.insert(APPENDED_SLOT, Segment::appended(data));
    }

    Ok(DecodedImage { header, segments })
}

/// Open `path` and decode it as a boot image.
///
/// The file is closed before this returns, on success or failure.
///
/// # Errors
///
/// See [`decode`]. Failing to open the file is a [`DecodeError::Io`].
pub fn decode_file(path: impl AsRef<Path>) -> Result<DecodedImage, DecodeError> {
    let file = File::open(path)?;
    decode(BufReader::new(file))
}

#[cfg(test)]
#[expect(clippy::cast_possible_truncation, reason = "test fixtures")]
pub(crate) mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::error::FormatError;
    use crate::header::tests::{make_elf32_header, make_elf64_header, set_half};
    use crate::section::tests::encode_shdr;
    use crate::segment::tests::encode_phdr;

    /// Builds a complete boot image: file header, program headers, optional
    /// section header, then the segment data in order.
    pub(crate) struct ImageBuilder {
        class: ElfClass,
        segments: Vec<(u32, Vec<u8>)>,
        section: Option<Vec<u8>>,
    }

    impl ImageBuilder {
        pub(crate) fn new(class: ElfClass) -> Self {
            Self {
                class,
                segments: Vec::new(),
                section: None,
            }
        }

        pub(crate) fn segment(mut self, paddr: u32, data: &[u8]) -> Self {
            self.segments.push((paddr, data.to_vec()));
            self
        }

        pub(crate) fn section(mut self, data: &[u8]) -> Self {
            self.section = Some(data.to_vec());
            self
        }

        pub(crate) fn build(&self) -> Vec<u8> {
            let class = self.class;
            let mut buf = match class {
                ElfClass::Elf32 => make_elf32_header(),
                ElfClass::Elf64 => make_elf64_header(),
            };
            set_half(&mut buf, class, "e_phnum", self.segments.len() as u16);

            let phoff = class.header_size();
            let shoff = phoff + self.segments.len() * class.phdr_size();
            let mut data_off = shoff;
            if self.section.is_some() {
                set_half(&mut buf, class, "e_shnum", 1);
                match class {
                    ElfClass::Elf32 => buf[32..36].copy_from_slice(&(shoff as u32).to_le_bytes()),
                    ElfClass::Elf64 => buf[40..48].copy_from_slice(&(shoff as u64).to_le_bytes()),
                }
                data_off += class.shdr_size();
            }

            let mut blobs = Vec::new();
            for (paddr, data) in &self.segments {
                buf.extend(encode_phdr(
                    class,
                    (data_off + blobs.len()) as u64,
                    u64::from(*paddr),
                    data.len() as u64,
                ));
                blobs.extend_from_slice(data);
            }
            if let Some(section) = &self.section {
                buf.extend(encode_shdr(
                    class,
                    (data_off + blobs.len()) as u64,
                    section.len() as u64,
                ));
                blobs.extend_from_slice(section);
            }

            buf.extend(blobs);
            buf
        }
    }

    /// A typical image: kernel, ramdisk, and a short command line in the
    /// tags slot.
    pub(crate) fn sample_image(class: ElfClass) -> Vec<u8> {
        ImageBuilder::new(class)
            .segment(0x0020_8000, &[0xAA; 5000])
            .segment(0x0200_0000, &[0xBB; 6000])
            .segment(0x01E0_0000, b"console=ttyS0\nextra")
            .build()
    }

    fn decode_bytes(buf: Vec<u8>) -> Result<DecodedImage, DecodeError> {
        decode(Cursor::new(buf))
    }

    #[test]
    fn decode_elf32_image() {
        let image = decode_bytes(sample_image(ElfClass::Elf32)).expect("valid image");
        assert_eq!(image.header.class(), ElfClass::Elf32);
        assert_eq!(image.segments.len(), 3);

        let kernel = image.segments.get(0).expect("kernel");
        assert_eq!(kernel.payload(), &[0xAA; 5000][..]);
        assert_eq!(kernel.paddr(), Some(0x0020_8000));
        assert_eq!(image.segments.paddr(1), 0x0200_0000);
        assert_eq!(
            image.segments.get(2).expect("tags").payload(),
            b"console=ttyS0\nextra"
        );
        assert!(image.segments.get(APPENDED_SLOT).is_none());
    }

    #[test]
    fn both_classes_decode_identically() {
        let a = decode_bytes(sample_image(ElfClass::Elf32)).expect("elf32");
        let b = decode_bytes(sample_image(ElfClass::Elf64)).expect("elf64");
        assert_eq!(a.segments, b.segments);
        assert_eq!(b.header.class(), ElfClass::Elf64);
    }

    #[test]
    fn decoding_is_repeatable() {
        let buf = sample_image(ElfClass::Elf64);
        let a = decode_bytes(buf.clone()).expect("first");
        let b = decode_bytes(buf).expect("second");
        assert_eq!(a, b);
    }

    #[test]
    fn two_segments_leave_upper_slots_empty() {
        let buf = ImageBuilder::new(ElfClass::Elf32)
            .segment(0x8000, b"kernel")
            .segment(0x0100_0000, b"ramdisk")
            .build();
        let image = decode_bytes(buf).expect("valid image");
        assert_eq!(image.segments.len(), 2);
        assert!(image.segments.get(2).is_none());
        assert!(image.segments.get(3).is_none());
    }

    #[test]
    fn fourth_segment_fills_appended_slot() {
        let buf = ImageBuilder::new(ElfClass::Elf64)
            .segment(1, b"a")
            .segment(2, b"b")
            .segment(3, b"c")
            .segment(4, b"d")
            .build();
        let image = decode_bytes(buf).expect("valid image");
        let fourth = image.segments.get(APPENDED_SLOT).expect("fourth segment");
        assert_eq!(fourth.payload(), b"d");
        assert_eq!(fourth.paddr(), Some(4));
    }

    #[test]
    fn zero_length_segment_is_allowed() {
        for class in [ElfClass::Elf32, ElfClass::Elf64] {
            let buf = ImageBuilder::new(class)
                .segment(0x8000, b"kernel")
                .segment(0x0100_0000, b"")
                .build();
            let image = decode_bytes(buf).expect("valid image");
            let ramdisk = image.segments.get(1).expect("ramdisk slot");
            assert!(ramdisk.is_empty());
            assert_eq!(ramdisk.payload(), b"");
        }
    }

    #[test]
    fn appended_section_skips_sub_header() {
        for class in [ElfClass::Elf32, ElfClass::Elf64] {
            let buf = ImageBuilder::new(class)
                .segment(0x8000, b"kernel")
                .segment(0x0100_0000, b"ramdisk")
                .section(b"HDR12345root=/dev/mmcblk0p1")
                .build();
            let image = decode_bytes(buf).expect("valid image");
            let appended = image.segments.get(APPENDED_SLOT).expect("appended");
            assert_eq!(appended.payload(), b"root=/dev/mmcblk0p1");
            assert_eq!(appended.declared_len(), 27);
            assert_eq!(appended.paddr(), None);
            assert_eq!(image.segments.paddr(APPENDED_SLOT), 0);
        }
    }

    #[test]
    fn appended_section_replaces_fourth_segment() {
        let buf = ImageBuilder::new(ElfClass::Elf32)
            .segment(1, b"a")
            .segment(2, b"b")
            .segment(3, b"c")
            .segment(4, b"d")
            .section(b"12345678section")
            .build();
        let image = decode_bytes(buf).expect("valid image");
        let slot = image.segments.get(APPENDED_SLOT).expect("appended");
        assert_eq!(slot.payload(), b"section");
        assert_eq!(slot.paddr(), None);
    }

    #[test]
    fn short_appended_section_has_empty_payload() {
        let buf = ImageBuilder::new(ElfClass::Elf64)
            .segment(1, b"a")
            .segment(2, b"b")
            .section(b"1234")
            .build();
        let image = decode_bytes(buf).expect("valid image");
        let slot = image.segments.get(APPENDED_SLOT).expect("appended");
        assert_eq!(slot.declared_len(), 4);
        assert!(slot.payload().is_empty());
    }

    #[test]
    fn bad_magic_is_a_format_error() {
        let mut buf = sample_image(ElfClass::Elf32);
        buf[0] = 0x7e;
        let err = decode_bytes(buf).expect_err("bad magic");
        assert_eq!(err.format_error(), Some(FormatError::InvalidMagic));
    }

    #[test]
    fn tiny_file_is_invalid_magic() {
        let err = decode_bytes(vec![0x7f, b'E']).expect_err("too short");
        assert_eq!(err.format_error(), Some(FormatError::InvalidMagic));
        let err = decode_bytes(Vec::new()).expect_err("empty");
        assert_eq!(err.format_error(), Some(FormatError::InvalidMagic));
    }

    #[test]
    fn truncated_header_is_an_io_error() {
        let buf = sample_image(ElfClass::Elf64)[..20].to_vec();
        match decode_bytes(buf) {
            Err(DecodeError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("expected I/O error, got {other:?}"),
        }
    }

    #[test]
    fn truncated_segment_is_an_io_error() {
        let mut buf = sample_image(ElfClass::Elf32);
        buf.truncate(buf.len() - 4);
        match decode_bytes(buf) {
            Err(DecodeError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("expected I/O error, got {other:?}"),
        }
    }

    #[test]
    fn oversized_segment_fails_without_allocating() {
        let mut buf = ImageBuilder::new(ElfClass::Elf64)
            .segment(0x8000, b"kernel")
            .segment(0x0100_0000, b"ramdisk")
            .build();
        // p_filesz of the first program header
        let filesz = 64 + 32;
        buf[filesz..filesz + 8].copy_from_slice(&u64::MAX.to_le_bytes());
        let err = decode_bytes(buf).expect_err("oversized segment");
        assert!(!err.is_format());
    }

    #[test]
    fn segment_count_is_validated_before_reading() {
        let mut buf = sample_image(ElfClass::Elf32);
        set_half(&mut buf, ElfClass::Elf32, "e_phnum", 5);
        let err = decode_bytes(buf).expect_err("five segments");
        assert_eq!(
            err.format_error(),
            Some(FormatError::UnexpectedSegmentCount(5))
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = decode_file("/nonexistent/boot.elf").expect_err("missing file");
        assert!(matches!(err, DecodeError::Io(ref e) if e.kind() == io::ErrorKind::NotFound));
    }

    #[test]
    fn owned_iteration_keeps_slot_indices() {
        let image = decode_bytes(sample_image(ElfClass::Elf32)).expect("valid image");
        let indices: Vec<usize> = image.segments.into_segments().map(|(i, _)| i).collect();
        assert_eq!(indices, [0, 1, 2]);
    }
}
