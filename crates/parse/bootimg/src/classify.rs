//! Deriving boot metadata from decoded segments.
//!
//! The ELF container carries no record of the board's base address, which
//! segment holds the command line, or the flash page size. These are
//! recovered heuristically from segment addresses and sizes.

use std::borrow::Cow;

use serde::{Serialize, Serializer};
use unpackelf_elf::{Segment, SegmentSet};

use crate::slot::SlotKind;

/// Flash page size. The ELF container has no field for it.
pub const PAGE_SIZE: u32 = 4096;

/// Longest segment that is taken to be a command line.
pub const CMDLINE_MAX_LEN: usize = 4096;

/// Ramdisk addresses above this imply a non-zero base.
pub const HIGH_RAMDISK_THRESHOLD: u32 = 0x1000_0000;

/// Distance from the base to the kernel load address.
pub const KERNEL_BASE_OFFSET: u32 = 0x8000;

/// Serialize a `u32` as `0x%08x`.
fn hex_u32<S: Serializer>(value: &u32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{value:#010x}"))
}

/// Serialize bytes as a string, replacing invalid UTF-8.
fn lossy_str<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}

/// The command line found in one of the segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cmdline {
    /// Slot the command line was read from.
    pub slot: SlotKind,
    /// Command line bytes, up to the first newline or NUL.
    #[serde(rename = "text", serialize_with = "lossy_str")]
    pub bytes: Vec<u8>,
}

impl Cmdline {
    /// The command line as text, with invalid UTF-8 replaced.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

/// Load offset of one payload, relative to the base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotOffset {
    /// Slot the payload came from.
    pub slot: SlotKind,
    /// `paddr - base`, wrapping.
    #[serde(serialize_with = "hex_u32")]
    pub offset: u32,
}

/// Boot parameters recovered from an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootMetadata {
    /// Inferred base address.
    #[serde(serialize_with = "hex_u32")]
    pub base: u32,
    /// The command line, if a segment was small enough to be one.
    pub cmdline: Option<Cmdline>,
    /// Offsets of the payloads that have a load address, in slot order.
    pub offsets: Vec<SlotOffset>,
    /// Flash page size, always [`PAGE_SIZE`].
    pub page_size: u32,
}

impl BootMetadata {
    /// Load offset of `slot`, if it is a payload with an address.
    #[must_use]
    pub fn offset(&self, slot: SlotKind) -> Option<u32> {
        self.offsets
            .iter()
            .find(|o| o.slot == slot)
            .map(|o| o.offset)
    }
}

/// A segment that is written out as a binary file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Slot the segment came from.
    pub slot: SlotKind,
    /// The decoded segment.
    pub segment: Segment,
}

/// A classified boot image: its metadata and the payloads to extract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootImage {
    /// Recovered boot parameters.
    pub metadata: BootMetadata,
    /// Non-empty segments other than the command line, in slot order.
    pub payloads: Vec<Payload>,
}

/// Infer the base address from the kernel and ramdisk addresses.
///
/// Images with the ramdisk above [`HIGH_RAMDISK_THRESHOLD`] are assumed to
/// load the kernel [`KERNEL_BASE_OFFSET`] bytes above the base; all others
/// use a base of zero.
#[must_use]
pub fn infer_base(segments: &SegmentSet) -> u32 {
    if segments.paddr(SlotKind::Ramdisk.index()) > HIGH_RAMDISK_THRESHOLD {
        segments
            .paddr(SlotKind::Kernel.index())
            .wrapping_sub(KERNEL_BASE_OFFSET)
    } else {
        0
    }
}

/// Offset of a load address from the base, wrapping on underflow.
#[must_use]
pub const fn normalized_offset(paddr: u32, base: u32) -> u32 {
    paddr.wrapping_sub(base)
}

/// The command line held in a segment payload.
///
/// The command line ends at the first newline or NUL byte. Other bytes are
/// kept as they are, whether or not they are valid UTF-8.
#[must_use]
pub fn cmdline_bytes(payload: &[u8]) -> &[u8] {
    let end = payload
        .iter()
        .position(|&b| b == b'\n' || b == 0)
        .unwrap_or(payload.len());
    &payload[..end]
}

impl BootImage {
    /// Classify decoded segments into metadata and payloads.
    ///
    /// Slots are visited in index order and empty slots are skipped. The
    /// first slot declaring at most [`CMDLINE_MAX_LEN`] bytes is taken as
    /// the command line, whichever slot that is; every later slot is a
    /// payload regardless of size.
    #[must_use]
    pub fn classify(segments: SegmentSet) -> Self {
        let base = infer_base(&segments);

        let mut cmdline = None;
        let mut offsets = Vec::new();
        let mut payloads = Vec::new();

        for (index, segment) in segments.into_segments() {
            let Some(slot) = SlotKind::from_index(index) else {
                continue;
            };
            if segment.is_empty() {
                continue;
            }

            if cmdline.is_none() && segment.declared_len() <= CMDLINE_MAX_LEN {
                cmdline = Some(Cmdline {
                    slot,
                    bytes: cmdline_bytes(segment.payload()).to_vec(),
                });
                continue;
            }

            if let Some(paddr) = segment.paddr() {
                offsets.push(SlotOffset {
                    slot,
                    offset: normalized_offset(paddr, base),
                });
            }
            payloads.push(Payload { slot, segment });
        }

        Self {
            metadata: BootMetadata {
                base,
                cmdline,
                offsets,
                page_size: PAGE_SIZE,
            },
            payloads,
        }
    }

    /// The payload extracted from `slot`, if any.
    #[must_use]
    pub fn payload(&self, slot: SlotKind) -> Option<&Payload> {
        self.payloads.iter().find(|p| p.slot == slot)
    }
}
