//! Names for the four segment slots of a boot image.

use serde::Serialize;

/// What a segment slot holds, by position in the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    /// Slot 0: the kernel.
    Kernel,
    /// Slot 1: the ramdisk.
    Ramdisk,
    /// Slot 2: the tags / device tree.
    Tags,
    /// Slot 3: the appended section, or a fourth program segment.
    Appended,
}

impl SlotKind {
    /// All slots in index order.
    pub const ALL: [Self; 4] = [Self::Kernel, Self::Ramdisk, Self::Tags, Self::Appended];

    /// The slot at `index`, if there is one.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Index of this slot in a `SegmentSet`.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// File name suffix used when nothing overrides it.
    #[must_use]
    pub const fn default_file_name(self) -> &'static str {
        match self {
            Self::Kernel => "kernel",
            Self::Ramdisk => "ramdisk",
            Self::Tags => "dt",
            Self::Appended => "appended",
        }
    }

    /// Key of the artifact holding this slot's load offset.
    #[must_use]
    pub const fn offset_key(self) -> &'static str {
        match self {
            Self::Kernel => "kernel_offset",
            Self::Ramdisk => "ramdisk_offset",
            Self::Tags => "tags_offset",
            Self::Appended => "appended_offset",
        }
    }

    /// Upper-case name used in `BOARD_*` summary lines.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Kernel => "KERNEL",
            Self::Ramdisk => "RAMDISK",
            Self::Tags => "TAGS",
            Self::Appended => "APPENDED",
        }
    }
}
