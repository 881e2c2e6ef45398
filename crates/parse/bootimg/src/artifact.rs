//! The files and summary lines produced for a classified image.
//!
//! [`BootImage::artifacts`] lays out everything the caller writes, in the
//! order it is written: base, then each slot (command line, or payload and
//! offset), then page size.

use crate::classify::BootImage;
use crate::slot::SlotKind;

/// What an artifact file contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contents<'a> {
    /// Raw segment bytes, written as-is.
    Binary(&'a [u8]),
    /// A metadata value, written followed by a newline.
    Text(String),
    /// Raw bytes taken from the image, written followed by a newline.
    Line(&'a [u8]),
}

/// One output file, plus the summary line describing it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact<'a> {
    /// Suffix of the output file name (`<image>-<key>`).
    pub key: String,
    /// File contents.
    pub contents: Contents<'a>,
    /// `BOARD_*="value"` line for the summary.
    pub summary: Option<String>,
}

impl<'a> Artifact<'a> {
    fn binary(key: &str, data: &'a [u8]) -> Self {
        Self {
            key: key.to_owned(),
            contents: Contents::Binary(data),
            summary: None,
        }
    }

    fn text(key: &str, board: &str, value: String) -> Self {
        Self {
            key: key.to_owned(),
            summary: Some(format!("BOARD_{board}=\"{value}\"")),
            contents: Contents::Text(value),
        }
    }

    fn line(key: &str, board: &str, data: &'a [u8]) -> Self {
        Self {
            key: key.to_owned(),
            contents: Contents::Line(data),
            summary: Some(format!(
                "BOARD_{board}=\"{}\"",
                String::from_utf8_lossy(data)
            )),
        }
    }
}

/// File name suffixes for the payload slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    /// Suffix for the kernel payload.
    pub kernel: String,
    /// Suffix for the ramdisk payload.
    pub ramdisk: String,
    /// Suffix for the tags payload.
    pub dt: String,
    /// Suffix for the appended payload.
    pub appended: String,
}

impl Default for ArtifactNames {
    fn default() -> Self {
        Self {
            kernel: SlotKind::Kernel.default_file_name().into(),
            ramdisk: SlotKind::Ramdisk.default_file_name().into(),
            dt: SlotKind::Tags.default_file_name().into(),
            appended: SlotKind::Appended.default_file_name().into(),
        }
    }
}

impl ArtifactNames {
    /// Suffix for the payload of `slot`.
    #[must_use]
    pub fn file_name(&self, slot: SlotKind) -> &str {
        match slot {
            SlotKind::Kernel => &self.kernel,
            SlotKind::Ramdisk => &self.ramdisk,
            SlotKind::Tags => &self.dt,
            SlotKind::Appended => &self.appended,
        }
    }
}

/// Format an address or offset the way boot image tools expect.
#[must_use]
pub fn hex(value: u32) -> String {
    format!("{value:#010x}")
}

impl BootImage {
    /// Every artifact for this image, in output order.
    #[must_use]
    pub fn artifacts(&self, names: &ArtifactNames) -> Vec<Artifact<'_>> {
        let meta = &self.metadata;
        let mut out = vec![Artifact::text("base", "KERNEL_BASE", hex(meta.base))];

        for slot in SlotKind::ALL {
            if let Some(cmdline) = meta.cmdline.as_ref().filter(|c| c.slot == slot) {
                out.push(Artifact::line("cmdline", "KERNEL_CMDLINE", &cmdline.bytes));
                continue;
            }

            let Some(payload) = self.payload(slot) else {
                continue;
            };
            out.push(Artifact::binary(
                names.file_name(slot),
                payload.segment.payload(),
            ));
            if let Some(offset) = meta.offset(slot) {
                out.push(Artifact::text(
                    slot.offset_key(),
                    &format!("{}_OFFSET", slot.label()),
                    hex(offset),
                ));
            }
        }

        out.push(Artifact::text(
            "pagesize",
            "PAGE_SIZE",
            meta.page_size.to_string(),
        ));
        out
    }
}
