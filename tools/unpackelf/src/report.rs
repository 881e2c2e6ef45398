//! Printing decoded image details and the boot parameter summary.

use anyhow::{Context, Result};
use unpackelf_bootimg::{Artifact, BootMetadata, hex};
use unpackelf_elf::{ImageHeader, SegmentSet};

use crate::verbose::{dprintln, vprintln};

/// Print header and segment details (verbose mode only).
pub fn print_image_details(header: &ImageHeader, segments: &SegmentSet) {
    vprintln!(
        "{:?}: entry {:#x}, {} program headers at {:#x}, {} section headers at {:#x}",
        header.class(),
        header.entry(),
        header.phnum(),
        header.phoff(),
        header.shnum(),
        header.shoff(),
    );
    for (slot, segment) in segments.iter() {
        let paddr = segment.paddr().map_or_else(|| "-".to_owned(), hex);
        vprintln!(
            "  slot {slot}: paddr {paddr}, {} bytes declared, {} bytes payload",
            segment.declared_len(),
            segment.payload().len(),
        );
    }
}

/// The `BOARD_*` lines for `artifacts`, in output order.
pub fn summary_lines<'a>(artifacts: &'a [Artifact<'_>]) -> impl Iterator<Item = &'a str> {
    artifacts.iter().filter_map(|a| a.summary.as_deref())
}

/// Print the boot parameters, as `BOARD_*` lines or as JSON.
///
/// Nothing is printed in quiet mode.
pub fn print_summary(metadata: &BootMetadata, artifacts: &[Artifact<'_>], json: bool) -> Result<()> {
    if json {
        let text =
            serde_json::to_string_pretty(metadata).context("serializing boot parameters")?;
        dprintln!("{text}");
    } else {
        for line in summary_lines(artifacts) {
            dprintln!("{line}");
        }
    }
    Ok(())
}
