//! Boot image classification.
//!
//! Takes the segments decoded by [`unpackelf_elf`] and works out what the
//! ELF container does not say explicitly: the base address, which segment
//! is the kernel command line, and each payload's offset from the base.
//!
//! # Usage
//!
//! ```no_run
//! use unpackelf_bootimg::{ArtifactNames, BootImage};
//!
//! let decoded = unpackelf_elf::decode_file("boot.elf").expect("valid boot image");
//! let image = BootImage::classify(decoded.segments);
//! for artifact in image.artifacts(&ArtifactNames::default()) {
//!     if let Some(line) = &artifact.summary {
//!         println!("{line}");
//!     }
//! }
//! ```

#![forbid(unsafe_code)]

pub mod artifact;
pub mod classify;
pub mod slot;

pub use artifact::{Artifact, ArtifactNames, Contents, hex};
pub use classify::{
    BootImage, BootMetadata, CMDLINE_MAX_LEN, Cmdline, HIGH_RAMDISK_THRESHOLD, KERNEL_BASE_OFFSET,
    PAGE_SIZE, Payload, SlotOffset, cmdline_bytes, infer_base, normalized_offset,
};
pub use slot::SlotKind;
