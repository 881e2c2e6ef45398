//! ELF decoder for ARM boot images.
//!
//! Boot images pack a kernel, ramdisk, and tags blob into the program
//! segments of an ELF32 or ELF64 executable, optionally followed by a single
//! section carrying the kernel command line. This crate validates the
//! headers and reads each segment into an owned buffer.
//!
//! # Usage
//!
//! ```no_run
//! use unpackelf_elf::decode_file;
//!
//! let image = decode_file("boot.elf").expect("valid boot image");
//! for (slot, seg) in image.segments.iter() {
//!     println!("slot {slot}: {} bytes at {:?}", seg.payload().len(), seg.paddr());
//! }
//! ```

#![forbid(unsafe_code)]

pub mod decode;
pub mod error;
pub mod header;
pub mod section;
pub mod segment;

pub use decode::{APPENDED_SLOT, DecodedImage, SLOT_COUNT, Segment, SegmentSet, decode, decode_file};
pub use error::{DecodeError, FormatError};
pub use header::{Elf32Header, Elf64Header, ElfClass, ImageHeader};
pub use section::{AppendedSection, Elf32SectionHeader, Elf64SectionHeader};
pub use segment::{Elf32ProgramHeader, Elf64ProgramHeader, ProgramSegment};
