//! Command-line interface definitions for unpackelf.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use unpackelf_bootimg::ArtifactNames;

/// Extract the kernel, ramdisk, tags, and boot parameters from an ARM ELF
/// boot image.
///
/// Output files are named `<output>/<image>-<part>`.
#[derive(Parser)]
#[command(name = "unpackelf", version, about, disable_help_flag = true)]
pub struct Cli {
    /// ELF boot image to unpack.
    #[arg(short = 'i', long, value_name = "IMAGE")]
    pub input: PathBuf,

    /// Directory to write extracted files into.
    #[arg(short = 'o', long, value_name = "DIR", default_value = "./")]
    pub output: PathBuf,

    /// File name suffix for the kernel.
    #[arg(short = 'k', long, value_name = "NAME", default_value = "kernel")]
    pub kernel: String,

    /// File name suffix for the ramdisk.
    #[arg(short = 'r', long, value_name = "NAME", default_value = "ramdisk")]
    pub ramdisk: String,

    /// File name suffix for the device tree / tags.
    #[arg(short = 'd', long, value_name = "NAME", default_value = "dt")]
    pub dt: String,

    /// Print the boot parameters without writing any files.
    #[arg(short = 'h', long)]
    pub header_only: bool,

    /// Write files without printing anything, errors included.
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Also print header and segment details and timings.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Print the boot parameters as JSON instead of `BOARD_*` lines.
    #[arg(long, conflicts_with = "verbose")]
    pub json: bool,

    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

impl Cli {
    /// Output file name suffixes selected on the command line.
    pub fn artifact_names(&self) -> ArtifactNames {
        ArtifactNames {
            kernel: self.kernel.clone(),
            ramdisk: self.ramdisk.clone(),
            dt: self.dt.clone(),
            ..ArtifactNames::default()
        }
    }
}
