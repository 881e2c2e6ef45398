//! ARM ELF boot image unpacker.
//!
//! Splits an ELF-packaged boot image into its kernel, ramdisk, and tags,
//! and recovers the boot parameters needed to repack it: base address,
//! load offsets, command line, and page size.
//!
//! Pipeline: decode ELF → classify segments → write artifacts → print summary.

mod cli;
mod output;
mod report;
mod verbose;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use unpackelf_bootimg::BootImage;

use verbose::{Timer, deprintln};

/// Exit status for command-line usage errors.
const EXIT_USAGE: u8 = 200;

/// Exit status for decode and I/O failures.
const EXIT_FAILURE: u8 = 1;

fn main() -> ExitCode {
    let cli = match cli::Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // The exit status still reports the failure if the terminal is gone.
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    verbose::init(cli.quiet, cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            deprintln!("error: {e:#}\n");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// Unpack the image named on the command line.
fn run(cli: &cli::Cli) -> Result<()> {
    let image_name = cli
        .input
        .file_name()
        .with_context(|| format!("{} does not name a file", cli.input.display()))?
        .to_string_lossy()
        .into_owned();

    let decoded = {
        let _t = Timer::start("decode");
        unpackelf_elf::decode_file(&cli.input)
            .with_context(|| format!("Could not unpack kernel image {}", cli.input.display()))?
    };
    report::print_image_details(&decoded.header, &decoded.segments);

    let image = BootImage::classify(decoded.segments);
    let artifacts = image.artifacts(&cli.artifact_names());

    if !cli.header_only {
        let _t = Timer::start("write");
        output::write_artifacts(&cli.output, &image_name, &artifacts)?;
    }

    report::print_summary(&image.metadata, &artifacts, cli.json)
}
