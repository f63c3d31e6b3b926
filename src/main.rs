//! spack - Command-line tool for building and parsing self-describing sprite sheets

use std::process::ExitCode;

use spritepack::cli;

fn main() -> ExitCode {
    cli::run()
}
