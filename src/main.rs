//! medstock - Local-first medication inventory

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = medstock::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
