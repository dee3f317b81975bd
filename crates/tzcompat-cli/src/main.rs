//! Binary entrypoint for the tzcompat CLI.
use std::process::ExitCode;

fn main() -> ExitCode {
    match tzcompat_cli::run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(2)
        }
    }
}
