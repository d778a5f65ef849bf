//! Binary entrypoint for the content API server.

use std::process::ExitCode;

use contentwork::startup;

fn main() -> ExitCode {
    startup::run()
}
