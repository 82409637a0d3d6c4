//! appship - build, sign, notarize, package and publish macOS apps.

use appship::cli;
use std::process;

fn main() {
    let args = cli::Args::parse_args();
    cli::init_logging(&args);
    cli::install_interrupt_handler();

    let exit_code = match cli::run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            for hint in e.recovery_suggestions() {
                eprintln!("  hint: {}", hint);
            }
            e.exit_code()
        }
    };

    process::exit(exit_code);
}
