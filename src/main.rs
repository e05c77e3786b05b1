//! Thai mark positioning for font assets.

use anyhow::Result;
use thaikern::core;

/// Run the command given on the command line.
fn run_app(cli_args: core::cli::CliArgs) -> Result<()> {
    core::run_app(cli_args)
}

fn main() {
    core::platform::init_panic_handling();
    let cli_args = core::platform::get_cli_args();
    match run_app(cli_args) {
        Ok(()) => {}
        Err(error) => core::platform::handle_error(error),
    }
}
