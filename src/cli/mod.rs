pub mod commands;
pub mod output;
pub mod repl;

pub use commands::Cli;

use crate::ops::session::Session;

/// Entry point shared by the binary: open the session, then either run one
/// command (`-c`) or the interactive loop.
pub fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open(&cli.data_file);
    match cli.command {
        Some(text) => {
            let response = session.handle(&text);
            output::print_response(&response, cli.json)?;
            Ok(())
        }
        None => {
            repl::run_repl(&mut session, cli.json)?;
            Ok(())
        }
    }
}
