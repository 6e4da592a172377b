use std::io::{self, BufRead};

use crate::cli::output::{SEPARATOR, print_response};
use crate::ops::session::Session;

/// Read-eval-print loop over stdin. Each line goes through
/// [`Session::handle`]; the loop ends on `bye` or end of input.
pub fn run_repl(session: &mut Session, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !json {
        greet();
    }
    for line in io::stdin().lock().lines() {
        let line = line?;
        let response = session.handle(&line);
        print_response(&response, json)?;
        if response.exit {
            break;
        }
    }
    Ok(())
}

fn greet() {
    println!("{SEPARATOR}");
    println!(" Hello! I'm Herald.");
    println!(" What can I do for you?");
    println!("{SEPARATOR}");
}
