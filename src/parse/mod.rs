pub mod command;

pub use command::{Command, CommandError, parse_command, split_input};
