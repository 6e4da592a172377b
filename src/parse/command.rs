use chrono::NaiveDateTime;

use crate::model::task::INPUT_TIME_FORMAT;

/// Error type for command parsing and dispatch. Every variant renders as the
/// full user-facing message; the `OOPS!!!` prefix is the error marker front
/// ends key off.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("OOPS!!! You entered an empty command.")]
    EmptyCommand,
    #[error("OOPS!!! I'm sorry, but I don't know what that means :-(")]
    UnknownCommand(String),
    #[error("OOPS!!! {0}")]
    MissingArgument(String),
    #[error("OOPS!!! Task number must be an integer.")]
    NotAnInteger(String),
    #[error("OOPS!!! Task number is out of range.")]
    IndexOutOfRange { index: i64, len: usize },
    #[error("OOPS!!! {0}")]
    MalformedTaskSpec(String),
}

/// A fully validated user action. Task numbers are kept 1-based as typed;
/// bounds are checked at dispatch, where the collection size is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Bye,
    List,
    Todo(String),
    Deadline {
        description: String,
        by: NaiveDateTime,
    },
    Event {
        description: String,
        from: NaiveDateTime,
        to: NaiveDateTime,
    },
    Mark(i64),
    Unmark(i64),
    Delete(i64),
    Find(String),
    Remind,
}

/// Split raw input into a command keyword and an optional argument string.
///
/// The input is trimmed first; the split is on the first whitespace run, and
/// the argument keeps its internal whitespace untouched.
pub fn split_input(input: &str) -> Result<(&str, Option<&str>), CommandError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CommandError::EmptyCommand);
    }
    match trimmed.split_once(char::is_whitespace) {
        Some((keyword, rest)) => {
            let rest = rest.trim_start();
            if rest.is_empty() {
                Ok((keyword, None))
            } else {
                Ok((keyword, Some(rest)))
            }
        }
        None => Ok((trimmed, None)),
    }
}

/// Parse one raw input line into a typed [`Command`].
pub fn parse_command(input: &str) -> Result<Command, CommandError> {
    let (keyword, argument) = split_input(input)?;

    match keyword {
        "bye" => Ok(Command::Bye),
        "list" => Ok(Command::List),
        "remind" => Ok(Command::Remind),
        "todo" => {
            let description = require_text(argument, "The description of a todo cannot be empty.")?;
            Ok(Command::Todo(description.to_string()))
        }
        "deadline" => parse_deadline(argument),
        "event" => parse_event(argument),
        "mark" => Ok(Command::Mark(parse_task_number(argument, "mark")?)),
        "unmark" => Ok(Command::Unmark(parse_task_number(argument, "unmark")?)),
        "delete" => Ok(Command::Delete(parse_task_number(argument, "delete")?)),
        "find" => {
            let keyword = require_text(argument, "Please specify a keyword to find.")?;
            Ok(Command::Find(keyword.to_string()))
        }
        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

/// Non-blank argument text, or `MissingArgument` with the given message.
fn require_text<'a>(argument: Option<&'a str>, message: &str) -> Result<&'a str, CommandError> {
    match argument {
        Some(text) if !text.trim().is_empty() => Ok(text.trim()),
        _ => Err(CommandError::MissingArgument(message.to_string())),
    }
}

fn parse_task_number(argument: Option<&str>, verb: &str) -> Result<i64, CommandError> {
    let text = require_text(
        argument,
        &format!("Please specify the task number to {verb}."),
    )?;
    text.parse::<i64>()
        .map_err(|_| CommandError::NotAnInteger(text.to_string()))
}

fn parse_time(text: &str) -> Result<NaiveDateTime, CommandError> {
    NaiveDateTime::parse_from_str(text, INPUT_TIME_FORMAT).map_err(|_| {
        CommandError::MalformedTaskSpec(format!(
            "Could not read the date '{text}' (expected d/m/yyyy HHmm, e.g. 2/9/2025 1800)."
        ))
    })
}

fn parse_deadline(argument: Option<&str>) -> Result<Command, CommandError> {
    let text = require_text(
        argument,
        "The deadline command must include a description and /by.",
    )?;
    let Some((description, by_text)) = text.split_once(" /by ") else {
        return Err(CommandError::MalformedTaskSpec(
            "The deadline command must include a description and /by.".to_string(),
        ));
    };
    let description = description.trim();
    let by_text = by_text.trim();
    if description.is_empty() {
        return Err(CommandError::MalformedTaskSpec(
            "The description of a deadline cannot be empty.".to_string(),
        ));
    }
    if by_text.is_empty() {
        return Err(CommandError::MalformedTaskSpec(
            "The deadline command must include a date after /by.".to_string(),
        ));
    }
    Ok(Command::Deadline {
        description: description.to_string(),
        by: parse_time(by_text)?,
    })
}

fn parse_event(argument: Option<&str>) -> Result<Command, CommandError> {
    let text = require_text(argument, "The event command must include /from and /to.")?;
    let malformed =
        || CommandError::MalformedTaskSpec("The event command must include /from and /to.".to_string());

    let (description, rest) = text.split_once(" /from ").ok_or_else(malformed)?;
    let (from_text, to_text) = rest.split_once(" /to ").ok_or_else(malformed)?;

    let description = description.trim();
    let from_text = from_text.trim();
    let to_text = to_text.trim();
    if description.is_empty() {
        return Err(CommandError::MalformedTaskSpec(
            "The description of an event cannot be empty.".to_string(),
        ));
    }
    if from_text.is_empty() || to_text.is_empty() {
        return Err(malformed());
    }
    Ok(Command::Event {
        description: description.to_string(),
        from: parse_time(from_text)?,
        to: parse_time(to_text)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_blank_input_is_empty_command() {
        assert_eq!(split_input("   "), Err(CommandError::EmptyCommand));
        assert_eq!(split_input(""), Err(CommandError::EmptyCommand));
    }

    #[test]
    fn test_split_bare_keyword_has_no_argument() {
        assert_eq!(split_input("list"), Ok(("list", None)));
        assert_eq!(split_input("  list  "), Ok(("list", None)));
    }

    #[test]
    fn test_split_keeps_internal_whitespace_in_argument() {
        assert_eq!(
            split_input("todo buy  two   apples"),
            Ok(("todo", Some("buy  two   apples")))
        );
    }

    #[test]
    fn test_todo_with_trailing_blanks_is_missing_argument() {
        assert!(matches!(
            parse_command("todo   "),
            Err(CommandError::MissingArgument(_))
        ));
    }

    #[test]
    fn test_todo_parses_description() {
        assert_eq!(
            parse_command("todo Finish homework"),
            Ok(Command::Todo("Finish homework".to_string()))
        );
    }

    #[test]
    fn test_unknown_keyword() {
        assert!(matches!(
            parse_command("blargh now"),
            Err(CommandError::UnknownCommand(_))
        ));
    }

    #[test]
    fn test_mark_requires_integer() {
        assert_eq!(parse_command("mark 3"), Ok(Command::Mark(3)));
        assert!(matches!(
            parse_command("mark three"),
            Err(CommandError::NotAnInteger(_))
        ));
        assert!(matches!(
            parse_command("mark"),
            Err(CommandError::MissingArgument(_))
        ));
    }

    #[test]
    fn test_negative_task_number_parses_as_integer() {
        // Bounds are the dispatcher's job; -1 is still an integer here.
        assert_eq!(parse_command("delete -1"), Ok(Command::Delete(-1)));
    }

    #[test]
    fn test_deadline_happy_path() {
        let cmd = parse_command("deadline Submit report /by 2/9/2025 1800").unwrap();
        match cmd {
            Command::Deadline { description, by } => {
                assert_eq!(description, "Submit report");
                assert_eq!(by.format("%Y-%m-%d %H:%M").to_string(), "2025-09-02 18:00");
            }
            other => panic!("expected deadline, got {other:?}"),
        }
    }

    #[test]
    fn test_deadline_without_by_is_malformed() {
        assert!(matches!(
            parse_command("deadline Submit report"),
            Err(CommandError::MalformedTaskSpec(_))
        ));
    }

    #[test]
    fn test_deadline_with_blank_description_is_malformed() {
        assert!(matches!(
            parse_command("deadline   /by 2/9/2025 1800"),
            Err(CommandError::MalformedTaskSpec(_))
        ));
    }

    #[test]
    fn test_deadline_with_bad_date_is_malformed() {
        assert!(matches!(
            parse_command("deadline Submit report /by tomorrow"),
            Err(CommandError::MalformedTaskSpec(_))
        ));
    }

    #[test]
    fn test_event_happy_path() {
        let cmd = parse_command("event Town hall /from 3/9/2025 0900 /to 3/9/2025 1030").unwrap();
        match cmd {
            Command::Event {
                description,
                from,
                to,
            } => {
                assert_eq!(description, "Town hall");
                assert!(from < to);
            }
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[test]
    fn test_event_missing_to_is_malformed() {
        assert!(matches!(
            parse_command("event Town hall /from 3/9/2025 0900"),
            Err(CommandError::MalformedTaskSpec(_))
        ));
    }

    #[test]
    fn test_event_with_inverted_range_is_accepted() {
        // from/to ordering is deliberately not validated.
        let cmd = parse_command("event Time travel /from 3/9/2025 1700 /to 3/9/2025 0900").unwrap();
        match cmd {
            Command::Event { from, to, .. } => assert!(from > to),
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[test]
    fn test_find_requires_keyword() {
        assert_eq!(
            parse_command("find book"),
            Ok(Command::Find("book".to_string()))
        );
        assert!(matches!(
            parse_command("find  "),
            Err(CommandError::MissingArgument(_))
        ));
    }

    #[test]
    fn test_error_messages_carry_the_marker() {
        let err = parse_command("   ").unwrap_err();
        assert!(err.to_string().starts_with("OOPS!!!"));
        let err = parse_command("what").unwrap_err();
        assert!(err.to_string().starts_with("OOPS!!!"));
    }
}
