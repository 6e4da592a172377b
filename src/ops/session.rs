use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};

use crate::io::store::Store;
use crate::model::task::{DISPLAY_TIME_FORMAT, Task, TaskKind};
use crate::model::tasklist::TaskList;
use crate::parse::command::{Command, CommandError, parse_command};

/// One response block handed back to a front end. `error` is a presentation
/// hint (the text already carries the `OOPS!!!` marker); `exit` is set only
/// by `bye`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub text: String,
    pub error: bool,
    pub exit: bool,
}

impl Response {
    fn reply(text: impl Into<String>) -> Self {
        Response {
            text: text.into(),
            error: false,
            exit: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Response {
            text: text.into(),
            error: true,
            exit: false,
        }
    }
}

/// A single-user session: the in-memory task list plus its backing store.
///
/// Commands are handled one at a time, to completion; every successful
/// mutation saves the full list before the response is returned.
pub struct Session {
    tasks: TaskList,
    store: Store,
}

impl Session {
    /// Open a session against the given storage file. A load failure is
    /// reported on stderr and the session starts empty; from then on the
    /// in-memory list is authoritative.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let store = Store::new(path);
        let tasks = match store.load() {
            Ok(tasks) => tasks,
            Err(e) => {
                eprintln!("warning: could not load tasks: {e}");
                Vec::new()
            }
        };
        Session {
            tasks: TaskList::from_tasks(tasks),
            store,
        }
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    /// Handle one raw input line: parse, apply, persist if it mutated.
    /// Taxonomy errors come back as error responses; nothing here ends the
    /// process except `bye` setting `exit`.
    pub fn handle(&mut self, input: &str) -> Response {
        match parse_command(input) {
            Ok(command) => self.apply(command),
            Err(e) => Response::error(e.to_string()),
        }
    }

    fn apply(&mut self, command: Command) -> Response {
        match command {
            Command::Bye => Response {
                text: "Bye. Hope to see you again soon!".to_string(),
                error: false,
                exit: true,
            },
            Command::List => Response::reply(render_numbered(
                "Here are the tasks in your list:",
                self.tasks.iter(),
            )),
            Command::Todo(description) => self.add_task(Task::todo(description)),
            Command::Deadline { description, by } => {
                self.add_task(Task::deadline(description, by))
            }
            Command::Event {
                description,
                from,
                to,
            } => self.add_task(Task::event(description, from, to)),
            Command::Mark(number) => self.set_done(number, true),
            Command::Unmark(number) => self.set_done(number, false),
            Command::Delete(number) => self.delete_task(number),
            Command::Find(keyword) => {
                let matches = self.tasks.find(&keyword);
                if matches.is_empty() {
                    Response::reply("No matching tasks found.")
                } else {
                    Response::reply(render_numbered(
                        "Here are the matching tasks in your list:",
                        matches.into_iter(),
                    ))
                }
            }
            Command::Remind => Response::reply(self.remind_text(Local::now().naive_local())),
        }
    }

    fn add_task(&mut self, task: Task) -> Response {
        let rendered = task.to_string();
        self.tasks.add(task);
        let response = Response::reply(format!(
            "Got it. I've added this task:\n  {rendered}\n{}",
            count_line(self.tasks.len())
        ));
        self.saved(response)
    }

    fn set_done(&mut self, number: i64, done: bool) -> Response {
        let index = match self.resolve_index(number) {
            Ok(index) => index,
            Err(e) => return Response::error(e.to_string()),
        };
        let len = self.tasks.len();
        let Some(task) = self.tasks.get_mut(index) else {
            // resolve_index already bounds-checked
            return Response::error(
                CommandError::IndexOutOfRange { index: number, len }.to_string(),
            );
        };
        let header = if done {
            task.mark_done();
            "Nice! I've marked this task as done:"
        } else {
            task.mark_not_done();
            "OK, I've marked this task as not done yet:"
        };
        let rendered = task.to_string();
        let response = Response::reply(format!("{header}\n  {rendered}"));
        self.saved(response)
    }

    fn delete_task(&mut self, number: i64) -> Response {
        let index = match self.resolve_index(number) {
            Ok(index) => index,
            Err(e) => return Response::error(e.to_string()),
        };
        let removed = self.tasks.delete(index);
        let response = Response::reply(format!(
            "Noted. I've removed this task:\n  {removed}\n{}",
            count_line(self.tasks.len())
        ));
        self.saved(response)
    }

    /// Convert a user-typed 1-based task number into an internal index.
    fn resolve_index(&self, number: i64) -> Result<usize, CommandError> {
        if number >= 1 && (number as usize) <= self.tasks.len() {
            Ok(number as usize - 1)
        } else {
            Err(CommandError::IndexOutOfRange {
                index: number,
                len: self.tasks.len(),
            })
        }
    }

    /// The next task with a time strictly after `now` (a deadline's `by`, or
    /// an event's `to`), earliest first.
    fn next_upcoming(&self, now: NaiveDateTime) -> Option<(&Task, NaiveDateTime)> {
        self.tasks
            .iter()
            .filter_map(|task| match &task.kind {
                TaskKind::Todo => None,
                TaskKind::Deadline { by } => Some((task, *by)),
                TaskKind::Event { to, .. } => Some((task, *to)),
            })
            .filter(|(_, when)| *when > now)
            .min_by_key(|(_, when)| *when)
    }

    /// Text for the `remind` command, relative to `now`.
    pub fn remind_text(&self, now: NaiveDateTime) -> String {
        match self.next_upcoming(now) {
            None => "You have no upcoming tasks!".to_string(),
            Some((task, when)) => {
                let when = when.format(DISPLAY_TIME_FORMAT);
                match &task.kind {
                    TaskKind::Deadline { .. } => {
                        format!("Next deadline: {} by {when}", task.description)
                    }
                    _ => format!("Next event: {} ends by {when}", task.description),
                }
            }
        }
    }

    /// Persist after a successful mutation. A failed save is reported (log
    /// line plus a warning appended to the response) but the in-memory
    /// mutation stands.
    fn saved(&self, mut response: Response) -> Response {
        if let Err(e) = self.store.save(self.tasks.as_slice()) {
            eprintln!("error: could not save tasks: {e}");
            response
                .text
                .push_str(&format!("\n(Warning: your tasks could not be saved: {e})"));
        }
        response
    }
}

fn count_line(count: usize) -> String {
    let noun = if count == 1 { "task" } else { "tasks" };
    format!("Now you have {count} {noun} in the list.")
}

fn render_numbered<'a>(header: &str, tasks: impl Iterator<Item = &'a Task>) -> String {
    let mut text = header.to_string();
    for (i, task) in tasks.enumerate() {
        text.push_str(&format!("\n{}. {task}", i + 1));
    }
    text
}
