use std::fmt;

use chrono::NaiveDateTime;

/// Pattern for dates as the user types them and as the store records them,
/// e.g. `2/9/2025 1800`. The codec never uses the display pattern.
pub const INPUT_TIME_FORMAT: &str = "%-d/%-m/%Y %H%M";

/// Pattern for dates as shown back to the user, e.g. `Sep 2 2025 18:00`.
pub const DISPLAY_TIME_FORMAT: &str = "%b %-d %Y %H:%M";

/// Kind-specific task payload. The set is closed: serialization and display
/// are exhaustive matches over these three variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    /// A plain to-do with no time attached.
    Todo,
    /// A task that must be completed by a point in time.
    Deadline { by: NaiveDateTime },
    /// A task spanning a period. `from` is not required to precede `to`.
    Event {
        from: NaiveDateTime,
        to: NaiveDateTime,
    },
}

impl TaskKind {
    /// One-letter tag used in both display and the storage format.
    pub fn tag(&self) -> char {
        match self {
            TaskKind::Todo => 'T',
            TaskKind::Deadline { .. } => 'D',
            TaskKind::Event { .. } => 'E',
        }
    }
}

/// A single tracked task: description, done flag, and kind payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub description: String,
    pub done: bool,
    pub kind: TaskKind,
}

impl Task {
    /// Create a not-yet-done task. Callers validate that the description is
    /// non-blank before constructing.
    pub fn new(description: String, kind: TaskKind) -> Self {
        Task {
            description,
            done: false,
            kind,
        }
    }

    pub fn todo(description: String) -> Self {
        Task::new(description, TaskKind::Todo)
    }

    pub fn deadline(description: String, by: NaiveDateTime) -> Self {
        Task::new(description, TaskKind::Deadline { by })
    }

    pub fn event(description: String, from: NaiveDateTime, to: NaiveDateTime) -> Self {
        Task::new(description, TaskKind::Event { from, to })
    }

    pub fn mark_done(&mut self) {
        self.done = true;
    }

    pub fn mark_not_done(&mut self) {
        self.done = false;
    }

    /// The character inside the status checkbox `[ ]`.
    pub fn status_icon(&self) -> char {
        if self.done { 'X' } else { ' ' }
    }
}

impl fmt::Display for Task {
    /// Renders e.g. `[D][ ] Submit report (by: Sep 2 2025 18:00)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}][{}] {}",
            self.kind.tag(),
            self.status_icon(),
            self.description
        )?;
        match &self.kind {
            TaskKind::Todo => Ok(()),
            TaskKind::Deadline { by } => {
                write!(f, " (by: {})", by.format(DISPLAY_TIME_FORMAT))
            }
            TaskKind::Event { from, to } => write!(
                f,
                " (from: {} to: {})",
                from.format(DISPLAY_TIME_FORMAT),
                to.format(DISPLAY_TIME_FORMAT)
            ),
        }
    }
}
