use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tempfile::NamedTempFile;

use crate::model::task::{INPUT_TIME_FORMAT, Task, TaskKind};

/// Field separator in the storage format.
const SEPARATOR: &str = " | ";

/// Error type for storage I/O. Per-record problems are [`DecodeError`] and
/// never surface here; a corrupt record is skipped, not fatal.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Why a single record failed to decode.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("expected {expected} fields, found {found}")]
    WrongFieldCount { expected: usize, found: usize },
    #[error("unknown type tag '{0}'")]
    UnknownTag(String),
    #[error("empty description")]
    EmptyDescription,
    #[error("bad date text '{0}'")]
    BadDate(String),
}

/// Serialize one task as a storage record (no trailing newline).
///
/// Format: `tag | done | description [| by] [| from | to]`, dates in the
/// input pattern.
pub fn encode_task(task: &Task) -> String {
    let mut record = format!(
        "{}{SEPARATOR}{}{SEPARATOR}{}",
        task.kind.tag(),
        if task.done { "1" } else { "0" },
        task.description
    );
    match &task.kind {
        TaskKind::Todo => {}
        TaskKind::Deadline { by } => {
            record.push_str(SEPARATOR);
            record.push_str(&by.format(INPUT_TIME_FORMAT).to_string());
        }
        TaskKind::Event { from, to } => {
            record.push_str(SEPARATOR);
            record.push_str(&from.format(INPUT_TIME_FORMAT).to_string());
            record.push_str(SEPARATOR);
            record.push_str(&to.format(INPUT_TIME_FORMAT).to_string());
        }
    }
    record
}

/// Parse one non-blank storage record back into a task.
///
/// The description may itself contain the separator, so the split is
/// anchored: tag and done flag come off the front, and the fixed number of
/// date fields for the tag comes off the back. Whatever sits in between is
/// the description.
pub fn decode_line(line: &str) -> Result<Task, DecodeError> {
    let found = line.split(SEPARATOR).count();
    let too_few = |expected: usize| DecodeError::WrongFieldCount { expected, found };

    let (tag, rest) = line.split_once(SEPARATOR).ok_or_else(|| too_few(3))?;
    let (done_flag, rest) = rest.split_once(SEPARATOR).ok_or_else(|| too_few(3))?;
    // The original store wrote "1" for done; anything else reads as not done.
    let done = done_flag == "1";

    let (description, kind) = match tag {
        "T" => (rest, TaskKind::Todo),
        "D" => {
            let (description, by) = rest.rsplit_once(SEPARATOR).ok_or_else(|| too_few(4))?;
            (
                description,
                TaskKind::Deadline {
                    by: decode_time(by)?,
                },
            )
        }
        "E" => {
            let (rest, to) = rest.rsplit_once(SEPARATOR).ok_or_else(|| too_few(5))?;
            let (description, from) = rest.rsplit_once(SEPARATOR).ok_or_else(|| too_few(5))?;
            (
                description,
                TaskKind::Event {
                    from: decode_time(from)?,
                    to: decode_time(to)?,
                },
            )
        }
        other => return Err(DecodeError::UnknownTag(other.to_string())),
    };

    if description.trim().is_empty() {
        return Err(DecodeError::EmptyDescription);
    }

    let mut task = Task::new(description.to_string(), kind);
    if done {
        task.mark_done();
    }
    Ok(task)
}

fn decode_time(text: &str) -> Result<NaiveDateTime, DecodeError> {
    NaiveDateTime::parse_from_str(text, INPUT_TIME_FORMAT)
        .map_err(|_| DecodeError::BadDate(text.to_string()))
}

/// Handle on the flat storage file. Load reads the whole file once at
/// startup; save fully rewrites it after each mutation.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Store { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all tasks from the storage file.
    ///
    /// A missing file is not an error: it (and any missing parent directory)
    /// is created and an empty list returned. Corrupt records are skipped
    /// with a stderr warning; one bad line never blocks the rest.
    pub fn load(&self) -> Result<Vec<Task>, StoreError> {
        if !self.path.exists() {
            self.ensure_parent_dir()?;
            fs::File::create(&self.path).map_err(|e| StoreError::Write {
                path: self.path.clone(),
                source: e,
            })?;
            return Ok(Vec::new());
        }

        let text = fs::read_to_string(&self.path).map_err(|e| StoreError::Read {
            path: self.path.clone(),
            source: e,
        })?;

        let mut tasks = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match decode_line(line) {
                Ok(task) => tasks.push(task),
                Err(e) => eprintln!("warning: skipping corrupted record '{line}': {e}"),
            }
        }
        Ok(tasks)
    }

    /// Overwrite the storage file with the given tasks, one record per line,
    /// in order. Writes to a temp file in the same directory, then persists
    /// over the target so a failed save never truncates existing data.
    pub fn save(&self, tasks: &[Task]) -> Result<(), StoreError> {
        self.ensure_parent_dir()?;
        let dir = parent_dir(&self.path);

        let mut content = String::new();
        for task in tasks {
            content.push_str(&encode_task(task));
            content.push('\n');
        }

        let write_err = |source: std::io::Error| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(content.as_bytes()).map_err(write_err)?;
        tmp.flush().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }

    fn ensure_parent_dir(&self) -> Result<(), StoreError> {
        fs::create_dir_all(parent_dir(&self.path)).map_err(|e| StoreError::Write {
            path: self.path.clone(),
            source: e,
        })
    }
}

/// Directory containing `path`, falling back to `.` for bare file names.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, INPUT_TIME_FORMAT).unwrap()
    }

    #[test]
    fn test_encode_uses_input_pattern_not_display_pattern() {
        let task = Task::deadline("Submit report".to_string(), dt("2/9/2025 1800"));
        assert_eq!(encode_task(&task), "D | 0 | Submit report | 2/9/2025 1800");
    }

    #[test]
    fn test_encode_done_todo() {
        let mut task = Task::todo("Finish homework".to_string());
        task.mark_done();
        assert_eq!(encode_task(&task), "T | 1 | Finish homework");
    }

    #[test]
    fn test_encode_event() {
        let task = Task::event(
            "Offsite".to_string(),
            dt("3/9/2025 0900"),
            dt("4/9/2025 1700"),
        );
        assert_eq!(
            encode_task(&task),
            "E | 0 | Offsite | 3/9/2025 0900 | 4/9/2025 1700"
        );
    }

    #[test]
    fn test_decode_round_trips_all_kinds() {
        let mut tasks = vec![
            Task::todo("a".to_string()),
            Task::deadline("b".to_string(), dt("2/9/2025 1800")),
            Task::event("c".to_string(), dt("3/9/2025 0900"), dt("3/9/2025 1700")),
        ];
        tasks[0].mark_done();
        for task in &tasks {
            let decoded = decode_line(&encode_task(task)).unwrap();
            assert_eq!(&decoded, task);
        }
    }

    #[test]
    fn test_decode_keeps_separator_inside_description() {
        let tasks = [
            Task::todo("a | b".to_string()),
            Task::deadline("w | x".to_string(), dt("2/9/2025 1800")),
            Task::event("y | z".to_string(), dt("3/9/2025 0900"), dt("3/9/2025 1700")),
        ];
        for task in &tasks {
            let decoded = decode_line(&encode_task(task)).unwrap();
            assert_eq!(&decoded, task);
        }
    }

    #[test]
    fn test_decode_tolerates_zero_padded_dates() {
        let task = decode_line("D | 0 | pay rent | 02/09/2025 1800").unwrap();
        assert_eq!(
            task.kind,
            TaskKind::Deadline {
                by: dt("2/9/2025 1800")
            }
        );
    }

    #[test]
    fn test_decode_treats_non_one_flag_as_not_done() {
        let task = decode_line("T | 0 | a").unwrap();
        assert!(!task.done);
        let task = decode_line("T | x | a").unwrap();
        assert!(!task.done);
    }

    #[test]
    fn test_decode_rejects_bad_records() {
        assert!(matches!(
            decode_line("T | 1"),
            Err(DecodeError::WrongFieldCount { .. })
        ));
        assert!(matches!(
            decode_line("Z | 1 | mystery"),
            Err(DecodeError::UnknownTag(_))
        ));
        assert!(matches!(
            decode_line("D | 0 | pay rent | whenever"),
            Err(DecodeError::BadDate(_))
        ));
        assert!(matches!(
            decode_line("D | 0 | pay rent"),
            Err(DecodeError::WrongFieldCount { .. })
        ));
    }

    #[test]
    fn test_load_missing_file_creates_it_and_returns_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data/herald.txt");
        let store = Store::new(&path);

        let tasks = store.load().unwrap();
        assert!(tasks.is_empty());
        assert!(path.exists());
    }

    #[test]
    fn test_load_skips_corrupt_line_between_valid_lines() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("herald.txt");
        fs::write(
            &path,
            "T | 0 | first\nnot a record at all\nD | 1 | second | 2/9/2025 1800\n",
        )
        .unwrap();

        let tasks = Store::new(&path).load().unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].description, "first");
        assert_eq!(tasks[1].description, "second");
        assert!(tasks[1].done);
    }

    #[test]
    fn test_load_skips_blank_lines() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("herald.txt");
        fs::write(&path, "\nT | 0 | a\n\n\nT | 1 | b\n").unwrap();

        let tasks = Store::new(&path).load().unwrap();
        assert_eq!(tasks.len(), 2);
    }

    #[test]
    fn test_save_then_load_round_trips_in_order() {
        let tmp = TempDir::new().unwrap();
        let store = Store::new(tmp.path().join("nested/dir/herald.txt"));

        let mut tasks = vec![
            Task::deadline("Submit report".to_string(), dt("2/9/2025 1800")),
            Task::todo("Finish homework".to_string()),
            Task::event("Offsite".to_string(), dt("3/9/2025 0900"), dt("3/9/2025 1700")),
        ];
        tasks[1].mark_done();

        store.save(&tasks).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, tasks);
    }

    #[test]
    fn test_save_overwrites_previous_contents() {
        let tmp = TempDir::new().unwrap();
        let store = Store::new(tmp.path().join("herald.txt"));

        store.save(&[Task::todo("old".to_string())]).unwrap();
        store.save(&[Task::todo("new".to_string())]).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "T | 0 | new\n");
    }
}
