//! crates/taskdeck_core/src/listing.rs
//!
//! In-memory filtering, searching and sorting for the task list.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::domain::{Task, TaskStatus, UnknownVariant};

/// Which statuses the list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => task.status == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(StatusFilter::All)
        } else {
            s.parse().map(StatusFilter::Only)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    Priority,
    DueDate,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::Priority => "priority",
            SortKey::DueDate => "due-date",
        }
    }

    /// Compares two tasks under this key.
    pub fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortKey::Newest => b.created_at.cmp(&a.created_at),
            SortKey::Oldest => a.created_at.cmp(&b.created_at),
            SortKey::Priority => b.priority.rank().cmp(&a.priority.rank()),
            // Undated tasks go last; two undated tasks tie.
            SortKey::DueDate => match (a.due_date, b.due_date) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(&b),
            },
        }
    }
}

impl FromStr for SortKey {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(SortKey::Newest),
            "oldest" => Ok(SortKey::Oldest),
            "priority" => Ok(SortKey::Priority),
            "due-date" => Ok(SortKey::DueDate),
            other => Err(UnknownVariant {
                kind: "sort key",
                value: other.to_string(),
            }),
        }
    }
}

/// The list controls: status filter, sort key and free-text search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListControls {
    pub filter: StatusFilter,
    pub sort: SortKey,
    pub search: String,
}

impl ListControls {
    /// True when anything narrows the list down.
    pub fn is_narrowing(&self) -> bool {
        self.filter != StatusFilter::All || !self.search.is_empty()
    }

    /// Hint shown when nothing is left to display.
    pub fn empty_hint(&self) -> &'static str {
        if self.is_narrowing() {
            "Try changing your search or filter criteria."
        } else {
            "Get started by creating a new task."
        }
    }
}

/// Case-insensitive substring match on title or description.
pub fn matches_search(task: &Task, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    task.title.to_lowercase().contains(&needle)
        || task
            .description
            .as_deref()
            .map_or(false, |d| d.to_lowercase().contains(&needle))
}

/// Filters, searches and sorts `tasks` without touching the source list.
pub fn arrange(tasks: &[Task], controls: &ListControls) -> Vec<Task> {
    let mut visible: Vec<Task> = tasks
        .iter()
        .filter(|task| controls.filter.matches(task))
        .filter(|task| matches_search(task, &controls.search))
        .cloned()
        .collect();
    // Stable, so equal keys keep their fetched order.
    visible.sort_by(|a, b| controls.sort.compare(a, b));
    visible
}
