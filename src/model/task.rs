use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    High,
    /// Default, and what unrecognised values decode to. Must stay last for
    /// `#[serde(other)]`.
    #[default]
    #[serde(other)]
    Medium,
}

impl Priority {
    pub fn name(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse_name(s: &str) -> Option<Priority> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" | "med" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How a content line is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Bullet,
    Numbered,
}

impl ContentKind {
    pub fn parse_name(s: &str) -> Option<ContentKind> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bullet" | "b" => Some(ContentKind::Bullet),
            "numbered" | "number" | "n" => Some(ContentKind::Numbered),
            _ => None,
        }
    }
}

/// One line of free-form task content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(alias = "type")]
    pub kind: ContentKind,
    #[serde(default)]
    pub text: String,
}

/// A work item. `subtasks` has the same shape as a board's task list, so
/// nesting depth is unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Calendar due date; written as `""` when unset
    #[serde(default, with = "due_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub content: Vec<ContentItem>,
    #[serde(default)]
    pub subtasks: Vec<Task>,
}

impl Task {
    /// Create a task with default priority and no due date, tags, content or subtasks
    pub fn new(id: String, title: String, description: String) -> Self {
        Task {
            id,
            title,
            description,
            due_date: None,
            priority: Priority::Medium,
            tags: Vec::new(),
            content: Vec::new(),
            subtasks: Vec::new(),
        }
    }

    /// Number of tasks in this subtree, counting this one
    pub fn subtree_size(&self) -> usize {
        1 + self.subtasks.iter().map(Task::subtree_size).sum::<usize>()
    }
}

/// Serde adapter for `dueDate`: ISO `YYYY-MM-DD`, or empty for unset.
mod due_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&d.format(FORMAT).to_string()),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let parsed = NaiveDate::parse_from_str(trimmed, FORMAT).or_else(|e| {
            // Older snapshots sometimes carry a full timestamp; keep the date part.
            match trimmed.split_once('T') {
                Some((date_part, _)) => NaiveDate::parse_from_str(date_part, FORMAT),
                None => Err(e),
            }
        });
        match parsed {
            Ok(date) => Ok(Some(date)),
            Err(e) => {
                log::warn!("dropping unreadable due date {:?}: {}", raw, e);
                Ok(None)
            }
        }
    }
}

pub use due_date::FORMAT as DUE_DATE_FORMAT;
