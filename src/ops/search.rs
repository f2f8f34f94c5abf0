use std::ops::Range;

use regex::Regex;

use crate::model::forest::Forest;
use crate::model::task::Task;

/// Which field of a task matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchField {
    Title,
    Description,
    Tag,
    /// Content item, by index
    Content(usize),
}

impl MatchField {
    pub fn name(&self) -> String {
        match self {
            MatchField::Title => "title".into(),
            MatchField::Description => "description".into(),
            MatchField::Tag => "tag".into(),
            MatchField::Content(i) => format!("content[{}]", i),
        }
    }
}

/// A search hit for a task field
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub board_id: String,
    pub task_id: String,
    pub field: MatchField,
    pub spans: Vec<Range<usize>>,
}

/// Collect all non-overlapping match byte-ranges for a regex in the given text.
fn find_matches(re: &Regex, text: &str) -> Vec<Range<usize>> {
    re.find_iter(text).map(|m| m.start()..m.end()).collect()
}

/// Search every task on every board, subtasks included.
pub fn search_tasks(forest: &Forest, re: &Regex) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    for board in &forest.boards {
        for task in &board.tasks {
            search_task(re, task, &board.id, &mut hits);
        }
    }
    hits
}

fn search_task(re: &Regex, task: &Task, board_id: &str, hits: &mut Vec<SearchHit>) {
    let mut push = |field: MatchField, text: &str| {
        let spans = find_matches(re, text);
        if !spans.is_empty() {
            hits.push(SearchHit {
                board_id: board_id.to_string(),
                task_id: task.id.clone(),
                field,
                spans,
            });
        }
    };

    push(MatchField::Title, &task.title);
    push(MatchField::Description, &task.description);
    for tag in &task.tags {
        push(MatchField::Tag, tag);
    }
    for (i, item) in task.content.iter().enumerate() {
        push(MatchField::Content(i), &item.text);
    }

    for sub in &task.subtasks {
        search_task(re, sub, board_id, hits);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forest() -> Forest {
        serde_json::from_str(
            r#"[
  {"id":"b1","tasks":[
    {"id":"t1","title":"Fix parser","description":"crash on empty input","tags":["bug"],
     "subtasks":[{"id":"t1a","title":"Write regression test for parser"}]}
  ]},
  {"id":"b2","tasks":[
    {"id":"t2","title":"Docs","content":[{"kind":"bullet","text":"mention the parser"}]}
  ]}
]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_search_matches_nested_and_content() {
        let re = Regex::new("parser").unwrap();
        let hits = search_tasks(&forest(), &re);
        let found: Vec<(&str, String)> = hits
            .iter()
            .map(|h| (h.task_id.as_str(), h.field.name()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("t1", "title".to_string()),
                ("t1a", "title".to_string()),
                ("t2", "content[0]".to_string()),
            ]
        );
        assert_eq!(hits[2].board_id, "b2");
    }

    #[test]
    fn test_search_spans() {
        let re = Regex::new("(?i)bug|crash").unwrap();
        let hits = search_tasks(&forest(), &re);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].field, MatchField::Description);
        assert_eq!(hits[0].spans, vec![0..5]);
        assert_eq!(hits[1].field, MatchField::Tag);
    }

    #[test]
    fn test_search_no_hits() {
        let re = Regex::new("nothing-like-this").unwrap();
        assert!(search_tasks(&forest(), &re).is_empty());
    }
}
