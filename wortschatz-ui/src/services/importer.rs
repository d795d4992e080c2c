//! Bulk vocabulary import
//!
//! Two line-oriented input formats, both producing validated entry drafts
//! plus per-line errors:
//!
//! - Pipe text: `word | meaning | category` or `word | meaning | example | category`
//! - CSV: same fields comma-separated, optional header row, double quotes
//!   stripped from fields
//!
//! Batch policies differ per format: pipe input is all-or-nothing (any line
//! error rejects the batch), CSV accepts the valid subset. Drafts are then
//! submitted to the catalog one by one; an individual create failure does not
//! abort the rest.

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::warn;
use wortschatz_common::db::models::is_valid_category;

use crate::db::vocabulary;

/// A validated vocabulary entry parsed from bulk input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    pub word: String,
    pub meaning: String,
    pub example_sentence: String,
    pub category: String,
}

/// A line that failed to parse or validate
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LineError {
    /// 1-based input line number
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for LineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// How a batch treats line errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPolicy {
    /// Any line error rejects the whole batch (pipe format)
    AllOrNothing,
    /// Valid drafts proceed, errors are reported alongside (CSV format)
    Partial,
}

/// Parse pipe-delimited text, one entry per line
pub fn parse_pipe_text(raw: &str) -> (Vec<EntryDraft>, Vec<LineError>) {
    let mut drafts = Vec::new();
    let mut errors = Vec::new();

    for (index, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<String> = line.split('|').map(|f| f.trim().to_string()).collect();
        match draft_from_fields(fields, index + 1) {
            Ok(draft) => drafts.push(draft),
            Err(err) => errors.push(err),
        }
    }

    (drafts, errors)
}

/// Parse comma-separated text with an optional header row
///
/// The header is detected by checking whether the first line, lowercased,
/// contains the token "word". Double quotes around fields are stripped.
pub fn parse_csv(raw: &str) -> (Vec<EntryDraft>, Vec<LineError>) {
    let mut drafts = Vec::new();
    let mut errors = Vec::new();

    let mut lines = raw.lines().enumerate().peekable();
    if let Some((_, first)) = lines.peek() {
        if first.to_lowercase().contains("word") {
            lines.next();
        }
    }

    for (index, line) in lines {
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<String> = line
            .split(',')
            .map(|f| f.trim().trim_matches('"').trim().to_string())
            .collect();
        match draft_from_fields(fields, index + 1) {
            Ok(draft) => drafts.push(draft),
            Err(err) => errors.push(err),
        }
    }

    (drafts, errors)
}

/// Build a draft from trimmed fields
///
/// 3 fields: word | meaning | category. 4 fields: word | meaning | example |
/// category. Anything else is an invalid format.
fn draft_from_fields(fields: Vec<String>, line: usize) -> Result<EntryDraft, LineError> {
    let (word, meaning, example_sentence, category) = match fields.len() {
        3 => {
            let mut it = fields.into_iter();
            let word = it.next().unwrap_or_default();
            let meaning = it.next().unwrap_or_default();
            let category = it.next().unwrap_or_default();
            (word, meaning, String::new(), category)
        }
        4 => {
            let mut it = fields.into_iter();
            let word = it.next().unwrap_or_default();
            let meaning = it.next().unwrap_or_default();
            let example = it.next().unwrap_or_default();
            let category = it.next().unwrap_or_default();
            (word, meaning, example, category)
        }
        _ => {
            return Err(LineError {
                line,
                message: "invalid format (expected 3 or 4 fields)".to_string(),
            })
        }
    };

    if word.is_empty() {
        return Err(LineError {
            line,
            message: "missing word".to_string(),
        });
    }
    if meaning.is_empty() {
        return Err(LineError {
            line,
            message: "missing meaning".to_string(),
        });
    }
    if !is_valid_category(&category) {
        return Err(LineError {
            line,
            message: format!("unknown category '{}'", category),
        });
    }

    Ok(EntryDraft {
        word,
        meaning,
        example_sentence,
        category,
    })
}

/// Apply the batch policy to a parse result
pub fn apply_policy(
    policy: BatchPolicy,
    drafts: Vec<EntryDraft>,
    errors: Vec<LineError>,
) -> (Vec<EntryDraft>, Vec<LineError>) {
    match policy {
        BatchPolicy::AllOrNothing if !errors.is_empty() => (Vec::new(), errors),
        _ => (drafts, errors),
    }
}

/// Submit drafts to the catalog one by one; returns the success count
pub async fn import_drafts(pool: &SqlitePool, drafts: &[EntryDraft]) -> usize {
    let mut imported = 0;
    for draft in drafts {
        match vocabulary::create(
            pool,
            &draft.word,
            &draft.meaning,
            &draft.example_sentence,
            &draft.category,
        )
        .await
        {
            Ok(_) => imported += 1,
            Err(err) => {
                warn!(word = %draft.word, "Failed to import entry: {}", err);
            }
        }
    }
    imported
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipe_three_fields() {
        let (drafts, errors) = parse_pipe_text("Hallo | Hello | Greetings");

        assert!(errors.is_empty());
        assert_eq!(drafts.len(), 1);
        assert_eq!(
            drafts[0],
            EntryDraft {
                word: "Hallo".to_string(),
                meaning: "Hello".to_string(),
                example_sentence: String::new(),
                category: "Greetings".to_string(),
            }
        );
    }

    #[test]
    fn test_pipe_four_fields() {
        let (drafts, errors) =
            parse_pipe_text("Hallo | Hello | Hallo, wie geht es dir? | Greetings");

        assert!(errors.is_empty());
        assert_eq!(drafts[0].example_sentence, "Hallo, wie geht es dir?");
    }

    #[test]
    fn test_pipe_too_few_fields() {
        let (drafts, errors) = parse_pipe_text("Hallo | Hello");

        assert!(drafts.is_empty());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("invalid format"));
    }

    #[test]
    fn test_pipe_unknown_category_rejects_whole_batch() {
        let raw = "Hallo | Hello | Greetings\nX | Y | NotACategory";
        let (drafts, errors) = parse_pipe_text(raw);
        let (drafts, errors) = apply_policy(BatchPolicy::AllOrNothing, drafts, errors);

        assert!(drafts.is_empty(), "pipe format is all-or-nothing");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 2);
        assert!(errors[0].message.contains("NotACategory"));
    }

    #[test]
    fn test_pipe_skips_blank_lines() {
        let (drafts, errors) = parse_pipe_text("\nHallo | Hello | Greetings\n\n");

        assert!(errors.is_empty());
        assert_eq!(drafts.len(), 1);
    }

    #[test]
    fn test_csv_with_header_and_partial_accept() {
        let raw = "word,meaning,example,category\n\
                   Hallo,Hello,Hallo!,Greetings\n\
                   Danke,Thank you,Danke schön!,Greetings\n\
                   broken line\n\
                   Wasser,Water,Ein Glas Wasser,Drinks\n\
                   Zug,Train,Der Zug kommt,Travel";
        let (drafts, errors) = parse_csv(raw);
        let (drafts, errors) = apply_policy(BatchPolicy::Partial, drafts, errors);

        assert_eq!(drafts.len(), 4, "valid subset proceeds");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 4, "line numbers count the header row");
    }

    #[test]
    fn test_csv_quotes_stripped() {
        let raw = "\"Hallo\",\"Hello\",\"Greetings\"";
        let (drafts, errors) = parse_csv(raw);

        assert!(errors.is_empty());
        assert_eq!(drafts[0].word, "Hallo");
        assert_eq!(drafts[0].category, "Greetings");
    }

    #[test]
    fn test_csv_header_detection_is_case_insensitive() {
        let raw = "Word,Meaning,Category\nHallo,Hello,Greetings";
        let (drafts, errors) = parse_csv(raw);

        assert!(errors.is_empty());
        assert_eq!(drafts.len(), 1, "header row skipped");
    }

    #[test]
    fn test_missing_word_or_meaning() {
        let (drafts, errors) = parse_pipe_text(" | Hello | Greetings\nHallo |  | Greetings");

        assert!(drafts.is_empty());
        assert_eq!(errors.len(), 2);
        assert!(errors[0].message.contains("missing word"));
        assert!(errors[1].message.contains("missing meaning"));
    }

    #[test]
    fn test_partial_policy_keeps_drafts_with_errors() {
        let raw = "Hallo | Hello | Greetings\nX | Y | NotACategory";
        let (drafts, errors) = parse_pipe_text(raw);
        let (drafts, errors) = apply_policy(BatchPolicy::Partial, drafts, errors);

        assert_eq!(drafts.len(), 1);
        assert_eq!(errors.len(), 1);
    }
}
