//! Context assembly: decide which text the LLM sees for each task.
//!
//! Every cut is a fixed-length prefix measured in characters (Unicode scalar
//! values). There is no chunking, ranking, or sentence awareness, and the
//! thresholds are part of the contract: downstream prompt token budgets are
//! sized against them.

use serde::{Deserialize, Serialize};

/// Document prefix used for plain question answering.
pub const QA_CONTEXT_CHARS: usize = 4000;
/// Document prefix used for summarisation.
pub const SUMMARY_CONTEXT_CHARS: usize = 6000;
/// Document prefix used for quiz generation.
pub const QUIZ_CONTEXT_CHARS: usize = 4000;
/// Upper bound on the flattened web-search blob.
pub const WEB_CONTEXT_CHARS: usize = 2000;

/// Marker opening the document section of a web-augmented context.
pub const DOCUMENT_SECTION: &str = "Document Content:\n";
/// Marker opening the web section of a web-augmented context.
pub const WEB_SECTION: &str = "\n\nWeb Search Results:\n";

/// The four things a user can ask of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    /// Answer a question from the document alone.
    Qa,
    /// Answer a question from the document plus web-search snippets.
    QaWithWeb,
    /// Summarise the document.
    Summarize,
    /// Generate a multiple-choice quiz from the document.
    Quiz,
}

impl Task {
    /// Number of leading document characters this task sends.
    pub fn document_budget(self) -> usize {
        match self {
            Task::Qa | Task::QaWithWeb => QA_CONTEXT_CHARS,
            Task::Summarize => SUMMARY_CONTEXT_CHARS,
            Task::Quiz => QUIZ_CONTEXT_CHARS,
        }
    }

    /// `true` for tasks that carry a user question.
    pub fn takes_question(self) -> bool {
        matches!(self, Task::Qa | Task::QaWithWeb)
    }
}

/// Return the first `max_chars` characters of `text`, never splitting a char.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Build the bounded context string for `task`.
///
/// `web_text` is only consulted for [`Task::QaWithWeb`]; a missing blob is
/// treated as empty so the section markers are always present.
pub fn build_context(task: Task, document_text: &str, web_text: Option<&str>) -> String {
    let document = truncate_chars(document_text, task.document_budget());
    match task {
        Task::QaWithWeb => {
            let web = truncate_chars(web_text.unwrap_or_default(), WEB_CONTEXT_CHARS);
            let mut out = String::with_capacity(
                DOCUMENT_SECTION.len() + document.len() + WEB_SECTION.len() + web.len(),
            );
            out.push_str(DOCUMENT_SECTION);
            out.push_str(document);
            out.push_str(WEB_SECTION);
            out.push_str(web);
            out
        }
        Task::Qa | Task::Summarize | Task::Quiz => document.to_string(),
    }
}
