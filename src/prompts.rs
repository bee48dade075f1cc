//! Instruction templates sent to the LLM, one set per [`Task`].
//!
//! Templates are versioned constants: changing wording means adding a `_V2`
//! and switching [`build_prompt`] over, so a prompt regression is visible in
//! review and old wording stays available to tests.
//!
//! Every task goes through the same question-answering envelope. Summaries and
//! quizzes place their instruction block in the question slot, so the model
//! always sees `Context:` followed by `Question:`.

use crate::pipeline::context::Task;

/// Version tag of the templates currently used by [`build_prompt`].
pub const PROMPT_VERSION: &str = "v1";

/// Envelope wrapping `{context}` and `{question}` with Markdown output rules.
pub const QA_ENVELOPE_V1: &str = r#"Answer the question based on the following context.

Context:
{context}

Question: {question}

IMPORTANT: Format your response ONLY in Markdown with:
- Use ## for main headings (e.g., ## Answer)
- Use **bold** for all important terms and concepts
- Use bullet points (- item) for lists
- Use proper paragraph spacing
- Make it professional and ChatGPT-style
- NO plain text blocks, ONLY Markdown formatting"#;

/// Question-slot instruction for [`Task::Summarize`].
pub const SUMMARY_INSTRUCTIONS_V1: &str = r#"Summarize the following text in Markdown format.

IMPORTANT: Use ONLY Markdown formatting:
- Start with ## Summary heading
- Use **bold** for the main topic
- Use bullet points (- item) for 3-5 key points
- Use **bold** for important terms
- Add proper paragraph spacing
- Make it professional and ChatGPT-style
- NO plain text, ONLY Markdown"#;

/// Question-slot instruction for [`Task::Quiz`].
pub const QUIZ_INSTRUCTIONS_V1: &str = r#"Generate 5 multiple choice questions from the text.

IMPORTANT: Format ONLY in Markdown:
- Start with ## Quiz heading
- Use **Question 1:**, **Question 2:**, etc. for each question
- List options as:
  - A) Option
  - B) Option
  - C) Option
  - D) Option
- Use **Correct Answer:** for answers
- Add proper spacing between questions
- Make it professional and ChatGPT-style
- NO plain text, ONLY Markdown"#;

/// Build the full prompt for `task`.
///
/// `question` is used by [`Task::Qa`] and [`Task::QaWithWeb`] (missing → empty)
/// and ignored by the other tasks, which supply their own instruction.
pub fn build_prompt(task: Task, context: &str, question: Option<&str>) -> String {
    let question = match task {
        Task::Qa | Task::QaWithWeb => question.unwrap_or_default(),
        Task::Summarize => SUMMARY_INSTRUCTIONS_V1,
        Task::Quiz => QUIZ_INSTRUCTIONS_V1,
    };
    // Placeholders inside the document text are never substituted.
    let (head, tail) = QA_ENVELOPE_V1
        .split_once("{context}")
        .unwrap_or((QA_ENVELOPE_V1, ""));
    let mut prompt = String::with_capacity(QA_ENVELOPE_V1.len() + context.len() + question.len());
    prompt.push_str(head);
    prompt.push_str(context);
    prompt.push_str(&tail.replacen("{question}", question, 1));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qa_prompt_places_context_before_question() {
        let p = build_prompt(Task::Qa, "CTX", Some("What is X?"));
        let c = p.find("Context:\nCTX").expect("context section");
        let q = p.find("Question: What is X?").expect("question section");
        assert!(c < q);
        assert!(p.contains("ONLY in Markdown"));
    }

    #[test]
    fn summary_prompt_uses_its_own_instruction() {
        let p = build_prompt(Task::Summarize, "CTX", Some("ignored"));
        assert!(p.contains("## Summary heading"));
        assert!(!p.contains("ignored"));
    }

    #[test]
    fn quiz_prompt_asks_for_five_questions() {
        let p = build_prompt(Task::Quiz, "CTX", None);
        assert!(p.contains("Generate 5 multiple choice questions"));
        assert!(p.contains("**Correct Answer:**"));
    }

    #[test]
    fn placeholders_in_document_are_left_alone() {
        let p = build_prompt(Task::Qa, "literal {question} in text", Some("Q?"));
        assert!(p.contains("literal {question} in text"));
        assert!(p.contains("Question: Q?"));
    }

    #[test]
    fn missing_question_renders_empty() {
        let p = build_prompt(Task::QaWithWeb, "CTX", None);
        assert!(p.contains("Question: \n"));
    }
}
