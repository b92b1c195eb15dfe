//! Prompt text sent to the completion provider.
//!
//! User input is inserted verbatim; nothing is escaped or truncated.

use std::fmt::Write;

/// System instruction for plan feedback.
pub const ANALYZE_SYSTEM_PROMPT: &str =
    "You are a productivity expert helping improve weekly plans.";

/// System instruction for document summaries.
pub const UPLOAD_SYSTEM_PROMPT: &str =
    "You're a helpful assistant summarizing and giving insights from user-uploaded documents.";

/// Render steps as `"1. first\n2. second\n"`.
pub fn numbered_steps(steps: &[String]) -> String {
    let mut out = String::new();
    for (i, step) in steps.iter().enumerate() {
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{}. {step}", i + 1);
    }
    out
}

/// Build the user prompt asking for suggestions on a titled weekly plan.
pub fn build_analyze_prompt(title: &str, steps: &[String]) -> String {
    format!(
        "Here is a weekly plan titled \"{title}\" with steps:\n{}\n\nPlease provide suggestions to improve this plan in a numbered list.",
        numbered_steps(steps)
    )
}

/// Build the user prompt asking for a bullet-point summary of a document.
pub fn build_upload_prompt(document_text: &str) -> String {
    format!("Here is a document:\n{document_text}\n\nGive suggestions or a summary in a bullet list.")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn analyze_prompt_numbers_steps_in_order() {
        let prompt = build_analyze_prompt("Week 1", &owned(&["Plan meals", "Exercise"]));
        assert!(prompt.contains("1. Plan meals\n2. Exercise\n"), "{prompt}");
    }

    #[test]
    fn analyze_prompt_exact_text() {
        let prompt = build_analyze_prompt("Week 1", &owned(&["Plan meals", "Exercise"]));
        assert_eq!(
            prompt,
            "Here is a weekly plan titled \"Week 1\" with steps:\n\
             1. Plan meals\n2. Exercise\n\n\n\
             Please provide suggestions to improve this plan in a numbered list."
        );
    }

    #[test]
    fn analyze_prompt_has_one_numbered_line_per_step() {
        let steps: Vec<String> = (0..12).map(|i| format!("step {i}")).collect();
        let prompt = build_analyze_prompt("Busy", &steps);

        let numbered: Vec<&str> = prompt
            .lines()
            .filter(|line| line.split_once(". ").is_some_and(|(n, _)| n.parse::<usize>().is_ok()))
            .collect();
        assert_eq!(numbered.len(), steps.len());
        for (i, line) in numbered.iter().enumerate() {
            assert_eq!(*line, format!("{}. step {i}", i + 1));
        }
    }

    #[test]
    fn analyze_prompt_with_no_steps() {
        let prompt = build_analyze_prompt("Empty week", &[]);
        assert_eq!(numbered_steps(&[]), "");
        assert!(prompt.starts_with("Here is a weekly plan titled \"Empty week\" with steps:\n\n\n"));
    }

    #[test]
    fn analyze_prompt_inserts_title_verbatim() {
        let prompt = build_analyze_prompt("\"quoted\" & <raw>", &[]);
        assert!(prompt.contains("titled \"\"quoted\" & <raw>\" with steps"));
    }

    #[test]
    fn upload_prompt_wraps_document() {
        let prompt = build_upload_prompt("line one\nline two");
        assert_eq!(
            prompt,
            "Here is a document:\nline one\nline two\n\nGive suggestions or a summary in a bullet list."
        );
    }

    #[test]
    fn upload_prompt_does_not_truncate() {
        let doc = "x".repeat(200_000);
        assert!(build_upload_prompt(&doc).contains(&doc));
    }
}
