//! Fixed answers and prompt templates.

use sift_core::Chunk;

/// Answer when there is neither uploaded knowledge nor an image.
pub const REFUSAL: &str = "I am an advanced RAG chatbot. Please upload a file (PDF, Doc, Image, Audio, or Video) to begin our interaction. I do not answer general prompts without your data.";

/// The only acceptable answer when the context does not contain one.
pub const CANNOT_FIND: &str =
    "Based on the uploaded file, I cannot find an answer to that question.";

/// System instruction for the text-only path.
pub const TEXT_SYSTEM_PROMPT: &str = "You are a strict RAG Assistant.
STRICT RULE: Only use the provided 'Context' to answer the 'Question'.
If the answer is NOT in the context, your ONLY response should be: \"Based on the uploaded file, I cannot find an answer to that question.\"
Do NOT use your own memory or general knowledge.";

const VISION_INSTRUCTION: &str = "ONLY use the provided image and context to answer. If the answer isn't there, say you can't find it.";

/// Retrieved chunk texts separated by a blank line.
pub fn build_context(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn text_prompt(context: &str, question: &str) -> String {
    format!("Context: {}\nQuestion: {}", context, question)
}

pub fn vision_prompt(context: &str, question: &str) -> String {
    format!(
        "{} \n\n Context: {}\n\nQuestion: {}",
        VISION_INSTRUCTION, context, question
    )
}

/// Prompt for the text model when the vision model failed. No system prompt
/// accompanies it.
pub fn fallback_prompt(context: &str, question: &str) -> String {
    format!(
        "STRICT RAG MODE: Use ONLY this context: {}. Question: {}",
        context, question
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::SourceRef;
    use std::path::Path;

    #[test]
    fn test_system_prompt_names_the_fixed_answer() {
        assert!(TEXT_SYSTEM_PROMPT.contains(CANNOT_FIND));
    }

    #[test]
    fn test_context_joins_with_blank_line() {
        let source = SourceRef::new(Path::new("f.txt"));
        let chunks = vec![
            Chunk::new(0, "first", source.clone()),
            Chunk::new(1, "second", source),
        ];
        assert_eq!(build_context(&chunks), "first\n\nsecond");
        assert_eq!(build_context(&[]), "");
    }

    #[test]
    fn test_templates() {
        assert_eq!(text_prompt("ctx", "why?"), "Context: ctx\nQuestion: why?");
        assert_eq!(
            vision_prompt("ctx", "what?"),
            "ONLY use the provided image and context to answer. If the answer isn't there, say you can't find it. \n\n Context: ctx\n\nQuestion: what?"
        );
        assert_eq!(
            fallback_prompt("ctx", "what?"),
            "STRICT RAG MODE: Use ONLY this context: ctx. Question: what?"
        );
    }
}
