
use tracing::{debug, info};

use crate::llm::ChatModel;
use crate::store::SearchResult;
use crate::Result;

/// The fixed response returned whenever the retrieved context cannot answer
/// the question. The prompt instructs the model to reply with this string
/// verbatim; it is also returned directly when retrieval comes back empty.
pub const INSUFFICIENT_INFORMATION: &str =
    "I do not have the information needed to answer your question.";

/// Format retrieved chunks, in result order, into the grounding-context
/// block given to the model.
#[inline]
pub fn format_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| format!("[Score: {:.4}]\n{}", r.score, r.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the constrained prompt: the model may only use the CONTEXT block
/// and must fall back to the fixed refusal for anything outside it.
#[inline]
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "CONTEXT:\n\
         {context}\n\
         \n\
         RULES:\n\
         - Answer only based on the CONTEXT.\n\
         - If the information is not explicitly in the CONTEXT, reply:\n\
           \"{INSUFFICIENT_INFORMATION}\"\n\
         - Never invent answers or use outside knowledge.\n\
         - Never produce opinions or interpretations beyond what is written.\n\
         \n\
         EXAMPLES OF OUT-OF-CONTEXT QUESTIONS:\n\
         Question: \"What is the capital of France?\"\n\
         Answer: \"{INSUFFICIENT_INFORMATION}\"\n\
         \n\
         Question: \"How many clients do we have in 2024?\"\n\
         Answer: \"{INSUFFICIENT_INFORMATION}\"\n\
         \n\
         Question: \"Do you think this is good or bad?\"\n\
         Answer: \"{INSUFFICIENT_INFORMATION}\"\n\
         \n\
         USER QUESTION:\n\
         {question}\n\
         \n\
         ANSWER THE \"USER QUESTION\"\n"
    )
}

/// Answer a question from retrieved context.
///
/// When the retrieval result is empty the fixed refusal is returned without
/// a model call. Otherwise the model is invoked exactly once and its
/// response returned verbatim; failures surface as
/// [`crate::RagError::Generation`] with no retry.
#[inline]
pub fn compose_answer(
    model: &dyn ChatModel,
    question: &str,
    results: &[SearchResult],
) -> Result<String> {
    if results.is_empty() {
        info!("no context retrieved; returning fixed refusal");
        return Ok(INSUFFICIENT_INFORMATION.to_string());
    }

    let context = format_context(results);
    let prompt = build_prompt(&context, question);
    debug!(
        model = model.model_name(),
        context_chunks = results.len(),
        prompt_len = prompt.len(),
        "composing answer"
    );

    model.generate(&prompt)
}
